//! Campos opcionales de tres estados para actualizaciones parciales
//!
//! Un campo de un request de actualización puede estar ausente (mantener),
//! ser `null` explícito (limpiar la referencia) o traer un valor (asignar).
//! Los campos deben declararse con `#[serde(default)]` para que la ausencia
//! produzca `Patch::Keep`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Aplica el patch sobre un valor anulable
    pub fn apply_to(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Keep => current,
            Patch::Clear => None,
            Patch::Set(value) => Some(value),
        }
    }

    /// Valor nuevo si el patch lo asigna
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Sólo se llega aquí si el campo está presente en el JSON
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        transport_id: Patch<Uuid>,
    }

    #[test]
    fn test_absent_null_and_value_stay_distinct() {
        let absent: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.transport_id, Patch::Keep);

        let null: Body = serde_json::from_str(r#"{"transport_id": null}"#).unwrap();
        assert_eq!(null.transport_id, Patch::Clear);

        let id = Uuid::new_v4();
        let set: Body = serde_json::from_str(&format!(r#"{{"transport_id": "{}"}}"#, id)).unwrap();
        assert_eq!(set.transport_id, Patch::Set(id));
    }

    #[test]
    fn test_apply_to() {
        let current = Some(7);
        assert_eq!(Patch::Keep.apply_to(current), Some(7));
        assert_eq!(Patch::<i32>::Clear.apply_to(current), None);
        assert_eq!(Patch::Set(9).apply_to(current), Some(9));
        assert_eq!(Patch::Set(9).apply_to(None), Some(9));
    }

    #[test]
    fn test_serialize_only_emits_assigned_value() {
        assert_eq!(serde_json::to_value(Patch::Set(3)).unwrap(), serde_json::json!(3));
        assert_eq!(serde_json::to_value(Patch::<i32>::Clear).unwrap(), serde_json::Value::Null);
        assert_eq!(serde_json::to_value(Patch::<i32>::Keep).unwrap(), serde_json::Value::Null);
    }
}
