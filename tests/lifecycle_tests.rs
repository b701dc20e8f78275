mod common;

use fleet_logistics::dto::client_dto::{CreateClientRequest, UpdateClientRequest};
use fleet_logistics::dto::equipment_dto::CreateEquipmentRequest;
use fleet_logistics::models::OrderStatus;
use fleet_logistics::repositories::{
    ClientObjectStore, EquipmentStore, OrderStore, StoreError, Visibility,
};
use fleet_logistics::services::{FleetServices, Stores};
use fleet_logistics::utils::errors::ErrorKind;
use fleet_logistics::utils::patch::Patch;

use common::*;

#[tokio::test]
async fn test_unreferenced_client_object_soft_delete() {
    let s = services();
    let c1 = client(&s, "Acme").await;
    let o1 = client_object(&s, c1.id, "Site A").await;

    s.lifecycle.delete_client_object(o1.id).await.unwrap();

    let err = s
        .clients
        .get_client_object(o1.id, Visibility::ActiveOnly)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let row = s
        .clients
        .get_client_object(o1.id, Visibility::IncludeDeleted)
        .await
        .unwrap();
    assert!(row.deleted_at.is_some());
    assert_eq!(row.name, "Site A");

    let active = s.clients.list_client_objects(Visibility::ActiveOnly).await.unwrap();
    assert!(active.iter().all(|o| o.id != o1.id));
}

#[tokio::test]
async fn test_blocked_transport_delete_lists_every_reason() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;
    let e1 = loose_equipment(&s).await;
    s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();

    let (_, _, order) = draft_order(&s).await;
    s.orders.assign_transport(order.id, t1.id).await.unwrap();

    let before = s.fleet.get_transport(t1.id, Visibility::IncludeDeleted).await.unwrap();
    let err = s.lifecycle.delete_transport(t1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let message = err.to_string();
    assert!(message.contains("has an assigned driver"));
    assert!(message.contains("has assigned equipment"));
    assert!(message.contains("1 open order(s)"));

    let after = s.fleet.get_transport(t1.id, Visibility::IncludeDeleted).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_transport_delete_succeeds_once_released() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;
    s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    s.assignments.unassign_driver(t1.id).await.unwrap();

    s.lifecycle.delete_transport(t1.id).await.unwrap();
    let err = s.lifecycle.delete_transport(t1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_client_with_objects_or_open_orders_cannot_be_deleted() {
    let s = services();
    let (c1, o1, order) = draft_order(&s).await;

    let err = s.lifecycle.delete_client(c1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("active client object(s)"));
    assert!(err.to_string().contains("open order(s)"));

    // Los pedidos terminados no bloquean
    s.orders.update_order_status(order.id, OrderStatus::Cancelled).await.unwrap();
    s.lifecycle.delete_client_object(o1.id).await.unwrap();
    s.lifecycle.delete_client(c1.id).await.unwrap();
}

#[tokio::test]
async fn test_client_object_with_open_order_and_placed_equipment_cannot_be_deleted() {
    let s = services();
    let (_, o1, order) = draft_order(&s).await;
    let e1 = s
        .equipment
        .create_equipment(CreateEquipmentRequest {
            client_object_id: Some(o1.id),
            ..equipment_request()
        })
        .await
        .unwrap();

    let before = s.clients.get_client_object(o1.id, Visibility::IncludeDeleted).await.unwrap();
    let err = s.lifecycle.delete_client_object(o1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let message = err.to_string();
    assert!(message.contains("has 1 open order(s)"));
    assert!(message.contains("has 1 equipment unit(s) placed"));

    let after = s.clients.get_client_object(o1.id, Visibility::IncludeDeleted).await.unwrap();
    assert_eq!(before, after);
    assert!(after.deleted_at.is_none());

    // Con sólo una de las dos causas sigue bloqueado
    s.lifecycle.delete_equipment(e1.id).await.unwrap();
    let err = s.lifecycle.delete_client_object(o1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(!err.to_string().contains("equipment unit(s) placed"));

    s.orders.update_order_status(order.id, OrderStatus::Cancelled).await.unwrap();
    s.lifecycle.delete_client_object(o1.id).await.unwrap();
}

#[tokio::test]
async fn test_warehouse_with_stored_equipment_cannot_be_deleted() {
    let s = services();
    let w1 = warehouse(&s, "North").await;
    let e1 = equipment_in_warehouse(&s, w1.id).await;

    let err = s.lifecycle.delete_warehouse(w1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("equipment unit(s) stored"));

    s.lifecycle.delete_equipment(e1.id).await.unwrap();
    s.lifecycle.delete_warehouse(w1.id).await.unwrap();
}

#[tokio::test]
async fn test_driver_on_transport_cannot_be_deleted() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;
    s.assignments.assign_driver(t1.id, d1.id).await.unwrap();

    let err = s.lifecycle.delete_driver(d1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("T1-001"));
}

#[tokio::test]
async fn test_mounted_equipment_cannot_be_deleted() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let e1 = loose_equipment(&s).await;
    s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();

    let err = s.lifecycle.delete_equipment(e1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_delete_then_restore_preserves_fields() {
    let s = services();
    let d1 = driver(&s, "LIC-001").await;

    s.lifecycle.delete_driver(d1.id).await.unwrap();
    let restored = s.lifecycle.restore_driver(d1.id).await.unwrap();

    assert_eq!(restored.id, d1.id);
    assert_eq!(restored.full_name, d1.full_name);
    assert_eq!(restored.license_number, d1.license_number);
    assert_eq!(restored.license_classes, d1.license_classes);
    assert_eq!(restored.created_at, d1.created_at);
    assert!(restored.deleted_at.is_none());
}

#[tokio::test]
async fn test_restoring_an_active_row_is_rejected() {
    let s = services();
    let c1 = client(&s, "Acme").await;

    let err = s.lifecycle.restore_client(c1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_natural_keys_are_unique_among_active_rows_only() {
    let s = services();
    let old = client(&s, "Acme").await;

    let err = s
        .clients
        .create_client(CreateClientRequest {
            name: "Acme".to_string(),
            phone: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    s.lifecycle.delete_client(old.id).await.unwrap();
    let replacement = client(&s, "Acme").await;
    assert_ne!(replacement.id, old.id);

    // Restaurar el antiguo chocaría con el nombre del nuevo
    let err = s.lifecycle.restore_client(old.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let still_deleted = s.clients.get_client(old.id, Visibility::IncludeDeleted).await.unwrap();
    assert!(still_deleted.deleted_at.is_some());
}

#[tokio::test]
async fn test_rename_onto_active_name_is_conflict() {
    let s = services();
    client(&s, "Acme").await;
    let other = client(&s, "Globex").await;

    let err = s
        .clients
        .update_client(
            other.id,
            UpdateClientRequest {
                name: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let cleared = s
        .clients
        .update_client(
            other.id,
            UpdateClientRequest {
                phone: Patch::Set("+34 600 000 000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.phone.as_deref(), Some("+34 600 000 000"));
}

#[tokio::test]
async fn test_restore_requires_active_parent() {
    let s = services();
    let c1 = client(&s, "Acme").await;
    let o1 = client_object(&s, c1.id, "Site A").await;

    s.lifecycle.delete_client_object(o1.id).await.unwrap();
    s.lifecycle.delete_client(c1.id).await.unwrap();

    let err = s.lifecycle.restore_client_object(o1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    s.lifecycle.restore_client(c1.id).await.unwrap();
    let restored = s.lifecycle.restore_client_object(o1.id).await.unwrap();
    assert_eq!(restored.client_id, c1.id);
}

#[tokio::test]
async fn test_order_delete_and_restore() {
    let s = services();
    let (_, _, order) = draft_order(&s).await;

    s.lifecycle.delete_order(order.id).await.unwrap();
    let err = s.orders.get_order(order.id, Visibility::ActiveOnly).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let restored = s.lifecycle.restore_order(order.id).await.unwrap();
    assert_eq!(restored.status, OrderStatus::Draft);
    assert!(restored.deleted_at.is_none());
}

// El almacén vuelve a comprobar las filas padre al restaurar, aunque el
// servicio ya las haya validado antes.

#[tokio::test]
async fn test_store_restore_of_client_object_needs_active_client() {
    let stores = Stores::in_memory();
    let s = FleetServices::new(stores.clone());
    let c1 = client(&s, "Acme").await;
    let o1 = client_object(&s, c1.id, "Site A").await;
    s.lifecycle.delete_client_object(o1.id).await.unwrap();
    s.lifecycle.delete_client(c1.id).await.unwrap();

    let err = stores.client_objects.restore_client_object(o1.id).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference("clients")));

    let row = stores
        .client_objects
        .get_client_object(o1.id, Visibility::IncludeDeleted)
        .await
        .unwrap()
        .unwrap();
    assert!(row.deleted_at.is_some());
}

#[tokio::test]
async fn test_store_restore_of_order_needs_active_object() {
    let stores = Stores::in_memory();
    let s = FleetServices::new(stores.clone());
    let (_, o1, order) = draft_order(&s).await;
    s.lifecycle.delete_order(order.id).await.unwrap();
    s.lifecycle.delete_client_object(o1.id).await.unwrap();

    let err = stores.orders.restore_order(order.id).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference("client_objects")));

    let row = stores.orders.get_order(order.id, Visibility::IncludeDeleted).await.unwrap().unwrap();
    assert!(row.deleted_at.is_some());
}

#[tokio::test]
async fn test_store_restore_of_equipment_needs_active_placement() {
    let stores = Stores::in_memory();
    let s = FleetServices::new(stores.clone());
    let w1 = warehouse(&s, "North").await;
    let e1 = equipment_in_warehouse(&s, w1.id).await;
    s.lifecycle.delete_equipment(e1.id).await.unwrap();
    s.lifecycle.delete_warehouse(w1.id).await.unwrap();

    let err = stores.equipment.restore_equipment(e1.id).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference("warehouses")));

    let row = stores.equipment.get_equipment(e1.id, Visibility::IncludeDeleted).await.unwrap().unwrap();
    assert!(row.deleted_at.is_some());
}
