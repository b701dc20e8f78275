//! Utilidades del sistema
//!
//! Manejo de errores y campos de actualización de tres estados.

pub mod errors;
pub mod patch;
