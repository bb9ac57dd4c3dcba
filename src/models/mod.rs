//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod account_payable;
pub mod lookup;
pub mod maintenance_order;
pub mod stock;
pub mod vehicle;
