//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula el SQL de un agregado. Las operaciones que
//! forman parte de una unidad atómica reciben la transacción del llamador.

pub mod account_payable_repository;
pub mod lookup_repository;
pub mod maintenance_order_repository;
pub mod stock_repository;
pub mod vehicle_repository;
