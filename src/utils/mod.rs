//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores,
//! redondeo decimal y otras funcionalidades comunes.

pub mod errors;
pub mod rounding;
