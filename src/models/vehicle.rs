//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, su historial de estados y los
//! recambios por kilometraje asociados al vehículo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado del vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleStatus {
    Active,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Maintenance => "maintenance",
        }
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub license_plate: String,
    pub status: String,
    pub odometer: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fila del historial de estados del vehículo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleStatusHistory {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub status: String,
    pub odometer: Option<Decimal>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Recambio controlado por kilometraje (correa, filtro, etc.)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleReplacementItem {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub description: String,
    pub interval_km: Option<Decimal>,
    pub label_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
