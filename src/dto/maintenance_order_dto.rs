//! DTOs de órdenes de mantenimiento

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::maintenance_order::{
    MaintenanceMaterial, MaintenanceService, MaintenanceTimelineRow, MaintenanceWorker,
};
use crate::models::vehicle::VehicleReplacementItem;

#[derive(Debug, Deserialize)]
pub struct WorkerInput {
    pub employee_id: Uuid,
    pub is_responsible: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceInput {
    pub description: String,
    pub cost: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct MaterialInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    // Si no se indica, el costo se resuelve contra el ledger de stock
    pub unit_cost: Option<Decimal>,
    pub replacement_item_id: Option<Uuid>,
    pub item_replaced: Option<bool>,
}

/// Request para crear una orden de mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceOrderRequest {
    pub vehicle_id: Uuid,

    pub branch_id: Uuid,

    pub order_type: String,

    pub odometer: Option<Decimal>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 2000))]
    pub observations: Option<String>,

    pub attachment_url: Option<String>,

    pub workers: Option<Vec<WorkerInput>>,
    pub services: Option<Vec<ServiceInput>>,
    pub materials: Option<Vec<MaterialInput>>,
}

/// Request para actualizar una orden existente.
/// Las colecciones hijas que se envían se reemplazan por completo.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaintenanceOrderRequest {
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 2000))]
    pub observations: Option<String>,

    pub odometer: Option<Decimal>,

    pub workers: Option<Vec<WorkerInput>>,
    pub services: Option<Vec<ServiceInput>>,
    pub materials: Option<Vec<MaterialInput>>,
}

/// Request para transiciones de estado (start, pause, complete, cancel)
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    pub employee_id: Uuid,
    pub is_responsible: bool,
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub description: String,
    pub cost: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MaterialResponse {
    pub product_id: Uuid,
    pub replacement_item_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ReplacementItemResponse {
    pub id: Uuid,
    pub description: String,
    pub interval_km: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct TimelineEventResponse {
    pub event: String,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Vista completa de una orden, con los campos derivados ya calculados
#[derive(Debug, Serialize)]
pub struct MaintenanceOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub vehicle_id: Uuid,
    pub order_type: String,
    pub status: String,
    pub odometer: Option<Decimal>,
    pub description: Option<String>,
    pub observations: Option<String>,
    pub total_cost: Decimal,
    pub cost_is_frozen: bool,
    pub total_time_minutes: i64,
    pub attachment_url: Option<String>,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub workers: Vec<WorkerResponse>,
    pub services: Vec<ServiceResponse>,
    pub materials: Vec<MaterialResponse>,
    pub replacement_items: Vec<ReplacementItemResponse>,
}

/// Response resumida para listados
#[derive(Debug, Serialize)]
pub struct MaintenanceOrderListResponse {
    pub id: Uuid,
    pub order_number: String,
    pub vehicle_id: Uuid,
    pub order_type: String,
    pub status: String,
    pub total_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl From<MaintenanceWorker> for WorkerResponse {
    fn from(worker: MaintenanceWorker) -> Self {
        Self {
            employee_id: worker.employee_id,
            is_responsible: worker.is_responsible,
        }
    }
}

impl From<MaintenanceService> for ServiceResponse {
    fn from(service: MaintenanceService) -> Self {
        Self {
            description: service.description,
            cost: service.cost,
        }
    }
}

impl From<MaintenanceMaterial> for MaterialResponse {
    fn from(material: MaintenanceMaterial) -> Self {
        Self {
            product_id: material.product_id,
            replacement_item_id: material.replacement_item_id,
            quantity: material.quantity,
            unit_cost: material.unit_cost,
            total_cost: material.total_cost,
        }
    }
}

impl From<VehicleReplacementItem> for ReplacementItemResponse {
    fn from(item: VehicleReplacementItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            interval_km: item.interval_km,
        }
    }
}

impl From<MaintenanceTimelineRow> for TimelineEventResponse {
    fn from(row: MaintenanceTimelineRow) -> Self {
        Self {
            event: row.event,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}
