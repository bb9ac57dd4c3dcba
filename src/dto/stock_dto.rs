//! DTOs de stock

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::stock::{Stock, StockMovement};

/// Request para registrar una entrada de stock
#[derive(Debug, Deserialize, Validate)]
pub struct StockEntryRequest {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StockMovementResponse {
    pub id: Uuid,
    pub movement_type: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub maintenance_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Stock> for StockResponse {
    fn from(stock: Stock) -> Self {
        Self {
            product_id: stock.product_id,
            warehouse_id: stock.warehouse_id,
            quantity: stock.quantity,
            average_cost: stock.average_cost,
            updated_at: stock.updated_at,
        }
    }
}

impl From<StockMovement> for StockMovementResponse {
    fn from(movement: StockMovement) -> Self {
        Self {
            id: movement.id,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            unit_cost: movement.unit_cost,
            total_cost: movement.total_cost,
            maintenance_order_id: movement.maintenance_order_id,
            created_at: movement.created_at,
        }
    }
}
