//! Modelo de MaintenanceOrder
//!
//! Este módulo contiene la orden de mantenimiento, sus colecciones hijas
//! (trabajadores, servicios, materiales) y la línea de tiempo de eventos.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado de la orden de mantenimiento
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Paused => "PAUSED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPEN" => Some(OrderStatus::Open),
            "IN_PROGRESS" => Some(OrderStatus::InProgress),
            "PAUSED" => Some(OrderStatus::Paused),
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// COMPLETED y CANCELLED son estados finales
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Solo órdenes abiertas o pausadas pueden iniciarse
    pub fn can_start(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Paused)
    }

    /// Solo órdenes en progreso pueden pausarse
    pub fn can_pause(&self) -> bool {
        matches!(self, OrderStatus::InProgress)
    }
}

/// Tipo de mantenimiento
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderType {
    Preventive,
    Corrective,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Preventive => "PREVENTIVE",
            OrderType::Corrective => "CORRECTIVE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PREVENTIVE" => Some(OrderType::Preventive),
            "CORRECTIVE" => Some(OrderType::Corrective),
            _ => None,
        }
    }
}

/// Evento de la línea de tiempo de una orden
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimelineEvent {
    Started,
    Paused,
    Resumed,
    Completed,
    Cancelled,
}

impl TimelineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineEvent::Started => "STARTED",
            TimelineEvent::Paused => "PAUSED",
            TimelineEvent::Resumed => "RESUMED",
            TimelineEvent::Completed => "COMPLETED",
            TimelineEvent::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "STARTED" => Some(TimelineEvent::Started),
            "PAUSED" => Some(TimelineEvent::Paused),
            "RESUMED" => Some(TimelineEvent::Resumed),
            "COMPLETED" => Some(TimelineEvent::Completed),
            "CANCELLED" => Some(TimelineEvent::Cancelled),
            _ => None,
        }
    }
}

/// Orden de mantenimiento - mapea exactamente a la tabla maintenance_orders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceOrder {
    pub id: Uuid,
    pub order_number: String,
    pub vehicle_id: Uuid,
    pub order_type: String,
    pub status: String,
    pub odometer: Option<Decimal>,
    pub description: Option<String>,
    pub observations: Option<String>,
    pub total_cost: Option<Decimal>,
    pub total_time_minutes: Option<i64>,
    pub attachment_url: Option<String>,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MaintenanceOrder {
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }
}

/// Trabajador asignado a una orden
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceWorker {
    pub id: Uuid,
    pub order_id: Uuid,
    pub employee_id: Uuid,
    pub is_responsible: bool,
}

/// Servicio (mano de obra) de una orden
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceService {
    pub id: Uuid,
    pub order_id: Uuid,
    pub description: String,
    pub cost: Decimal,
}

/// Material consumido por una orden
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceMaterial {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub replacement_item_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

/// Fila de la línea de tiempo - solo inserción, nunca se actualiza ni borra
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceTimelineRow {
    pub id: Uuid,
    pub seq: i64,
    pub order_id: Uuid,
    pub event: String,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Etiqueta que agrupa los recambios por kilometraje sustituidos en una orden
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceLabel {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub order_id: Uuid,
    pub odometer: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            OrderStatus::Open,
            OrderStatus::InProgress,
            OrderStatus::Paused,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("UNKNOWN"), None);
    }

    #[test]
    fn test_transition_table() {
        // start: solo desde OPEN o PAUSED
        assert!(OrderStatus::Open.can_start());
        assert!(OrderStatus::Paused.can_start());
        assert!(!OrderStatus::InProgress.can_start());
        assert!(!OrderStatus::Completed.can_start());
        assert!(!OrderStatus::Cancelled.can_start());

        // pause: solo desde IN_PROGRESS
        assert!(OrderStatus::InProgress.can_pause());
        assert!(!OrderStatus::Open.can_pause());
        assert!(!OrderStatus::Paused.can_pause());

        // complete/cancel: cualquier estado no final
        assert!(!OrderStatus::Open.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
        assert!(!OrderStatus::Paused.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
