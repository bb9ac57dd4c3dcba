//! Modelo de AccountPayable
//!
//! Cuenta por pagar generada como efecto financiero de otras operaciones
//! del sistema (por ejemplo, al completar una orden de mantenimiento).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Origen de la cuenta por pagar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PayableOrigin {
    Maintenance,
}

impl PayableOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayableOrigin::Maintenance => "MAINTENANCE",
        }
    }
}

/// Cuenta por pagar - mapea a la tabla account_payables
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountPayable {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub origin_type: String,
    pub origin_id: Option<Uuid>,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
