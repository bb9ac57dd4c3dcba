//! Repositorio de cuentas por pagar
//!
//! Alta de la cuenta por pagar generada al completar una orden de
//! mantenimiento, dentro de la misma transacción que completa la orden:
//! una orden nunca queda completada sin su registro financiero.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::models::account_payable::{AccountPayable, PayableOrigin};
use crate::models::maintenance_order::MaintenanceOrder;
use crate::utils::errors::AppError;

/// Crear la cuenta por pagar de una orden completada, con vencimiento
/// inmediato
pub async fn create_for_order(
    tx: &mut Transaction<'_, Postgres>,
    order: &MaintenanceOrder,
    amount: Decimal,
    actor: Uuid,
) -> Result<AccountPayable, AppError> {
    let payable = sqlx::query_as::<_, AccountPayable>(
        r#"
        INSERT INTO account_payables (
            id, description, amount, due_date, origin_type, origin_id,
            company_id, branch_id, created_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(format!("Mantenimiento {}", order.order_number))
    .bind(amount)
    .bind(Utc::now().date_naive())
    .bind(PayableOrigin::Maintenance.as_str())
    .bind(order.id)
    .bind(order.company_id)
    .bind(order.branch_id)
    .bind(actor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(payable)
}
