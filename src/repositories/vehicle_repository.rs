//! Repositorio de vehículos
//!
//! Consulta de vehículos y transición de su estado con historial. El
//! cambio de estado ocurre dentro de la transacción de la operación de
//! mantenimiento que lo provoca.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleReplacementItem, VehicleStatus};
use crate::utils::errors::AppError;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn replacement_items_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<VehicleReplacementItem>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let items = sqlx::query_as::<_, VehicleReplacementItem>(
            "SELECT * FROM vehicle_replacement_items WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

/// Cambiar el estado del vehículo y registrar la fila de historial.
/// Si se indica kilometraje, también se actualiza en el vehículo.
pub async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: Uuid,
    status: VehicleStatus,
    odometer: Option<Decimal>,
    notes: Option<&str>,
    actor: Uuid,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE vehicles SET status = $1, odometer = COALESCE($2, odometer) WHERE id = $3",
    )
    .bind(status.as_str())
    .bind(odometer)
    .bind(vehicle_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO vehicle_status_histories (id, vehicle_id, status, odometer, notes, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(vehicle_id)
    .bind(status.as_str())
    .bind(odometer)
    .bind(notes)
    .bind(actor)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
