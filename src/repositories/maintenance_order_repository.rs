//! Repositorio de órdenes de mantenimiento
//!
//! Acceso a datos de la orden, sus colecciones hijas y la línea de tiempo.
//! Las escrituras se ejecutan dentro de la transacción del llamador; las
//! lecturas sueltas usan el pool.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::maintenance_order::{
    MaintenanceMaterial, MaintenanceOrder, MaintenanceService, MaintenanceTimelineRow,
    MaintenanceWorker, TimelineEvent,
};
use crate::models::vehicle::VehicleReplacementItem;
use crate::utils::errors::AppError;

/// Formato visible del número de orden: OM-<año>-<secuencia>
fn format_order_number(year: i32, seq: i64) -> String {
    format!("OM-{}-{:03}", year, seq)
}

pub struct MaintenanceOrderRepository {
    pool: PgPool,
}

impl MaintenanceOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceOrder>, AppError> {
        let order = sqlx::query_as::<_, MaintenanceOrder>(
            "SELECT * FROM maintenance_orders WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    pub async fn list_by_branch(&self, branch_id: Uuid) -> Result<Vec<MaintenanceOrder>, AppError> {
        let orders = sqlx::query_as::<_, MaintenanceOrder>(
            r#"
            SELECT * FROM maintenance_orders
            WHERE branch_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn list_all(&self) -> Result<Vec<MaintenanceOrder>, AppError> {
        let orders = sqlx::query_as::<_, MaintenanceOrder>(
            "SELECT * FROM maintenance_orders WHERE deleted_at IS NULL ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn workers(&self, order_id: Uuid) -> Result<Vec<MaintenanceWorker>, AppError> {
        let workers = sqlx::query_as::<_, MaintenanceWorker>(
            "SELECT * FROM maintenance_workers WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(workers)
    }

    pub async fn services(&self, order_id: Uuid) -> Result<Vec<MaintenanceService>, AppError> {
        let services = sqlx::query_as::<_, MaintenanceService>(
            "SELECT * FROM maintenance_services WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    pub async fn materials(&self, order_id: Uuid) -> Result<Vec<MaintenanceMaterial>, AppError> {
        let materials = sqlx::query_as::<_, MaintenanceMaterial>(
            "SELECT * FROM maintenance_materials WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(materials)
    }

    pub async fn timeline(&self, order_id: Uuid) -> Result<Vec<MaintenanceTimelineRow>, AppError> {
        let rows = sqlx::query_as::<_, MaintenanceTimelineRow>(
            "SELECT * FROM maintenance_timeline WHERE order_id = $1 ORDER BY seq",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Recambios por kilometraje tocados por los materiales de la orden,
    /// sin duplicados
    pub async fn replacement_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<VehicleReplacementItem>, AppError> {
        let items = sqlx::query_as::<_, VehicleReplacementItem>(
            r#"
            SELECT DISTINCT ON (r.id) r.*
            FROM vehicle_replacement_items r
            INNER JOIN maintenance_materials m ON m.replacement_item_id = r.id
            WHERE m.order_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Baja lógica; las hijas, movimientos de stock y cuentas por pagar
    /// no se tocan
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE maintenance_orders SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Orden de mantenimiento no encontrada".to_string(),
            ));
        }

        Ok(())
    }
}

/// Próximo número de orden para la sucursal en el año en curso.
///
/// Contador explícito por (sucursal, año) incrementado de forma atómica
/// dentro de la transacción; la secuencia arranca en 1.
pub async fn next_order_number(
    tx: &mut Transaction<'_, Postgres>,
    branch_id: Uuid,
    year: i32,
) -> Result<String, AppError> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO maintenance_order_counters (branch_id, year, last_seq)
        VALUES ($1, $2, 1)
        ON CONFLICT (branch_id, year)
        DO UPDATE SET last_seq = maintenance_order_counters.last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(branch_id)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format_order_number(year, seq))
}

pub struct NewOrder<'a> {
    pub order_number: &'a str,
    pub vehicle_id: Uuid,
    pub order_type: &'a str,
    pub status: &'a str,
    pub odometer: Option<Decimal>,
    pub description: Option<&'a str>,
    pub observations: Option<&'a str>,
    pub attachment_url: Option<&'a str>,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub created_by: Uuid,
}

pub async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    order: NewOrder<'_>,
) -> Result<MaintenanceOrder, AppError> {
    let inserted = sqlx::query_as::<_, MaintenanceOrder>(
        r#"
        INSERT INTO maintenance_orders (
            id, order_number, vehicle_id, order_type, status, odometer,
            description, observations, total_cost, total_time_minutes,
            attachment_url, company_id, branch_id, created_by,
            created_at, updated_at, deleted_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, NULL, $9, $10, $11, $12, NOW(), NOW(), NULL)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order.order_number)
    .bind(order.vehicle_id)
    .bind(order.order_type)
    .bind(order.status)
    .bind(order.odometer)
    .bind(order.description)
    .bind(order.observations)
    .bind(order.attachment_url)
    .bind(order.company_id)
    .bind(order.branch_id)
    .bind(order.created_by)
    .fetch_one(&mut **tx)
    .await?;

    Ok(inserted)
}

pub async fn update_order_fields(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    description: Option<&str>,
    observations: Option<&str>,
    odometer: Option<Decimal>,
) -> Result<MaintenanceOrder, AppError> {
    let updated = sqlx::query_as::<_, MaintenanceOrder>(
        r#"
        UPDATE maintenance_orders
        SET description = COALESCE($1, description),
            observations = COALESCE($2, observations),
            odometer = COALESCE($3, odometer),
            updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(description)
    .bind(observations)
    .bind(odometer)
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(updated)
}

pub async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE maintenance_orders SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Fija estado COMPLETED junto con el costo y el tiempo definitivos.
/// Una vez congelados, estos totales son autoritativos.
pub async fn complete_order(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    total_cost: Decimal,
    total_time_minutes: i64,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE maintenance_orders
        SET status = 'COMPLETED', total_cost = $1, total_time_minutes = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(total_cost)
    .bind(total_time_minutes)
    .bind(id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn insert_workers(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    workers: &[(Uuid, bool)],
) -> Result<(), AppError> {
    for (employee_id, is_responsible) in workers {
        sqlx::query(
            r#"
            INSERT INTO maintenance_workers (id, order_id, employee_id, is_responsible)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(employee_id)
        .bind(is_responsible)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn insert_services(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    services: &[(String, Decimal)],
) -> Result<(), AppError> {
    for (description, cost) in services {
        sqlx::query(
            r#"
            INSERT INTO maintenance_services (id, order_id, description, cost)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(description)
        .bind(cost)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_material(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    product_id: Uuid,
    replacement_item_id: Option<Uuid>,
    quantity: Decimal,
    unit_cost: Decimal,
    total_cost: Decimal,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO maintenance_materials (
            id, order_id, product_id, replacement_item_id,
            quantity, unit_cost, total_cost
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(product_id)
    .bind(replacement_item_id)
    .bind(quantity)
    .bind(unit_cost)
    .bind(total_cost)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn delete_workers(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM maintenance_workers WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn delete_services(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM maintenance_services WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn delete_materials(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM maintenance_materials WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Registrar un evento en la línea de tiempo. Las filas nunca se
/// actualizan ni borran; son la única fuente para el cálculo de tiempo.
pub async fn insert_timeline_event(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    event: TimelineEvent,
    notes: Option<&str>,
    actor: Uuid,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO maintenance_timeline (id, order_id, event, notes, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(event.as_str())
    .bind(notes)
    .bind(actor)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Costos de servicios leídos dentro de la transacción
pub async fn service_costs_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Vec<Decimal>, AppError> {
    let costs = sqlx::query_scalar("SELECT cost FROM maintenance_services WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(costs)
}

/// Pares (cantidad, precio de lista) de los materiales de la orden,
/// leídos dentro de la transacción
pub async fn material_estimates_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Vec<(Decimal, Decimal)>, AppError> {
    let estimates = sqlx::query_as(
        r#"
        SELECT m.quantity, p.unit_price
        FROM maintenance_materials m
        INNER JOIN products p ON p.id = m.product_id
        WHERE m.order_id = $1
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(estimates)
}

/// Línea de tiempo leída dentro de la transacción (para congelar totales)
pub async fn timeline_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Vec<MaintenanceTimelineRow>, AppError> {
    let rows = sqlx::query_as::<_, MaintenanceTimelineRow>(
        "SELECT * FROM maintenance_timeline WHERE order_id = $1 ORDER BY seq",
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}

/// Crear la etiqueta que agrupa los recambios sustituidos en la orden
/// con el kilometraje de entrada
pub async fn insert_label(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: Uuid,
    order_id: Uuid,
    odometer: Option<Decimal>,
) -> Result<Uuid, AppError> {
    let label_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO maintenance_labels (id, vehicle_id, order_id, odometer, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        "#,
    )
    .bind(label_id)
    .bind(vehicle_id)
    .bind(order_id)
    .bind(odometer)
    .execute(&mut **tx)
    .await?;

    Ok(label_id)
}

pub async fn link_replacement_items(
    tx: &mut Transaction<'_, Postgres>,
    label_id: Uuid,
    item_ids: &[Uuid],
) -> Result<(), AppError> {
    if item_ids.is_empty() {
        return Ok(());
    }

    sqlx::query("UPDATE vehicle_replacement_items SET label_id = $1 WHERE id = ANY($2)")
        .bind(label_id)
        .bind(item_ids)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formato_numero_de_orden() {
        assert_eq!(format_order_number(2026, 1), "OM-2026-001");
        assert_eq!(format_order_number(2026, 42), "OM-2026-042");
    }

    #[test]
    fn test_numero_de_orden_crece_sin_truncar() {
        assert_eq!(format_order_number(2026, 999), "OM-2026-999");
        assert_eq!(format_order_number(2026, 1000), "OM-2026-1000");
    }
}
