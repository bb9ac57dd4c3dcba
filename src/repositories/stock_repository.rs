//! Ledger de stock
//!
//! Todos los cambios de cantidad y costo del stock pasan por aquí, siempre
//! dentro de la transacción del llamador. El saldo se bloquea con
//! `SELECT ... FOR UPDATE` para serializar consumos concurrentes sobre el
//! mismo par (producto, almacén): en total nunca se consume más de lo
//! disponible.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::stock::{MovementType, Stock, StockMovement};
use crate::utils::errors::AppError;
use crate::utils::rounding::{line_total, round_currency, round_quantity};

pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_product(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Option<Stock>, AppError> {
        let stock = sqlx::query_as::<_, Stock>(
            "SELECT * FROM stocks WHERE product_id = $1 AND warehouse_id = $2",
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock)
    }

    pub async fn movements_by_product(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE product_id = $1 AND warehouse_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Consumir stock dentro de la transacción del llamador.
///
/// Bloquea el saldo, verifica disponibilidad, descuenta la cantidad (el
/// costo promedio no cambia en salidas) y registra el movimiento EXIT.
/// El costo unitario se resuelve en cadena: costo indicado por el
/// material, costo promedio del ledger, precio de lista del producto,
/// cero. Devuelve el costo unitario resuelto.
pub async fn reserve_and_consume(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    warehouse_id: Uuid,
    quantity: Decimal,
    unit_cost_hint: Option<Decimal>,
    order_id: Option<Uuid>,
    actor: Uuid,
) -> Result<Decimal, AppError> {
    let quantity = round_quantity(quantity);
    if quantity <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "La cantidad a consumir debe ser mayor que cero".to_string(),
        ));
    }

    let stock = sqlx::query_as::<_, Stock>(
        "SELECT * FROM stocks WHERE product_id = $1 AND warehouse_id = $2 FOR UPDATE",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(&mut **tx)
    .await?;

    let current_quantity = stock.as_ref().map(|s| s.quantity).unwrap_or(Decimal::ZERO);
    if quantity > current_quantity {
        return Err(AppError::InsufficientStock(format!(
            "La cantidad solicitada ({}) excede el stock disponible ({})",
            quantity, current_quantity
        )));
    }

    let unit_cost = resolve_unit_cost(tx, product_id, unit_cost_hint, stock.as_ref()).await?;

    if let Some(stock) = &stock {
        sqlx::query("UPDATE stocks SET quantity = $1, updated_at = NOW() WHERE id = $2")
            .bind(current_quantity - quantity)
            .bind(stock.id)
            .execute(&mut **tx)
            .await?;
    }

    insert_movement(
        tx,
        MovementType::Exit,
        product_id,
        warehouse_id,
        quantity,
        unit_cost,
        order_id,
        actor,
    )
    .await?;

    Ok(unit_cost)
}

/// Registrar una entrada de stock dentro de la transacción del llamador.
///
/// Crea el saldo de forma diferida en la primera entrada del par
/// (producto, almacén) y recalcula el costo promedio ponderado.
pub async fn receive_entry(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    warehouse_id: Uuid,
    quantity: Decimal,
    unit_cost: Decimal,
    actor: Uuid,
) -> Result<Stock, AppError> {
    let quantity = round_quantity(quantity);
    let unit_cost = round_currency(unit_cost);
    if quantity <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "La cantidad de entrada debe ser mayor que cero".to_string(),
        ));
    }

    let existing = sqlx::query_as::<_, Stock>(
        "SELECT * FROM stocks WHERE product_id = $1 AND warehouse_id = $2 FOR UPDATE",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(&mut **tx)
    .await?;

    let stock = match existing {
        Some(current) => {
            let new_average =
                weighted_average(current.quantity, current.average_cost, quantity, unit_cost);
            sqlx::query_as::<_, Stock>(
                r#"
                UPDATE stocks
                SET quantity = $1, average_cost = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(current.quantity + quantity)
            .bind(new_average)
            .bind(current.id)
            .fetch_one(&mut **tx)
            .await?
        }
        None => {
            sqlx::query_as::<_, Stock>(
                r#"
                INSERT INTO stocks (id, product_id, warehouse_id, quantity, average_cost, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(warehouse_id)
            .bind(quantity)
            .bind(unit_cost)
            .fetch_one(&mut **tx)
            .await?
        }
    };

    insert_movement(
        tx,
        MovementType::Entry,
        product_id,
        warehouse_id,
        quantity,
        unit_cost,
        None,
        actor,
    )
    .await?;

    Ok(stock)
}

/// Costo promedio ponderado tras una entrada
fn weighted_average(
    old_quantity: Decimal,
    old_average: Decimal,
    entered_quantity: Decimal,
    entered_cost: Decimal,
) -> Decimal {
    let new_quantity = old_quantity + entered_quantity;
    if new_quantity <= Decimal::ZERO {
        return entered_cost;
    }
    round_currency((old_quantity * old_average + entered_quantity * entered_cost) / new_quantity)
}

async fn resolve_unit_cost(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    hint: Option<Decimal>,
    stock: Option<&Stock>,
) -> Result<Decimal, AppError> {
    if let Some(cost) = hint {
        if cost > Decimal::ZERO {
            return Ok(round_currency(cost));
        }
    }

    if let Some(stock) = stock {
        if stock.average_cost > Decimal::ZERO {
            return Ok(stock.average_cost);
        }
    }

    let list_price: Option<Decimal> =
        sqlx::query_scalar("SELECT unit_price FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

    Ok(round_currency(list_price.unwrap_or(Decimal::ZERO)))
}

#[allow(clippy::too_many_arguments)]
async fn insert_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement_type: MovementType,
    product_id: Uuid,
    warehouse_id: Uuid,
    quantity: Decimal,
    unit_cost: Decimal,
    order_id: Option<Uuid>,
    actor: Uuid,
) -> Result<StockMovement, AppError> {
    let movement = sqlx::query_as::<_, StockMovement>(
        r#"
        INSERT INTO stock_movements (
            id, movement_type, product_id, warehouse_id,
            quantity, unit_cost, total_cost, maintenance_order_id,
            created_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(movement_type.as_str())
    .bind(product_id)
    .bind(warehouse_id)
    .bind(quantity)
    .bind(unit_cost)
    .bind(line_total(quantity, unit_cost))
    .bind(order_id)
    .bind(actor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(movement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promedio_ponderado() {
        // 10 unidades a 8.00 + 10 unidades a 12.00 = promedio 10.00
        let avg = weighted_average(
            Decimal::new(10, 0),
            Decimal::new(800, 2),
            Decimal::new(10, 0),
            Decimal::new(1200, 2),
        );
        assert_eq!(avg, Decimal::new(1000, 2));
    }

    #[test]
    fn test_promedio_primera_entrada() {
        let avg = weighted_average(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::new(5, 0),
            Decimal::new(750, 2),
        );
        assert_eq!(avg, Decimal::new(750, 2));
    }

    #[test]
    fn test_promedio_redondea_a_moneda() {
        // (3 x 10.00 + 1 x 10.01) / 4 = 10.0025 -> 10.00
        let avg = weighted_average(
            Decimal::new(3, 0),
            Decimal::new(1000, 2),
            Decimal::new(1, 0),
            Decimal::new(1001, 2),
        );
        assert_eq!(avg, Decimal::new(1000, 2));
    }
}
