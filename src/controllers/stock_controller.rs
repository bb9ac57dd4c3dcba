use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::stock_dto::{StockEntryRequest, StockMovementResponse, StockResponse};
use crate::repositories::lookup_repository::LookupRepository;
use crate::repositories::stock_repository::{self, StockRepository};
use crate::utils::errors::AppError;

pub struct StockController {
    pool: PgPool,
    stocks: StockRepository,
    lookups: LookupRepository,
}

impl StockController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            stocks: StockRepository::new(pool.clone()),
            lookups: LookupRepository::new(pool.clone()),
            pool,
        }
    }

    /// Registrar una entrada de stock: crea el saldo si no existe y
    /// recalcula el costo promedio ponderado
    pub async fn entry(
        &self,
        actor: Uuid,
        request: StockEntryRequest,
    ) -> Result<ApiResponse<StockResponse>, AppError> {
        request.validate()?;

        self.lookups
            .find_active_product(request.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))?;

        let mut tx = self.pool.begin().await?;
        let stock = stock_repository::receive_entry(
            &mut tx,
            request.product_id,
            request.warehouse_id,
            request.quantity,
            request.unit_cost,
            actor,
        )
        .await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            StockResponse::from(stock),
            "Entrada de stock registrada exitosamente".to_string(),
        ))
    }

    pub async fn get(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<StockResponse, AppError> {
        let stock = self
            .stocks
            .find_by_product(product_id, warehouse_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock no encontrado".to_string()))?;

        Ok(StockResponse::from(stock))
    }

    pub async fn movements(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Vec<StockMovementResponse>, AppError> {
        let movements = self
            .stocks
            .movements_by_product(product_id, warehouse_id)
            .await?;

        Ok(movements
            .into_iter()
            .map(StockMovementResponse::from)
            .collect())
    }
}
