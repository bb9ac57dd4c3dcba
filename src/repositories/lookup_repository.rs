//! Consultas de referencia (colaboradores externos)
//!
//! Empresas, sucursales, empleados y productos viven en otro subsistema;
//! aquí solo se valida su existencia y que estén activos.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::lookup::{Branch, Company, Employee, Product};
use crate::utils::errors::AppError;

pub struct LookupRepository {
    pool: PgPool,
}

impl LookupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company =
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1 AND active = TRUE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(company)
    }

    pub async fn find_active_branch(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Branch>, AppError> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT * FROM branches WHERE id = $1 AND company_id = $2 AND active = TRUE",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    pub async fn find_active_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1 AND active = TRUE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(employee)
    }

    pub async fn find_active_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND active = TRUE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(product)
    }

    pub async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }
}
