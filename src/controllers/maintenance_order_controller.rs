use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::maintenance_order_dto::{
    CreateMaintenanceOrderRequest, MaintenanceOrderListResponse, MaintenanceOrderResponse,
    TimelineEventResponse, TransitionRequest, UpdateMaintenanceOrderRequest,
};
use crate::services::maintenance_order_service::MaintenanceOrderService;
use crate::utils::errors::AppError;

pub struct MaintenanceOrderController {
    service: MaintenanceOrderService,
    company_id: Uuid,
}

impl MaintenanceOrderController {
    pub fn new(pool: PgPool, company_id: Uuid) -> Self {
        Self {
            service: MaintenanceOrderService::new(pool),
            company_id,
        }
    }

    pub async fn create(
        &self,
        actor: Uuid,
        request: CreateMaintenanceOrderRequest,
    ) -> Result<ApiResponse<MaintenanceOrderResponse>, AppError> {
        request.validate()?;

        let response = self.service.create(self.company_id, actor, request).await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Orden de mantenimiento creada exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        actor: Uuid,
        request: UpdateMaintenanceOrderRequest,
    ) -> Result<ApiResponse<MaintenanceOrderResponse>, AppError> {
        request.validate()?;

        let response = self.service.update(id, actor, request).await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Orden de mantenimiento actualizada exitosamente".to_string(),
        ))
    }

    pub async fn start(
        &self,
        id: Uuid,
        actor: Uuid,
        request: TransitionRequest,
    ) -> Result<ApiResponse<MaintenanceOrderResponse>, AppError> {
        let response = self.service.start(id, actor, request.notes).await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Orden de mantenimiento iniciada".to_string(),
        ))
    }

    pub async fn pause(
        &self,
        id: Uuid,
        actor: Uuid,
        request: TransitionRequest,
    ) -> Result<ApiResponse<MaintenanceOrderResponse>, AppError> {
        let response = self.service.pause(id, actor, request.notes).await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Orden de mantenimiento pausada".to_string(),
        ))
    }

    pub async fn complete(
        &self,
        id: Uuid,
        actor: Uuid,
        request: TransitionRequest,
    ) -> Result<ApiResponse<MaintenanceOrderResponse>, AppError> {
        let response = self.service.complete(id, actor, request.notes).await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Orden de mantenimiento completada".to_string(),
        ))
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        actor: Uuid,
        request: TransitionRequest,
    ) -> Result<ApiResponse<MaintenanceOrderResponse>, AppError> {
        let response = self.service.cancel(id, actor, request.notes).await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Orden de mantenimiento cancelada".to_string(),
        ))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.service.remove(id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<MaintenanceOrderResponse, AppError> {
        self.service.get_by_id(id).await
    }

    pub async fn list(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<MaintenanceOrderListResponse>, AppError> {
        self.service.list(branch_id).await
    }

    pub async fn timeline(&self, id: Uuid) -> Result<Vec<TimelineEventResponse>, AppError> {
        self.service.timeline(id).await
    }
}
