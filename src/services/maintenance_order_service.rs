//! Ciclo de vida de las órdenes de mantenimiento
//!
//! Este servicio es el dueño del estado de la orden y orquesta cada
//! operación (create, update, start, pause, complete, cancel) como una
//! única transacción: orden, hijas, ledger de stock, estado del vehículo,
//! línea de tiempo y cuenta por pagar se confirman juntos o no se
//! confirma nada.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::maintenance_order_dto::{
    CreateMaintenanceOrderRequest, MaintenanceOrderListResponse, MaintenanceOrderResponse,
    MaterialInput, ServiceInput, TimelineEventResponse, UpdateMaintenanceOrderRequest, WorkerInput,
};
use crate::models::maintenance_order::{
    MaintenanceOrder, MaintenanceTimelineRow, OrderStatus, OrderType, TimelineEvent,
};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::account_payable_repository;
use crate::repositories::lookup_repository::LookupRepository;
use crate::repositories::maintenance_order_repository::{
    self as order_repo, MaintenanceOrderRepository, NewOrder,
};
use crate::repositories::stock_repository;
use crate::repositories::vehicle_repository::{self as vehicle_repo, VehicleRepository};
use crate::services::costing;
use crate::utils::errors::AppError;
use crate::utils::rounding::{line_total, round_currency, round_quantity};

/// Material ya validado contra productos y recambios
struct ValidatedMaterial {
    product_id: Uuid,
    quantity: Decimal,
    unit_cost_hint: Option<Decimal>,
    replacement_item_id: Option<Uuid>,
    item_replaced: bool,
}

/// Colecciones hijas validadas y normalizadas
struct ValidatedChildren {
    workers: Vec<(Uuid, bool)>,
    services: Vec<(String, Decimal)>,
    materials: Vec<ValidatedMaterial>,
}

pub struct MaintenanceOrderService {
    pool: PgPool,
    orders: MaintenanceOrderRepository,
    vehicles: VehicleRepository,
    lookups: LookupRepository,
}

impl MaintenanceOrderService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            orders: MaintenanceOrderRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            lookups: LookupRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        actor: Uuid,
        request: CreateMaintenanceOrderRequest,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let order_type = OrderType::parse(&request.order_type).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Tipo de mantenimiento inválido: {}",
                request.order_type
            ))
        })?;

        self.lookups
            .find_active_company(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Empresa no encontrada".to_string()))?;

        let branch = self
            .lookups
            .find_active_branch(request.branch_id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sucursal no encontrada".to_string()))?;

        let vehicle = self
            .vehicles
            .find_active_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let children = self
            .validate_children(
                &vehicle,
                &request.workers,
                &request.services,
                &request.materials,
            )
            .await?;

        // Una sola transacción: orden, hijas, stock, vehículo y línea de
        // tiempo. El stock se verifica adentro, con el saldo bloqueado.
        let mut tx = self.pool.begin().await?;

        let year = Utc::now().year();
        let order_number = order_repo::next_order_number(&mut tx, branch.id, year).await?;

        let order = order_repo::insert_order(
            &mut tx,
            NewOrder {
                order_number: &order_number,
                vehicle_id: vehicle.id,
                order_type: order_type.as_str(),
                status: OrderStatus::Open.as_str(),
                odometer: request.odometer,
                description: request.description.as_deref(),
                observations: request.observations.as_deref(),
                attachment_url: request.attachment_url.as_deref(),
                company_id,
                branch_id: branch.id,
                created_by: actor,
            },
        )
        .await?;

        order_repo::insert_workers(&mut tx, order.id, &children.workers).await?;
        order_repo::insert_services(&mut tx, order.id, &children.services).await?;
        self.consume_and_insert_materials(&mut tx, &order, &children.materials, actor)
            .await?;

        order_repo::insert_timeline_event(&mut tx, order.id, TimelineEvent::Started, None, actor)
            .await?;

        vehicle_repo::set_status(
            &mut tx,
            vehicle.id,
            VehicleStatus::Maintenance,
            request.odometer,
            Some(&format!("Ingreso a mantenimiento {}", order_number)),
            actor,
        )
        .await?;

        let replaced: Vec<Uuid> = children
            .materials
            .iter()
            .filter(|m| m.item_replaced)
            .filter_map(|m| m.replacement_item_id)
            .collect();
        if !replaced.is_empty() {
            let label_id =
                order_repo::insert_label(&mut tx, vehicle.id, order.id, request.odometer).await?;
            order_repo::link_replacement_items(&mut tx, label_id, &replaced).await?;
        }

        tx.commit().await?;

        info!(
            "🔧 Orden de mantenimiento {} creada para el vehículo {}",
            order_number, vehicle.id
        );

        self.get_by_id(order.id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        actor: Uuid,
        request: UpdateMaintenanceOrderRequest,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let order = self.find_order(id).await?;
        let status = parse_status(&order)?;
        if status.is_terminal() {
            return Err(AppError::PreconditionFailed(
                "No se puede modificar una orden completada o cancelada".to_string(),
            ));
        }

        let vehicle = self
            .vehicles
            .find_active_by_id(order.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let children = self
            .validate_children(
                &vehicle,
                &request.workers,
                &request.services,
                &request.materials,
            )
            .await?;

        let mut tx = self.pool.begin().await?;

        order_repo::update_order_fields(
            &mut tx,
            order.id,
            request.description.as_deref(),
            request.observations.as_deref(),
            request.odometer,
        )
        .await?;

        // Las colecciones enviadas se reemplazan por completo, nunca se
        // mezclan. El stock ya consumido por materiales anteriores no se
        // repone.
        if request.workers.is_some() {
            order_repo::delete_workers(&mut tx, order.id).await?;
            order_repo::insert_workers(&mut tx, order.id, &children.workers).await?;
        }
        if request.services.is_some() {
            order_repo::delete_services(&mut tx, order.id).await?;
            order_repo::insert_services(&mut tx, order.id, &children.services).await?;
        }
        if request.materials.is_some() {
            order_repo::delete_materials(&mut tx, order.id).await?;
            self.consume_and_insert_materials(&mut tx, &order, &children.materials, actor)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    pub async fn start(
        &self,
        id: Uuid,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let order = self.find_order(id).await?;
        let status = parse_status(&order)?;
        if !status.can_start() {
            return Err(AppError::PreconditionFailed(
                "Solo órdenes abiertas o pausadas pueden iniciarse".to_string(),
            ));
        }

        let event = if status == OrderStatus::Paused {
            TimelineEvent::Resumed
        } else {
            TimelineEvent::Started
        };

        let mut tx = self.pool.begin().await?;
        order_repo::update_status(&mut tx, order.id, OrderStatus::InProgress.as_str()).await?;
        order_repo::insert_timeline_event(&mut tx, order.id, event, notes.as_deref(), actor)
            .await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    pub async fn pause(
        &self,
        id: Uuid,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let order = self.find_order(id).await?;
        let status = parse_status(&order)?;
        if !status.can_pause() {
            return Err(AppError::PreconditionFailed(
                "Solo órdenes en progreso pueden pausarse".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        order_repo::update_status(&mut tx, order.id, OrderStatus::Paused.as_str()).await?;
        order_repo::insert_timeline_event(
            &mut tx,
            order.id,
            TimelineEvent::Paused,
            notes.as_deref(),
            actor,
        )
        .await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Completar la orden: congela tiempo y costo, devuelve el vehículo a
    /// activo y, si el costo es mayor que cero, genera la cuenta por pagar
    /// en la misma transacción.
    pub async fn complete(
        &self,
        id: Uuid,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let order = self.find_order(id).await?;
        let status = parse_status(&order)?;
        if status.is_terminal() {
            return Err(AppError::PreconditionFailed(
                "La orden ya está completada o cancelada".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        order_repo::insert_timeline_event(
            &mut tx,
            order.id,
            TimelineEvent::Completed,
            notes.as_deref(),
            actor,
        )
        .await?;

        // Totales definitivos calculados con los datos releídos dentro de
        // la transacción
        let timeline = order_repo::timeline_in_tx(&mut tx, order.id).await?;
        let minutes = costing::elapsed_minutes(&timeline_points(&timeline), Utc::now());

        let service_costs = order_repo::service_costs_in_tx(&mut tx, order.id).await?;
        let estimates = order_repo::material_estimates_in_tx(&mut tx, order.id).await?;
        let cost = costing::total_cost(order.total_cost, &service_costs, &estimates);
        let amount = cost.amount();

        order_repo::complete_order(&mut tx, order.id, amount, minutes).await?;

        vehicle_repo::set_status(
            &mut tx,
            order.vehicle_id,
            VehicleStatus::Active,
            order.odometer,
            Some(&format!("Mantenimiento finalizado {}", order.order_number)),
            actor,
        )
        .await?;

        if amount > Decimal::ZERO {
            account_payable_repository::create_for_order(&mut tx, &order, amount, actor).await?;
        }

        tx.commit().await?;

        info!(
            "✅ Orden {} completada: {} minutos, costo total {}",
            order.order_number, minutes, amount
        );

        self.get_by_id(id).await
    }

    /// Cancelar la orden. El stock ya consumido no se repone: los
    /// materiales se consideran usados desde que se abrió la orden.
    pub async fn cancel(
        &self,
        id: Uuid,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let order = self.find_order(id).await?;
        let status = parse_status(&order)?;
        if status.is_terminal() {
            return Err(AppError::PreconditionFailed(
                "La orden ya está completada o cancelada".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        order_repo::update_status(&mut tx, order.id, OrderStatus::Cancelled.as_str()).await?;
        order_repo::insert_timeline_event(
            &mut tx,
            order.id,
            TimelineEvent::Cancelled,
            notes.as_deref(),
            actor,
        )
        .await?;
        vehicle_repo::set_status(
            &mut tx,
            order.vehicle_id,
            VehicleStatus::Active,
            None,
            Some(&format!("Mantenimiento cancelado {}", order.order_number)),
            actor,
        )
        .await?;
        tx.commit().await?;

        info!("🚫 Orden {} cancelada", order.order_number);

        self.get_by_id(id).await
    }

    /// Baja lógica, permitida en cualquier estado. No elimina en cascada
    /// hijas, movimientos de stock ni cuentas por pagar.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.orders.soft_delete(id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<MaintenanceOrderResponse, AppError> {
        let order = self.find_order(id).await?;
        self.build_view(order).await
    }

    pub async fn list(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<MaintenanceOrderListResponse>, AppError> {
        let orders = match branch_id {
            Some(branch_id) => self.orders.list_by_branch(branch_id).await?,
            None => self.orders.list_all().await?,
        };

        Ok(orders
            .into_iter()
            .map(|o| MaintenanceOrderListResponse {
                id: o.id,
                order_number: o.order_number,
                vehicle_id: o.vehicle_id,
                order_type: o.order_type,
                status: o.status,
                total_cost: o.total_cost,
                created_at: o.created_at,
            })
            .collect())
    }

    pub async fn timeline(&self, id: Uuid) -> Result<Vec<TimelineEventResponse>, AppError> {
        let order = self.find_order(id).await?;
        let rows = self.orders.timeline(order.id).await?;
        Ok(rows.into_iter().map(TimelineEventResponse::from).collect())
    }

    async fn find_order(&self, id: Uuid) -> Result<MaintenanceOrder, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orden de mantenimiento no encontrada".to_string()))
    }

    /// Validar y normalizar las colecciones hijas contra empleados,
    /// productos y recambios del vehículo. El stock NO se valida aquí:
    /// eso ocurre dentro de la transacción, con el saldo bloqueado.
    async fn validate_children(
        &self,
        vehicle: &Vehicle,
        workers: &Option<Vec<WorkerInput>>,
        services: &Option<Vec<ServiceInput>>,
        materials: &Option<Vec<MaterialInput>>,
    ) -> Result<ValidatedChildren, AppError> {
        let mut validated_workers = Vec::new();
        if let Some(workers) = workers {
            for worker in workers {
                self.lookups
                    .find_active_employee(worker.employee_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "Empleado {} no encontrado",
                            worker.employee_id
                        ))
                    })?;
                validated_workers.push((worker.employee_id, worker.is_responsible.unwrap_or(false)));
            }
        }

        let mut validated_services = Vec::new();
        if let Some(services) = services {
            for service in services {
                if service.description.trim().is_empty() {
                    return Err(AppError::BadRequest(
                        "La descripción del servicio es requerida".to_string(),
                    ));
                }
                if service.cost < Decimal::ZERO {
                    return Err(AppError::BadRequest(
                        "El costo del servicio no puede ser negativo".to_string(),
                    ));
                }
                validated_services
                    .push((service.description.clone(), round_currency(service.cost)));
            }
        }

        let mut validated_materials = Vec::new();
        if let Some(materials) = materials {
            let replacement_ids: Vec<Uuid> = materials
                .iter()
                .filter_map(|m| m.replacement_item_id)
                .collect();
            let replacement_items = self
                .vehicles
                .replacement_items_by_ids(&replacement_ids)
                .await?;

            for material in materials {
                if material.quantity <= Decimal::ZERO {
                    return Err(AppError::BadRequest(
                        "La cantidad del material debe ser mayor que cero".to_string(),
                    ));
                }

                self.lookups
                    .find_active_product(material.product_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!(
                            "Producto {} no encontrado",
                            material.product_id
                        ))
                    })?;

                if let Some(item_id) = material.replacement_item_id {
                    let item = replacement_items
                        .iter()
                        .find(|i| i.id == item_id)
                        .ok_or_else(|| {
                            AppError::NotFound(format!("Recambio {} no encontrado", item_id))
                        })?;
                    if item.vehicle_id != vehicle.id {
                        return Err(AppError::BadRequest(
                            "El recambio no pertenece al vehículo de la orden".to_string(),
                        ));
                    }
                }

                validated_materials.push(ValidatedMaterial {
                    product_id: material.product_id,
                    quantity: round_quantity(material.quantity),
                    unit_cost_hint: material.unit_cost,
                    replacement_item_id: material.replacement_item_id,
                    item_replaced: material.item_replaced.unwrap_or(false),
                });
            }
        }

        Ok(ValidatedChildren {
            workers: validated_workers,
            services: validated_services,
            materials: validated_materials,
        })
    }

    /// Consumir stock de la sucursal de la orden e insertar las filas de
    /// material con el costo unitario resuelto por el ledger
    async fn consume_and_insert_materials(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: &MaintenanceOrder,
        materials: &[ValidatedMaterial],
        actor: Uuid,
    ) -> Result<(), AppError> {
        for material in materials {
            let unit_cost = stock_repository::reserve_and_consume(
                tx,
                material.product_id,
                order.branch_id,
                material.quantity,
                material.unit_cost_hint,
                Some(order.id),
                actor,
            )
            .await?;

            order_repo::insert_material(
                tx,
                order.id,
                material.product_id,
                material.replacement_item_id,
                material.quantity,
                unit_cost,
                line_total(material.quantity, unit_cost),
            )
            .await?;
        }

        Ok(())
    }

    async fn build_view(
        &self,
        order: MaintenanceOrder,
    ) -> Result<MaintenanceOrderResponse, AppError> {
        let workers = self.orders.workers(order.id).await?;
        let services = self.orders.services(order.id).await?;
        let materials = self.orders.materials(order.id).await?;
        let timeline = self.orders.timeline(order.id).await?;
        let replacement_items = self.orders.replacement_items(order.id).await?;

        let product_ids: Vec<Uuid> = materials.iter().map(|m| m.product_id).collect();
        let products = self.lookups.products_by_ids(&product_ids).await?;

        let service_costs: Vec<Decimal> = services.iter().map(|s| s.cost).collect();
        let estimates: Vec<(Decimal, Decimal)> = materials
            .iter()
            .map(|m| {
                let price = products
                    .iter()
                    .find(|p| p.id == m.product_id)
                    .map(|p| p.unit_price)
                    .unwrap_or(Decimal::ZERO);
                (m.quantity, price)
            })
            .collect();

        let cost = costing::total_cost(order.total_cost, &service_costs, &estimates);
        let minutes = match order.total_time_minutes {
            Some(frozen) => frozen,
            None => costing::elapsed_minutes(&timeline_points(&timeline), Utc::now()),
        };

        Ok(MaintenanceOrderResponse {
            id: order.id,
            order_number: order.order_number,
            vehicle_id: order.vehicle_id,
            order_type: order.order_type,
            status: order.status,
            odometer: order.odometer,
            description: order.description,
            observations: order.observations,
            total_cost: cost.amount(),
            cost_is_frozen: cost.is_frozen(),
            total_time_minutes: minutes,
            attachment_url: order.attachment_url,
            company_id: order.company_id,
            branch_id: order.branch_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
            workers: workers.into_iter().map(Into::into).collect(),
            services: services.into_iter().map(Into::into).collect(),
            materials: materials.into_iter().map(Into::into).collect(),
            replacement_items: replacement_items.into_iter().map(Into::into).collect(),
        })
    }
}

fn parse_status(order: &MaintenanceOrder) -> Result<OrderStatus, AppError> {
    order
        .status()
        .ok_or_else(|| AppError::Internal(format!("Estado de orden desconocido: {}", order.status)))
}

fn timeline_points(rows: &[MaintenanceTimelineRow]) -> Vec<(TimelineEvent, DateTime<Utc>)> {
    rows.iter()
        .filter_map(|row| TimelineEvent::parse(&row.event).map(|event| (event, row.created_at)))
        .collect()
}
