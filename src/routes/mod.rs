pub mod maintenance_order_routes;
pub mod stock_routes;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::utils::errors::AppError;

// TODO: Extraer employee_id del JWT cuando se integre el middleware de auth.
// Por ahora el actor llega en un header propio.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    headers
        .get("x-employee-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| AppError::BadRequest("Header x-employee-id requerido".to_string()))
}
