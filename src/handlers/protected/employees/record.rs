use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::api::dto::EmployeeDto;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::employee_service::UpdateOutcome;

use super::{employee_id, employee_location};

/// GET /api/v1/employees/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<EmployeeDto> {
    let id = employee_id(path)?;
    tracing::info!("Getting employee with id: {}", id);

    let dto = state
        .employees
        .find_by_id(id)
        .await?
        .ok_or(ApiError::EmployeeNotFound(id))?;
    Ok(ApiResponse::success(dto))
}

/// PUT /api/v1/employees/:id - replace, or create when the id is unknown
pub async fn put(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EmployeeDto>, JsonRejection>,
) -> ApiResult<EmployeeDto> {
    let id = employee_id(path)?;
    let Json(dto) = body?;
    tracing::info!("Updating employee with id: {}", id);

    dto.validate().map_err(ApiError::request_validation)?;
    match state.employees.update(id, &dto).await? {
        UpdateOutcome::Updated(updated) => Ok(ApiResponse::success(updated)),
        UpdateOutcome::Created(created) => {
            let location = employee_location(created.id);
            Ok(ApiResponse::created(created, location))
        }
    }
}

/// PATCH /api/v1/employees/:id - update only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EmployeeDto>, JsonRejection>,
) -> ApiResult<EmployeeDto> {
    let id = employee_id(path)?;
    let Json(dto) = body?;
    tracing::info!("Partially updating employee with id: {}", id);

    let updated = state
        .employees
        .partial_update(id, &dto)
        .await?
        .ok_or(ApiError::EmployeeNotFound(id))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/employees/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = employee_id(path)?;
    tracing::info!("Deleting employee with id: {}", id);

    if !state.employees.delete_by_id(id).await? {
        return Err(ApiError::EmployeeNotFound(id));
    }
    Ok(ApiResponse::<()>::no_content())
}
