use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use crate::api::dto::EmployeeListResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
    pub role: Option<String>,
}

/// GET /api/v1/employees/search?name=&role=
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<EmployeeListResponse> {
    let Query(query) = query?;
    tracing::info!("Searching employees by name: {:?}, role: {:?}", query.name, query.role);

    let employees = state
        .employees
        .search(&query.name, query.role.as_deref())
        .await?;
    Ok(ApiResponse::success(EmployeeListResponse::unpaged(employees)))
}

/// GET /api/v1/employees/role/:role
pub async fn by_role(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<EmployeeListResponse> {
    let Path(role) = path?;
    tracing::info!("Getting employees by role: {:?}", role);

    let employees = state.employees.find_by_role(&role).await?;
    Ok(ApiResponse::success(EmployeeListResponse::unpaged(employees)))
}

/// GET /api/v1/employees/count - bare number
pub async fn count(State(state): State<AppState>) -> Result<Json<i64>, ApiError> {
    let count = state.employees.count().await?;
    Ok(Json(count))
}
