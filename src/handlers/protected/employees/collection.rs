use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;

use crate::api::dto::{EmployeeDto, EmployeeListResponse};
use crate::app::AppState;
use crate::database::paging::{PageRequest, SortDirection};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::employee_location;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub page: i32,
    #[serde(default = "default_size")]
    pub size: i32,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

fn default_size() -> i32 {
    10
}

/// GET /api/v1/employees - one page of employees
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<EmployeeListResponse> {
    let Query(query) = query?;
    tracing::info!(
        "Getting employees - page: {}, size: {}, sortBy: {:?}, sortDir: {:?}",
        query.page,
        query.size,
        query.sort_by,
        query.sort_dir
    );

    let sort_by = query.sort_by.as_deref().unwrap_or("id");
    let direction = SortDirection::parse(query.sort_dir.as_deref());
    let request = PageRequest::new(query.page, query.size, Some(sort_by), direction)?;

    let page = state.employees.find_page(&request).await?;
    Ok(ApiResponse::success(EmployeeListResponse::from_page(page)))
}

/// POST /api/v1/employees - create an employee
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<EmployeeDto>, JsonRejection>,
) -> ApiResult<EmployeeDto> {
    let Json(dto) = body?;
    tracing::info!("Creating new employee: {:?}", dto.name);

    dto.validate().map_err(ApiError::request_validation)?;
    let created = state.employees.create(&dto).await?;

    let location = employee_location(created.id);
    Ok(ApiResponse::created(created, location))
}
