use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, Method, Uri},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{authenticate, error_path, require_admin, require_user};
use crate::security::credentials::CredentialStore;
use crate::services::employee_service::EmployeeService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeService>,
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(employees: Arc<dyn EmployeeService>, credentials: CredentialStore) -> Self {
        Self {
            employees,
            credentials: Arc::new(credentials),
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(employee_routes(&state))
        .merge(admin_routes(&state))
        .fallback(endpoint_not_found)
        .with_state(state)
        // Global middleware
        .layer(from_fn(error_path))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(&config.security.cors_origins));

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", strict(get(public::root)))
        .route("/health", strict(get(public::health)))
        .route("/actuator/health", strict(get(public::health)))
        .route("/actuator/info", strict(get(public::info)))
}

fn employee_routes(state: &AppState) -> Router<AppState> {
    use protected::employees as e;

    Router::new()
        .route(
            "/api/v1/employees",
            strict(get(e::collection_get).post(e::collection_post)),
        )
        .route("/api/v1/employees/search", strict(get(e::find_search)))
        .route("/api/v1/employees/count", strict(get(e::find_count)))
        .route("/api/v1/employees/role/:role", strict(get(e::find_by_role)))
        .route(
            "/api/v1/employees/:id",
            strict(
                get(e::record_get)
                    .put(e::record_put)
                    .patch(e::record_patch)
                    .delete(e::record_delete),
            ),
        )
        .route_layer(from_fn_with_state(state.clone(), require_user))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/actuator/caches",
            strict(get(elevated::caches_get).delete(elevated::caches_delete)),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin))
}

/// Answers unsupported methods with the JSON error body instead of a bare 405.
fn strict(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed)
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method.as_str())
}

/// Unknown paths are only reported to authenticated callers.
async fn endpoint_not_found(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> ApiError {
    match authenticate(&state, &headers).await {
        Ok(_) => ApiError::endpoint_not_found(method.as_str(), uri.path()),
        Err(err) => err,
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
        .allow_credentials(true)
}
