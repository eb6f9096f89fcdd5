// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::dto::{ErrorResponse, FieldError};
use crate::database::manager::DatabaseError;
use crate::security::sanitizer::InvalidInput;
use crate::services::employee_service::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        details: Option<String>,
        field_errors: Vec<FieldError>,
    },
    MalformedJson,
    TypeMismatch(String),
    MissingParameter(String),
    ConstraintViolation(String),

    // 401 Unauthorized
    Unauthorized,

    // 403 Forbidden
    Forbidden,

    // 404 Not Found
    EmployeeNotFound(i64),
    EndpointNotFound { method: String, path: String },

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(i64),

    // 413 Payload Too Large
    PayloadTooLarge,

    // 415 Unsupported Media Type
    UnsupportedMediaType,

    // 500 Internal Server Error
    InternalServerError,

    // 503 Service Unavailable
    ServiceUnavailable,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::MalformedJson => 400,
            ApiError::TypeMismatch(_) => 400,
            ApiError::MissingParameter(_) => 400,
            ApiError::ConstraintViolation(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::Forbidden => 403,
            ApiError::EmployeeNotFound(_) => 404,
            ApiError::EndpointNotFound { .. } => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge => 413,
            ApiError::UnsupportedMediaType => 415,
            ApiError::InternalServerError => 500,
            ApiError::ServiceUnavailable => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::MalformedJson => "Request body is not readable",
            ApiError::TypeMismatch(_) => "Parameter type mismatch",
            ApiError::MissingParameter(_) => "Required parameter missing",
            ApiError::ConstraintViolation(_) => "Constraint validation failed",
            ApiError::Unauthorized => "Authentication required",
            ApiError::Forbidden => "Access denied",
            ApiError::EmployeeNotFound(_) => "Employee not found",
            ApiError::EndpointNotFound { .. } => "Endpoint not found",
            ApiError::MethodNotAllowed(_) => "HTTP method not supported",
            ApiError::Conflict(_) => "Employee was modified concurrently",
            ApiError::PayloadTooLarge => "Request body too large",
            ApiError::UnsupportedMediaType => "Media type not supported",
            ApiError::InternalServerError => "An unexpected error occurred",
            ApiError::ServiceUnavailable => "Service temporarily unavailable",
        }
    }

    /// Longer explanation shown in the `details` field
    pub fn details(&self) -> Option<String> {
        match self {
            ApiError::ValidationError { details, .. } => details.clone(),
            ApiError::MalformedJson => {
                Some("The request body contains malformed JSON or is not readable".to_string())
            }
            ApiError::TypeMismatch(details) => Some(details.clone()),
            ApiError::MissingParameter(name) => {
                Some(format!("Required parameter '{}' is missing", name))
            }
            ApiError::ConstraintViolation(details) => Some(details.clone()),
            ApiError::EmployeeNotFound(id) => Some(format!("Could not find employee with id: {}", id)),
            ApiError::EndpointNotFound { method, path } => {
                Some(format!("No handler found for {} {}", method, path))
            }
            ApiError::MethodNotAllowed(method) => {
                Some(format!("Request method '{}' is not supported", method))
            }
            ApiError::Conflict(id) => Some(format!(
                "Employee {} was changed by another request; reload it and retry",
                id
            )),
            ApiError::UnsupportedMediaType => Some("Content-Type must be application/json".to_string()),
            ApiError::InternalServerError => Some("Please contact support with the trace ID".to_string()),
            ApiError::ServiceUnavailable => Some("The employee store is not reachable".to_string()),
            ApiError::Unauthorized | ApiError::Forbidden | ApiError::PayloadTooLarge => None,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::MalformedJson => "MALFORMED_JSON",
            ApiError::TypeMismatch(_) => "TYPE_MISMATCH",
            ApiError::MissingParameter(_) => "MISSING_PARAMETER",
            ApiError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            ApiError::EndpointNotFound { .. } => "ENDPOINT_NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::InternalServerError => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        let field_errors = match self {
            ApiError::ValidationError { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors.clone())
            }
            _ => None,
        };

        ErrorResponse {
            status: self.status_code(),
            error: self.error_code(),
            message: self.message().to_string(),
            details: self.details(),
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            path: None,
            field_errors,
            trace_id: new_trace_id(),
        }
    }
}

/// Short correlation id: the first 12 hex digits of a random UUID.
pub fn new_trace_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

impl ApiError {
    /// Sanitizer rejection for a single field
    pub fn invalid_input(err: InvalidInput) -> Self {
        let field_errors = err
            .field
            .map(|field| vec![FieldError::new(field, None, err.message.clone())])
            .unwrap_or_default();
        ApiError::ValidationError {
            message: "Validation failed".to_string(),
            details: Some(err.message),
            field_errors,
        }
    }

    /// Request body failed bean-style checks
    pub fn request_validation(field_errors: Vec<FieldError>) -> Self {
        ApiError::ValidationError {
            message: "Request validation failed".to_string(),
            details: Some("One or more fields have validation errors".to_string()),
            field_errors,
        }
    }

    pub fn constraint_violation(details: impl Into<String>) -> Self {
        ApiError::ConstraintViolation(details.into())
    }

    pub fn type_mismatch(details: impl Into<String>) -> Self {
        ApiError::TypeMismatch(details.into())
    }

    pub fn missing_parameter(name: impl Into<String>) -> Self {
        ApiError::MissingParameter(name.into())
    }

    pub fn endpoint_not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        ApiError::EndpointNotFound { method: method.into(), path: path.into() }
    }

    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(method.into())
    }
}

// Convert other error types to ApiError
impl From<InvalidInput> for ApiError {
    fn from(err: InvalidInput) -> Self {
        ApiError::invalid_input(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::OptimisticLock { id } => ApiError::Conflict(id),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::ServiceUnavailable
            }
            err if err.is_unavailable() => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::ServiceUnavailable
            }
            err => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", err);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(e) => e.into(),
            ServiceError::NotFound(id) => ApiError::EmployeeNotFound(id),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType,
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                ApiError::MalformedJson
            }
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            _ => ApiError::MalformedJson,
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameters: {}", rejection.body_text());
        ApiError::type_mismatch("Path parameter has the wrong type")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        match missing_field_name(&text) {
            Some(name) => ApiError::missing_parameter(name),
            None => {
                tracing::debug!("Rejected query string: {}", text);
                ApiError::type_mismatch("One or more query parameters have the wrong type")
            }
        }
    }
}

/// Extracts `name` from serde's "missing field `name`" message.
fn missing_field_name(text: &str) -> Option<&str> {
    let rest = &text[text.find("missing field `")? + "missing field `".len()..];
    rest.split('`').next().filter(|name| !name.is_empty())
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.to_body();

        if status.is_server_error() {
            tracing::error!(trace_id = %body.trace_id, "{} {}", body.error, body.message);
        } else {
            tracing::debug!(trace_id = %body.trace_id, "{} {}", body.error, body.message);
        }

        let mut response = (status, Json(body.clone())).into_response();
        // Picked up by `error_path` to add the request path
        response.extensions_mut().insert(body);
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"employee-api\""),
            );
        }
        response
    }
}
