use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::security::credentials::{Principal, Role};

/// Requires valid credentials carrying the USER role.
pub async fn require_user(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(&state, Role::User, request, next).await
}

/// Requires valid credentials carrying the ADMIN role.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(&state, Role::Admin, request, next).await
}

async fn authorize(
    state: &AppState,
    role: Role,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Body is not Sync, so the request must not be borrowed across the await
    let headers = request.headers().clone();
    let principal = authenticate(state, &headers).await?;

    if !principal.has_role(role) {
        tracing::warn!(
            "Access denied for user {:?} on {} {}: requires role {}",
            principal.username,
            request.method(),
            request.uri().path(),
            role
        );
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Resolves Basic credentials to a principal, or 401.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let (username, password) = extract_basic_credentials(headers).map_err(|msg| {
        tracing::debug!("Rejected credentials: {}", msg);
        ApiError::Unauthorized
    })?;

    // Argon2 verification is CPU-bound
    let credentials = Arc::clone(&state.credentials);
    let name = username.clone();
    let verified = tokio::task::spawn_blocking(move || credentials.verify(&name, &password))
        .await
        .map_err(|e| {
            tracing::error!("Credential check panicked: {}", e);
            ApiError::InternalServerError
        })?;

    verified.ok_or_else(|| {
        tracing::warn!("Authentication failed for user {:?}", username);
        ApiError::Unauthorized
    })
}

/// Extract username and password from a `Basic` Authorization header
pub fn extract_basic_credentials(headers: &HeaderMap) -> Result<(String, String), &'static str> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, encoded) = auth_str
        .split_once(' ')
        .ok_or("Authorization header must use Basic format")?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err("Authorization header must use Basic format");
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| "Invalid base64 in Basic credentials")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "Basic credentials are not UTF-8")?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or("Basic credentials must be username:password")?;
    if username.is_empty() {
        return Err("Empty username");
    }

    Ok((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn parses_basic_header() {
        let creds = extract_basic_credentials(&headers(&basic("admin:Adm1n@Secret"))).unwrap();
        assert_eq!(creds, ("admin".to_string(), "Adm1n@Secret".to_string()));
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = extract_basic_credentials(&headers(&basic("user:a:b:c"))).unwrap();
        assert_eq!(creds.1, "a:b:c");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let value = format!("basic {}", STANDARD.encode("user:pw"));
        assert!(extract_basic_credentials(&headers(&value)).is_ok());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(extract_basic_credentials(&HeaderMap::new()).is_err());
        assert!(extract_basic_credentials(&headers("Bearer abc.def.ghi")).is_err());
        assert!(extract_basic_credentials(&headers("Basic !!!")).is_err());
        assert!(extract_basic_credentials(&headers(&basic("no-colon"))).is_err());
        assert!(extract_basic_credentials(&headers(&basic(":password"))).is_err());
        assert!(extract_basic_credentials(&headers("Basic")).is_err());
    }
}
