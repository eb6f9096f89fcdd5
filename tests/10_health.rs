mod common;

use anyhow::Result;
use reqwest::{header, Method, StatusCode};
use serde_json::Value;

use common::{expect_error, TestServer};

#[tokio::test]
async fn health_endpoints_are_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/health", "/actuator/health"] {
        let res = server.anonymous(Method::GET, path).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "UP");
    }
    Ok(())
}

#[tokio::test]
async fn info_and_root_describe_the_service() -> Result<()> {
    let server = TestServer::spawn().await?;

    let info: Value = server.anonymous(Method::GET, "/actuator/info").send().await?.json().await?;
    assert_eq!(info["app"]["name"], "employee-api");

    let root: Value = server.anonymous(Method::GET, "/").send().await?.json().await?;
    assert!(root["endpoints"]["employees"].is_string());
    Ok(())
}

#[tokio::test]
async fn responses_carry_security_headers() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.anonymous(Method::GET, "/health").send().await?;
    assert_eq!(res.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(res.headers()[header::X_FRAME_OPTIONS], "DENY");
    Ok(())
}

#[tokio::test]
async fn unknown_endpoint_uses_error_body() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.as_user(Method::GET, "/api/v2/nothing?x=1").send().await?;
    let body = expect_error(res, StatusCode::NOT_FOUND, "ENDPOINT_NOT_FOUND").await?;
    assert_eq!(body["details"], "No handler found for GET /api/v2/nothing");
    assert_eq!(body["path"], "/api/v2/nothing");
    Ok(())
}

#[tokio::test]
async fn cors_allows_configured_origins_only() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .anonymous(Method::OPTIONS, "/api/v1/employees")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .send()
        .await?;
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let res = server
        .anonymous(Method::OPTIONS, "/api/v1/employees")
        .header(header::ORIGIN, "http://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .send()
        .await?;
    assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    Ok(())
}
