mod common;

use anyhow::Result;
use reqwest::{header, Method, StatusCode};
use serde_json::Value;

use common::{expect_error, TestServer, ADMIN};

#[tokio::test]
async fn employees_require_credentials() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.anonymous(Method::GET, "/api/v1/employees").send().await?;
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
    let body = expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    assert_eq!(body["message"], "Authentication required");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .anonymous(Method::GET, "/api/v1/employees/count")
        .basic_auth(ADMIN.0, Some("Wr0ng@Password"))
        .send()
        .await?;
    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;

    let res = server
        .anonymous(Method::GET, "/api/v1/employees/count")
        .header(header::AUTHORIZATION, "Bearer not-a-basic-token")
        .send()
        .await?;
    expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    Ok(())
}

#[tokio::test]
async fn user_and_admin_can_read_employees() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.as_user(Method::GET, "/api/v1/employees/count").send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.as_admin(Method::GET, "/api/v1/employees/count").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn cache_admin_requires_admin_role() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.as_user(Method::GET, "/actuator/caches").send().await?;
    let body = expect_error(res, StatusCode::FORBIDDEN, "FORBIDDEN").await?;
    assert_eq!(body["message"], "Access denied");

    let res = server.anonymous(Method::GET, "/actuator/caches").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.as_admin(Method::GET, "/actuator/caches").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let stats: Value = res.json().await?;
    assert_eq!(stats["enabled"], true);

    let res = server.as_admin(Method::DELETE, "/actuator/caches").send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn unknown_paths_do_not_leak_to_anonymous_callers() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.anonymous(Method::GET, "/api/v1/employees/1/secret").send().await?;
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
    let body = expect_error(res, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await?;
    assert!(body.get("details").is_none());

    let res = server.as_user(Method::GET, "/api/v1/employees/1/secret").send().await?;
    expect_error(res, StatusCode::NOT_FOUND, "ENDPOINT_NOT_FOUND").await?;
    Ok(())
}
