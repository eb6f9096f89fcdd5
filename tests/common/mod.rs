#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use employee_api::app::{app, AppState};
use employee_api::config::{AppConfig, PasswordHashConfig};
use employee_api::database::InMemoryEmployeeRepository;
use employee_api::security::CredentialStore;
use employee_api::services::{EmployeeCache, EmployeeServiceImpl};

pub const ADMIN: (&str, &str) = ("admin", "Adm1n@Secret");
pub const USER: (&str, &str) = ("user", "Us3r!Secret");

/// Router served on an ephemeral port with a fresh in-memory store.
pub struct TestServer {
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        config.security.admin.password = Some(ADMIN.1.to_string());
        config.security.user.password = Some(USER.1.to_string());
        config.security.password_hash = PasswordHashConfig { memory_kib: 64, iterations: 1 };
        config.validate().context("test configuration is invalid")?;

        let service = EmployeeServiceImpl::new(
            Arc::new(InMemoryEmployeeRepository::new()),
            EmployeeCache::new(config.cache.enabled),
        );
        let credentials = CredentialStore::from_config(&config.security)?;
        let state = AppState::new(Arc::new(service), credentials);
        let router = app(state, &config);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        Ok(Self { base_url, client: reqwest::Client::new() })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request without credentials
    pub fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub fn as_user(&self, method: Method, path: &str) -> RequestBuilder {
        self.anonymous(method, path).basic_auth(USER.0, Some(USER.1))
    }

    pub fn as_admin(&self, method: Method, path: &str) -> RequestBuilder {
        self.anonymous(method, path).basic_auth(ADMIN.0, Some(ADMIN.1))
    }

    /// Creates an employee as the regular user and returns the response body.
    pub async fn create(&self, name: &str, role: &str) -> Result<Value> {
        let res = self
            .as_user(Method::POST, "/api/v1/employees")
            .json(&json!({ "name": name, "role": role }))
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "create returned {}",
            res.status()
        );
        Ok(res.json().await?)
    }
}

/// Asserts the common error envelope and returns the body for further checks.
pub async fn expect_error(res: reqwest::Response, status: StatusCode, code: &str) -> Result<Value> {
    assert_eq!(res.status(), status, "unexpected status");
    let path = res.url().path().to_string();
    let body: Value = res.json().await?;
    assert_eq!(body["path"], path.as_str(), "body: {body}");
    assert_eq!(body["status"], status.as_u16());
    assert_eq!(body["error"], code, "body: {body}");
    assert_eq!(body["traceId"].as_str().map(str::len), Some(12));
    assert!(body["timestamp"].is_string());
    Ok(body)
}
