#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use noteful_api::{app, config::AppConfig, AppState};

pub const PASSWORD: &str = "password123";

/// The real router served from a background task on an unused port
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::with_config(AppConfig::testing()).await
    }

    pub async fn with_config(mut config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;

        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .context("failed to bind test listener")?;
        let state = AppState::open(config).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/users"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Register `username` with the default password and return a bearer token
    pub async fn user(&self, username: &str) -> Result<String> {
        let res = self.register(username, PASSWORD).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register {}: {}", username, res.status());

        let res = self.login(username, PASSWORD).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login {}: {}", username, res.status());
        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?)
    }

    pub async fn delete(&self, token: &str, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }

    /// POST that must answer 201; returns the body
    pub async fn create(&self, token: &str, path: &str, body: Value) -> Result<Value> {
        let res = self.post(token, path, body).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "POST {}: {}", path, res.status());
        Ok(res.json().await?)
    }
}

/// The `id` of a created resource as a string
pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}
