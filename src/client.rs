//! HTTP client for the team board backend.
//!
//! Every call carries the session cookie issued by `POST /login`. The cookie
//! jar can be exported after login and restored on the next run so the CLI
//! keeps its session between invocations.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::*;

/// Default URL for a local backend.
pub const DEFAULT_URL: &str = "http://localhost:6060";

/// HTTP client errors.
///
/// Transport failures, rejected requests and malformed responses each get
/// their own variants so callers can tell them apart.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL '{0}'")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: login required")]
    Unauthorized,

    #[error("Forbidden: session expired or missing")]
    Forbidden,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the server rejected the session (401 or 403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

/// HTTP client for the team board API.
#[derive(Debug, Clone)]
pub struct BoardClient {
    base_url: Url,
    jar: Arc<Jar>,
    client: Client,
}

impl BoardClient {
    /// Create a client for the given base URL with an empty cookie jar.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder().cookie_provider(jar.clone()).build()?;
        Ok(Self {
            base_url,
            jar,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Cookies currently held for the backend, as a `Cookie` header value.
    pub fn export_cookies(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Restore cookies previously produced by [`export_cookies`](Self::export_cookies).
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base_url);
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%method, path, "backend request");
        self.client.request(method, self.url(path))
    }

    /// Map a non-success status to a ClientError.
    async fn error_for(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden,
            _ => ClientError::Server(format!("{}: {}", status, body)),
        }
    }

    /// Handle response, decoding a JSON body on success.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Handle response whose body is not interpreted. Empty bodies become `null`.
    async fn handle_ack(response: reqwest::Response) -> Result<serde_json::Value, ClientError> {
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::Value::String(body)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ClientError> {
        let response = self.request(method, path).json(body).send().await?;
        Self::handle_ack(response).await
    }

    // ============================================================
    // Session Operations
    // ============================================================

    /// Log in; on success the session cookie is stored in the jar.
    pub async fn login(&self, input: &LoginInput) -> Result<(), ClientError> {
        self.send_json(Method::POST, "/login", input).await?;
        Ok(())
    }

    /// Create an employee account.
    pub async fn signup(&self, input: &SignupInput) -> Result<serde_json::Value, ClientError> {
        self.send_json(Method::POST, "/createEmployee", input).await
    }

    /// Ask the server whether the current cookies still authenticate.
    ///
    /// Issues a GET against `probe_path`; 401/403 mean "not authenticated",
    /// any other failure is returned as an error.
    pub async fn check_session(&self, probe_path: &str) -> Result<bool, ClientError> {
        let response = self.request(Method::GET, probe_path).send().await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            _ => Err(Self::error_for(response).await),
        }
    }

    // ============================================================
    // Project Operations
    // ============================================================

    /// List all projects visible to the session.
    pub async fn get_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get("/getproject").await
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: ProjectId) -> Result<Project, ClientError> {
        self.get(&format!("/getProjectById/{}", id)).await
    }

    /// Create a project.
    pub async fn create_project(
        &self,
        input: &CreateProjectInput,
    ) -> Result<serde_json::Value, ClientError> {
        self.send_json(Method::POST, "/addproject", input).await
    }

    /// Replace a project's editable fields.
    pub async fn update_project(
        &self,
        id: ProjectId,
        input: &UpdateProjectInput,
    ) -> Result<(), ClientError> {
        self.send_json(Method::PUT, &format!("/updateProject/{}", id), input)
            .await?;
        Ok(())
    }

    // ============================================================
    // Task Operations
    // ============================================================

    /// List tasks in a project, in backend order.
    pub async fn get_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>, ClientError> {
        self.get(&format!("/gettasks/{}", project_id)).await
    }

    /// Get a task by ID.
    pub async fn get_task(&self, id: TaskId) -> Result<Task, ClientError> {
        self.get(&format!("/gettaskbyid/{}", id)).await
    }

    /// Create a task in a project.
    pub async fn create_task(
        &self,
        project_id: ProjectId,
        input: &CreateTaskInput,
    ) -> Result<serde_json::Value, ClientError> {
        self.send_json(Method::POST, &format!("/createtask/{}", project_id), input)
            .await
    }

    /// Replace a task's editable fields.
    pub async fn update_task(&self, id: TaskId, input: &UpdateTaskInput) -> Result<(), ClientError> {
        self.send_json(Method::PUT, &format!("/updateTask/{}", id), input)
            .await?;
        Ok(())
    }

    // ============================================================
    // Employee & Mapping Operations
    // ============================================================

    /// List all employees.
    pub async fn get_employees(&self) -> Result<Vec<Employee>, ClientError> {
        self.get("/getemployee").await
    }

    /// Submit a bulk task/employee mapping.
    pub async fn map_tasks(&self, request: &MappingRequest) -> Result<MappingAck, ClientError> {
        self.send_json(Method::POST, "/maptasks", request).await
    }
}
