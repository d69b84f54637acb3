use super::wire::{
    ErrorBody, GenerateParams, GenerateResponse, InitializeRequest, InitializeResponse,
    IterateRequest, IterateResponse, ResetResponse,
};
use super::Backend;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Request timeout: {0}")]
    RequestTimeout(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// The message the backend put in its `error` field, if this failure
    /// came from the backend rather than the transport.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Backend { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub max_connections: usize,
    pub keep_alive_timeout: Duration,
    pub user_agent: String,
    pub enable_compression: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            max_connections: 4,
            keep_alive_timeout: Duration::from_secs(60),
            user_agent: format!("kmeans-viz/{}", env!("CARGO_PKG_VERSION")),
            enable_compression: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_time: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// HTTP client for the clustering backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    config: ClientConfig,
    base_url: Url,
    stats: Arc<ClientStats>,
}

impl BackendClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url: Url = config.endpoint.parse().map_err(|e| {
            ClientError::InvalidConfiguration(format!("Invalid backend URL: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidConfiguration(format!(
                "Backend URL cannot be used as a base: {base_url}"
            )));
        }

        let mut client_builder = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .pool_max_idle_per_host(config.max_connections)
            .pool_idle_timeout(config.keep_alive_timeout)
            .user_agent(&config.user_agent);

        if config.enable_compression {
            client_builder = client_builder.gzip(true);
        }

        let client = client_builder.build().map_err(|e| {
            ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            config,
            base_url,
            stats: Arc::new(ClientStats::new()),
        })
    }

    /// Resolve a route relative to the configured base, keeping any path
    /// prefix the base URL carries.
    pub fn route(&self, route: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}/{}", route.trim_start_matches('/')));
        url.set_query(None);
        url
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        let total_requests = self.stats.total_requests.load(Ordering::Relaxed);
        let successful_requests = self.stats.successful_requests.load(Ordering::Relaxed);
        let failed_requests = self.stats.failed_requests.load(Ordering::Relaxed);
        let total_response_time = self.stats.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        ConnectionStats {
            total_requests,
            successful_requests,
            failed_requests,
            average_response_time,
        }
    }

    async fn request_health(&self) -> Result<(), ClientError> {
        let response = timeout(self.config.timeout, self.client.get(self.route("test")).send())
            .await
            .map_err(|_| ClientError::RequestTimeout("Health check timeout".to_string()))?
            .map_err(ClientError::Network)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Backend {
                status: status.as_u16(),
                message: format!("Health check failed: {status}"),
            })
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        route: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let start = Instant::now();
        let result = self.execute_inner(route, request).await;
        self.stats.record_request(result.is_ok(), start.elapsed());
        result
    }

    async fn execute_inner<T: DeserializeOwned>(
        &self,
        route: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| {
                ClientError::RequestTimeout(format!(
                    "/{route} did not answer within {:?}",
                    self.config.timeout
                ))
            })?
            .map_err(ClientError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(ClientError::Network)?;
        debug!(route, status = status.as_u16(), bytes = body.len(), "backend responded");

        if !status.is_success() {
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message: failure_message(status, &body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::MalformedResponse(format!("/{route}: {e}")))
    }
}

/// The backend's `error` field when present, otherwise the status text.
fn failure_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => error,
        Err(_) => format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        ),
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn generate(&self, params: GenerateParams) -> Result<GenerateResponse, ClientError> {
        debug!(?params, "requesting dataset");
        let request = self.client.get(self.route("generate")).query(&params);
        self.execute("generate", request).await
    }

    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, ClientError> {
        debug!(method = %request.initialization, "initializing centroids");
        let request = self.client.post(self.route("initialize")).json(&request);
        self.execute("initialize", request).await
    }

    async fn step(&self, request: IterateRequest) -> Result<IterateResponse, ClientError> {
        let request = self.client.post(self.route("step")).json(&request);
        self.execute("step", request).await
    }

    async fn run(&self, request: IterateRequest) -> Result<IterateResponse, ClientError> {
        let request = self.client.post(self.route("run")).json(&request);
        self.execute("run", request).await
    }

    async fn reset(&self) -> Result<ResetResponse, ClientError> {
        let request = self.client.post(self.route("reset"));
        self.execute("reset", request).await
    }

    /// Call the backend's `/test` route. Every outcome is counted in the
    /// connection stats, including timeouts and refused connections.
    async fn health_check(&self) -> Result<(), ClientError> {
        let start = Instant::now();
        let result = self.request_health().await;
        self.stats.record_request(result.is_ok(), start.elapsed());
        result
    }
}
