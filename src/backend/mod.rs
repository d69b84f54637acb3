pub mod client;
pub mod normalize;
pub mod wire;

pub use client::{BackendClient, ClientConfig, ClientError, ClientStats, ConnectionStats};
pub use normalize::normalize_assignments;
pub use wire::{
    GenerateParams, GenerateResponse, InitializeRequest, InitializeResponse, IterateRequest,
    IterateResponse, ResetResponse,
};

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// The operations the clustering backend exposes, plus a liveness check.
///
/// Implemented over HTTP by [`BackendClient`]; mocked in controller tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    async fn generate(&self, params: GenerateParams) -> Result<GenerateResponse, ClientError>;
    async fn initialize(&self, request: InitializeRequest)
    -> Result<InitializeResponse, ClientError>;
    async fn step(&self, request: IterateRequest) -> Result<IterateResponse, ClientError>;
    async fn run(&self, request: IterateRequest) -> Result<IterateResponse, ClientError>;
    async fn reset(&self) -> Result<ResetResponse, ClientError>;
    async fn health_check(&self) -> Result<(), ClientError>;
}
