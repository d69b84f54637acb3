//! Request and response bodies of the backend's JSON contract.

use crate::domain::{InitMethod, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query string of `GET /generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerateParams {
    pub centers: usize,
    pub samples: usize,
    pub random_state: u64,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            centers: 5,
            samples: 100,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateResponse {
    pub data: Vec<Point>,
    pub k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeRequest {
    pub initialization: InitMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_centroids: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitializeResponse {
    pub centroids: Vec<Point>,
    #[serde(default)]
    pub assignments: Option<Vec<i64>>,
    #[serde(default)]
    pub iteration: Option<u32>,
}

/// Body of `POST /step` and `POST /run`.
///
/// `manual_centroids` is sent as an explicit `null` outside manual mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterateRequest {
    pub manual_centroids: Option<Vec<Point>>,
    pub current_centroids: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IterateResponse {
    pub centroids: Vec<Point>,
    #[serde(default)]
    pub assignments: Option<Vec<i64>>,
    /// Grouped form: cluster id (stringified) to member points.
    #[serde(default)]
    pub clusters: Option<BTreeMap<String, Vec<Point>>>,
    #[serde(default)]
    pub iteration: u32,
    #[serde(default)]
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResetResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
