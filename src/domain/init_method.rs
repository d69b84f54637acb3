use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Centroid initialization strategy understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum InitMethod {
    #[serde(rename = "random")]
    #[value(name = "random")]
    Random,
    #[serde(rename = "farthest")]
    #[value(name = "farthest")]
    Farthest,
    #[default]
    #[serde(rename = "kmeans++")]
    #[value(name = "kmeans++")]
    KMeansPlusPlus,
    /// Centroids are picked by clicking data points.
    #[serde(rename = "manual")]
    #[value(name = "manual")]
    Manual,
}

impl InitMethod {
    pub const ALL: [InitMethod; 4] = [
        InitMethod::Random,
        InitMethod::Farthest,
        InitMethod::KMeansPlusPlus,
        InitMethod::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InitMethod::Random => "random",
            InitMethod::Farthest => "farthest",
            InitMethod::KMeansPlusPlus => "kmeans++",
            InitMethod::Manual => "manual",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, InitMethod::Manual)
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown initialization method '{0}'. Valid values: random, farthest, kmeans++, manual")]
pub struct UnknownInitMethod(pub String);

impl FromStr for InitMethod {
    type Err = UnknownInitMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == lowered)
            .ok_or_else(|| UnknownInitMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_backend() {
        assert_eq!(
            serde_json::to_string(&InitMethod::KMeansPlusPlus).unwrap(),
            "\"kmeans++\""
        );
        assert_eq!(serde_json::to_string(&InitMethod::Manual).unwrap(), "\"manual\"");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Farthest".parse::<InitMethod>(), Ok(InitMethod::Farthest));
        assert_eq!(" KMEANS++ ".parse::<InitMethod>(), Ok(InitMethod::KMeansPlusPlus));
        assert!("lloyd".parse::<InitMethod>().is_err());
    }
}
