use crate::backend::ClientError;
use std::fmt;
use thiserror::Error;

/// The backend call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Initialize,
    Step,
    Run,
    Reset,
}

impl Action {
    fn describe(&self) -> &'static str {
        match self {
            Action::Generate => "generate dataset",
            Action::Initialize => "initialize centroids",
            Action::Step => "perform step",
            Action::Run => "run to convergence",
            Action::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Failed to {action}: {source}")]
    Request {
        action: Action,
        #[source]
        source: ClientError,
    },

    #[error("The algorithm has already converged.")]
    AlreadyConverged,

    #[error("Please select exactly {k} centroids.")]
    IncompleteSelection { selected: usize, k: usize },

    #[error("You have already selected {k} centroids.")]
    SelectionFull { k: usize },

    #[error("This point is already selected as a centroid.")]
    DuplicateSelection,

    #[error("Centroids can only be picked when the initialization method is manual.")]
    NotManualMode,

    #[error("No data point at index {index}.")]
    NoSuchPoint { index: usize },

    #[error("Another request is still in progress.")]
    Busy,

    #[error("Backend returned {actual} centroids, expected {expected}.")]
    UnexpectedCentroidCount { expected: usize, actual: usize },
}

impl ControllerError {
    pub(crate) fn request(action: Action) -> impl FnOnce(ClientError) -> Self {
        move |source| ControllerError::Request { action, source }
    }

    /// Text shown to the user in the blocking alert.
    ///
    /// Backend-reported failures show the backend's own message; transport
    /// and decoding failures show a generic line for the action.
    pub fn alert_message(&self) -> String {
        match self {
            ControllerError::Request { action, source } => match source.backend_message() {
                Some(message) => message.to_string(),
                None => format!("Failed to {action}."),
            },
            other => other.to_string(),
        }
    }
}
