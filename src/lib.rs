#![warn(rust_2018_idioms)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Point counts and pixel positions stay small
    clippy::cast_precision_loss,      // Acceptable for plot coordinates
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. ControllerError in controller module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod app;
pub mod backend;
pub mod controller;
pub mod domain;
pub mod render;

// Re-export main types for easy access
pub use app::{App, Config};
pub use backend::{Backend, BackendClient, ClientConfig, ClientError};
pub use controller::{Controller, ControllerError, PageState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
