//! Domain layer for kmeans-viz.
//!
//! Contains the canonical types shared across all modules:
//! - `Point`: A 2-D coordinate, carried on the wire as `[x, y]`
//! - `InitMethod`: Centroid initialization strategy offered by the backend
//! - `Assignments`: Per-point cluster index, parallel to the dataset
//! - `VizError`: Top-level error type for the binary

pub mod assignment;
pub mod error;
pub mod init_method;
pub mod point;

pub use assignment::Assignments;
pub use error::VizError;
pub use init_method::{InitMethod, UnknownInitMethod};
pub use point::Point;
