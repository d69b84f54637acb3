//! Plot rendering: a backend-agnostic chart model built from [`PageState`],
//! an SVG writer and the status line shown next to the plot.
//!
//! [`PageState`]: crate::controller::PageState

pub mod chart;
pub mod palette;
pub mod status;
pub mod svg;

pub use chart::{ChartModel, MarkerStyle, PlotPoint, Series, SeriesKind};
pub use status::StatusPanel;
pub use svg::{SvgOptions, Viewport, render_svg, write_svg};
