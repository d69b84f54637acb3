use crate::controller::PageState;
use crate::domain::InitMethod;
use std::fmt;

/// The labels around the plot: k, iteration, convergence and, in manual
/// mode, how many centroids have been picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPanel {
    pub k: usize,
    pub iteration: u32,
    pub converged: bool,
    pub method: InitMethod,
    pub selected: usize,
    pub points: usize,
    pub centroids: usize,
}

impl StatusPanel {
    pub fn from_state(state: &PageState) -> Self {
        Self {
            k: state.k(),
            iteration: state.iteration(),
            converged: state.is_converged(),
            method: state.method(),
            selected: state.selected_count(),
            points: state.dataset().len(),
            centroids: state.centroids().len(),
        }
    }

    pub fn converged_label(&self) -> &'static str {
        if self.converged { "Yes" } else { "No" }
    }
}

impl fmt::Display for StatusPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k: {} | iteration: {} | converged: {} | method: {} | points: {} | centroids: {}",
            self.k,
            self.iteration,
            self.converged_label(),
            self.method,
            self.points,
            self.centroids
        )?;
        if self.method.is_manual() {
            write!(f, " | selected: {}/{}", self.selected, self.k)?;
        }
        Ok(())
    }
}
