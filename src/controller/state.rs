use crate::domain::{Assignments, InitMethod, Point};

/// Everything the page shows, mirrored from the latest backend responses.
///
/// Only the controller mutates it; renderers take it by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub(crate) dataset: Vec<Point>,
    pub(crate) k: usize,
    pub(crate) method: InitMethod,
    pub(crate) manual_selection: Vec<Point>,
    pub(crate) centroids: Vec<Point>,
    pub(crate) assignments: Option<Assignments>,
    pub(crate) iteration: u32,
    pub(crate) converged: bool,
}

impl PageState {
    pub fn new(k: usize, method: InitMethod) -> Self {
        Self {
            dataset: Vec::new(),
            k,
            method,
            manual_selection: Vec::new(),
            centroids: Vec::new(),
            assignments: None,
            iteration: 0,
            converged: false,
        }
    }

    pub fn dataset(&self) -> &[Point] {
        &self.dataset
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn method(&self) -> InitMethod {
        self.method
    }

    pub fn manual_selection(&self) -> &[Point] {
        &self.manual_selection
    }

    pub fn selected_count(&self) -> usize {
        self.manual_selection.len()
    }

    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    pub fn assignments(&self) -> Option<&Assignments> {
        self.assignments.as_ref()
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Manual-selection info is shown only in manual mode.
    pub fn shows_manual_info(&self) -> bool {
        self.method.is_manual()
    }

    /// Drop everything derived from the backend. k and method survive.
    pub(crate) fn clear(&mut self) {
        self.dataset.clear();
        self.manual_selection.clear();
        self.centroids.clear();
        self.assignments = None;
        self.iteration = 0;
        self.converged = false;
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(5, InitMethod::default())
    }
}
