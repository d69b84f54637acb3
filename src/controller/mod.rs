//! Page controller: turns user actions into backend calls and keeps
//! [`PageState`] a faithful mirror of the latest backend response.
//!
//! Every operation validates the response fully before touching state, so a
//! failed call leaves the page exactly as it was.

pub mod error;
pub mod state;
pub mod surface;

pub use error::{Action, ControllerError};
pub use state::PageState;
pub use surface::{InputSurface, SurfaceGuard};

use crate::backend::{
    Backend, ClientError, GenerateParams, InitializeRequest, IterateRequest,
    normalize_assignments,
};
use crate::domain::{InitMethod, Point};
use tracing::{debug, info, warn};

/// What to do when a click picks a point that is already selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Allow,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// k used for the first `/generate` call, before the backend reports one.
    pub initial_k: usize,
    pub samples: usize,
    pub random_state: u64,
    pub method: InitMethod,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        let params = GenerateParams::default();
        Self {
            initial_k: params.centers,
            samples: params.samples,
            random_state: params.random_state,
            method: InitMethod::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

/// Result of a successful `/step` or `/run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationOutcome {
    pub iteration: u32,
    pub converged: bool,
}

pub struct Controller<B> {
    backend: B,
    state: PageState,
    surface: InputSurface,
    options: ControllerOptions,
}

impl<B: Backend> Controller<B> {
    pub fn new(backend: B, options: ControllerOptions) -> Self {
        Self {
            backend,
            state: PageState::new(options.initial_k, options.method),
            surface: InputSurface::new(),
            options,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Shared handle on the input surface.
    pub fn surface(&self) -> InputSurface {
        self.surface.clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parameters the next plain `generate` will send.
    pub fn generate_params(&self) -> GenerateParams {
        GenerateParams {
            centers: self.state.k,
            samples: self.options.samples,
            random_state: self.options.random_state,
        }
    }

    fn begin(&self) -> Result<SurfaceGuard, ControllerError> {
        self.surface.disable().ok_or(ControllerError::Busy)
    }

    fn ensure_enabled(&self) -> Result<(), ControllerError> {
        if self.surface.is_enabled() {
            Ok(())
        } else {
            Err(ControllerError::Busy)
        }
    }

    fn expect_centroids(&self, actual: usize) -> Result<(), ControllerError> {
        if actual == self.state.k {
            Ok(())
        } else {
            Err(ControllerError::UnexpectedCentroidCount {
                expected: self.state.k,
                actual,
            })
        }
    }

    pub async fn generate(&mut self) -> Result<usize, ControllerError> {
        self.generate_with(self.generate_params()).await
    }

    /// Fetch a fresh dataset. Returns the number of points received.
    pub async fn generate_with(&mut self, params: GenerateParams) -> Result<usize, ControllerError> {
        let _guard = self.begin()?;

        let response = self
            .backend
            .generate(params)
            .await
            .map_err(ControllerError::request(Action::Generate))?;

        if response.k == 0 {
            return Err(ControllerError::Request {
                action: Action::Generate,
                source: ClientError::MalformedResponse("k must be positive".to_string()),
            });
        }

        self.options.samples = params.samples;
        self.options.random_state = params.random_state;

        self.state.clear();
        self.state.dataset = response.data;
        self.state.k = response.k;

        info!(
            points = self.state.dataset.len(),
            k = self.state.k,
            "dataset generated"
        );
        Ok(self.state.dataset.len())
    }

    /// Switch initialization method. Always clears the manual selection.
    pub fn change_method(&mut self, method: InitMethod) -> Result<(), ControllerError> {
        self.ensure_enabled()?;
        if self.state.selected_count() > 0 {
            debug!(
                discarded = self.state.selected_count(),
                "clearing manual selection"
            );
        }
        self.state.method = method;
        self.state.manual_selection.clear();
        info!(%method, "initialization method changed");
        Ok(())
    }

    /// Record a clicked data point as a manual centroid.
    ///
    /// Returns the selection count after the pick.
    pub fn select_point(&mut self, point: Point) -> Result<usize, ControllerError> {
        if !self.state.method.is_manual() {
            return Err(ControllerError::NotManualMode);
        }
        self.ensure_enabled()?;

        if self.state.selected_count() >= self.state.k {
            return Err(ControllerError::SelectionFull { k: self.state.k });
        }

        if self.options.duplicate_policy == DuplicatePolicy::Reject
            && self
                .state
                .manual_selection
                .iter()
                .any(|selected| selected.same_position(&point))
        {
            return Err(ControllerError::DuplicateSelection);
        }

        self.state.manual_selection.push(point);
        info!(
            %point,
            selected = self.state.selected_count(),
            k = self.state.k,
            "manual centroid selected"
        );
        Ok(self.state.selected_count())
    }

    /// Pick the dataset point at `index` as a manual centroid.
    pub fn select_index(&mut self, index: usize) -> Result<usize, ControllerError> {
        if !self.state.method.is_manual() {
            return Err(ControllerError::NotManualMode);
        }
        let point = self
            .state
            .dataset
            .get(index)
            .copied()
            .ok_or(ControllerError::NoSuchPoint { index })?;
        self.select_point(point)
    }

    /// Ask the backend for initial centroids. Returns how many came back.
    pub async fn initialize(&mut self) -> Result<usize, ControllerError> {
        let method = self.state.method;
        let manual_centroids = if method.is_manual() {
            if self.state.selected_count() != self.state.k {
                return Err(ControllerError::IncompleteSelection {
                    selected: self.state.selected_count(),
                    k: self.state.k,
                });
            }
            Some(self.state.manual_selection.clone())
        } else {
            None
        };

        let _guard = self.begin()?;

        let response = self
            .backend
            .initialize(InitializeRequest {
                initialization: method,
                manual_centroids,
            })
            .await
            .map_err(ControllerError::request(Action::Initialize))?;

        self.expect_centroids(response.centroids.len())?;
        let assignments =
            normalize_assignments(response.assignments.as_deref(), None, &self.state.dataset);

        self.state.centroids = response.centroids;
        self.state.assignments = assignments;
        self.state.iteration = 0;
        self.state.converged = false;

        info!(%method, centroids = self.state.centroids.len(), "centroids initialized");
        Ok(self.state.centroids.len())
    }

    /// One K-means iteration on the backend.
    pub async fn step(&mut self) -> Result<IterationOutcome, ControllerError> {
        self.iterate(Action::Step).await
    }

    /// Iterate on the backend until it reports convergence.
    pub async fn run(&mut self) -> Result<IterationOutcome, ControllerError> {
        self.iterate(Action::Run).await
    }

    async fn iterate(&mut self, action: Action) -> Result<IterationOutcome, ControllerError> {
        if self.state.converged {
            return Err(ControllerError::AlreadyConverged);
        }

        let request = IterateRequest {
            manual_centroids: self
                .state
                .method
                .is_manual()
                .then(|| self.state.manual_selection.clone()),
            current_centroids: self.state.centroids.clone(),
        };

        let _guard = self.begin()?;

        let response = match action {
            Action::Run => self.backend.run(request).await,
            _ => self.backend.step(request).await,
        }
        .map_err(ControllerError::request(action))?;

        self.expect_centroids(response.centroids.len())?;
        let assignments = normalize_assignments(
            response.assignments.as_deref(),
            response.clusters.as_ref(),
            &self.state.dataset,
        );
        if assignments.is_none() {
            warn!("no valid cluster assignments received from backend");
        }

        self.state.centroids = response.centroids;
        self.state.assignments = assignments;
        self.state.iteration = response.iteration;
        self.state.converged = response.converged;

        info!(
            action = %action,
            iteration = self.state.iteration,
            converged = self.state.converged,
            "iteration applied"
        );
        Ok(IterationOutcome {
            iteration: self.state.iteration,
            converged: self.state.converged,
        })
    }

    /// Reset the backend, then clear the page. Returns the backend's message.
    pub async fn reset(&mut self) -> Result<String, ControllerError> {
        let _guard = self.begin()?;

        let response = self
            .backend
            .reset()
            .await
            .map_err(ControllerError::request(Action::Reset))?;

        self.state.clear();
        info!("page reset");
        Ok(response.message)
    }
}
