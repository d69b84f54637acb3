use super::alert::AlertSink;
use crate::backend::{Backend, GenerateParams};
use crate::controller::{Controller, ControllerError, IterationOutcome};
use crate::domain::{InitMethod, Point, UnknownInitMethod};
use crate::render::{ChartModel, StatusPanel, SvgOptions, write_svg};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  generate [centers] [samples] [random_state]  fetch a new dataset
  method <random|farthest|kmeans++|manual>     change initialization method
  click <x> <y>                                click the plot (manual mode)
  pick <index>                                 select dataset point by index (manual mode)
  init                                         initialize centroids
  step                                         run one iteration
  run                                          iterate until convergence
  reset                                        reset backend and page
  status                                       show k, iteration and convergence
  plot [path]                                  write the plot as SVG
  health                                       check the backend is reachable
  help                                         show this text
  quit                                         leave";

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands.")]
    Unknown(String),
    #[error("'{command}' needs a {argument}.")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("Invalid {argument} '{value}'.")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },
    #[error("'{0}' takes fewer arguments.")]
    TooManyArguments(&'static str),
    #[error(transparent)]
    Method(#[from] UnknownInitMethod),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate {
        centers: Option<usize>,
        samples: Option<usize>,
        random_state: Option<u64>,
    },
    Method(InitMethod),
    Click {
        x: f64,
        y: f64,
    },
    Pick(usize),
    Init,
    Step,
    Run,
    Reset,
    Status,
    Plot(Option<PathBuf>),
    Health,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

fn parse_arg<T: FromStr>(argument: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        argument,
        value: value.to_string(),
    })
}

fn optional_arg<T: FromStr>(
    argument: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, CommandError> {
    value.map(|v| parse_arg(argument, v)).transpose()
}

fn required_arg<T: FromStr>(
    command: &'static str,
    argument: &'static str,
    value: Option<&str>,
) -> Result<T, CommandError> {
    let value = value.ok_or(CommandError::MissingArgument { command, argument })?;
    parse_arg(argument, value)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_lowercase();

        let (command, max_args) = match name.as_str() {
            "generate" | "gen" => {
                let centers = optional_arg("center count", words.next())?;
                let samples = optional_arg("sample count", words.next())?;
                let random_state = optional_arg("random state", words.next())?;
                (
                    Command::Generate {
                        centers,
                        samples,
                        random_state,
                    },
                    "generate",
                )
            }
            "method" => {
                let value = words.next().ok_or(CommandError::MissingArgument {
                    command: "method",
                    argument: "method name",
                })?;
                (Command::Method(value.parse()?), "method")
            }
            "click" => {
                let x = required_arg("click", "x coordinate", words.next())?;
                let y = required_arg("click", "y coordinate", words.next())?;
                (Command::Click { x, y }, "click")
            }
            "pick" => (
                Command::Pick(required_arg("pick", "point index", words.next())?),
                "pick",
            ),
            "init" | "initialize" => (Command::Init, "init"),
            "step" => (Command::Step, "step"),
            "run" => (Command::Run, "run"),
            "reset" => (Command::Reset, "reset"),
            "status" => (Command::Status, "status"),
            "plot" => (Command::Plot(words.next().map(PathBuf::from)), "plot"),
            "health" => (Command::Health, "health"),
            "help" | "?" => (Command::Help, "help"),
            "quit" | "exit" => (Command::Quit, "quit"),
            _ => return Err(CommandError::Unknown(name)),
        };

        if words.next().is_some() {
            return Err(CommandError::TooManyArguments(max_args));
        }
        Ok(command)
    }
}

/// Drives a [`Controller`] from text commands and redraws after each change.
pub struct Shell<B, S> {
    controller: Controller<B>,
    sink: S,
    svg_output: Option<PathBuf>,
    svg_options: SvgOptions,
    /// Click hit radius in data units.
    click_tolerance: f64,
}

impl<B: Backend, S: AlertSink> Shell<B, S> {
    pub fn new(controller: Controller<B>, sink: S, svg_output: Option<PathBuf>) -> Self {
        Self {
            controller,
            sink,
            svg_output,
            svg_options: SvgOptions::default(),
            click_tolerance: 0.1,
        }
    }

    pub fn with_click_tolerance(mut self, tolerance: f64) -> Self {
        self.click_tolerance = tolerance;
        self
    }

    pub fn controller(&self) -> &Controller<B> {
        &self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (Controller<B>, S) {
        (self.controller, self.sink)
    }

    /// Read and execute commands until `quit` or end of input.
    pub async fn run_lines<R>(&mut self, reader: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse_line(&line) {
                Ok(None) => {}
                Ok(Some(command)) => {
                    if self.execute(command).await.is_break() {
                        break;
                    }
                }
                Err(e) => self.sink.alert(&e.to_string()),
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> ControlFlow<()> {
        debug!(?command, "executing command");
        match command {
            Command::Generate {
                centers,
                samples,
                random_state,
            } => {
                let defaults = self.controller.generate_params();
                let params = GenerateParams {
                    centers: centers.unwrap_or(defaults.centers),
                    samples: samples.unwrap_or(defaults.samples),
                    random_state: random_state.unwrap_or(defaults.random_state),
                };
                match self.controller.generate_with(params).await {
                    Ok(points) => {
                        let k = self.controller.state().k();
                        self.sink
                            .info(&format!("Generated {points} points (k = {k})."));
                        self.redraw();
                    }
                    Err(e) => self.fail(&e),
                }
            }
            Command::Method(method) => match self.controller.change_method(method) {
                Ok(()) => {
                    self.sink.info(&format!("Initialization method: {method}."));
                    if method.is_manual() {
                        let state = self.controller.state();
                        self.sink.info(&format!(
                            "Pick {} centroids with 'click' or 'pick' (selected 0/{}).",
                            state.k(),
                            state.k()
                        ));
                    }
                    self.redraw();
                }
                Err(e) => self.fail(&e),
            },
            Command::Click { x, y } => self.click(Point::new(x, y)),
            Command::Pick(index) => match self.controller.select_index(index) {
                Ok(selected) => self.selected(selected),
                Err(e) => self.fail(&e),
            },
            Command::Init => match self.controller.initialize().await {
                Ok(count) => {
                    self.sink.info(&format!("Initialized {count} centroids."));
                    self.redraw();
                }
                Err(e) => self.fail(&e),
            },
            Command::Step => {
                let result = self.controller.step().await;
                self.iterated(result);
            }
            Command::Run => {
                let result = self.controller.run().await;
                self.iterated(result);
            }
            Command::Reset => match self.controller.reset().await {
                Ok(message) => {
                    self.redraw();
                    self.sink.alert(&message);
                }
                Err(e) => self.fail(&e),
            },
            Command::Status => {
                let status = StatusPanel::from_state(self.controller.state());
                self.sink.info(&status.to_string());
            }
            Command::Plot(path) => match path.or_else(|| self.svg_output.clone()) {
                Some(path) => {
                    if self.write_plot(&path) {
                        self.sink.info(&format!("Plot written to {}.", path.display()));
                    }
                }
                None => self
                    .sink
                    .alert("No output path given and no --svg-output configured."),
            },
            Command::Health => match self.controller.backend().health_check().await {
                Ok(()) => self.sink.info("Backend is reachable."),
                Err(e) => self.sink.alert(&format!("Backend health check failed: {e}")),
            },
            Command::Help => self.sink.info(HELP),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Plot click: hit-test against data points, then manual capture.
    /// Outside manual mode, or when nothing is hit, the click is ignored.
    fn click(&mut self, target: Point) {
        if !self.controller.state().method().is_manual() {
            debug!(%target, "click ignored outside manual mode");
            return;
        }
        let chart = ChartModel::from_state(self.controller.state());
        let Some(point) = chart.hit_test(target, self.click_tolerance) else {
            debug!(%target, "click did not hit a data point");
            return;
        };
        match self.controller.select_point(point) {
            Ok(selected) => self.selected(selected),
            Err(e) => self.fail(&e),
        }
    }

    fn selected(&mut self, selected: usize) {
        let state = self.controller.state();
        if let Some(point) = state.manual_selection().last() {
            let message = format!("Centroid added at {point}. Selected {selected}/{}.", state.k());
            self.sink.info(&message);
        }
        self.redraw();
    }

    fn iterated(&mut self, result: Result<IterationOutcome, ControllerError>) {
        match result {
            Ok(outcome) => {
                self.redraw();
                self.sink.info(&format!(
                    "Iteration {} | converged: {}",
                    outcome.iteration,
                    if outcome.converged { "Yes" } else { "No" }
                ));
                if outcome.converged {
                    self.sink.alert("KMeans has converged.");
                }
            }
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&mut self, error: &ControllerError) {
        info!(error = %error, "action rejected");
        self.sink.alert(&error.alert_message());
    }

    fn redraw(&mut self) {
        if let Some(path) = self.svg_output.clone() {
            self.write_plot(&path);
        }
    }

    fn write_plot(&mut self, path: &Path) -> bool {
        let chart = ChartModel::from_state(self.controller.state());
        match write_svg(&chart, path, self.svg_options) {
            Ok(()) => {
                debug!(path = %path.display(), "plot written");
                true
            }
            Err(e) => {
                self.sink
                    .alert(&format!("Failed to write plot to {}: {e}", path.display()));
                false
            }
        }
    }
}
