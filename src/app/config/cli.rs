use super::env_helpers::{load_env_path_opt, load_env_string, load_env_var};
use super::{ConfigError, LogFormat, LogLevel};
use crate::backend::ClientConfig;
use crate::controller::{ControllerOptions, DuplicatePolicy};
use crate::domain::InitMethod;
use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Base URL of the clustering backend
    #[arg(long, env = "KMEANS_BACKEND_URL", default_value = "http://127.0.0.1:5000")]
    pub backend_url: String,

    /// Cluster count requested by the first dataset generation
    #[arg(long, env = "KMEANS_CENTERS", default_value = "5")]
    pub centers: usize,

    /// Number of points per generated dataset
    #[arg(long, env = "KMEANS_SAMPLES", default_value = "100")]
    pub samples: usize,

    /// Seed forwarded to the backend's generator
    #[arg(long, env = "KMEANS_RANDOM_STATE", default_value = "42")]
    pub random_state: u64,

    /// Initial centroid initialization method
    #[arg(long, env = "KMEANS_INIT_METHOD", default_value = "kmeans++")]
    pub init_method: InitMethod,

    /// Allow picking the same point twice in manual mode (`false` turns it off)
    #[arg(
        long,
        env = "KMEANS_ALLOW_DUPLICATE_SELECTION",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub allow_duplicate_selection: bool,

    /// Hit radius of a plot click, in data units
    #[arg(long, env = "KMEANS_CLICK_TOLERANCE", default_value = "0.1")]
    pub click_tolerance: f64,

    /// Rewrite this SVG file after every redraw
    #[arg(long, env = "KMEANS_SVG_OUTPUT")]
    pub svg_output: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long, env = "KMEANS_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "KMEANS_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[arg(long, env = "KMEANS_CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub timeout: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            centers: 5,
            samples: 100,
            random_state: 42,
            init_method: InitMethod::KMeansPlusPlus,
            allow_duplicate_selection: false,
            click_tolerance: 0.1,
            svg_output: None,
            script: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            config_file: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::try_parse_from(args)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        load_env_string("KMEANS_BACKEND_URL", &mut config.backend_url);
        load_env_var("KMEANS_CENTERS", &mut config.centers)?;
        load_env_var("KMEANS_SAMPLES", &mut config.samples)?;
        load_env_var("KMEANS_RANDOM_STATE", &mut config.random_state)?;
        load_env_var("KMEANS_INIT_METHOD", &mut config.init_method)?;
        load_env_var(
            "KMEANS_ALLOW_DUPLICATE_SELECTION",
            &mut config.allow_duplicate_selection,
        )?;
        load_env_var("KMEANS_CLICK_TOLERANCE", &mut config.click_tolerance)?;
        load_env_path_opt("KMEANS_SVG_OUTPUT", &mut config.svg_output);
        load_env_path_opt("KMEANS_SCRIPT", &mut config.script);
        load_env_var("KMEANS_TIMEOUT_SECS", &mut config.timeout_secs)?;
        load_env_var("KMEANS_CONNECT_TIMEOUT_SECS", &mut config.connect_timeout_secs)?;
        load_env_var("LOG_LEVEL", &mut config.log_level)?;
        load_env_var("LOG_FORMAT", &mut config.log_format)?;
        load_env_path_opt("CONFIG_FILE", &mut config.config_file);

        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse CLI args (clap falls back to env vars), then layer a config
    /// file underneath when one is named.
    ///
    /// Precedence: command line, then environment, then file, then defaults.
    pub fn from_args_and_env<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Config::command()
            .try_get_matches_from(args)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        let mut config = Config::from_arg_matches(&matches)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

        if let Some(path) = config.config_file.clone() {
            let file = Self::read_file(&path)?;
            config.merge_file_under(file, &matches);
        }

        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path.as_ref())?;
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Take every value from `file` that was not given on the command line
    /// or through the environment.
    fn merge_file_under(&mut self, file: Config, matches: &ArgMatches) {
        let explicit = |id: &str| {
            matches!(
                matches.value_source(id),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
        };

        if !explicit("backend_url") {
            self.backend_url = file.backend_url;
        }
        if !explicit("centers") {
            self.centers = file.centers;
        }
        if !explicit("samples") {
            self.samples = file.samples;
        }
        if !explicit("random_state") {
            self.random_state = file.random_state;
        }
        if !explicit("init_method") {
            self.init_method = file.init_method;
        }
        if !explicit("allow_duplicate_selection") {
            self.allow_duplicate_selection = file.allow_duplicate_selection;
        }
        if !explicit("click_tolerance") {
            self.click_tolerance = file.click_tolerance;
        }
        if !explicit("svg_output") {
            self.svg_output = file.svg_output;
        }
        if !explicit("script") {
            self.script = file.script;
        }
        if !explicit("timeout_secs") {
            self.timeout_secs = file.timeout_secs;
        }
        if !explicit("connect_timeout_secs") {
            self.connect_timeout_secs = file.connect_timeout_secs;
        }
        if !explicit("log_level") {
            self.log_level = file.log_level;
        }
        if !explicit("log_format") {
            self.log_format = file.log_format;
        }
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.timeout = Duration::from_secs(self.timeout_secs);
        self.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.backend_url.clone(),
            timeout: self.timeout,
            connection_timeout: self.connect_timeout,
            ..ClientConfig::default()
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            initial_k: self.centers,
            samples: self.samples,
            random_state: self.random_state,
            method: self.init_method,
            duplicate_policy: if self.allow_duplicate_selection {
                DuplicatePolicy::Allow
            } else {
                DuplicatePolicy::Reject
            },
        }
    }
}
