pub mod alert;
pub mod config;
pub mod logging_system;
pub mod shell;

pub use alert::{AlertSink, ConsoleSink, RecordingSink};
pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging_safe};
pub use shell::{Command, CommandError, Shell};

use crate::backend::BackendClient;
use crate::controller::Controller;
use crate::domain::VizError;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

pub struct App {
    config: Config,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, VizError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args_and_env(args)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, VizError> {
        setup_logging_safe(config.log_level, config.log_format)?;

        info!("Starting kmeans-viz v{}", crate::VERSION);
        info!(
            backend = %config.backend_url,
            centers = config.centers,
            samples = config.samples,
            method = %config.init_method,
            "configuration loaded"
        );

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the controller and drive it from the script file or stdin.
    pub async fn run(self) -> Result<(), VizError> {
        let client = BackendClient::new(self.config.client_config())?;
        let controller = Controller::new(client, self.config.controller_options());
        let mut shell = Shell::new(controller, ConsoleSink, self.config.svg_output.clone())
            .with_click_tolerance(self.config.click_tolerance);

        match &self.config.script {
            Some(path) => {
                info!(script = %path.display(), "running command script");
                let file = tokio::fs::File::open(path).await?;
                shell.run_lines(BufReader::new(file)).await?;
            }
            None => {
                println!("kmeans-viz {}. Type 'help' for commands.", crate::VERSION);
                shell.run_lines(BufReader::new(tokio::io::stdin())).await?;
            }
        }

        let (controller, _) = shell.into_parts();
        let stats = controller.backend().connection_stats();
        info!(
            total = stats.total_requests,
            successful = stats.successful_requests,
            failed = stats.failed_requests,
            average_ms = stats.average_response_time.as_millis() as u64,
            "backend session finished"
        );
        Ok(())
    }
}

pub async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // clap prints help/version and exits; everything else goes through validation
    if args
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "--help" | "-h" | "--version" | "-V"))
    {
        Config::parse_from(&args);
        return Ok(());
    }

    let app = App::from_args(args)?;
    if let Err(e) = app.run().await {
        error!("Application error: {}", e);
        return Err(e.into());
    }
    Ok(())
}
