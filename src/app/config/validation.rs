use super::{Config, ConfigError};
use url::Url;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate backend URL
        let url = Url::parse(&self.backend_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid backend URL '{}': {}", self.backend_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Backend URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.centers == 0 {
            return Err(ConfigError::InvalidConfig(
                "Number of centers must be greater than 0".to_string(),
            ));
        }

        if self.samples < self.centers {
            return Err(ConfigError::InvalidConfig(format!(
                "Sample count ({}) must be at least the number of centers ({})",
                self.samples, self.centers
            )));
        }

        if !(self.click_tolerance.is_finite() && self.click_tolerance > 0.0) {
            return Err(ConfigError::InvalidConfig(format!(
                "Click tolerance must be a positive number, got {}",
                self.click_tolerance
            )));
        }

        // Validate timeouts
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Connection timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(parent) = self.svg_output.as_deref().and_then(|p| p.parent())
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(ConfigError::InvalidConfig(format!(
                "SVG output directory does not exist: {}",
                parent.display()
            )));
        }

        Ok(())
    }
}
