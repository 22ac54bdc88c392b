//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse errors into a single [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.is_valid() {
            return Ok(self.warnings);
        }
        let message = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::Invalid(message))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_companion(config, &mut result);
        Self::validate_outbox(config, &mut result);
        Self::validate_engine(config, &mut result);
        Self::validate_server(config, &mut result);

        result
    }

    fn validate_companion(config: &Config, result: &mut ValidationResult) {
        match url::Url::parse(&config.companion.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if !matches!(url.host_str(), Some("127.0.0.1" | "localhost" | "[::1]")) {
                    result.add_warning(ValidationWarning::new(
                        "companion.base_url",
                        "companion is not on the loopback interface",
                    ));
                }
            }
            Ok(_) => result.add_error(ValidationError::new(
                "companion.base_url",
                "base_url must start with http:// or https://",
            )),
            Err(e) => result.add_error(ValidationError::new(
                "companion.base_url",
                format!("invalid URL: {}", e),
            )),
        }

        if !config.companion.sse_path.starts_with('/') {
            result.add_error(ValidationError::new(
                "companion.sse_path",
                "sse_path must start with '/'",
            ));
        }

        if config.companion.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "companion.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
    }

    fn validate_outbox(config: &Config, result: &mut ValidationResult) {
        let outbox = &config.outbox;
        if outbox.capacity == 0 {
            result.add_error(ValidationError::new(
                "outbox.capacity",
                "capacity must be greater than 0",
            ));
        }

        if outbox.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "outbox.max_attempts",
                "max_attempts must be at least 1",
            ));
        }

        if outbox.max_attempts > 1 {
            result.add_warning(ValidationWarning::new(
                "outbox.max_attempts",
                "retries enabled, the companion may see duplicate pushes",
            ));
        }

        if outbox.max_retry_delay_ms < outbox.retry_delay_ms {
            result.add_error(ValidationError::new(
                "outbox.max_retry_delay_ms",
                "max_retry_delay_ms must not be below retry_delay_ms",
            ));
        }
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;
        if engine.speed_levels.is_empty() {
            result.add_error(ValidationError::new(
                "engine.speed_levels",
                "at least one speed level is required",
            ));
        }

        let mut seen = HashSet::new();
        for level in &engine.speed_levels {
            if !seen.insert(level) {
                result.add_error(ValidationError::new(
                    "engine.speed_levels",
                    format!("duplicate speed level '{}'", level),
                ));
            }
        }

        if !engine.bounds_tolerance.is_finite() || engine.bounds_tolerance < 0.0 {
            result.add_error(ValidationError::new(
                "engine.bounds_tolerance",
                "bounds_tolerance must be a non-negative number",
            ));
        }

        if engine.stale_slice_callback.is_empty() {
            result.add_warning(ValidationWarning::new(
                "engine.stale_slice_callback",
                "empty callback, the companion cannot tell stale-slice snapshots apart",
            ));
        }
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }

        if let Some(parent) = config
            .server
            .outline_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
        {
            if !parent.exists() {
                result.add_warning(ValidationWarning::new(
                    "server.outline_path",
                    format!("outline directory does not exist: {:?}", parent),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
