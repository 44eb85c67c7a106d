/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for ISO 8583 client sessions.

use ironiso_core::ValidationError;
use std::time::Duration;

/// Default wait for a response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest accepted request timeout.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum frame size in bytes.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Default session name.
pub const DEFAULT_SESSION_NAME: &str = "iso-client";

/// Configuration for an ISO 8583 client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name used in log output.
    pub name: String,
    /// How long a synchronous send waits for its response.
    pub request_timeout: Duration,
    /// Maximum inbound frame size in bytes.
    pub max_frame_size: usize,
}

impl SessionConfig {
    /// Creates a session configuration with default limits.
    ///
    /// # Arguments
    /// * `name` - Session name used in log output
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the request timeout in milliseconds.
    #[must_use]
    pub fn request_timeout_ms(&self) -> u64 {
        u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Checks the configured limits.
    ///
    /// # Errors
    /// Returns `ValidationError::Configuration` for a zero frame size, or a
    /// timeout that is zero or longer than [`MAX_REQUEST_TIMEOUT`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_timeout.is_zero() {
            return Err(ValidationError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }
        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(ValidationError::Configuration(format!(
                "request timeout exceeds {}s",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }
        if self.max_frame_size == 0 {
            return Err(ValidationError::Configuration(
                "maximum frame size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_NAME)
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    name: Option<String>,
    request_timeout: Option<Duration>,
    max_frame_size: Option<usize>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = Some(size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns `ValidationError::Configuration` for a zero timeout or frame size.
    pub fn build(self) -> Result<SessionConfig, ValidationError> {
        let mut config =
            SessionConfig::new(self.name.unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()));

        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(size) = self.max_frame_size {
            config.max_frame_size = size;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_new() {
        let config = SessionConfig::new("acquirer");

        assert_eq!(config.name, "acquirer");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.request_timeout_ms(), 60_000);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(SessionConfig::default().name, DEFAULT_SESSION_NAME);
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfigBuilder::new()
            .name("issuer")
            .request_timeout(Duration::from_secs(5))
            .max_frame_size(9999)
            .build()
            .unwrap();

        assert_eq!(config.name, "issuer");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_frame_size, 9999);
    }

    #[test]
    fn test_session_config_rejects_zero_limits() {
        assert!(
            SessionConfigBuilder::new()
                .request_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(SessionConfigBuilder::new().max_frame_size(0).build().is_err());
    }

    #[test]
    fn test_session_config_rejects_excessive_timeout() {
        assert!(
            SessionConfigBuilder::new()
                .request_timeout(MAX_REQUEST_TIMEOUT)
                .build()
                .is_ok()
        );
        assert!(matches!(
            SessionConfig::default()
                .with_request_timeout(Duration::MAX)
                .validate(),
            Err(ValidationError::Configuration(_))
        ));
    }
}
