//! Configuration loading and validation for the `lambda-server` binary.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is invalid.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::server::ServerOptions;

/// Validated binary configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host the invocation listener binds.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the invocation listener binds.
    #[serde(default = "default_lambda_port")]
    pub lambda_port: u16,

    /// Directory containing `cert.pem` and `key.pem`. Enables HTTPS when set.
    #[serde(default)]
    pub https_protocol: Option<String>,

    /// Grace period (milliseconds) for in-flight requests on shutdown.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    /// Optional OTLP endpoint for span export.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "localhost".into()
}
fn default_lambda_port() -> u16 {
    3002
}
fn default_stop_timeout_ms() -> u64 {
    5000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("HOST must not be empty");
        }
        if let Some(dir) = &self.https_protocol {
            if dir.trim().is_empty() {
                anyhow::bail!("HTTPS_PROTOCOL must name a directory when set");
            }
        }
        Ok(())
    }

    /// Listener options derived from this configuration.
    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            host: self.host.clone(),
            port: self.lambda_port,
            https_protocol: self.https_protocol.as_ref().map(PathBuf::from),
        }
    }

    /// Shutdown grace period.
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            host: default_host(),
            lambda_port: default_lambda_port(),
            https_protocol: None,
            stop_timeout_ms: default_stop_timeout_ms(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_host(), "localhost");
        assert_eq!(default_lambda_port(), 3002);
        assert_eq!(default_stop_timeout_ms(), 5000);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_host() {
        let cfg = Config {
            host: "  ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_https_protocol() {
        let cfg = Config {
            https_protocol: Some("".into()),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn server_options_carry_tls_directory() {
        let cfg = Config {
            https_protocol: Some("/etc/lambda-tls".into()),
            lambda_port: 4000,
            ..valid()
        };
        let opts = cfg.server_options();
        assert_eq!(opts.port, 4000);
        assert_eq!(opts.https_protocol, Some(PathBuf::from("/etc/lambda-tls")));
        assert_eq!(cfg.stop_timeout(), Duration::from_millis(5000));
    }
}
