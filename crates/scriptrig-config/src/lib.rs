//! Shared configuration for the scriptrig harness.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! `scriptrig.toml` named by `--config-path`, then `SCRIPTRIG_*` environment
//! variables, then command-line flags.

mod defaults;
mod logging;

use std::time::Duration;

use camino::Utf8Path;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use logging::{ColorMode, EnumParseError, LogFormat};

/// Harness configuration resolved from every supported layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SCRIPTRIG")]
pub struct Config {
    /// Service binary launched and supervised for the run.
    #[serde(default = "default_server_binary")]
    #[ortho_config(default = default_server_binary())]
    pub server_binary: String,
    /// Administrative binary providing the `add` and `remove` commands.
    #[serde(default = "default_admin_binary")]
    #[ortho_config(default = default_admin_binary())]
    pub admin_binary: String,
    /// Base URL of the service. The liveness probe targets this URL directly.
    #[serde(default = "default_service_url")]
    #[ortho_config(default = default_service_url())]
    pub service_url: String,
    /// Script-execution endpoint path appended to `service_url`.
    #[serde(default = "default_script_path")]
    #[ortho_config(default = default_script_path())]
    pub script_path: String,
    /// Directory holding the script corpus.
    #[serde(default = "default_script_dir")]
    #[ortho_config(default = default_script_dir())]
    pub script_dir: String,
    /// Glob pattern used when no positional pattern is given.
    #[serde(default = "default_pattern")]
    #[ortho_config(default = default_pattern())]
    pub default_pattern: String,
    /// Token substituted with the principal id inside each script.
    #[serde(default = "default_placeholder_token")]
    #[ortho_config(default = default_placeholder_token())]
    pub placeholder_token: String,
    /// Local part prefix of generated principal addresses.
    #[serde(default = "default_identity_prefix")]
    #[ortho_config(default = default_identity_prefix())]
    pub identity_prefix: String,
    /// Domain of generated principal addresses.
    #[serde(default = "default_identity_domain")]
    #[ortho_config(default = default_identity_domain())]
    pub identity_domain: String,
    /// Liveness status code treated as "ready".
    #[serde(default = "default_ready_status")]
    #[ortho_config(default = default_ready_status())]
    pub ready_status: u16,
    /// Delay between readiness probes, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    #[ortho_config(default = default_poll_interval_ms())]
    pub poll_interval_ms: u64,
    /// Timeout for a single readiness probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    #[ortho_config(default = default_probe_timeout_ms())]
    pub probe_timeout_ms: u64,
    /// Upper bound on the readiness wait, in seconds.
    #[serde(default = "default_startup_timeout_secs")]
    #[ortho_config(default = default_startup_timeout_secs())]
    pub startup_timeout_secs: u64,
    /// Timeout for each script submission, in seconds. Zero disables it.
    #[serde(default = "default_request_timeout_secs")]
    #[ortho_config(default = default_request_timeout_secs())]
    pub request_timeout_secs: u64,
    /// Tracing filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Tracing output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Colour mode for the pass/fail report and log output.
    #[serde(default = "default_color_mode")]
    #[ortho_config(default = default_color_mode())]
    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_binary: default_server_binary(),
            admin_binary: default_admin_binary(),
            service_url: default_service_url(),
            script_path: default_script_path(),
            script_dir: default_script_dir(),
            default_pattern: default_pattern(),
            placeholder_token: default_placeholder_token(),
            identity_prefix: default_identity_prefix(),
            identity_domain: default_identity_domain(),
            ready_status: default_ready_status(),
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            startup_timeout_secs: default_startup_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            color: default_color_mode(),
        }
    }
}

impl Config {
    /// Directory holding the script corpus.
    #[must_use]
    pub fn script_dir(&self) -> &Utf8Path {
        Utf8Path::new(&self.script_dir)
    }

    /// Full URL of the script-execution endpoint.
    #[must_use]
    pub fn script_url(&self) -> String {
        format!(
            "{}/{}",
            self.service_url.trim_end_matches('/'),
            self.script_path.trim_start_matches('/')
        )
    }

    /// Delay between readiness probes.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Timeout for a single readiness probe.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Upper bound on the readiness wait.
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    /// Per-request timeout for script submissions, if enabled.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Tracing output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Colour mode for the report and log output.
    #[must_use]
    pub const fn color(&self) -> ColorMode {
        self.color
    }
}
