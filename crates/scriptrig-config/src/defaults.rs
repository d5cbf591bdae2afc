//! Built-in configuration defaults.
//!
//! Each value has a `&'static str` or numeric constant plus an owned
//! constructor so serde and `ortho_config` can share the same source.

use crate::logging::{ColorMode, LogFormat};

/// Service binary launched for the run.
pub const DEFAULT_SERVER_BINARY: &str = "./target/debug/service";

/// Administrative binary used to add and remove principals.
pub const DEFAULT_ADMIN_BINARY: &str = "./target/debug/service-admin";

/// Base URL of the supervised service; also the liveness endpoint.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Path of the script-execution endpoint relative to the service URL.
pub const DEFAULT_SCRIPT_PATH: &str = "/script";

/// Directory searched for test scripts.
pub const DEFAULT_SCRIPT_DIR: &str = "test_scripts";

/// Glob pattern used when the CLI receives no positional pattern.
pub const DEFAULT_PATTERN: &str = "*.lua";

/// Token replaced with the provisioned principal id before submission.
pub const DEFAULT_PLACEHOLDER_TOKEN: &str = "__account_id__";

/// Local part prefix of the generated principal address.
pub const DEFAULT_IDENTITY_PREFIX: &str = "scriptrig";

/// Domain of the generated principal address.
pub const DEFAULT_IDENTITY_DOMAIN: &str = "scriptrig.test";

/// Liveness status that signals the service is accepting requests.
pub const DEFAULT_READY_STATUS: u16 = 401;

/// Delay between readiness probes.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Timeout applied to each readiness probe.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;

/// Upper bound on the time spent waiting for the service to become ready.
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 60;

/// Timeout applied to each script submission; zero disables it.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default service binary.
pub fn default_server_binary() -> String {
    DEFAULT_SERVER_BINARY.to_owned()
}

/// Default administrative binary.
pub fn default_admin_binary() -> String {
    DEFAULT_ADMIN_BINARY.to_owned()
}

/// Default service URL.
pub fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_owned()
}

/// Default script-execution path.
pub fn default_script_path() -> String {
    DEFAULT_SCRIPT_PATH.to_owned()
}

/// Default script directory.
pub fn default_script_dir() -> String {
    DEFAULT_SCRIPT_DIR.to_owned()
}

/// Default glob pattern.
pub fn default_pattern() -> String {
    DEFAULT_PATTERN.to_owned()
}

/// Default placeholder token.
pub fn default_placeholder_token() -> String {
    DEFAULT_PLACEHOLDER_TOKEN.to_owned()
}

/// Default identity prefix.
pub fn default_identity_prefix() -> String {
    DEFAULT_IDENTITY_PREFIX.to_owned()
}

/// Default identity domain.
pub fn default_identity_domain() -> String {
    DEFAULT_IDENTITY_DOMAIN.to_owned()
}

/// Default readiness status.
pub const fn default_ready_status() -> u16 {
    DEFAULT_READY_STATUS
}

/// Default poll interval in milliseconds.
pub const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Default probe timeout in milliseconds.
pub const fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

/// Default startup timeout in seconds.
pub const fn default_startup_timeout_secs() -> u64 {
    DEFAULT_STARTUP_TIMEOUT_SECS
}

/// Default request timeout in seconds.
pub const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Default log filter expression used by the binary.
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default colour mode for the report.
pub const fn default_color_mode() -> ColorMode {
    ColorMode::Auto
}
