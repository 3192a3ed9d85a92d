use std::time::Duration;

/// Target for `:port` and `/path` shorthand tokens and for invocations without a URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Defaults shared by the request builder, the request service and the CLI
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("hat/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
