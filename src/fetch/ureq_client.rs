use std::io;
use std::time::Duration;

use super::{HttpClient, HttpResponse};

/// Default transport timeout for a single attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("suffix-engine-r/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client backed by ureq.
pub struct UreqClient {
    agent: ureq::Agent,
    timeout: Duration,
    user_agent: String,
}

impl UreqClient {
    /// Create a client with the default timeout and user agent
    pub fn new() -> Self {
        Self {
            agent: build_agent(DEFAULT_TIMEOUT),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the global timeout of each attempt
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

// Status codes are reported as responses; only transport faults become errors.
fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> io::Result<HttpResponse> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(io::Error::other)?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(io::Error::other)?;

        Ok(HttpResponse { status, body })
    }
}
