//! Engine client configuration

/// Configuration for the container engine client
#[derive(Debug, Clone)]
pub struct EngineClientConfig {
    /// Engine endpoint, e.g. `unix:///var/run/docker.sock` or `tcp://host:2375`
    ///
    /// When not provided the client is built from the local environment
    /// (`DOCKER_HOST`, falling back to the platform default socket).
    pub endpoint: Option<String>,

    /// Timeout for engine requests in seconds
    pub timeout_secs: u64,
}

impl Default for EngineClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 120,
        }
    }
}

impl EngineClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
