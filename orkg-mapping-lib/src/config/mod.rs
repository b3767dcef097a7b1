use std::time::Duration;

use crate::error::MappingError;

pub const DEFAULT_API_BASE: &str = "https://orkg.org/api";
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://orkg.org/triplestore";

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Remote endpoints and per-request time bounds shared by every client in
/// the pipeline. Defaults target the public ORKG deployment.
#[derive(Debug, Clone)]
pub struct OrkgConfig {
    pub api_base: String,
    pub sparql_endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for OrkgConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            sparql_endpoint: DEFAULT_SPARQL_ENDPOINT.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl OrkgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_sparql_endpoint(mut self, sparql_endpoint: impl Into<String>) -> Self {
        self.sparql_endpoint = sparql_endpoint.into();
        self
    }

    pub fn with_timeouts(mut self, connect_timeout_ms: u64, request_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self.request_timeout_ms = request_timeout_ms;
        self
    }

    /// Builds a `reqwest` client with this config's time bounds. Every
    /// remote call in the pipeline goes through a client built here, so no
    /// single lookup can stall a run indefinitely.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, MappingError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .timeout(Duration::from_millis(self.request_timeout_ms))
            .build()?;
        Ok(client)
    }
}
