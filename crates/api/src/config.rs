use std::time::Duration;

/// Default node RPC address.
pub const DEFAULT_API_ADDR: &str = "127.0.0.1:5001";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default public gateway host used to render shareable links.
pub const DEFAULT_GATEWAY_HOST: &str = "ipfs.io";

/// Default port for the dev CORS proxy.
pub const DEFAULT_PROXY_PORT: u16 = 3001;

/// Fixed endpoint configuration for talking to a local node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `host:port` of the node's RPC API.
    pub addr: String,
    /// Total per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_API_ADDR.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Creates a config for `addr` with the default timeout.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Base URL of the RPC API, e.g. `http://127.0.0.1:5001`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL for an RPC path, e.g. `endpoint_url("/api/v0/add")`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// Shareable gateway link for a CID on the default gateway.
pub fn gateway_url(cid: &str) -> String {
    gateway_url_on(DEFAULT_GATEWAY_HOST, cid)
}

/// Shareable gateway link for a CID on a specific gateway host.
pub fn gateway_url_on(host: &str, cid: &str) -> String {
    format!("https://{host}/ipfs/{cid}")
}
