use std::time::Duration;

/// Allocation data published by the Safe claiming app, keyed by chain id and
/// checksummed account address.
pub const DEFAULT_ALLOCATIONS_URL: &str = "https://safe-claiming-app-data.safe.global/allocations";
pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to query the allocation data service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub base_url: String,
    pub chain_id: u64,
    pub timeout: Duration,
}

impl LookupConfig {
    pub fn new(base_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            base_url: base_url.into(),
            chain_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOCATIONS_URL, DEFAULT_CHAIN_ID)
    }
}

/// JSON-RPC endpoint used for read-only contract calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub url: String,
    pub timeout: Duration,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
