//! Runtime configuration.

use std::time::Duration;

use wamedia_crypto::MacSuffix;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default redirect limit
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

/// Default upper bound on a fetched blob (64 MiB)
pub const DEFAULT_MAX_BLOB_BYTES: usize = 64 * 1024 * 1024;

/// Default number of batch items processed at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// HTTP retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Maximum redirects followed
    pub max_redirects: usize,
    /// `User-Agent` header (some media CDNs reject requests without one)
    pub user_agent: String,
    /// Responses larger than this are rejected
    pub max_blob_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: "Mozilla/5.0".to_string(),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}

/// Configuration for the whole front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Blob retrieval
    pub fetch: FetchConfig,
    /// MAC trailer length applied to every blob
    pub mac_suffix: MacSuffix,
    /// Concurrent batch items
    pub concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            mac_suffix: MacSuffix::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}
