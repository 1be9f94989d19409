//! Blob retrieval.
//!
//! The pipeline only needs the complete raw blob or a distinguishable error.
//! Redirects, timeouts and size limits are handled here; nothing is retried.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use reqwest::{Client, redirect::Policy};

use crate::{config::FetchConfig, error::CliError};

/// Source of encrypted blobs addressed by URL.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    /// Retrieve the complete blob at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CliError>;
}

/// HTTP(S) fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_blob_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, CliError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CliError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, max_blob_bytes: config.max_blob_bytes })
    }
}

fn fetch_error(url: &str, reason: impl ToString) -> CliError {
    CliError::Fetch { url: url.to_string(), reason: reason.to_string() }
}

#[async_trait]
impl BlobFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CliError> {
        let mut response = self.client.get(url).send().await.map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(url, format!("unexpected status {status}")));
        }

        let limit = self.max_blob_bytes;
        if let Some(len) = response.content_length() {
            if len > limit as u64 {
                return Err(fetch_error(url, format!("body of {len} bytes exceeds {limit}")));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| fetch_error(url, e))? {
            if body.len() + chunk.len() > limit {
                return Err(fetch_error(url, format!("body exceeds {limit} bytes")));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(url, bytes = body.len(), "fetched blob");
        Ok(body)
    }
}

/// In-memory fetcher for tests and offline runs.
///
/// Unknown URLs fail with a fetch error.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl StaticFetcher {
    /// Empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `blob` at `url`.
    pub fn insert(&self, url: impl Into<String>, blob: Vec<u8>) {
        let mut blobs = self.blobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.insert(url.into(), blob);
    }
}

#[async_trait]
impl BlobFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CliError> {
        let blobs = self.blobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.get(url).cloned().ok_or_else(|| fetch_error(url, "not found"))
    }
}
