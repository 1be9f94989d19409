//! WhatsApp media decryption front end.
//!
//! Glue around [`wamedia_crypto`]: turns text inputs (base64 keys, digests,
//! inline blobs), URLs and files into pipeline calls and frames the results.
//! The cryptography itself lives entirely in the core crate.
//!
//! # Components
//!
//! - [`BlobFetcher`]: blob retrieval seam, with [`HttpFetcher`] for
//!   production and [`StaticFetcher`] for tests
//! - [`process_item`] / [`run_batch`]: single and fanned-out decryption
//! - [`run_batch_to_dir`]: batch into a directory with a JSON report
//! - [`encoding`]: base64/base64url decoding for text inputs
//! - [`output`]: raw or base64 JSON framing and batch reports
//! - [`AppConfig`]: runtime settings

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
mod config;
pub mod encoding;
mod error;
mod fetch;
pub mod output;

use std::sync::Arc;

pub use batch::{
    BatchItem, BatchOutcome, BlobSource, output_file_name, parse_manifest, process_item, run_batch,
    run_batch_to_dir,
};
pub use config::{
    AppConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_BLOB_BYTES, DEFAULT_MAX_REDIRECTS,
    DEFAULT_TIMEOUT, FetchConfig,
};
pub use error::{CliError, ErrorClass};
pub use fetch::{BlobFetcher, HttpFetcher, StaticFetcher};
pub use output::{OutputFormat, ReportEntry, render};
use wamedia_crypto::{MacSuffix, MediaDecryptor};

/// Build the shared pipeline for a configuration.
///
/// Called once at startup; the result is cloned by `Arc` into every task.
pub fn build_decryptor(config: &AppConfig) -> Arc<MediaDecryptor> {
    if config.mac_suffix == MacSuffix::Truncated {
        tracing::warn!(
            "Using the 10-byte truncated MAC trailer; this variant is unconfirmed"
        );
    }
    Arc::new(MediaDecryptor::with_mac_suffix(config.mac_suffix))
}
