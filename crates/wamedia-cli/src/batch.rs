//! Per-item processing and batch fan-out.
//!
//! Every item runs its own fetch, decode and decrypt. A failing item yields a
//! failed [`BatchOutcome`] and never stops the others.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use wamedia_crypto::{DecryptRequest, MediaDecryptor, MediaType};

use crate::{
    encoding::{decode_base64, decode_digest, decode_media_key},
    error::CliError,
    fetch::BlobFetcher,
    output::ReportEntry,
};

/// One decryption job, as written in a manifest.
///
/// Exactly one of `url`, `enc_base64` and `path` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Caller-chosen identifier (defaults to the item's position)
    #[serde(default)]
    pub id: Option<String>,
    /// Remote `.enc` location
    #[serde(default)]
    pub url: Option<String>,
    /// Inline encrypted blob
    #[serde(default)]
    pub enc_base64: Option<String>,
    /// Local encrypted file
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Base64 media key
    pub media_key: String,
    /// Media type tag (`image`, `audio`, `video`, `document`, `sticker`)
    pub media_type: String,
    /// Optional base64 SHA-256 of the encrypted blob
    #[serde(default, rename = "fileEncSHA256")]
    pub file_enc_sha256: Option<String>,
}

/// Where an item's encrypted bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobSource<'a> {
    /// Fetch over the network
    Url(&'a str),
    /// Decode inline base64
    Base64(&'a str),
    /// Read from disk
    Path(&'a Path),
}

impl BatchItem {
    /// The item's single blob source.
    pub fn source(&self) -> Result<BlobSource<'_>, CliError> {
        match (&self.url, &self.enc_base64, &self.path) {
            (Some(url), None, None) => Ok(BlobSource::Url(url)),
            (None, Some(text), None) => Ok(BlobSource::Base64(text)),
            (None, None, Some(path)) => Ok(BlobSource::Path(path)),
            (None, None, None) => {
                Err(CliError::Manifest("item has no url, encBase64 or path".to_string()))
            },
            _ => Err(CliError::Manifest(
                "item must set exactly one of url, encBase64 or path".to_string(),
            )),
        }
    }
}

/// Result for one batch item.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Position in the manifest
    pub index: usize,
    /// Item identifier
    pub id: String,
    /// Plaintext or the first failure
    pub result: Result<Vec<u8>, CliError>,
}

/// Parse a JSON array of [`BatchItem`]s.
pub fn parse_manifest(json: &str) -> Result<Vec<BatchItem>, CliError> {
    serde_json::from_str(json).map_err(|e| CliError::Manifest(e.to_string()))
}

/// File name for an item's plaintext.
///
/// Unsafe characters in `id` are replaced, and the manifest position prefix
/// keeps names unique even when two ids sanitize to the same stem.
pub fn output_file_name(index: usize, id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') { c } else { '_' })
        .collect();
    format!("{index}-{stem}.bin")
}

async fn load_blob(source: BlobSource<'_>, fetcher: &dyn BlobFetcher) -> Result<Vec<u8>, CliError> {
    match source {
        BlobSource::Url(url) => fetcher.fetch(url).await,
        BlobSource::Base64(text) => decode_base64("encBase64", text),
        BlobSource::Path(path) => {
            tokio::fs::read(path).await.map_err(|e| CliError::io(path, e))
        },
    }
}

/// Decrypt a single item.
///
/// Text inputs are validated before any blob is fetched. Decryption runs on
/// the blocking pool since it is CPU bound.
pub async fn process_item(
    item: &BatchItem,
    fetcher: &dyn BlobFetcher,
    decryptor: &Arc<MediaDecryptor>,
) -> Result<Vec<u8>, CliError> {
    let media_type: MediaType = item.media_type.parse()?;
    let media_key = decode_media_key(&item.media_key)?;
    let digest = item.file_enc_sha256.as_deref().map(decode_digest).transpose()?;
    let source = item.source()?;

    let blob = load_blob(source, fetcher).await?;
    tracing::debug!(media_type = %media_type, bytes = blob.len(), "loaded encrypted blob");

    let decryptor = Arc::clone(decryptor);
    let decrypted = tokio::task::spawn_blocking(move || {
        let mut request = DecryptRequest::new(&blob, media_key.as_bytes(), media_type);
        if let Some(digest) = &digest {
            request = request.with_expected_digest(digest);
        }
        decryptor.decrypt(&request)
    })
    .await
    .map_err(|e| CliError::Internal(format!("decryption task failed: {e}")))?;

    decrypted.map_err(CliError::from)
}

/// Run every item with at most `concurrency` in flight.
///
/// Outcomes are returned in input order.
pub async fn run_batch(
    items: Vec<BatchItem>,
    fetcher: &dyn BlobFetcher,
    decryptor: &Arc<MediaDecryptor>,
    concurrency: usize,
) -> Vec<BatchOutcome> {
    stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| async move {
            let id = item.id.clone().unwrap_or_else(|| index.to_string());
            let result = process_item(&item, fetcher, decryptor).await;

            match &result {
                Ok(plaintext) => {
                    tracing::info!(id = %id, bytes = plaintext.len(), "item decrypted");
                },
                Err(e) => {
                    tracing::warn!(id = %id, kind = %e.kind(), error = %e, "item failed");
                },
            }

            BatchOutcome { index, id, result }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Run a batch into `out_dir` and write the JSON report to `report`.
///
/// Each decrypted item is written to [`output_file_name`]. A failed
/// decryption or file write marks only that item as failed, and the report
/// always lists every item in manifest order.
///
/// # Errors
///
/// - `Io`: `out_dir` cannot be created or the report cannot be written
/// - `BatchFailed`: at least one item failed (the report is written first)
pub async fn run_batch_to_dir<W: Write>(
    items: Vec<BatchItem>,
    fetcher: &dyn BlobFetcher,
    decryptor: &Arc<MediaDecryptor>,
    concurrency: usize,
    out_dir: &Path,
    report: &mut W,
) -> Result<(), CliError> {
    tokio::fs::create_dir_all(out_dir).await.map_err(|e| CliError::io(out_dir, e))?;

    let total = items.len();
    tracing::info!("Processing {} items", total);
    let outcomes = run_batch(items, fetcher, decryptor, concurrency).await;

    let mut entries = Vec::with_capacity(total);
    for outcome in &outcomes {
        let entry = match &outcome.result {
            Ok(plaintext) => {
                let file = output_file_name(outcome.index, &outcome.id);
                let path = out_dir.join(&file);
                match tokio::fs::write(&path, plaintext).await {
                    Ok(()) => ReportEntry::succeeded(&outcome.id, plaintext.len(), Some(file)),
                    Err(e) => {
                        let err = CliError::io(path, e);
                        tracing::warn!(id = %outcome.id, error = %err, "failed to write plaintext");
                        ReportEntry::failed(&outcome.id, &err)
                    },
                }
            },
            Err(e) => ReportEntry::failed(&outcome.id, e),
        };
        entries.push(entry);
    }

    let failed = entries.iter().filter(|entry| !entry.ok).count();
    tracing::info!("Batch finished: {} ok, {} failed", total - failed, failed);

    let mut json = serde_json::to_vec_pretty(&entries)
        .map_err(|e| CliError::Internal(format!("failed to encode report: {e}")))?;
    json.push(b'\n');
    report
        .write_all(&json)
        .and_then(|()| report.flush())
        .map_err(|e| CliError::io("<report>", e))?;

    if failed > 0 {
        return Err(CliError::BatchFailed { failed, total });
    }
    Ok(())
}
