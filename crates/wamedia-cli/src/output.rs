//! Output framing for decrypted media.

use clap::ValueEnum;
use serde::Serialize;

use crate::{batch::BatchOutcome, encoding::encode_base64, error::CliError};

/// How plaintext is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw decrypted bytes
    #[default]
    Raw,
    /// JSON object `{"base64": .., "size": ..}`
    Base64,
}

#[derive(Serialize)]
struct Base64Body<'a> {
    base64: &'a str,
    size: usize,
}

/// Frame `plaintext` for output.
pub fn render(format: OutputFormat, plaintext: Vec<u8>) -> Result<Vec<u8>, CliError> {
    match format {
        OutputFormat::Raw => Ok(plaintext),
        OutputFormat::Base64 => {
            let encoded = encode_base64(&plaintext);
            let body = Base64Body { base64: &encoded, size: plaintext.len() };
            let mut json = serde_json::to_vec(&body)
                .map_err(|e| CliError::Internal(format!("failed to encode output: {e}")))?;
            json.push(b'\n');
            Ok(json)
        },
    }
}

/// Per-item line of a batch summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Item identifier
    pub id: String,
    /// Whether the item decrypted
    pub ok: bool,
    /// Plaintext size on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Output file name, when the plaintext was written to disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Error kind on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportEntry {
    /// Entry for an item that decrypted to `size` bytes.
    pub fn succeeded(id: &str, size: usize, file: Option<String>) -> Self {
        Self { id: id.to_string(), ok: true, size: Some(size), file, kind: None, error: None }
    }

    /// Entry for an item that failed with `error`.
    pub fn failed(id: &str, error: &CliError) -> Self {
        Self {
            id: id.to_string(),
            ok: false,
            size: None,
            file: None,
            kind: Some(error.kind().as_str()),
            error: Some(error.to_string()),
        }
    }
}

impl From<&BatchOutcome> for ReportEntry {
    fn from(outcome: &BatchOutcome) -> Self {
        match &outcome.result {
            Ok(plaintext) => Self::succeeded(&outcome.id, plaintext.len(), None),
            Err(e) => Self::failed(&outcome.id, e),
        }
    }
}
