//! WhatsApp media decryption CLI.
//!
//! # Usage
//!
//! ```bash
//! # Decrypt a downloaded .enc file
//! wamedia decrypt --input photo.enc --media-key <B64> --media-type image -o photo.jpg
//!
//! # Fetch and decrypt, printing base64 JSON
//! wamedia decrypt --url https://mmg.whatsapp.net/... --media-key <B64> \
//!     --media-type audio --file-enc-sha256 <B64> --format base64
//!
//! # Decrypt every item of a JSON manifest into a directory
//! wamedia batch --manifest items.json --out-dir decrypted/
//! ```

use std::{io::Write, path::PathBuf, time::Duration};

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wamedia_cli::{
    AppConfig, BatchItem, CliError, DEFAULT_CONCURRENCY, DEFAULT_MAX_BLOB_BYTES, FetchConfig,
    HttpFetcher, OutputFormat, build_decryptor, parse_manifest, process_item, render,
    run_batch_to_dir,
};
use wamedia_crypto::MacSuffix;

/// WhatsApp media decryptor
#[derive(Parser, Debug)]
#[command(name = "wamedia")]
#[command(about = "Decrypt WhatsApp end-to-end encrypted media")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Request timeout for URL sources, in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout_secs: u64,

    /// Largest blob accepted from a URL
    #[arg(long, default_value_t = DEFAULT_MAX_BLOB_BYTES, global = true)]
    max_blob_bytes: usize,

    /// MAC trailer length
    #[arg(long, value_enum, default_value_t = MacSuffixArg::Full, global = true)]
    mac_suffix: MacSuffixArg,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decrypt a single blob
    Decrypt(DecryptArgs),
    /// Decrypt every item of a JSON manifest
    Batch(BatchArgs),
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "url", "enc_base64"])))]
struct DecryptArgs {
    /// Encrypted file on disk
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// URL of the encrypted blob
    #[arg(long)]
    url: Option<String>,

    /// Encrypted blob as base64
    #[arg(long)]
    enc_base64: Option<String>,

    /// Media key (base64 or base64url)
    #[arg(long)]
    media_key: String,

    /// Media type (image, audio, video, document, sticker)
    #[arg(long)]
    media_type: String,

    /// Expected SHA-256 of the encrypted blob (base64)
    #[arg(long = "file-enc-sha256")]
    file_enc_sha256: Option<String>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output framing
    #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
    format: OutputFormat,
}

#[derive(clap::Args, Debug)]
struct BatchArgs {
    /// JSON array of items
    #[arg(short, long)]
    manifest: PathBuf,

    /// Directory receiving one `<index>-<id>.bin` per decrypted item
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Items processed concurrently
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MacSuffixArg {
    /// Full 32-byte HMAC-SHA256 digest
    Full,
    /// 10-byte truncated digest (unconfirmed)
    Truncated,
}

impl From<MacSuffixArg> for MacSuffix {
    fn from(arg: MacSuffixArg) -> Self {
        match arg {
            MacSuffixArg::Full => Self::Full,
            MacSuffixArg::Truncated => Self::Truncated,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout may carry plaintext
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let concurrency = match &args.command {
        Command::Batch(batch) => batch.concurrency,
        Command::Decrypt(_) => DEFAULT_CONCURRENCY,
    };

    let config = AppConfig {
        fetch: FetchConfig {
            timeout: Duration::from_secs(args.timeout_secs),
            max_blob_bytes: args.max_blob_bytes,
            ..FetchConfig::default()
        },
        mac_suffix: args.mac_suffix.into(),
        concurrency,
    };

    match args.command {
        Command::Decrypt(decrypt) => run_decrypt(decrypt, &config).await?,
        Command::Batch(batch) => run_batch_command(batch, &config).await?,
    }

    Ok(())
}

async fn run_decrypt(args: DecryptArgs, config: &AppConfig) -> Result<(), CliError> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let decryptor = build_decryptor(config);

    let item = BatchItem {
        id: None,
        url: args.url,
        enc_base64: args.enc_base64,
        path: args.input,
        media_key: args.media_key,
        media_type: args.media_type,
        file_enc_sha256: args.file_enc_sha256,
    };

    let plaintext = match process_item(&item, &fetcher, &decryptor).await {
        Ok(plaintext) => plaintext,
        Err(e) => {
            tracing::error!(kind = %e.kind(), "Decryption failed: {}", e);
            return Err(e);
        },
    };
    tracing::info!(bytes = plaintext.len(), "Decrypted media");

    let rendered = render(args.format, plaintext)?;
    match args.output {
        Some(path) => tokio::fs::write(&path, &rendered).await.map_err(|e| CliError::io(path, e)),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&rendered)
                .and_then(|()| stdout.flush())
                .map_err(|e| CliError::io("<stdout>", e))
        },
    }
}

async fn run_batch_command(args: BatchArgs, config: &AppConfig) -> Result<(), CliError> {
    let manifest = tokio::fs::read_to_string(&args.manifest)
        .await
        .map_err(|e| CliError::io(&args.manifest, e))?;
    let items = parse_manifest(&manifest)?;

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let decryptor = build_decryptor(config);

    run_batch_to_dir(
        items,
        &fetcher,
        &decryptor,
        config.concurrency,
        &args.out_dir,
        &mut std::io::stdout(),
    )
    .await
}
