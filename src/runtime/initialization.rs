//! # Initialization
//!
//! Binary startup: `.env` loading, rustls setup and the tracing subscriber.

use anyhow::Result;
use tracing::debug;

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "gcp_config_tools=info";

/// Load `.env` from the working directory into the process environment
///
/// Returns whether a file was loaded; a missing file is not an error.
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

/// Install the ring crypto provider for rustls
///
/// Required for rustls 0.23+ before the first TLS connection. Installing twice is
/// harmless, so an already-installed provider is not an error.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Install the fmt subscriber, filtered by `RUST_LOG` or `default_filter`
///
/// # Errors
/// Returns an error if a global subscriber is already set
pub fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

/// Process setup run first by both binaries
///
/// `.env` is loaded before the subscriber so `RUST_LOG` can come from the file.
///
/// # Errors
/// Returns an error if the tracing subscriber cannot be installed
pub fn initialize() -> Result<()> {
    let dotenv_loaded = load_dotenv();
    install_crypto_provider();
    init_tracing(DEFAULT_LOG_FILTER)?;

    if dotenv_loaded {
        debug!("Loaded environment from .env");
    }
    Ok(())
}
