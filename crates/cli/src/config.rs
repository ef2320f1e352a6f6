//! Process configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use shopfront_store::LocalStore;
use shopfront_sync::CartMode;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8001";
const DEFAULT_ORDER_API_BASE: &str = "http://127.0.0.1:8006";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolved configuration.
///
/// Every knob is an environment variable with a default:
/// `SHOPFRONT_API_BASE`, `SHOPFRONT_ORDER_API_BASE`, `SHOPFRONT_CART_MODE`
/// (`local` or `remote`), `SHOPFRONT_DATA_DIR`, `SHOPFRONT_TIMEOUT_SECS`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway URL for every storefront service except orders.
    pub api_base: String,
    /// The order service deploys separately and has its own base URL.
    pub order_api_base: String,
    pub cart_mode: CartMode,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    /// Read the environment, falling back to defaults for anything unset.
    ///
    /// A malformed value is an error, not a silent fallback: a typo in
    /// `SHOPFRONT_CART_MODE` must not quietly route cart writes to the
    /// wrong store.
    pub fn load() -> anyhow::Result<Self> {
        let api_base = normalized_base(var_or("SHOPFRONT_API_BASE", DEFAULT_API_BASE));
        let order_api_base =
            normalized_base(var_or("SHOPFRONT_ORDER_API_BASE", DEFAULT_ORDER_API_BASE));

        let cart_mode = match std::env::var("SHOPFRONT_CART_MODE") {
            Ok(raw) => raw
                .parse::<CartMode>()
                .context("SHOPFRONT_CART_MODE is invalid")?,
            Err(_) => CartMode::Local,
        };

        let data_dir = match std::env::var("SHOPFRONT_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => LocalStore::default_root()
                .context("could not resolve a data directory; set SHOPFRONT_DATA_DIR")?,
        };

        let request_timeout = match std::env::var("SHOPFRONT_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().context("SHOPFRONT_TIMEOUT_SECS is invalid")?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        tracing::debug!(
            %api_base,
            %order_api_base,
            mode = %cart_mode,
            data_dir = %data_dir.display(),
            "configuration loaded"
        );
        Ok(Self {
            api_base,
            order_api_base,
            cart_mode,
            data_dir,
            request_timeout,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Request paths are joined with a leading slash everywhere, so a trailing
/// one on the base would double up.
fn normalized_base(raw: String) -> String {
    raw.trim_end_matches('/').to_string()
}
