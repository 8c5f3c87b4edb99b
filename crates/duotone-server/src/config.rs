//! Server configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Default listening port.
const DEFAULT_PORT: u16 = 3000;
/// Default bind host (all interfaces, so phones on the LAN can connect).
const DEFAULT_HOST: &str = "0.0.0.0";
/// Default upload cap in megabytes.
const DEFAULT_MAX_UPLOAD_MB: u64 = 25;
/// Default directory for static frontend assets.
const DEFAULT_STATIC_DIR: &str = "public";
/// Default requests allowed per client per window.
const DEFAULT_RATE_LIMIT_MAX: u32 = 200;
/// Default rate-limit window (15 minutes).
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// Runtime configuration for the duotone server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// TCP port (`PORT`). 0 picks a free port.
    pub port: u16,
    /// Largest accepted image upload, in megabytes (`MAX_UPLOAD_MB`).
    pub max_upload_mb: u64,
    /// Origins allowed by CORS (`ALLOWED_ORIGINS`, comma separated).
    /// Empty allows every origin.
    pub allowed_origins: Vec<String>,
    /// Directory served for non-API `GET` requests (`STATIC_DIR`).
    pub static_dir: PathBuf,
    /// Requests per client per window (`RATE_LIMIT_MAX`).
    pub rate_limit_max: u32,
    /// Rate-limit window length (`RATE_LIMIT_WINDOW_SECS`).
    pub rate_limit_window: Duration,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
            value
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: lookup("HOST")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: parsed(lookup("PORT"), DEFAULT_PORT),
            max_upload_mb: parsed(lookup("MAX_UPLOAD_MB"), DEFAULT_MAX_UPLOAD_MB),
            allowed_origins,
            static_dir: lookup("STATIC_DIR")
                .filter(|s| !s.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from),
            rate_limit_max: parsed(lookup("RATE_LIMIT_MAX"), DEFAULT_RATE_LIMIT_MAX),
            rate_limit_window: Duration::from_secs(parsed(
                lookup("RATE_LIMIT_WINDOW_SECS"),
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )),
        }
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload cap in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
