use std::env;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LOGO_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOGO_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub render: RenderConfig,
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Deadline for downloading the optional center logo.
    pub logo_fetch_timeout: Duration,
    /// Largest logo body accepted, in bytes.
    pub logo_max_bytes: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            logo_fetch_timeout: Duration::from_secs(DEFAULT_LOGO_FETCH_TIMEOUT_SECS),
            logo_max_bytes: DEFAULT_LOGO_MAX_BYTES,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `LOGO_FETCH_TIMEOUT_SECS` and `LOGO_MAX_BYTES`.
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let host = env::var("HOST")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let logo_fetch_timeout = env::var("LOGO_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_LOGO_FETCH_TIMEOUT_SECS));
        let logo_max_bytes = env::var("LOGO_MAX_BYTES")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|bytes| *bytes > 0)
            .unwrap_or(DEFAULT_LOGO_MAX_BYTES);
        Self {
            host,
            port,
            render: RenderConfig {
                logo_fetch_timeout,
                logo_max_bytes,
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
