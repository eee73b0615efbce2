use std::env;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7912;
pub const RPC_PATH: &str = "jsonrpc/0";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUTO_RETRY: u32 = 5;
const DEFAULT_RETRY_DURATION_SECS: u64 = 3;
const DEFAULT_WAIT_DURATION_SECS: f32 = 0.3;
const DEFAULT_WAIT_MAX_RETRY: u32 = 3;

const MAX_SECS: i64 = 60;
const MAX_RETRY: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Incorrect host '{0}': must be an IP address literal")]
    InvalidHost(String),

    #[error("Incorrect port {0}: must be between 1 and 65534")]
    InvalidPort(i64),
}

/// Connection settings for one agent.
///
/// Every numeric setting is range-checked as it is set; an out-of-range
/// value falls back to its default instead of being clamped to the bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    host: IpAddr,
    port: u16,
    timeout: Duration,
    auto_retry: u32,
    retry_duration: Duration,
    wait_for_exists_duration: f32,
    wait_for_exists_max_retry: u32,
    wait_for_disappear_duration: f32,
    wait_for_disappear_max_retry: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auto_retry: DEFAULT_AUTO_RETRY,
            retry_duration: Duration::from_secs(DEFAULT_RETRY_DURATION_SECS),
            wait_for_exists_duration: DEFAULT_WAIT_DURATION_SECS,
            wait_for_exists_max_retry: DEFAULT_WAIT_MAX_RETRY,
            wait_for_disappear_duration: DEFAULT_WAIT_DURATION_SECS,
            wait_for_disappear_max_retry: DEFAULT_WAIT_MAX_RETRY,
        }
    }
}

impl ClientConfig {
    pub fn new(host: &str, port: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            host: parse_host(host)?,
            port: check_port(port)?,
            ..Self::default()
        })
    }

    /// Build from `UIAUTO_*` variables. Unparseable numbers use defaults;
    /// an invalid host or port is still an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("UIAUTO_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env_parse("UIAUTO_PORT").unwrap_or(i64::from(DEFAULT_PORT));

        let mut config = Self::new(&host, port)?;
        if let Some(secs) = env_parse("UIAUTO_TIMEOUT") {
            config = config.with_timeout(secs);
        }
        if let Some(n) = env_parse("UIAUTO_AUTO_RETRY") {
            config = config.with_auto_retry(n);
        }
        if let Some(secs) = env_parse("UIAUTO_RETRY_DURATION") {
            config = config.with_retry_duration(secs);
        }
        config = config.with_wait_for_exists(
            env_parse("UIAUTO_WAIT_EXISTS_DURATION").unwrap_or(DEFAULT_WAIT_DURATION_SECS),
            env_parse("UIAUTO_WAIT_EXISTS_RETRY").unwrap_or(i64::from(DEFAULT_WAIT_MAX_RETRY)),
        );
        config = config.with_wait_for_disappear(
            env_parse("UIAUTO_WAIT_GONE_DURATION").unwrap_or(DEFAULT_WAIT_DURATION_SECS),
            env_parse("UIAUTO_WAIT_GONE_RETRY").unwrap_or(i64::from(DEFAULT_WAIT_MAX_RETRY)),
        );
        Ok(config)
    }

    pub fn with_host(mut self, host: &str) -> Result<Self, ConfigError> {
        self.host = parse_host(host)?;
        Ok(self)
    }

    pub fn with_port(mut self, port: i64) -> Result<Self, ConfigError> {
        self.port = check_port(port)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, secs: i64) -> Self {
        self.timeout = Duration::from_secs(secs_or(secs, DEFAULT_TIMEOUT_SECS));
        self
    }

    pub fn with_auto_retry(mut self, times: i64) -> Self {
        self.auto_retry = retries_or(times, DEFAULT_AUTO_RETRY);
        self
    }

    pub fn with_retry_duration(mut self, secs: i64) -> Self {
        self.retry_duration = Duration::from_secs(secs_or(secs, DEFAULT_RETRY_DURATION_SECS));
        self
    }

    pub fn with_wait_for_exists(mut self, duration_secs: f32, max_retry: i64) -> Self {
        self.wait_for_exists_duration = wait_secs_or_default(duration_secs);
        self.wait_for_exists_max_retry = retries_or(max_retry, DEFAULT_WAIT_MAX_RETRY);
        self
    }

    pub fn with_wait_for_disappear(mut self, duration_secs: f32, max_retry: i64) -> Self {
        self.wait_for_disappear_duration = wait_secs_or_default(duration_secs);
        self.wait_for_disappear_max_retry = retries_or(max_retry, DEFAULT_WAIT_MAX_RETRY);
        self
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Per-request timeout. Zero disables it.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn auto_retry(&self) -> u32 {
        self.auto_retry
    }

    pub fn retry_duration(&self) -> Duration {
        self.retry_duration
    }

    pub fn wait_for_exists_duration(&self) -> f32 {
        self.wait_for_exists_duration
    }

    pub fn wait_for_exists_max_retry(&self) -> u32 {
        self.wait_for_exists_max_retry
    }

    pub fn wait_for_disappear_duration(&self) -> f32 {
        self.wait_for_disappear_duration
    }

    pub fn wait_for_disappear_max_retry(&self) -> u32 {
        self.wait_for_disappear_max_retry
    }

    /// `http://<host>:<port>`, with IPv6 hosts bracketed.
    pub fn base_url(&self) -> String {
        format!("http://{}", SocketAddr::new(self.host, self.port))
    }

    pub fn rpc_url(&self) -> String {
        self.url_for(RPC_PATH)
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

fn parse_host(host: &str) -> Result<IpAddr, ConfigError> {
    host.trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::InvalidHost(host.to_string()))
}

fn check_port(port: i64) -> Result<u16, ConfigError> {
    match u16::try_from(port) {
        Ok(p) if p > 0 && p < u16::MAX => Ok(p),
        _ => Err(ConfigError::InvalidPort(port)),
    }
}

fn secs_or(secs: i64, default: u64) -> u64 {
    if (0..=MAX_SECS).contains(&secs) {
        secs as u64
    } else {
        default
    }
}

fn retries_or(times: i64, default: u32) -> u32 {
    if (0..=MAX_RETRY).contains(&times) {
        times as u32
    } else {
        default
    }
}

/// Wait durations share the 0..=60 s window; NaN falls back too.
pub fn wait_secs_or(secs: f32, default: f32) -> f32 {
    if (0.0..=MAX_SECS as f32).contains(&secs) {
        secs
    } else {
        default
    }
}

fn wait_secs_or_default(secs: f32) -> f32 {
    wait_secs_or(secs, DEFAULT_WAIT_DURATION_SECS)
}

/// Retry bound for waits; out-of-range values use `default`.
pub fn wait_retries_or(times: i64, default: u32) -> u32 {
    retries_or(times, default)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
