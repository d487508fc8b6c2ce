use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Upper bound for `DORMANT_AFTER_DAYS`; keeps the sweep threshold representable
pub const MAX_DORMANT_AFTER_DAYS: i64 = 36_500;

#[derive(Clone, Debug)]
pub struct Config {
    /// PostgreSQL URL; in-memory storage is used when unset
    pub database_url: Option<String>,
    pub port: u16,
    /// Expiry of cached posts
    pub cache_ttl: Duration,
    /// Base URL of the event broker; events stay in memory when unset
    pub event_broker_url: Option<String>,
    /// Webhook for operator notifications; notifications are only logged when unset
    pub notification_webhook_url: Option<String>,
    pub dormant_after_days: i64,
    /// Pause between dormant-user sweeps in the batch runner
    pub sweep_interval: Duration,
    pub sweep_lock_wait: Duration,
    pub sweep_lock_lease: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dormant_after_days: i64 = parse(&get, "DORMANT_AFTER_DAYS", 365)?;
        if !(1..=MAX_DORMANT_AFTER_DAYS).contains(&dormant_after_days) {
            return Err(ConfigError::Invalid {
                key: "DORMANT_AFTER_DAYS",
                value: dormant_after_days.to_string(),
            });
        }

        Ok(Self {
            database_url: get("DATABASE_URL"),
            port: parse(&get, "PORT", 8080)?,
            cache_ttl: positive_secs(&get, "CACHE_TTL_SECS", 1800)?,
            event_broker_url: get("EVENT_BROKER_URL"),
            notification_webhook_url: get("NOTIFICATION_WEBHOOK_URL"),
            dormant_after_days,
            sweep_interval: positive_secs(&get, "SWEEP_INTERVAL_SECS", 3600)?,
            sweep_lock_wait: Duration::from_secs(parse(&get, "SWEEP_LOCK_WAIT_SECS", 5)?),
            sweep_lock_lease: positive_secs(&get, "SWEEP_LOCK_LEASE_SECS", 300)?,
        })
    }

    /// Dormancy window as a time delta
    pub fn dormant_after(&self) -> chrono::Duration {
        chrono::Duration::days(self.dormant_after_days)
    }
}

fn positive_secs<G>(get: &G, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match parse(get, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
