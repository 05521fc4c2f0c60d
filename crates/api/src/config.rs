//! Process configuration from the environment.

use std::net::SocketAddr;

use anyhow::{Context, anyhow};

use cashbook_infra::ServiceConfig;
use cashbook_observability::LogFormat;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub service: ServiceConfig,
    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Read `CASHBOOK_BIND`, `CASHBOOK_UTC_OFFSET_MINUTES` and
    /// `CASHBOOK_LOG_FORMAT`. Unset variables fall back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = lookup("CASHBOOK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("CASHBOOK_BIND '{bind}' is not a socket address"))?;

        let service = match lookup("CASHBOOK_UTC_OFFSET_MINUTES") {
            Some(raw) => {
                let minutes: i32 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("CASHBOOK_UTC_OFFSET_MINUTES '{raw}' is not an integer"))?;
                ServiceConfig::from_offset_minutes(minutes)
                    .context("CASHBOOK_UTC_OFFSET_MINUTES")?
            }
            None => ServiceConfig::default(),
        };

        let log_format = match lookup("CASHBOOK_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| anyhow!("CASHBOOK_LOG_FORMAT: {e}"))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind,
            service,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.service, ServiceConfig::default());
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config(&[
            ("CASHBOOK_BIND", "127.0.0.1:9000"),
            ("CASHBOOK_UTC_OFFSET_MINUTES", "-180"),
            ("CASHBOOK_LOG_FORMAT", "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.bind.port(), 9000);
        assert_eq!(cfg.service.business_offset.local_minus_utc(), -180 * 60);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn invalid_values_fail() {
        assert!(config(&[("CASHBOOK_BIND", "nowhere")]).is_err());
        assert!(config(&[("CASHBOOK_UTC_OFFSET_MINUTES", "3000")]).is_err());
        assert!(config(&[("CASHBOOK_UTC_OFFSET_MINUTES", "abc")]).is_err());
        assert!(config(&[("CASHBOOK_LOG_FORMAT", "xml")]).is_err());
    }
}
