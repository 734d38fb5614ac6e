use anyhow::{bail, Context};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::utils::money::BPS_DENOMINATOR;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_port: u16,
    /// HS256 signing key. No default: `validate` refuses to start without one.
    pub jwt_secret: String,
    pub min_payout_cents: u64,
    pub default_commission_rate_bps: u32,
    /// 0 disables the background payout scheduler.
    pub payout_schedule_interval_secs: u64,
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 9999,
            jwt_secret: String::new(),
            min_payout_cents: 10_000,
            default_commission_rate_bps: 1_000,
            payout_schedule_interval_secs: 0,
            seed_file: None,
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then environment variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml_str(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };

        let config = config.with_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.server_port = port;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(minimum) = lookup("MIN_PAYOUT_CENTS").and_then(|v| v.parse().ok()) {
            self.min_payout_cents = minimum;
        }
        if let Some(rate) = lookup("DEFAULT_COMMISSION_RATE_BPS").and_then(|v| v.parse().ok()) {
            self.default_commission_rate_bps = rate;
        }
        if let Some(secs) = lookup("PAYOUT_SCHEDULE_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
            self.payout_schedule_interval_secs = secs;
        }
        if let Some(path) = lookup("SEED_FILE") {
            self.seed_file = Some(PathBuf::from(path));
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("jwt_secret must be set (JWT_SECRET or the config file)");
        }
        if self.min_payout_cents == 0 {
            bail!("min_payout_cents must be greater than zero");
        }
        if self.default_commission_rate_bps as u64 > BPS_DENOMINATOR {
            bail!(
                "default_commission_rate_bps must be at most {BPS_DENOMINATOR}, got {}",
                self.default_commission_rate_bps
            );
        }
        Ok(())
    }
}
