use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::models::booking::{Booking, Provider};
use crate::store::MemoryStore;
use crate::utils::money::BPS_DENOMINATOR;

/// Directory snapshot loaded at startup; bookings and providers are owned by
/// the booking domain, this service only reads them.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let seed: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        seed.validate()
            .with_context(|| format!("invalid seed file {}", path.display()))?;
        Ok(seed)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for provider in &self.providers {
            if let Some(rate) = provider.commission_rate_bps {
                if u64::from(rate) > BPS_DENOMINATOR {
                    bail!(
                        "provider {} has commission_rate_bps {rate}, above {BPS_DENOMINATOR}",
                        provider.id
                    );
                }
            }
        }
        Ok(())
    }

    pub fn apply(self, store: &MemoryStore) {
        let (providers, bookings) = (self.providers.len(), self.bookings.len());
        for provider in self.providers {
            store.upsert_provider(provider);
        }
        for booking in self.bookings {
            store.upsert_booking(booking);
        }
        info!(providers, bookings, "directory seeded");
    }
}
