use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    /// Basis points; `None` falls back to the platform default.
    #[serde(default)]
    pub commission_rate_bps: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub provider_id: String,
    pub customer_id: String,
    pub service_name: String,
    pub total_cents: u64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
