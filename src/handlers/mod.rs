pub mod commission;
pub mod metrics;
pub mod payouts;
