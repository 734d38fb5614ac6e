pub mod atomic_metrics;
pub mod commission_service;
pub mod payout_batcher;
pub mod payout_service;
pub mod scheduler;

pub use atomic_metrics::AtomicMetrics;
pub use commission_service::CommissionService;
pub use payout_batcher::PayoutBatcher;
pub use payout_service::PayoutService;
