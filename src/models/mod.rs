pub mod booking;
pub mod commission;
pub mod payout;
pub mod report;
