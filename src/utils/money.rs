// Utilitários para manipulação de valores monetários.
// Valores em centavos, taxas em basis points (1000 = 10%).

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Platform cut of `total_cents` at `rate_bps`, rounded half-up to the cent.
pub fn commission_for(total_cents: u64, rate_bps: u32) -> u64 {
    let raw = total_cents as u128 * rate_bps as u128;
    let rounded = (raw + BPS_DENOMINATOR as u128 / 2) / BPS_DENOMINATOR as u128;
    rounded.min(total_cents as u128) as u64
}

/// Splits a total into `(commission, earning)`. The two always add up to the total.
pub fn split_total(total_cents: u64, rate_bps: u32) -> (u64, u64) {
    let commission = commission_for(total_cents, rate_bps);
    (commission, total_cents - commission)
}

/// Effective rate in percent, used by the analytics report.
pub fn effective_rate_percent(commission_cents: u64, total_cents: u64) -> f64 {
    if total_cents == 0 {
        return 0.0;
    }
    (commission_cents as f64 / total_cents as f64) * 100.0
}

pub fn format_currency(amount: u64) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}
