use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places used for every currency figure in reports and exports
pub const CURRENCY_SCALE: u32 = 2;

/// Decimal places used for percentages at the display boundary
pub const PERCENT_SCALE: u32 = 2;

/// Convert a Decimal aggregate to f64 for JSON output.
///
/// Only called once all arithmetic on the value is finished.
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

/// Read a 2 dp currency figure from a serialised report back into a Decimal.
///
/// Used when re-aggregating already generated reports; non-finite values become zero.
pub fn from_money(amount: f64) -> Decimal {
    Decimal::from_f64(amount)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a currency amount to 2 dp (half away from zero) and convert for output
pub fn money(amount: Decimal) -> f64 {
    to_f64(amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Round a percentage to 2 dp and convert for output
pub fn percent(value: Decimal) -> f64 {
    to_f64(value.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// `numerator / denominator`, or zero when the denominator is zero
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Share of `part` in `total` as a percentage (0 when total is zero)
pub fn share_pct(part: Decimal, total: Decimal) -> Decimal {
    safe_div(part * Decimal::ONE_HUNDRED, total)
}

/// Growth of `current` over `previous` in percent; defined as 0 when previous is 0
pub fn growth_pct(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        Decimal::ZERO
    } else {
        (current - previous) / previous * Decimal::ONE_HUNDRED
    }
}

/// Format a currency value with a fixed 2-decimal convention (e.g. "1234.50")
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Format a percentage with 2 decimals and a percent sign (e.g. "12.50%")
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}
