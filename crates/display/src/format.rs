use configuration::FormattingConfig;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder for a figure that could not be computed this cycle.
pub const NOT_AVAILABLE: &str = "N/A";

/// International currency form: `USD 13,000.00`.
///
/// Rounds half away from zero to two places and groups the integer part with
/// the configured separators.
pub fn format_currency(amount: Decimal, code: &str, format: &FormattingConfig) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    format!(
        "{sign}{code} {}{}{fraction}",
        group_thousands(integer, &format.thousands_separator),
        format.decimal_separator
    )
}

/// `format_currency` for an optional amount.
pub fn format_optional_currency(amount: Option<Decimal>, code: &str, format: &FormattingConfig) -> String {
    match amount {
        Some(amount) => format_currency(amount, code, format),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Signed two-decimal percentage, `+1.25 %`, or `N/A`.
pub fn format_percent(pct: Option<Decimal>) -> String {
    let Some(pct) = pct else {
        return NOT_AVAILABLE.to_string();
    };
    let mut rounded = pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    let sign = if rounded > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{rounded:.2} %")
}

/// Native balance without trailing zeros.
pub fn format_balance(balance: Decimal) -> String {
    balance.normalize().to_string()
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}
