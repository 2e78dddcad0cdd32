use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

pub const NOT_AVAILABLE: &str = "N/A";

/// `₱55,000.00` style. Missing values render as `N/A`.
pub fn format_currency(value: Option<Decimal>, symbol: &str) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };

    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((&digits, "00"));

    format!("{}{}{}.{}", sign, symbol, group_thousands(int_part), frac_part)
}

/// Same as [`format_currency`] for a value typed into an edit form.
pub fn format_currency_text(value: &str, symbol: &str) -> String {
    let parsed = Decimal::from_str(value.trim()).ok();
    format_currency(parsed, symbol)
}

pub fn format_hours(value: Option<f64>) -> String {
    match value {
        Some(h) if h.is_finite() => format!("{:.2} hours", h),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Text field, or `N/A` when missing or empty.
pub fn display_text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
