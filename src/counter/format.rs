use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// The one target the stats section shows with a decimal place.
pub const ONE_DECIMAL_TARGET: f64 = 4.9;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberFormat {
    /// Plain below 1,000, then `K` and `M` with one decimal.
    Compact,
    Fixed(u32),
}

impl NumberFormat {
    pub fn for_target(target: f64) -> Self {
        if target == ONE_DECIMAL_TARGET {
            NumberFormat::Fixed(1)
        } else {
            NumberFormat::Compact
        }
    }

    pub fn render(self, value: f64) -> String {
        match self {
            NumberFormat::Compact => format_compact(value),
            NumberFormat::Fixed(decimals) => format_fixed(value, decimals),
        }
    }
}

pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", format_fixed(value / 1_000_000.0, 1))
    } else if value >= 1_000.0 {
        format!("{}K", format_fixed(value / 1_000.0, 1))
    } else {
        format_plain(value)
    }
}

/// Rounds the stored binary value half away from zero and always prints
/// `decimals` places, so `1.45` (stored just below) becomes `1.4`.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    match Decimal::from_str(&format!("{value:.18}")) {
        Ok(decimal) => {
            let mut rounded =
                decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(decimals);
            rounded.to_string()
        }
        Err(_) => format!("{value:.prec$}", prec = decimals as usize),
    }
}

/// Shortest decimal form without trailing zeros.
pub fn format_plain(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(decimal) => decimal.normalize().to_string(),
        None => value.to_string(),
    }
}
