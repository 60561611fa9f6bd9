//! Type-safe price representation using decimal arithmetic.
//!
//! Sample prices are quoted in naira; full-bottle reference prices in US
//! dollars. Display follows the storefront's locale formatting: grouped
//! thousands, no trailing zeros (`₦10,000`, `₦2,499.5`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., naira, not kobo).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A naira price.
    #[must_use]
    pub const fn naira(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::NGN)
    }

    /// Format for display, rounded to two decimal places (e.g., "₦10,000").
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.currency_code, self.amount.round_dp(2).normalize())
    }

    /// Format with the fractional part truncated (e.g., "₦12,500").
    ///
    /// Product cards show whole-unit prices only.
    #[must_use]
    pub fn display_whole(&self) -> String {
        format_amount(self.currency_code, self.amount.trunc())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NGN,
    USD,
    GBP,
    EUR,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::NGN => "₦",
            Self::USD => "$",
            Self::GBP => "£",
            Self::EUR => "€",
        }
    }
}

/// Sign, symbol, then the grouped magnitude (e.g. "-₦1,500").
fn format_amount(currency: CurrencyCode, amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{}", currency.symbol(), group_thousands(amount.abs()))
}

/// Render a non-negative decimal with comma-grouped thousands.
fn group_thousands(amount: Decimal) -> String {
    let text = amount.to_string();
    let (int_part, frac_part) = text
        .split_once('.')
        .map_or((text.as_str(), None), |(i, f)| (i, Some(f)));

    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
