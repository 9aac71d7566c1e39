//! Exact currency amounts.
//!
//! Totals and prices arrive as text with exactly two fractional digits. They
//! are held as integer cents so the scoring rules never touch binary floating
//! point.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const QUARTER_CENTS: u8 = 25;

#[allow(clippy::unwrap_used)] // pattern is a literal
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]{2}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount '{0}' must be digits followed by exactly two decimal places")]
    Format(String),
}

/// Currency value split into whole units and cents.
///
/// Any amount matching the two-decimal format is accepted. Whole parts wider
/// than `u128` clamp to `u128::MAX`; the cents part is always exact, so the
/// round-dollar and quarter checks never depend on the clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    whole: u128,
    fraction: u8,
}

impl Amount {
    pub const fn from_cents(cents: u64) -> Self {
        Self {
            whole: (cents / 100) as u128,
            fraction: (cents % 100) as u8,
        }
    }

    /// The two digits after the decimal point, as a number.
    pub const fn fraction_cents(&self) -> u8 {
        self.fraction
    }

    /// True when the fractional part is zero (`12.00`).
    pub const fn is_round_dollar(&self) -> bool {
        self.fraction == 0
    }

    /// True when the amount is a multiple of 0.25. A quarter divides one
    /// whole unit, so only the cents part decides.
    pub const fn is_quarter_multiple(&self) -> bool {
        self.fraction % QUARTER_CENTS == 0
    }

    /// Scales by `numerator / denominator` and rounds up, without leaving
    /// integer arithmetic. Returns whole currency units, saturating at
    /// `u64::MAX`.
    pub fn scaled_units_ceil(&self, numerator: u64, denominator: u64) -> u64 {
        let units = self
            .whole
            .saturating_mul(100)
            .saturating_add(u128::from(self.fraction))
            .saturating_mul(u128::from(numerator))
            .div_ceil(u128::from(denominator) * 100);
        u64::try_from(units).unwrap_or(u64::MAX)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || AmountError::Format(raw.to_string());
        if !AMOUNT_PATTERN.is_match(raw) {
            return Err(malformed());
        }

        let (whole, fraction) = raw.split_once('.').ok_or_else(malformed)?;
        // The pattern admits only ASCII digits, so overflow is the sole
        // parse failure for the whole part.
        let whole = whole.parse::<u128>().unwrap_or(u128::MAX);
        let fraction = fraction.parse::<u8>().map_err(|_| malformed())?;

        Ok(Self { whole, fraction })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole, self.fraction)
    }
}
