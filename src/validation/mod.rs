//! Receipt document validation.
//!
//! Submitted receipts are checked against a fixed set of field formats before
//! they are stored or scored:
//! - retailer: letters, digits, whitespace, `-` and `&`
//! - purchase date: `YYYY-MM-DD`, a real calendar date
//! - purchase time: 24-hour `HH:MM`
//! - total and item prices: digits with exactly two decimal places
//! - at least one item; item descriptions allow letters, digits, whitespace
//!   and `-` (no `&`)
//!
//! Acceptance produces a [`ValidatedReceipt`] carrying parsed dates, times and
//! [`Amount`]s, which is the only input the points rules accept.

pub mod amount;
pub mod receipt;

pub use amount::{Amount, AmountError};
pub use receipt::{
    ValidatedItem, ValidatedReceipt, ValidationError, ValidationResult, validate,
};
