//! Points awarded for a validated receipt.
//!
//! The total is the sum of independent rules; none of them caps or clamps the
//! running score.

use crate::validation::{Amount, ValidatedItem, ValidatedReceipt};
use chrono::{Datelike, NaiveTime};
use serde::Serialize;

const ROUND_DOLLAR_BONUS: u64 = 50;
const QUARTER_MULTIPLE_BONUS: u64 = 25;
const POINTS_PER_ITEM_PAIR: u64 = 5;
const ODD_DAY_BONUS: u64 = 6;
const AFTERNOON_BONUS: u64 = 10;
const AFTERNOON_START: (u32, u32) = (14, 0);
const AFTERNOON_END: (u32, u32) = (16, 0);
// Description bonus multiplies the price by 0.2 (= 1/5).
const DESCRIPTION_MULTIPLIER: (u64, u64) = (1, 5);

/// Per-rule contributions to a receipt's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PointsBreakdown {
    pub retailer: u64,
    pub round_dollar: u64,
    pub quarter_multiple: u64,
    pub item_pairs: u64,
    pub descriptions: u64,
    pub odd_day: u64,
    pub afternoon: u64,
}

impl PointsBreakdown {
    pub fn total(&self) -> u64 {
        [
            self.retailer,
            self.round_dollar,
            self.quarter_multiple,
            self.item_pairs,
            self.descriptions,
            self.odd_day,
            self.afternoon,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }
}

pub fn score(receipt: &ValidatedReceipt) -> u64 {
    breakdown(receipt).total()
}

pub fn breakdown(receipt: &ValidatedReceipt) -> PointsBreakdown {
    let total = receipt.total();
    PointsBreakdown {
        retailer: retailer_points(receipt.retailer()),
        round_dollar: if total.is_round_dollar() {
            ROUND_DOLLAR_BONUS
        } else {
            0
        },
        quarter_multiple: if total.is_quarter_multiple() {
            QUARTER_MULTIPLE_BONUS
        } else {
            0
        },
        item_pairs: item_pair_points(receipt.items().len()),
        descriptions: receipt
            .items()
            .iter()
            .map(description_points)
            .fold(0u64, u64::saturating_add),
        odd_day: if receipt.purchase_date().day() % 2 == 1 {
            ODD_DAY_BONUS
        } else {
            0
        },
        afternoon: if in_afternoon_window(receipt.purchase_time()) {
            AFTERNOON_BONUS
        } else {
            0
        },
    }
}

/// One point per ASCII letter or digit.
fn retailer_points(retailer: &str) -> u64 {
    retailer.chars().filter(char::is_ascii_alphanumeric).count() as u64
}

fn item_pair_points(item_count: usize) -> u64 {
    (item_count / 2) as u64 * POINTS_PER_ITEM_PAIR
}

fn description_points(item: &ValidatedItem) -> u64 {
    let trimmed = item.short_description.trim();
    if trimmed.chars().count() % 3 == 0 {
        price_share(item.price)
    } else {
        0
    }
}

fn price_share(price: Amount) -> u64 {
    let (numerator, denominator) = DESCRIPTION_MULTIPLIER;
    price.scaled_units_ceil(numerator, denominator)
}

/// Strictly between 14:00 and 16:00; both boundaries are excluded.
fn in_afternoon_window(time: NaiveTime) -> bool {
    let bound = |(hour, minute): (u32, u32)| NaiveTime::from_hms_opt(hour, minute, 0);
    match (bound(AFTERNOON_START), bound(AFTERNOON_END)) {
        (Some(start), Some(end)) => time > start && time < end,
        _ => false,
    }
}
