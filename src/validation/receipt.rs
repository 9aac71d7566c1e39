use super::amount::{Amount, AmountError};
use crate::model::{Item, Receipt};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

// Word characters are ASCII letters, digits and `_`; `\s` is ASCII whitespace.
#[allow(clippy::unwrap_used)]
static RETAILER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?-u:[A-Za-z0-9_\s\-&])+$").unwrap());
#[allow(clippy::unwrap_used)]
static DESCRIPTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?-u:[A-Za-z0-9_\s\-])+$").unwrap());
#[allow(clippy::unwrap_used)]
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
#[allow(clippy::unwrap_used)]
static TIME_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").unwrap());

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reasons a receipt document is rejected.
///
/// Variants carry the offending value for logs only; the HTTP boundary maps
/// all of them to the same client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid retailer '{0}'")]
    Retailer(String),

    #[error("invalid purchaseDate '{0}'")]
    PurchaseDate(String),

    #[error("invalid purchaseTime '{0}'")]
    PurchaseTime(String),

    #[error("invalid total: {0}")]
    Total(AmountError),

    #[error("items array cannot be empty")]
    NoItems,

    #[error("invalid shortDescription '{value}' on item {index}")]
    ItemDescription { index: usize, value: String },

    #[error("invalid price on item {index}: {source}")]
    ItemPrice { index: usize, source: AmountError },
}

impl ValidationError {
    /// Stable label for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::Retailer(_) => "retailer",
            ValidationError::PurchaseDate(_) => "purchase_date",
            ValidationError::PurchaseTime(_) => "purchase_time",
            ValidationError::Total(_) => "total",
            ValidationError::NoItems => "items",
            ValidationError::ItemDescription { .. } => "item_description",
            ValidationError::ItemPrice { .. } => "item_price",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedItem {
    pub short_description: String,
    pub price: Amount,
}

/// A receipt that has passed every format check, with its fields parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReceipt {
    source: Receipt,
    purchase_date: NaiveDate,
    purchase_time: NaiveTime,
    total: Amount,
    items: Vec<ValidatedItem>,
}

impl ValidatedReceipt {
    pub fn retailer(&self) -> &str {
        &self.source.retailer
    }

    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_date
    }

    pub fn purchase_time(&self) -> NaiveTime {
        self.purchase_time
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn items(&self) -> &[ValidatedItem] {
        &self.items
    }

    /// The document exactly as submitted.
    pub fn source(&self) -> &Receipt {
        &self.source
    }
}

/// Checks a receipt document and returns its parsed form.
///
/// Checks run in a fixed order and stop at the first failure: retailer,
/// purchase date, purchase time, total, item count, then each item's
/// description and price in sequence.
pub fn validate(receipt: &Receipt) -> ValidationResult<ValidatedReceipt> {
    if !RETAILER_PATTERN.is_match(&receipt.retailer) {
        return Err(ValidationError::Retailer(receipt.retailer.clone()));
    }

    let purchase_date = parse_date(&receipt.purchase_date)?;
    let purchase_time = parse_time(&receipt.purchase_time)?;
    let total = receipt
        .total
        .parse::<Amount>()
        .map_err(ValidationError::Total)?;

    if receipt.items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    let items = receipt
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(ValidatedReceipt {
        source: receipt.clone(),
        purchase_date,
        purchase_time,
        total,
        items,
    })
}

fn parse_date(raw: &str) -> ValidationResult<NaiveDate> {
    let invalid = || ValidationError::PurchaseDate(raw.to_string());
    if !DATE_SHAPE.is_match(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
}

fn parse_time(raw: &str) -> ValidationResult<NaiveTime> {
    let invalid = || ValidationError::PurchaseTime(raw.to_string());
    if !TIME_SHAPE.is_match(raw) {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| invalid())
}

fn validate_item(index: usize, item: &Item) -> ValidationResult<ValidatedItem> {
    if !DESCRIPTION_PATTERN.is_match(&item.short_description) {
        return Err(ValidationError::ItemDescription {
            index,
            value: item.short_description.clone(),
        });
    }

    let price = item
        .price
        .parse::<Amount>()
        .map_err(|source| ValidationError::ItemPrice { index, source })?;

    Ok(ValidatedItem {
        short_description: item.short_description.clone(),
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn item(description: &str, price: &str) -> Item {
        Item {
            short_description: description.to_string(),
            price: price.to_string(),
        }
    }

    fn receipt() -> Receipt {
        Receipt {
            retailer: "M&M Corner Market".to_string(),
            purchase_date: "2022-03-20".to_string(),
            purchase_time: "14:33".to_string(),
            items: vec![item("Gatorade", "2.25"), item("Gatorade", "2.25")],
            total: "4.50".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_receipt() {
        let validated = validate(&receipt()).expect("valid receipt");
        assert_eq!(validated.retailer(), "M&M Corner Market");
        assert_eq!(
            validated.purchase_date(),
            NaiveDate::from_ymd_opt(2022, 3, 20).unwrap()
        );
        assert_eq!(
            validated.purchase_time(),
            NaiveTime::from_hms_opt(14, 33, 0).unwrap()
        );
        assert_eq!(validated.total(), Amount::from_cents(450));
        assert_eq!(validated.items().len(), 2);
        assert_eq!(validated.source(), &receipt());
    }

    #[test]
    fn rejects_bad_retailer() {
        for retailer in ["", "Target!", "Café", "A/B"] {
            let mut doc = receipt();
            doc.retailer = retailer.to_string();
            assert_matches!(validate(&doc), Err(ValidationError::Retailer(_)), "{retailer:?}");
        }
    }

    #[test]
    fn underscores_count_as_word_characters() {
        let mut doc = receipt();
        doc.retailer = "Walgreens_24".to_string();
        doc.items.push(item("Store_Brand Soda", "1.00"));
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn accepts_amounts_beyond_machine_width() {
        let mut doc = receipt();
        doc.total = "99999999999999999999.00".to_string();
        doc.items.push(item("Pepsi", "1.00"));
        let validated = validate(&doc).expect("well-formed total");
        assert!(validated.total().is_round_dollar());
    }

    #[test]
    fn rejects_bad_dates() {
        for date in ["2022-02-30", "2022-1-01", "22-01-01", "2022/01/01", "2022-13-01", ""] {
            let mut doc = receipt();
            doc.purchase_date = date.to_string();
            assert_matches!(
                validate(&doc),
                Err(ValidationError::PurchaseDate(_)),
                "{date:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_times() {
        for time in ["24:00", "12:60", "1:05", "13:01:00", "noon"] {
            let mut doc = receipt();
            doc.purchase_time = time.to_string();
            assert_matches!(
                validate(&doc),
                Err(ValidationError::PurchaseTime(_)),
                "{time:?}"
            );
        }
    }

    #[test]
    fn rejects_total_without_two_decimals() {
        let mut doc = receipt();
        doc.total = "10.5".to_string();
        assert_matches!(
            validate(&doc),
            Err(ValidationError::Total(AmountError::Format(_)))
        );
    }

    #[test]
    fn rejects_empty_items() {
        let mut doc = receipt();
        doc.items.clear();
        assert_eq!(validate(&doc), Err(ValidationError::NoItems));
    }

    #[test]
    fn description_forbids_ampersand() {
        let mut doc = receipt();
        doc.items.push(item("Salt & Pepper", "1.00"));
        assert_matches!(
            validate(&doc),
            Err(ValidationError::ItemDescription { index: 2, .. })
        );
    }

    #[test]
    fn reports_first_bad_item_in_order() {
        let mut doc = receipt();
        doc.items = vec![
            item("Good", "1.00"),
            item("Bad", "1.0"),
            item("Worse!", "1.00"),
        ];
        assert_matches!(
            validate(&doc),
            Err(ValidationError::ItemPrice { index: 1, .. })
        );
    }

    #[test]
    fn retailer_checked_before_total() {
        let mut doc = receipt();
        doc.retailer = "Bad!".to_string();
        doc.total = "bad".to_string();
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.reason(), "retailer");
    }
}
