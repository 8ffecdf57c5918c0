use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use url::Url;

use crate::{id, time};

/// Importance of an item, ordered `Low < Medium < High` by weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Default for a freshly created draft.
    pub const DRAFT_DEFAULT: Priority = Priority::High;
    /// Default applied when an imported document carries no recognizable
    /// priority. Deliberately distinct from [`Priority::DRAFT_DEFAULT`]:
    /// the two defaults are independent decisions in the product.
    pub const IMPORT_DEFAULT: Priority = Priority::Medium;

    /// Display weight used for sorting (1–3).
    pub fn weight(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Strict parse; anything but the three known labels is `None`.
    pub fn parse(raw: &str) -> Option<Priority> {
        match raw {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DRAFT_DEFAULT
    }
}

/// One ordered key/value pair attached to an item. Order is
/// user-meaningful, so attributes are a sequence, never a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Attribute {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// One shopping-list entry, the sole persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Raw user text; unparsable values are kept verbatim and coerce to
    /// `0.0` in every aggregate and sort computation.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    /// Raw `YYYY-MM-DD`, empty when unset.
    #[serde(default)]
    pub target_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    #[ts(type = "number")]
    pub created_at: i64,
    #[serde(default)]
    pub image_url: String,
}

impl Item {
    /// A fresh draft: new id, draft-default priority, current timestamp,
    /// everything else empty or false.
    pub fn draft() -> Item {
        Item {
            id: id::new_uuid_v7(),
            title: String::new(),
            url: String::new(),
            price: String::new(),
            priority: Priority::DRAFT_DEFAULT,
            category: String::new(),
            target_date: String::new(),
            notes: String::new(),
            attributes: Vec::new(),
            purchased: false,
            created_at: time::now_ms(),
            image_url: String::new(),
        }
    }

    /// Numeric price for aggregates and sorting. Reads the longest
    /// leading numeric prefix, so `"99.90 EUR"` is 99.9; empty,
    /// unparsable or non-finite input is exactly 0.0.
    pub fn price_value(&self) -> f64 {
        leading_float(self.price.trim())
    }

    /// Target date for sorting; missing or malformed → the epoch origin
    /// (`NaiveDate::default()` is 1970-01-01).
    pub fn target_date_value(&self) -> NaiveDate {
        NaiveDate::parse_from_str(self.target_date.trim(), "%Y-%m-%d").unwrap_or_default()
    }
}

/// Longest leading numeric prefix of `raw`, or 0.0. Only literal float
/// syntax counts: the alphabetic spellings `NaN`/`inf` never match, so
/// the result is always finite and aggregates stay well-ordered.
fn leading_float(raw: &str) -> f64 {
    let mut end = 0;
    for (idx, ch) in raw.char_indices() {
        if ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E') {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }

    let mut slice = &raw[..end];
    loop {
        if slice.is_empty() {
            return 0.0;
        }
        if let Ok(value) = slice.parse::<f64>() {
            return if value.is_finite() { value } else { 0.0 };
        }
        // drop one trailing byte and retry; the scanned region is ASCII
        slice = &slice[..slice.len() - 1];
    }
}

/// Save-time validation failures. Both are recoverable: the draft stays
/// in the form and the user corrects and resubmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("url must be a well-formed absolute URL")]
    InvalidUrl,
}

/// Gate a draft before it enters the collection. Only the title and the
/// url are validated; price, dates and attributes are accepted as-is and
/// coerced defensively elsewhere.
pub fn validate_for_save(item: &Item) -> Result<(), ValidationError> {
    if item.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if !item.url.is_empty() && Url::parse(&item.url).is_err() {
        return Err(ValidationError::InvalidUrl);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_starts_with_defaults() {
        let draft = Item::draft();
        assert!(!draft.id.is_empty());
        assert_eq!(draft.priority, Priority::High);
        assert!(draft.title.is_empty());
        assert!(draft.attributes.is_empty());
        assert!(!draft.purchased);
        assert!(draft.created_at > 1_500_000_000_000);
    }

    #[test]
    fn two_drafts_never_share_an_id() {
        assert_ne!(Item::draft().id, Item::draft().id);
    }

    #[test]
    fn priority_weights_are_ordered() {
        assert!(Priority::Low.weight() < Priority::Medium.weight());
        assert!(Priority::Medium.weight() < Priority::High.weight());
    }

    #[test]
    fn priority_parse_rejects_unknown_labels() {
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::parse("HIGH"), None);
        assert_eq!(Priority::parse(""), None);
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let mut draft = Item::draft();
        draft.title = "   ".into();
        assert_eq!(validate_for_save(&draft), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn malformed_url_is_rejected_but_empty_is_fine() {
        let mut draft = Item::draft();
        draft.title = "Casque".into();
        draft.url = "not a url".into();
        assert_eq!(validate_for_save(&draft), Err(ValidationError::InvalidUrl));

        draft.url = String::new();
        assert_eq!(validate_for_save(&draft), Ok(()));

        draft.url = "https://example.com/produit/42".into();
        assert_eq!(validate_for_save(&draft), Ok(()));
    }

    #[test]
    fn price_value_coerces_garbage_to_zero() {
        let mut item = Item::draft();
        item.price = "12.50".into();
        assert_eq!(item.price_value(), 12.5);
        item.price = "douze".into();
        assert_eq!(item.price_value(), 0.0);
        item.price = String::new();
        assert_eq!(item.price_value(), 0.0);
    }

    #[test]
    fn price_value_reads_the_leading_numeric_prefix() {
        let mut item = Item::draft();
        item.price = "99.90 EUR".into();
        assert_eq!(item.price_value(), 99.9);
        item.price = "-5,00".into();
        assert_eq!(item.price_value(), -5.0);
        item.price = "12.5.3".into();
        assert_eq!(item.price_value(), 12.5);
        item.price = "EUR 99.90".into();
        assert_eq!(item.price_value(), 0.0);
    }

    #[test]
    fn price_value_is_always_finite() {
        let mut item = Item::draft();
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", "1e999", "-"] {
            item.price = raw.into();
            let value = item.price_value();
            assert!(value.is_finite(), "{raw:?} must coerce to a finite value");
        }
        item.price = "NaN".into();
        assert_eq!(item.price_value(), 0.0);
        item.price = "inf".into();
        assert_eq!(item.price_value(), 0.0);
    }

    #[test]
    fn target_date_value_defaults_to_epoch() {
        let mut item = Item::draft();
        item.target_date = "2024-06-01".into();
        assert_eq!(
            item.target_date_value(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        item.target_date = String::new();
        assert_eq!(
            item.target_date_value(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        item.target_date = "someday".into();
        assert_eq!(
            item.target_date_value(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
    }

    #[test]
    fn item_serializes_with_camel_case_wire_names() {
        let mut item = Item::draft();
        item.title = "Lampe".into();
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("targetDate").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("imageUrl").is_some());
        assert_eq!(json.get("priority").and_then(|v| v.as_str()), Some("high"));
    }
}
