//! Defensive JSON import. Individual fields never fail: every absence or
//! type mismatch has a defined, typed default. Only the top-level shape
//! can reject the whole document, and in that case the caller's existing
//! collection stays untouched.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use crate::id;
use crate::model::{Attribute, Item, Priority};

#[derive(Debug, Error)]
pub enum ImportError {
    /// Top-level value is not an array of items.
    #[error("expected a top-level array of items")]
    InvalidFormat,
    /// Input is not JSON at all.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What normalization had to fix up. Informational only; per-field
/// anomalies are never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ImportReport {
    /// Items in the imported collection.
    #[ts(type = "number")]
    pub items: usize,
    /// Items that arrived without a usable id.
    #[ts(type = "number")]
    pub minted_ids: usize,
    /// Priorities that were present but unrecognized.
    #[ts(type = "number")]
    pub coerced_priorities: usize,
    /// Attribute payloads that were not arrays and got dropped.
    #[ts(type = "number")]
    pub dropped_attributes: usize,
}

/// Parse and normalize a whole collection. The result replaces the
/// current collection; it is never merged.
pub fn import_items(raw: &str, now_ms: i64) -> Result<(Vec<Item>, ImportReport), ImportError> {
    let document: Value = serde_json::from_str(raw)?;
    let entries = document.as_array().ok_or(ImportError::InvalidFormat)?;

    let mut report = ImportReport {
        items: entries.len(),
        ..ImportReport::default()
    };
    let items = entries
        .iter()
        .map(|entry| normalize_item(entry, now_ms, &mut report))
        .collect();

    info!(
        target: "liste_achats",
        event = "import_complete",
        items = report.items,
        minted_ids = report.minted_ids,
        coerced_priorities = report.coerced_priorities,
        dropped_attributes = report.dropped_attributes,
    );

    Ok((items, report))
}

/// Normalize one element of an imported document. Idempotent on data the
/// engine exported itself.
pub fn normalize_item(value: &Value, now_ms: i64, report: &mut ImportReport) -> Item {
    Item {
        id: normalize_id(value.get("id"), report),
        title: string_or_empty(value.get("title")),
        url: string_or_empty(value.get("url")),
        price: normalize_price(value.get("price")),
        priority: normalize_priority(value.get("priority"), report),
        category: string_or_empty(value.get("category")),
        target_date: string_or_empty(value.get("targetDate")),
        notes: string_or_empty(value.get("notes")),
        attributes: normalize_attributes(value.get("attributes"), report),
        purchased: truthy(value.get("purchased")),
        created_at: value
            .get("createdAt")
            .and_then(Value::as_i64)
            .unwrap_or(now_ms),
        image_url: string_or_empty(value.get("imageUrl")),
    }
}

fn normalize_id(value: Option<&Value>, report: &mut ImportReport) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            report.minted_ids += 1;
            id::new_uuid_v7()
        }
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Price passes through whether it arrived as a string or a number; it is
/// only ever coerced at computation time, never at import time.
fn normalize_price(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn normalize_priority(value: Option<&Value>, report: &mut ImportReport) -> Priority {
    match value {
        None | Some(Value::Null) => Priority::IMPORT_DEFAULT,
        Some(raw) => match raw.as_str().and_then(Priority::parse) {
            Some(priority) => priority,
            None => {
                report.coerced_priorities += 1;
                Priority::IMPORT_DEFAULT
            }
        },
    }
}

fn normalize_attributes(value: Option<&Value>, report: &mut ImportReport) -> Vec<Attribute> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| Attribute {
                key: string_or_empty(entry.get("key")),
                value: string_or_empty(entry.get("value")),
            })
            .collect(),
        Some(_) => {
            report.dropped_attributes += 1;
            Vec::new()
        }
    }
}

/// JavaScript truthiness, made explicit: the original import coerced
/// `purchased` with `!!`.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
