//! Pure collection mutations. The whole collection is one value replaced
//! wholesale on every operation (copy-on-write): callers keep the prior
//! collection untouched until they adopt the returned one.

use crate::model::{validate_for_save, Attribute, Item, ValidationError};

/// Which half of an attribute pair an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeField {
    Key,
    Value,
}

/// Insert or replace an item.
///
/// Validation runs first; on failure the caller's collection is
/// unchanged (nothing was consumed). When `editing_id` matches an
/// existing item the draft replaces it in place, keeping the `id` and
/// keeping the prior `created_at` unless the draft carries one. In every
/// other case the draft is prepended, newest first.
pub fn upsert(
    items: &[Item],
    draft: &Item,
    editing_id: Option<&str>,
) -> Result<Vec<Item>, ValidationError> {
    validate_for_save(draft)?;

    if let Some(editing_id) = editing_id {
        if items.iter().any(|item| item.id == editing_id) {
            let next = items
                .iter()
                .map(|item| {
                    if item.id == editing_id {
                        let mut replacement = draft.clone();
                        replacement.id = item.id.clone();
                        if replacement.created_at == 0 {
                            replacement.created_at = item.created_at;
                        }
                        replacement
                    } else {
                        item.clone()
                    }
                })
                .collect();
            return Ok(next);
        }
    }

    let mut next = Vec::with_capacity(items.len() + 1);
    next.push(draft.clone());
    next.extend(items.iter().cloned());
    Ok(next)
}

/// Remove the item with `id`. Idempotent: a repeated delete on an
/// already-removed entry changes nothing and is not an error.
pub fn remove(items: &[Item], id: &str) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.id != id)
        .cloned()
        .collect()
}

/// Flip the purchased flag on the matching item; no-op when absent.
pub fn toggle_purchased(items: &[Item], id: &str) -> Vec<Item> {
    items
        .iter()
        .map(|item| {
            if item.id == id {
                let mut toggled = item.clone();
                toggled.purchased = !item.purchased;
                toggled
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Append an empty attribute pair to an in-progress draft.
pub fn add_attribute(draft: &mut Item) {
    draft.attributes.push(Attribute::default());
}

/// Edit one half of an attribute pair. Out-of-range indexes are no-ops.
pub fn update_attribute(draft: &mut Item, index: usize, field: AttributeField, value: &str) {
    if let Some(attribute) = draft.attributes.get_mut(index) {
        match field {
            AttributeField::Key => attribute.key = value.to_string(),
            AttributeField::Value => attribute.value = value.to_string(),
        }
    }
}

/// Remove one attribute pair, preserving the order of the survivors.
pub fn remove_attribute(draft: &mut Item, index: usize) {
    if index < draft.attributes.len() {
        draft.attributes.remove(index);
    }
}
