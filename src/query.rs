//! The filter/sort/derive pipeline. Views are always derived from the
//! collection, never stored, and never mutate it.

use std::cmp::Ordering;

use serde::Serialize;
use ts_rs::TS;

use crate::model::{Item, Priority};

/// Sentinel used by the category facet list.
pub const CATEGORY_ALL: &str = "all";

/// Priority facet: everything, or one exact value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// Purchased-state facet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PurchasedFilter {
    #[default]
    All,
    Purchased,
    Unpurchased,
}

/// Category facet: everything, or one exact string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

/// AND-combined filter set. The default matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    /// Free-text query, matched case-insensitively against title,
    /// category, notes, url and each attribute rendered `"key:value"`.
    pub query: String,
    pub priority: PriorityFilter,
    pub purchased: PurchasedFilter,
    pub category: CategoryFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Priority,
    Price,
    TargetDate,
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub dir: SortDir,
}

impl Default for Sort {
    /// Newest first, matching the insert-at-head persisted order.
    fn default() -> Self {
        Sort {
            key: SortKey::CreatedAt,
            dir: SortDir::Desc,
        }
    }
}

/// The derived projection of a collection for display.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct View {
    /// Filtered, sorted items.
    pub items: Vec<Item>,
    /// Distinct non-empty categories over the whole collection,
    /// first-seen order, with a leading `"all"` sentinel.
    pub categories: Vec<String>,
    /// Sum of every item's price, unparsable prices counting as 0.
    pub total_budget: f64,
    /// Same sum restricted to unpurchased items.
    pub total_remaining: f64,
}

/// Derive the display view: filter, sort, aggregate.
///
/// Aggregates and the category facet are computed over the whole
/// collection, not the filtered subset, so the budget line and the facet
/// dropdown stay stable while the user narrows the list.
pub fn derive_view(items: &[Item], filters: &Filters, sort: Sort) -> View {
    let mut visible: Vec<Item> = items
        .iter()
        .filter(|item| matches(item, filters))
        .cloned()
        .collect();
    sort_items(&mut visible, sort);

    let mut categories = vec![CATEGORY_ALL.to_string()];
    for item in items {
        if !item.category.is_empty() && !categories[1..].contains(&item.category) {
            categories.push(item.category.clone());
        }
    }

    let total_budget: f64 = items.iter().map(Item::price_value).sum();
    let total_remaining: f64 = items
        .iter()
        .filter(|item| !item.purchased)
        .map(Item::price_value)
        .sum();

    View {
        items: visible,
        categories,
        total_budget,
        total_remaining,
    }
}

fn matches(item: &Item, filters: &Filters) -> bool {
    matches_query(item, &filters.query)
        && match filters.priority {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => item.priority == priority,
        }
        && match filters.purchased {
            PurchasedFilter::All => true,
            PurchasedFilter::Purchased => item.purchased,
            PurchasedFilter::Unpurchased => !item.purchased,
        }
        && match &filters.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => &item.category == category,
        }
}

fn matches_query(item: &Item, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let direct = [&item.title, &item.category, &item.notes, &item.url]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
    if direct {
        return true;
    }

    item.attributes
        .iter()
        .any(|attr| format!("{}:{}", attr.key, attr.value).to_lowercase().contains(&needle))
}

/// Stable sort: equal keys keep their prior collection order. Direction
/// is applied exactly once, for every key.
fn sort_items(items: &mut [Item], sort: Sort) {
    items.sort_by(|a, b| {
        let ordering = match sort.key {
            SortKey::Priority => a.priority.weight().cmp(&b.priority.weight()),
            SortKey::Price => a
                .price_value()
                .partial_cmp(&b.price_value())
                .unwrap_or(Ordering::Equal),
            SortKey::TargetDate => a.target_date_value().cmp(&b.target_date_value()),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        match sort.dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn item(title: &str) -> Item {
        let mut item = Item::draft();
        item.title = title.into();
        item
    }

    fn by_priority(priority: Priority) -> Item {
        let mut it = item(priority.as_str());
        it.priority = priority;
        it
    }

    #[test]
    fn sort_by_priority_desc_orders_high_medium_low() {
        let items = vec![
            by_priority(Priority::Low),
            by_priority(Priority::High),
            by_priority(Priority::Medium),
        ];
        let view = derive_view(
            &items,
            &Filters::default(),
            Sort {
                key: SortKey::Priority,
                dir: SortDir::Desc,
            },
        );
        let titles: Vec<&str> = view.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["high", "medium", "low"]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut a = item("A");
        let mut b = item("B");
        let mut c = item("C");
        for it in [&mut a, &mut b, &mut c] {
            it.priority = Priority::Medium;
        }
        let items = vec![a, b, c];
        let view = derive_view(
            &items,
            &Filters::default(),
            Sort {
                key: SortKey::Priority,
                dir: SortDir::Asc,
            },
        );
        let titles: Vec<&str> = view.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn title_direction_is_applied_exactly_once() {
        let items = vec![item("banane"), item("Abricot"), item("cerise")];
        let asc = derive_view(
            &items,
            &Filters::default(),
            Sort {
                key: SortKey::Title,
                dir: SortDir::Asc,
            },
        );
        let desc = derive_view(
            &items,
            &Filters::default(),
            Sort {
                key: SortKey::Title,
                dir: SortDir::Desc,
            },
        );
        let asc_titles: Vec<&str> = asc.items.iter().map(|i| i.title.as_str()).collect();
        let mut reversed: Vec<&str> = desc.items.iter().map(|i| i.title.as_str()).collect();
        reversed.reverse();
        assert_eq!(asc_titles, ["Abricot", "banane", "cerise"]);
        assert_eq!(asc_titles, reversed);
    }

    #[test]
    fn unparsable_price_sorts_as_zero() {
        let mut cheap = item("gratuit");
        cheap.price = "n/a".into();
        let mut dear = item("cher");
        dear.price = "99.90".into();
        let items = vec![dear, cheap];
        let view = derive_view(
            &items,
            &Filters::default(),
            Sort {
                key: SortKey::Price,
                dir: SortDir::Asc,
            },
        );
        assert_eq!(view.items[0].title, "gratuit");
    }

    #[test]
    fn missing_target_date_sorts_earliest() {
        let mut dated = item("dated");
        dated.target_date = "2030-01-01".into();
        let undated = item("undated");
        let items = vec![dated, undated];
        let view = derive_view(
            &items,
            &Filters::default(),
            Sort {
                key: SortKey::TargetDate,
                dir: SortDir::Asc,
            },
        );
        assert_eq!(view.items[0].title, "undated");
    }

    #[test]
    fn query_matches_attribute_key_value_rendering() {
        let mut it = item("Casque");
        it.attributes.push(Attribute {
            key: "Couleur".into(),
            value: "Noir mat".into(),
        });
        let other = item("Souris");
        let items = vec![it, other];

        let filters = Filters {
            query: "noir".into(),
            ..Filters::default()
        };
        let view = derive_view(&items, &filters, Sort::default());
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].title, "Casque");
    }

    #[test]
    fn empty_query_matches_everything() {
        let items = vec![item("A"), item("B")];
        let filters = Filters {
            query: "   ".into(),
            ..Filters::default()
        };
        let view = derive_view(&items, &filters, Sort::default());
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn filters_are_and_combined() {
        let mut hit = item("Casque noir");
        hit.category = "Audio".into();
        hit.priority = Priority::High;
        let mut wrong_category = item("Casque noir");
        wrong_category.category = "Bureau".into();
        wrong_category.priority = Priority::High;
        let mut purchased = item("Casque noir");
        purchased.category = "Audio".into();
        purchased.priority = Priority::High;
        purchased.purchased = true;
        let hit_id = hit.id.clone();
        let items = vec![hit, wrong_category, purchased];

        let filters = Filters {
            query: "casque".into(),
            priority: PriorityFilter::Only(Priority::High),
            purchased: PurchasedFilter::Unpurchased,
            category: CategoryFilter::Only("Audio".into()),
        };
        let view = derive_view(&items, &filters, Sort::default());
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].id, hit_id);
    }

    #[test]
    fn aggregates_cover_whole_collection_and_remaining_is_a_subset() {
        let mut bought = item("bought");
        bought.price = "10".into();
        bought.purchased = true;
        let mut wanted = item("wanted");
        wanted.price = "2.5".into();
        let mut garbled = item("garbled");
        garbled.price = "??".into();
        let items = vec![bought, wanted, garbled];

        // narrow filter; aggregates must still span the whole collection
        let filters = Filters {
            query: "wanted".into(),
            ..Filters::default()
        };
        let view = derive_view(&items, &filters, Sort::default());
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_budget, 12.5);
        assert_eq!(view.total_remaining, 2.5);
        assert!(view.total_budget >= view.total_remaining);
    }

    #[test]
    fn nan_price_text_counts_as_zero_in_aggregates() {
        let mut poisoned = item("poisoned");
        poisoned.price = "NaN".into();
        poisoned.purchased = true;
        let mut wanted = item("wanted");
        wanted.price = "10".into();
        let items = vec![poisoned, wanted];

        let view = derive_view(&items, &Filters::default(), Sort::default());
        assert_eq!(view.total_budget, 10.0);
        assert_eq!(view.total_remaining, 10.0);
        assert!(view.total_budget >= view.total_remaining);
    }

    #[test]
    fn categories_are_first_seen_distinct_with_leading_sentinel() {
        let mut a = item("a");
        a.category = "Maison".into();
        let b = item("b");
        let mut c = item("c");
        c.category = "Audio".into();
        let mut d = item("d");
        d.category = "Maison".into();
        let items = vec![a, b, c, d];

        let view = derive_view(&items, &Filters::default(), Sort::default());
        assert_eq!(view.categories, ["all", "Maison", "Audio"]);
    }
}
