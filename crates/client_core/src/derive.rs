//! Pure view derivations over borrowed state. Nothing here mutates its
//! inputs or caches results; every call recomputes from the snapshot given.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use regex::Regex;
use shared::domain::{Lesson, LessonId};

use crate::{
    cart::Cart,
    catalog::CatalogStore,
    checkout::CustomerForm,
    filters::{FilterState, SortDirection, SortField, SortKey, StockFilter},
};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("valid name pattern"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s+-]+$").expect("valid phone pattern"));

#[derive(Debug, Clone, PartialEq)]
pub struct CartSummaryEntry {
    pub lesson_id: LessonId,
    pub subject: String,
    pub location: String,
    pub price: f64,
    pub qty: u32,
    pub can_increase: bool,
}

pub fn displayed_lessons(store: &CatalogStore, filters: &FilterState) -> Vec<Lesson> {
    let mut lessons: Vec<Lesson> = store
        .lessons()
        .iter()
        .filter(|lesson| lesson.price >= filters.min_price && lesson.price <= filters.max_price)
        .filter(|lesson| {
            filters.location_filter.is_empty() || lesson.location == filters.location_filter
        })
        .filter(|lesson| match filters.filter_key {
            StockFilter::All => true,
            StockFilter::Available => lesson.spaces > 0,
            StockFilter::SoldOut => lesson.spaces == 0,
        })
        .cloned()
        .collect();

    // `sort_by` is stable, so ties keep catalog order.
    lessons.sort_by(|a, b| compare_lessons(a, b, &filters.sort_key));
    lessons
}

fn compare_lessons(a: &Lesson, b: &Lesson, key: &SortKey) -> Ordering {
    let ordering = match &key.field {
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Spaces => a.spaces.cmp(&b.spaces),
        SortField::Subject => locale_compare(&a.subject, &b.subject),
        SortField::Location => locale_compare(&a.location, &b.location),
        SortField::Id => locale_compare(&a.id.0, &b.id.0),
        SortField::Other(_) => Ordering::Equal,
    };
    match key.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Root-collation style ordering: letters compare case-insensitively first,
/// and only strings differing solely in case fall back to lowercase-first.
///
/// Diacritics are not folded, so accented letters order by code point after
/// the whole ASCII range (`"Éclair"` sorts after `"Zumba"`).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub fn location_options(store: &CatalogStore) -> Vec<String> {
    let mut seen = HashSet::new();
    store
        .lessons()
        .iter()
        .map(|lesson| lesson.location.as_str())
        .filter(|location| !location.is_empty())
        .filter(|location| seen.insert(*location))
        .map(str::to_string)
        .collect()
}

pub fn cart_summary(cart: &Cart, store: &CatalogStore) -> Vec<CartSummaryEntry> {
    let mut entries: Vec<CartSummaryEntry> = Vec::new();
    let mut index: HashMap<&LessonId, usize> = HashMap::new();

    for line in cart.lines() {
        if let Some(&position) = index.get(&line.lesson_id) {
            entries[position].qty += 1;
            continue;
        }
        index.insert(&line.lesson_id, entries.len());
        entries.push(CartSummaryEntry {
            lesson_id: line.lesson_id.clone(),
            subject: line.subject.clone(),
            location: line.location.clone(),
            price: line.price,
            qty: 1,
            can_increase: false,
        });
    }

    for entry in &mut entries {
        entry.can_increase = store
            .find(&entry.lesson_id)
            .is_some_and(Lesson::is_available);
    }
    entries
}

pub fn cart_total(cart: &Cart) -> f64 {
    cart.lines().iter().map(|line| line.price).sum()
}

/// Email is collected but intentionally not checked here.
pub fn valid_customer(form: &CustomerForm) -> bool {
    let name = form.name.trim();
    let phone = form.phone.trim();
    !name.is_empty()
        && NAME_PATTERN.is_match(name)
        && !phone.is_empty()
        && PHONE_PATTERN.is_match(phone)
        && !form.address.trim().is_empty()
}

#[cfg(test)]
#[path = "tests/derive_tests.rs"]
mod tests;
