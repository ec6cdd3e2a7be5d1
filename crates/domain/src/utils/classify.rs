//! Event-type classification from free-text title and description
//!
//! Case-insensitive substring rules checked in a fixed order; the first match
//! wins and anything unmatched is a "special" event. Pure and total: the same
//! input always yields the same category and there is no failure mode.

use crate::types::EventCategory;

/// Keyword rules in match-priority order
const RULES: &[(&str, EventCategory)] = &[
    ("rehearsal", EventCategory::Rehearsal),
    ("concert", EventCategory::Concert),
    ("sectional", EventCategory::Sectional),
    ("tour", EventCategory::Tour),
];

/// Map an event's title and description to exactly one category
pub fn classify_event(title: &str, description: &str) -> EventCategory {
    let haystack = format!("{title} {description}").to_lowercase();

    for (keyword, category) in RULES {
        if haystack.contains(keyword) {
            return *category;
        }
    }

    EventCategory::Special
}
