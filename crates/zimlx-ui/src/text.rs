//! String helpers for labels, search and database queries.

use std::cmp::Ordering;
use std::fmt::Display;

/// Highest character of the basic multilingual plane, appended to a query to
/// test whether it is a prefix under collation.
const MAX_UNICODE: char = '\u{FFFF}';

/// Locale-aware string ordering.
pub trait Collator {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// A collator that ignores case and otherwise orders by code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveCollator;

impl Collator for CaseInsensitiveCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase))
    }
}

/// Check whether `target` is a search result for `query`.
///
/// `target` matches when it collates equal to `query`, starts with it, or
/// contains it ignoring case.
pub fn matches(collator: &dyn Collator, query: &str, target: &str) -> bool {
    match collator.compare(query, target) {
        Ordering::Equal => true,
        Ordering::Less => {
            // A query that sorts above the target once padded was a prefix.
            let padded = format!("{query}{MAX_UNICODE}");
            collator.compare(&padded, target) != Ordering::Less
                || target.to_lowercase().contains(&query.to_lowercase())
        }
        Ordering::Greater => false,
    }
}

/// Upper-case the first letter of every space-separated word.
pub fn title_case(s: &str) -> String {
    s.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `None` for an empty string.
pub fn as_non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// Strip leading and trailing whitespace, including no-break spaces.
pub fn trim(s: &str) -> &str {
    s.trim_matches(char::is_whitespace)
}

/// A `column IN (a, b, ...)` selection clause.
pub fn db_selection_query<I>(column: &str, values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    format!("{column} IN ({})", values.join(", "))
}
