//! Multi-keyword, line-scoped pack filtering.
//!
//! A query/exclude pair is evaluated against a pack's item lines:
//!
//! 1. A query that is exactly the pack id (all digits) matches
//!    unconditionally, bypassing exclusion.
//! 2. Every query keyword must occur as a case-insensitive substring
//!    somewhere in the joined item text. An empty query passes.
//! 3. Exclusion is line-scoped: only lines that contain a query keyword
//!    (every line, when the query is empty) are checked against the
//!    exclude keywords. An excluded word on an unrelated line elsewhere in
//!    the bundle must not reject the pack.
//!
//! Malformed query strings never fail: empty keyword lists degrade to
//! "match everything" / "no exclusion".

use crate::model::Pack;

/// Evaluate a query/exclude keyword pair against a pack.
pub fn matches(pack: &Pack, query: &str, exclude: &str) -> bool {
    let raw_query = query.trim();

    // Exact id lookup bypasses all further filtering, including excludes.
    if !raw_query.is_empty()
        && raw_query.bytes().all(|b| b.is_ascii_digit())
        && raw_query == pack.id().as_str()
    {
        return true;
    }

    let query_keywords = keywords(raw_query);
    let exclude_keywords = keywords(exclude);

    // Every query keyword must appear somewhere in the bundle.
    let all_items = pack.items_text_lower();
    if query_keywords.iter().any(|kw| !all_items.contains(kw.as_str())) {
        return false;
    }

    if exclude_keywords.is_empty() {
        return true;
    }

    for item in pack.items() {
        let line = item.to_lowercase();
        let relevant =
            query_keywords.is_empty() || query_keywords.iter().any(|kw| line.contains(kw.as_str()));
        if relevant && exclude_keywords.iter().any(|kw| line.contains(kw.as_str())) {
            return false;
        }
    }
    true
}

/// Split a raw filter string into lowercase whitespace-separated keywords.
fn keywords(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pack, PackId};

    fn pack(id: &str, items: &[&str]) -> Pack {
        Pack::new(
            PackId::new(id).expect("valid id"),
            items.iter().map(|s| s.to_string()).collect(),
            10,
            3000,
        )
    }

    #[test]
    fn empty_query_and_exclude_match_everything() {
        let p = pack("1", &["Mario Kart 8"]);
        assert!(matches(&p, "", ""));
        assert!(matches(&p, "   ", ""));
    }

    #[test]
    fn id_query_matches_exactly() {
        let p = pack("5", &["Mario Kart 8"]);
        assert!(matches(&p, "5", ""));
        assert!(!matches(&p, "55", ""));
    }

    #[test]
    fn id_query_bypasses_exclusion() {
        let p = pack("5", &["Mario Kart 8"]);
        assert!(
            matches(&p, "5", "mario"),
            "Exact id lookup must ignore exclude keywords"
        );
    }

    #[test]
    fn id_digits_must_match_id_not_items() {
        let p = pack("5", &["Game 7"]);
        // "7" is all digits but not the id, so it falls through to keyword
        // matching and matches the item text.
        assert!(matches(&p, "7", ""));
        assert!(!matches(&p, "9", ""));
    }

    #[test]
    fn all_query_keywords_must_be_present() {
        let p = pack("1", &["Mario Kart 8", "Pokemon Sword"]);
        assert!(matches(&p, "mario pokemon", ""));
        assert!(!matches(&p, "mario zelda", ""));
    }

    #[test]
    fn query_keywords_may_span_different_lines() {
        let p = pack("1", &["Mario Kart 8", "Pokemon Sword"]);
        assert!(
            matches(&p, "kart sword", ""),
            "Keywords match against the whole bundle, not a single line"
        );
    }

    #[test]
    fn query_is_case_insensitive() {
        let p = pack("1", &["Mario Kart 8"]);
        assert!(matches(&p, "MARIO", ""));
    }

    #[test]
    fn exclusion_rejects_when_on_a_relevant_line() {
        let p = pack("1", &["Mario Kart 8", "Pokemon Sword"]);
        assert!(
            !matches(&p, "mario", "kart"),
            "The matched line contains the excluded word"
        );
    }

    #[test]
    fn exclusion_ignores_unrelated_lines() {
        let p = pack("1", &["Mario Kart 8", "Pokemon Sword"]);
        assert!(
            matches(&p, "mario", "sword"),
            "Excluded word appears only on a non-relevant line"
        );
    }

    #[test]
    fn empty_query_makes_every_line_relevant_for_exclusion() {
        let p = pack("1", &["Mario Kart 8", "Pokemon Sword"]);
        assert!(!matches(&p, "", "sword"));
        assert!(matches(&p, "", "zelda"));
    }

    #[test]
    fn multiple_exclude_keywords_any_rejects() {
        let p = pack("1", &["Mario Kart 8"]);
        assert!(!matches(&p, "mario", "zelda kart"));
    }
}
