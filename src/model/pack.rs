//! The pack listing record and its derived views.
//!
//! A [`Pack`] is immutable once constructed by the parser. Derived views
//! (content fingerprint, formatted text, serializable [`PackView`]) are
//! computed on demand from the immutable fields.

use crate::model::PackId;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// A structured pack listing extracted from one raw chat message.
///
/// Invariants (enforced by the parser, the only constructor site):
/// - `items` is non-empty
/// - `display_price == base_price * multiplier` used at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    id: PackId,
    items: Vec<String>,
    base_price: u64,
    display_price: u64,
}

impl Pack {
    /// Construct a pack. `items` must be non-empty; the parser guarantees
    /// this before calling.
    pub(crate) fn new(id: PackId, items: Vec<String>, base_price: u64, multiplier: u64) -> Self {
        debug_assert!(!items.is_empty(), "parser must reject empty item lists");
        Self {
            id,
            items,
            base_price,
            display_price: base_price.saturating_mul(multiplier),
        }
    }

    pub fn id(&self) -> &PackId {
        &self.id
    }

    /// Item lines in the order they appeared in the source message.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Price as written in the source message.
    pub fn base_price(&self) -> u64 {
        self.base_price
    }

    /// Price after applying the configured multiplier.
    pub fn display_price(&self) -> u64 {
        self.display_price
    }

    /// All item lines joined with spaces and lowercased, the haystack used
    /// by keyword filtering and cover resolution.
    pub fn items_text_lower(&self) -> String {
        self.items.join(" ").to_lowercase()
    }

    /// Stable content fingerprint over the item list only.
    ///
    /// Items are trimmed, case-folded, and sorted before hashing, so the
    /// fingerprint is invariant to item order and letter case. Price is
    /// deliberately excluded: a repost of the same bundle at a different
    /// price is the same logical pack.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut normalized: Vec<String> = self
            .items
            .iter()
            .map(|item| item.trim().to_lowercase())
            .collect();
        normalized.sort();

        let mut hasher = Sha256::new();
        hasher.update(normalized.join("|").as_bytes());
        Fingerprint(hasher.finalize().into())
    }

    /// Render the customer-facing listing text.
    ///
    /// Items matching a best-seller keyword are wrapped in a highlight
    /// marker and emphasis markup. The display price is formatted with `.`
    /// as thousands separator and no decimals.
    pub fn formatted_text(&self, best_sellers: &[String]) -> String {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|item| {
                if is_best_seller(item, best_sellers) {
                    format!("\u{1f525} *{item}*")
                } else {
                    item.clone()
                }
            })
            .collect();

        format!(
            "ID : {}\n\n---Lista de contenidos---\n{}\n\nPrecio: ${}",
            self.id,
            items.join("\n"),
            format_thousands(self.display_price)
        )
    }

    /// Build the serialized view returned by search.
    ///
    /// `cover_url` is resolved by the caller (manual override first, then
    /// the automatic cover table).
    pub fn to_view(&self, cover_url: Option<String>, best_sellers: &[String]) -> PackView {
        PackView {
            id: self.id.clone(),
            items: self.items.clone(),
            price_base: self.base_price,
            price_display: self.display_price,
            cover_url,
            formatted_text: self.formatted_text(best_sellers),
        }
    }
}

/// SHA-256 digest of the normalized, sorted item list.
///
/// Stable across runs and platforms, unlike the standard library's hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

fn is_best_seller(item: &str, best_sellers: &[String]) -> bool {
    let item_lower = item.to_lowercase();
    best_sellers.iter().any(|kw| item_lower.contains(kw.as_str()))
}

/// Format an integer with `.` as thousands separator (e.g. `30.000`).
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Serialized form of a pack returned by search queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackView {
    pub id: PackId,
    pub items: Vec<String>,
    pub price_base: u64,
    pub price_display: u64,
    pub cover_url: Option<String>,
    pub formatted_text: String,
}
