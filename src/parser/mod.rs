//! Pack listing parser.
//!
//! Converts one raw chat message into a [`Pack`] or a typed rejection.
//! Parsing is total: malformed text never panics and never raises anything
//! other than a [`ParseRejection`], which callers count and discard.
//!
//! The parser is a line-by-line state machine over three classification
//! predicates (ID line, price line, boilerplate line):
//!
//! 1. A line matching `ID : <digits>` while no id has been captured yet
//!    becomes the id. The check runs before the price check on purpose: a
//!    line matching both patterns is classified as the id line.
//! 2. Otherwise a line with a numeric amount adjacent to `$` (either side)
//!    while no price has been captured becomes the price. Fractional
//!    amounts are truncated toward zero.
//! 3. Otherwise, lines between the id and the price become items, except
//!    the two known boilerplate lines which are always discarded.
//!
//! Lines before the id or after the price are headers/footers outside the
//! item block and are dropped.

use crate::model::{Pack, PackId};

/// Header boilerplate discarded from item lists.
const BOILERPLATE_HEADER: &str = "NINTENDO SWITCH ACCOUNT";

/// Footer boilerplate discarded from item lists.
const BOILERPLATE_FOOTER: &str = "For buy:";

/// Why a raw message was rejected. The reason is kept for debug logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseRejection {
    #[error("no `ID : <digits>` line found")]
    MissingId,

    #[error("no price line found")]
    MissingPrice,

    #[error("no item lines between id and price")]
    NoItems,
}

/// Parse one raw message into a pack.
///
/// `price_multiplier` scales the extracted base price into the display
/// price at construction time.
pub fn parse(raw: &str, price_multiplier: u64) -> Result<Pack, ParseRejection> {
    let mut id: Option<PackId> = None;
    let mut price: Option<u64> = None;
    let mut items: Vec<String> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if id.is_none() {
            if let Some(found) = match_id_line(line) {
                id = Some(found);
                continue;
            }
        }

        if price.is_none() {
            if let Some(amount) = match_price_line(line) {
                price = Some(amount);
                continue;
            }
        }

        if id.is_some() && price.is_none() && !is_boilerplate(line) {
            items.push(line.to_string());
        }
    }

    let id = id.ok_or(ParseRejection::MissingId)?;
    let price = price.ok_or(ParseRejection::MissingPrice)?;
    if items.is_empty() {
        return Err(ParseRejection::NoItems);
    }
    Ok(Pack::new(id, items, price, price_multiplier))
}

/// ID predicate: `ID <ws>* : <ws>* <digits>`, case-insensitive, matched
/// anywhere in the line. Returns the captured digits.
fn match_id_line(line: &str) -> Option<PackId> {
    let bytes = line.as_bytes();
    let n = bytes.len();

    for start in 0..n.saturating_sub(1) {
        if !bytes[start].eq_ignore_ascii_case(&b'i') || !bytes[start + 1].eq_ignore_ascii_case(&b'd')
        {
            continue;
        }
        let mut i = start + 2;
        while i < n && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= n || bytes[i] != b':' {
            continue;
        }
        i += 1;
        while i < n && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let digits_start = i;
        while i < n && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i > digits_start {
            // Digits-only slice, so the smart constructor cannot fail.
            return PackId::new(&line[digits_start..i]).ok();
        }
    }
    None
}

/// Price predicate: first occurrence, scanning left to right, of either
/// `<amount> <ws>* $` or `$ <ws>* <amount>` where `<amount>` is digits with
/// an optional fractional part. The fraction is truncated.
fn match_price_line(line: &str) -> Option<u64> {
    let bytes = line.as_bytes();
    let n = bytes.len();

    for i in 0..n {
        if bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit()) {
            if let Some(amount) = amount_then_dollar(bytes, i) {
                return Some(amount);
            }
        }
        if bytes[i] == b'$' {
            if let Some(amount) = dollar_then_amount(bytes, i) {
                return Some(amount);
            }
        }
    }
    None
}

/// Boilerplate predicate: the two literal header/footer lines that are
/// never items.
fn is_boilerplate(line: &str) -> bool {
    line.contains(BOILERPLATE_HEADER) || line.contains(BOILERPLATE_FOOTER)
}

/// Try `<digits>[.<digits>] <ws>* $` starting at `start` (a digit).
fn amount_then_dollar(bytes: &[u8], start: usize) -> Option<u64> {
    let (amount, mut i) = read_amount(bytes, start)?;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'$' {
        Some(amount)
    } else {
        None
    }
}

/// Try `$ <ws>* <digits>[.<digits>]` starting at `dollar` (the `$`).
fn dollar_then_amount(bytes: &[u8], dollar: usize) -> Option<u64> {
    let mut i = dollar + 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i < bytes.len() && bytes[i].is_ascii_digit() {
        read_amount(bytes, i).map(|(amount, _)| amount)
    } else {
        None
    }
}

/// Read `<digits>[.<digits>]` at `start`, returning the truncated integer
/// value and the index one past the amount. Amounts too large for `u64`
/// are not prices.
fn read_amount(bytes: &[u8], start: usize) -> Option<(u64, usize)> {
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let integer: u64 = std::str::from_utf8(&bytes[start..i]).ok()?.parse().ok()?;

    // Optional fractional part: consumed for matching, truncated in value.
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    Some((integer, i))
}
