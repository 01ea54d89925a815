// src/filters/range.rs
//! Parsing of user-facing range tokens ("0-1 YOE", "6+ YOE", "20-50", "100+")
//! into closed numeric intervals.

/// Upper bound substituted for open-ended experience tokens ("6+ YOE").
pub const EXPERIENCE_OPEN_END: i64 = 100;

/// Upper bound substituted for open-ended pay tokens ("100+"), in thousands.
pub const PAY_OPEN_END: i64 = 10_000;

/// A closed interval parsed from a range token. `min <= max` is not enforced;
/// the token is taken left to right as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

/// Parse a range token into an interval.
///
/// Tokens with a `+` are open-ended: the number becomes `min` and `max` is the
/// given sentinel. Otherwise the token splits on `-` and each side parses as
/// an integer with any unit suffix (such as "YOE") dropped. A token that does
/// not yield numbers on both sides returns `None`; callers keep its slot and
/// match nothing for it.
pub fn parse_range(token: &str, open_end: i64) -> Option<Range> {
    let token = token.trim();

    if token.contains('+') {
        let min = parse_bound(&token.replacen('+', "", 1))?;
        return Some(Range { min, max: open_end });
    }

    let (lo, hi) = token.split_once('-')?;
    Some(Range {
        min: parse_bound(lo)?,
        max: parse_bound(hi)?,
    })
}

/// Leading integer of one side of a token, ignoring a trailing unit.
fn parse_bound(side: &str) -> Option<i64> {
    let digits: String = side
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}
