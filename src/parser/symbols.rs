//! Static symbol tables
//!
//! Glyphs and field keys recognised by the two metadata dialects, the
//! priority table shared by both, and the status-character allow-list.
//! Nothing here depends on configuration.

use chrono::NaiveDate;

use crate::domain::DateField;

/// Trailing variation selector some editors append to emoji
pub const VARIATION_SELECTOR: char = '\u{FE0F}';

pub const RECURRENCE_SYMBOL: &str = "🔁";
pub const RECURRENCE_KEYS: &[&str] = &["repeat", "recurrence"];
pub const PRIORITY_KEYS: &[&str] = &["priority"];

/// Inline priority glyphs, highest first
pub static PRIORITY_SYMBOLS: [(&str, u8); 5] = [
    ("🔺", 5),
    ("⏫", 4),
    ("🔼", 3),
    ("🔽", 2),
    ("⏬", 1),
];

/// `[#A]` through `[#E]`
pub static PRIORITY_LETTERS: [(char, u8); 5] = [('A', 5), ('B', 4), ('C', 3), ('D', 2), ('E', 1)];

pub static PRIORITY_WORDS: [(&str, u8); 5] = [
    ("highest", 5),
    ("high", 4),
    ("medium", 3),
    ("low", 2),
    ("lowest", 1),
];

/// Glyphs that introduce each date in the inline dialect
pub fn date_symbols(field: DateField) -> &'static [&'static str] {
    match field {
        DateField::Due => &["📅", "📆", "🗓"],
        DateField::Start => &["🛫"],
        DateField::Scheduled => &["⏳", "⌛"],
        DateField::Completed => &["✅"],
        DateField::Created => &["➕"],
    }
}

/// Field keys naming each date in the bracket dialect
pub fn date_keys(field: DateField) -> &'static [&'static str] {
    match field {
        DateField::Due => &["due"],
        DateField::Start => &["start"],
        DateField::Scheduled => &["scheduled"],
        DateField::Completed => &["completion", "completed"],
        DateField::Created => &["created"],
    }
}

/// Every glyph that starts an inline-dialect token
pub fn metadata_glyphs() -> impl Iterator<Item = &'static str> {
    DateField::ALL
        .into_iter()
        .flat_map(date_symbols)
        .copied()
        .chain(PRIORITY_SYMBOLS.iter().map(|(s, _)| *s))
        .chain(std::iter::once(RECURRENCE_SYMBOL))
}

pub fn priority_from_symbol(symbol: &str) -> Option<u8> {
    let symbol = symbol.trim_end_matches(VARIATION_SELECTOR);
    PRIORITY_SYMBOLS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, p)| *p)
}

pub fn symbol_for_priority(priority: u8) -> Option<&'static str> {
    PRIORITY_SYMBOLS
        .iter()
        .find(|(_, p)| *p == priority)
        .map(|(s, _)| *s)
}

pub fn priority_from_letter(letter: char) -> Option<u8> {
    PRIORITY_LETTERS
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, p)| *p)
}

/// Parses a bracket-field priority value
///
/// Accepts the priority words, an integer 1-5, or one of the inline
/// glyphs. Anything else yields `None`.
pub fn parse_priority_value(value: &str) -> Option<u8> {
    let value = value.trim();
    let lower = value.to_lowercase();

    if let Some((_, p)) = PRIORITY_WORDS.iter().find(|(w, _)| *w == lower) {
        return Some(*p);
    }

    if let Ok(n) = value.parse::<u8>() {
        return (1..=5).contains(&n).then_some(n);
    }

    priority_from_symbol(value)
}

/// Parses `YYYY-MM-DD`, optionally followed by a time part that is ignored
pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(value);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Allow-list for the character between a task's brackets
///
/// Space, letters and digits, and the punctuation outline tools commonly
/// use as custom statuses. Brackets themselves are never valid.
pub fn is_valid_status_char(c: char) -> bool {
    c == ' ' || c.is_alphanumeric() || "/-?!*<>\"'+~=_%&#$@:;,.^".contains(c)
}
