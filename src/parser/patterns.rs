//! Compiled metadata patterns and their precedence
//!
//! Every metadata kind has at most one rule per dialect. The table lists
//! rules in extraction order (kind first, then preferred dialect before the
//! other one), so the precedence is data rather than branching.

use std::ops::Range;

use regex::Regex;

use super::config::{Dialect, ParserConfig, SpecialField};
use super::mask::MaskedText;
use super::symbols::{
    date_keys, date_symbols, metadata_glyphs, PRIORITY_KEYS, PRIORITY_LETTERS, PRIORITY_SYMBOLS,
    RECURRENCE_KEYS, RECURRENCE_SYMBOL,
};
use crate::domain::DateField;

/// Characters allowed in a tag, context or prefixed-tag value
const TAG_CHARS: &str = r"[\p{L}\p{N}\p{M}_/\-]";
/// Tag characters minus digits; a tag needs at least one
const TAG_NON_DIGIT: &str = r"[\p{L}\p{M}_/\-]";

/// Compiles a pattern, logging and returning `None` if it is invalid
///
/// Every pattern in this crate is either a literal or built from escaped
/// configuration text, so `None` only shows up as a skipped rule.
pub(crate) fn compile_regex(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|err| tracing::error!(pattern, error = %err, "Invalid metadata pattern"))
        .ok()
}

/// The kinds of metadata, in the order they are extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    Date(DateField),
    Recurrence,
    Priority,
    Project,
    Context,
    Area,
    Tag,
}

/// Dates first, tags last: a later kind must never see text an earlier,
/// more specific pattern claimed.
pub const EXTRACTION_ORDER: [MetadataKind; 11] = [
    MetadataKind::Date(DateField::Due),
    MetadataKind::Date(DateField::Start),
    MetadataKind::Date(DateField::Scheduled),
    MetadataKind::Date(DateField::Completed),
    MetadataKind::Date(DateField::Created),
    MetadataKind::Recurrence,
    MetadataKind::Priority,
    MetadataKind::Project,
    MetadataKind::Context,
    MetadataKind::Area,
    MetadataKind::Tag,
];

impl MetadataKind {
    fn special_field(&self) -> Option<SpecialField> {
        match self {
            MetadataKind::Project => Some(SpecialField::Project),
            MetadataKind::Context => Some(SpecialField::Context),
            MetadataKind::Area => Some(SpecialField::Area),
            _ => None,
        }
    }
}

/// One recognised token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// Byte range to remove from the content
    pub span: Range<usize>,
    /// Byte range of the captured value
    pub value: Range<usize>,
}

#[derive(Debug)]
enum Matcher {
    /// `tok` group (or the whole match) is removed, `val` group is the value
    Pattern(Regex),
    /// Token runs from `start` up to the first `stop` match or end of text
    Delimited { start: Regex, stop: Regex },
}

impl Matcher {
    /// Finds a token in the working copy; `masked` has the same offsets as the text
    fn find(&self, masked: &MaskedText) -> Option<TokenMatch> {
        let text = masked.as_str();
        match self {
            // A match running into blanked text would cut a span apart
            Matcher::Pattern(re) => re.captures_iter(text).find_map(|caps| {
                let whole = caps.get(0)?;
                let span = caps.name("tok").unwrap_or(whole).range();
                if masked.overlaps(&span) {
                    return None;
                }
                let value = caps.name("val").map_or_else(|| span.clone(), |m| m.range());
                Some(TokenMatch { span, value })
            }),
            Matcher::Delimited { start, stop } => {
                let open = start.find(text)?;
                let stopped = stop
                    .find_at(text, open.end())
                    .map_or(text.len(), |m| m.start());
                // A link or code span ends the value; its text is never swallowed
                let end = masked
                    .spans()
                    .iter()
                    .map(|s| s.start)
                    .find(|&s| s >= open.end())
                    .map_or(stopped, |s| s.min(stopped));
                Some(TokenMatch {
                    span: open.start()..end,
                    value: open.end()..end,
                })
            }
        }
    }
}

/// A pattern for one metadata kind in one dialect
#[derive(Debug)]
pub struct Rule {
    pub kind: MetadataKind,
    pub dialect: Dialect,
    matcher: Matcher,
}

impl Rule {
    /// Finds the left-most token outside link and code spans
    ///
    /// Matching runs on the masked working copy; offsets refer to `text`
    /// itself since the mask never shifts them.
    pub fn find(&self, text: &str) -> Option<TokenMatch> {
        self.matcher.find(&MaskedText::new(text))
    }
}

/// All rules for a configuration, in extraction order
#[derive(Debug)]
pub struct PatternTable {
    rules: Vec<Rule>,
}

impl PatternTable {
    pub fn new(config: &ParserConfig) -> Self {
        let rules = EXTRACTION_ORDER
            .into_iter()
            .flat_map(|kind| {
                config
                    .dialect_order()
                    .into_iter()
                    .filter_map(move |dialect| build_matcher(kind, dialect, config))
                    .map(move |(dialect, matcher)| Rule {
                        kind,
                        dialect,
                        matcher,
                    })
            })
            .collect();

        Self { rules }
    }

    /// Rules in extraction order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule with a token left in `text`, in extraction order
    pub fn first_match(&self, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.find(text).is_some())
    }
}

fn alternation<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

/// `[key:: value]` with any of `keys`, case-insensitive
fn bracket_field(keys: &[&str]) -> Option<Regex> {
    compile_regex(&format!(
        r"(?i)\[\s*(?:{})\s*::\s*(?P<val>[^\]]*)\]",
        alternation(keys.iter().copied())
    ))
}

/// `prefix` + value, at the start of text or after whitespace
fn prefixed_token(prefix: &str) -> Option<Regex> {
    compile_regex(&format!(
        r"(?:^|\s)(?P<tok>{}(?P<val>{TAG_CHARS}+))",
        regex::escape(prefix)
    ))
}

fn build_matcher(
    kind: MetadataKind,
    dialect: Dialect,
    config: &ParserConfig,
) -> Option<(Dialect, Matcher)> {
    let matcher = match (kind, dialect) {
        (MetadataKind::Date(field), Dialect::InlineSymbol) => Matcher::Pattern(compile_regex(
            &format!(
                r"(?:{})\x{{FE0F}}?\s*(?P<val>\d{{4}}-\d{{2}}-\d{{2}})",
                alternation(date_symbols(field).iter().copied())
            ),
        )?),
        (MetadataKind::Date(field), Dialect::BracketField) => {
            Matcher::Pattern(bracket_field(date_keys(field))?)
        }

        (MetadataKind::Recurrence, Dialect::InlineSymbol) => {
            let glyphs = alternation(metadata_glyphs().filter(|g| *g != RECURRENCE_SYMBOL));
            Matcher::Delimited {
                start: compile_regex(&format!(r"{}\x{{FE0F}}?", regex::escape(RECURRENCE_SYMBOL)))?,
                stop: compile_regex(&format!(
                    r"\s*(?:{glyphs})|\s+[#@]|\s*\[\s*[\w-]+\s*::|\s*\[#[A-E]\]|\s*$"
                ))?,
            }
        }
        (MetadataKind::Recurrence, Dialect::BracketField) => {
            Matcher::Pattern(bracket_field(RECURRENCE_KEYS)?)
        }

        (MetadataKind::Priority, Dialect::InlineSymbol) => {
            let symbols = alternation(PRIORITY_SYMBOLS.iter().map(|(s, _)| *s));
            let letters: String = PRIORITY_LETTERS.iter().map(|(l, _)| *l).collect();
            Matcher::Pattern(compile_regex(&format!(
                r"(?P<val>(?:{symbols})\x{{FE0F}}?|\[#[{letters}]\])"
            ))?)
        }
        (MetadataKind::Priority, Dialect::BracketField) => {
            Matcher::Pattern(bracket_field(PRIORITY_KEYS)?)
        }

        (MetadataKind::Project | MetadataKind::Context | MetadataKind::Area, dialect) => {
            let field = kind.special_field()?;
            match dialect {
                Dialect::InlineSymbol => {
                    Matcher::Pattern(prefixed_token(config.prefixes.inline.get(field))?)
                }
                Dialect::BracketField => {
                    Matcher::Pattern(bracket_field(&[config.prefixes.bracket.get(field)])?)
                }
            }
        }

        // Generic tags only exist in the inline dialect
        (MetadataKind::Tag, Dialect::InlineSymbol) => Matcher::Pattern(compile_regex(&format!(
            r"(?:^|\s)(?P<tok>#(?P<val>{TAG_CHARS}*{TAG_NON_DIGIT}{TAG_CHARS}*))"
        ))?),
        (MetadataKind::Tag, Dialect::BracketField) => return None,
    };

    Some((dialect, matcher))
}
