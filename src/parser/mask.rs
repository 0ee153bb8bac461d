//! Exclusion zones for tag and context extraction
//!
//! Wiki links, markdown links and inline code may contain `#`, `@`, glyphs
//! or bracket codes that are not metadata. Those spans are blanked out in a
//! working copy before any metadata pattern runs. The working copy has the same
//! byte length as the original, so every match offset in it is also valid
//! in the original text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::patterns::compile_regex;

/// `[[Page]]`, `[[Page#Heading]]`, `[[Page|alias]]`
static WIKILINK_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile_regex(r"\[\[[^\]]*\]\]"));

/// `[text](target)`
static LINK_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile_regex(r"\[[^\]]*\]\([^)]*\)"));

/// `` `code` ``
static CODE_SPAN_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile_regex(r"`[^`]*`"));

/// Text with its exclusion spans blanked out
#[derive(Debug, Clone)]
pub struct MaskedText {
    masked: String,
    spans: Vec<Range<usize>>,
}

impl MaskedText {
    /// Locates exclusion spans in `text` and builds the working copy
    ///
    /// Spans never overlap: candidates are taken by ascending start offset
    /// and a candidate overlapping an already accepted span is dropped.
    pub fn new(text: &str) -> Self {
        let spans = exclusion_spans(text);

        let mut masked = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in &spans {
            masked.push_str(&text[cursor..span.start]);
            masked.extend(std::iter::repeat(' ').take(span.len()));
            cursor = span.end;
        }
        masked.push_str(&text[cursor..]);

        Self { masked, spans }
    }

    /// The working copy: same length as the original, spans replaced by spaces
    pub fn as_str(&self) -> &str {
        &self.masked
    }

    /// Byte ranges of the excluded spans, ascending
    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    /// Returns true if `range` touches any excluded span
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.spans
            .iter()
            .any(|s| s.start < range.end && range.start < s.end)
    }
}

/// Finds all non-overlapping link and code spans, ascending by start
pub fn exclusion_spans(text: &str) -> Vec<Range<usize>> {
    let mut candidates: Vec<Range<usize>> = [&*WIKILINK_RE, &*LINK_RE, &*CODE_SPAN_RE]
        .into_iter()
        .flatten()
        .flat_map(|re| re.find_iter(text).map(|m| m.range()))
        .collect();

    // Ties on start keep the longer span so `[[a]]` beats `[a]`-style partials
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut spans: Vec<Range<usize>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if spans.last().is_some_and(|last| candidate.start < last.end) {
            continue;
        }
        spans.push(candidate);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_wikilink_with_heading_and_alias() {
        let text = "See [[Projects#area|alias]] now";
        let masked = MaskedText::new(text);

        assert_eq!(masked.as_str().len(), text.len());
        assert!(!masked.as_str().contains('#'));
        assert!(masked.as_str().starts_with("See "));
        assert!(masked.as_str().ends_with(" now"));
    }

    #[test]
    fn masks_markdown_link_and_code() {
        let text = "[docs](http://x.io/#frag) and `#code @here`";
        let masked = MaskedText::new(text);

        assert_eq!(masked.spans().len(), 2);
        assert!(!masked.as_str().contains('#'));
        assert!(!masked.as_str().contains('@'));
        assert!(masked.as_str().contains(" and "));
    }

    #[test]
    fn overlapping_candidates_keep_first() {
        // The code span starts inside the wiki link and must be dropped
        let text = "[[a`b]] c` #tag";
        let spans = exclusion_spans(text);

        assert_eq!(spans, vec![0..7]);
        let masked = MaskedText::new(text);
        assert!(masked.as_str().contains("#tag"));
    }

    #[test]
    fn multibyte_text_keeps_offsets() {
        let text = "日本 [[ページ#見出し]] #タグ";
        let masked = MaskedText::new(text);

        assert_eq!(masked.as_str().len(), text.len());
        let tag_at = masked.as_str().find("#タグ").unwrap();
        assert_eq!(&text[tag_at..], "#タグ");
    }

    #[test]
    fn overlap_check() {
        let masked = MaskedText::new("ab `cd` ef");

        assert!(masked.overlaps(&(4..5)));
        assert!(!masked.overlaps(&(0..2)));
        assert!(!masked.overlaps(&(8..10)));
    }

    #[test]
    fn plain_text_has_no_spans() {
        let masked = MaskedText::new("plain #tag @ctx");

        assert!(masked.spans().is_empty());
        assert_eq!(masked.as_str(), "plain #tag @ctx");
    }
}
