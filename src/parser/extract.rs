//! Metadata extraction
//!
//! Strips recognised tokens from a task's content one at a time, left-most
//! first, walking the rule table in extraction order. Each removed token is
//! recorded in the task's metadata unless that field is already set; the
//! text that remains becomes the task's display content.

use tracing::trace;

use super::config::{Dialect, ParserConfig, SpecialField};
use super::patterns::{MetadataKind, PatternTable, Rule};
use super::symbols::{
    date_keys, parse_date_value, parse_priority_value, priority_from_letter, priority_from_symbol,
    PRIORITY_KEYS, RECURRENCE_KEYS,
};
use crate::domain::{fill, local_midnight, DateField, FileMetadata, ParseContext, TaskMetadata};

/// Result of extracting metadata from one task's content
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Remaining text, whitespace collapsed
    pub content: String,
    pub metadata: TaskMetadata,
    /// True if the per-line token budget ran out before extraction finished
    pub budget_exhausted: bool,
}

/// Extracts metadata using a compiled pattern table
pub struct MetadataExtractor<'a> {
    config: &'a ParserConfig,
    patterns: &'a PatternTable,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(config: &'a ParserConfig, patterns: &'a PatternTable) -> Self {
        Self { config, patterns }
    }

    /// Extracts every recognised token from `raw`
    pub fn extract(&self, raw: &str) -> Extraction {
        let mut text = raw.to_string();
        let mut metadata = TaskMetadata::new();
        let mut budget = self.config.limits.max_metadata_iterations;
        let mut budget_exhausted = false;

        // Removing a token can join its neighbours into a new one, so the
        // table is walked again until a full pass removes nothing.
        'passes: loop {
            let mut removed_any = false;

            for rule in self.patterns.rules() {
                while let Some(token) = rule.find(&text) {
                    if budget == 0 {
                        budget_exhausted = true;
                        break 'passes;
                    }
                    budget -= 1;
                    removed_any = true;

                    let value = text[token.value.clone()].trim().to_string();
                    self.record(rule, &value, &mut metadata);
                    text.replace_range(token.span, "");
                }
            }

            if !removed_any {
                break;
            }
        }

        Extraction {
            content: collapse_whitespace(&text),
            metadata,
            budget_exhausted,
        }
    }

    fn record(&self, rule: &Rule, value: &str, metadata: &mut TaskMetadata) {
        match rule.kind {
            MetadataKind::Date(field) => {
                if !self.record_date(field, value, metadata) {
                    trace!(field = field.label(), value, "Discarding unparseable date");
                }
            }
            MetadataKind::Recurrence => {
                if let Some(value) = self.bounded(value) {
                    fill(&mut metadata.recurrence, value);
                }
            }
            MetadataKind::Priority => {
                let priority = match rule.dialect {
                    Dialect::InlineSymbol => inline_priority(value),
                    Dialect::BracketField => parse_priority_value(value),
                };
                match priority {
                    Some(p) => {
                        metadata.fill_priority(p);
                    }
                    None => trace!(value, "Discarding unknown priority"),
                }
            }
            MetadataKind::Project => self.record_special(SpecialField::Project, value, metadata),
            MetadataKind::Context => self.record_special(SpecialField::Context, value, metadata),
            MetadataKind::Area => self.record_special(SpecialField::Area, value, metadata),
            MetadataKind::Tag => self.record_tag(value, metadata),
        }
    }

    fn record_date(&self, field: DateField, value: &str, metadata: &mut TaskMetadata) -> bool {
        match parse_date_value(value).and_then(local_midnight) {
            Some(ts) => {
                metadata.fill_date(field, ts);
                true
            }
            None => false,
        }
    }

    fn record_special(&self, field: SpecialField, value: &str, metadata: &mut TaskMetadata) {
        if let Some(value) = self.bounded(value) {
            fill(special_slot(field, metadata), value);
        }
    }

    /// Routes prefixed tags to their field, everything else to the tag set
    fn record_tag(&self, body: &str, metadata: &mut TaskMetadata) {
        if let Some((prefix, rest)) = body.split_once('/') {
            if let Some(field) = self.config.special_tag_prefixes.get(prefix) {
                if !rest.is_empty() {
                    self.record_special(*field, rest, metadata);
                    return;
                }
            }
        }

        let tag = format!("#{body}");
        if tag.chars().count() > self.config.limits.max_tag_length {
            trace!(tag = %tag, "Discarding over-long tag");
            return;
        }
        metadata.add_tag(tag);
    }

    /// Returns the value if it is non-empty and within the length limit
    fn bounded(&self, value: &str) -> Option<String> {
        if value.is_empty() {
            return None;
        }
        if value.chars().count() > self.config.limits.max_value_length {
            trace!(value, "Discarding over-long value");
            return None;
        }
        Some(value.to_string())
    }
}

/// `🔺`-style glyph or `[#A]`-style letter code
fn inline_priority(value: &str) -> Option<u8> {
    match value.strip_prefix("[#").and_then(|rest| rest.chars().next()) {
        Some(letter) => priority_from_letter(letter),
        None => priority_from_symbol(value),
    }
}

fn special_slot(field: SpecialField, metadata: &mut TaskMetadata) -> &mut Option<String> {
    match field {
        SpecialField::Project => &mut metadata.project,
        SpecialField::Context => &mut metadata.context,
        SpecialField::Area => &mut metadata.area,
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fills absent fields from file metadata and the resolved project
///
/// Values parsed from the task line always win.
pub fn apply_context(metadata: &mut TaskMetadata, context: &ParseContext, config: &ParserConfig) {
    if config.inherit_file_metadata {
        if let Some(file_meta) = &context.file_metadata {
            inherit_file_metadata(metadata, file_meta, config);
        }
    }

    if metadata.project.is_none() {
        if let Some(assignment) = &context.project {
            metadata.project = Some(assignment.name.clone());
            metadata.inherited_project = Some(assignment.clone());
        }
    }
}

fn inherit_file_metadata(metadata: &mut TaskMetadata, file_meta: &FileMetadata, config: &ParserConfig) {
    let first = |keys: &[&str]| keys.iter().find_map(|k| file_meta.get(k));

    for field in DateField::ALL {
        if let Some(ts) = first(date_keys(field))
            .and_then(parse_date_value)
            .and_then(local_midnight)
        {
            metadata.fill_date(field, ts);
        }
    }

    if let Some(p) = first(PRIORITY_KEYS).and_then(parse_priority_value) {
        metadata.fill_priority(p);
    }

    if let Some(rule) = first(RECURRENCE_KEYS).map(str::trim).filter(|v| !v.is_empty()) {
        fill(&mut metadata.recurrence, rule.to_string());
    }

    for field in [SpecialField::Context, SpecialField::Area] {
        let key = config.prefixes.bracket.get(field);
        if let Some(value) = file_meta.get(key).map(str::trim).filter(|v| !v.is_empty()) {
            fill(special_slot(field, metadata), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProjectAssignment, ProjectSource};
    use chrono::NaiveDate;

    fn extract_with(config: &ParserConfig, raw: &str) -> Extraction {
        let patterns = PatternTable::new(config);
        MetadataExtractor::new(config, &patterns).extract(raw)
    }

    fn extract(raw: &str) -> Extraction {
        extract_with(&ParserConfig::default(), raw)
    }

    fn midnight(y: i32, m: u32, d: u32) -> crate::domain::Timestamp {
        local_midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
    }

    #[test]
    fn inline_dates_are_extracted_and_removed() {
        let e = extract("Ship it 🛫 2024-01-01 ⏳ 2024-01-05 📅 2024-01-10 ➕ 2023-12-01");

        assert_eq!(e.content, "Ship it");
        assert_eq!(e.metadata.start_date, Some(midnight(2024, 1, 1)));
        assert_eq!(e.metadata.scheduled_date, Some(midnight(2024, 1, 5)));
        assert_eq!(e.metadata.due_date, Some(midnight(2024, 1, 10)));
        assert_eq!(e.metadata.created_date, Some(midnight(2023, 12, 1)));
        assert!(e.metadata.completed_date.is_none());
    }

    #[test]
    fn bracket_fields_are_extracted() {
        let config = ParserConfig::with_dialect(Dialect::BracketField);
        let e = extract_with(
            &config,
            "Review [due:: 2024-12-31] [priority:: high] [project:: Website] [context:: desk] [repeat:: every week]",
        );

        assert_eq!(e.content, "Review");
        assert_eq!(e.metadata.due_date, Some(midnight(2024, 12, 31)));
        assert_eq!(e.metadata.priority, Some(4));
        assert_eq!(e.metadata.project.as_deref(), Some("Website"));
        assert_eq!(e.metadata.context.as_deref(), Some("desk"));
        assert_eq!(e.metadata.recurrence.as_deref(), Some("every week"));
    }

    #[test]
    fn preferred_dialect_wins_and_other_is_still_removed() {
        let e = extract("Pay rent [due:: 2024-02-01] 📅 2024-03-01");
        assert_eq!(e.metadata.due_date, Some(midnight(2024, 3, 1)));
        assert_eq!(e.content, "Pay rent");

        let config = ParserConfig::with_dialect(Dialect::BracketField);
        let e = extract_with(&config, "Pay rent [due:: 2024-02-01] 📅 2024-03-01");
        assert_eq!(e.metadata.due_date, Some(midnight(2024, 2, 1)));
        assert_eq!(e.content, "Pay rent");
    }

    #[test]
    fn first_occurrence_wins_within_a_dialect() {
        let e = extract("Twice 📅 2024-01-01 📅 2024-06-01");

        assert_eq!(e.metadata.due_date, Some(midnight(2024, 1, 1)));
        assert_eq!(e.content, "Twice");
    }

    #[test]
    fn malformed_date_is_removed_but_absent() {
        let e = extract("Bad 📅 2024-13-45 [start:: someday] rest");

        assert!(e.metadata.due_date.is_none());
        assert!(e.metadata.start_date.is_none());
        assert_eq!(e.content, "Bad rest");
    }

    #[test]
    fn recurrence_and_priority() {
        let e = extract("Water plants 🔁 every week 🔼 #home");

        assert_eq!(e.metadata.recurrence.as_deref(), Some("every week"));
        assert_eq!(e.metadata.priority, Some(3));
        assert_eq!(e.metadata.tags, vec!["#home"]);
        assert_eq!(e.content, "Water plants");
    }

    #[test]
    fn priority_letters() {
        assert_eq!(extract("Do [#A] now").metadata.priority, Some(5));
        assert_eq!(extract("Do [#E] now").metadata.priority, Some(1));

        let unknown = extract("Do [#Z] now");
        assert!(unknown.metadata.priority.is_none());
        assert_eq!(unknown.content, "Do [#Z] now");
    }

    #[test]
    fn unknown_bracket_priority_is_absent() {
        let e = extract("Do [priority:: urgent] now");

        assert!(e.metadata.priority.is_none());
        assert_eq!(e.content, "Do now");
    }

    #[test]
    fn inline_project_context_area() {
        let e = extract("Buy seeds #project/garden @store #area/home #errand");

        assert_eq!(e.metadata.project.as_deref(), Some("garden"));
        assert_eq!(e.metadata.context.as_deref(), Some("store"));
        assert_eq!(e.metadata.area.as_deref(), Some("home"));
        assert_eq!(e.metadata.tags, vec!["#errand"]);
        assert_eq!(e.content, "Buy seeds");
    }

    #[test]
    fn special_prefix_tags_feed_fields_in_tag_pass() {
        let mut config = ParserConfig::default();
        config
            .special_tag_prefixes
            .insert("proj".to_string(), SpecialField::Project);

        let e = extract_with(&config, "Plan #proj/launch #misc");

        assert_eq!(e.metadata.project.as_deref(), Some("launch"));
        assert_eq!(e.metadata.tags, vec!["#misc"]);
        assert_eq!(e.content, "Plan");
    }

    #[test]
    fn explicit_project_is_not_overwritten_by_prefixed_tag() {
        let mut config = ParserConfig::default();
        config
            .special_tag_prefixes
            .insert("proj".to_string(), SpecialField::Project);

        let e = extract_with(&config, "Plan #project/alpha #proj/beta");

        assert_eq!(e.metadata.project.as_deref(), Some("alpha"));
        assert!(e.metadata.tags.is_empty());
    }

    #[test]
    fn tags_inside_links_and_code_are_kept() {
        let e = extract("See [[Projects#area]] and `#not-a-tag` and [x](y#z) #real");

        assert_eq!(e.metadata.tags, vec!["#real"]);
        assert_eq!(
            e.content,
            "See [[Projects#area]] and `#not-a-tag` and [x](y#z)"
        );
    }

    #[test]
    fn context_inside_code_is_kept() {
        let e = extract("Email `admin @root` today");

        assert!(e.metadata.context.is_none());
        assert_eq!(e.content, "Email `admin @root` today");
    }

    #[test]
    fn priority_codes_inside_links_and_code_are_kept() {
        for raw in ["See [[#A]] now", "Use `[#A]` syntax", "Read [#B](http://x) today"] {
            let e = extract(raw);

            assert!(e.metadata.priority.is_none(), "{raw}");
            assert_eq!(e.content, raw);
        }
    }

    #[test]
    fn glyphs_inside_code_are_kept() {
        let e = extract("Doc `🔁 every` syntax and `📅 2024-01-01` here");

        assert!(e.metadata.recurrence.is_none());
        assert!(e.metadata.due_date.is_none());
        assert_eq!(e.content, "Doc `🔁 every` syntax and `📅 2024-01-01` here");
    }

    #[test]
    fn recurrence_ends_before_code_span() {
        let e = extract("Pay 🔁 every month `cron` later");

        assert_eq!(e.metadata.recurrence.as_deref(), Some("every month"));
        assert_eq!(e.content, "Pay `cron` later");
    }

    #[test]
    fn tag_prefix_of_another_word_is_removed_whole() {
        let e = extract("#work and #workshop");

        assert_eq!(e.metadata.tags, vec!["#work", "#workshop"]);
        assert_eq!(e.content, "and");
    }

    #[test]
    fn duplicate_tags_are_recorded_once() {
        let e = extract("a #x b #x");

        assert_eq!(e.metadata.tags, vec!["#x"]);
        assert_eq!(e.content, "a b");
    }

    #[test]
    fn over_long_tags_are_consumed_not_recorded() {
        let mut config = ParserConfig::default();
        config.limits.max_tag_length = 6;

        let e = extract_with(&config, "a #short #muchtoolong");

        assert_eq!(e.metadata.tags, vec!["#short"]);
        assert_eq!(e.content, "a");
    }

    #[test]
    fn budget_stops_extraction() {
        let mut config = ParserConfig::default();
        config.limits.max_metadata_iterations = 2;

        let e = extract_with(&config, "x #a #b #c #d");

        assert!(e.budget_exhausted);
        assert_eq!(e.metadata.tags, vec!["#a", "#b"]);
        assert_eq!(e.content, "x #c #d");
    }

    #[test]
    fn content_never_gains_text() {
        let raw = "Keep   these   words 📅 2024-01-01   #t";
        let e = extract(raw);

        assert_eq!(e.content, "Keep these words");
    }

    #[test]
    fn tokens_joined_by_a_removal_are_extracted() {
        // The date only becomes well-formed once the tag between is gone
        let e = extract("Pay 📅 #bills 2024-03-01");

        assert_eq!(e.content, "Pay");
        assert_eq!(e.metadata.tags, vec!["#bills"]);
        assert_eq!(e.metadata.due_date, Some(midnight(2024, 3, 1)));
    }

    #[test]
    fn file_metadata_fills_only_absent_fields() {
        let config = ParserConfig::default();
        let mut metadata = extract("Task 📅 2024-01-01").metadata;
        let file_meta: FileMetadata = [
            ("due", "2025-05-05"),
            ("start", "2024-01-02"),
            ("priority", "low"),
            ("context", "office"),
        ]
        .into_iter()
        .collect();

        apply_context(
            &mut metadata,
            &ParseContext::new().with_file_metadata(file_meta),
            &config,
        );

        assert_eq!(metadata.due_date, Some(midnight(2024, 1, 1)));
        assert_eq!(metadata.start_date, Some(midnight(2024, 1, 2)));
        assert_eq!(metadata.priority, Some(2));
        assert_eq!(metadata.context.as_deref(), Some("office"));
    }

    #[test]
    fn file_metadata_ignored_when_disabled() {
        let config = ParserConfig {
            inherit_file_metadata: false,
            ..ParserConfig::default()
        };
        let mut metadata = TaskMetadata::new();
        let file_meta: FileMetadata = [("priority", "high")].into_iter().collect();

        apply_context(
            &mut metadata,
            &ParseContext::new().with_file_metadata(file_meta),
            &config,
        );

        assert!(metadata.priority.is_none());
    }

    #[test]
    fn inherited_project_is_tracked_separately() {
        let config = ParserConfig::default();
        let assignment = ProjectAssignment::new("Work", ProjectSource::PathMapping, true);
        let ctx = ParseContext::new().with_project(assignment.clone());

        let mut plain = extract("Task").metadata;
        apply_context(&mut plain, &ctx, &config);
        assert_eq!(plain.project.as_deref(), Some("Work"));
        assert_eq!(plain.inherited_project, Some(assignment));

        let mut explicit = extract("Task #project/home").metadata;
        apply_context(&mut explicit, &ctx, &config);
        assert_eq!(explicit.project.as_deref(), Some("home"));
        assert!(explicit.inherited_project.is_none());
    }
}
