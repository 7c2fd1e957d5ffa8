use std::fmt;
use std::sync::Arc;

use cursor_common::text_slice::char_len;
use cursor_common::TextSlice;
use regex::Regex;
use regex_syntax::hir::{Hir, Look};
use regex_syntax::ParserBuilder;
use tracing::trace;

use crate::error::{CursorError, CursorResult, PatternError};

/// Flags handed to the pattern engine.
///
/// Written as the usual single-letter modifier string: `i` case-insensitive,
/// `m` multi-line, `s` dot matches newline, `x` ignore whitespace and
/// `U` swap greed. `u` is accepted and ignored since Unicode mode is
/// always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
    pub swap_greed: bool,
}

impl Modifiers {
    /// Parses a modifier string such as `"im"`.
    pub fn parse(flags: &str) -> CursorResult<Self> {
        let mut modifiers = Self::default();
        for flag in flags.chars() {
            match flag {
                'i' => modifiers.case_insensitive = true,
                'm' => modifiers.multi_line = true,
                's' => modifiers.dot_matches_new_line = true,
                'x' => modifiers.ignore_whitespace = true,
                'U' => modifiers.swap_greed = true,
                'u' => {}
                other => return Err(CursorError::UnknownModifier(other)),
            }
        }
        Ok(modifiers)
    }

    /// Returns the flags set in either `self` or `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            case_insensitive: self.case_insensitive || other.case_insensitive,
            multi_line: self.multi_line || other.multi_line,
            dot_matches_new_line: self.dot_matches_new_line || other.dot_matches_new_line,
            ignore_whitespace: self.ignore_whitespace || other.ignore_whitespace,
            swap_greed: self.swap_greed || other.swap_greed,
        }
    }

    fn parser(&self) -> ParserBuilder {
        let mut builder = ParserBuilder::new();
        builder
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_matches_new_line)
            .ignore_whitespace(self.ignore_whitespace)
            .swap_greed(self.swap_greed)
            .unicode(true);
        builder
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_matches_new_line, 's'),
            (self.ignore_whitespace, 'x'),
            (self.swap_greed, 'U'),
        ];
        for (set, flag) in flags {
            if set {
                write!(f, "{flag}")?;
            }
        }
        Ok(())
    }
}

/// How capture groups are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptureMode {
    /// Groups carry their text only.
    #[default]
    Text,
    /// Groups also carry their codepoint offset from the start of the
    /// remaining input.
    Offset,
}

/// Per-call matching options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Commit the match (advance past it) when it succeeds.
    pub commit: bool,
    pub capture: CaptureMode,
}

impl MatchOptions {
    /// Options that only stage the matched length, leaving the commit to a
    /// later `accept`.
    pub fn staged() -> Self {
        Self {
            commit: false,
            ..Self::default()
        }
    }

    pub fn with_capture(mut self, capture: CaptureMode) -> Self {
        self.capture = capture;
        self
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            commit: true,
            capture: CaptureMode::Text,
        }
    }
}

/// A compiled pattern that only matches at the start of its haystack.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    modifiers: Modifiers,
    regex: Regex,
    names: Arc<[Option<String>]>,
}

impl Pattern {
    /// Compiles `source` with the given modifiers, anchored at the start.
    pub fn new(source: &str, modifiers: Modifiers) -> CursorResult<Self> {
        let invalid = |e: PatternError| CursorError::InvalidPattern {
            pattern: source.to_owned(),
            source: e,
        };

        // Anchoring is applied to the parsed expression rather than the
        // text, so inline flags, comments and alternations in `source`
        // cannot escape it. Modifiers are baked into the printed expression.
        let hir = modifiers
            .parser()
            .build()
            .parse(source)
            .map_err(|e| invalid(e.into()))?;
        let anchored = Hir::concat(vec![Hir::look(Look::Start), hir]);
        let regex = Regex::new(&anchored.to_string()).map_err(|e| invalid(e.into()))?;
        let names = regex
            .capture_names()
            .map(|name| name.map(str::to_owned))
            .collect();

        trace!(target: "cursor::pattern", pattern = source, %modifiers, "Compiled anchored pattern");
        Ok(Self {
            source: source.to_owned(),
            modifiers,
            regex,
            names,
        })
    }

    /// Compiles `source` with a modifier string such as `"i"`.
    pub fn parse(source: &str, flags: &str) -> CursorResult<Self> {
        Self::new(source, Modifiers::parse(flags)?)
    }

    /// Returns the expression as written, without the anchor.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Number of groups, including the implicit whole-match group 0.
    pub fn group_count(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the pattern matches at the start of `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches against `buffer[start..]`, reporting slices of `buffer`.
    pub(crate) fn match_at(
        &self,
        buffer: &Arc<str>,
        start: usize,
        capture: CaptureMode,
    ) -> Option<MatchOutcome> {
        let haystack = &buffer[start..];
        let captures = self.regex.captures(haystack)?;
        let groups: Vec<Option<Group>> = captures
            .iter()
            .map(|group| {
                group.map(|m| Group {
                    text: TextSlice::new(Arc::clone(buffer), start + m.start(), start + m.end()),
                    offset: match capture {
                        CaptureMode::Text => None,
                        CaptureMode::Offset => Some(char_len(&haystack[..m.start()])),
                    },
                })
            })
            .collect();
        let whole = groups.first().cloned().flatten()?;
        Some(MatchOutcome {
            whole,
            groups,
            names: Arc::clone(&self.names),
        })
    }
}

/// One capture group of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    text: TextSlice,
    offset: Option<usize>,
}

impl Group {
    pub fn text(&self) -> &TextSlice {
        &self.text
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Codepoint offset from the start of the remaining input at match time.
    /// Only reported in [`CaptureMode::Offset`].
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn char_len(&self) -> usize {
        self.text.char_len()
    }
}

/// The result of a successful anchored match.
///
/// Group 0 is the whole match; groups that did not take part in the match
/// are `None`.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    whole: Group,
    groups: Vec<Option<Group>>,
    names: Arc<[Option<String>]>,
}

impl MatchOutcome {
    /// The whole match.
    pub fn whole(&self) -> &Group {
        &self.whole
    }

    /// Text of the whole match.
    pub fn text(&self) -> &TextSlice {
        self.whole().text()
    }

    pub fn as_str(&self) -> &str {
        self.whole().as_str()
    }

    /// Length of the whole match in codepoints.
    pub fn char_len(&self) -> usize {
        self.whole().char_len()
    }

    /// Returns group `index`, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)?.as_ref()
    }

    /// Returns the named group `name`, if it participated in the match.
    pub fn name(&self, name: &str) -> Option<&Group> {
        let index = self
            .names
            .iter()
            .position(|n| n.as_deref() == Some(name))?;
        self.get(index)
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over all groups, starting with group 0.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Group>> {
        self.groups.iter().map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(pattern: &Pattern, text: &str, capture: CaptureMode) -> Option<MatchOutcome> {
        pattern.match_at(&Arc::from(text), 0, capture)
    }

    #[test]
    fn test_parse_modifiers() {
        let modifiers = Modifiers::parse("imsxUu").unwrap();
        assert!(modifiers.case_insensitive);
        assert!(modifiers.multi_line);
        assert!(modifiers.dot_matches_new_line);
        assert!(modifiers.ignore_whitespace);
        assert!(modifiers.swap_greed);
        assert_eq!(modifiers.to_string(), "imsxU");
    }

    #[test]
    fn test_unknown_modifier() {
        assert!(matches!(
            Modifiers::parse("iq"),
            Err(CursorError::UnknownModifier('q'))
        ));
    }

    #[test]
    fn test_union() {
        let a = Modifiers::parse("i").unwrap();
        let b = Modifiers::parse("s").unwrap();
        assert_eq!(a.union(b), Modifiers::parse("is").unwrap());
    }

    #[test]
    fn test_anchored_at_start() {
        let pattern = Pattern::parse("[0-9]+", "").unwrap();
        assert!(pattern.is_match("123abc"));
        assert!(!pattern.is_match("abc123"));
    }

    #[test]
    fn test_multi_line_stays_anchored() {
        let pattern = Pattern::parse("^b", "m").unwrap();
        assert!(!pattern.is_match("a\nb"));
        assert!(pattern.is_match("b\na"));
    }

    #[test]
    fn test_alternation_is_anchored() {
        let pattern = Pattern::parse("a|b", "").unwrap();
        assert!(!pattern.is_match("xb"));
        assert!(pattern.is_match("bx"));
    }

    #[test]
    fn test_ignore_whitespace_with_trailing_comment() {
        let pattern = Pattern::parse("[a-z]+  # word", "x").unwrap();
        assert!(pattern.is_match("hello"));
    }

    #[test]
    fn test_inline_ignore_whitespace_with_trailing_comment() {
        let pattern = Pattern::parse("(?x)abc # word", "").unwrap();
        assert!(pattern.is_match("abcdef"));
        assert!(!pattern.is_match("xabc"));
    }

    #[test]
    fn test_inline_flags_do_not_leak_anchor() {
        let pattern = Pattern::parse("(?m)^b|c", "").unwrap();
        assert!(!pattern.is_match("a\nb"));
        assert!(!pattern.is_match("ac"));
        assert!(pattern.is_match("cb"));
    }

    #[test]
    fn test_unbalanced_pattern_is_rejected() {
        let err = Pattern::parse("a)|(b", "").unwrap_err();
        assert!(matches!(err, CursorError::InvalidPattern { ref pattern, .. } if pattern == "a)|(b"));
    }

    #[test]
    fn test_groups_text_mode() {
        let pattern = Pattern::parse(r"(\w+)=(?P<value>\d+)?", "").unwrap();
        let m = outcome(&pattern, "key=42;", CaptureMode::Text).unwrap();
        assert_eq!(m.as_str(), "key=42");
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(1).unwrap().as_str(), "key");
        assert_eq!(m.name("value").unwrap().as_str(), "42");
        assert_eq!(m.get(1).unwrap().offset(), None);
    }

    #[test]
    fn test_unmatched_group_is_none() {
        let pattern = Pattern::parse(r"(a)|(b)", "").unwrap();
        let m = outcome(&pattern, "b", CaptureMode::Text).unwrap();
        assert!(m.get(1).is_none());
        assert_eq!(m.get(2).unwrap().as_str(), "b");
    }

    #[test]
    fn test_groups_offset_mode_counts_codepoints() {
        let pattern = Pattern::parse(r"(é+)(\d+)", "").unwrap();
        let m = outcome(&pattern, "éé12", CaptureMode::Offset).unwrap();
        assert_eq!(m.whole().offset(), Some(0));
        assert_eq!(m.get(1).unwrap().offset(), Some(0));
        assert_eq!(m.get(2).unwrap().offset(), Some(2));
        assert_eq!(m.char_len(), 4);
    }
}
