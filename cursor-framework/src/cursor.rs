use std::collections::HashMap;
use std::sync::Arc;

use cursor_common::text_slice::{char_len, char_prefix};
use cursor_common::{Checkpoint, Position, TextSlice};
use tracing::{debug, trace};

use crate::error::CursorResult;
use crate::options::{CursorOptions, Encoding};
use crate::pattern::{MatchOptions, MatchOutcome, Modifiers, Pattern};

/// A checkpointable cursor over a string, counted in codepoints.
///
/// Matching and peeking only *stage* a pending length; `accept` commits it
/// and advances. Each commit takes an implicit checkpoint so that `cancel`
/// undoes it, unless the caller froze an earlier checkpoint with `save`, in
/// which case a single `cancel` rolls back every commit made since.
///
/// ```rust
/// use cursor_framework::Cursor;
///
/// let mut cursor = Cursor::new("abc123");
/// let word = cursor.match_pattern("[a-z]+", "").unwrap().unwrap();
/// assert_eq!(word.as_str(), "abc");
/// assert_eq!(cursor.current_text(), "123");
/// cursor.cancel();
/// assert_eq!(cursor.current_text(), "abc123");
/// ```
#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Arc<str>,
    total_chars: usize,
    position: Position,
    pending: usize,
    checkpoint: Checkpoint,
    options: CursorOptions,
    patterns: HashMap<(String, Modifiers), Pattern>,
}

impl Cursor {
    /// Creates a new UTF-8 cursor from the input string.
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self::with_options(input, CursorOptions::default())
    }

    /// Creates a cursor with explicit options.
    pub fn with_options<S: Into<String>>(input: S, options: CursorOptions) -> Self {
        let owned = input.into();
        Self::with_arc(Arc::<str>::from(owned), options)
    }

    /// Creates a cursor from an existing shared buffer.
    pub fn with_arc(buffer: Arc<str>, options: CursorOptions) -> Self {
        let total_chars = char_len(&buffer);
        trace!(target: "cursor", chars = total_chars, encoding = %options.encoding, "Creating cursor");
        Self {
            buffer,
            total_chars,
            position: Position::new(),
            pending: 0,
            checkpoint: Checkpoint::Empty,
            options,
            patterns: HashMap::new(),
        }
    }

    /// Creates a cursor over `input` declared in the encoding named `label`.
    pub fn with_encoding<S: Into<String>>(input: S, label: &str) -> CursorResult<Self> {
        let encoding = Encoding::from_label(label)?;
        let input = input.into();
        // Validates the declaration, e.g. non-ASCII text declared as ASCII.
        encoding.decode(input.as_bytes())?;
        Ok(Self::with_options(
            input,
            CursorOptions::default().with_encoding(encoding),
        ))
    }

    /// Decodes `bytes` in the encoding named `label` and creates a cursor.
    pub fn from_bytes(bytes: &[u8], label: &str) -> CursorResult<Self> {
        let encoding = Encoding::from_label(label)?;
        let input = encoding.decode(bytes)?;
        Ok(Self::with_options(
            input,
            CursorOptions::default().with_encoding(encoding),
        ))
    }

    /// Reverts to the original input and clears pending length, checkpoint
    /// and lock.
    pub fn reset(&mut self) {
        trace!(target: "cursor::checkpoint", "Resetting cursor");
        self.position = Position::new();
        self.pending = 0;
        self.checkpoint = Checkpoint::Empty;
    }

    // ----- position tracking -----

    /// Returns true if any input is left.
    pub fn has_remaining(&self) -> bool {
        self.position.byte_offset < self.buffer.len()
    }

    /// Returns the remaining input length in codepoints.
    pub fn remaining_length(&self) -> usize {
        self.total_chars - self.position.offset
    }

    /// Returns the staged, not yet committed, length in codepoints.
    pub fn pending_length(&self) -> usize {
        self.pending
    }

    /// Returns the input not consumed yet.
    pub fn current_text(&self) -> &str {
        &self.buffer[self.position.byte_offset..]
    }

    /// Returns the input the cursor was created with.
    pub fn original_text(&self) -> &str {
        &self.buffer
    }

    /// Returns the input consumed so far.
    pub fn consumed_text(&self) -> &str {
        &self.buffer[..self.position.byte_offset]
    }

    /// Returns the position of the start of the remaining input.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn encoding(&self) -> Encoding {
        self.options.encoding
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Returns true if a checkpoint is frozen by `save`.
    pub fn is_locked(&self) -> bool {
        self.checkpoint.is_locked()
    }

    /// Returns true if a snapshot is held, even one at the current position.
    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.snapshot().is_some()
    }

    // ----- anchored matcher -----

    /// Matches `pattern` at the start of the remaining input and commits the
    /// match on success.
    ///
    /// `modifiers` is a flag string such as `"i"`. Returns `Ok(None)` when
    /// the pattern does not match; the cursor is then left untouched.
    pub fn match_pattern(
        &mut self,
        pattern: &str,
        modifiers: &str,
    ) -> CursorResult<Option<MatchOutcome>> {
        let options = MatchOptions::default().with_capture(self.options.capture);
        self.match_with(pattern, modifiers, options)
    }

    /// Like [`match_pattern`](Self::match_pattern) with explicit commit and
    /// capture options.
    pub fn match_with(
        &mut self,
        pattern: &str,
        modifiers: &str,
        options: MatchOptions,
    ) -> CursorResult<Option<MatchOutcome>> {
        let modifiers = Modifiers::parse(modifiers)?.union(self.options.default_modifiers);
        let key = (pattern.to_owned(), modifiers);

        if let Some(compiled) = self.patterns.get(&key) {
            let compiled = compiled.clone();
            return Ok(self.match_compiled(&compiled, options));
        }

        let compiled = Pattern::new(pattern, modifiers)?;
        let outcome = self.match_compiled(&compiled, options);
        if self.options.cache_patterns {
            self.patterns.insert(key, compiled);
        }
        Ok(outcome)
    }

    /// Matches a precompiled pattern at the start of the remaining input.
    pub fn match_compiled(
        &mut self,
        pattern: &Pattern,
        options: MatchOptions,
    ) -> Option<MatchOutcome> {
        let outcome = pattern.match_at(&self.buffer, self.position.byte_offset, options.capture)?;

        self.pending = outcome.char_len();
        debug!(target: "cursor::pattern",
            pattern = pattern.source(),
            text = outcome.as_str(),
            position = %self.position,
            commit = options.commit,
            "Matched"
        );
        if options.commit {
            self.accept();
        }
        Some(outcome)
    }

    /// Stages the next `length` codepoints and returns them.
    pub fn peek(&mut self, length: usize) -> Option<TextSlice> {
        self.peek_with(length, 0)
    }

    /// Stages and returns `length + extra` codepoints.
    ///
    /// NOTE: `extra` widens the staged span, it is not a start offset.
    /// `peek_with(2, 3)` on `"abcdef"` returns `"abcde"`. Callers use this to
    /// look at a window and then commit a wider one with a bare `accept`.
    /// Returns `None` when no input is left.
    pub fn peek_with(&mut self, length: usize, extra: usize) -> Option<TextSlice> {
        if !self.has_remaining() {
            return None;
        }
        let remaining = self.remaining_length();
        self.pending = length.min(remaining).saturating_add(extra).min(remaining);
        Some(TextSlice::chars_from(
            Arc::clone(&self.buffer),
            self.position.byte_offset,
            self.pending,
        ))
    }

    /// Returns the next `length` codepoints and advances past them.
    pub fn consume(&mut self, length: usize) -> Option<TextSlice> {
        self.consume_with(length, 0)
    }

    /// [`peek_with`](Self::peek_with) followed by a commit.
    pub fn consume_with(&mut self, length: usize, extra: usize) -> Option<TextSlice> {
        let slice = self.peek_with(length, extra);
        self.accept();
        slice
    }

    /// Consumes single codepoints while `predicate` accepts them.
    pub fn peek_while<F>(&mut self, predicate: F) -> String
    where
        F: FnMut(&str) -> bool,
    {
        self.peek_while_chunked(predicate, 1)
    }

    /// Consumes `chunk_size` codepoints at a time while `predicate` accepts
    /// the peeked chunk, returning everything consumed.
    ///
    /// The chunk that fails the predicate stays staged, so a following bare
    /// `accept` takes it too.
    pub fn peek_while_chunked<F>(&mut self, mut predicate: F, chunk_size: usize) -> String
    where
        F: FnMut(&str) -> bool,
    {
        let mut result = String::new();
        if chunk_size == 0 {
            return result;
        }
        while let Some(chunk) = self.peek(chunk_size) {
            if !predicate(&*chunk) {
                break;
            }
            result.push_str(&chunk);
            self.accept();
        }
        result
    }

    // ----- checkpoint / transaction -----

    /// Commits the pending length.
    pub fn accept(&mut self) {
        self.accept_with(0, 0);
    }

    /// Commits the pending length plus `extra_length + extra_offset`
    /// codepoints, clamped to the remaining input.
    pub fn accept_with(&mut self, extra_length: usize, extra_offset: usize) {
        if !self.checkpoint.is_locked() {
            self.checkpoint = Checkpoint::Unlocked(self.position);
        }

        let advance = self
            .pending
            .saturating_add(extra_length)
            .saturating_add(extra_offset)
            .min(self.remaining_length());
        let consumed = char_prefix(self.current_text(), advance);
        let mut position = self.position;
        position.advance_over(consumed);

        trace!(target: "cursor::checkpoint", from = %self.position, to = %position, chars = advance, "Accepted");
        self.position = position;
        self.pending = 0;
    }

    /// Freezes a checkpoint at the current position so that later commits
    /// do not replace it.
    pub fn save(&mut self) {
        self.save_with(true);
    }

    /// Captures a checkpoint, frozen if `lock` is set. Does nothing while a
    /// frozen checkpoint exists.
    pub fn save_with(&mut self, lock: bool) {
        if self.checkpoint.is_locked() {
            return;
        }
        trace!(target: "cursor::checkpoint", position = %self.position, lock, "Saved checkpoint");
        self.checkpoint = if lock {
            Checkpoint::Locked(self.position)
        } else {
            Checkpoint::Unlocked(self.position)
        };
    }

    /// Rolls back to the checkpoint, if any, and clears the pending length,
    /// checkpoint and lock.
    pub fn cancel(&mut self) {
        if let Some(position) = self.checkpoint.take() {
            trace!(target: "cursor::checkpoint", from = %self.position, to = %position, "Cancelled");
            self.position = position;
        }
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_state() {
        let cursor = Cursor::new("héllo");
        assert_eq!(cursor.remaining_length(), 5);
        assert_eq!(cursor.pending_length(), 0);
        assert!(cursor.has_remaining());
        assert!(!cursor.has_checkpoint());
        assert!(!cursor.is_locked());
        assert_eq!(cursor.encoding(), Encoding::Utf8);
    }

    #[test]
    fn test_accept_tracks_bytes_and_codepoints() {
        let mut cursor = Cursor::new("héllo");
        cursor.peek(2);
        cursor.accept();
        assert_eq!(cursor.current_text(), "llo");
        assert_eq!(cursor.consumed_text(), "hé");
        assert_eq!(cursor.position().offset, 2);
        assert_eq!(cursor.position().byte_offset, 3);
        assert_eq!(cursor.remaining_length(), 3);
    }

    #[test]
    fn test_accept_takes_implicit_checkpoint() {
        let mut cursor = Cursor::new("abc");
        cursor.consume(1);
        assert_eq!(cursor.checkpoint, Checkpoint::Unlocked(Position::new()));
    }

    #[test]
    fn test_locked_checkpoint_survives_accept() {
        let mut cursor = Cursor::new("abc");
        cursor.save();
        cursor.consume(1);
        cursor.consume(1);
        assert_eq!(cursor.checkpoint, Checkpoint::Locked(Position::new()));
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut cursor = Cursor::new("abc");
        cursor.save();
        cursor.consume(2);
        cursor.peek(1);
        cursor.cancel();
        assert_eq!(cursor.checkpoint, Checkpoint::Empty);
        assert_eq!(cursor.pending_length(), 0);
        assert_eq!(cursor.current_text(), "abc");
    }

    #[test]
    fn test_pattern_cache() {
        let mut cursor = Cursor::new("aaa");
        cursor.match_pattern("a", "").unwrap();
        cursor.match_pattern("a", "").unwrap();
        assert_eq!(cursor.patterns.len(), 1);

        let options = CursorOptions::default().with_cache_patterns(false);
        let mut uncached = Cursor::with_options("aaa", options);
        uncached.match_pattern("a", "").unwrap();
        assert!(uncached.patterns.is_empty());

        let compiled = Pattern::parse("a", "").unwrap();
        cursor.reset();
        for _ in 0..3 {
            assert!(cursor.match_compiled(&compiled, MatchOptions::default()).is_some());
        }
        assert_eq!(cursor.patterns.len(), 1);
    }
}
