use std::ops::Deref;
use std::sync::Arc;

/// Returns the number of codepoints in `text`.
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns the byte index of the `n`th codepoint of `text`, clamped to
/// `text.len()` when `text` is shorter than `n` codepoints.
pub fn byte_index(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Returns the first `n` codepoints of `text`.
pub fn char_prefix(text: &str, n: usize) -> &str {
    &text[..byte_index(text, n)]
}

/// Returns `text` without its first `n` codepoints.
pub fn char_suffix(text: &str, n: usize) -> &str {
    &text[byte_index(text, n)..]
}

/// Immutable slice referencing a shared text buffer.
///
/// The slice keeps an `Arc<str>` alive so that it can be freely cloned and
/// moved around without worrying about lifetimes. It implements `Deref<Target =
/// str>` which allows it to be used transparently as `&str` in most places.
#[derive(Clone, Debug)]
pub struct TextSlice {
    buffer: Arc<str>,
    start: usize,
    end: usize,
}

impl TextSlice {
    /// Creates a new slice from the given shared buffer and byte range.
    pub fn new(buffer: Arc<str>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        debug_assert!(end <= buffer.len());
        Self { buffer, start, end }
    }

    /// Creates a slice that covers the entire buffer.
    pub fn from_arc(buffer: Arc<str>) -> Self {
        let end = buffer.len();
        Self {
            buffer,
            start: 0,
            end,
        }
    }

    /// Creates a slice of the first `n` codepoints starting at byte `start`.
    pub fn chars_from(buffer: Arc<str>, start: usize, n: usize) -> Self {
        let end = start + byte_index(&buffer[start..], n);
        Self::new(buffer, start, end)
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns the length in codepoints.
    pub fn char_len(&self) -> usize {
        char_len(self)
    }

    /// Returns `true` if the slice is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the underlying shared buffer.
    pub fn buffer(&self) -> Arc<str> {
        Arc::clone(&self.buffer)
    }

    /// Returns the start byte offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the end byte offset.
    pub fn end(&self) -> usize {
        self.end
    }
}

impl std::fmt::Display for TextSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self)
    }
}

impl Deref for TextSlice {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.buffer[self.start..self.end]
    }
}

impl AsRef<str> for TextSlice {
    fn as_ref(&self) -> &str {
        self
    }
}

impl From<TextSlice> for String {
    fn from(slice: TextSlice) -> Self {
        slice.deref().to_owned()
    }
}

impl PartialEq<&str> for TextSlice {
    fn eq(&self, other: &&str) -> bool {
        self.deref() == *other
    }
}

impl PartialEq<str> for TextSlice {
    fn eq(&self, other: &str) -> bool {
        self.deref() == other
    }
}

impl PartialEq<TextSlice> for &str {
    fn eq(&self, other: &TextSlice) -> bool {
        *self == other.deref()
    }
}

// Content equality: slices of different buffers compare equal when their
// text matches.
impl PartialEq for TextSlice {
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl Eq for TextSlice {}
