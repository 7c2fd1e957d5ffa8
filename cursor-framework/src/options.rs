use std::fmt;
use std::str::FromStr;

use crate::error::{CursorError, CursorResult};
use crate::pattern::{CaptureMode, Modifiers};

/// The declared text encoding of the cursor input.
///
/// Lengths and offsets are always counted in codepoints of this encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    #[default]
    Utf8,
    /// 7-bit ASCII, a strict subset of UTF-8.
    Ascii,
}

impl Encoding {
    /// Parses an encoding label such as `"UTF-8"` or `"us-ascii"`.
    pub fn from_label(label: &str) -> CursorResult<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(CursorError::UnsupportedEncoding(label.to_owned())),
        }
    }

    /// Returns the canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Ascii => "ASCII",
        }
    }

    /// Decodes `bytes`, rejecting anything the encoding does not allow.
    pub fn decode(self, bytes: &[u8]) -> CursorResult<String> {
        let invalid = |valid_up_to| CursorError::InvalidEncoding {
            encoding: self,
            valid_up_to,
        };
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| invalid(e.valid_up_to())),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(invalid(pos)),
                // Checked above: every byte is ASCII.
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }
}

impl FromStr for Encoding {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::from_label(s)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration for a [`Cursor`](crate::Cursor).
///
/// # Examples
///
/// ```rust
/// use cursor_framework::{CaptureMode, Cursor, CursorOptions, Modifiers};
///
/// let options = CursorOptions::default()
///     .with_default_modifiers(Modifiers::parse("i").unwrap())
///     .with_capture(CaptureMode::Offset);
/// let mut cursor = Cursor::with_options("SELECT 1", options);
/// assert!(cursor.match_pattern("select", "").unwrap().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CursorOptions {
    /// Declared encoding of the input.
    ///
    /// # Default
    ///
    /// `Encoding::Utf8`
    pub encoding: Encoding,

    /// Modifiers applied to every pattern in addition to the per-call ones.
    ///
    /// # Default
    ///
    /// none
    pub default_modifiers: Modifiers,

    /// How capture groups are reported by `match_pattern`.
    ///
    /// # Default
    ///
    /// `CaptureMode::Text`
    pub capture: CaptureMode,

    /// Whether compiled patterns are kept for reuse by later matches.
    ///
    /// The cache is keyed by pattern text and modifiers and is never
    /// evicted. Callers that build patterns dynamically should turn it off
    /// or compile once and use `Cursor::match_compiled`.
    ///
    /// # Default
    ///
    /// `true`
    pub cache_patterns: bool,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            default_modifiers: Modifiers::default(),
            capture: CaptureMode::Text,
            cache_patterns: true,
        }
    }
}

impl CursorOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_default_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.default_modifiers = modifiers;
        self
    }

    pub fn with_capture(mut self, capture: CaptureMode) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_cache_patterns(mut self, cache_patterns: bool) -> Self {
        self.cache_patterns = cache_patterns;
        self
    }
}
