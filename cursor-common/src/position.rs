/// Represents a location in the source text.
///
/// Used by the cursor both for the start of the remaining input and for
/// checkpoint snapshots. `offset` counts codepoints (Unicode scalar values),
/// `byte_offset` is the matching index into the UTF-8 buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in codepoints)
    pub column: usize,
    /// Codepoint offset from the start of the input
    pub offset: usize,
    /// Byte offset from the start of the input
    pub byte_offset: usize,
}

impl Position {
    /// Creates a new position at the start of the input.
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
            byte_offset: 0,
        }
    }

    /// Creates a position with the given values.
    pub fn at(line: usize, column: usize, offset: usize, byte_offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
            byte_offset,
        }
    }

    /// Moves the position past `text`, which must be the input immediately
    /// following the current position.
    pub fn advance_over(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.offset += 1;
        }
        self.byte_offset += text.len();
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
