//! A single-slot, checkpointable cursor for hand-written lexers and parsers.
//!
//! The [`Cursor`] tracks the remaining input in codepoints, stages matched or
//! peeked lengths until they are accepted, and keeps one checkpoint that
//! `cancel` rolls back to.

pub mod cursor;
pub mod error;
pub mod options;
pub mod pattern;

pub use cursor::Cursor;
pub use cursor_common::{Checkpoint, Position, TextSlice};
pub use error::{CursorError, CursorResult, PatternError};
pub use options::{CursorOptions, Encoding};
pub use pattern::{CaptureMode, Group, MatchOptions, MatchOutcome, Modifiers, Pattern};
