//! Cursor Common
//!
//! Shared building blocks for `cursor-framework`: codepoint-aware slicing,
//! source positions and the single-slot checkpoint state.

pub mod checkpoint;
pub mod position;
pub mod text_slice;

pub use checkpoint::Checkpoint;
pub use position::Position;
pub use text_slice::TextSlice;
