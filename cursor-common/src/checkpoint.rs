use crate::Position;

/// The single checkpoint slot of a cursor.
///
/// A snapshot is the position of the remaining input at the time it was
/// captured. `Locked` freezes the snapshot so implicit checkpoints taken on
/// commit cannot overwrite it; a lock without a snapshot cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Checkpoint {
    /// Nothing to roll back to.
    #[default]
    Empty,
    /// Snapshot that the next commit will replace.
    Unlocked(Position),
    /// Snapshot frozen across commits until cancelled or reset.
    Locked(Position),
}

impl Checkpoint {
    /// Returns the saved position, if any.
    pub fn snapshot(&self) -> Option<Position> {
        match self {
            Checkpoint::Empty => None,
            Checkpoint::Unlocked(pos) | Checkpoint::Locked(pos) => Some(*pos),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Checkpoint::Locked(_))
    }

    /// Clears the slot and returns the snapshot it held.
    pub fn take(&mut self) -> Option<Position> {
        std::mem::take(self).snapshot()
    }
}
