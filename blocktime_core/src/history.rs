//! Fixed-capacity circular history of leader positions.
//!
//! The buffer is a bounded sliding window over an unbounded stream of
//! samples: one slot per tick, allocated once, oldest sample overwritten
//! when the window is full.
//!
//! # Indexing
//!
//! ```text
//!  slot:    0     1     2     3     4        capacity = 5
//!         [p5]  [p6]  [p2]  [p3]  [p4]       head = 1 (p6 latest)
//!                 ^
//!  read(0) = p6, read(1) = p5, read(4) = p2, read(5) -> error
//! ```

use blocktime_env::Position;

use crate::config::check_capacity;
use crate::error::{BlocktimeError, Result};

/// Circular store of the most recent `capacity` positions.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Pre-allocated slots, zero-initialized
    slots: Vec<Position>,

    /// Slot holding the most recent write
    head: usize,

    /// Total writes since construction
    writes: u64,
}

impl HistoryBuffer {
    /// Creates a buffer with `capacity` zeroed slots.
    ///
    /// Capacity must lie in `1..=MAX_HISTORY_CAPACITY`; nothing is
    /// allocated otherwise.
    pub fn new(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        Ok(Self {
            slots: vec![Position::default(); capacity],
            head: 0,
            writes: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding real samples (saturates at capacity).
    pub fn len(&self) -> usize {
        usize::try_from(self.writes).map_or(self.capacity(), |w| w.min(self.capacity()))
    }

    pub fn is_empty(&self) -> bool {
        self.writes == 0
    }

    /// Advances the cursor (wrapping) and stores `position` there,
    /// overwriting whatever the slot held.
    pub fn write(&mut self, position: Position) {
        self.head += 1;
        if self.head >= self.slots.len() {
            self.head = 0;
        }
        self.slots[self.head] = position;
        self.writes += 1;
    }

    /// Returns the position written `offset` writes before the latest one.
    ///
    /// Slots never written since construction read as the origin.
    /// `offset >= capacity` is an error: it would silently wrap past the
    /// retained history.
    pub fn read(&self, offset: usize) -> Result<Position> {
        Ok(self.slots[self.index_of(offset)?])
    }

    /// Like [`read`](Self::read), but `None` for slots that were never written.
    pub fn get(&self, offset: usize) -> Option<Position> {
        if offset >= self.len() {
            return None;
        }
        self.index_of(offset).ok().map(|idx| self.slots[idx])
    }

    /// Slot index for `offset`, normalized into `[0, capacity)`.
    fn index_of(&self, offset: usize) -> Result<usize> {
        let capacity = self.slots.len();
        if offset >= capacity {
            return Err(BlocktimeError::OffsetOutOfRange { offset, capacity });
        }
        Ok((self.head + capacity - offset) % capacity)
    }
}
