//! Common types shared by the engine and its collaborators.

use serde::{Deserialize, Serialize};

/// An integer 2D position (pointer cell, sprite anchor).
///
/// Copied by value everywhere; the zero value is the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// The origin (0, 0).
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    /// Creates a new position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Tick this frame was produced on
    pub tick: u64,

    /// Live input sample
    pub leader: Position,

    /// Lagged, periodically refreshed read of history
    pub follower: Position,

    /// Whether the follower was refreshed on this tick
    pub refreshed: bool,

    /// False while the follower still reads slots that were never written
    pub follower_synced: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_default_is_origin() {
        assert_eq!(Position::default(), Position::ORIGIN);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, -4).to_string(), "(3, -4)");
    }

    #[test]
    fn test_position_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
        assert_eq!(b.distance(&b), 0.0);
    }
}
