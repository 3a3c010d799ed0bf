//! Scripted pointer paths for headless runs.
//!
//! Stands in for a user moving the mouse: each path is a deterministic
//! function of the tick (plus a seed for the random walk), so a run is
//! reproducible from its command line.

use blocktime_env::{EnvError, PointerSource, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ticks for one full lap of the circle path.
const CIRCLE_PERIOD_TICKS: u64 = 200;

/// Available scripted paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Constant-speed orbit around the center
    Circle,

    /// Horizontal sweeps, dropping a row at each turn
    Zigzag,

    /// Seeded random walk confined to the bounding box
    Walk,
}

impl PathKind {
    pub fn name(&self) -> &'static str {
        match self {
            PathKind::Circle => "circle",
            PathKind::Zigzag => "zigzag",
            PathKind::Walk => "walk",
        }
    }
}

impl std::fmt::Display for PathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PathKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "circle" | "orbit" => Ok(PathKind::Circle),
            "zigzag" | "zig_zag" => Ok(PathKind::Zigzag),
            "walk" | "random_walk" => Ok(PathKind::Walk),
            _ => Err(format!("Unknown path: {}", s)),
        }
    }
}

/// Deterministic pointer following a [`PathKind`].
pub struct ScriptedPointer {
    kind: PathKind,
    center: Position,
    radius: i32,
    tick: u64,
    current: Position,
    rng: ChaCha8Rng,
}

impl ScriptedPointer {
    /// Creates a pointer moving around `center` within `radius` cells.
    pub fn new(kind: PathKind, center: Position, radius: i32, seed: u64) -> Self {
        Self {
            kind,
            center,
            radius: radius.max(1),
            tick: 0,
            current: center,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn circle(&self) -> Position {
        let angle = std::f64::consts::TAU * (self.tick % CIRCLE_PERIOD_TICKS) as f64
            / CIRCLE_PERIOD_TICKS as f64;
        let r = f64::from(self.radius);
        Position::new(
            self.center.x + (r * angle.cos()).round() as i32,
            self.center.y + (r * angle.sin()).round() as i32,
        )
    }

    fn zigzag(&self) -> Position {
        let span = 2 * i64::from(self.radius);
        let t = self.tick as i64;
        let sweep = t / span;
        let along = t % span;
        let x = if sweep % 2 == 0 { along } else { span - along };
        let rows = i64::from(self.radius).max(1);
        let y = sweep % rows;
        Position::new(
            self.center.x - self.radius + x as i32,
            self.center.y - self.radius / 2 + y as i32,
        )
    }

    fn walk(&mut self) -> Position {
        let dx: i32 = self.rng.gen_range(-1..=1);
        let dy: i32 = self.rng.gen_range(-1..=1);
        Position::new(
            (self.current.x + dx).clamp(self.center.x - self.radius, self.center.x + self.radius),
            (self.current.y + dy).clamp(self.center.y - self.radius, self.center.y + self.radius),
        )
    }
}

impl PointerSource for ScriptedPointer {
    fn sample(&mut self) -> Result<Position, EnvError> {
        let next = match self.kind {
            PathKind::Circle => self.circle(),
            PathKind::Zigzag => self.zigzag(),
            PathKind::Walk => self.walk(),
        };
        self.current = next;
        self.tick += 1;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(pointer: &mut ScriptedPointer, n: usize) -> Vec<Position> {
        (0..n).map(|_| pointer.sample().unwrap()).collect()
    }

    #[test]
    fn test_path_parsing() {
        assert_eq!("circle".parse::<PathKind>().unwrap(), PathKind::Circle);
        assert_eq!("ZIGZAG".parse::<PathKind>().unwrap(), PathKind::Zigzag);
        assert_eq!("random_walk".parse::<PathKind>().unwrap(), PathKind::Walk);
        assert!("spiral".parse::<PathKind>().is_err());
        for kind in [PathKind::Circle, PathKind::Zigzag, PathKind::Walk] {
            assert_eq!(kind.name().parse::<PathKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_circle_stays_on_radius() {
        let center = Position::new(40, 12);
        let mut pointer = ScriptedPointer::new(PathKind::Circle, center, 10, 0);
        let first = pointer.sample().unwrap();
        assert_eq!(first, Position::new(50, 12));

        for p in collect(&mut pointer, 400) {
            let d = p.distance(&center);
            assert!((d - 10.0).abs() <= 1.0, "{} off radius ({})", p, d);
        }
    }

    #[test]
    fn test_circle_repeats_each_lap() {
        let mut pointer = ScriptedPointer::new(PathKind::Circle, Position::new(0, 0), 5, 0);
        let lap1 = collect(&mut pointer, CIRCLE_PERIOD_TICKS as usize);
        let lap2 = collect(&mut pointer, CIRCLE_PERIOD_TICKS as usize);
        assert_eq!(lap1, lap2);
    }

    #[test]
    fn test_zigzag_moves_one_cell_per_tick_horizontally() {
        let mut pointer = ScriptedPointer::new(PathKind::Zigzag, Position::new(20, 20), 8, 0);
        let path = collect(&mut pointer, 64);
        for pair in path.windows(2) {
            assert!((pair[1].x - pair[0].x).abs() <= 1);
            assert!(pair[1].x >= 12 && pair[1].x <= 28);
        }
    }

    #[test]
    fn test_walk_is_seeded_and_bounded() {
        let center = Position::new(30, 30);
        let a = collect(&mut ScriptedPointer::new(PathKind::Walk, center, 4, 42), 500);
        let b = collect(&mut ScriptedPointer::new(PathKind::Walk, center, 4, 42), 500);
        assert_eq!(a, b);

        for p in &a {
            assert!((p.x - center.x).abs() <= 4);
            assert!((p.y - center.y).abs() <= 4);
        }
    }
}
