//! Input and output collaborator traits.

use crate::error::EnvError;
use crate::types::{Position, RenderFrame};

/// Supplies the leader position once per tick.
///
/// # Implementations
///
/// - **Interactive**: terminal mouse cursor (crossterm mouse capture)
/// - **Headless**: deterministic scripted paths
///
/// The engine treats the source as opaque: whatever it returns for a tick
/// is written into history unchanged.
pub trait PointerSource {
    /// Returns the current pointer position.
    ///
    /// # Returns
    /// * `Ok(position)` - The sample for this tick
    /// * `Err(EnvError)` - The device failed; the driver aborts the run
    fn sample(&mut self) -> Result<Position, EnvError>;

    /// Whether the user asked to stop (e.g. pressed `q`).
    ///
    /// Sources without a notion of quitting never request it.
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Consumes finished frames (leader, follower, readout).
pub trait FrameSink {
    /// Draws or records a single frame.
    fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError>;
}

impl<T: PointerSource + ?Sized> PointerSource for Box<T> {
    fn sample(&mut self) -> Result<Position, EnvError> {
        (**self).sample()
    }

    fn quit_requested(&self) -> bool {
        (**self).quit_requested()
    }
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError> {
        (**self).render(frame)
    }
}

/// Fans a frame out to two sinks (e.g. dashboard + exporter).
impl<A: FrameSink, B: FrameSink> FrameSink for (A, B) {
    fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError> {
        self.0.render(frame)?;
        self.1.render(frame)
    }
}

impl<T: FrameSink> FrameSink for Option<T> {
    fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError> {
        match self {
            Some(sink) => sink.render(frame),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ticks: Vec<u64>,
    }

    impl FrameSink for Recorder {
        fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError> {
            self.ticks.push(frame.tick);
            Ok(())
        }
    }

    fn frame(tick: u64) -> RenderFrame {
        RenderFrame {
            tick,
            leader: Position::new(1, 1),
            follower: Position::ORIGIN,
            refreshed: false,
            follower_synced: false,
        }
    }

    #[test]
    fn test_pair_sink_renders_both() {
        let mut pair = (Recorder::default(), Recorder::default());
        pair.render(&frame(1)).unwrap();
        pair.render(&frame(2)).unwrap();
        assert_eq!(pair.0.ticks, vec![1, 2]);
        assert_eq!(pair.1.ticks, vec![1, 2]);
    }

    #[test]
    fn test_optional_sink() {
        let mut none: Option<Recorder> = None;
        assert!(none.render(&frame(1)).is_ok());

        let mut some = Some(Recorder::default());
        some.render(&frame(7)).unwrap();
        assert_eq!(some.unwrap().ticks, vec![7]);
    }
}
