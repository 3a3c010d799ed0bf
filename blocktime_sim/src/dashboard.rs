//! Blocktime TUI Dashboard
//! =======================
//!
//! Interactive terminal front-end. The mouse cursor is the leader (carrot);
//! the follower (bunny) trails it through the delay engine. Uses Ratatui
//! for rendering and Crossterm for raw mode and mouse capture.
//!
//! Layout:
//! - Sprites drawn at their absolute terminal cells
//! - Coordinate readout in the top-left corner
//! - Status line (block time, network delay, tick) at the bottom

use std::io::{self, Stdout};
use std::time::Duration;

use blocktime_core::{DelayPolicy, SimConfig};
use blocktime_env::{EnvError, FrameSink, PointerSource, Position, RenderFrame};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::warn;

const LEADER_GLYPH: &str = "🥕";
const FOLLOWER_GLYPH: &str = "🐇";
const GLYPH_WIDTH: u16 = 2;

// =============================================================================
// DASHBOARD INFO
// =============================================================================

/// Static facts shown in the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardInfo {
    pub block_time: Duration,
    pub network_delay: Duration,
    pub interval_ticks: u64,
    pub lag_ticks: u64,
}

impl DashboardInfo {
    pub fn new(config: &SimConfig, policy: &DelayPolicy) -> Self {
        Self {
            block_time: config.block_time,
            network_delay: config.network_delay,
            interval_ticks: policy.interval_ticks,
            lag_ticks: policy.lag_ticks,
        }
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Full-screen terminal renderer.
///
/// Owns the terminal for its lifetime: raw mode, alternate screen and
/// mouse capture are enabled on construction and undone by [`restore`]
/// (or on drop).
///
/// [`restore`]: Dashboard::restore
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    info: DashboardInfo,
    active: bool,
}

impl Dashboard {
    /// Takes over the terminal.
    pub fn new(info: DashboardInfo) -> Result<Self, EnvError> {
        enable_raw_mode().map_err(|e| EnvError::render(format!("raw mode unavailable: {e}")))?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(EnvError::render(format!("terminal setup failed: {e}")));
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
                return Err(e.into());
            }
        };

        Ok(Self {
            terminal,
            info,
            active: true,
        })
    }

    /// Gives the terminal back. Safe to call more than once.
    pub fn restore(&mut self) -> Result<(), EnvError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

impl FrameSink for Dashboard {
    fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError> {
        let info = self.info;
        self.terminal.draw(|f| draw(f, &info, frame))?;
        Ok(())
    }
}

fn draw(f: &mut Frame, info: &DashboardInfo, frame: &RenderFrame) {
    let area = f.area();

    // Follower first so the carrot stays on top when they overlap
    if let Some(rect) = sprite_rect(frame.follower, area) {
        let style = if frame.follower_synced {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        f.render_widget(Paragraph::new(FOLLOWER_GLYPH).style(style), rect);
    }
    if let Some(rect) = sprite_rect(frame.leader, area) {
        f.render_widget(
            Paragraph::new(LEADER_GLYPH).style(Style::default().fg(Color::LightRed)),
            rect,
        );
    }

    // === READOUT ===
    let readout: Vec<Line> = readout_lines(frame).into_iter().map(Line::from).collect();
    let readout_area = Rect::new(area.x, area.y, area.width.min(48), area.height.min(2));
    f.render_widget(
        Paragraph::new(readout).style(Style::default().add_modifier(Modifier::BOLD)),
        readout_area,
    );

    // === FOOTER ===
    if area.height > 2 {
        let footer_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        f.render_widget(
            Paragraph::new(status_line(info, frame.tick)).style(Style::default().fg(Color::DarkGray)),
            footer_area,
        );
    }
}

/// One-cell-high rect for a sprite at `position`, clipped to `area`.
///
/// `None` when the position lies outside the drawable area.
fn sprite_rect(position: Position, area: Rect) -> Option<Rect> {
    let x = u16::try_from(position.x).ok()?;
    let y = u16::try_from(position.y).ok()?;
    if x < area.x || y < area.y || x >= area.right() || y >= area.bottom() {
        return None;
    }
    let width = GLYPH_WIDTH.min(area.right() - x);
    Some(Rect::new(x, y, width, 1))
}

fn readout_lines(frame: &RenderFrame) -> Vec<String> {
    let mut follower = format!("Bunny (chain state): {}", frame.follower);
    if !frame.follower_synced {
        follower.push_str(" (syncing)");
    }
    vec![format!("Carrot (user input): {}", frame.leader), follower]
}

fn status_line(info: &DashboardInfo, tick: u64) -> String {
    format!(
        "block time {:?} ({} ticks) | network delay {:?} ({} ticks) | tick {} | q to quit",
        info.block_time, info.interval_ticks, info.network_delay, info.lag_ticks, tick
    )
}

// =============================================================================
// MOUSE INPUT
// =============================================================================

/// Leader input from the terminal mouse.
///
/// Requires mouse capture, which [`Dashboard::new`] enables. Holds the
/// last reported cell until the mouse moves again.
#[derive(Debug, Default)]
pub struct TerminalPointer {
    last: Position,
    quit: bool,
}

impl TerminalPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one terminal event.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                    self.last = Position::new(i32::from(mouse.column), i32::from(mouse.row));
                }
                _ => {}
            },
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.quit = true
                }
                _ => {}
            },
            _ => {}
        }
    }
}

impl PointerSource for TerminalPointer {
    fn sample(&mut self) -> Result<Position, EnvError> {
        // Drain everything queued since the last tick without blocking
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            self.handle_event(&event);
        }
        Ok(self.last)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

// =============================================================================
// TESTS
// =============================================================================
