use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use fireworks_core::{
    CelebrationConfig, CelebrationEngine, CelebrationTrigger, ConfigError, GameStatus,
    MemorySurface, Millis, Point, SessionHandle, SessionState,
};
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Virtual pixels per terminal column
pub const CELL_WIDTH: f64 = 8.0;
/// Virtual pixels per terminal row
pub const CELL_HEIGHT: f64 = 16.0;
/// How long a status message stays up
pub const MESSAGE_MS: Millis = 3000;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// The main application state
pub struct App {
    /// Fireworks engine drawing onto a terminal-sized surface
    pub engine: CelebrationEngine<MemorySurface, StdRng>,
    /// Color theme
    pub theme: Theme,
    /// Most recent celebration
    pub session: Option<SessionHandle>,
    /// Winner to show under the fireworks
    pub winner: Option<String>,
    /// Message to display
    pub message: Option<String>,
    /// Clock time at which the message is cleared
    message_until: Millis,
    trigger: CelebrationTrigger,
    started: Instant,
    /// Clock used for rendering, in ms since start
    now: Millis,
}

impl App {
    pub fn new(
        config: CelebrationConfig,
        rng: StdRng,
        cols: u16,
        rows: u16,
    ) -> Result<Self, ConfigError> {
        let (width, height) = surface_extent(cols, rows);
        let engine =
            CelebrationEngine::with_config(MemorySurface::new(width, height), rng, config)?;
        Ok(Self {
            engine,
            theme: Theme::dark(),
            session: None,
            winner: None,
            message: None,
            message_until: 0,
            trigger: CelebrationTrigger::new(),
            started: Instant::now(),
            now: 0,
        })
    }

    /// Milliseconds since the app started
    pub fn elapsed_ms(&self) -> Millis {
        self.started.elapsed().as_millis() as Millis
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Faster ticks while anything is on screen
    pub fn get_tick_rate(&self) -> Duration {
        if self.engine.is_idle() {
            Duration::from_millis(100) // 10 FPS while idle
        } else {
            Duration::from_millis(33) // 30 FPS for animations
        }
    }

    /// Update animations and timers (called every tick)
    pub fn tick(&mut self) {
        let now = self.elapsed_ms();
        self.tick_at(now);
    }

    pub fn tick_at(&mut self, now: Millis) {
        self.now = self.now.max(now);

        if self.message.is_some() && self.now >= self.message_until {
            self.message = None;
        }

        let report = self.engine.tick(self.now);
        if report.attach_failures > 0 {
            log::warn!("{} particles could not be drawn", report.attach_failures);
        }
        if self
            .session
            .is_some_and(|s| report.sessions_finished.contains(&s))
        {
            self.show_message("Celebration over - space for another");
        }
    }

    /// Keep the surface in step with the terminal
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = surface_extent(cols, rows);
        self.engine.surface_mut().resize(width, height);
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_until = self.now.saturating_add(MESSAGE_MS);
    }

    /// Start fireworks now
    pub fn celebrate(&mut self) {
        match self.engine.celebrate(self.now) {
            Ok(handle) => {
                self.session = Some(handle);
                self.message = None;
                // Earlier sessions are stopped or finished by now
                self.engine.prune_sessions();
            }
            Err(e) => {
                log::error!("celebration failed: {}", e);
                self.show_message(&format!("Cannot celebrate: {}", e));
            }
        }
    }

    /// Feed a game state from the authority; celebrates on a fresh victory
    pub fn observe_status(&mut self, status: &GameStatus) -> bool {
        if !self.trigger.observe(status) {
            return false;
        }
        self.winner = status.winner_name().map(str::to_string);
        self.celebrate();
        true
    }

    /// State of the most recent celebration
    pub fn session_state(&self) -> Option<SessionState> {
        self.session
            .and_then(|s| self.engine.session(s))
            .map(|info| info.state)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('c') => self.celebrate(),
            KeyCode::Char('s') => {
                let stopped = self.session.is_some_and(|s| self.engine.stop(s));
                if stopped {
                    self.show_message("Stopped");
                }
            }
            KeyCode::Char('w') => {
                let winding = self.session.is_some_and(|s| self.engine.wind_down(s));
                if winding {
                    self.show_message("Winding down");
                }
            }
            _ => {}
        }
        AppAction::Continue
    }
}

/// Virtual pixel size of a terminal of `cols` x `rows`
pub fn surface_extent(cols: u16, rows: u16) -> (f64, f64) {
    (cols as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT)
}

/// Terminal cell for a surface point, if it is on screen
pub fn cell_for(point: Point, cols: u16, rows: u16) -> Option<(u16, u16)> {
    if !(point.x.is_finite() && point.y.is_finite()) || point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    let col = (point.x / CELL_WIDTH) as u64;
    let row = (point.y / CELL_HEIGHT) as u64;
    if col < cols as u64 && row < rows as u64 {
        Some((col as u16, row as u16))
    } else {
        None
    }
}
