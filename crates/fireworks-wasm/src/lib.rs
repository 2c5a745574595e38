//! WebAssembly victory fireworks
//!
//! Draws particle bursts into a DOM container when the game server reports
//! a winner. The page drives it from `requestAnimationFrame`:
//!
//! ```js
//! const fireworks = new Fireworks("fireworks");
//! function frame(t) { fireworks.tick(t); requestAnimationFrame(frame); }
//! requestAnimationFrame(frame);
//! // after each move:
//! fireworks.on_game_state(stateFromServer, performance.now());
//! ```

use fireworks_core::{
    CelebrationConfig, CelebrationEngine, CelebrationTrigger, GameStatus, Millis, SessionHandle,
    SessionState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

mod surface;

// WASM tests require wasm-pack test to run
#[cfg(all(test, target_arch = "wasm32"))]
mod tests;

pub use surface::{DomSurface, FIREWORKS_CSS};

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn to_millis(now_ms: f64) -> Millis {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms as Millis
    } else {
        0
    }
}

/// Current time from `performance.now()`, for callers without a frame timestamp
#[wasm_bindgen]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// The fireworks controller bound to one container element
#[wasm_bindgen]
pub struct Fireworks {
    engine: CelebrationEngine<DomSurface, StdRng>,
    trigger: CelebrationTrigger,
    session: Option<SessionHandle>,
}

#[wasm_bindgen]
impl Fireworks {
    /// Bind to the element with `container_id`. Fails if it does not exist.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str) -> Result<Fireworks, JsValue> {
        let surface = DomSurface::new(container_id)?;
        surface.install_styles()?;
        Ok(Fireworks {
            engine: CelebrationEngine::new(surface, StdRng::from_entropy()),
            trigger: CelebrationTrigger::new(),
            session: None,
        })
    }

    /// Same as the constructor, with reproducible bursts
    #[wasm_bindgen]
    pub fn with_seed(container_id: &str, seed: u64) -> Result<Fireworks, JsValue> {
        let surface = DomSurface::new(container_id)?;
        surface.install_styles()?;
        Ok(Fireworks {
            engine: CelebrationEngine::new(surface, StdRng::seed_from_u64(seed)),
            trigger: CelebrationTrigger::new(),
            session: None,
        })
    }

    /// Replace the tuning with a JSON config
    #[wasm_bindgen]
    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsValue> {
        let config =
            CelebrationConfig::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.engine
            .set_config(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current tuning as JSON
    #[wasm_bindgen]
    pub fn config_json(&self) -> String {
        serde_json::to_string(self.engine.config()).unwrap_or_default()
    }

    /// Start a celebration at `now_ms`
    #[wasm_bindgen]
    pub fn celebrate(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let handle = self
            .engine
            .celebrate(to_millis(now_ms))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.session = Some(handle);
        Ok(())
    }

    /// Feed the state object returned by the game server. Returns true when
    /// it started a celebration.
    #[wasm_bindgen]
    pub fn on_game_state(&mut self, state: JsValue, now_ms: f64) -> Result<bool, JsValue> {
        let status: GameStatus = serde_wasm_bindgen::from_value(state)?;
        self.observe(&status, now_ms)
    }

    /// Same as `on_game_state`, from a JSON string
    #[wasm_bindgen]
    pub fn on_game_state_json(&mut self, json: &str, now_ms: f64) -> Result<bool, JsValue> {
        let status = GameStatus::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.observe(&status, now_ms)
    }

    /// Advance to `now_ms` (call from requestAnimationFrame). Returns the
    /// number of bursts created.
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        let report = self.engine.tick(to_millis(now_ms));
        report.bursts_fired as u32
    }

    /// Remove everything now and stop creating bursts
    #[wasm_bindgen]
    pub fn stop(&mut self) -> bool {
        match self.session {
            Some(handle) => self.engine.stop(handle),
            None => false,
        }
    }

    /// Stop creating bursts but let live particles fade out
    #[wasm_bindgen]
    pub fn wind_down(&mut self) -> bool {
        match self.session {
            Some(handle) => self.engine.wind_down(handle),
            None => false,
        }
    }

    /// Clear everything, e.g. when a new game starts
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.engine.stop_all();
        self.engine.prune_sessions();
        self.trigger.reset();
        self.session = None;
    }

    /// "idle", "running", "draining", "finished" or "stopped"
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        let state = self
            .session
            .and_then(|s| self.engine.session(s))
            .map(|info| info.state);
        match state {
            None => "idle",
            Some(SessionState::Running) => "running",
            Some(SessionState::Draining) => "draining",
            Some(SessionState::Finished) => "finished",
            Some(SessionState::Stopped) => "stopped",
        }
        .to_string()
    }

    #[wasm_bindgen]
    pub fn live_particles(&self) -> usize {
        self.engine.live_particle_count()
    }

    /// True when nothing is scheduled or on screen; the page can stop its frame loop
    #[wasm_bindgen]
    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }
}

impl Fireworks {
    fn observe(&mut self, status: &GameStatus, now_ms: f64) -> Result<bool, JsValue> {
        if !status.game_over {
            // New game: nothing from the last one may linger
            if self.session.is_some() {
                self.reset();
            }
            self.trigger.observe(status);
            return Ok(false);
        }
        if !self.trigger.observe(status) {
            return Ok(false);
        }
        log::info!(
            "{} won, celebrating",
            status.winner_name().unwrap_or("a player")
        );
        self.celebrate(now_ms)?;
        Ok(true)
    }
}
