//! Game state as reported by the remote game authority, and the trigger
//! that decides when a state change deserves fireworks.

use serde::{Deserialize, Deserializer, Serialize};

/// Who won, if anyone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player1,
    Player2,
    Draw,
    #[default]
    #[serde(rename = "")]
    None,
}

impl Winner {
    pub fn is_player(self) -> bool {
        matches!(self, Winner::Player1 | Winner::Player2)
    }
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The authority sends "" (or omits the field) while the game is open
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            Some("player1") => Ok(Winner::Player1),
            Some("player2") => Ok(Winner::Player2),
            Some("draw") => Ok(Winner::Draw),
            Some("") | None => Ok(Winner::None),
            Some(other) => Err(serde::de::Error::unknown_variant(
                other,
                &["player1", "player2", "draw", ""],
            )),
        }
    }
}

/// Position of the last dropped token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

/// Snapshot of a game returned by the authority after every move
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStatus {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cells: "" for empty, "player1" or "player2"
    pub board: Vec<Vec<String>>,
    pub current_player: String,
    pub player1: String,
    pub player2: String,
    pub game_over: bool,
    pub winner: Winner,
    pub last_move: Option<Move>,
    pub turn_count: u32,
    pub inverse_gravity: bool,
}

impl GameStatus {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Game over with a winner; draws don't count
    pub fn is_victory(&self) -> bool {
        self.game_over && self.winner.is_player()
    }

    /// Display name of the winner
    pub fn winner_name(&self) -> Option<&str> {
        match self.winner {
            Winner::Player1 if self.game_over => Some(&self.player1),
            Winner::Player2 if self.game_over => Some(&self.player2),
            _ => None,
        }
    }
}

/// Fires once per victory.
///
/// Repeated polls of the same finished game do not re-trigger; a state
/// that is not game-over re-arms the trigger for the next game.
#[derive(Debug, Default)]
pub struct CelebrationTrigger {
    fired: bool,
}

impl CelebrationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest state. Returns true exactly when a celebration should start.
    pub fn observe(&mut self, status: &GameStatus) -> bool {
        if !status.game_over {
            self.fired = false;
            return false;
        }
        if self.fired || !status.is_victory() {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}
