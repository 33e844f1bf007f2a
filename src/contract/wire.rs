use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::rules::UserMove;

pub const MAKE_MOVE: &str = "makeMove";
pub const BOARD_UPDATED: &str = "BoardUpdated";

/// Outcome after an arbitration round, from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum GameState {
    Ongoing = 0,
    Win = 1,
    Loss = 2,
    Draw = 3,
}

impl From<GameState> for u8 {
    fn from(s: GameState) -> u8 { s as u8 }
}

impl TryFrom<u8> for GameState {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, String> {
        match v {
            0 => Ok(GameState::Ongoing),
            1 => Ok(GameState::Win),
            2 => Ok(GameState::Loss),
            3 => Ok(GameState::Draw),
            _ => Err(format!("unknown game state {v}")),
        }
    }
}

/// `makeMove(board_state, player_move)` arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeMove {
    pub board_state: String,
    pub player_move: String,
}

/// `BoardUpdated` event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardUpdate {
    pub prev_board: String,
    pub next_board: String,
    pub engine_move: String,
    pub state: GameState,
}

impl BoardUpdate {
    /// The engine's move, or `None` when the game ended on the player's move.
    pub fn engine_move(&self) -> Result<Option<UserMove>> {
        if self.engine_move.is_empty() { return Ok(None); }
        decode_move(&self.engine_move).map(Some)
    }
}

/// Compact form: two chars origin, two chars destination, optional
/// promotion letter. Castling travels as the king's two-square step.
pub fn decode_move(compact: &str) -> Result<UserMove> { compact.parse() }

pub fn encode_move(mv: &UserMove) -> String { mv.to_string() }

pub fn encode<T: Serialize>(payload: &T) -> Result<String> { Ok(serde_json::to_string(payload)?) }

pub fn decode<'a, T: Deserialize<'a>>(raw: &'a str) -> Result<T> {
    serde_json::from_str(raw).map_err(Error::from)
}
