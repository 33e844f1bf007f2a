//! Board widget collaborator.
//!
//! The widget renders the board and turns drag gestures into moves. It knows
//! nothing about chess rules: which pieces may move where is pushed in by the
//! controller through [`BoardConfig`]. Completed user moves are reported into
//! a [`MoveSink`] the controller registers, so the widget never holds a
//! reference back into controller state.

pub mod text;

use cozy_chess::Square;
use serde::Serialize;
use std::sync::mpsc::Sender;
use crate::adapter::{DestinationMap, Side};
use crate::rules::UserMove;

pub use text::TextBoard;

pub type MoveSink = Sender<UserMove>;

#[derive(Clone, Debug, Default)]
pub struct Movable {
    pub color: Option<Side>,
    /// Allow moves to any square regardless of `dests`.
    pub free: bool,
    pub dests: DestinationMap,
}

/// Partial update; `None` fields keep the widget's current value.
#[derive(Clone, Debug, Default)]
pub struct BoardConfig {
    pub fen: Option<String>,
    pub orientation: Option<Side>,
    pub turn_color: Option<Side>,
    pub highlight_check: Option<bool>,
    /// `Some(None)` clears the check marker.
    pub check: Option<Option<Side>>,
    pub movable: Option<Movable>,
    pub last_move: Option<(Square, Square)>,
}

/// Everything the widget currently shows, for inspection and debugging.
#[derive(Clone, Debug, Serialize)]
pub struct WidgetState {
    pub placement: String,
    pub orientation: Side,
    pub turn_color: Side,
    pub highlight_check: bool,
    pub check: Option<Side>,
    pub movable_color: Option<Side>,
    pub free: bool,
    pub dests: DestinationMap,
    pub last_move: Option<(String, String)>,
    pub premove: Option<UserMove>,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            placement: String::new(),
            orientation: Side::White,
            turn_color: Side::White,
            highlight_check: false,
            check: None,
            movable_color: None,
            free: true,
            dests: DestinationMap::default(),
            last_move: None,
            premove: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    Moved,
    Premoved,
    Rejected,
}

pub trait BoardWidget {
    /// Apply a partial configuration update.
    fn set(&mut self, config: BoardConfig);

    /// Animate a move that was applied elsewhere (remote event).
    fn move_piece(&mut self, from: Square, to: Square);

    fn toggle_orientation(&mut self);

    /// Play the queued premove if it is now legal. Returns true if a move
    /// was played (and reported to the sink).
    fn play_premove(&mut self) -> bool;

    fn register_move_sink(&mut self, sink: MoveSink);

    fn state(&self) -> &WidgetState;

    /// Draw the current frame. Widgets redraw themselves after state changes;
    /// this is only needed for the first frame.
    fn redraw(&mut self) {}
}
