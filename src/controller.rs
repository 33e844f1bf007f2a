use cozy_chess::{Piece, Square};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::mpsc::{channel, Receiver};
use crate::adapter::{to_color, to_dests, DestinationMap, Side};
use crate::contract::wire::{BoardUpdate, GameState};
use crate::contract::ContractSession;
use crate::error::Result;
use crate::rules::{Position, UserMove};
use crate::widget::{BoardConfig, BoardWidget, Movable, WidgetState};

/// Keeps one rules engine and one board widget in agreement.
///
/// Without a contract session every user move is arbitrated locally. With a
/// session attached, user moves are applied optimistically and submitted;
/// turn color and dests only change again when the arbiter's event arrives.
pub struct BoardController<W: BoardWidget> {
    pos: Position,
    widget: W,
    moves: Receiver<UserMove>,
    session: Option<ContractSession>,
}

#[derive(Serialize)]
struct DebugSnapshot<'a> {
    fen: String,
    session: Option<String>,
    widget: &'a WidgetState,
}

impl<W: BoardWidget> BoardController<W> {
    pub fn new(mut widget: W, fen: Option<&str>) -> Result<Self> {
        let pos = match fen {
            Some(f) => Position::from_fen(f)?,
            None => Position::startpos(),
        };
        let (tx, rx) = channel();
        widget.register_move_sink(tx);
        widget.set(BoardConfig { highlight_check: Some(true), ..Default::default() });
        let mut ctrl = Self { pos, widget, moves: rx, session: None };
        ctrl.sync_widget(None);
        info!("board ready: {}", ctrl.pos.fen());
        Ok(ctrl)
    }

    pub fn with_session(mut self, session: ContractSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&ContractSession> { self.session.as_ref() }

    pub fn position(&self) -> &Position { &self.pos }

    /// The widget handle, for inspection.
    pub fn widget(&self) -> &W { &self.widget }

    pub fn widget_mut(&mut self) -> &mut W { &mut self.widget }

    pub fn turn_color(&self) -> Side { to_color(&self.pos) }

    pub fn dests(&self) -> DestinationMap { to_dests(&self.pos) }

    pub fn toggle_orientation(&mut self) { self.widget.toggle_orientation(); }

    /// JSON dump of engine position, session state and widget state.
    pub fn debug_snapshot(&self) -> Result<String> {
        let snap = DebugSnapshot {
            fen: self.pos.fen(),
            session: self.session.as_ref().map(|s| format!("{:?}", s.state())),
            widget: self.widget.state(),
        };
        Ok(serde_json::to_string_pretty(&snap)?)
    }

    fn check_side(&self) -> Option<Side> {
        if self.pos.in_check() { Some(self.turn_color()) } else { None }
    }

    // Push position, turn color and freshly computed dests in one update.
    fn sync_widget(&mut self, last_move: Option<(Square, Square)>) {
        let side = self.turn_color();
        let config = BoardConfig {
            fen: Some(self.pos.fen()),
            turn_color: Some(side),
            check: Some(self.check_side()),
            movable: Some(Movable { color: Some(side), free: false, dests: to_dests(&self.pos) }),
            last_move,
            ..Default::default()
        };
        self.widget.set(config);
    }

    // Position only; movable side and dests stay as they are.
    fn sync_position(&mut self) {
        let config = BoardConfig { fen: Some(self.pos.fen()), check: Some(self.check_side()), ..Default::default() };
        self.widget.set(config);
    }

    /// Handle a move the widget reported as completed by the user.
    pub fn on_user_move(&mut self, mut mv: UserMove) {
        if mv.promotion.is_none() && self.pos.needs_promotion(mv.from, mv.to) {
            mv.promotion = Some(Piece::Queen);
        }
        let prev_fen = self.pos.fen();
        if let Err(e) = self.pos.apply_move(mv) {
            warn!("user move rejected by rules engine: {e}");
            self.sync_widget(None);
            return;
        }
        debug!("user move {} -> {}", mv, self.pos.fen());
        match self.session.as_mut() {
            Some(session) => {
                // No rollback if the submission fails.
                session.submit_move(&prev_fen, &mv);
                self.sync_position();
            }
            None => {
                self.sync_widget(Some((mv.from, mv.to)));
                self.widget.play_premove();
            }
        }
    }

    /// Apply an arbiter `BoardUpdated` event to the engine and the widget.
    pub fn apply_remote_update(&mut self, update: &BoardUpdate) {
        match update.engine_move() {
            Ok(Some(mv)) => match self.pos.apply_move(mv) {
                Ok(_) => {
                    debug!("remote move {}", mv);
                    self.widget.move_piece(mv.from, mv.to);
                    self.sync_widget(Some((mv.from, mv.to)));
                    self.widget.play_premove();
                }
                Err(e) => {
                    warn!("remote move does not apply locally: {e}");
                    self.sync_widget(None);
                }
            },
            Ok(None) => self.sync_widget(None),
            Err(e) => warn!("undecodable remote move {:?}: {e}", update.engine_move),
        }
        if self.pos.fen() != update.next_board {
            warn!("local position {} differs from arbiter {}", self.pos.fen(), update.next_board);
        }
        match update.state {
            GameState::Ongoing => {}
            state => info!("game over: {:?}", state),
        }
    }

    /// Drain queued user moves and delivered contract events until both are
    /// empty. Returns the number of handled items.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let mut progressed = false;
            while let Ok(mv) = self.moves.try_recv() {
                self.on_user_move(mv);
                handled += 1;
                progressed = true;
            }
            let updates = self.session.as_mut().map(|s| s.poll()).unwrap_or_default();
            for update in &updates {
                self.apply_remote_update(update);
                handled += 1;
                progressed = true;
            }
            if !progressed { break; }
        }
        handled
    }
}
