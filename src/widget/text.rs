use cozy_chess::{File, Square};
use log::{debug, warn};
use std::io::Write;
use super::{BoardConfig, BoardWidget, DragOutcome, MoveSink, WidgetState};
use crate::adapter::Side;
use crate::rules::{promotion_char, UserMove};

/// Text-mode board widget. Keeps its own visual piece placement, which is
/// only ever replaced by `set { fen }` or changed by moves. Nothing is drawn
/// before the first `redraw`.
pub struct TextBoard {
    state: WidgetState,
    pieces: [Option<char>; 64],
    sink: Option<MoveSink>,
    out: Option<Box<dyn Write>>,
    mounted: bool,
}

impl TextBoard {
    /// A widget that draws nothing. Used by tests and the demo driver.
    pub fn headless() -> Self {
        Self { state: WidgetState::default(), pieces: [None; 64], sink: None, out: None, mounted: false }
    }

    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out: Some(out), ..Self::headless() }
    }

    pub fn piece_at(&self, sq: Square) -> Option<char> { self.pieces[sq as usize] }

    /// Drag-and-drop release on `to`.
    pub fn drag(&mut self, from: Square, to: Square) -> DragOutcome {
        self.drag_move(UserMove::new(from, to))
    }

    pub fn drag_move(&mut self, mv: UserMove) -> DragOutcome {
        let Some(owner) = self.piece_at(mv.from).map(piece_side) else {
            debug!("drag from empty square {}", mv.from);
            return DragOutcome::Rejected;
        };
        if self.state.movable_color != Some(owner) {
            return DragOutcome::Rejected;
        }
        if owner != self.state.turn_color {
            debug!("premove queued: {}", mv);
            self.state.premove = Some(mv);
            self.draw();
            return DragOutcome::Premoved;
        }
        if !self.state.free && !self.state.dests.contains(mv.from, mv.to) {
            return DragOutcome::Rejected;
        }
        self.user_move(mv);
        DragOutcome::Moved
    }

    fn user_move(&mut self, mv: UserMove) {
        self.shift(mv.from, mv.to);
        if let (Some(p), Some(c)) = (mv.promotion, self.piece_at(mv.to)) {
            let ch = promotion_char(p);
            self.pieces[mv.to as usize] = Some(if c.is_ascii_uppercase() { ch.to_ascii_uppercase() } else { ch });
        }
        self.state.last_move = Some((mv.from.to_string(), mv.to.to_string()));
        self.state.turn_color = self.state.turn_color.opposite();
        self.state.placement = self.placement();
        if let Some(sink) = &self.sink {
            if sink.send(mv).is_err() { warn!("move sink closed, dropping {}", mv); }
        }
        self.draw();
    }

    // Moves the piece; a king stepping two files also brings its rook along.
    fn shift(&mut self, from: Square, to: Square) {
        let piece = self.pieces[from as usize].take();
        self.pieces[to as usize] = piece;
        if matches!(piece, Some('K') | Some('k')) && from.rank() == to.rank() {
            let (ff, tf) = (from.file() as usize, to.file() as usize);
            if ff.abs_diff(tf) == 2 {
                let (rook_from, rook_to) = if tf > ff { (File::H, File::F) } else { (File::A, File::D) };
                let rf = Square::new(rook_from, from.rank());
                let rt = Square::new(rook_to, from.rank());
                let rook = self.pieces[rf as usize].take();
                self.pieces[rt as usize] = rook;
            }
        }
    }

    fn load_placement(&mut self, fen: &str) {
        self.pieces = [None; 64];
        let placement = fen.split_whitespace().next().unwrap_or("");
        for (ri, row) in placement.split('/').take(8).enumerate() {
            let rank = 7 - ri;
            let mut file = 0usize;
            for c in row.chars() {
                if let Some(d) = c.to_digit(10) { file += d as usize; continue; }
                if file < 8 { self.pieces[rank * 8 + file] = Some(c); }
                file += 1;
            }
        }
        self.state.placement = self.placement();
    }

    /// FEN piece-placement field of what is currently drawn.
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    Some(c) => {
                        if empty > 0 { out.push_str(&empty.to_string()); empty = 0; }
                        out.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 { out.push_str(&empty.to_string()); }
            if rank > 0 { out.push('/'); }
        }
        out
    }

    pub fn render_frame(&self) -> String {
        let mut s = String::new();
        let ranks: Vec<usize> = if self.state.orientation == Side::White { (0..8).rev().collect() } else { (0..8).collect() };
        let files: Vec<usize> = if self.state.orientation == Side::White { (0..8).collect() } else { (0..8).rev().collect() };
        let last: Vec<&str> = self.state.last_move.iter().flat_map(|(a, b)| [a.as_str(), b.as_str()]).collect();
        for &r in &ranks {
            s.push_str(&format!("{} ", r + 1));
            for &f in &files {
                let sq = Square::index(r * 8 + f);
                let glyph = self.pieces[r * 8 + f].unwrap_or('.');
                let marked = last.contains(&sq.to_string().as_str());
                s.push(if marked { '[' } else { ' ' });
                s.push(glyph);
                s.push(if marked { ']' } else { ' ' });
            }
            s.push('\n');
        }
        s.push_str("  ");
        for &f in &files { s.push_str(&format!(" {} ", (b'a' + f as u8) as char)); }
        s.push('\n');
        s.push_str(&format!("{} to move", self.state.turn_color.as_str()));
        if self.state.highlight_check {
            if let Some(side) = self.state.check { s.push_str(&format!(" ({} in check)", side.as_str())); }
        }
        if let Some(p) = self.state.premove { s.push_str(&format!(" | premove {}", p)); }
        s.push('\n');
        s
    }

    fn draw(&mut self) {
        if !self.mounted { return; }
        let frame = self.render_frame();
        if let Some(out) = self.out.as_mut() {
            let res = out.write_all(frame.as_bytes());
            if let Err(e) = res.and_then(|_| out.flush()) { warn!("board draw failed: {e}"); }
        }
    }
}

fn piece_side(c: char) -> Side {
    if c.is_ascii_uppercase() { Side::White } else { Side::Black }
}

impl BoardWidget for TextBoard {
    fn set(&mut self, config: BoardConfig) {
        if let Some(fen) = &config.fen { self.load_placement(fen); }
        if let Some(o) = config.orientation { self.state.orientation = o; }
        if let Some(t) = config.turn_color { self.state.turn_color = t; }
        if let Some(h) = config.highlight_check { self.state.highlight_check = h; }
        if let Some(c) = config.check { self.state.check = c; }
        if let Some(m) = config.movable {
            self.state.movable_color = m.color;
            self.state.free = m.free;
            self.state.dests = m.dests;
        }
        if let Some((from, to)) = config.last_move {
            self.state.last_move = Some((from.to_string(), to.to_string()));
        }
        self.draw();
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        self.shift(from, to);
        self.state.last_move = Some((from.to_string(), to.to_string()));
        self.state.placement = self.placement();
        self.draw();
    }

    fn toggle_orientation(&mut self) {
        self.state.orientation = self.state.orientation.opposite();
        self.draw();
    }

    fn play_premove(&mut self) -> bool {
        let Some(mv) = self.state.premove.take() else { return false };
        let playable = self.state.movable_color == Some(self.state.turn_color)
            && self.piece_at(mv.from).map(piece_side) == Some(self.state.turn_color)
            && (self.state.free || self.state.dests.contains(mv.from, mv.to));
        if !playable {
            debug!("premove {} cancelled", mv);
            return false;
        }
        self.user_move(mv);
        true
    }

    fn register_move_sink(&mut self, sink: MoveSink) { self.sink = Some(sink); }

    fn state(&self) -> &WidgetState { &self.state }

    fn redraw(&mut self) {
        self.mounted = true;
        self.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::to_dests;
    use crate::rules::{Position, START_FEN};
    use crate::widget::Movable;
    use std::sync::mpsc::channel;

    fn started() -> TextBoard {
        let pos = Position::startpos();
        let mut w = TextBoard::headless();
        w.set(BoardConfig {
            fen: Some(START_FEN.to_string()),
            turn_color: Some(Side::White),
            movable: Some(Movable { color: Some(Side::White), free: false, dests: to_dests(&pos) }),
            ..Default::default()
        });
        w
    }

    #[test]
    fn placement_round_trips_start_fen() {
        let w = started();
        assert_eq!(w.placement(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    }

    #[test]
    fn drag_reports_to_sink_and_flips_turn() {
        let mut w = started();
        let (tx, rx) = channel();
        w.register_move_sink(tx);
        assert_eq!(w.drag(Square::E2, Square::E4), DragOutcome::Moved);
        assert_eq!(rx.try_recv().unwrap(), UserMove::new(Square::E2, Square::E4));
        assert_eq!(w.state().turn_color, Side::Black);
        assert_eq!(w.piece_at(Square::E4), Some('P'));
    }

    #[test]
    fn drag_outside_dests_rejected() {
        let mut w = started();
        assert_eq!(w.drag(Square::E2, Square::E5), DragOutcome::Rejected);
        assert_eq!(w.drag(Square::E7, Square::E5), DragOutcome::Rejected);
        assert_eq!(w.drag(Square::E4, Square::E5), DragOutcome::Rejected);
    }

    #[test]
    fn out_of_turn_drag_queues_premove() {
        let mut w = started();
        w.drag(Square::E2, Square::E4);
        assert_eq!(w.drag(Square::D2, Square::D4), DragOutcome::Premoved);
        assert_eq!(w.state().premove, Some(UserMove::new(Square::D2, Square::D4)));
        // still black's turn in the widget, premove cannot fire
        assert!(!w.play_premove());
        assert!(w.state().premove.is_none());
    }

    #[test]
    fn castling_moves_rook_visually() {
        let mut w = TextBoard::headless();
        w.set(BoardConfig { fen: Some("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".into()), ..Default::default() });
        w.move_piece(Square::E1, Square::G1);
        assert_eq!(w.placement(), "r3k2r/8/8/8/8/8/8/R4RK1");
    }
}
