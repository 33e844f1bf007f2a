use cozy_chess::{Board, Color, File, GameStatus, Move, Piece, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::{Error, Result};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A move as the board widget sees it: origin, destination and an optional
/// promotion piece. Castling uses the king's two-square destination (e1g1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserMove {
    #[serde(with = "square_str")]
    pub from: Square,
    #[serde(with = "square_str")]
    pub to: Square,
    #[serde(default, with = "promotion_str")]
    pub promotion: Option<Piece>,
}

impl UserMove {
    pub fn new(from: Square, to: Square) -> Self { Self { from, to, promotion: None } }
}

impl fmt::Display for UserMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion { write!(f, "{}", promotion_char(p))?; }
        Ok(())
    }
}

impl FromStr for UserMove {
    type Err = Error;

    // <from><to>[promotion]; anything after the fifth char is rejected
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::BadMove(s.to_string());
        if !s.is_ascii() || !(4..=5).contains(&s.len()) { return Err(bad()); }
        let from = s[0..2].parse::<Square>().map_err(|_| bad())?;
        let to = s[2..4].parse::<Square>().map_err(|_| bad())?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(promotion_piece(c).ok_or_else(bad)?),
            None => None,
        };
        Ok(Self { from, to, promotion })
    }
}

pub fn promotion_piece(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'q' => Some(Piece::Queen),
        'r' => Some(Piece::Rook),
        'b' => Some(Piece::Bishop),
        'n' => Some(Piece::Knight),
        _ => None,
    }
}

pub fn promotion_char(p: Piece) -> char {
    match p {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        Piece::Pawn => 'p',
        Piece::King => 'k',
    }
}

/// Rules engine handle. Every legality and turn-order question goes through
/// cozy-chess; nothing here re-implements chess rules.
#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: Board::default() }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        Board::from_fen(fen, false).map(|b| Self { board: b }).map_err(|e| Error::Fen(format!("{e:?}")))
    }

    pub fn board(&self) -> &Board { &self.board }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn status(&self) -> GameStatus { self.board.status() }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    /// Destinations reachable from `from` for the side to move, in generation
    /// order. Promotions to different pieces collapse into one destination.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut dests: Vec<Square> = Vec::new();
        self.board.generate_moves_for(from.bitboard(), |moves| {
            for m in moves {
                let to = self.widget_move(m).to;
                if !dests.contains(&to) { dests.push(to); }
            }
            false
        });
        dests
    }

    pub fn legal_moves(&self) -> Vec<UserMove> {
        let mut out = Vec::new();
        self.board.generate_moves(|moves| {
            for m in moves { out.push(self.widget_move(m)); }
            false
        });
        out
    }

    /// True when (from, to) is a pawn reaching the last rank, i.e. the move
    /// cannot be played without a promotion piece.
    pub fn needs_promotion(&self, from: Square, to: Square) -> bool {
        let mut found = false;
        self.board.generate_moves_for(from.bitboard(), |moves| {
            found = moves.into_iter().any(|m| m.promotion.is_some() && self.widget_move(m).to == to);
            found
        });
        found
    }

    /// Translate a cozy-chess move into widget form. cozy-chess encodes
    /// castling as king-takes-own-rook; the widget wants the king's landing square.
    pub fn widget_move(&self, m: Move) -> UserMove {
        let side = self.board.side_to_move();
        let castles = m.from == self.board.king(side) && self.board.color_on(m.to) == Some(side);
        let to = if castles {
            let file = if (m.to.file() as usize) > (m.from.file() as usize) { File::G } else { File::C };
            Square::new(file, m.from.rank())
        } else {
            m.to
        };
        UserMove { from: m.from, to, promotion: m.promotion }
    }

    pub fn find_move(&self, mv: UserMove) -> Option<Move> {
        let mut found = None;
        self.board.generate_moves_for(mv.from.bitboard(), |moves| {
            for m in moves {
                if self.widget_move(m) == mv { found = Some(m); break; }
            }
            found.is_some()
        });
        found
    }

    pub fn apply_move(&mut self, mv: UserMove) -> Result<Move> {
        match self.find_move(mv) {
            Some(m) => { self.board.play(m); Ok(m) }
            None => Err(Error::IllegalMove(mv.to_string())),
        }
    }

    pub fn make_move_uci(&mut self, mv_uci: &str) -> Result<Move> {
        let mv: UserMove = mv_uci.parse()?;
        self.apply_move(mv)
    }
}

mod square_str {
    use cozy_chess::Square;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sq: &Square, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(sq)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Square, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(|_| D::Error::custom(format!("bad square {raw:?}")))
    }
}

mod promotion_str {
    use cozy_chess::Piece;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(p: &Option<Piece>, s: S) -> Result<S::Ok, S::Error> {
        match p {
            Some(p) => s.serialize_some(&super::promotion_char(*p)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Piece>, D::Error> {
        match Option::<char>::deserialize(d)? {
            Some(c) => super::promotion_piece(c).map(Some).ok_or_else(|| D::Error::custom(format!("bad promotion {c:?}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castling_reported_as_king_two_squares() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let dests = pos.legal_destinations(Square::E1);
        assert!(dests.contains(&Square::G1));
        assert!(dests.contains(&Square::C1));
        assert!(!dests.contains(&Square::H1));
    }

    #[test]
    fn castling_applies_from_widget_form() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        pos.make_move_uci("e1g1").unwrap();
        assert_eq!(pos.board().piece_on(Square::G1), Some(Piece::King));
        assert_eq!(pos.board().piece_on(Square::F1), Some(Piece::Rook));
    }

    #[test]
    fn promotion_requires_piece() {
        let mut pos = Position::from_fen("8/4P3/8/8/8/8/k7/7K w - - 0 1").unwrap();
        assert!(pos.needs_promotion(Square::E7, Square::E8));
        assert_eq!(pos.legal_destinations(Square::E7), vec![Square::E8]);
        assert!(pos.make_move_uci("e7e8").is_err());
        pos.make_move_uci("e7e8q").unwrap();
        assert_eq!(pos.board().piece_on(Square::E8), Some(Piece::Queen));
    }

    #[test]
    fn user_move_parse_rejects_garbage() {
        assert!("e2".parse::<UserMove>().is_err());
        assert!("O-O".parse::<UserMove>().is_err());
        assert!("e7e8 q".parse::<UserMove>().is_err());
        assert!("e7e8x".parse::<UserMove>().is_err());
        assert_eq!("e7e8q".parse::<UserMove>().unwrap().promotion, Some(Piece::Queen));
    }
}
