use cozy_chess::{Color, Square};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use crate::rules::Position;

/// Board widget color enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self { Side::White => Side::Black, Side::Black => Side::White }
    }

    pub fn as_str(self) -> &'static str {
        match self { Side::White => "white", Side::Black => "black" }
    }
}

impl From<Color> for Side {
    fn from(c: Color) -> Self {
        match c { Color::White => Side::White, Color::Black => Side::Black }
    }
}

/// Origin square -> ordered destination squares for the side to move.
/// Origins without a legal move are absent, never mapped to an empty list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DestinationMap {
    entries: Vec<(Square, Vec<Square>)>,
}

impl DestinationMap {
    pub fn get(&self, from: Square) -> Option<&[Square]> {
        self.entries.iter().find(|(sq, _)| *sq == from).map(|(_, d)| d.as_slice())
    }

    pub fn contains(&self, from: Square, to: Square) -> bool {
        self.get(from).map_or(false, |d| d.contains(&to))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, &[Square])> + '_ {
        self.entries.iter().map(|(sq, d)| (*sq, d.as_slice()))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn move_count(&self) -> usize { self.iter().map(|(_, d)| d.len()).sum() }
}

// Widget wire shape: { "e2": ["e3", "e4"], ... }
impl Serialize for DestinationMap {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        struct Dests<'a>(&'a [Square]);
        impl Serialize for Dests<'_> {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                let mut seq = s.serialize_seq(Some(self.0.len()))?;
                for sq in self.0 { seq.serialize_element(&sq.to_string())?; }
                seq.end()
            }
        }
        let mut map = s.serialize_map(Some(self.entries.len()))?;
        for (from, dests) in self.iter() {
            map.serialize_entry(&from.to_string(), &Dests(dests))?;
        }
        map.end()
    }
}

/// Query every square for legal moves and keep the non-empty results.
pub fn to_dests(pos: &Position) -> DestinationMap {
    let entries = Square::ALL
        .iter()
        .filter_map(|&sq| {
            let dests = pos.legal_destinations(sq);
            if dests.is_empty() { None } else { Some((sq, dests)) }
        })
        .collect();
    DestinationMap { entries }
}

pub fn to_color(pos: &Position) -> Side { pos.side_to_move().into() }
