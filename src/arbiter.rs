// Engine reply computed inside the contract: small fixed-depth material search.
use cozy_chess::{Board, Color, GameStatus, Move, Piece};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::contract::wire::{BoardUpdate, GameState};
use crate::error::Result;
use crate::rules::{Position, UserMove};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;

fn piece_value(p: Piece) -> i32 {
    match p {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 0,
    }
}

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    let bb = board.colors(color) & board.pieces(piece);
    bb.into_iter().count() as i32
}

// Positive means White has more material.
pub fn material_eval_cp_side_agnostic(board: &Board) -> i32 {
    Piece::ALL.iter().map(|&p| {
        (count_piece(board, Color::White, p) - count_piece(board, Color::Black, p)) * piece_value(p)
    }).sum()
}

// Material from side-to-move perspective (negamax-friendly)
pub fn material_eval_cp(board: &Board) -> i32 {
    let base = material_eval_cp_side_agnostic(board);
    if board.side_to_move() == Color::White { base } else { -base }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbiterParams {
    pub depth: u32,
}

impl Default for ArbiterParams {
    fn default() -> Self { Self { depth: 2 } }
}

#[derive(Default, Debug, Clone)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    pub score_cp: i32,
    pub nodes: u64,
}

#[derive(Default)]
pub struct Searcher {
    nodes: u64,
}

// Captures first, most valuable victim first; otherwise generation order.
fn ordered_moves(board: &Board) -> Vec<Move> {
    let mut moves: Vec<Move> = Vec::new();
    board.generate_moves(|ml| { for m in ml { moves.push(m); } false });
    let us = board.side_to_move();
    moves.sort_by_key(|m| match (board.piece_on(m.to), board.color_on(m.to)) {
        (Some(p), Some(c)) if c != us => -piece_value(p),
        _ => 0,
    });
    moves
}

impl Searcher {
    pub fn search_depth(&mut self, board: &Board, depth: u32) -> SearchResult {
        self.nodes = 0;
        let depth = depth.max(1);
        let mut alpha = -MATE_SCORE;
        let beta = MATE_SCORE;
        let mut bestmove: Option<Move> = None;
        let mut best_score = -MATE_SCORE;
        for m in ordered_moves(board) {
            let mut child = board.clone();
            child.play(m);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, 1);
            if bestmove.is_none() || score > best_score {
                best_score = score;
                bestmove = Some(m);
            }
            if score > alpha { alpha = score; }
        }
        SearchResult { bestmove, score_cp: best_score, nodes: self.nodes }
    }

    fn negamax(&mut self, board: &Board, depth: u32, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.nodes += 1;
        match board.status() {
            GameStatus::Won => return -MATE_SCORE + ply,
            GameStatus::Drawn => return DRAW_SCORE,
            GameStatus::Ongoing => {}
        }
        if depth == 0 { return material_eval_cp(board); }
        for m in ordered_moves(board) {
            let mut child = board.clone();
            child.play(m);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, ply + 1);
            if score >= beta { return beta; }
            if score > alpha { alpha = score; }
        }
        alpha
    }
}

fn finished(pos: &Position, on_won: GameState) -> Option<GameState> {
    match pos.status() {
        GameStatus::Won => Some(on_won),
        GameStatus::Drawn => Some(GameState::Draw),
        GameStatus::Ongoing => None,
    }
}

/// One arbitration round: play the player's move on `board_fen`, answer with
/// the engine's move, and report the resulting board. An illegal player move
/// is an error and produces no update.
pub fn arbitrate(board_fen: &str, player_move: &str, params: &ArbiterParams) -> Result<BoardUpdate> {
    let mut pos = Position::from_fen(board_fen)?;
    let mv: UserMove = player_move.parse()?;
    pos.apply_move(mv)?;

    if let Some(state) = finished(&pos, GameState::Win) {
        return Ok(BoardUpdate {
            prev_board: board_fen.to_string(),
            next_board: pos.fen(),
            engine_move: String::new(),
            state,
        });
    }

    let res = Searcher::default().search_depth(pos.board(), params.depth);
    // Ongoing status guarantees at least one legal reply
    let Some(reply) = res.bestmove else {
        return Ok(BoardUpdate { prev_board: board_fen.to_string(), next_board: pos.fen(), engine_move: String::new(), state: GameState::Draw });
    };
    let engine_move = pos.widget_move(reply);
    debug!("arbiter reply {} (score {} cp, {} nodes)", engine_move, res.score_cp, res.nodes);
    pos.apply_move(engine_move)?;
    let state = finished(&pos, GameState::Loss).unwrap_or(GameState::Ongoing);
    Ok(BoardUpdate {
        prev_board: board_fen.to_string(),
        next_board: pos.fen(),
        engine_move: engine_move.to_string(),
        state,
    })
}
