use chainboard::contract::wire::{BoardUpdate, GameState};
use chainboard::widget::{BoardWidget, DragOutcome, TextBoard};
use chainboard::{to_dests, BoardController, Side};
use cozy_chess::{Color, Piece, Square};
use pretty_assertions::assert_eq;

fn local() -> BoardController<TextBoard> {
    BoardController::new(TextBoard::headless(), None).expect("startpos")
}

fn placement(fen: &str) -> &str { fen.split_whitespace().next().unwrap() }

#[test]
fn initial_widget_config_matches_engine() {
    let ctrl = local();
    let st = ctrl.widget().state();
    assert_eq!(st.turn_color, Side::White);
    assert_eq!(st.movable_color, Some(Side::White));
    assert!(!st.free);
    assert!(st.highlight_check);
    assert_eq!(st.dests, to_dests(ctrl.position()));
    assert_eq!(st.placement, placement(&ctrl.position().fen()));
}

#[test]
fn local_move_hands_turn_to_black() {
    let mut ctrl = local();
    assert_eq!(ctrl.widget_mut().drag(Square::E2, Square::E4), DragOutcome::Moved);
    assert_eq!(ctrl.pump(), 1);
    assert_eq!(ctrl.position().side_to_move(), Color::Black);
    let st = ctrl.widget().state();
    assert_eq!(st.turn_color, Side::Black);
    assert_eq!(st.movable_color, Some(Side::Black));
    let e7 = st.dests.get(Square::E7).expect("e7 has moves");
    assert!(e7.contains(&Square::E5) && e7.contains(&Square::E6));
}

#[test]
fn dests_never_stale_after_moves() {
    let mut ctrl = local();
    for (from, to) in [(Square::E2, Square::E4), (Square::E7, Square::E5), (Square::G1, Square::F3), (Square::B8, Square::C6)] {
        assert_eq!(ctrl.widget_mut().drag(from, to), DragOutcome::Moved);
        ctrl.pump();
        assert_eq!(ctrl.widget().state().dests, to_dests(ctrl.position()));
        assert_eq!(ctrl.widget().state().placement, placement(&ctrl.position().fen()));
    }
}

#[test]
fn remote_update_applies_compact_move() {
    let mut ctrl = local();
    let update = BoardUpdate {
        prev_board: String::new(),
        next_board: String::new(),
        engine_move: "e2e4".into(),
        state: GameState::Ongoing,
    };
    ctrl.apply_remote_update(&update);
    assert_eq!(ctrl.position().board().piece_on(Square::E4), Some(Piece::Pawn));
    assert_eq!(ctrl.widget().piece_at(Square::E4), Some('P'));
    assert_eq!(ctrl.widget().piece_at(Square::E2), None);
    assert_eq!(ctrl.widget().state().last_move, Some(("e2".to_string(), "e4".to_string())));
    assert_eq!(ctrl.widget().state().turn_color, Side::Black);
}

#[test]
fn unapplicable_remote_move_leaves_state_in_sync() {
    let mut ctrl = local();
    let before = ctrl.position().fen();
    let update = BoardUpdate { prev_board: String::new(), next_board: String::new(), engine_move: "e2e5".into(), state: GameState::Ongoing };
    ctrl.apply_remote_update(&update);
    assert_eq!(ctrl.position().fen(), before);
    assert_eq!(ctrl.widget().state().placement, placement(&before));
}

#[test]
fn promotion_without_piece_defaults_to_queen() {
    let mut ctrl = BoardController::new(TextBoard::headless(), Some("8/4P3/8/8/8/8/k7/7K w - - 0 1")).unwrap();
    assert_eq!(ctrl.widget_mut().drag(Square::E7, Square::E8), DragOutcome::Moved);
    ctrl.pump();
    assert_eq!(ctrl.position().board().piece_on(Square::E8), Some(Piece::Queen));
    assert_eq!(ctrl.widget().piece_at(Square::E8), Some('Q'));
}

#[test]
fn toggle_orientation_keeps_game_state() {
    let mut ctrl = local();
    let fen = ctrl.position().fen();
    ctrl.toggle_orientation();
    assert_eq!(ctrl.widget().state().orientation, Side::Black);
    assert_eq!(ctrl.position().fen(), fen);
    ctrl.toggle_orientation();
    assert_eq!(ctrl.widget().state().orientation, Side::White);
}

#[test]
fn check_is_highlighted() {
    // 1. e4 f6 2. d4 g5, white to play Qh5+
    let fen = "rnbqkbnr/ppppp2p/5p2/6p1/3PP3/8/PPP2PPP/RNBQKBNR w KQkq - 0 3";
    let mut ctrl = BoardController::new(TextBoard::headless(), Some(fen)).unwrap();
    ctrl.widget_mut().drag(Square::D1, Square::H5);
    ctrl.pump();
    assert_eq!(ctrl.widget().state().check, Some(Side::Black));
    assert!(ctrl.widget().state().dests.is_empty(), "Qh5 is mate");
}

#[test]
fn debug_snapshot_is_json() {
    let ctrl = local();
    let v: serde_json::Value = serde_json::from_str(&ctrl.debug_snapshot().unwrap()).unwrap();
    assert_eq!(v["widget"]["turn_color"], "white");
    assert!(v["session"].is_null());
    assert!(v["fen"].as_str().unwrap().starts_with("rnbqkbnr/"));
}

#[test]
fn bad_fen_is_an_error() {
    assert!(BoardController::new(TextBoard::headless(), Some("not a fen")).is_err());
}

fn remote(engine_move: &str, next_board: &str) -> BoardUpdate {
    BoardUpdate { prev_board: String::new(), next_board: next_board.into(), engine_move: engine_move.into(), state: GameState::Ongoing }
}

#[test]
fn remote_castle_moves_rook_on_widget() {
    let mut ctrl = BoardController::new(TextBoard::headless(), Some("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1")).unwrap();
    ctrl.apply_remote_update(&remote("e8g8", "r4rk1/8/8/8/8/8/8/R3K2R w KQ - 1 2"));
    assert_eq!(placement(&ctrl.position().fen()), "r4rk1/8/8/8/8/8/8/R3K2R");
    assert_eq!(ctrl.widget().state().placement, placement(&ctrl.position().fen()));
    assert_eq!(ctrl.widget().piece_at(Square::G8), Some('k'));
    assert_eq!(ctrl.widget().piece_at(Square::F8), Some('r'));
    assert_eq!(ctrl.widget().piece_at(Square::H8), None);
    assert_eq!(ctrl.widget().state().turn_color, Side::White);
}

#[test]
fn remote_promotion_places_chosen_piece() {
    let mut ctrl = BoardController::new(TextBoard::headless(), Some("8/7K/8/8/8/8/p7/2k5 b - - 0 1")).unwrap();
    ctrl.apply_remote_update(&remote("a2a1q", ""));
    assert_eq!(ctrl.position().board().piece_on(Square::A1), Some(Piece::Queen));
    assert_eq!(ctrl.position().board().color_on(Square::A1), Some(Color::Black));
    assert_eq!(ctrl.widget().piece_at(Square::A1), Some('q'));
    assert_eq!(ctrl.widget().piece_at(Square::A2), None);
    assert_eq!(ctrl.widget().state().placement, placement(&ctrl.position().fen()));
}
