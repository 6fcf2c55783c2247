//! Connect-four tests.
//!
//! These tests verify line detection and the AI opponents through
//! resolved slots:
//! - Win length boundaries in all four directions
//! - Draw detection
//! - Minimax always takes an immediate win
//! - Extreme minimax weights never panic

use arcade_mechanics::mechanics::connect4::{
    self, empty_board, AiInput, AiOutput, Board, Player, TurnInput, TurnOutput, WinInput,
    WinOutput,
};
use arcade_mechanics::mechanics::register_all_slots;
use arcade_mechanics::{
    resolve_slots, CellPos, Grid, LineDirection, ResolvedSlot, SlotParams, SlotRegistry,
    SlotSelection, SlotSelections,
};
use proptest::prelude::*;

fn resolve_one(slot_name: &str, impl_id: &str, params: Option<SlotParams>) -> ResolvedSlot {
    let mut registry = SlotRegistry::new();
    register_all_slots(&mut registry);

    let mut selection = SlotSelection::new(connect4::SYSTEM_ID, slot_name, impl_id);
    selection.params = params;
    let mut selections = SlotSelections::new();
    selections.insert("slot".into(), selection);

    let mut resolved = resolve_slots(&selections, &registry);
    assert!(resolved.is_ok(), "{:?}", resolved.errors);
    resolved.slots.remove("slot").unwrap()
}

fn place(board: &mut Board, row: i32, col: i32, player: Player) {
    assert!(board.set(CellPos::new(row, col), Some(player)));
}

/// One disc short of the win length is not a win; one more is.
#[test]
fn test_win_length_boundary() {
    let slot = resolve_one("winDetection", "four_in_row_detection", None);

    for direction in LineDirection::STANDARD {
        let mut board = empty_board(6, 7);
        let start = CellPos::new(2, 3);
        let cell = |i: i32| start.offset(direction.d_row * i, direction.d_col * i);

        for i in 0..3 {
            place(&mut board, cell(i).row, cell(i).col, Player::Two);
        }
        let input = WinInput { board: board.clone(), win_length: 4 };
        let out = slot.run::<WinInput, WinOutput>(&mut slot.context(0), &input).unwrap();
        assert_eq!(out.winner, None, "{direction:?}");
        assert!(!out.is_draw);

        place(&mut board, cell(3).row, cell(3).col, Player::Two);
        let input = WinInput { board, win_length: 4 };
        let out = slot.run::<WinInput, WinOutput>(&mut slot.context(0), &input).unwrap();
        assert_eq!(out.winner, Some(Player::Two), "{direction:?}");
        assert!(out.winning_cells.unwrap().len() >= 4);
    }
}

/// A full top row with no run is a draw.
#[test]
fn test_draw() {
    let slot = resolve_one("winDetection", "four_in_row_detection", None);
    let board: Board = Grid::from_rows(vec![
        vec![Some(Player::One), Some(Player::Two), Some(Player::One)],
        vec![Some(Player::Two), Some(Player::One), Some(Player::Two)],
    ]);

    let out = slot
        .run::<WinInput, WinOutput>(&mut slot.context(0), &WinInput { board, win_length: 4 })
        .unwrap();
    assert_eq!(out.winner, None);
    assert_eq!(out.winning_cells, None);
    assert!(out.is_draw);
}

/// Five-in-row ignores the requested length.
#[test]
fn test_five_in_row_needs_five() {
    let slot = resolve_one("winDetection", "five_in_row_detection", None);
    let mut board = empty_board(6, 7);
    for col in 0..4 {
        place(&mut board, 5, col, Player::One);
    }

    let input = WinInput { board: board.clone(), win_length: 4 };
    let out = slot.run::<WinInput, WinOutput>(&mut slot.context(0), &input).unwrap();
    assert_eq!(out.winner, None);

    place(&mut board, 5, 4, Player::One);
    let out = slot
        .run::<WinInput, WinOutput>(&mut slot.context(0), &WinInput { board, win_length: 4 })
        .unwrap();
    assert_eq!(out.winner, Some(Player::One));
}

/// The minimax opponent takes an immediate win at every depth.
#[test]
fn test_minimax_takes_the_win() {
    let mut board = empty_board(6, 7);
    for col in 0..3 {
        place(&mut board, 5, col, Player::One);
    }
    place(&mut board, 5, 5, Player::Two);
    place(&mut board, 5, 6, Player::Two);
    place(&mut board, 4, 5, Player::Two);

    for depth in 1..=6 {
        let slot = resolve_one("aiOpponent", "minimax_ai", Some(SlotParams::new().with("depth", depth)));
        let input = AiInput {
            board: board.clone(),
            ai_player: Player::One,
            win_length: 4,
        };
        let out = slot.run::<AiInput, AiOutput>(&mut slot.context(11), &input).unwrap();
        assert_eq!(out.column, Some(3), "depth {depth}");
    }
}

/// Saturating weights still produce a move deep in the search.
#[test]
fn test_minimax_extreme_weights() {
    let mut board = empty_board(6, 7);
    place(&mut board, 5, 2, Player::One);
    place(&mut board, 5, 3, Player::One);
    place(&mut board, 4, 2, Player::Two);
    place(&mut board, 4, 3, Player::Two);

    let params = SlotParams::new()
        .with("depth", 5)
        .with("winScore", i64::MAX)
        .with("centerWeight", i64::MAX);
    let slot = resolve_one("aiOpponent", "minimax_ai", Some(params));
    let input = AiInput {
        board,
        ai_player: Player::One,
        win_length: 4,
    };
    let out = slot.run::<AiInput, AiOutput>(&mut slot.context(0), &input).unwrap();
    assert!(matches!(out.column, Some(col) if (0..7).contains(&col)));
}

/// All three opponents return nothing on a full board.
#[test]
fn test_full_board_has_no_move() {
    let board: Board = Grid::filled(2, 2, Some(Player::One));
    for impl_id in ["random_ai", "smart_ai", "minimax_ai"] {
        let slot = resolve_one("aiOpponent", impl_id, None);
        let input = AiInput {
            board: board.clone(),
            ai_player: Player::Two,
            win_length: 4,
        };
        let out = slot.run::<AiInput, AiOutput>(&mut slot.context(0), &input).unwrap();
        assert_eq!(out.column, None, "{impl_id}");
    }
}

/// Random choices replay for the same seed.
#[test]
fn test_random_ai_is_seeded() {
    let slot = resolve_one("aiOpponent", "random_ai", None);
    let input = AiInput {
        board: empty_board(6, 7),
        ai_player: Player::One,
        win_length: 4,
    };

    let picks = |seed| -> Vec<Option<i32>> {
        let mut ctx = slot.context(seed);
        (0..10)
            .map(|_| slot.run::<AiInput, AiOutput>(&mut ctx, &input).unwrap().column)
            .collect()
    };
    assert_eq!(picks(99), picks(99));
    assert!(picks(99).iter().all(|c| matches!(c, Some(0..=6))));
}

/// Timed turns expire when the clock reaches zero.
#[test]
fn test_timed_turns() {
    let slot = resolve_one("turnManager", "timed_turns", None);
    let run = |time_remaining| {
        let input = TurnInput {
            current_player: Player::One,
            move_count: 3,
            time_remaining,
        };
        slot.run::<TurnInput, TurnOutput>(&mut slot.context(0), &input).unwrap()
    };

    assert_eq!(run(Some(4.5)), TurnOutput { next_player: Player::Two, is_valid_turn: true });
    assert!(!run(Some(0.0)).is_valid_turn);
    assert!(run(None).is_valid_turn);
}

proptest! {
    /// Any integer weights yield a playable column.
    #[test]
    fn prop_minimax_weights_never_panic(win_score in any::<i64>(), center_weight in any::<i64>()) {
        let mut board = empty_board(4, 5);
        place(&mut board, 3, 2, Player::One);
        place(&mut board, 3, 1, Player::Two);

        let params = SlotParams::new()
            .with("depth", 3)
            .with("winScore", win_score)
            .with("centerWeight", center_weight);
        let slot = resolve_one("aiOpponent", "minimax_ai", Some(params));
        let input = AiInput {
            board,
            ai_player: Player::One,
            win_length: 3,
        };
        let out = slot.run::<AiInput, AiOutput>(&mut slot.context(0), &input).unwrap();
        prop_assert!(matches!(out.column, Some(col) if (0..5).contains(&col)));
    }
}
