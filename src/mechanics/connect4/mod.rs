//! Connect-four slots: column drops, line-win detection, turn order, and
//! computer opponents.
//!
//! Boards are [`Board`] snapshots with row 0 at the top; discs fall toward
//! the highest row index.
//!
//! ## Key Types
//!
//! - [`Player`]: the two sides
//! - [`Board`]: grid of optional discs
//! - [`MinimaxSearch`]: alpha-beta opponent with [`MinimaxConfig`] and [`SearchStats`]

pub mod ai;
pub mod config;
pub mod stats;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::{find_line_runs, CellPos, Grid, LineDirection, LineRun};
use crate::slots::{
    global_write, SlotContext, SlotContract, SlotImplementation, SlotKind, SlotOwner,
    SlotRegistry, SlotRunFn,
};

pub use ai::{minimax_ai, random_ai, smart_ai, AiInput, AiOutput, MinimaxSearch};
pub use config::MinimaxConfig;
pub use stats::SearchStats;

pub const SYSTEM_ID: &str = "connect4";
pub const SYSTEM_VERSION: Version = Version::new(1, 0, 0);

const CONTRACTS: [SlotContract; 4] = [
    SlotContract::new("dropRule", SlotKind::Pure, "Gravity-based column drop logic"),
    SlotContract::new("winDetection", SlotKind::Pure, "Detect N in a row (horizontal, vertical, diagonal)"),
    SlotContract::new("turnManager", SlotKind::Policy, "Player alternation logic"),
    SlotContract::new("aiOpponent", SlotKind::Policy, "Computer opponent difficulty levels"),
];

/// Slot contracts declared by the connect-four system.
#[must_use]
pub fn contracts() -> &'static [SlotContract] {
    &CONTRACTS
}

/// One of the two sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The other side.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// `None` is an empty cell.
pub type Cell = Option<Player>;

/// Row-major board, row 0 on top.
pub type Board = Grid<Cell>;

/// Empty `rows` x `cols` board.
#[must_use]
pub fn empty_board(rows: usize, cols: usize) -> Board {
    Grid::filled(rows, cols, None)
}

/// Lowest empty row in `column`, or `None` if the column is full or off
/// the board.
#[must_use]
pub fn landing_row(board: &Board, column: i32) -> Option<i32> {
    if column < 0 || usize::try_from(column).ok()? >= board.col_count() {
        return None;
    }

    (0..board.row_count())
        .rev()
        .filter_map(|row| i32::try_from(row).ok())
        .find(|&row| matches!(board.get(CellPos::new(row, column)), Some(None)))
}

/// Columns whose top cell is still empty, ascending.
#[must_use]
pub fn valid_columns(board: &Board) -> Vec<i32> {
    (0..board.col_count())
        .filter_map(|col| i32::try_from(col).ok())
        .filter(|&col| matches!(board.get(CellPos::new(0, col)), Some(None)))
        .collect()
}

/// Copy of `board` with `player`'s disc dropped into `column`.
#[must_use]
pub fn with_disc(board: &Board, column: i32, player: Player) -> Option<Board> {
    let row = landing_row(board, column)?;
    let mut next = board.clone();
    next.set(CellPos::new(row, column), Some(player));
    Some(next)
}

/// Whether `player` owns at least `win_length` consecutive cells in any
/// standard direction.
#[must_use]
pub fn has_won(board: &Board, player: Player, win_length: usize) -> bool {
    let owned = |pos: CellPos| board.get(pos) == Some(&Some(player));
    let win_length = win_length.max(1);

    board.positions().filter(|&pos| owned(pos)).any(|pos| {
        LineDirection::STANDARD.iter().any(|dir| {
            let mut run = 1;
            let mut next = pos.offset(dir.d_row, dir.d_col);
            while run < win_length && owned(next) {
                run += 1;
                next = next.offset(dir.d_row, dir.d_col);
            }
            run >= win_length
        })
    })
}

/// First single-owner run of at least `win_length` discs, in row-major
/// scan order.
#[must_use]
pub fn find_winning_run(board: &Board, win_length: usize) -> Option<LineRun<Player>> {
    find_line_runs(board, win_length, |cell: &Cell| *cell, &LineDirection::STANDARD)
        .into_iter()
        .next()
}

/// Whether every top-row cell holds a disc.
#[must_use]
pub fn is_top_row_full(board: &Board) -> bool {
    board
        .rows()
        .first()
        .is_some_and(|top| !top.is_empty() && top.iter().all(Option::is_some))
}

// =============================================================================
// Drop Rule
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropInput {
    pub board: Board,
    pub column: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropOutput {
    /// Landing row; only meaningful when `is_valid`.
    pub row: Option<i32>,
    pub is_valid: bool,
}

fn run_drop(_ctx: &mut SlotContext, input: &DropInput) -> DropOutput {
    let row = landing_row(&input.board, input.column);
    DropOutput {
        row,
        is_valid: row.is_some(),
    }
}

/// Disc lands in the lowest empty row.
#[must_use]
pub fn standard_drop() -> SlotImplementation<DropInput, DropOutput> {
    slot("standard_drop", "dropRule", run_drop)
}

/// Same landing rule; the caller skips the fall animation.
#[must_use]
pub fn instant_drop() -> SlotImplementation<DropInput, DropOutput> {
    slot("instant_drop", "dropRule", run_drop)
}

// =============================================================================
// Win Detection
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinInput {
    pub board: Board,
    pub win_length: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinOutput {
    pub winner: Option<Player>,
    pub winning_cells: Option<Vec<CellPos>>,
    pub is_draw: bool,
}

fn detect_win(board: &Board, win_length: usize) -> WinOutput {
    match find_winning_run(board, win_length) {
        Some(run) => WinOutput {
            winner: Some(run.key),
            winning_cells: Some(run.cells),
            is_draw: false,
        },
        None => WinOutput {
            winner: None,
            winning_cells: None,
            is_draw: is_top_row_full(board),
        },
    }
}

fn run_four_in_row(_ctx: &mut SlotContext, input: &WinInput) -> WinOutput {
    detect_win(&input.board, input.win_length)
}

fn run_five_in_row(_ctx: &mut SlotContext, input: &WinInput) -> WinOutput {
    detect_win(&input.board, 5)
}

/// Line detection using the input's `win_length`.
#[must_use]
pub fn four_in_row_detection() -> SlotImplementation<WinInput, WinOutput> {
    slot("four_in_row_detection", "winDetection", run_four_in_row)
}

/// Line detection with a fixed length of five.
#[must_use]
pub fn five_in_row_detection() -> SlotImplementation<WinInput, WinOutput> {
    slot("five_in_row_detection", "winDetection", run_five_in_row)
}

// =============================================================================
// Turn Manager
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    pub current_player: Player,
    pub move_count: u32,
    /// Seconds left on the clock, for timed play.
    #[serde(default)]
    pub time_remaining: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutput {
    pub next_player: Player,
    pub is_valid_turn: bool,
}

fn run_alternating_turns(_ctx: &mut SlotContext, input: &TurnInput) -> TurnOutput {
    TurnOutput {
        next_player: input.current_player.opponent(),
        is_valid_turn: true,
    }
}

fn run_timed_turns(_ctx: &mut SlotContext, input: &TurnInput) -> TurnOutput {
    TurnOutput {
        next_player: input.current_player.opponent(),
        is_valid_turn: input.time_remaining.map_or(true, |t| t > 0.0),
    }
}

#[must_use]
pub fn alternating_turns() -> SlotImplementation<TurnInput, TurnOutput> {
    slot("alternating_turns", "turnManager", run_alternating_turns)
}

/// Alternates, flagging the turn invalid once the clock runs out.
#[must_use]
pub fn timed_turns() -> SlotImplementation<TurnInput, TurnOutput> {
    slot("timed_turns", "turnManager", run_timed_turns)
}

// =============================================================================
// Registration
// =============================================================================

pub(crate) fn slot<I, O>(id: &str, slot_name: &str, run: SlotRunFn<I, O>) -> SlotImplementation<I, O> {
    SlotImplementation::new(id, SYSTEM_VERSION, SlotOwner::new(SYSTEM_ID, slot_name), run)
}

/// Register every connect-four implementation not already present.
/// Returns the number newly registered.
pub fn register_connect4_slots(registry: &mut SlotRegistry) -> usize {
    [
        registry.register_if_absent(standard_drop()),
        registry.register_if_absent(instant_drop()),
        registry.register_if_absent(four_in_row_detection()),
        registry.register_if_absent(five_in_row_detection()),
        registry.register_if_absent(alternating_turns()),
        registry.register_if_absent(timed_turns()),
        registry.register_if_absent(random_ai()),
        registry.register_if_absent(smart_ai()),
        registry.register_if_absent(minimax_ai()),
    ]
    .into_iter()
    .filter(|inserted| *inserted)
    .count()
}

/// [`register_connect4_slots`] against the global registry.
pub fn register_connect4_slot_implementations() -> usize {
    register_connect4_slots(&mut global_write())
}

#[cfg(test)]
pub(crate) mod test_boards {
    use super::*;

    /// Parse rows of `.`, `X` (player one), `O` (player two).
    pub fn parse(rows: &[&str]) -> Board {
        Grid::from_rows(
            rows.iter()
                .map(|row| {
                    row.chars()
                        .map(|c| match c {
                            'X' => Some(Player::One),
                            'O' => Some(Player::Two),
                            _ => None,
                        })
                        .collect()
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_boards::parse;
    use super::*;

    #[test]
    fn test_landing_row() {
        let board = parse(&[
            "...",
            "X..",
            "OX.",
        ]);
        assert_eq!(landing_row(&board, 0), Some(0));
        assert_eq!(landing_row(&board, 1), Some(1));
        assert_eq!(landing_row(&board, 2), Some(2));
        assert_eq!(landing_row(&board, 3), None);
        assert_eq!(landing_row(&board, -1), None);
    }

    #[test]
    fn test_drop_full_column_is_invalid() {
        let input = DropInput {
            board: parse(&["X..", "O..", "X.."]),
            column: 0,
        };
        let out = run_drop(&mut SlotContext::default(), &input);
        assert_eq!(out, DropOutput { row: None, is_valid: false });

        let input = DropInput { column: 7, ..input };
        assert!(!run_drop(&mut SlotContext::default(), &input).is_valid);
    }

    #[test]
    fn test_valid_columns() {
        let board = parse(&["X.O.", "XOOX"]);
        assert_eq!(valid_columns(&board), vec![1, 3]);
        assert!(valid_columns(&empty_board(0, 0)).is_empty());
    }

    #[test]
    fn test_horizontal_win_cells() {
        let board = parse(&[
            ".......",
            ".......",
            "..XXXX.",
        ]);
        let out = detect_win(&board, 4);
        assert_eq!(out.winner, Some(Player::One));
        assert_eq!(
            out.winning_cells,
            Some(vec![
                CellPos::new(2, 2),
                CellPos::new(2, 3),
                CellPos::new(2, 4),
                CellPos::new(2, 5),
            ])
        );
        assert!(!out.is_draw);
    }

    #[test]
    fn test_mixed_owners_do_not_win() {
        let board = parse(&["XXOX"]);
        assert_eq!(detect_win(&board, 4).winner, None);
        assert!(detect_win(&board, 4).is_draw);
    }

    #[test]
    fn test_diagonal_win() {
        let board = parse(&[
            "...O",
            "..OX",
            ".OXX",
            "OXXX",
        ]);
        let out = detect_win(&board, 4);
        assert_eq!(out.winner, Some(Player::Two));
        assert!(has_won(&board, Player::Two, 4));
        assert!(!has_won(&board, Player::One, 4));
    }

    #[test]
    fn test_five_in_row_ignores_input_length() {
        let board = parse(&["XXXX...."]);
        let input = WinInput {
            board,
            win_length: 4,
        };
        assert_eq!(run_four_in_row(&mut SlotContext::default(), &input).winner, Some(Player::One));
        assert_eq!(run_five_in_row(&mut SlotContext::default(), &input).winner, None);
    }

    #[test]
    fn test_turns() {
        let mut input = TurnInput {
            current_player: Player::One,
            move_count: 3,
            time_remaining: None,
        };
        let out = run_alternating_turns(&mut SlotContext::default(), &input);
        assert_eq!(out.next_player, Player::Two);
        assert!(out.is_valid_turn);
        assert!(run_timed_turns(&mut SlotContext::default(), &input).is_valid_turn);

        input.time_remaining = Some(0.0);
        let out = run_timed_turns(&mut SlotContext::default(), &input);
        assert_eq!(out.next_player, Player::Two);
        assert!(!out.is_valid_turn);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = SlotRegistry::new();
        assert_eq!(register_connect4_slots(&mut registry), 9);
        assert_eq!(register_connect4_slots(&mut registry), 0);
        assert_eq!(registry.list_for_slot(SYSTEM_ID, "aiOpponent").len(), 3);
        assert_eq!(contracts().len(), 4);
    }
}
