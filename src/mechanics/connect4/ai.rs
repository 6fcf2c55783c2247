//! Computer opponents for the `aiOpponent` slot.
//!
//! Three strengths share one input shape:
//!
//! - `random_ai`: uniform over playable columns
//! - `smart_ai`: win now, else block, else centre, else random
//! - `minimax_ai`: win now, else block, else depth-limited alpha-beta
//!
//! Randomness comes from the slot context's generator, so a fixed seed
//! replays the same choices.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::config::MinimaxConfig;
use super::stats::SearchStats;
use super::{has_won, slot, valid_columns, with_disc, Board, CellPos, Player};
use crate::slots::{SlotContext, SlotImplementation};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiInput {
    pub board: Board,
    pub ai_player: Player,
    pub win_length: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiOutput {
    /// Chosen column; `None` when the board is full.
    pub column: Option<i32>,
}

/// First column in which `player` wins immediately.
fn winning_move(board: &Board, columns: &[i32], player: Player, win_length: usize) -> Option<i32> {
    columns.iter().copied().find(|&col| {
        with_disc(board, col, player).is_some_and(|next| has_won(&next, player, win_length))
    })
}

fn center_column(board: &Board) -> i32 {
    i32::try_from(board.col_count() / 2).unwrap_or(0)
}

fn run_random_ai(ctx: &mut SlotContext, input: &AiInput) -> AiOutput {
    let columns = valid_columns(&input.board);
    AiOutput {
        column: ctx.rng.choose(&columns).copied(),
    }
}

fn run_smart_ai(ctx: &mut SlotContext, input: &AiInput) -> AiOutput {
    let board = &input.board;
    let columns = valid_columns(board);
    if columns.is_empty() {
        return AiOutput::default();
    }

    let center = center_column(board);
    let column = winning_move(board, &columns, input.ai_player, input.win_length)
        .or_else(|| winning_move(board, &columns, input.ai_player.opponent(), input.win_length))
        .or_else(|| columns.contains(&center).then_some(center))
        .or_else(|| ctx.rng.choose(&columns).copied());

    AiOutput { column }
}

fn run_minimax_ai(ctx: &mut SlotContext, input: &AiInput) -> AiOutput {
    let mut search = MinimaxSearch::new(MinimaxConfig::from_params(&ctx.params));
    let column = search.choose_column(&input.board, input.ai_player, input.win_length);

    let stats = search.stats();
    trace!(
        column = ?column,
        nodes = stats.nodes_visited,
        cutoffs = stats.cutoffs,
        time_us = stats.time_us,
        "minimax decision"
    );

    AiOutput { column }
}

/// Uniformly random playable column.
#[must_use]
pub fn random_ai() -> SlotImplementation<AiInput, AiOutput> {
    slot("random_ai", "aiOpponent", run_random_ai)
}

/// One-ply tactics with a centre preference.
#[must_use]
pub fn smart_ai() -> SlotImplementation<AiInput, AiOutput> {
    slot("smart_ai", "aiOpponent", run_smart_ai)
}

/// Alpha-beta search; depth and weights from selection params.
#[must_use]
pub fn minimax_ai() -> SlotImplementation<AiInput, AiOutput> {
    slot("minimax_ai", "aiOpponent", run_minimax_ai)
}

/// Depth-limited minimax with alpha-beta pruning.
///
/// Terminal positions score `win_score + remaining_depth` for a win and
/// `-(win_score + remaining_depth)` for a loss, so quicker wins and slower
/// losses rank higher. Non-terminal leaves are scored by centre-column
/// control. Root ties go to the lowest column.
///
/// ```
/// use arcade_mechanics::mechanics::connect4::{empty_board, MinimaxConfig, MinimaxSearch, Player};
///
/// let mut search = MinimaxSearch::new(MinimaxConfig::default().with_depth(2));
/// let column = search.choose_column(&empty_board(6, 7), Player::One, 4);
/// assert_eq!(column, Some(3));
/// assert!(search.stats().nodes_visited > 0);
/// ```
#[derive(Clone, Debug)]
pub struct MinimaxSearch {
    config: MinimaxConfig,
    stats: SearchStats,
}

impl MinimaxSearch {
    /// Create a search with the given configuration.
    #[must_use]
    pub fn new(config: MinimaxConfig) -> Self {
        Self {
            config,
            stats: SearchStats::default(),
        }
    }

    /// Pick a column for `player`. `None` only if no column is playable.
    pub fn choose_column(&mut self, board: &Board, player: Player, win_length: usize) -> Option<i32> {
        let start = Instant::now();
        self.stats.reset();

        let choice = self.decide(board, player, win_length);

        self.stats.time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        choice
    }

    fn decide(&mut self, board: &Board, player: Player, win_length: usize) -> Option<i32> {
        let columns = valid_columns(board);
        let first = *columns.first()?;

        if let Some(col) = winning_move(board, &columns, player, win_length) {
            return Some(col);
        }
        if let Some(col) = winning_move(board, &columns, player.opponent(), win_length) {
            return Some(col);
        }

        let remaining = self.config.depth.max(1) - 1;
        let mut best_column = first;
        let mut best_score = i64::MIN;

        for &col in &columns {
            let Some(child) = with_disc(board, col, player) else {
                continue;
            };
            self.stats.root_moves_searched += 1;

            // Passing the best score so far as alpha keeps later equal
            // scores from displacing an earlier column.
            let score = self.minimax(&child, remaining, false, player, win_length, best_score, i64::MAX);
            if score > best_score {
                best_score = score;
                best_column = col;
            }
        }

        Some(best_column)
    }

    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        board: &Board,
        remaining: u32,
        maximizing: bool,
        player: Player,
        win_length: usize,
        mut alpha: i64,
        mut beta: i64,
    ) -> i64 {
        self.stats.nodes_visited += 1;
        let depth_bonus = i64::from(remaining);

        if has_won(board, player, win_length) {
            return self.config.win_score.saturating_add(depth_bonus);
        }
        if has_won(board, player.opponent(), win_length) {
            return self.config.win_score.saturating_add(depth_bonus).saturating_neg();
        }

        let columns = valid_columns(board);
        if columns.is_empty() || remaining == 0 {
            return self.evaluate(board, player);
        }

        let mover = if maximizing { player } else { player.opponent() };
        let mut best = if maximizing { i64::MIN } else { i64::MAX };

        for col in columns {
            let Some(child) = with_disc(board, col, mover) else {
                continue;
            };
            let score = self.minimax(&child, remaining - 1, !maximizing, player, win_length, alpha, beta);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }

        best
    }

    /// Centre-column control from `player`'s point of view.
    fn evaluate(&self, board: &Board, player: Player) -> i64 {
        let center = center_column(board);
        (0..board.row_count())
            .filter_map(|row| i32::try_from(row).ok())
            .filter_map(|row| board.get(CellPos::new(row, center)).copied().flatten())
            .map(|owner| {
                if owner == player {
                    self.config.center_weight
                } else {
                    self.config.center_weight.saturating_neg()
                }
            })
            .fold(0i64, i64::saturating_add)
    }

    /// Statistics from the last call to [`choose_column`](Self::choose_column).
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }
}
