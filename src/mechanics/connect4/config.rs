//! Minimax opponent configuration.

use serde::{Deserialize, Serialize};

use crate::slots::SlotParams;

/// Largest accepted `win_score` or `center_weight`.
pub const MAX_SCORE_PARAM: i64 = 1_000_000;

/// Minimax search parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimaxConfig {
    /// Plies searched below the root (default: 4, minimum 1).
    /// Sole control over search latency.
    pub depth: u32,

    /// Magnitude of a terminal win or loss before the depth adjustment.
    pub win_score: i64,

    /// Static evaluation bonus per own disc in the centre column
    /// (penalty per opponent disc).
    pub center_weight: i64,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            win_score: 1000,
            center_weight: 3,
        }
    }
}

impl MinimaxConfig {
    /// Defaults overridden by selection params `depth`, `winScore`, and
    /// `centerWeight`. `win_score` is clamped to `1..=MAX_SCORE_PARAM` and
    /// `center_weight` to `0..=MAX_SCORE_PARAM`.
    #[must_use]
    pub fn from_params(params: &SlotParams) -> Self {
        let defaults = Self::default();
        let depth = params.get_int("depth", i64::from(defaults.depth));

        Self {
            depth: u32::try_from(depth).unwrap_or(defaults.depth),
            win_score: params.get_int("winScore", defaults.win_score),
            center_weight: params.get_int("centerWeight", defaults.center_weight),
        }
        .normalized()
    }

    /// Set search depth.
    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self.normalized()
    }

    /// Set terminal score magnitude.
    #[must_use]
    pub fn with_win_score(mut self, win_score: i64) -> Self {
        self.win_score = win_score;
        self.normalized()
    }

    /// Set centre-column weight.
    #[must_use]
    pub fn with_center_weight(mut self, weight: i64) -> Self {
        self.center_weight = weight;
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.depth = self.depth.max(1);
        self.win_score = self.win_score.clamp(1, MAX_SCORE_PARAM);
        self.center_weight = self.center_weight.clamp(0, MAX_SCORE_PARAM);
        self
    }
}
