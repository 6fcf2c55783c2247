//! Minimax search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected during one AI decision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Positions visited by the recursive search.
    pub nodes_visited: u64,

    /// Branches abandoned by alpha-beta pruning.
    pub cutoffs: u64,

    /// Root moves scored by full search (0 when an immediate win or block
    /// decided the move).
    pub root_moves_searched: u32,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Nodes visited per second.
    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.nodes_visited as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Share of visited nodes that triggered a cutoff.
    #[must_use]
    pub fn cutoff_rate(&self) -> f64 {
        if self.nodes_visited == 0 {
            0.0
        } else {
            self.cutoffs as f64 / self.nodes_visited as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = SearchStats::new();
        assert_eq!(stats.nodes_visited, 0);
        assert_eq!(stats.cutoff_rate(), 0.0);
    }

    #[test]
    fn test_nodes_per_second() {
        let mut stats = SearchStats::new();
        stats.nodes_visited = 5000;
        stats.time_us = 500_000;

        assert_eq!(stats.nodes_per_second(), 10_000.0);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = SearchStats::new();
        stats.nodes_visited = 100;
        stats.cutoffs = 20;
        assert_eq!(stats.cutoff_rate(), 0.2);

        stats.reset();
        assert_eq!(stats, SearchStats::default());
    }
}
