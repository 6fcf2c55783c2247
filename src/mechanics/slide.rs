//! Sliding-tile (2048 / Threes) slots: slide rules, merge logic, tile
//! spawning, and merge scoring.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::{CellPos, Grid};
use crate::slots::{
    global_write, SlotContext, SlotContract, SlotImplementation, SlotKind, SlotOwner,
    SlotRegistry, SlotRunFn,
};

pub const SYSTEM_ID: &str = "slide";
pub const SYSTEM_VERSION: Version = Version::new(1, 0, 0);

/// Largest board side a slide plan is built for.
pub const MAX_GRID_SIZE: usize = 64;

const CONTRACTS: [SlotContract; 4] = [
    SlotContract::new("slideRule", SlotKind::Policy, "How tiles move on input (4-direction, 8-direction)"),
    SlotContract::new("mergeLogic", SlotKind::Pure, "What happens when two tiles collide"),
    SlotContract::new("tileSpawner", SlotKind::Pure, "Where and what value new tiles spawn"),
    SlotContract::new("scoring", SlotKind::Pure, "Points per merge"),
];

/// Slot contracts declared by the slide system.
#[must_use]
pub fn contracts() -> &'static [SlotContract] {
    &CONTRACTS
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideDirection {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl SlideDirection {
    pub const CARDINAL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// `(d_row, d_col)` a tile moves per step.
    #[must_use]
    pub fn move_vector(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::UpLeft => (-1, -1),
            Self::UpRight => (-1, 1),
            Self::DownLeft => (1, -1),
            Self::DownRight => (1, 1),
        }
    }

    #[must_use]
    pub fn is_cardinal(self) -> bool {
        Self::CARDINAL.contains(&self)
    }
}

// =============================================================================
// Slide Rule
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideInput {
    pub direction: SlideDirection,
    pub grid_size: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutput {
    pub is_valid_direction: bool,
    pub traversal_order: Vec<CellPos>,
    /// `(d_row, d_col)`; `(0, 0)` when the direction is rejected.
    pub move_vector: (i32, i32),
}

/// Every cell of a `size` x `size` board, ordered so that cells closest to
/// the wall `direction` points at come first.
///
/// Cardinal moves walk lane by lane (columns for vertical moves, rows for
/// horizontal ones). Diagonal moves walk anti-diagonals outward from the
/// destination corner. Empty when `size` exceeds [`MAX_GRID_SIZE`].
#[must_use]
pub fn traversal_order(direction: SlideDirection, size: usize) -> Vec<CellPos> {
    if size > MAX_GRID_SIZE {
        return Vec::new();
    }
    let Ok(n) = i32::try_from(size) else {
        return Vec::new();
    };
    let (d_row, d_col) = direction.move_vector();

    let wall_distance = |coord: i32, delta: i32| match delta {
        -1 => coord,
        1 => n - 1 - coord,
        _ => 0,
    };

    let mut cells: Vec<CellPos> = (0..n)
        .flat_map(|row| (0..n).map(move |col| CellPos::new(row, col)))
        .collect();

    cells.sort_by_key(|pos| {
        let row_dist = wall_distance(pos.row, d_row);
        let col_dist = wall_distance(pos.col, d_col);
        match (d_row, d_col) {
            (0, _) => (pos.row, col_dist),
            (_, 0) => (pos.col, row_dist),
            _ => (row_dist + col_dist, row_dist),
        }
    });

    cells
}

fn slide(input: &SlideInput, allowed: fn(SlideDirection) -> bool) -> SlideOutput {
    if !allowed(input.direction) || input.grid_size > MAX_GRID_SIZE {
        return SlideOutput::default();
    }

    SlideOutput {
        is_valid_direction: true,
        traversal_order: traversal_order(input.direction, input.grid_size),
        move_vector: input.direction.move_vector(),
    }
}

fn run_four_direction(_ctx: &mut SlotContext, input: &SlideInput) -> SlideOutput {
    slide(input, SlideDirection::is_cardinal)
}

fn run_eight_direction(_ctx: &mut SlotContext, input: &SlideInput) -> SlideOutput {
    slide(input, |_| true)
}

/// Up, down, left, right. Diagonals are rejected.
#[must_use]
pub fn four_direction_slide() -> SlotImplementation<SlideInput, SlideOutput> {
    slot("four_direction_slide", "slideRule", run_four_direction)
}

#[must_use]
pub fn eight_direction_slide() -> SlotImplementation<SlideInput, SlideOutput> {
    slot("eight_direction_slide", "slideRule", run_eight_direction)
}

// =============================================================================
// Merge Logic
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: String,
    pub value: u32,
    pub position: CellPos,
    pub merged_this_turn: bool,
}

impl Tile {
    pub fn new(id: impl Into<String>, value: u32, position: CellPos) -> Self {
        Self {
            id: id.into(),
            value,
            position,
            merged_this_turn: false,
        }
    }
}

/// `tile_b` moves into `tile_a`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeInput {
    pub tile_a: Tile,
    pub tile_b: Tile,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutput {
    pub can_merge: bool,
    pub result_value: u32,
    /// Tile the caller removes; always `tile_b` on a merge.
    pub destroy_tile_id: Option<String>,
}

impl MergeOutput {
    fn merged(result_value: u32, destroyed: &Tile) -> Self {
        Self {
            can_merge: true,
            result_value,
            destroy_tile_id: Some(destroyed.id.clone()),
        }
    }
}

fn run_standard_2048_merge(_ctx: &mut SlotContext, input: &MergeInput) -> MergeOutput {
    let MergeInput { tile_a, tile_b } = input;

    if tile_a.merged_this_turn || tile_b.merged_this_turn || tile_a.value != tile_b.value {
        return MergeOutput::default();
    }
    MergeOutput::merged(tile_a.value.saturating_mul(2), tile_b)
}

fn run_threes_merge(_ctx: &mut SlotContext, input: &MergeInput) -> MergeOutput {
    let MergeInput { tile_a, tile_b } = input;

    if tile_a.merged_this_turn || tile_b.merged_this_turn {
        return MergeOutput::default();
    }

    match (tile_a.value, tile_b.value) {
        (1, 2) | (2, 1) => MergeOutput::merged(3, tile_b),
        (a, b) if a >= 3 && a == b => MergeOutput::merged(a.saturating_add(b), tile_b),
        _ => MergeOutput::default(),
    }
}

/// Equal values double. A tile merges at most once per turn.
#[must_use]
pub fn standard_2048_merge() -> SlotImplementation<MergeInput, MergeOutput> {
    slot("standard_2048_merge", "mergeLogic", run_standard_2048_merge)
}

/// 1 and 2 make 3; equal values of 3 or more double.
#[must_use]
pub fn threes_merge() -> SlotImplementation<MergeInput, MergeOutput> {
    slot("threes_merge", "mergeLogic", run_threes_merge)
}

// =============================================================================
// Tile Spawner
// =============================================================================

/// Score thresholds and the weights they give to spawning 2, 4, or 8.
/// The first band whose threshold the score reaches applies.
pub const SPAWN_WEIGHT_BANDS: [(u64, [f64; 3]); 4] = [
    (10_000, [0.80, 0.15, 0.05]),
    (5_000, [0.85, 0.15, 0.0]),
    (2_000, [0.90, 0.10, 0.0]),
    (0, [1.0, 0.0, 0.0]),
];

const SPAWN_VALUES: [u32; 3] = [2, 4, 8];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnInput {
    /// Tile values; `None` is an empty cell.
    pub grid: Grid<Option<u32>>,
    pub current_score: u64,
    pub move_count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnOutput {
    /// `None` when the grid is full.
    pub position: Option<CellPos>,
    /// 0 when nothing spawns.
    pub value: u32,
}

/// Empty cells in row-major order.
#[must_use]
pub fn empty_cells(grid: &Grid<Option<u32>>) -> Vec<CellPos> {
    grid.positions()
        .filter(|&pos| matches!(grid.get(pos), Some(None)))
        .collect()
}

fn spawn_with(ctx: &mut SlotContext, grid: &Grid<Option<u32>>, value: fn(&mut SlotContext) -> u32) -> SpawnOutput {
    let empty = empty_cells(grid);
    let Some(&position) = ctx.rng.choose(&empty) else {
        return SpawnOutput::default();
    };

    SpawnOutput {
        position: Some(position),
        value: value(ctx),
    }
}

/// Weights for the band `score` falls in.
#[must_use]
pub fn spawn_weights(score: u64) -> [f64; 3] {
    SPAWN_WEIGHT_BANDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map_or([1.0, 0.0, 0.0], |(_, weights)| *weights)
}

fn run_random_2_or_4(ctx: &mut SlotContext, input: &SpawnInput) -> SpawnOutput {
    spawn_with(ctx, &input.grid, |ctx| if ctx.rng.gen_bool(0.9) { 2 } else { 4 })
}

fn run_always_2(ctx: &mut SlotContext, input: &SpawnInput) -> SpawnOutput {
    spawn_with(ctx, &input.grid, |_| 2)
}

fn run_weighted_spawn(ctx: &mut SlotContext, input: &SpawnInput) -> SpawnOutput {
    let weights = spawn_weights(input.current_score);
    let mut out = spawn_with(ctx, &input.grid, |_| 0);
    if out.position.is_some() {
        out.value = ctx
            .rng
            .choose_weighted(&weights)
            .and_then(|i| SPAWN_VALUES.get(i).copied())
            .unwrap_or(2);
    }
    out
}

/// Uniform empty cell; 2 with probability 0.9, else 4.
#[must_use]
pub fn random_2_or_4() -> SlotImplementation<SpawnInput, SpawnOutput> {
    slot("random_2_or_4", "tileSpawner", run_random_2_or_4)
}

#[must_use]
pub fn always_2() -> SlotImplementation<SpawnInput, SpawnOutput> {
    slot("always_2", "tileSpawner", run_always_2)
}

/// Value drawn from [`SPAWN_WEIGHT_BANDS`] by current score.
#[must_use]
pub fn weighted_spawn() -> SlotImplementation<SpawnInput, SpawnOutput> {
    slot("weighted_spawn", "tileSpawner", run_weighted_spawn)
}

// =============================================================================
// Scoring
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringInput {
    pub merged_value: u32,
    /// Merges earlier in the same move.
    pub combo_count: u32,
    pub move_count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringOutput {
    pub points: u64,
}

fn run_merge_value_scoring(_ctx: &mut SlotContext, input: &ScoringInput) -> ScoringOutput {
    ScoringOutput {
        points: u64::from(input.merged_value),
    }
}

fn run_exponential_scoring(_ctx: &mut SlotContext, input: &ScoringInput) -> ScoringOutput {
    // floor(value * (1 + combo / 2))
    let doubled = u64::from(input.merged_value).saturating_mul(2 + u64::from(input.combo_count));
    ScoringOutput { points: doubled / 2 }
}

/// Points equal the merged tile's value.
#[must_use]
pub fn merge_value_scoring() -> SlotImplementation<ScoringInput, ScoringOutput> {
    slot("merge_value_scoring", "scoring", run_merge_value_scoring)
}

/// Each combo step adds half the merged value.
#[must_use]
pub fn exponential_scoring() -> SlotImplementation<ScoringInput, ScoringOutput> {
    slot("exponential_scoring", "scoring", run_exponential_scoring)
}

// =============================================================================
// Registration
// =============================================================================

fn slot<I, O>(id: &str, slot_name: &str, run: SlotRunFn<I, O>) -> SlotImplementation<I, O> {
    SlotImplementation::new(id, SYSTEM_VERSION, SlotOwner::new(SYSTEM_ID, slot_name), run)
}

/// Register every slide implementation not already present. Returns the
/// number newly registered.
pub fn register_slide_slots(registry: &mut SlotRegistry) -> usize {
    [
        registry.register_if_absent(four_direction_slide()),
        registry.register_if_absent(eight_direction_slide()),
        registry.register_if_absent(standard_2048_merge()),
        registry.register_if_absent(threes_merge()),
        registry.register_if_absent(random_2_or_4()),
        registry.register_if_absent(always_2()),
        registry.register_if_absent(weighted_spawn()),
        registry.register_if_absent(merge_value_scoring()),
        registry.register_if_absent(exponential_scoring()),
    ]
    .into_iter()
    .filter(|inserted| *inserted)
    .count()
}

/// [`register_slide_slots`] against the global registry.
pub fn register_slide_slot_implementations() -> usize {
    register_slide_slots(&mut global_write())
}
