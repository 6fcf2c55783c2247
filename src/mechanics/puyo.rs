//! Falling-pair (puyo) slots: rotation with kicks, drop speed, group
//! matching, table-driven chain scoring, and garbage.
//!
//! A pair is a pivot plus a satellite one cell away. The satellite's
//! position relative to the pivot is fixed by the pair's
//! [`PairRotation`]. Row 0 is the top of the board; cells above it
//! (negative rows) are open space the pair may rotate into.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::{find_connected_groups, square_neighbors, CellPos, Grid};
use crate::slots::{
    global_write, SlotContext, SlotContract, SlotImplementation, SlotKind, SlotOwner,
    SlotRegistry, SlotRunFn,
};

pub const SYSTEM_ID: &str = "puyo";
pub const SYSTEM_VERSION: Version = Version::new(1, 0, 0);

const CONTRACTS: [SlotContract; 5] = [
    SlotContract::new("pairRotation", SlotKind::Policy, "How falling pairs rotate"),
    SlotContract::new("dropSpeed", SlotKind::Pure, "Falling speed by level"),
    SlotContract::new("matchDetection", SlotKind::Pure, "Connected same-colour groups"),
    SlotContract::new("chainScoring", SlotKind::Pure, "Chain multiplier calculation"),
    SlotContract::new("garbageSystem", SlotKind::Policy, "Nuisance sent to the opponent"),
];

/// Slot contracts declared by the puyo system.
#[must_use]
pub fn contracts() -> &'static [SlotContract] {
    &CONTRACTS
}

/// Chain power by chain index; chains past the end use the last entry.
pub const CHAIN_POWER: [u32; 19] = [
    0, 8, 16, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 480, 512,
];

/// Bonus per group by group size; larger groups use the last entry.
pub const GROUP_BONUS: [u32; 12] = [0, 0, 0, 0, 0, 2, 3, 4, 5, 6, 7, 10];

/// Bonus by number of distinct colours cleared in one step.
pub const COLOR_BONUS: [u32; 6] = [0, 0, 3, 6, 12, 24];

pub const DEFAULT_BASE_UNIT: u64 = 10;
pub const DEFAULT_MAX_MULTIPLIER: u32 = 999;

pub type PuyoColor = u8;

/// Board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuyoCell {
    #[default]
    Empty,
    Color(PuyoColor),
    /// Nuisance block; never part of a colour group.
    Garbage,
}

impl PuyoCell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == PuyoCell::Empty
    }
}

pub type PuyoBoard = Grid<PuyoCell>;

/// Where the satellite sits relative to the pivot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairRotation {
    /// Satellite above the pivot (spawn orientation).
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl PairRotation {
    const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Rotation index 0-3.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    #[must_use]
    pub fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn rotate_ccw(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    #[must_use]
    pub fn flip(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Satellite offset `(d_row, d_col)` from the pivot.
    #[must_use]
    pub fn satellite_offset(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuyoPair {
    pub pivot: CellPos,
    pub satellite: CellPos,
    pub rotation: PairRotation,
}

impl PuyoPair {
    /// Pair with the satellite placed from `rotation`.
    #[must_use]
    pub fn new(pivot: CellPos, rotation: PairRotation) -> Self {
        let (d_row, d_col) = rotation.satellite_offset();
        Self {
            pivot,
            satellite: pivot.offset(d_row, d_col),
            rotation,
        }
    }
}

/// Whether `pos` cannot hold a piece: off the sides, below the floor, or
/// occupied. Rows above the board are open.
#[must_use]
pub fn is_blocked(board: &PuyoBoard, pos: CellPos) -> bool {
    let cols = i32::try_from(board.col_count()).unwrap_or(i32::MAX);
    let rows = i32::try_from(board.row_count()).unwrap_or(i32::MAX);

    if pos.col < 0 || pos.col >= cols || pos.row >= rows {
        return true;
    }
    if pos.row < 0 {
        return false;
    }
    board.get(pos).map_or(true, |cell| !cell.is_empty())
}

// =============================================================================
// Pair Rotation
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationInput {
    pub pair: PuyoPair,
    pub board: PuyoBoard,
    pub direction: RotationDirection,
}

/// On failure the pair is reported unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationOutput {
    pub success: bool,
    pub rotation: PairRotation,
    pub pivot: CellPos,
    pub satellite: CellPos,
}

impl RotationOutput {
    fn unchanged(pair: &PuyoPair) -> Self {
        Self {
            success: false,
            rotation: pair.rotation,
            pivot: pair.pivot,
            satellite: pair.satellite,
        }
    }

    fn placed(pivot: CellPos, rotation: PairRotation) -> Self {
        let (d_row, d_col) = rotation.satellite_offset();
        Self {
            success: true,
            rotation,
            pivot,
            satellite: pivot.offset(d_row, d_col),
        }
    }
}

/// Horizontal kicks tried in order when the direct rotation is blocked.
#[must_use]
pub fn kick_offsets(direction: RotationDirection) -> [i32; 2] {
    match direction {
        RotationDirection::Clockwise => [-1, 1],
        RotationDirection::CounterClockwise => [1, -1],
    }
}

/// Rotate one step with kick fallback.
#[must_use]
pub fn rotate_pair(board: &PuyoBoard, pair: &PuyoPair, direction: RotationDirection) -> RotationOutput {
    let target = match direction {
        RotationDirection::Clockwise => pair.rotation.rotate_cw(),
        RotationDirection::CounterClockwise => pair.rotation.rotate_ccw(),
    };
    let (d_row, d_col) = target.satellite_offset();

    if !is_blocked(board, pair.pivot.offset(d_row, d_col)) {
        return RotationOutput::placed(pair.pivot, target);
    }

    kick_offsets(direction)
        .into_iter()
        .map(|kick| pair.pivot.offset(0, kick))
        .find(|&pivot| !is_blocked(board, pivot) && !is_blocked(board, pivot.offset(d_row, d_col)))
        .map_or_else(
            || RotationOutput::unchanged(pair),
            |pivot| RotationOutput::placed(pivot, target),
        )
}

/// Rotate 180 degrees in one step, without kicks.
#[must_use]
pub fn quick_turn_pair(board: &PuyoBoard, pair: &PuyoPair) -> RotationOutput {
    let target = pair.rotation.flip();
    let (d_row, d_col) = target.satellite_offset();

    if is_blocked(board, pair.pivot.offset(d_row, d_col)) {
        RotationOutput::unchanged(pair)
    } else {
        RotationOutput::placed(pair.pivot, target)
    }
}

fn run_standard_pair_rotation(_ctx: &mut SlotContext, input: &RotationInput) -> RotationOutput {
    rotate_pair(&input.board, &input.pair, input.direction)
}

fn run_quick_turn(_ctx: &mut SlotContext, input: &RotationInput) -> RotationOutput {
    quick_turn_pair(&input.board, &input.pair)
}

#[must_use]
pub fn standard_pair_rotation() -> SlotImplementation<RotationInput, RotationOutput> {
    slot("standard_pair_rotation", "pairRotation", run_standard_pair_rotation)
}

/// Ignores `direction`.
#[must_use]
pub fn quick_turn() -> SlotImplementation<RotationInput, RotationOutput> {
    slot("quick_turn", "pairRotation", run_quick_turn)
}

// =============================================================================
// Drop Speed
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSpeedInput {
    pub level: u32,
    pub score: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropSpeedOutput {
    pub frames_per_drop: u32,
    pub cells_per_second: f64,
}

fn run_level_based_drop(_ctx: &mut SlotContext, input: &DropSpeedInput) -> DropSpeedOutput {
    const BASE_FRAMES: u32 = 48;
    const MIN_FRAMES: u32 = 2;

    let frames = BASE_FRAMES
        .saturating_sub(input.level.saturating_sub(1).saturating_mul(4))
        .max(MIN_FRAMES);

    DropSpeedOutput {
        frames_per_drop: frames,
        cells_per_second: 60.0 / f64::from(frames),
    }
}

fn run_fixed_drop(_ctx: &mut SlotContext, _input: &DropSpeedInput) -> DropSpeedOutput {
    DropSpeedOutput {
        frames_per_drop: 30,
        cells_per_second: 2.0,
    }
}

/// 48 frames at level 1, four fewer per level, never below 2.
#[must_use]
pub fn level_based_drop() -> SlotImplementation<DropSpeedInput, DropSpeedOutput> {
    slot("level_based_drop", "dropSpeed", run_level_based_drop)
}

#[must_use]
pub fn fixed_drop() -> SlotImplementation<DropSpeedInput, DropSpeedOutput> {
    slot("fixed_drop", "dropSpeed", run_fixed_drop)
}

// =============================================================================
// Match Detection
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInput {
    pub board: PuyoBoard,
    pub min_match: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuyoGroup {
    pub color: PuyoColor,
    pub cells: Vec<CellPos>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutput {
    pub groups: Vec<PuyoGroup>,
}

/// 4-connected single-colour groups of at least `min_size` cells,
/// ordered by their first cell in row-major order. Garbage never groups.
#[must_use]
pub fn find_groups(board: &PuyoBoard, min_size: usize) -> Vec<PuyoGroup> {
    let same_color = |cell: &PuyoCell, start: &PuyoCell| match (cell, start) {
        (PuyoCell::Color(a), PuyoCell::Color(b)) => a == b,
        _ => false,
    };

    find_connected_groups(board, min_size.max(1), same_color, square_neighbors)
        .into_iter()
        .filter_map(|cells| match board.get(*cells.first()?) {
            Some(PuyoCell::Color(color)) => Some(PuyoGroup { color: *color, cells }),
            _ => None,
        })
        .collect()
}

fn run_four_connected(_ctx: &mut SlotContext, input: &MatchInput) -> MatchOutput {
    MatchOutput {
        groups: find_groups(&input.board, input.min_match),
    }
}

fn run_five_connected(_ctx: &mut SlotContext, input: &MatchInput) -> MatchOutput {
    MatchOutput {
        groups: find_groups(&input.board, 5),
    }
}

/// Groups of at least the input's `min_match`.
#[must_use]
pub fn four_connected_match() -> SlotImplementation<MatchInput, MatchOutput> {
    slot("four_connected_match", "matchDetection", run_four_connected)
}

/// Groups of at least five.
#[must_use]
pub fn five_connected_match() -> SlotImplementation<MatchInput, MatchOutput> {
    slot("five_connected_match", "matchDetection", run_five_connected)
}

// =============================================================================
// Chain Scoring
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainScoringInput {
    /// 1 for the first clear of a cascade.
    pub chain_count: u32,
    pub group_sizes: Vec<u32>,
    pub colors_cleared: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainScoringOutput {
    pub score: u64,
    pub chain_power: u32,
    pub group_bonus: u32,
    pub color_bonus: u32,
    pub multiplier: u32,
}

fn lookup(table: &[u32], index: u32) -> u32 {
    let last = table.len().saturating_sub(1);
    let index = usize::try_from(index).map_or(last, |i| i.min(last));
    table.get(index).copied().unwrap_or(0)
}

/// Score one clear step from the bonus tables.
///
/// The multiplier is the sum of the three bonuses clamped into
/// `1..=max_multiplier`; the score is `cleared * base_unit * multiplier`.
#[must_use]
pub fn table_chain_score(input: &ChainScoringInput, base_unit: u64, max_multiplier: u32) -> ChainScoringOutput {
    let chain_power = lookup(&CHAIN_POWER, input.chain_count);
    let group_bonus = input
        .group_sizes
        .iter()
        .map(|&size| lookup(&GROUP_BONUS, size))
        .fold(0u32, u32::saturating_add);
    let color_bonus = lookup(&COLOR_BONUS, input.colors_cleared);

    let multiplier = chain_power
        .saturating_add(group_bonus)
        .saturating_add(color_bonus)
        .clamp(1, max_multiplier.max(1));

    ChainScoringOutput {
        score: cleared(input)
            .saturating_mul(base_unit)
            .saturating_mul(u64::from(multiplier)),
        chain_power,
        group_bonus,
        color_bonus,
        multiplier,
    }
}

fn cleared(input: &ChainScoringInput) -> u64 {
    input.group_sizes.iter().map(|&s| u64::from(s)).sum()
}

fn base_unit(ctx: &SlotContext) -> u64 {
    u64::try_from(ctx.params.get_int("baseUnit", 10)).unwrap_or(DEFAULT_BASE_UNIT)
}

fn run_standard_chain_scoring(ctx: &mut SlotContext, input: &ChainScoringInput) -> ChainScoringOutput {
    let max_multiplier = u32::try_from(ctx.params.get_int("maxMultiplier", 999)).unwrap_or(DEFAULT_MAX_MULTIPLIER);
    table_chain_score(input, base_unit(ctx), max_multiplier)
}

fn run_simple_chain_scoring(ctx: &mut SlotContext, input: &ChainScoringInput) -> ChainScoringOutput {
    ChainScoringOutput {
        score: cleared(input)
            .saturating_mul(base_unit(ctx))
            .saturating_mul(u64::from(input.chain_count)),
        chain_power: input.chain_count,
        group_bonus: 0,
        color_bonus: 0,
        multiplier: input.chain_count,
    }
}

/// Chain power, group, and colour bonus tables.
#[must_use]
pub fn standard_chain_scoring() -> SlotImplementation<ChainScoringInput, ChainScoringOutput> {
    slot("standard_chain_scoring", "chainScoring", run_standard_chain_scoring)
}

/// Linear in chain count.
#[must_use]
pub fn simple_chain_scoring() -> SlotImplementation<ChainScoringInput, ChainScoringOutput> {
    slot("simple_chain_scoring", "chainScoring", run_simple_chain_scoring)
}

// =============================================================================
// Garbage System
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbageInput {
    pub chain_power: u32,
    pub puyos_cleared: u32,
    /// Nuisance points per garbage block.
    pub target_margin: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbageOutput {
    pub garbage_to_send: u64,
    pub nuisance_points: u64,
}

fn run_standard_garbage(_ctx: &mut SlotContext, input: &GarbageInput) -> GarbageOutput {
    let nuisance_points = u64::from(input.puyos_cleared) * u64::from(input.chain_power);
    let garbage_to_send = nuisance_points
        .checked_div(u64::from(input.target_margin))
        .unwrap_or(0);

    GarbageOutput {
        garbage_to_send,
        nuisance_points,
    }
}

fn run_no_garbage(_ctx: &mut SlotContext, _input: &GarbageInput) -> GarbageOutput {
    GarbageOutput::default()
}

/// One block per `target_margin` nuisance points; a zero margin sends none.
#[must_use]
pub fn standard_garbage() -> SlotImplementation<GarbageInput, GarbageOutput> {
    slot("standard_garbage", "garbageSystem", run_standard_garbage)
}

#[must_use]
pub fn no_garbage() -> SlotImplementation<GarbageInput, GarbageOutput> {
    slot("no_garbage", "garbageSystem", run_no_garbage)
}

// =============================================================================
// Registration
// =============================================================================

fn slot<I, O>(id: &str, slot_name: &str, run: SlotRunFn<I, O>) -> SlotImplementation<I, O> {
    SlotImplementation::new(id, SYSTEM_VERSION, SlotOwner::new(SYSTEM_ID, slot_name), run)
}

/// Register every puyo implementation not already present. Returns the
/// number newly registered.
pub fn register_puyo_slots(registry: &mut SlotRegistry) -> usize {
    [
        registry.register_if_absent(standard_pair_rotation()),
        registry.register_if_absent(quick_turn()),
        registry.register_if_absent(level_based_drop()),
        registry.register_if_absent(fixed_drop()),
        registry.register_if_absent(four_connected_match()),
        registry.register_if_absent(five_connected_match()),
        registry.register_if_absent(standard_chain_scoring()),
        registry.register_if_absent(simple_chain_scoring()),
        registry.register_if_absent(standard_garbage()),
        registry.register_if_absent(no_garbage()),
    ]
    .into_iter()
    .filter(|inserted| *inserted)
    .count()
}

/// [`register_puyo_slots`] against the global registry.
pub fn register_puyo_slot_implementations() -> usize {
    register_puyo_slots(&mut global_write())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SlotParams;

    fn board(rows: &[&str]) -> PuyoBoard {
        Grid::from_rows(
            rows.iter()
                .map(|row| {
                    row.chars()
                        .map(|c| match c {
                            '#' => PuyoCell::Garbage,
                            d if d.is_ascii_digit() => PuyoCell::Color(d as u8 - b'0'),
                            _ => PuyoCell::Empty,
                        })
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn test_rotation_cycle() {
        let r = PairRotation::Up;
        assert_eq!(r.rotate_cw(), PairRotation::Right);
        assert_eq!(r.rotate_ccw(), PairRotation::Left);
        assert_eq!(r.flip(), PairRotation::Down);
        assert_eq!(r.rotate_cw().rotate_cw().rotate_cw().rotate_cw(), r);
        assert_eq!(PairRotation::from_index(6), PairRotation::Down);
    }

    #[test]
    fn test_blocked_cells() {
        let b = board(&["..", "1."]);
        assert!(!is_blocked(&b, CellPos::new(-1, 0)));
        assert!(is_blocked(&b, CellPos::new(-1, 2)));
        assert!(is_blocked(&b, CellPos::new(1, 0)));
        assert!(is_blocked(&b, CellPos::new(2, 1)));
        assert!(!is_blocked(&b, CellPos::new(1, 1)));
    }

    #[test]
    fn test_clockwise_from_spawn() {
        let b = PuyoBoard::filled(12, 6, PuyoCell::Empty);
        let pair = PuyoPair {
            pivot: CellPos::new(0, 2),
            satellite: CellPos::new(-1, 2),
            rotation: PairRotation::Up,
        };
        let out = rotate_pair(&b, &pair, RotationDirection::Clockwise);
        assert!(out.success);
        assert_eq!(out.rotation.index(), 1);
        assert_eq!(out.pivot, CellPos::new(0, 2));
        assert_eq!(out.satellite, CellPos::new(0, 3));
    }

    #[test]
    fn test_four_clockwise_turns_restore_pair() {
        let b = PuyoBoard::filled(12, 6, PuyoCell::Empty);
        let start = PuyoPair::new(CellPos::new(5, 2), PairRotation::Up);
        let mut pair = start;
        for _ in 0..4 {
            let out = rotate_pair(&b, &pair, RotationDirection::Clockwise);
            assert!(out.success);
            pair = PuyoPair {
                pivot: out.pivot,
                satellite: out.satellite,
                rotation: out.rotation,
            };
        }
        assert_eq!(pair, start);
    }

    #[test]
    fn test_rotation_against_wall_kicks_away() {
        // Pivot hugging the right wall; satellite cannot swing right.
        let b = board(&["...", "...", "..."]);
        let pair = PuyoPair::new(CellPos::new(1, 2), PairRotation::Up);
        let out = rotate_pair(&b, &pair, RotationDirection::Clockwise);
        assert!(out.success);
        assert_eq!(out.rotation, PairRotation::Right);
        assert_eq!(out.pivot, CellPos::new(1, 1));
        assert_eq!(out.satellite, CellPos::new(1, 2));
    }

    #[test]
    fn test_counter_clockwise_kick_prefers_right() {
        let b = board(&["...", "...", "..."]);
        let pair = PuyoPair::new(CellPos::new(1, 0), PairRotation::Up);
        let out = rotate_pair(&b, &pair, RotationDirection::CounterClockwise);
        assert!(out.success);
        assert_eq!(out.rotation, PairRotation::Left);
        assert_eq!(out.pivot, CellPos::new(1, 1));
        assert_eq!(out.satellite, CellPos::new(1, 0));
    }

    #[test]
    fn test_rotation_fails_in_a_well() {
        let b = board(&["1.1", "1.1", "1.1"]);
        let pair = PuyoPair::new(CellPos::new(1, 1), PairRotation::Up);
        let out = rotate_pair(&b, &pair, RotationDirection::Clockwise);
        assert!(!out.success);
        assert_eq!(out.rotation, PairRotation::Up);
        assert_eq!(out.pivot, pair.pivot);
        assert_eq!(out.satellite, pair.satellite);
    }

    #[test]
    fn test_quick_turn() {
        let b = board(&["...", "...", "..."]);
        let pair = PuyoPair::new(CellPos::new(1, 1), PairRotation::Up);
        let out = quick_turn_pair(&b, &pair);
        assert!(out.success);
        assert_eq!(out.rotation, PairRotation::Down);
        assert_eq!(out.satellite, CellPos::new(2, 1));

        // Floor directly below: no kick rescues a quick turn.
        let on_floor = PuyoPair::new(CellPos::new(2, 1), PairRotation::Up);
        let out = quick_turn_pair(&b, &on_floor);
        assert!(!out.success);
        assert_eq!(out.rotation, PairRotation::Up);
    }

    #[test]
    fn test_drop_speed() {
        let speed = |level| run_level_based_drop(&mut SlotContext::default(), &DropSpeedInput { level, score: 0 });
        assert_eq!(speed(1).frames_per_drop, 48);
        assert_eq!(speed(1).cells_per_second, 1.25);
        assert_eq!(speed(5).frames_per_drop, 32);
        assert_eq!(speed(12).frames_per_drop, 4);
        assert_eq!(speed(13).frames_per_drop, 2);
        assert_eq!(speed(100).frames_per_drop, 2);
        assert_eq!(speed(0).frames_per_drop, 48);

        let fixed = run_fixed_drop(&mut SlotContext::default(), &DropSpeedInput { level: 9, score: 0 });
        assert_eq!(fixed.frames_per_drop, 30);
        assert_eq!(fixed.cells_per_second, 2.0);
    }

    #[test]
    fn test_groups_exclude_garbage() {
        let b = board(&[
            "11#2",
            "1#22",
            "11.2",
        ]);
        let groups = find_groups(&b, 4);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].color, 1);
        assert_eq!(groups[0].cells.len(), 5);
        assert_eq!(groups[1].color, 2);
        assert_eq!(groups[1].cells.len(), 4);

        let five = run_five_connected(&mut SlotContext::default(), &MatchInput { board: b, min_match: 4 });
        assert_eq!(five.groups.len(), 1);
        assert_eq!(five.groups[0].color, 1);
    }

    #[test]
    fn test_single_group_scoring() {
        let input = ChainScoringInput {
            chain_count: 1,
            group_sizes: vec![4],
            colors_cleared: 1,
        };
        let out = table_chain_score(&input, 10, 999);
        assert_eq!(out.chain_power, 8);
        assert_eq!(out.group_bonus, 0);
        assert_eq!(out.color_bonus, 0);
        assert_eq!(out.multiplier, 8);
        assert_eq!(out.score, 320);
    }

    #[test]
    fn test_multiplier_never_zero() {
        let input = ChainScoringInput {
            chain_count: 0,
            group_sizes: vec![4],
            colors_cleared: 1,
        };
        let out = table_chain_score(&input, 10, 999);
        assert_eq!(out.multiplier, 1);
        assert_eq!(out.score, 40);
    }

    #[test]
    fn test_tables_clamp_at_their_ends() {
        let input = ChainScoringInput {
            chain_count: 40,
            group_sizes: vec![30, 11],
            colors_cleared: 9,
        };
        let out = table_chain_score(&input, 10, 999);
        assert_eq!(out.chain_power, 512);
        assert_eq!(out.group_bonus, 20);
        assert_eq!(out.color_bonus, 24);
        assert_eq!(out.multiplier, 556);

        let capped = table_chain_score(&input, 10, 100);
        assert_eq!(capped.multiplier, 100);
        assert_eq!(capped.score, 41 * 10 * 100);
    }

    #[test]
    fn test_scoring_params() {
        let input = ChainScoringInput {
            chain_count: 2,
            group_sizes: vec![4, 5],
            colors_cleared: 2,
        };
        let mut ctx = SlotContext::default().with_params(SlotParams::new().with("baseUnit", 1));
        let out = run_standard_chain_scoring(&mut ctx, &input);
        // 16 + 2 + 3
        assert_eq!(out.multiplier, 21);
        assert_eq!(out.score, 9 * 21);

        let simple = run_simple_chain_scoring(&mut SlotContext::default(), &input);
        assert_eq!(simple.score, 9 * 10 * 2);
        assert_eq!(simple.chain_power, 2);
    }

    #[test]
    fn test_garbage() {
        let input = GarbageInput {
            chain_power: 32,
            puyos_cleared: 8,
            target_margin: 70,
        };
        let out = run_standard_garbage(&mut SlotContext::default(), &input);
        assert_eq!(out.nuisance_points, 256);
        assert_eq!(out.garbage_to_send, 3);

        let zero_margin = GarbageInput { target_margin: 0, ..input };
        assert_eq!(run_standard_garbage(&mut SlotContext::default(), &zero_margin).garbage_to_send, 0);
        assert_eq!(run_no_garbage(&mut SlotContext::default(), &input), GarbageOutput::default());
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = SlotRegistry::new();
        assert_eq!(register_puyo_slots(&mut registry), 10);
        assert_eq!(register_puyo_slots(&mut registry), 0);
        assert!(registry.validate_selection(SYSTEM_ID, "chainScoring", "simple_chain_scoring"));
        assert!(!registry.validate_selection(SYSTEM_ID, "dropSpeed", "simple_chain_scoring"));
    }
}
