//! Bubble-shooter slots.
//!
//! The board is a staggered hex grid of optional colours
//! ([`BubbleGrid`]); odd rows are shifted half a cell to the right.
//!
//! | Slot | Kind | Implementations |
//! |---|---|---|
//! | `aimingRule` | policy | `standard_aim`, `arc_preview_aim` |
//! | `bubbleAttachment` | pure | `snap_to_grid`, `physics_attachment` |
//! | `matchDetection` | pure | `flood_fill_match`, `chain_reaction_match` |
//! | `popAnimation` | hook | `standard_pop`, `cascade_pop` |
//! | `ceilingDescent` | policy | `shot_based_descent`, `time_based_descent` |

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::{flood_fill, hex_neighbors, CellPos, Grid};
use crate::slots::{
    global_write, SlotContext, SlotContract, SlotImplementation, SlotKind, SlotOwner,
    SlotRegistry, SlotRunFn,
};

pub const SYSTEM_ID: &str = "bubble";
pub const SYSTEM_VERSION: Version = Version::new(1, 0, 0);

/// Tag applied to bubbles removed by a match.
pub const POPPING_TAG: &str = "sys.bubble:popping";
/// Tag applied to bubbles that lost their support.
pub const FALLING_TAG: &str = "sys.bubble:falling";
/// Upper bound on the `cascade_pop` per-bubble delay.
pub const MAX_DELAY_STEP_MS: u64 = 60_000;

const CONTRACTS: [SlotContract; 5] = [
    SlotContract::new("aimingRule", SlotKind::Policy, "Arc preview, angle limits, aim assist"),
    SlotContract::new("bubbleAttachment", SlotKind::Pure, "Where a bubble sticks on collision with the grid"),
    SlotContract::new("matchDetection", SlotKind::Pure, "Flood-fill colour matching for connected bubbles"),
    SlotContract::new("popAnimation", SlotKind::Hook, "Visual feedback when bubbles pop"),
    SlotContract::new("ceilingDescent", SlotKind::Policy, "How and when the ceiling moves down"),
];

/// Slot contracts declared by the bubble system.
#[must_use]
pub fn contracts() -> &'static [SlotContract] {
    &CONTRACTS
}

/// Bubble colour index.
pub type BubbleColor = u8;

/// Hex board; `None` is an empty cell.
pub type BubbleGrid = Grid<Option<BubbleColor>>;

/// A point in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// Aiming Rule
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AimInput {
    pub touch_x: f64,
    pub touch_y: f64,
    pub launcher_x: f64,
    pub launcher_y: f64,
    /// Radians.
    pub min_angle: f64,
    pub max_angle: f64,
    pub world_width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AimOutput {
    /// Launch angle in radians, clamped into the allowed range.
    pub angle: f64,
    pub trajectory: Vec<Point>,
    /// False when the raw angle had to be clamped.
    pub is_valid_angle: bool,
}

fn clamped_angle(input: &AimInput) -> (f64, bool) {
    let raw = (input.touch_y - input.launcher_y).atan2(input.touch_x - input.launcher_x);
    if raw < input.min_angle {
        (input.min_angle, false)
    } else if raw > input.max_angle {
        (input.max_angle, false)
    } else {
        (raw, true)
    }
}

fn run_standard_aim(_ctx: &mut SlotContext, input: &AimInput) -> AimOutput {
    let (angle, is_valid_angle) = clamped_angle(input);
    let (sin, cos) = angle.sin_cos();

    let trajectory = (0..20)
        .map(|i| {
            let t = f64::from(i) * 0.5;
            Point {
                x: input.launcher_x + cos * t,
                y: input.launcher_y + sin * t,
            }
        })
        .collect();

    AimOutput {
        angle,
        trajectory,
        is_valid_angle,
    }
}

fn run_arc_preview_aim(_ctx: &mut SlotContext, input: &AimInput) -> AimOutput {
    const MAX_POINTS: usize = 50;
    const MAX_BOUNCES: u32 = 3;

    let (angle, is_valid_angle) = clamped_angle(input);
    let (vy, mut vx) = angle.sin_cos();
    let (mut x, mut y) = (input.launcher_x, input.launcher_y);
    let mut bounces = 0;
    let mut trajectory = Vec::with_capacity(MAX_POINTS);

    while trajectory.len() < MAX_POINTS && bounces <= MAX_BOUNCES {
        trajectory.push(Point { x, y });
        x += vx;
        y += vy;

        if x <= 0.0 || x >= input.world_width {
            vx = -vx;
            x = x.clamp(0.0, input.world_width.max(0.0));
            bounces += 1;
        }

        if y <= 0.0 {
            break;
        }
    }

    AimOutput {
        angle,
        trajectory,
        is_valid_angle,
    }
}

/// Straight 20-point preview.
#[must_use]
pub fn standard_aim() -> SlotImplementation<AimInput, AimOutput> {
    slot("standard_aim", "aimingRule", run_standard_aim)
}

/// Up to 50 points, reflecting off the side walls at most three times.
#[must_use]
pub fn arc_preview_aim() -> SlotImplementation<AimInput, AimOutput> {
    slot("arc_preview_aim", "aimingRule", run_arc_preview_aim)
}

// =============================================================================
// Bubble Attachment
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachmentInput {
    pub bubble_x: f64,
    pub bubble_y: f64,
    pub bubble_radius: f64,
    pub grid_offset_x: f64,
    pub grid_offset_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachmentOutput {
    pub cell: CellPos,
    pub snap: Point,
}

fn snap(input: &AttachmentInput, y: f64) -> AttachmentOutput {
    let row = ((y - input.grid_offset_y) / input.cell_height).round() as i32;
    let shift = if CellPos::new(row, 0).is_odd_row() {
        input.cell_width / 2.0
    } else {
        0.0
    };
    let col = ((input.bubble_x - input.grid_offset_x - shift) / input.cell_width).round() as i32;

    AttachmentOutput {
        cell: CellPos::new(row, col),
        snap: Point {
            x: input.grid_offset_x + f64::from(col) * input.cell_width + shift,
            y: input.grid_offset_y + f64::from(row) * input.cell_height,
        },
    }
}

fn run_snap_to_grid(_ctx: &mut SlotContext, input: &AttachmentInput) -> AttachmentOutput {
    snap(input, input.bubble_y)
}

fn run_physics_attachment(_ctx: &mut SlotContext, input: &AttachmentInput) -> AttachmentOutput {
    snap(input, input.bubble_y + input.bubble_radius * 0.1)
}

#[must_use]
pub fn snap_to_grid() -> SlotImplementation<AttachmentInput, AttachmentOutput> {
    slot("snap_to_grid", "bubbleAttachment", run_snap_to_grid)
}

/// Snap after letting the bubble settle by a tenth of its radius.
#[must_use]
pub fn physics_attachment() -> SlotImplementation<AttachmentInput, AttachmentOutput> {
    slot("physics_attachment", "bubbleAttachment", run_physics_attachment)
}

// =============================================================================
// Match Detection
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    pub grid: BubbleGrid,
    /// Where the shot bubble landed.
    pub start: CellPos,
    pub min_match: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutput {
    /// Cells to pop.
    pub matched: Vec<CellPos>,
    /// Cells left without a path to the ceiling once `matched` is gone.
    pub floating: Vec<CellPos>,
}

fn color_group(grid: &BubbleGrid, start: CellPos, color: BubbleColor) -> Vec<CellPos> {
    flood_fill(grid, start, |cell, _| *cell == Some(color), hex_neighbors)
}

/// Occupied cells with no hex path to an occupied row-0 cell.
///
/// Cells in `removed` count as empty.
#[must_use]
pub fn find_floating(grid: &BubbleGrid, removed: &[CellPos]) -> Vec<CellPos> {
    let removed: FxHashSet<CellPos> = removed.iter().copied().collect();
    let occupied = |pos: CellPos| !removed.contains(&pos) && matches!(grid.get(pos), Some(Some(_)));

    let mut anchored = FxHashSet::default();
    let mut queue: VecDeque<CellPos> = (0..grid.row_len(0))
        .filter_map(|col| i32::try_from(col).ok())
        .map(|col| CellPos::new(0, col))
        .filter(|&pos| occupied(pos))
        .collect();
    anchored.extend(queue.iter().copied());

    while let Some(pos) = queue.pop_front() {
        for next in hex_neighbors(pos) {
            if occupied(next) && anchored.insert(next) {
                queue.push_back(next);
            }
        }
    }

    grid.positions()
        .filter(|&pos| occupied(pos) && !anchored.contains(&pos))
        .collect()
}

fn run_flood_fill_match(_ctx: &mut SlotContext, input: &MatchInput) -> MatchOutput {
    let Some(Some(color)) = input.grid.get(input.start).copied() else {
        return MatchOutput::default();
    };

    let matched = color_group(&input.grid, input.start, color);
    if matched.len() < input.min_match {
        return MatchOutput::default();
    }

    let floating = find_floating(&input.grid, &matched);
    MatchOutput { matched, floating }
}

fn run_chain_reaction_match(_ctx: &mut SlotContext, input: &MatchInput) -> MatchOutput {
    let grid = &input.grid;
    let Some(Some(start_color)) = grid.get(input.start).copied() else {
        return MatchOutput::default();
    };

    let mut matched = Vec::new();
    let mut resolved_colors: FxHashSet<BubbleColor> = FxHashSet::default();
    let mut pending = VecDeque::from([(input.start, start_color)]);

    // A colour resolves at most once per call.
    while let Some((pos, color)) = pending.pop_front() {
        if resolved_colors.contains(&color) {
            continue;
        }

        let group = color_group(grid, pos, color);
        if group.len() < input.min_match {
            continue;
        }
        resolved_colors.insert(color);

        for &cell in &group {
            for next in hex_neighbors(cell) {
                if let Some(Some(neighbor_color)) = grid.get(next).copied() {
                    if !resolved_colors.contains(&neighbor_color) {
                        pending.push_back((next, neighbor_color));
                    }
                }
            }
        }
        matched.extend(group);
    }

    if matched.is_empty() {
        return MatchOutput::default();
    }

    let floating = find_floating(grid, &matched);
    MatchOutput { matched, floating }
}

/// Single colour group from the landing cell.
#[must_use]
pub fn flood_fill_match() -> SlotImplementation<MatchInput, MatchOutput> {
    slot("flood_fill_match", "matchDetection", run_flood_fill_match)
}

/// Cascades into adjacent colour groups that also reach `min_match`.
#[must_use]
pub fn chain_reaction_match() -> SlotImplementation<MatchInput, MatchOutput> {
    slot("chain_reaction_match", "matchDetection", run_chain_reaction_match)
}

// =============================================================================
// Pop Animation
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopInput {
    /// Entity ids of the bubbles being removed, in removal order.
    pub entities: Vec<String>,
    pub is_floating: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PopCue {
    pub entity_id: String,
    pub tag: &'static str,
    pub delay_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PopOutput {
    pub cues: Vec<PopCue>,
}

fn pop_cues(input: &PopInput, step_ms: u64) -> PopOutput {
    let tag = if input.is_floating { FALLING_TAG } else { POPPING_TAG };
    let cues = input
        .entities
        .iter()
        .zip((0u64..).map(|i| i.saturating_mul(step_ms)))
        .map(|(entity_id, delay_ms)| PopCue {
            entity_id: entity_id.clone(),
            tag,
            delay_ms,
        })
        .collect();
    PopOutput { cues }
}

fn run_standard_pop(_ctx: &mut SlotContext, input: &PopInput) -> PopOutput {
    pop_cues(input, 0)
}

fn run_cascade_pop(ctx: &mut SlotContext, input: &PopInput) -> PopOutput {
    let step = u64::try_from(ctx.params.get_int("delayStepMs", 50))
        .unwrap_or(0)
        .min(MAX_DELAY_STEP_MS);
    pop_cues(input, step)
}

/// Everything pops at once.
#[must_use]
pub fn standard_pop() -> SlotImplementation<PopInput, PopOutput> {
    slot("standard_pop", "popAnimation", run_standard_pop)
}

/// Staggered by `delayStepMs` (default 50, at most [`MAX_DELAY_STEP_MS`]) per bubble.
#[must_use]
pub fn cascade_pop() -> SlotImplementation<PopInput, PopOutput> {
    slot("cascade_pop", "popAnimation", run_cascade_pop)
}

// =============================================================================
// Ceiling Descent
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CeilingInput {
    pub shots_fired: u32,
    pub elapsed_ms: u64,
    pub current_ceiling_y: f64,
    pub descent_amount: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CeilingOutput {
    pub should_descend: bool,
    pub new_ceiling_y: f64,
}

fn run_shot_based_descent(ctx: &mut SlotContext, input: &CeilingInput) -> CeilingOutput {
    let per_descent = u32::try_from(ctx.params.get_int("shotsPerDescent", 5)).unwrap_or(5).max(1);
    let should_descend = input.shots_fired > 0 && input.shots_fired % per_descent == 0;

    CeilingOutput {
        should_descend,
        new_ceiling_y: if should_descend {
            input.current_ceiling_y + input.descent_amount
        } else {
            input.current_ceiling_y
        },
    }
}

fn run_time_based_descent(ctx: &mut SlotContext, input: &CeilingInput) -> CeilingOutput {
    let interval = u64::try_from(ctx.params.get_int("intervalMs", 10_000)).unwrap_or(10_000).max(1);
    let descents = input.elapsed_ms / interval;
    let target = descents as f64 * input.descent_amount;
    let should_descend = target > input.current_ceiling_y;

    CeilingOutput {
        should_descend,
        new_ceiling_y: if should_descend { target } else { input.current_ceiling_y },
    }
}

/// Descend every `shotsPerDescent` shots (default 5).
#[must_use]
pub fn shot_based_descent() -> SlotImplementation<CeilingInput, CeilingOutput> {
    slot("shot_based_descent", "ceilingDescent", run_shot_based_descent)
}

/// Catch the ceiling up to one step per `intervalMs` (default 10 000).
#[must_use]
pub fn time_based_descent() -> SlotImplementation<CeilingInput, CeilingOutput> {
    slot("time_based_descent", "ceilingDescent", run_time_based_descent)
}

// =============================================================================
// Registration
// =============================================================================

fn slot<I, O>(id: &str, slot_name: &str, run: SlotRunFn<I, O>) -> SlotImplementation<I, O> {
    SlotImplementation::new(id, SYSTEM_VERSION, SlotOwner::new(SYSTEM_ID, slot_name), run)
}

/// Register every bubble implementation not already present. Returns the
/// number newly registered.
pub fn register_bubble_slots(registry: &mut SlotRegistry) -> usize {
    [
        registry.register_if_absent(standard_aim()),
        registry.register_if_absent(arc_preview_aim()),
        registry.register_if_absent(snap_to_grid()),
        registry.register_if_absent(physics_attachment()),
        registry.register_if_absent(flood_fill_match()),
        registry.register_if_absent(chain_reaction_match()),
        registry.register_if_absent(standard_pop()),
        registry.register_if_absent(cascade_pop()),
        registry.register_if_absent(shot_based_descent()),
        registry.register_if_absent(time_based_descent()),
    ]
    .into_iter()
    .filter(|inserted| *inserted)
    .count()
}

/// [`register_bubble_slots`] against the global registry.
pub fn register_bubble_slot_implementations() -> usize {
    register_bubble_slots(&mut global_write())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::SlotParams;
    use std::f64::consts::PI;

    fn board(rows: &[&[i8]]) -> BubbleGrid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&c| u8::try_from(c).ok()).collect())
                .collect(),
        )
    }

    fn aim(touch_x: f64, touch_y: f64) -> AimInput {
        AimInput {
            touch_x,
            touch_y,
            launcher_x: 5.0,
            launcher_y: 10.0,
            min_angle: -PI + 0.1,
            max_angle: -0.1,
            world_width: 10.0,
        }
    }

    #[test]
    fn test_standard_aim_straight_up() {
        let out = run_standard_aim(&mut SlotContext::default(), &aim(5.0, 0.0));
        assert!(out.is_valid_angle);
        assert!((out.angle + PI / 2.0).abs() < 1e-9);
        assert_eq!(out.trajectory.len(), 20);
        assert_eq!(out.trajectory[0], Point { x: 5.0, y: 10.0 });
        let last = out.trajectory[19];
        assert!((last.y - (10.0 - 9.5)).abs() < 1e-9);
    }

    #[test]
    fn test_aim_clamps_downward_touch() {
        let out = run_standard_aim(&mut SlotContext::default(), &aim(9.0, 10.5));
        assert!(!out.is_valid_angle);
        assert_eq!(out.angle, -0.1);
    }

    #[test]
    fn test_arc_preview_bounces_and_stops_at_top() {
        let out = run_arc_preview_aim(&mut SlotContext::default(), &aim(0.0, 9.0));
        assert!(out.trajectory.len() <= 50);
        assert!(out.trajectory.iter().all(|p| p.x >= 0.0 && p.x <= 10.0));
        assert!(out.trajectory.iter().all(|p| p.y > 0.0));
    }

    #[test]
    fn test_snap_shifts_odd_rows() {
        let input = AttachmentInput {
            bubble_x: 52.0,
            bubble_y: 41.0,
            bubble_radius: 20.0,
            grid_offset_x: 20.0,
            grid_offset_y: 20.0,
            cell_width: 40.0,
            cell_height: 35.0,
        };
        let out = run_snap_to_grid(&mut SlotContext::default(), &input);
        assert_eq!(out.cell, CellPos::new(1, 0));
        assert_eq!(out.snap, Point { x: 40.0, y: 55.0 });

        let settled = run_physics_attachment(&mut SlotContext::default(), &input);
        assert_eq!(settled.cell.row, 1);
    }

    #[test]
    fn test_flood_fill_match_threshold() {
        let grid = board(&[&[0, 0, 1], &[0, 1, -1]]);
        let mut input = MatchInput {
            grid,
            start: CellPos::new(0, 0),
            min_match: 3,
        };

        let out = run_flood_fill_match(&mut SlotContext::default(), &input);
        assert_eq!(out.matched.len(), 3);

        input.min_match = 4;
        let out = run_flood_fill_match(&mut SlotContext::default(), &input);
        assert!(out.matched.is_empty());
        assert!(out.floating.is_empty());
    }

    #[test]
    fn test_empty_start_matches_nothing() {
        let input = MatchInput {
            grid: board(&[&[0, -1]]),
            start: CellPos::new(0, 1),
            min_match: 1,
        };
        assert_eq!(run_flood_fill_match(&mut SlotContext::default(), &input), MatchOutput::default());

        let off_grid = MatchInput {
            start: CellPos::new(4, 4),
            ..input
        };
        assert_eq!(run_chain_reaction_match(&mut SlotContext::default(), &off_grid), MatchOutput::default());
    }

    #[test]
    fn test_match_reports_orphaned_bubbles() {
        // Row 1 colour 2 hangs only from the matched red cells above it.
        let grid = board(&[&[0, 0, 0, -1], &[-1, 2, -1, -1], &[-1, -1, -1, -1]]);
        let input = MatchInput {
            grid,
            start: CellPos::new(0, 1),
            min_match: 3,
        };
        let out = run_flood_fill_match(&mut SlotContext::default(), &input);
        assert_eq!(out.matched.len(), 3);
        assert_eq!(out.floating, vec![CellPos::new(1, 1)]);
    }

    #[test]
    fn test_find_floating_without_removal() {
        let grid = board(&[&[1, -1, -1], &[-1, -1, -1], &[-1, 3, -1]]);
        assert_eq!(find_floating(&grid, &[]), vec![CellPos::new(2, 1)]);
    }

    #[test]
    fn test_chain_reaction_cascades() {
        // Red row of 3 touches a blue group of 3; the green pair below is
        // too small and hangs only from blue.
        let grid = board(&[
            &[0, 0, 0, 1],
            &[-1, -1, 1, 1],
            &[-1, -1, 2, 2],
        ]);
        let input = MatchInput {
            grid,
            start: CellPos::new(0, 0),
            min_match: 3,
        };

        let single = run_flood_fill_match(&mut SlotContext::default(), &input);
        assert_eq!(single.matched.len(), 3);

        let chained = run_chain_reaction_match(&mut SlotContext::default(), &input);
        assert_eq!(chained.matched.len(), 6);
        assert!(chained.matched.contains(&CellPos::new(0, 3)));
        assert!(!chained.matched.contains(&CellPos::new(2, 2)));
        assert_eq!(chained.floating, vec![CellPos::new(2, 2), CellPos::new(2, 3)]);
    }

    #[test]
    fn test_pop_cues() {
        let input = PopInput {
            entities: vec!["a".into(), "b".into(), "c".into()],
            is_floating: false,
        };
        let standard = run_standard_pop(&mut SlotContext::default(), &input);
        assert!(standard.cues.iter().all(|c| c.tag == POPPING_TAG && c.delay_ms == 0));

        let falling = PopInput { is_floating: true, ..input.clone() };
        let cascade = run_cascade_pop(&mut SlotContext::default(), &falling);
        let delays: Vec<_> = cascade.cues.iter().map(|c| c.delay_ms).collect();
        assert_eq!(delays, vec![0, 50, 100]);
        assert!(cascade.cues.iter().all(|c| c.tag == FALLING_TAG));

        let mut ctx = SlotContext::default().with_params(SlotParams::new().with("delayStepMs", 20));
        let custom = run_cascade_pop(&mut ctx, &input);
        assert_eq!(custom.cues[2].delay_ms, 40);
    }

    #[test]
    fn test_cascade_delay_is_capped() {
        let input = PopInput {
            entities: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            is_floating: false,
        };
        let mut ctx = SlotContext::default().with_params(SlotParams::new().with("delayStepMs", i64::MAX));
        let out = run_cascade_pop(&mut ctx, &input);
        let delays: Vec<_> = out.cues.iter().map(|c| c.delay_ms).collect();
        assert_eq!(delays, vec![0, MAX_DELAY_STEP_MS, 2 * MAX_DELAY_STEP_MS, 3 * MAX_DELAY_STEP_MS]);

        assert_eq!(pop_cues(&input, u64::MAX).cues[3].delay_ms, u64::MAX);
    }

    #[test]
    fn test_shot_based_descent() {
        let mut input = CeilingInput {
            shots_fired: 5,
            elapsed_ms: 0,
            current_ceiling_y: 10.0,
            descent_amount: 30.0,
        };
        let out = run_shot_based_descent(&mut SlotContext::default(), &input);
        assert!(out.should_descend);
        assert_eq!(out.new_ceiling_y, 40.0);

        input.shots_fired = 0;
        assert!(!run_shot_based_descent(&mut SlotContext::default(), &input).should_descend);
        input.shots_fired = 7;
        assert!(!run_shot_based_descent(&mut SlotContext::default(), &input).should_descend);
    }

    #[test]
    fn test_time_based_descent_catches_up() {
        let input = CeilingInput {
            shots_fired: 0,
            elapsed_ms: 25_000,
            current_ceiling_y: 0.0,
            descent_amount: 30.0,
        };
        let out = run_time_based_descent(&mut SlotContext::default(), &input);
        assert!(out.should_descend);
        assert_eq!(out.new_ceiling_y, 60.0);

        let settled = CeilingInput { current_ceiling_y: 60.0, ..input };
        let out = run_time_based_descent(&mut SlotContext::default(), &settled);
        assert!(!out.should_descend);
        assert_eq!(out.new_ceiling_y, 60.0);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = SlotRegistry::new();
        assert_eq!(register_bubble_slots(&mut registry), 10);
        assert_eq!(register_bubble_slots(&mut registry), 0);
        assert_eq!(registry.list_for_slot(SYSTEM_ID, "matchDetection").len(), 2);
        assert!(registry.validate_selection(SYSTEM_ID, "aimingRule", "arc_preview_aim"));
        assert_eq!(contracts().len(), 5);
    }
}
