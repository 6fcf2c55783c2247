//! Grid and graph primitives shared by every mechanic family.
//!
//! Coordinates are signed so neighbour enumeration can step outside the
//! board freely; every lookup goes through [`Grid::get`], which checks
//! bounds and returns `None` instead of indexing out of range.
//!
//! ## Neighbourhoods
//!
//! - [`square_neighbors`]: up, down, left, right.
//! - [`hex_neighbors`]: six neighbours on an offset hex layout where odd
//!   rows are shifted right by half a cell.
//!
//! ## Algorithms
//!
//! - [`flood_fill`]: BFS over an arbitrary adjacency and "same group" predicate.
//! - [`find_connected_groups`]: partition a grid into flood-fill groups.
//! - [`find_line_runs`]: maximal straight runs of one key along direction vectors.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// A (row, col) coordinate. Row 0 is the top of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: i32,
    pub col: i32,
}

impl CellPos {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position shifted by a row/column delta.
    #[must_use]
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Whether this position sits on an odd (shifted) hex row.
    #[must_use]
    pub fn is_odd_row(self) -> bool {
        self.row.rem_euclid(2) == 1
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Neighbour list; six inline slots cover both square and hex layouts.
pub type Neighbors = SmallVec<[CellPos; 6]>;

/// Read-only board snapshot, stored row-major.
///
/// Rows may have different lengths (bubble grids often do), so bounds are
/// checked per row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: Vec<Vec<T>>,
}

impl<T> Grid<T> {
    /// Wrap existing rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        Self { rows }
    }

    /// A `rows` x `cols` grid with every cell set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            rows: vec![vec![value; cols]; rows],
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of row 0 (0 for an empty grid).
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Width of a given row, 0 if the row does not exist.
    #[must_use]
    pub fn row_len(&self, row: i32) -> usize {
        usize::try_from(row)
            .ok()
            .and_then(|r| self.rows.get(r))
            .map_or(0, Vec::len)
    }

    /// Whether the position lies on the grid.
    #[must_use]
    pub fn contains(&self, pos: CellPos) -> bool {
        self.get(pos).is_some()
    }

    /// Bounds-checked lookup.
    #[must_use]
    pub fn get(&self, pos: CellPos) -> Option<&T> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        self.rows.get(row)?.get(col)
    }

    /// Bounds-checked mutable lookup.
    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut T> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        self.rows.get_mut(row)?.get_mut(col)
    }

    /// Overwrite a cell. Returns `false` if the position is off the grid.
    pub fn set(&mut self, pos: CellPos, value: T) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Row slices.
    #[must_use]
    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            (0..row.len()).map(move |c| CellPos::new(r as i32, c as i32))
        })
    }
}

/// Straight 4-neighbourhood (up, down, left, right). No bounds checking.
#[must_use]
pub fn square_neighbors(pos: CellPos) -> Neighbors {
    smallvec![
        pos.offset(-1, 0),
        pos.offset(1, 0),
        pos.offset(0, -1),
        pos.offset(0, 1),
    ]
}

/// Six hex neighbours for an offset layout with odd rows shifted right.
///
/// Row parity decides which diagonal columns are adjacent. No bounds checking.
#[must_use]
pub fn hex_neighbors(pos: CellPos) -> Neighbors {
    if pos.is_odd_row() {
        smallvec![
            pos.offset(-1, 0),
            pos.offset(-1, 1),
            pos.offset(0, -1),
            pos.offset(0, 1),
            pos.offset(1, 0),
            pos.offset(1, 1),
        ]
    } else {
        smallvec![
            pos.offset(-1, -1),
            pos.offset(-1, 0),
            pos.offset(0, -1),
            pos.offset(0, 1),
            pos.offset(1, -1),
            pos.offset(1, 0),
        ]
    }
}

/// Collect every cell connected to `start`.
///
/// A cell joins the group when `same_group(cell, start_cell)` holds; it is
/// reached through `neighbors`, whose out-of-range results are skipped.
/// Cells come back in BFS discovery order. An off-grid start yields an
/// empty group.
pub fn flood_fill<T, S, N>(grid: &Grid<T>, start: CellPos, same_group: S, neighbors: N) -> Vec<CellPos>
where
    S: Fn(&T, &T) -> bool,
    N: Fn(CellPos) -> Neighbors,
{
    let Some(start_cell) = grid.get(start) else {
        return Vec::new();
    };

    let mut matched = Vec::new();
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        let Some(cell) = grid.get(pos) else {
            continue;
        };
        if !same_group(cell, start_cell) {
            continue;
        }

        matched.push(pos);

        for next in neighbors(pos) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    matched
}

/// Partition the grid into connected groups and keep those of at least
/// `min_size` cells. Groups are ordered by their first cell in row-major
/// order.
pub fn find_connected_groups<T, S, N>(
    grid: &Grid<T>,
    min_size: usize,
    same_group: S,
    neighbors: N,
) -> Vec<Vec<CellPos>>
where
    S: Fn(&T, &T) -> bool,
    N: Fn(CellPos) -> Neighbors,
{
    let mut visited = FxHashSet::default();
    let mut groups = Vec::new();

    for pos in grid.positions() {
        if !visited.insert(pos) {
            continue;
        }

        let group = flood_fill(grid, pos, &same_group, &neighbors);
        visited.extend(group.iter().copied());

        if !group.is_empty() && group.len() >= min_size {
            groups.push(group);
        }
    }

    groups
}

/// Direction vector for line scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineDirection {
    pub d_row: i32,
    pub d_col: i32,
}

impl LineDirection {
    pub const HORIZONTAL: Self = Self::new(0, 1);
    pub const VERTICAL: Self = Self::new(1, 0);
    pub const DIAGONAL_DOWN_RIGHT: Self = Self::new(1, 1);
    pub const DIAGONAL_DOWN_LEFT: Self = Self::new(1, -1);

    /// Horizontal, vertical and both diagonals.
    pub const STANDARD: [Self; 4] = [
        Self::HORIZONTAL,
        Self::VERTICAL,
        Self::DIAGONAL_DOWN_RIGHT,
        Self::DIAGONAL_DOWN_LEFT,
    ];

    /// Create a direction vector.
    #[must_use]
    pub const fn new(d_row: i32, d_col: i32) -> Self {
        Self { d_row, d_col }
    }

    /// A zero vector never advances and is ignored by scans.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.d_row == 0 && self.d_col == 0
    }
}

/// A maximal straight run of cells sharing one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRun<K> {
    pub key: K,
    pub cells: Vec<CellPos>,
    pub direction: LineDirection,
}

impl<K> LineRun<K> {
    /// Number of cells in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Find every maximal run of at least `min_length` cells with equal
/// `Some` keys along the given directions.
///
/// Cells whose key is `None` (empty cells) break runs. Each run is
/// reported once, from the end opposite to its direction, ordered by that
/// start cell in row-major order and then by direction order.
pub fn find_line_runs<T, K, F>(
    grid: &Grid<T>,
    min_length: usize,
    key: F,
    directions: &[LineDirection],
) -> Vec<LineRun<K>>
where
    K: PartialEq + Clone,
    F: Fn(&T) -> Option<K>,
{
    let min_length = min_length.max(1);
    let key_at = |pos: CellPos| grid.get(pos).and_then(&key);
    let mut runs = Vec::new();

    for pos in grid.positions() {
        let Some(start_key) = key_at(pos) else {
            continue;
        };

        for &dir in directions {
            if dir.is_zero() {
                continue;
            }

            // Only scan from the first cell of a run.
            if key_at(pos.offset(-dir.d_row, -dir.d_col)).as_ref() == Some(&start_key) {
                continue;
            }

            let mut cells = vec![pos];
            let mut next = pos.offset(dir.d_row, dir.d_col);
            while key_at(next).as_ref() == Some(&start_key) {
                cells.push(next);
                next = next.offset(dir.d_row, dir.d_col);
            }

            if cells.len() >= min_length {
                runs.push(LineRun {
                    key: start_key.clone(),
                    cells,
                    direction: dir,
                });
            }
        }
    }

    runs
}
