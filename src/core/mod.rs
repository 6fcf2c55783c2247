//! Core building blocks shared by every mechanic family.
//!
//! Nothing here knows about slots or specific games: boards are plain
//! [`Grid`] snapshots and randomness is an explicit [`GameRng`].

pub mod grid;
pub mod rng;

pub use grid::{
    find_connected_groups, find_line_runs, flood_fill, hex_neighbors, square_neighbors,
    CellPos, Grid, LineDirection, LineRun, Neighbors,
};
pub use rng::GameRng;
