//! Procedurally generated pip-eating maze game.
//!
//! [`maze::generate`] builds a level and [`planner`] decides where each
//! adversary steps next. [`game::Game`] ties the two together into a tick
//! driven game; the `pacmaze` binary puts it on a terminal.

pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod maze;
pub mod planner;
pub mod render;
pub mod spawn;

pub use error::MazeError;
pub use grid::{Cell, Dir, Grid, Mover, Pos};
pub use maze::{generate, Maze};
pub use planner::{plan, plan_pursuit, plan_random_walk, Strategy};
