pub mod app;
pub mod canvas;
pub mod cell;
pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod grid;
pub mod parse_rle;
pub mod rule_set;
pub mod screen;

mod parse_util;

/// A position on the grid, `x` growing rightwards and `y` downwards
pub type Coord = (i32, i32);
