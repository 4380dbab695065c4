use std::fmt;

use thiserror::Error;

use crate::Coord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellError {
    #[error("A cell coordinate has exactly 2 components, got {len}")]
    Arity { len: usize },
}

/// A single grid position.
///
/// The coordinate is fixed at construction. Only the `alive` flag changes over the lifetime of a
/// cell. Since `Cell` is `Copy`, the next generation of a grid is built from copies of the current
/// cells, leaving the originals readable while neighbors are counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    x: i32,
    y: i32,

    /// Whether the cell is currently alive
    pub alive: bool,
}

impl Cell {
    pub const fn new((x, y): Coord, alive: bool) -> Self {
        Self { x, y, alive }
    }

    /// A dead cell at `coord`
    pub const fn dead(coord: Coord) -> Self {
        Self::new(coord, false)
    }

    /// Build a cell from a coordinate of unknown length.
    ///
    /// Fails unless `coord` has exactly two components. Nothing is truncated or padded.
    pub fn from_slice(coord: &[i32], alive: bool) -> Result<Self, CellError> {
        let &[x, y] = coord else {
            return Err(CellError::Arity { len: coord.len() });
        };

        Ok(Self::new((x, y), alive))
    }

    pub const fn coord(&self) -> Coord {
        (self.x, self.y)
    }

    pub const fn x(&self) -> i32 {
        self.x
    }

    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Flip the alive flag, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.alive = !self.alive;
        self.alive
    }
}

impl TryFrom<&[i32]> for Cell {
    type Error = CellError;

    fn try_from(coord: &[i32]) -> Result<Self, Self::Error> {
        Self::from_slice(coord, false)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell(alive={} coord={:?})", self.alive, self.coord())
    }
}
