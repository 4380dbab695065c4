use std::fmt;

use thiserror::Error;

use crate::Coord;
use crate::cell::Cell;
use crate::rule_set::StepRule;

/// How the neighborhood of a cell on the edge of the grid is formed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Topology {
    /// Everything past the edge is dead
    #[default]
    Bounded,

    /// Opposite edges are adjacent
    Torus,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero, got {width}x{height}")]
    Empty { width: usize, height: usize },

    #[error("Grid of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },
}

/// Fixed size, row-major grid of [`Cell`]s
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
    topology: Topology,
}

impl Grid {
    /// Create a grid where every cell is dead
    pub fn new(width: usize, height: usize, topology: Topology) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }

        let too_large = GridError::TooLarge { width, height };
        let size = width.checked_mul(height).ok_or(too_large)?;
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(GridError::TooLarge { width, height });
        }

        let mut cells = Vec::with_capacity(size);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell::dead((x, y)));
            }
        }

        Ok(Self {
            cells,
            width,
            height,
            topology,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.grid_idx(x, y).map(|i| &self.cells[i])
    }

    pub fn is_alive(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|c| c.alive)
    }

    /// Set the state of a single cell. Returns `false` if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: i32, y: i32, alive: bool) -> bool {
        match self.grid_idx(x, y) {
            Some(i) => {
                self.cells[i].alive = alive;
                true
            }
            None => false,
        }
    }

    /// Flip a single cell, returning its new state. `None` if `(x, y)` is outside the grid.
    pub fn toggle(&mut self, x: i32, y: i32) -> Option<bool> {
        let i = self.grid_idx(x, y)?;

        Some(self.cells[i].toggle())
    }

    pub fn clear(&mut self) {
        for c in self.cells.iter_mut() {
            c.alive = false;
        }
    }

    /// Bring each cell to life with probability `density`
    pub fn randomize(&mut self, density: f32, rng: &mut fastrand::Rng) {
        for c in self.cells.iter_mut() {
            c.alive = rng.f32() < density;
        }
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.alive).count()
    }

    /// Coordinates of every live cell, in row-major order
    pub fn live_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().filter(|c| c.alive).map(Cell::coord)
    }

    /// Number of live cells in the Moore neighborhood of `(x, y)`.
    ///
    /// On a torus narrower or shorter than three cells several offsets wrap onto the same cell,
    /// or back onto `(x, y)` itself. Each distinct neighbor is counted once and the cell never
    /// counts itself.
    pub fn live_neighbors(&self, x: i32, y: i32) -> u8 {
        let mut seen: [Coord; 8] = [(x, y); 8];
        let mut len = 0;
        let mut n = 0;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(c) = self.neighbor_coord(x + dx, y + dy) else {
                    continue;
                };

                if c == (x, y) || seen[..len].contains(&c) {
                    continue;
                }

                seen[len] = c;
                len += 1;

                if self.is_alive(c.0, c.1) {
                    n += 1;
                }
            }
        }

        n
    }

    /// Advance the grid by one generation.
    ///
    /// The next generation is built from copies of the current cells, so every neighbor count
    /// observes the current generation only.
    pub fn step<R: StepRule + ?Sized>(&mut self, rule: &R) {
        let next = self
            .cells
            .iter()
            .map(|cell| {
                let mut next = *cell;
                next.alive = rule.next_state(cell.alive, self.live_neighbors(cell.x(), cell.y()));
                next
            })
            .collect();

        self.cells = next;
    }

    /// Where `(x, y)` lands on the grid, if anywhere
    fn neighbor_coord(&self, x: i32, y: i32) -> Option<Coord> {
        match self.topology {
            Topology::Bounded => self.grid_idx(x, y).map(|_| (x, y)),
            Topology::Torus => Some((
                x.rem_euclid(self.width as i32),
                y.rem_euclid(self.height as i32),
            )),
        }
    }

    fn grid_idx<I: TryInto<usize>>(&self, x: I, y: I) -> Option<usize> {
        if let (Ok(x), Ok(y)) = (x.try_into(), y.try_into()) {
            if x < self.width && y < self.height {
                Some(x + y * self.width)
            } else {
                None
            }
        } else {
            None
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                f.write_str("\n")?;
            }

            for c in row {
                f.write_str(if c.alive { "#" } else { "." })?;
            }
        }

        Ok(())
    }
}
