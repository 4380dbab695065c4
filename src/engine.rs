use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Coord;
use crate::canvas;
use crate::events::InputHandler;
use crate::grid::Grid;
use crate::rule_set::RuleSet;
use crate::rule_set::StepRule;
use crate::screen::Screen;

/// What the application loop drives once per iteration
pub trait Simulation: InputHandler {
    /// Paint the current state onto `screen`
    fn draw_area<S: Screen>(&self, screen: &mut S);

    /// Compute and commit the next state
    fn next_cycle(&mut self);
}

/// Owns the grid and advances it under a [`StepRule`].
#[derive(Debug)]
pub struct GameEngine<R = RuleSet> {
    grid: Grid,
    rule: R,

    /// Side length of a cell, in pixels
    cell_size: usize,

    generation: u64,
    paused: bool,

    /// Advance once even though paused
    step_requested: bool,

    /// Share of live cells when randomizing
    density: f32,
    rng: fastrand::Rng,
}

impl<R: StepRule> GameEngine<R> {
    pub fn new(grid: Grid, rule: R, cell_size: usize) -> Self {
        Self {
            grid,
            rule,
            cell_size: cell_size.max(1),
            generation: 0,
            paused: false,
            step_requested: false,
            density: 0.25,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density.clamp(0.0, 1.0);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Number of generations computed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Pause, and advance exactly one generation on the next cycle
    pub fn request_step(&mut self) {
        self.paused = true;
        self.step_requested = true;
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn randomize(&mut self) {
        self.grid.randomize(self.density, &mut self.rng);
    }

    /// The grid coordinate shown at terminal `(column, row)`, if any
    pub fn cell_at(&self, column: u16, row: u16) -> Option<Coord> {
        let (px, py) = canvas::pixel_at(column, row);
        let x = i32::try_from(px / self.cell_size).ok()?;
        let y = i32::try_from(py / self.cell_size).ok()?;

        self.grid.get(x, y).map(|c| c.coord())
    }

    /// Bring the cells of a pattern to life. Without an `offset` the pattern is centered on the
    /// grid. Cells landing outside the grid are dropped. Returns how many cells were placed.
    pub fn place_pattern(&mut self, cells: &[Coord], offset: Option<Coord>) -> usize {
        let (dx, dy) = match offset {
            Some((x, y)) => (i64::from(x), i64::from(y)),
            None => self.centering_offset(cells),
        };

        let placed = cells
            .iter()
            .filter(|&&(x, y)| {
                let x = i32::try_from(i64::from(x) + dx);
                let y = i32::try_from(i64::from(y) + dy);

                match (x, y) {
                    (Ok(x), Ok(y)) => self.grid.set(x, y, true),
                    _ => false,
                }
            })
            .count();

        if placed < cells.len() {
            warn!(
                dropped = cells.len() - placed,
                "Pattern does not fit on the grid"
            );
        }

        placed
    }

    /// Offset that centers the bounding box of `cells`. Computed in `i64` so that patterns
    /// spanning the whole `i32` range cannot overflow.
    fn centering_offset(&self, cells: &[Coord]) -> (i64, i64) {
        let Some(&first) = cells.first() else {
            return (0, 0);
        };

        let (min, max) = cells.iter().fold((first, first), |(min, max), &(x, y)| {
            ((min.0.min(x), min.1.min(y)), (max.0.max(x), max.1.max(y)))
        });

        let (min_x, min_y) = (i64::from(min.0), i64::from(min.1));
        let (w, h) = (self.grid.width() as i64, self.grid.height() as i64);
        let (pw, ph) = (i64::from(max.0) - min_x + 1, i64::from(max.1) - min_y + 1);

        ((w - pw) / 2 - min_x, (h - ph) / 2 - min_y)
    }
}

impl<R: StepRule> Simulation for GameEngine<R> {
    fn draw_area<S: Screen>(&self, screen: &mut S) {
        let s = self.cell_size;

        for cell in self.grid.cells() {
            let (x, y) = (cell.x() as usize, cell.y() as usize);
            screen.fill_square(x * s, y * s, s, cell.alive);
        }
    }

    fn next_cycle(&mut self) {
        if self.paused && !self.step_requested {
            return;
        }

        self.grid.step(&self.rule);
        self.generation += 1;
        self.step_requested = false;
    }
}

impl<R: StepRule> InputHandler for GameEngine<R> {
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                info!(paused = self.paused, generation = self.generation, "Toggled pause");
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.request_step();
            }
            KeyCode::Char('c') => {
                info!("Cleared the grid");
                self.clear();
            }
            KeyCode::Char('r') => {
                info!(density = self.density, "Randomized the grid");
                self.randomize();
            }
            code => debug!(?code, "Unbound key"),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some((x, y)) = self.cell_at(mouse.column, mouse.row) else {
            debug!(column = mouse.column, row = mouse.row, "Click outside the grid");
            return;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let alive = self.grid.toggle(x, y);
                debug!(x, y, ?alive, "Toggled cell");
            }
            MouseEventKind::Down(MouseButton::Right) => {
                self.grid.set(x, y, false);
                debug!(x, y, "Killed cell");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use crate::canvas::Canvas;
    use crate::grid::Topology;
    use crate::rule_set::B3S23;

    use super::*;

    fn engine(width: usize, height: usize) -> GameEngine {
        let grid = Grid::new(width, height, Topology::Bounded).unwrap();

        GameEngine::new(grid, B3S23, 2).with_rng(fastrand::Rng::with_seed(1))
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn click(button: MouseButton, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(button),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn draws_cells_as_squares() {
        let mut engine = engine(2, 2);
        engine.grid_mut().set(1, 1, true);

        let mut canvas = Canvas::new(4, 4);
        engine.draw_area(&mut canvas);

        assert!(canvas.pixel(2, 2) && canvas.pixel(3, 3));
        assert!(!canvas.pixel(0, 0) && !canvas.pixel(1, 1));
        assert_eq!(canvas.render(), "\u{2800}\u{28E4}\n");
    }

    #[test]
    fn cycles_advance_generations() {
        let mut engine = engine(3, 3);
        engine.grid_mut().set(1, 1, true);

        engine.next_cycle();

        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.grid().live_count(), 0);
    }

    #[test]
    fn pause_and_single_step() {
        let mut engine = engine(3, 3);

        engine.handle_key(key(' '));
        engine.next_cycle();
        assert!(engine.is_paused());
        assert_eq!(engine.generation(), 0);

        engine.handle_key(key('n'));
        engine.next_cycle();
        engine.next_cycle();
        assert_eq!(engine.generation(), 1);

        engine.handle_key(key(' '));
        engine.next_cycle();
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn clear_and_randomize() {
        let mut engine = engine(16, 16).with_density(0.5);

        engine.handle_key(key('r'));
        assert!(engine.grid().live_count() > 0);

        engine.handle_key(key('c'));
        assert_eq!(engine.grid().live_count(), 0);

        engine.handle_key(key('x'));
        assert_eq!(engine.grid().live_count(), 0);
    }

    #[test]
    fn mouse_maps_to_cells() {
        // 2x2 pixel cells: a terminal character is one cell wide and two cells tall
        let mut engine = engine(4, 4);

        assert_eq!(engine.cell_at(0, 0), Some((0, 0)));
        assert_eq!(engine.cell_at(3, 1), Some((3, 2)));
        assert_eq!(engine.cell_at(4, 0), None);

        engine.handle_mouse(click(MouseButton::Left, 1, 0));
        assert!(engine.grid().is_alive(1, 0));

        engine.handle_mouse(click(MouseButton::Left, 1, 0));
        assert!(!engine.grid().is_alive(1, 0));

        engine.handle_mouse(click(MouseButton::Left, 2, 1));
        engine.handle_mouse(click(MouseButton::Right, 2, 1));
        assert!(!engine.grid().is_alive(2, 2));

        // outside the grid
        engine.handle_mouse(click(MouseButton::Left, 40, 40));
        assert_eq!(engine.grid().live_count(), 0);
    }

    #[test]
    fn patterns_center_without_offset() {
        let mut engine = engine(7, 7);
        let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];

        assert_eq!(engine.place_pattern(&glider, None), 5);
        assert_eq!(
            engine.grid().live_cells().collect::<Vec<_>>(),
            vec![(3, 2), (4, 3), (2, 4), (3, 4), (4, 4)]
        );
    }

    #[test]
    fn patterns_are_clipped() {
        let mut engine = engine(3, 3);

        assert_eq!(engine.place_pattern(&[(0, 0), (1, 1)], Some((2, 2))), 1);
        assert!(engine.grid().is_alive(2, 2));
    }

    #[test]
    fn overflowing_offsets_drop_cells() {
        let mut engine = engine(3, 3);

        assert_eq!(engine.place_pattern(&[(0, 0)], Some((i32::MAX, 0))), 0);
        assert_eq!(engine.place_pattern(&[(i32::MAX, 0), (0, 0)], Some((1, 1))), 1);
        assert!(engine.grid().is_alive(1, 1));
        assert_eq!(engine.grid().live_count(), 1);
    }

    #[test]
    fn centering_spans_the_whole_coordinate_range() {
        let mut engine = engine(3, 3);

        assert_eq!(engine.place_pattern(&[(i32::MIN, 0), (i32::MAX, 0)], None), 0);
        assert_eq!(engine.grid().live_count(), 0);
    }
}
