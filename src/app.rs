use std::fs;
use std::io;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::execute;
use crossterm::terminal;
use tracing::debug;
use tracing::info;

use crate::canvas::Canvas;
use crate::clock::Clock;
use crate::clock::Limiter;
use crate::config::Config;
use crate::config::Resolution;
use crate::engine::GameEngine;
use crate::engine::Simulation;
use crate::events;
use crate::events::EventSource;
use crate::events::Shutdown;
use crate::events::TerminalEvents;
use crate::grid::Grid;
use crate::parse_rle;
use crate::rule_set::RuleSet;
use crate::screen::Screen;
use crate::screen::TerminalScreen;

/// The application shell. Each iteration draws, advances the simulation, handles input and then
/// waits out the rest of the frame, always in that order.
///
/// Since drawing comes first, a presented frame shows the state from before that iteration's
/// step.
pub struct App<G, S, E, C> {
    engine: G,
    screen: S,
    events: E,
    clock: C,
}

impl<G, S, E, C> App<G, S, E, C>
where
    G: Simulation,
    S: Screen,
    E: EventSource,
    C: Limiter,
{
    pub fn new(engine: G, screen: S, events: E, clock: C) -> Self {
        Self {
            engine,
            screen,
            events,
            clock,
        }
    }

    pub fn engine(&self) -> &G {
        &self.engine
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Draws a picture on the display
    pub fn draw(&mut self) -> io::Result<()> {
        self.screen.clear();
        self.engine.draw_area(&mut self.screen);
        self.screen.present()
    }

    pub fn process(&mut self) {
        self.engine.next_cycle();
    }

    /// Handle every pending event. Stops at the first one asking to shut down, dropping the rest.
    pub fn handle_events(&mut self) -> io::Result<Option<Shutdown>> {
        for event in self.events.drain()? {
            if let Some(shutdown) = events::dispatch(event, &mut self.engine) {
                return Ok(Some(shutdown));
            }
        }

        Ok(None)
    }

    /// A single iteration of the main loop
    pub fn iterate(&mut self) -> io::Result<Option<Shutdown>> {
        self.draw()?;
        self.process();

        if let Some(shutdown) = self.handle_events()? {
            return Ok(Some(shutdown));
        }

        self.clock.tick();

        Ok(None)
    }

    /// Iterate until an event asks to shut down
    pub fn run_loop(&mut self) -> io::Result<Shutdown> {
        debug!("Entering main loop");

        loop {
            if let Some(shutdown) = self.iterate()? {
                return Ok(shutdown);
            }
        }
    }
}

/// Build the engine described by `config` for a display of `resolution`: a pattern file if one is
/// given, random cells otherwise.
pub fn build_engine(config: &Config, resolution: Resolution) -> anyhow::Result<GameEngine> {
    let (width, height) = config.grid_size(resolution);
    let grid = Grid::new(width, height, config.topology).context("Failed to create the grid")?;

    let rng = config
        .seed
        .map(fastrand::Rng::with_seed)
        .unwrap_or_else(fastrand::Rng::new);

    let mut rule = RuleSet::default();

    let pattern = match &config.pattern {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

            let mut cells = Vec::new();
            let file = parse_rle::read_rle(&bytes, |c| cells.push(c))
                .with_context(|| format!("Failed to parse {}", path.display()))?;

            info!(
                name = %String::from_utf8_lossy(file.name.unwrap_or(&b"unnamed"[..])),
                author = %String::from_utf8_lossy(file.author.unwrap_or(&b"unknown"[..])),
                cells = cells.len(),
                "Loaded pattern"
            );

            if let Some(file_rule) = file.rule {
                rule = file_rule;
            }

            Some((cells, file.offset))
        }
        None => None,
    };

    if let Some(config_rule) = config.rule {
        rule = config_rule;
    }

    info!(%rule, width, height, topology = ?config.topology, "Created grid");

    let mut engine = GameEngine::new(grid, rule, config.cell_size)
        .with_rng(rng)
        .with_density(config.density);

    match pattern {
        Some((cells, offset)) => {
            engine.place_pattern(&cells, offset);
        }
        None => engine.randomize(),
    }

    engine.set_paused(config.paused);

    Ok(engine)
}

/// Raw mode, the alternate screen and mouse capture, restored when dropped
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        // Restores raw mode even if the rest fails
        let guard = TerminalGuard;

        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;

        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the application on the controlling terminal until it is asked to stop.
pub fn run(config: &Config) -> anyhow::Result<Shutdown> {
    let (cols, rows) = terminal::size().context("Failed to read the terminal size")?;
    let resolution = config.resolution_for(cols, rows);
    let engine = build_engine(config, resolution)?;

    let canvas = Canvas::new(resolution.width, resolution.height);
    let screen = TerminalScreen::new(canvas, io::stdout(), config.foreground, config.background);

    let guard = TerminalGuard::enter().context("Failed to set up the terminal")?;

    let mut app = App::new(engine, screen, TerminalEvents, Clock::new(config.frame_rate));
    let res = app.run_loop();

    drop(guard);

    let shutdown = res.context("Main loop failed")?;
    match shutdown {
        Shutdown::Quit => info!("The user quit"),
        Shutdown::Interrupted => info!("A keyboard interrupt was caught"),
    }

    info!(generation = app.engine().generation(), "Exiting");

    Ok(shutdown)
}
