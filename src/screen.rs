use std::io;
use std::io::Write;

use crossterm::cursor;
use crossterm::queue;
use crossterm::style;
use crossterm::style::Color;

use crate::canvas::Canvas;

/// The display surface a frame is drawn on.
pub trait Screen {
    /// Reset the whole frame to the background
    fn clear(&mut self);

    /// Paint an `s` by `s` square of pixels, lit when `on`
    fn fill_square(&mut self, x: usize, y: usize, s: usize, on: bool);

    /// Show the frame
    fn present(&mut self) -> io::Result<()>;
}

impl Screen for Canvas {
    fn clear(&mut self) {
        self.fill(false);
    }

    fn fill_square(&mut self, x: usize, y: usize, s: usize, on: bool) {
        self.draw_square(x, y, s, on);
    }

    /// A bare canvas has nowhere to present to
    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Presents a [`Canvas`] as colored braille text on a terminal.
pub struct TerminalScreen<W: Write> {
    canvas: Canvas,
    out: W,
    foreground: Color,
    background: Color,
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(canvas: Canvas, out: W, foreground: Color, background: Color) -> Self {
        Self {
            canvas,
            out,
            foreground,
            background,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn clear(&mut self) {
        self.canvas.fill(false);
    }

    fn fill_square(&mut self, x: usize, y: usize, s: usize, on: bool) {
        self.canvas.draw_square(x, y, s, on);
    }

    fn present(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            style::SetForegroundColor(self.foreground),
            style::SetBackgroundColor(self.background)
        )?;

        for line in self.canvas.render().lines() {
            queue!(self.out, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        queue!(self.out, style::ResetColor)?;
        self.out.flush()
    }
}
