/// Hex values of braille dots
///
/// ```text
///      1   8
///      2  10
///      4  20
///     40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Pixels per braille character, horizontally
pub const DOTS_X: usize = 2;

/// Pixels per braille character, vertically
pub const DOTS_Y: usize = 4;

/// A pixel framebuffer rendered as braille text.
pub struct Canvas {
    /// The pixel buffer
    pb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the pixel buffer
    w: usize,

    /// Height of the pixel buffer
    h: usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        // For each braille character, we need 3 bytes:
        //  - The leader byte:     0b11100010
        //  - Continuation byte 1: 0b101000xx
        //  - Continuation byte 2: 0b10xxxxxx
        // For each newline, we need one byte: 0b00001010
        //
        // Let `w` and `h` refer to width and height of the pixel buffer. Then `bw = ceil(w / 2)`
        // and `bh = ceil(h / 4)` are the width and height of braille characters of our framebuffer
        // (that is, not accounting for the trailing newlines expected at the end of each line).
        let (bw, bh) = (w.div_ceil(DOTS_X), h.div_ceil(DOTS_Y));

        Self {
            pb: vec![false; w * h],
            fb: String::with_capacity(3 * (bw * bh) + bh),
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Set every pixel to `on`
    pub fn fill(&mut self, on: bool) {
        self.pb.fill(on);
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < self.w && y < self.h && self.pb[self.xy_from(x, y)]
    }

    /// Sets a single pixel of the framebuffer. Pixels off the canvas are ignored.
    pub fn draw_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x < self.w && y < self.h {
            let i = self.xy_from(x, y);
            self.pb[i] = on;
        }
    }

    /// Sets an `s` by `s` square of pixels with its top left corner at `(x, y)`, clipped to the
    /// canvas.
    pub fn draw_square(&mut self, x: usize, y: usize, s: usize, on: bool) {
        let x_end = x.saturating_add(s).min(self.w);
        let y_end = y.saturating_add(s).min(self.h);

        for y in y..y_end {
            let row = self.xy_from(0, y);
            for x in x..x_end {
                self.pb[row + x] = on;
            }
        }
    }

    /// Build the braille text for the current pixel buffer. Every line, including the last, ends
    /// with a newline.
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(DOTS_X);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.pb.iter().enumerate() {
            if px {
                let (x, y) = (n % self.w, n / self.w);
                self.cp[(y / DOTS_Y) * bw + (x / DOTS_X)] += Self::get_hex_value(x, y);
            }
        }

        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % DOTS_X, y % DOTS_Y) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

/// Top left pixel of the terminal character at `(column, row)`
pub const fn pixel_at(column: u16, row: u16) -> (usize, usize) {
    (column as usize * DOTS_X, row as usize * DOTS_Y)
}
