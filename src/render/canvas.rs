use crossterm::style::Color;

/// How to render sub-cell pixels to terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Unicode braille characters (2x4 per cell = highest resolution)
    Braille,
    /// Half-block characters ▀▄█ (1x2 per cell)
    HalfBlock,
    /// Plain ASCII characters with density mapping
    Ascii,
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// No color — monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

/// The pixel surface animations draw into. Coordinates are in sub-cell
/// pixel space. A brightness plane (0.0..=1.0) plus an RGB plane stand
/// in for an RGBA buffer — alpha-blended writes fold the alpha into
/// both planes at write time.
pub struct Canvas {
    /// Width in pixels (sub-cell)
    pub width: usize,
    /// Height in pixels (sub-cell)
    pub height: usize,
    /// Pixel brightness 0.0..=1.0
    pub pixels: Vec<f64>,
    /// Per-pixel color
    pub colors: Vec<(u8, u8, u8)>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (px_w, px_h) = match render_mode {
            RenderMode::Braille => (term_cols * 2, term_rows * 4),
            RenderMode::HalfBlock => (term_cols, term_rows * 2),
            RenderMode::Ascii => (term_cols, term_rows),
        };
        let size = px_w * px_h;
        Canvas {
            width: px_w,
            height: px_h,
            pixels: vec![0.0; size],
            colors: vec![(0, 0, 0); size],
            render_mode,
            color_mode,
        }
    }

    /// Reset every pixel to opaque black.
    pub fn clear(&mut self) {
        self.pixels.fill(0.0);
        self.colors.fill((0, 0, 0));
    }

    /// Set a pixel with color. Bounds-checked.
    #[inline]
    pub fn set_colored(&mut self, x: usize, y: usize, brightness: f64, r: u8, g: u8, b: u8) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.pixels[idx] = brightness;
            self.colors[idx] = (r, g, b);
        }
    }

    /// Alpha-blend a pixel over what's already there.
    #[inline]
    pub fn blend(&mut self, x: usize, y: usize, brightness: f64, r: u8, g: u8, b: u8, alpha: f64) {
        if x >= self.width || y >= self.height {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let idx = y * self.width + x;
        let (or, og, ob) = self.colors[idx];
        self.colors[idx] = (
            (or as f64 * (1.0 - a) + r as f64 * a) as u8,
            (og as f64 * (1.0 - a) + g as f64 * a) as u8,
            (ob as f64 * (1.0 - a) + b as f64 * a) as u8,
        );
        self.pixels[idx] = self.pixels[idx] * (1.0 - a) + brightness * a;
    }

    /// Alpha-blend a filled rectangle. `fill_rect(0, 0, w, h, 0, 0, 0, a)`
    /// is the translucent black overlay that produces exponential trail
    /// decay.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, r: u8, g: u8, b: u8, alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        let target = r.max(g).max(b) as f64 / 255.0;
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        for py in y..y1 {
            let row = py * self.width;
            for px in x..x1 {
                let idx = row + px;
                let (or, og, ob) = self.colors[idx];
                self.colors[idx] = (
                    (or as f64 * (1.0 - a) + r as f64 * a) as u8,
                    (og as f64 * (1.0 - a) + g as f64 * a) as u8,
                    (ob as f64 * (1.0 - a) + b as f64 * a) as u8,
                );
                self.pixels[idx] = self.pixels[idx] * (1.0 - a) + target * a;
            }
        }
    }

    /// Alpha-blend a filled disc centered at (cx, cy).
    #[allow(clippy::too_many_arguments)]
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, brightness: f64, r: u8, g: u8, b: u8, alpha: f64) {
        if cx + radius < 0.0 || cy + radius < 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x0 = (cx - radius).floor().max(0.0) as usize;
        let y0 = (cy - radius).floor().max(0.0) as usize;
        let x1 = (((cx + radius).ceil() as usize) + 1).min(self.width);
        let y1 = (((cy + radius).ceil() as usize) + 1).min(self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 - cx;
                let dy = py as f64 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, brightness, r, g, b, alpha);
                }
            }
        }
    }

    /// Stroke a line. Width 1 plots single pixels; wider strokes stamp
    /// discs along the path.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, brightness: f64, r: u8, g: u8, b: u8, width: f64) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let px = x0 + dx * t;
            let py = y0 + dy * t;
            if width > 1.0 {
                self.fill_circle(px, py, width * 0.5, brightness, r, g, b, 1.0);
            } else if px >= 0.0 && py >= 0.0 {
                self.set_colored(px as usize, py as usize, brightness, r, g, b);
            }
        }
    }

    /// Stroke a closed polygon through the given vertices.
    pub fn stroke_polygon(&mut self, points: &[(f64, f64)], brightness: f64, r: u8, g: u8, b: u8, width: f64) {
        if points.len() < 2 {
            return;
        }
        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            self.draw_line(x0, y0, x1, y1, brightness, r, g, b, width);
        }
    }

    /// Full-surface synthesis: evaluate a per-pixel function over the
    /// whole grid and overwrite every pixel. The hot path for the
    /// field-synthesis animations — one pass, no incremental drawing.
    pub fn fill_pixels(&mut self, mut f: impl FnMut(usize, usize) -> (f64, (u8, u8, u8))) {
        for y in 0..self.height {
            let row = y * self.width;
            for x in 0..self.width {
                let (v, rgb) = f(x, y);
                self.pixels[row + x] = v;
                self.colors[row + x] = rgb;
            }
        }
    }

    /// Terminal dimensions needed for this canvas
    pub fn term_size(&self) -> (usize, usize) {
        match self.render_mode {
            RenderMode::Braille => (self.width / 2, self.height / 4),
            RenderMode::HalfBlock => (self.width, self.height / 2),
            RenderMode::Ascii => (self.width, self.height),
        }
    }

    /// Render the canvas to a string buffer for output
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::Braille => super::braille::render(self),
            RenderMode::HalfBlock => super::halfblock::render(self),
            RenderMode::Ascii => self.render_ascii(),
        }
    }

    fn render_ascii(&self) -> String {
        const CHARS: &[u8] = b" .:-=+*#%@";
        let (cols, rows) = self.term_size();
        let mut out = String::with_capacity(cols * rows * 10);
        let use_color = self.color_mode != ColorMode::Mono;
        let mut last_fg = String::new();

        for row in 0..rows {
            for col in 0..cols {
                let idx = row * self.width + col;
                let v = self.pixels[idx].clamp(0.0, 1.0);
                let ci = (v * (CHARS.len() - 1) as f64) as usize;
                let ch = CHARS[ci] as char;

                if use_color {
                    let (r, g, b) = self.colors[idx];
                    let color = self.map_color(r, g, b);
                    let fg = color_to_fg(color);
                    if fg != last_fg {
                        out.push_str("\x1b[");
                        out.push_str(&fg);
                        out.push('m');
                        last_fg = fg;
                    }
                }
                out.push(ch);
            }
            out.push_str("\x1b[0m\x1b[");
            let next_row = row + 2;
            out.push_str(&next_row.to_string());
            out.push_str(";1H");
            last_fg.clear();
        }
        out
    }

    pub fn map_color(&self, r: u8, g: u8, b: u8) -> Color {
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Approximate RGB to 256-color
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                if brightness < 64 {
                    Color::Black
                } else if r > g && r > b {
                    if brightness > 180 { Color::Red } else { Color::DarkRed }
                } else if g > r && g > b {
                    if brightness > 180 { Color::Green } else { Color::DarkGreen }
                } else if b > r && b > g {
                    if brightness > 180 { Color::Blue } else { Color::DarkBlue }
                } else if brightness > 180 {
                    Color::White
                } else {
                    Color::Grey
                }
            }
        }
    }
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("38;5;{}", v),
        Color::Black => "30".into(),
        Color::DarkRed => "31".into(),
        Color::DarkGreen => "32".into(),
        Color::DarkYellow => "33".into(),
        Color::DarkBlue => "34".into(),
        Color::DarkMagenta => "35".into(),
        Color::DarkCyan => "36".into(),
        Color::Grey => "37".into(),
        Color::DarkGrey => "90".into(),
        Color::Red => "91".into(),
        Color::Green => "92".into(),
        Color::Yellow => "93".into(),
        Color::Blue => "94".into(),
        Color::Magenta => "95".into(),
        Color::Cyan => "96".into(),
        Color::White => "97".into(),
        _ => "37".into(),
    }
}
