//! Braille dot canvas
//!
//! Each terminal cell holds a 2x4 block of dots, so the canvas resolution is
//! twice the column count by four times the row count. Logical coordinates
//! are multiplied by the pixel ratio before they hit the dot grid.

use crate::config::CanvasSize;
use crate::surface::Surface;
use crate::terminal::{colors, parse_color, Terminal};
use crossterm::style::Color;

const BRAILLE_BASE: u32 = 0x2800;

/// Dot bit for (column, row) within a braille cell
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

pub struct BrailleCanvas {
    dots_w: usize,
    dots_h: usize,
    /// Color of each lit dot, row major
    dots: Vec<Option<Color>>,
    scale: f64,
    line_width: f64,
    color: Color,
    path: Vec<(f64, f64)>,
}

impl BrailleCanvas {
    /// A canvas covering `cols` x `rows` terminal cells
    pub fn for_cells(cols: u16, rows: u16) -> Self {
        let mut canvas = Self {
            dots_w: 0,
            dots_h: 0,
            dots: Vec::new(),
            scale: 1.0,
            line_width: 1.0,
            color: colors::BRANCH,
            path: Vec::new(),
        };
        canvas.configure(
            CanvasSize::new(cols as f64 * 2.0, rows as f64 * 4.0),
            1.0,
        );
        canvas
    }

    /// Logical size that fills `cols` x `rows` cells at `pixel_ratio`
    pub fn logical_size(cols: u16, rows: u16, pixel_ratio: f64) -> CanvasSize {
        let ratio = usable_ratio(pixel_ratio);
        CanvasSize::new(cols as f64 * 2.0 / ratio, rows as f64 * 4.0 / ratio)
    }

    pub fn dot_size(&self) -> (usize, usize) {
        (self.dots_w, self.dots_h)
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        x < self.dots_w && y < self.dots_h && self.dots[y * self.dots_w + x].is_some()
    }

    pub fn lit_count(&self) -> usize {
        self.dots.iter().filter(|d| d.is_some()).count()
    }

    fn plot(&mut self, x: i64, y: i64) {
        let radius = self.stamp_radius();
        for oy in -radius..=radius {
            for ox in -radius..=radius {
                let (px, py) = (x + ox, y + oy);
                if px >= 0 && py >= 0 && (px as usize) < self.dots_w && (py as usize) < self.dots_h {
                    self.dots[py as usize * self.dots_w + px as usize] = Some(self.color);
                }
            }
        }
    }

    fn stamp_radius(&self) -> i64 {
        ((self.line_width - 1.0) / 2.0).max(0.0).round() as i64
    }

    /// Rasterize a segment given in dot space, clipped to the dot grid
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64)) {
        let margin = self.stamp_radius() as f64 + 1.0;
        let window = (
            -margin,
            -margin,
            self.dots_w as f64 + margin,
            self.dots_h as f64 + margin,
        );
        let Some((from, to)) = clip_segment(from, to, window) else {
            return;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = from.0 + dx * t;
            let y = from.1 + dy * t;
            self.plot(x.floor() as i64, y.floor() as i64);
        }
    }

    /// Copy the dots into terminal cells starting at (0, 0)
    pub fn blit(&self, term: &mut Terminal) {
        let cols = self.dots_w.div_ceil(2);
        let rows = self.dots_h.div_ceil(4);
        for row in 0..rows {
            for col in 0..cols {
                let mut bits = 0u8;
                let mut color = None;
                for (dx, column) in DOT_BITS.iter().enumerate() {
                    for (dy, bit) in column.iter().enumerate() {
                        let (x, y) = (col * 2 + dx, row * 4 + dy);
                        if x < self.dots_w && y < self.dots_h {
                            if let Some(c) = self.dots[y * self.dots_w + x] {
                                bits |= bit;
                                color = Some(c);
                            }
                        }
                    }
                }
                if bits != 0 {
                    let ch = char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' ');
                    term.set(col as i32, row as i32, ch, color, false);
                }
            }
        }
    }
}

/// Pixel ratios that are zero, negative or not finite fall back to 1
fn usable_ratio(pixel_ratio: f64) -> f64 {
    if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    }
}

fn dot_extent(logical: f64, scale: f64) -> usize {
    let dots = (logical * scale).ceil();
    if dots.is_finite() && dots > 0.0 {
        dots as usize
    } else {
        0
    }
}

/// Liang-Barsky clip of `from`-`to` against `(x0, y0, x1, y1)`
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    (x0, y0, x1, y1): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, from.0 - x0),
        (dx, x1 - from.0),
        (-dy, from.1 - y0),
        (dy, y1 - from.1),
    ] {
        if !p.is_finite() || !q.is_finite() {
            return None;
        }
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (from.0 + dx * t0, from.1 + dy * t0),
        (from.0 + dx * t1, from.1 + dy * t1),
    ))
}

impl Surface for BrailleCanvas {
    fn configure(&mut self, size: CanvasSize, pixel_ratio: f64) {
        let scale = usable_ratio(pixel_ratio);
        self.scale = scale;
        self.dots_w = dot_extent(size.width, scale);
        self.dots_h = dot_extent(size.height, scale);
        self.dots = vec![None; self.dots_w * self.dots_h];
        self.path.clear();
    }

    fn clear(&mut self) {
        self.dots.iter_mut().for_each(|d| *d = None);
        self.path.clear();
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.color = parse_color(color).unwrap_or(colors::BRANCH);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.clear();
        self.path.push((x * self.scale, y * self.scale));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push((x * self.scale, y * self.scale));
    }

    fn stroke(&mut self) {
        let path = std::mem::take(&mut self.path);
        for pair in path.windows(2) {
            self.draw_line(pair[0], pair[1]);
        }
    }
}
