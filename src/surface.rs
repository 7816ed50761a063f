/// Display surface — the drawing primitives a frontend must offer.
///
/// The simulation never draws; a frontend walks the `GameState` and issues
/// these calls. `Canvas` is an in-memory implementation that rasterizes into
/// an RGB buffer and clips everything to its bounds.

use crate::entities::Color;

pub trait Surface {
    /// Pixel dimensions, fixed for the surface's lifetime.
    fn size(&self) -> (u16, u16);
    fn set_color(&mut self, color: Color);
    /// Fill the whole surface with the current colour.
    fn clear(&mut self);
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn rectangle(&mut self, x: i32, y: i32, width: i32, height: i32);
    /// Filled circle.
    fn circle(&mut self, x: i32, y: i32, radius: i32);
    /// Filled triangle.
    fn triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32));
    fn text(&mut self, text: &str, x: i32, y: i32, scale: u8);
}

/// Text queued on a canvas; pixels carry no font, so the frontend lays
/// these over the presented image.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub scale: u8,
    pub color: Color,
}

#[derive(Clone, Debug)]
pub struct Canvas {
    width: u16,
    height: u16,
    pixels: Vec<Color>,
    pen: Color,
    texts: Vec<TextRun>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; usize::from(width) * usize::from(height)],
            pen: Color::WHITE,
            texts: Vec::new(),
        }
    }

    /// Colour at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(y as usize * usize::from(self.width) + x as usize)
    }

    fn plot(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = self.pen;
        }
    }

    fn span(&mut self, y: i32, x0: i32, x1: i32) {
        if y < 0 || y >= i32::from(self.height) {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(i32::from(self.width) - 1);
        for x in x0..=x1 {
            self.plot(x, y);
        }
    }
}

fn edge(a: (i32, i32), b: (i32, i32), p: (i32, i32)) -> i64 {
    i64::from(b.0 - a.0) * i64::from(p.1 - a.1) - i64::from(b.1 - a.1) * i64::from(p.0 - a.0)
}

impl Surface for Canvas {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn set_color(&mut self, color: Color) {
        self.pen = color;
    }

    fn clear(&mut self) {
        self.pixels.fill(self.pen);
        self.texts.clear();
    }

    // Bresenham
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) {
        // Negative extents grow the other way.
        let (x0, x1) = if width < 0 { (x + width, x) } else { (x, x + width) };
        let (y0, y1) = if height < 0 { (y + height, y) } else { (y, y + height) };
        for row in y0.max(0)..y1.min(i32::from(self.height)) {
            self.span(row, x0, x1 - 1);
        }
    }

    fn circle(&mut self, x: i32, y: i32, radius: i32) {
        if radius < 0 {
            return;
        }
        let r2 = i64::from(radius) * i64::from(radius);
        let top = (-radius).max(-y);
        let bottom = radius.min(i32::from(self.height) - 1 - y);
        for dy in top..=bottom {
            let half = ((r2 - i64::from(dy) * i64::from(dy)) as f64).sqrt() as i32;
            self.span(y + dy, x - half, x + half);
        }
    }

    fn triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32)) {
        let min_x = a.0.min(b.0).min(c.0).max(0);
        let max_x = a.0.max(b.0).max(c.0).min(i32::from(self.width) - 1);
        let min_y = a.1.min(b.1).min(c.1).max(0);
        let max_y = a.1.max(b.1).max(c.1).min(i32::from(self.height) - 1);
        let area = edge(a, b, c);
        if area == 0 {
            self.line(a.0, a.1, b.0, b.1);
            self.line(b.0, b.1, c.0, c.1);
            return;
        }
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x, y);
                let (w0, w1, w2) = (edge(b, c, p), edge(c, a, p), edge(a, b, p));
                let inside = if area > 0 {
                    w0 >= 0 && w1 >= 0 && w2 >= 0
                } else {
                    w0 <= 0 && w1 <= 0 && w2 <= 0
                };
                if inside {
                    self.plot(x, y);
                }
            }
        }
    }

    fn text(&mut self, text: &str, x: i32, y: i32, scale: u8) {
        self.texts.push(TextRun {
            text: text.to_string(),
            x,
            y,
            scale,
            color: self.pen,
        });
    }
}
