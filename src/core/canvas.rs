/// 2D drawing operations for canvas. Coordinates are in pixels and may
/// fall partly or fully outside the canvas; everything is clipped.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Fill entire canvas with color (r, g, b, a)
    Clear(u8, u8, u8, u8),

    /// Draw filled axis-aligned ellipse centred at (cx, cy)
    FilledEllipse { cx: f32, cy: f32, rx: f32, ry: f32, r: u8, g: u8, b: u8, a: u8 },

    /// Draw filled simple polygon (trunk silhouettes, leaf quads)
    Polygon { points: Vec<(f32, f32)>, r: u8, g: u8, b: u8, a: u8 },
}

impl DrawOp {
    pub fn circle(cx: f32, cy: f32, radius: f32, [r, g, b, a]: [u8; 4]) -> Self {
        DrawOp::FilledEllipse { cx, cy, rx: radius, ry: radius, r, g, b, a }
    }

    pub fn ellipse(cx: f32, cy: f32, rx: f32, ry: f32, [r, g, b, a]: [u8; 4]) -> Self {
        DrawOp::FilledEllipse { cx, cy, rx, ry, r, g, b, a }
    }

    pub fn polygon(points: Vec<(f32, f32)>, [r, g, b, a]: [u8; 4]) -> Self {
        DrawOp::Polygon { points, r, g, b, a }
    }
}

/// Canvas state - RGBA pixel buffer with pending draw operations.
/// Operations are composited source-over in submission order.
#[derive(Clone)]
pub struct Canvas {
    /// RGBA pixel buffer
    pixels: Vec<u8>,
    /// Pending draw operations
    operations: Vec<DrawOp>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Create new canvas with dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            operations: Vec::new(),
            width,
            height,
        }
    }

    /// Add draw operation - builder style
    pub fn draw(mut self, op: DrawOp) -> Self {
        self.operations.push(op);
        self
    }

    /// Queue a draw operation
    pub fn push(&mut self, op: DrawOp) {
        self.operations.push(op);
    }

    pub fn pending(&self) -> usize {
        self.operations.len()
    }

    /// Execute all pending operations
    pub fn execute_ops(mut self) -> Self {
        self.flush();
        self
    }

    /// Execute and drain pending operations in place
    pub fn flush(&mut self) {
        let operations = std::mem::take(&mut self.operations);
        for op in &operations {
            self.execute_op(op);
        }
    }

    /// Reallocate for a new size. Contents are cleared; zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width * height * 4) as usize];
        self.operations.clear();
    }

    fn execute_op(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Clear(r, g, b, a) => self.clear([*r, *g, *b, *a]),
            DrawOp::FilledEllipse { cx, cy, rx, ry, r, g, b, a } => {
                self.fill_ellipse(*cx, *cy, *rx, *ry, [*r, *g, *b, *a])
            }
            DrawOp::Polygon { points, r, g, b, a } => self.fill_polygon(points, [*r, *g, *b, *a]),
        }
    }

    fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Source-over blend of one pixel
    fn blend_pixel(&mut self, x: i32, y: i32, [r, g, b, a]: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let dst = &mut self.pixels[idx..idx + 4];
        if a == 255 {
            dst.copy_from_slice(&[r, g, b, 255]);
            return;
        }
        let sa = a as f32 / 255.0;
        let mix = |s: u8, d: u8| (s as f32 * sa + d as f32 * (1.0 - sa)).round() as u8;
        dst[0] = mix(r, dst[0]);
        dst[1] = mix(g, dst[1]);
        dst[2] = mix(b, dst[2]);
        dst[3] = (a as f32 + dst[3] as f32 * (1.0 - sa)).round() as u8;
    }

    /// Covers pixels whose centres lie inside the ellipse
    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: [u8; 4]) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let y0 = ((cy - ry).floor() as i32).max(0);
        let y1 = ((cy + ry).ceil() as i32).min(self.height as i32 - 1);
        for py in y0..=y1 {
            let dy = (py as f32 + 0.5 - cy) / ry;
            let span = 1.0 - dy * dy;
            if span < 0.0 {
                continue;
            }
            let half = rx * span.sqrt();
            let x0 = ((cx - half - 0.5).ceil() as i32).max(0);
            let x1 = ((cx + half - 0.5).floor() as i32).min(self.width as i32 - 1);
            for px in x0..=x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Scanline fill with even-odd rule, sampled at pixel centres
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: [u8; 4]) {
        if points.len() < 3 {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
        let y0 = (min_y.floor() as i32).max(0);
        let y1 = (max_y.ceil() as i32).min(self.height as i32 - 1);

        let mut crossings = Vec::with_capacity(points.len());
        for py in y0..=y1 {
            let sy = py as f32 + 0.5;
            crossings.clear();
            for (i, &(ax, ay)) in points.iter().enumerate() {
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= sy) != (by <= sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x0 = ((pair[0] - 0.5).ceil() as i32).max(0);
                let x1 = ((pair[1] - 0.5).floor() as i32).min(self.width as i32 - 1);
                for px in x0..=x1 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    /// RGBA at (x, y), `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2], self.pixels[idx + 3]])
    }

    /// Get pixel buffer
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Get canvas dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_creation() {
        let canvas = Canvas::new(100, 100);
        assert_eq!(canvas.dimensions(), (100, 100));
        assert_eq!(canvas.pixels().len(), 100 * 100 * 4);
    }

    #[test]
    fn canvas_clear() {
        let canvas = Canvas::new(10, 10).draw(DrawOp::Clear(255, 0, 0, 255)).execute_ops();

        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(9, 9), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pending(), 0);
    }

    #[test]
    fn ellipse_respects_radii() {
        let canvas = Canvas::new(50, 50)
            .draw(DrawOp::Clear(0, 0, 0, 255))
            .draw(DrawOp::ellipse(25.0, 25.0, 10.0, 4.0, [9, 9, 9, 255]))
            .execute_ops();

        assert_eq!(canvas.pixel(25, 25), Some([9, 9, 9, 255]));
        assert_eq!(canvas.pixel(33, 25), Some([9, 9, 9, 255]));
        assert_eq!(canvas.pixel(25, 31), Some([0, 0, 0, 255]));
    }

    #[test]
    fn polygon_fills_interior_only() {
        let square = vec![(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0)];
        let canvas = Canvas::new(30, 30)
            .draw(DrawOp::Clear(0, 0, 0, 255))
            .draw(DrawOp::polygon(square, [0, 200, 0, 255]))
            .execute_ops();

        assert_eq!(canvas.pixel(10, 10), Some([0, 200, 0, 255]));
        assert_eq!(canvas.pixel(19, 19), Some([0, 200, 0, 255]));
        assert_eq!(canvas.pixel(20, 15), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(5, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn translucent_ops_blend_over_background() {
        let canvas = Canvas::new(4, 4)
            .draw(DrawOp::Clear(0, 0, 0, 255))
            .draw(DrawOp::circle(2.0, 2.0, 2.0, [255, 255, 255, 204]))
            .execute_ops();

        assert_eq!(canvas.pixel(2, 2), Some([204, 204, 204, 255]));
    }

    #[test]
    fn later_ops_paint_over_earlier() {
        let canvas = Canvas::new(50, 50)
            .draw(DrawOp::Clear(0, 0, 0, 255))
            .draw(DrawOp::circle(25.0, 25.0, 10.0, [255, 0, 0, 255]))
            .draw(DrawOp::circle(25.0, 25.0, 4.0, [0, 255, 0, 255]))
            .execute_ops();

        assert_eq!(canvas.pixel(25, 25), Some([0, 255, 0, 255]));
        assert_eq!(canvas.pixel(25, 17), Some([255, 0, 0, 255]));
    }

    #[test]
    fn canvas_bounds_checking() {
        let canvas = Canvas::new(10, 10)
            .draw(DrawOp::circle(-50.0, 200.0, 5.0, [255, 0, 0, 255]))
            .draw(DrawOp::polygon(vec![(-5.0, -5.0), (100.0, -5.0), (100.0, 2.0)], [1, 1, 1, 255]))
            .execute_ops();

        // Should not crash - everything clipped
        assert_eq!(canvas.pixels().len(), 10 * 10 * 4);
        assert_eq!(canvas.pixel(100, 100), None);
    }

    #[test]
    fn resize_ignores_zero_area() {
        let mut canvas = Canvas::new(8, 8);
        canvas.resize(0, 20);
        assert_eq!(canvas.dimensions(), (8, 8));
        canvas.resize(16, 4);
        assert_eq!(canvas.dimensions(), (16, 4));
        assert_eq!(canvas.pixels().len(), 16 * 4 * 4);
    }
}
