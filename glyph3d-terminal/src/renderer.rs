/// Character-cell canvas for wireframe segments and chart bars
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use glyph3d_core::chart::{ChartFrame, Rect, Rgb};
use glyph3d_core::scene::{AxisSegment, Segment};
use glyph3d_core::Viewport;
use nalgebra::Point2;
use std::io::Write;

/// Virtual pixels covered by one terminal cell
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Columns kept free on the left of the chart for tick labels
const LABEL_COLUMNS: usize = 7;

/// ASCII canvas addressed in virtual pixels and stored per cell
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel-space viewport matching the canvas
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.width as f64 * CELL_WIDTH_PX,
            self.height as f64 * CELL_HEIGHT_PX,
        )
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<char> {
        (column < self.width && row < self.height).then(|| self.char_buffer[row * self.width + column])
    }

    fn put(&mut self, column: i64, row: i64, character: char, color: Color) {
        if column < 0 || row < 0 || column as usize >= self.width || row as usize >= self.height {
            return;
        }
        let idx = row as usize * self.width + column as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    pub fn draw_segments(&mut self, segments: &[Segment], color: Color) {
        for segment in segments {
            self.draw_segment(segment, color);
        }
    }

    pub fn draw_axes(&mut self, axes: &[AxisSegment]) {
        for axis in axes {
            let [r, g, b] = axis.color;
            let color = Color::Rgb { r, g, b };
            self.draw_segment(&axis.segment, color);
            let (column, row) = to_cell(axis.segment.end);
            self.put(column.round() as i64, row.round() as i64, axis.label, color);
        }
    }

    /// Rasterize one segment with Bresenham's algorithm over the part inside the canvas.
    pub fn draw_segment(&mut self, segment: &Segment, color: Color) {
        let (x0, y0) = to_cell(segment.start);
        let (x1, y1) = to_cell(segment.end);
        let max_x = self.width as f64 - 1.0;
        let max_y = self.height as f64 - 1.0;
        let Some((x0, y0, x1, y1)) = clip_line(x0, y0, x1, y1, max_x, max_y) else {
            return;
        };

        let character = line_char(x1 - x0, y1 - y0);
        let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
        let (end_x, end_y) = (x1.round() as i64, y1.round() as i64);
        let dx = (end_x - x).abs();
        let dy = -(end_y - y).abs();
        let sx = if x < end_x { 1 } else { -1 };
        let sy = if y < end_y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put(x, y, character, color);
            if x == end_x && y == end_y {
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

    /// Fill every cell whose centre lies inside a pixel-space rectangle.
    pub fn fill_rect(&mut self, rect: &Rect, character: char, color: Color) {
        let first_column = (rect.x / CELL_WIDTH_PX).floor().max(0.0) as usize;
        let last_column = ((rect.right() / CELL_WIDTH_PX).ceil().max(0.0) as usize).min(self.width);
        let first_row = (rect.y / CELL_HEIGHT_PX).floor().max(0.0) as usize;
        let last_row = ((rect.bottom() / CELL_HEIGHT_PX).ceil().max(0.0) as usize).min(self.height);

        for row in first_row..last_row {
            let centre_y = (row as f64 + 0.5) * CELL_HEIGHT_PX;
            if centre_y < rect.y || centre_y > rect.bottom() {
                continue;
            }
            for column in first_column..last_column {
                let centre_x = (column as f64 + 0.5) * CELL_WIDTH_PX;
                if centre_x >= rect.x && centre_x <= rect.right() {
                    self.put(column as i64, row as i64, character, color);
                }
            }
        }
    }

    pub fn draw_text(&mut self, column: usize, row: usize, text: &str, color: Color) {
        for (offset, character) in text.chars().enumerate() {
            self.put((column + offset) as i64, row as i64, character, color);
        }
    }

    /// Plot area for charts, leaving room for labels on the left and bottom
    pub fn chart_plot(&self) -> Rect {
        let columns = self.width.saturating_sub(LABEL_COLUMNS + 1) as f64;
        let rows = self.height.saturating_sub(3) as f64;
        Rect::new(
            LABEL_COLUMNS as f64 * CELL_WIDTH_PX,
            CELL_HEIGHT_PX,
            columns * CELL_WIDTH_PX,
            rows * CELL_HEIGHT_PX,
        )
    }

    pub fn render_chart(&mut self, frame: &ChartFrame) {
        let plot = frame.plot;
        let first_column = (plot.x / CELL_WIDTH_PX) as usize;
        let last_column = (plot.right() / CELL_WIDTH_PX) as usize;

        for tick in &frame.ticks {
            let row = (tick.y / CELL_HEIGHT_PX).floor().max(0.0) as usize;
            let label = format!("{:>width$}", tick.label, width = LABEL_COLUMNS - 1);
            self.draw_text(0, row, &label, Color::DarkGrey);
            for column in first_column..last_column {
                self.put(column as i64, row as i64, '·', Color::DarkGrey);
            }
        }

        for bar in &frame.bars {
            let Rgb { r, g, b } = bar.color;
            self.fill_rect(&bar.rect, '█', Color::Rgb { r, g, b });
        }

        let zero_row = (frame.zero_line_y / CELL_HEIGHT_PX).floor().max(0.0) as usize;
        for column in first_column..last_column {
            self.put(column as i64, zero_row as i64, '─', Color::White);
        }

        let label_row = (plot.bottom() / CELL_HEIGHT_PX).ceil() as usize;
        for label in &frame.point_labels {
            let column = (label.x / CELL_WIDTH_PX) as usize;
            let start = column.saturating_sub(label.label.chars().count() / 2);
            self.draw_text(start, label_row, &label.label, Color::Grey);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_cell(point: Point2<f64>) -> (f64, f64) {
    (point.x / CELL_WIDTH_PX, point.y / CELL_HEIGHT_PX)
}

/// Glyph that best follows a line's direction (screen y grows downwards)
fn line_char(dx: f64, dy: f64) -> char {
    // Cells are about twice as tall as wide
    let (ax, ay) = (dx.abs(), dy.abs() * 2.0);
    if ax > ay * 2.0 {
        '-'
    } else if ay > ax * 2.0 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Liang-Barsky clipping against `[0, max_x] x [0, max_y]`
fn clip_line(x0: f64, y0: f64, x1: f64, y1: f64, max_x: f64, max_y: f64) -> Option<(f64, f64, f64, f64)> {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn test_horizontal_segment() {
        let mut renderer = AsciiRenderer::new(10, 4);
        renderer.draw_segment(&segment(0.0, 16.0, 72.0, 16.0), Color::White);
        for column in 0..10 {
            assert_eq!(renderer.cell(column, 1), Some('-'));
        }
        assert_eq!(renderer.cell(0, 0), Some(' '));
    }

    #[test]
    fn test_segment_outside_is_skipped() {
        let mut renderer = AsciiRenderer::new(10, 4);
        renderer.draw_segment(&segment(-500.0, -500.0, -100.0, -20.0), Color::White);
        assert!(renderer.char_buffer.iter().all(|&c| c == ' '));
    }

    #[test]
    fn test_long_segment_is_clipped() {
        let mut renderer = AsciiRenderer::new(10, 4);
        renderer.draw_segment(&segment(-1e9, 32.0, 1e9, 32.0), Color::White);
        assert_eq!(renderer.cell(5, 2), Some('-'));
    }

    #[test]
    fn test_clip_line() {
        assert_eq!(clip_line(-5.0, 1.0, 5.0, 1.0, 3.0, 3.0), Some((0.0, 1.0, 3.0, 1.0)));
        assert_eq!(clip_line(-5.0, -1.0, -1.0, -1.0, 3.0, 3.0), None);
    }

    #[test]
    fn test_fill_rect() {
        let mut renderer = AsciiRenderer::new(10, 4);
        renderer.fill_rect(&Rect::new(8.0, 16.0, 16.0, 32.0), '#', Color::Red);
        assert_eq!(renderer.cell(1, 1), Some('#'));
        assert_eq!(renderer.cell(2, 2), Some('#'));
        assert_eq!(renderer.cell(3, 1), Some(' '));
        assert_eq!(renderer.cell(0, 1), Some(' '));
    }

    #[test]
    fn test_viewport_in_pixels() {
        let renderer = AsciiRenderer::new(100, 30);
        assert_eq!(renderer.viewport(), Viewport::new(800.0, 480.0));
    }
}
