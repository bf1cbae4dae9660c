/// Pixel geometry of a chart frame: bars, ticks and labels
use log::warn;
use nalgebra::Point2;

use super::scale::{value_to_pixel_offset, zero_line_offset, AxisBounds};
use super::{Chart, Rgb};

/// Tick marks beyond this count are thinned out.
pub const MAX_TICKS: usize = 100;

/// Fraction of each point's slot left empty on either side of its bars.
const GROUP_PADDING: f64 = 0.1;

/// Axis-aligned rectangle in screen pixels (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Faces of a pseudo-3D bar, each a closed quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsometricBar {
    pub front: [Point2<f64>; 4],
    pub top: [Point2<f64>; 4],
    pub side: [Point2<f64>; 4],
}

/// One function value at one sample point
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub point_index: usize,
    pub function_index: usize,
    pub value: f64,
    pub color: Rgb,
    pub rect: Rect,
}

impl Bar {
    /// Extrude the bar backwards by `depth` pixels at 45 degrees, up and to the right.
    pub fn isometric_faces(&self, depth: f64) -> IsometricBar {
        let offset = depth * std::f64::consts::FRAC_1_SQRT_2;
        let r = &self.rect;
        let (left, right, top, bottom) = (r.x, r.right(), r.y, r.bottom());

        IsometricBar {
            front: [
                Point2::new(left, top),
                Point2::new(right, top),
                Point2::new(right, bottom),
                Point2::new(left, bottom),
            ],
            top: [
                Point2::new(left, top),
                Point2::new(right, top),
                Point2::new(right + offset, top - offset),
                Point2::new(left + offset, top - offset),
            ],
            side: [
                Point2::new(right, top),
                Point2::new(right + offset, top - offset),
                Point2::new(right + offset, bottom - offset),
                Point2::new(right, bottom),
            ],
        }
    }
}

/// Horizontal grid line at a multiple of the step
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

/// Caption under a point's bar group
#[derive(Debug, Clone, PartialEq)]
pub struct PointLabel {
    pub point_index: usize,
    pub x: f64,
    pub label: String,
}

/// Everything the paint layer needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub plot: Rect,
    pub bounds: AxisBounds,
    pub zero_line_y: f64,
    pub bars: Vec<Bar>,
    pub ticks: Vec<Tick>,
    pub point_labels: Vec<PointLabel>,
}

/// Short numeric label: integers without decimals, others with up to three.
pub fn format_value(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{:.0}", value.round() + 0.0);
    }
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub(crate) fn layout(chart: &Chart, plot: Rect) -> ChartFrame {
    let results = chart.results();
    let bounds = chart.bounds_for(&results);
    let zero_line_y = plot.y + zero_line_offset(&bounds, plot.height);

    let points = chart.points();
    let functions: Vec<_> = chart.functions().collect();
    let group_width = if points.is_empty() {
        0.0
    } else {
        plot.width / points.len() as f64
    };
    let bar_width = if functions.is_empty() {
        0.0
    } else {
        group_width * (1.0 - 2.0 * GROUP_PADDING) / functions.len() as f64
    };

    let mut bars = Vec::new();
    let mut point_labels = Vec::with_capacity(points.len());
    for (point_index, (x_value, row)) in points.iter().zip(&results).enumerate() {
        let group_left = plot.x + point_index as f64 * group_width;
        point_labels.push(PointLabel {
            point_index,
            x: group_left + group_width / 2.0,
            label: format_value(*x_value),
        });

        for (function_index, cell) in row.iter().enumerate() {
            let Some(value) = *cell else { continue };
            let length = value_to_pixel_offset(value, &bounds, plot.height);
            let top = if value > 0.0 { zero_line_y - length } else { zero_line_y };
            bars.push(Bar {
                point_index,
                function_index,
                value,
                color: functions[function_index].color,
                rect: Rect::new(
                    group_left + group_width * GROUP_PADDING + function_index as f64 * bar_width,
                    top,
                    bar_width,
                    length,
                ),
            });
        }
    }

    ChartFrame {
        plot,
        bounds,
        zero_line_y,
        bars,
        ticks: ticks(&bounds, chart.step(), &plot, zero_line_y),
        point_labels,
    }
}

fn ticks(bounds: &AxisBounds, step: f64, plot: &Rect, zero_line_y: f64) -> Vec<Tick> {
    let half_span = bounds.half_span();
    if !half_span.is_finite() || half_span <= 0.0 {
        return vec![tick(0.0, zero_line_y)];
    }
    let y_of = |value: f64| {
        let y = plot.y + plot.height * ((bounds.max / 2.0 - value / 2.0) / half_span);
        y.clamp(plot.y, plot.bottom())
    };

    let first = (bounds.min / step).round();
    let last = (bounds.max / step).round();
    if !first.is_finite() || !last.is_finite() {
        warn!("step {step} is too small for bounds {bounds:?}, drawing only the ends");
        let mut values = vec![bounds.min, 0.0, bounds.max];
        values.dedup();
        return values.into_iter().map(|value| tick(value, y_of(value))).collect();
    }

    let count = last - first + 1.0;
    let stride = (count / MAX_TICKS as f64).ceil().max(1.0);
    if stride > 1.0 {
        warn!("{count} ticks at step {step}, drawing every {stride}th");
    }
    let drawn = ((last - first) / stride).floor().clamp(0.0, MAX_TICKS as f64) as usize;

    (0..=drawn)
        .map(|k| {
            let value = (first + k as f64 * stride) * step;
            tick(value, y_of(value))
        })
        .collect()
}

fn tick(value: f64, y: f64) -> Tick {
    Tick {
        value,
        y,
        label: format_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(rect: Rect) -> Bar {
        Bar {
            point_index: 0,
            function_index: 0,
            value: 1.0,
            color: Rgb::new(1, 2, 3),
            rect,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(3.14159), "3.142");
        assert_eq!(format_value(-1.5), "-1.5");
    }

    #[test]
    fn test_isometric_faces() {
        let faces = bar(Rect::new(10.0, 20.0, 5.0, 30.0)).isometric_faces(2.0_f64.sqrt());
        assert_eq!(faces.front[2], Point2::new(15.0, 50.0));
        assert!((faces.top[2].x - 16.0).abs() < 1e-12);
        assert!((faces.top[2].y - 19.0).abs() < 1e-12);
        assert_eq!(faces.side[0], faces.top[1]);
        assert_eq!(faces.side[3], faces.front[2]);
    }

    #[test]
    fn test_ticks_cover_bounds() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = AxisBounds { max: 4.0, min: -2.0 };
        let ticks = ticks(&bounds, 2.0, &plot, 200.0 / 3.0);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![-2.0, 0.0, 2.0, 4.0]);
        assert_eq!(ticks[3].y, 0.0);
        assert_eq!(ticks[0].y, 100.0);
    }

    #[test]
    fn test_tiny_step_keeps_tick_count_bounded() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = AxisBounds { max: 10.0, min: -10.0 };
        for step in [1e-8, 1e-300] {
            let ticks = ticks(&bounds, step, &plot, 50.0);
            assert!(ticks.len() <= MAX_TICKS + 1);
            assert!((ticks[0].value + 10.0).abs() < 1e-6);
            assert!(ticks.iter().all(|t| t.y.is_finite() && (0.0..=100.0).contains(&t.y)));
        }
    }

    #[test]
    fn test_step_below_representable_range() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = AxisBounds { max: 1e300, min: -10.0 };
        let ticks = ticks(&bounds, 1e-300, &plot, 0.0);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![-10.0, 0.0, 1e300]);
        assert_eq!(ticks[2].y, 0.0);
    }

    #[test]
    fn test_ticks_are_thinned() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = AxisBounds { max: 1000.0, min: -1000.0 };
        let ticks = ticks(&bounds, 1.0, &plot, 50.0);
        assert!(ticks.len() <= MAX_TICKS + 1);
        assert_eq!(ticks[0].value, -1000.0);
    }
}
