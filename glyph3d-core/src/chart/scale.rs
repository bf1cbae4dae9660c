/// Function evaluation over sample points and adaptive Y-axis scaling
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::expr::{eval_const_str, Expr, ExprError};
use super::FunctionSpec;

/// Sample points used when the user's list yields nothing.
pub const DEFAULT_POINTS: [f64; 3] = [1.0, 2.0, 3.0];

/// Step used when the step text is not a positive number.
pub const DEFAULT_STEP: f64 = 1.0;

/// Slack for values that land a rounding error past a step multiple.
const ROUND_EPSILON: f64 = 1e-9;

/// Evaluated values, one row per point and one column per function.
/// `None` marks a cell whose evaluation failed.
pub type ResultGrid = Vec<Vec<Option<f64>>>;

/// How step-rounded bounds are widened before drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Keep at least `limit` above and `-limit` below the zero line.
    Floor { limit: f64 },
    /// Use the rounded sums as they are.
    StepRounded,
    /// When both bounds are zero, use one step above and below.
    NonZeroStep,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        BoundsPolicy::Floor { limit: 10.0 }
    }
}

/// Visible value range of the Y axis; `min <= 0 <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub max: f64,
    pub min: f64,
}

impl AxisBounds {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Half of [`span`](Self::span), finite even when the span itself overflows.
    pub fn half_span(&self) -> f64 {
        self.max / 2.0 - self.min / 2.0
    }
}

/// Evaluate every function at every point.
pub fn evaluate(points: &[f64], functions: &[FunctionSpec]) -> ResultGrid {
    let compiled: Vec<_> = functions
        .iter()
        .map(|f| Expr::parse(&f.expression))
        .collect();
    evaluate_compiled(points, &compiled)
}

pub(crate) fn evaluate_compiled(points: &[f64], functions: &[Result<Expr, ExprError>]) -> ResultGrid {
    points
        .iter()
        .map(|&x| {
            functions
                .iter()
                .map(|compiled| {
                    let value = compiled.as_ref().map_err(Clone::clone).and_then(|e| e.eval_at(x));
                    match value {
                        Ok(value) => Some(value),
                        Err(err) => {
                            debug!("undefined at x = {x}: {err}");
                            None
                        }
                    }
                })
                .collect()
        })
        .collect()
}

fn round_up(value: f64, step: f64) -> f64 {
    ((value / step - ROUND_EPSILON).ceil() * step).max(value)
}

fn round_down(value: f64, step: f64) -> f64 {
    ((value / step + ROUND_EPSILON).floor() * step).min(value)
}

/// Derive axis bounds from the per-point sums of positive and non-positive values.
pub fn compute_bounds(results: &[Vec<Option<f64>>], step: f64, policy: BoundsPolicy) -> AxisBounds {
    let step = if step.is_finite() && step > 0.0 { step } else { DEFAULT_STEP };

    let mut max_val: Option<f64> = None;
    let mut min_val: Option<f64> = None;
    for row in results {
        let mut positive = 0.0;
        let mut negative = 0.0;
        for value in row.iter().flatten() {
            if *value > 0.0 {
                positive += value;
            } else {
                negative += value;
            }
        }
        if positive > 0.0 {
            max_val = Some(max_val.map_or(positive, |m: f64| m.max(positive)));
        }
        if negative < 0.0 {
            min_val = Some(min_val.map_or(negative, |m: f64| m.min(negative)));
        }
    }

    let mut max = max_val.map_or(0.0, |v| round_up(v, step));
    let mut min = min_val.map_or(0.0, |v| round_down(v, step));

    match policy {
        BoundsPolicy::Floor { limit } => {
            max = max.max(limit);
            min = min.min(-limit);
        }
        BoundsPolicy::StepRounded => {}
        BoundsPolicy::NonZeroStep => {
            if max == 0.0 && min == 0.0 {
                max = step;
                min = -step;
            }
        }
    }

    // Sums past f64::MAX overflow to infinity
    AxisBounds {
        max: max.min(f64::MAX),
        min: min.max(-f64::MAX),
    }
}

/// Bar length in pixels for a value on a plot of the given height.
pub fn value_to_pixel_offset(value: f64, bounds: &AxisBounds, plot_height: f64) -> f64 {
    let half_span = bounds.half_span();
    if half_span == 0.0 {
        return 0.0;
    }
    plot_height * (value.abs() / 2.0 / half_span)
}

/// Distance of the zero line from the top of the plot.
///
/// Sits at the bottom when nothing is negative and at the top when nothing is
/// positive. A zero-height range puts it in the middle.
pub fn zero_line_offset(bounds: &AxisBounds, plot_height: f64) -> f64 {
    let half_span = bounds.half_span();
    if half_span == 0.0 {
        return plot_height / 2.0;
    }
    (plot_height * (bounds.max / 2.0 / half_span)).clamp(0.0, plot_height)
}

/// Parse a comma-separated list of constant expressions (`1, pi/2, 2*e`).
///
/// Tokens that do not evaluate are skipped; an empty result falls back to
/// [`DEFAULT_POINTS`].
pub fn parse_sample_points(text: &str) -> Vec<f64> {
    let points: Vec<f64> = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match eval_const_str(token) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("skipping sample point {token:?}: {err}");
                None
            }
        })
        .collect();

    if points.is_empty() {
        warn!("no usable sample points in {text:?}, using defaults");
        DEFAULT_POINTS.to_vec()
    } else {
        points
    }
}

/// Parse the Y step; anything but a positive number gives [`DEFAULT_STEP`].
pub fn parse_step(text: &str) -> f64 {
    match eval_const_str(text.trim()) {
        Ok(step) if step > 0.0 => step,
        Ok(step) => {
            warn!("step must be positive, got {step}; using {DEFAULT_STEP}");
            DEFAULT_STEP
        }
        Err(err) => {
            warn!("invalid step {text:?} ({err}); using {DEFAULT_STEP}");
            DEFAULT_STEP
        }
    }
}
