/// Function bar chart: sample points, a family of functions and their scaled bars
use serde::{Deserialize, Serialize};

pub mod expr;
pub mod layout;
pub mod scale;

use crate::config::ChartConfig;
use expr::{Expr, ExprError};

pub use layout::{format_value, Bar, ChartFrame, IsometricBar, PointLabel, Rect, Tick};
pub use scale::{
    compute_bounds, evaluate, parse_sample_points, parse_step, value_to_pixel_offset,
    zero_line_offset, AxisBounds, BoundsPolicy, ResultGrid, DEFAULT_POINTS, DEFAULT_STEP,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A plotted function: its expression in `x`, bar colour and legend name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub expression: String,
    pub color: Rgb,
    pub name: String,
}

impl FunctionSpec {
    pub fn new(expression: impl Into<String>, color: Rgb, name: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            color,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledFunction {
    spec: FunctionSpec,
    expr: Result<Expr, ExprError>,
}

/// Chart state owned by the control surface
#[derive(Debug, Clone)]
pub struct Chart {
    points: Vec<f64>,
    functions: Vec<CompiledFunction>,
    step: f64,
    pub policy: BoundsPolicy,
}

impl Chart {
    pub fn new(functions: Vec<FunctionSpec>, policy: BoundsPolicy) -> Self {
        let functions = functions
            .into_iter()
            .map(|spec| CompiledFunction {
                expr: Expr::parse(&spec.expression),
                spec,
            })
            .collect();
        Self {
            points: DEFAULT_POINTS.to_vec(),
            functions,
            step: DEFAULT_STEP,
            policy,
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        let mut chart = Self::new(config.functions.clone(), config.policy);
        chart.set_sample_points(&config.points);
        chart.set_y_step(&config.step);
        chart
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> + '_ {
        self.functions.iter().map(|f| &f.spec)
    }

    /// Replace the sample points from user text, see [`parse_sample_points`].
    pub fn set_sample_points(&mut self, text: &str) {
        self.points = parse_sample_points(text);
    }

    /// Replace the Y step from user text, see [`parse_step`].
    pub fn set_y_step(&mut self, text: &str) {
        self.step = parse_step(text);
    }

    /// Set the Y step directly; non-positive values fall back to [`DEFAULT_STEP`].
    pub fn set_step(&mut self, step: f64) {
        self.step = if step.is_finite() && step > 0.0 { step } else { DEFAULT_STEP };
    }

    pub fn results(&self) -> ResultGrid {
        let compiled: Vec<_> = self.functions.iter().map(|f| f.expr.clone()).collect();
        scale::evaluate_compiled(&self.points, &compiled)
    }

    pub fn bounds(&self) -> AxisBounds {
        self.bounds_for(&self.results())
    }

    fn bounds_for(&self, results: &ResultGrid) -> AxisBounds {
        compute_bounds(results, self.step, self.policy)
    }

    /// Bars, ticks and labels for a plot area in screen pixels.
    pub fn layout(&self, plot: Rect) -> ChartFrame {
        layout::layout(self, plot)
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}
