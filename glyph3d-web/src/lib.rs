/// glyph3d Web - WASM bindings drawing onto a 2D canvas
///
/// `WebScene` wraps the wireframe letter scene and `WebChart` the function bar
/// chart. Both hand flat number arrays to JavaScript and can paint themselves
/// onto a `<canvas>` by id.
use glyph3d_core::chart::{ChartFrame, Rect};
use glyph3d_core::{AppConfig, Chart, Scene, SceneError, Segment, ShapeId};
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const WIREFRAME_COLOR: &str = "#202020";
const ZERO_LINE_COLOR: &str = "#000000";
const TICK_COLOR: &str = "#c0c0c0";
/// Margin around the chart plot, in canvas pixels
const CHART_MARGIN: f64 = 40.0;

fn scene_error(err: SceneError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn context_2d(canvas_id: &str) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{canvas_id}'")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((canvas, context))
}

/// `[x1, y1, x2, y2, ...]` for every segment
fn flatten_segments(segments: &[Segment]) -> Vec<f64> {
    segments
        .iter()
        .flat_map(|s| [s.start.x, s.start.y, s.end.x, s.end.y])
        .collect()
}

/// `[x, y, width, height, r, g, b, ...]` for every bar
fn flatten_bars(frame: &ChartFrame) -> Vec<f64> {
    frame
        .bars
        .iter()
        .flat_map(|bar| {
            [
                bar.rect.x,
                bar.rect.y,
                bar.rect.width,
                bar.rect.height,
                bar.color.r as f64,
                bar.color.g as f64,
                bar.color.b as f64,
            ]
        })
        .collect()
}

fn plot_area(width: f64, height: f64) -> Rect {
    Rect::new(
        CHART_MARGIN,
        CHART_MARGIN,
        (width - 2.0 * CHART_MARGIN).max(0.0),
        (height - 2.0 * CHART_MARGIN).max(0.0),
    )
}

#[wasm_bindgen]
pub struct WebScene {
    scene: Scene,
}

#[wasm_bindgen]
impl WebScene {
    /// Default two-letter scene sized to the canvas.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> WebScene {
        let mut scene = Scene::from_config(&AppConfig::default().viewer);
        scene.set_viewport(width, height);
        WebScene { scene }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.scene.set_viewport(width, height);
    }

    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.scene.camera_rotate(dx, dy);
    }

    pub fn zoom(&mut self, wheel_delta_y: f64) {
        self.scene.camera_zoom(wheel_delta_y);
    }

    pub fn reset(&mut self) {
        self.scene.camera_reset();
    }

    #[wasm_bindgen(js_name = setShapeDimensions)]
    pub fn set_shape_dimensions(&mut self, shape: usize, width: f64, height: f64, depth: f64) -> Result<(), JsValue> {
        self.scene
            .set_shape_dimensions(ShapeId(shape), width, height, depth)
            .map_err(scene_error)
    }

    #[wasm_bindgen(js_name = resetShape)]
    pub fn reset_shape(&mut self, shape: usize) -> Result<(), JsValue> {
        self.scene.shape_reset(ShapeId(shape)).map_err(scene_error)
    }

    #[wasm_bindgen(js_name = setShowAxes)]
    pub fn set_show_axes(&mut self, show: bool) {
        self.scene.show_axes = show;
    }

    /// Projected edges as `[x1, y1, x2, y2, ...]`
    #[wasm_bindgen(js_name = renderFrame)]
    pub fn render_frame(&self) -> Vec<f64> {
        flatten_segments(&self.scene.render_frame())
    }

    /// Clear the canvas and stroke the axes gizmo and every edge.
    pub fn draw(&self, canvas_id: &str) -> Result<(), JsValue> {
        let (canvas, context) = context_2d(canvas_id)?;
        context.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);

        for axis in self.scene.render_axes() {
            let [r, g, b] = axis.color;
            #[allow(deprecated)]
            context.set_stroke_style(&JsValue::from_str(&format!("rgb({r},{g},{b})")));
            context.begin_path();
            context.move_to(axis.segment.start.x, axis.segment.start.y);
            context.line_to(axis.segment.end.x, axis.segment.end.y);
            context.stroke();
            context.fill_text(&axis.label.to_string(), axis.segment.end.x, axis.segment.end.y)?;
        }

        let segments = self.scene.render_frame();
        #[allow(deprecated)]
        context.set_stroke_style(&JsValue::from_str(WIREFRAME_COLOR));
        context.begin_path();
        for segment in &segments {
            context.move_to(segment.start.x, segment.start.y);
            context.line_to(segment.end.x, segment.end.y);
        }
        context.stroke();
        debug!("drew {} segments on '{canvas_id}'", segments.len());
        Ok(())
    }
}

#[wasm_bindgen]
pub struct WebChart {
    chart: Chart,
}

#[wasm_bindgen]
impl WebChart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebChart {
        WebChart {
            chart: Chart::default(),
        }
    }

    #[wasm_bindgen(js_name = setPoints)]
    pub fn set_points(&mut self, text: &str) {
        self.chart.set_sample_points(text);
    }

    #[wasm_bindgen(js_name = setStep)]
    pub fn set_step(&mut self, text: &str) {
        self.chart.set_y_step(text);
    }

    pub fn step(&self) -> f64 {
        self.chart.step()
    }

    /// `[max, min]` of the Y axis
    pub fn bounds(&self) -> Vec<f64> {
        let bounds = self.chart.bounds();
        vec![bounds.max, bounds.min]
    }

    /// Bars for a canvas of the given size as `[x, y, w, h, r, g, b, ...]`
    pub fn bars(&self, width: f64, height: f64) -> Vec<f64> {
        flatten_bars(&self.chart.layout(plot_area(width, height)))
    }

    pub fn draw(&self, canvas_id: &str) -> Result<(), JsValue> {
        let (canvas, context) = context_2d(canvas_id)?;
        let (width, height) = (canvas.width() as f64, canvas.height() as f64);
        context.clear_rect(0.0, 0.0, width, height);
        let frame = self.chart.layout(plot_area(width, height));
        let plot = frame.plot;

        #[allow(deprecated)]
        context.set_stroke_style(&JsValue::from_str(TICK_COLOR));
        for tick in &frame.ticks {
            context.begin_path();
            context.move_to(plot.x, tick.y);
            context.line_to(plot.right(), tick.y);
            context.stroke();
            context.fill_text(&tick.label, 4.0, tick.y)?;
        }

        for bar in &frame.bars {
            let c = bar.color;
            #[allow(deprecated)]
            context.set_fill_style(&JsValue::from_str(&format!("rgb({},{},{})", c.r, c.g, c.b)));
            context.fill_rect(bar.rect.x, bar.rect.y, bar.rect.width, bar.rect.height);
        }

        #[allow(deprecated)]
        context.set_stroke_style(&JsValue::from_str(ZERO_LINE_COLOR));
        context.begin_path();
        context.move_to(plot.x, frame.zero_line_y);
        context.line_to(plot.right(), frame.zero_line_y);
        context.stroke();

        #[allow(deprecated)]
        context.set_fill_style(&JsValue::from_str(ZERO_LINE_COLOR));
        for label in &frame.point_labels {
            context.fill_text(&label.label, label.x, plot.bottom() + CHART_MARGIN / 2.0)?;
        }
        Ok(())
    }
}

impl Default for WebChart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_frame_is_flat_quads() {
        let scene = WebScene::new(800.0, 600.0);
        let frame = scene.render_frame();
        // 36 + 60 edges, four numbers each
        assert_eq!(frame.len(), 96 * 4);
    }

    #[test]
    fn test_scene_controls() {
        let mut scene = WebScene::new(800.0, 600.0);
        let before = scene.render_frame();
        scene.rotate(30.0, 10.0);
        scene.set_shape_dimensions(0, 10.0, 10.0, 10.0).unwrap();
        assert_ne!(scene.render_frame(), before);

        scene.reset();
        scene.reset_shape(0).unwrap();
        assert_eq!(scene.render_frame(), before);
    }

    #[test]
    fn test_chart_bars() {
        let mut chart = WebChart::new();
        chart.set_points("1");
        chart.set_step("1");
        let bars = chart.bars(480.0, 280.0);
        // sin, 4/(1-x) is undefined at 1, x^2 - 3, sqrt
        assert_eq!(bars.len(), 3 * 7);
        assert_eq!(chart.bounds(), vec![10.0, -10.0]);
    }
}
