/// Shapes with local transforms, one camera, and the per-frame render pass
use std::fmt;

use log::{debug, trace};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::config::{ShapeConfig, ViewerConfig};
use crate::geometry::{build_shape, Dimensions, Edge};
use crate::projection::{Camera, Viewport};
use crate::transform::{set_component, Axis, RotationState, Transform};

/// Length of each axis of the origin gizmo
pub const AXIS_LENGTH: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("no shape with id {0}")]
    UnknownShape(ShapeId),
}

/// Handle to a shape, valid for the scene that returned it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub usize);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot restored by [`Shape::reset`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDefaults {
    pub size: Dimensions,
    pub position: Vector3<f64>,
    pub rotation: RotationState,
}

/// A glyph wireframe with its own scale, rotation and position
#[derive(Debug, Clone)]
pub struct Shape {
    tag: char,
    edges: Vec<Edge>,
    size: Dimensions,
    pub position: Vector3<f64>,
    pub rotation: RotationState,
    pub scale: Vector3<f64>,
    defaults: ShapeDefaults,
}

impl Shape {
    pub fn new(tag: char, defaults: ShapeDefaults) -> Self {
        let mut shape = Self {
            tag,
            edges: Vec::new(),
            size: defaults.size,
            position: defaults.position,
            rotation: defaults.rotation,
            scale: Vector3::new(1.0, 1.0, 1.0),
            defaults,
        };
        shape.rebuild();
        shape
    }

    pub fn from_config(config: &ShapeConfig) -> Self {
        Self::new(
            config.tag,
            ShapeDefaults {
                size: config.size,
                position: config.position,
                rotation: config.rotation,
            },
        )
    }

    pub fn tag(&self) -> char {
        self.tag
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    pub fn defaults(&self) -> &ShapeDefaults {
        &self.defaults
    }

    /// Change the dimensions and rebuild every edge from them.
    pub fn set_size(&mut self, width: f64, height: f64, depth: f64) {
        self.size = Dimensions::new(width, height, depth);
        self.rebuild();
    }

    pub fn set_dimension(&mut self, axis: Axis, value: f64) {
        let mut size = self.size;
        match axis {
            Axis::X => size.width = value,
            Axis::Y => size.height = value,
            Axis::Z => size.depth = value,
        }
        self.set_size(size.width, size.height, size.depth);
    }

    pub fn set_position(&mut self, axis: Axis, value: f64) {
        set_component(&mut self.position, axis, value);
    }

    pub fn set_rotation(&mut self, axis: Axis, degrees: f64) {
        self.rotation.set(axis, degrees);
    }

    pub fn reset(&mut self) {
        let defaults = self.defaults;
        self.position = defaults.position;
        self.rotation = defaults.rotation;
        self.scale = Vector3::new(1.0, 1.0, 1.0);
        self.set_size(defaults.size.width, defaults.size.height, defaults.size.depth);
    }

    pub fn model_matrix(&self) -> Matrix4<f64> {
        Transform::model_matrix(&self.scale, &self.rotation, &self.position)
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.model_matrix().transform_point(point)
    }

    fn rebuild(&mut self) {
        self.edges = build_shape(self.tag, self.size.width, self.size.height, self.size.depth);
        debug!(
            "rebuilt shape '{}' at {:?}: {} edges",
            self.tag,
            self.size,
            self.edges.len()
        );
    }
}

/// A 2D line segment in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl Segment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }
}

/// One line of the origin gizmo with its label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSegment {
    pub axis: Axis,
    pub segment: Segment,
    /// Red, green or blue for X, Y, Z
    pub color: [u8; 3],
    pub label: char,
}

/// Shapes in insertion order plus a single camera
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    pub camera: Camera,
    pub viewport: Viewport,
    pub show_axes: bool,
}

impl Scene {
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        Self {
            shapes: Vec::new(),
            camera,
            viewport,
            show_axes: true,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut scene = Self::new(Camera::from_config(&config.camera), config.viewport);
        scene.show_axes = config.show_axes;
        for shape in &config.shapes {
            scene.add_shape(Shape::from_config(shape));
        }
        scene
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Result<&Shape, SceneError> {
        self.shapes.get(id.0).ok_or(SceneError::UnknownShape(id))
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Result<&mut Shape, SceneError> {
        self.shapes.get_mut(id.0).ok_or(SceneError::UnknownShape(id))
    }

    /// First shape with the given tag
    pub fn find_shape(&self, tag: char) -> Option<ShapeId> {
        self.shapes.iter().position(|s| s.tag == tag).map(ShapeId)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn set_shape_dimensions(&mut self, id: ShapeId, width: f64, height: f64, depth: f64) -> Result<(), SceneError> {
        self.shape_mut(id)?.set_size(width, height, depth);
        Ok(())
    }

    pub fn set_shape_transform(
        &mut self,
        id: ShapeId,
        position: Vector3<f64>,
        rotation: RotationState,
    ) -> Result<(), SceneError> {
        let shape = self.shape_mut(id)?;
        shape.position = position;
        shape.rotation = rotation;
        Ok(())
    }

    pub fn set_shape_position(&mut self, id: ShapeId, axis: Axis, value: f64) -> Result<(), SceneError> {
        self.shape_mut(id)?.set_position(axis, value);
        Ok(())
    }

    pub fn set_shape_rotation(&mut self, id: ShapeId, axis: Axis, degrees: f64) -> Result<(), SceneError> {
        self.shape_mut(id)?.set_rotation(axis, degrees);
        Ok(())
    }

    pub fn shape_reset(&mut self, id: ShapeId) -> Result<(), SceneError> {
        self.shape_mut(id)?.reset();
        Ok(())
    }

    pub fn camera_rotate(&mut self, dx: f64, dy: f64) {
        self.camera.rotate(dx, dy);
    }

    pub fn camera_zoom(&mut self, wheel_delta_y: f64) {
        self.camera.zoom(wheel_delta_y);
    }

    pub fn camera_reset(&mut self) {
        self.camera.reset();
    }

    /// Transform and project every edge of every shape.
    ///
    /// Edges with an endpoint on the camera's focal plane are left out.
    pub fn render_frame(&self) -> Vec<Segment> {
        let projector = self.camera.projector(&self.viewport);
        let capacity = self.shapes.iter().map(|s| s.edges.len()).sum();
        let mut segments = Vec::with_capacity(capacity);

        for shape in &self.shapes {
            let model = shape.model_matrix();
            for edge in &shape.edges {
                let start = projector.project(&model.transform_point(&edge.start));
                let end = projector.project(&model.transform_point(&edge.end));
                match (start, end) {
                    (Some(start), Some(end)) => segments.push(Segment::new(start, end)),
                    _ => trace!("dropping unprojectable edge of shape '{}'", shape.tag),
                }
            }
        }

        segments
    }

    /// Origin gizmo: one line per axis from the origin to [`AXIS_LENGTH`].
    pub fn render_axes(&self) -> Vec<AxisSegment> {
        if !self.show_axes {
            return Vec::new();
        }

        let projector = self.camera.projector(&self.viewport);
        let Some(origin) = projector.project(&Point3::origin()) else {
            return Vec::new();
        };

        let gizmo = [
            (Axis::X, [255, 0, 0], 'X'),
            (Axis::Y, [0, 255, 0], 'Y'),
            (Axis::Z, [0, 0, 255], 'Z'),
        ];
        gizmo
            .into_iter()
            .filter_map(|(axis, color, label)| {
                let mut tip = Vector3::zeros();
                set_component(&mut tip, axis, AXIS_LENGTH);
                let end = projector.project(&Point3::from(tip))?;
                Some(AxisSegment {
                    axis,
                    segment: Segment::new(origin, end),
                    color,
                    label,
                })
            })
            .collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}
