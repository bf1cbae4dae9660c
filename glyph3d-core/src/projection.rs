/// Camera state, pointer-driven camera controls and perspective projection
use log::debug;
use nalgebra::{Point2, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;
use crate::transform::{set_component, Axis, RotationState, Transform};

/// Distances to the projection plane below this are treated as unprojectable.
const DEPTH_EPSILON: f64 = 1e-9;

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Position and rotation restored by [`Camera::reset`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDefaults {
    pub position: Vector3<f64>,
    pub rotation: RotationState,
}

/// Perspective camera driven by pointer deltas
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vector3<f64>,
    pub rotation: RotationState,
    pub focal_length: f64,
    /// Degrees of rotation per pixel of pointer drag
    pub rotate_sensitivity: f64,
    /// Wheel deltas are divided by this before moving the camera
    pub zoom_divisor: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    defaults: CameraDefaults,
}

impl Camera {
    pub fn new(position: Vector3<f64>, rotation: RotationState, focal_length: f64) -> Self {
        Self::from_config(&CameraConfig {
            position,
            rotation,
            focal_length,
            ..CameraConfig::default()
        })
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: config.position,
            rotation: config.rotation,
            focal_length: config.focal_length,
            rotate_sensitivity: config.rotate_sensitivity,
            zoom_divisor: config.zoom_divisor,
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            defaults: CameraDefaults {
                position: config.position,
                rotation: config.rotation,
            },
        }
    }

    pub fn defaults(&self) -> &CameraDefaults {
        &self.defaults
    }

    /// Drag rotation: horizontal motion turns about Y, vertical about X.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.rotation.y -= dx * self.rotate_sensitivity;
        self.rotation.x -= dy * self.rotate_sensitivity;
    }

    /// Wheel zoom along Z, clamped to the configured range.
    pub fn zoom(&mut self, wheel_delta_y: f64) {
        let z = self.position.z + wheel_delta_y / self.zoom_divisor;
        self.position.z = z.clamp(self.zoom_min, self.zoom_max);
    }

    pub fn reset(&mut self) {
        self.position = self.defaults.position;
        self.rotation = self.defaults.rotation;
        debug!("camera reset to {:?}", self.defaults);
    }

    pub fn set_position(&mut self, axis: Axis, value: f64) {
        set_component(&mut self.position, axis, value);
    }

    pub fn set_rotation(&mut self, axis: Axis, degrees: f64) {
        self.rotation.set(axis, degrees);
    }

    /// Rotate a world point by the camera angles and move it into camera space.
    ///
    /// The rotation uses the object rotation order directly rather than its
    /// inverse, which is what the drag controls are tuned for.
    pub fn world_to_camera(&self, point: &Point3<f64>) -> Point3<f64> {
        self.to_camera_with(&Transform::rotation(&self.rotation), point)
    }

    fn to_camera_with(&self, rotation: &Rotation3<f64>, point: &Point3<f64>) -> Point3<f64> {
        rotation * point - self.position
    }

    /// Project a point in camera space to screen coordinates (origin top-left).
    ///
    /// Returns `None` for points on the camera's focal plane, where the
    /// perspective factor is unbounded.
    pub fn project_camera_point(&self, point: &Point3<f64>, viewport: &Viewport) -> Option<Point2<f64>> {
        let (mut x, mut y) = (point.x, point.y);
        if point.z != 0.0 {
            let denom = self.focal_length + point.z;
            if denom.abs() < DEPTH_EPSILON {
                return None;
            }
            let factor = self.focal_length / denom;
            x *= factor;
            y *= factor;
        }

        let screen = Point2::new(x + viewport.width / 2.0, viewport.height / 2.0 - y);
        if screen.x.is_finite() && screen.y.is_finite() {
            Some(screen)
        } else {
            None
        }
    }

    /// Project a world point to screen coordinates.
    pub fn project(&self, point: &Point3<f64>, viewport: &Viewport) -> Option<Point2<f64>> {
        self.project_camera_point(&self.world_to_camera(point), viewport)
    }

    /// Projector that reuses the camera rotation for many points in one frame.
    pub fn projector<'a>(&'a self, viewport: &'a Viewport) -> Projector<'a> {
        Projector {
            camera: self,
            viewport,
            rotation: Transform::rotation(&self.rotation),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

/// Per-frame snapshot of a camera and viewport
pub struct Projector<'a> {
    camera: &'a Camera,
    viewport: &'a Viewport,
    rotation: Rotation3<f64>,
}

impl Projector<'_> {
    pub fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let camera_point = self.camera.to_camera_with(&self.rotation, point);
        self.camera.project_camera_point(&camera_point, self.viewport)
    }
}

/// Free-function form of [`Camera::project`].
pub fn project(point: &Point3<f64>, camera: &Camera, viewport_width: f64, viewport_height: f64) -> Option<Point2<f64>> {
    camera.project(point, &Viewport::new(viewport_width, viewport_height))
}
