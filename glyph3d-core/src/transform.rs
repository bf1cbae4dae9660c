/// Local 3D transformations: scale, per-axis rotation in degrees, translation
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Coordinate axis selector used by slider-style setters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Replace one component of a vector
pub fn set_component(vector: &mut Vector3<f64>, axis: Axis, value: f64) {
    vector[axis.index()] = value;
}

/// Rotation state around three axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: Axis, degrees: f64) {
        match axis {
            Axis::X => self.x = degrees,
            Axis::Y => self.y = degrees,
            Axis::Z => self.z = degrees,
        }
    }

    pub fn negated(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about X, then Y, then Z.
    ///
    /// Each axis uses nalgebra's right-handed convention, so the Y step is
    /// `x' = x·cos + z·sin`, `z' = -x·sin + z·cos`.
    pub fn rotation(rotation: &RotationState) -> Rotation3<f64> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation.x.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation.y.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), rotation.z.to_radians());

        // Applied to a point in order: X, Y, Z
        rz * ry * rx
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f64> {
        Self::rotation(rotation).to_homogeneous()
    }

    /// Create a translation matrix
    pub fn translation_matrix(translation: &Vector3<f64>) -> Matrix4<f64> {
        Matrix4::new_translation(translation)
    }

    /// Create a scale matrix
    pub fn scale_matrix(scale: &Vector3<f64>) -> Matrix4<f64> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// Scale, rotate X/Y/Z, then translate
    pub fn model_matrix(
        scale: &Vector3<f64>,
        rotation: &RotationState,
        translation: &Vector3<f64>,
    ) -> Matrix4<f64> {
        Self::translation_matrix(translation)
            * Self::rotation_matrix(rotation)
            * Self::scale_matrix(scale)
    }
}

/// Apply scale, rotation (degrees) and translation to a single point.
pub fn transform_point(
    point: &Point3<f64>,
    scale: &Vector3<f64>,
    rotation: &RotationState,
    translation: &Vector3<f64>,
) -> Point3<f64> {
    Transform::model_matrix(scale, rotation, translation).transform_point(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(10.0, 20.0, 30.0);
        state.set(Axis::Z, -5.0);
        assert_eq!(state.get(Axis::X), 10.0);
        assert_eq!(state.get(Axis::Y), 20.0);
        assert_eq!(state.get(Axis::Z), -5.0);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&RotationState::zero());
        assert!((matrix - Matrix4::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_set_component() {
        let mut v = Vector3::new(1.0, 2.0, 3.0);
        set_component(&mut v, Axis::Y, 7.0);
        assert_eq!(v, Vector3::new(1.0, 7.0, 3.0));
    }

    #[test]
    fn test_scale_applies_before_translation() {
        let p = transform_point(
            &Point3::new(1.0, 2.0, 3.0),
            &Vector3::new(2.0, 3.0, 4.0),
            &RotationState::zero(),
            &Vector3::new(10.0, 0.0, -1.0),
        );
        assert_abs_diff_eq!(p, Point3::new(12.0, 6.0, 11.0), epsilon = 1e-12);
    }

    #[test]
    fn test_axis_sign_conventions() {
        let one = Vector3::new(1.0, 1.0, 1.0);
        let zero = Vector3::zeros();

        // X: (0, 1, 0) -> (0, cos, sin)
        let p = transform_point(&Point3::new(0.0, 1.0, 0.0), &one, &RotationState::new(90.0, 0.0, 0.0), &zero);
        assert_abs_diff_eq!(p, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        // Y: (1, 0, 0) -> (cos, 0, -sin)
        let p = transform_point(&Point3::new(1.0, 0.0, 0.0), &one, &RotationState::new(0.0, 90.0, 0.0), &zero);
        assert_abs_diff_eq!(p, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-12);

        // Z: (1, 0, 0) -> (cos, sin, 0)
        let p = transform_point(&Point3::new(1.0, 0.0, 0.0), &one, &RotationState::new(0.0, 0.0, 90.0), &zero);
        assert_abs_diff_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_order_is_x_then_y() {
        // X by 90 sends +Y to +Z, then Y by 90 sends +Z to +X.
        let p = transform_point(
            &Point3::new(0.0, 1.0, 0.0),
            &Vector3::new(1.0, 1.0, 1.0),
            &RotationState::new(90.0, 90.0, 0.0),
            &Vector3::zeros(),
        );
        assert_abs_diff_eq!(p, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }
}
