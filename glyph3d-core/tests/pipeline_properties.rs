/// End-to-end checks of the transform, projection, scene and chart pipelines
use approx::{assert_abs_diff_eq, assert_relative_eq};
use glyph3d_core::chart::{compute_bounds, evaluate, AxisBounds, BoundsPolicy, FunctionSpec, Rgb};
use glyph3d_core::projection::project;
use glyph3d_core::transform::{transform_point, Axis, RotationState};
use glyph3d_core::{build_shape, Camera, Scene, ShapeId};
use nalgebra::{Point2, Point3, Vector3};

fn unit_scale() -> Vector3<f64> {
    Vector3::new(1.0, 1.0, 1.0)
}

#[test]
fn rotation_then_inverse_returns_the_point() {
    let point = Point3::new(12.5, -7.0, 33.0);
    for axis in Axis::ALL {
        for theta in [-270.0, -45.0, 0.0, 13.0, 90.0, 179.9, 720.0] {
            let mut forward = RotationState::zero();
            forward.set(axis, theta);
            let turned = transform_point(&point, &unit_scale(), &forward, &Vector3::zeros());
            let back = transform_point(&turned, &unit_scale(), &forward.negated(), &Vector3::zeros());
            assert_abs_diff_eq!(back, point, epsilon = 1e-9);
        }
    }
}

#[test]
fn build_shape_is_deterministic() {
    for tag in ['Ч', 'Ф', '?'] {
        let a = build_shape(tag, 80.0, 120.0, 20.0);
        let b = build_shape(tag, 80.0, 120.0, 20.0);
        assert_eq!(a, b);
    }
}

#[test]
fn glyph_edge_counts() {
    assert_eq!(build_shape('Ч', 80.0, 120.0, 20.0).len(), 36);
    for (w, h, d) in [(100.0, 120.0, 20.0), (1.0, 200.0, 50.0), (3.5, 0.5, 9.0)] {
        assert_eq!(build_shape('Ф', w, h, d).len(), 60);
    }
}

#[test]
fn origin_projects_to_viewport_center() {
    let camera = Camera::new(Vector3::new(0.0, 0.0, 500.0), RotationState::zero(), 800.0);
    let screen = project(&Point3::origin(), &camera, 800.0, 600.0).unwrap();
    assert_relative_eq!(screen, Point2::new(400.0, 300.0));
}

#[test]
fn rotated_camera_turns_points_before_moving_them() {
    let camera = Camera::new(Vector3::new(0.0, 0.0, 500.0), RotationState::new(0.0, 90.0, 0.0), 800.0);

    // (100, 0, 0) turns to (0, 0, -100), then sits at (0, 0, -600) in camera space
    let screen = project(&Point3::new(100.0, 0.0, 0.0), &camera, 800.0, 600.0).unwrap();
    assert_abs_diff_eq!(screen, Point2::new(400.0, 300.0), epsilon = 1e-9);

    // (100, 50, 30) -> (30, 50, -600), perspective factor 800 / 200 = 4
    let screen = project(&Point3::new(100.0, 50.0, 30.0), &camera, 800.0, 600.0).unwrap();
    assert_abs_diff_eq!(screen, Point2::new(520.0, 100.0), epsilon = 1e-9);
}

#[test]
fn camera_rotation_about_x_and_order() {
    let tilted = Camera::new(Vector3::new(0.0, 0.0, 500.0), RotationState::new(90.0, 0.0, 0.0), 800.0);
    // (10, 100, 0) -> (10, 0, 100) -> (10, 0, -400), factor 2
    let screen = project(&Point3::new(10.0, 100.0, 0.0), &tilted, 800.0, 600.0).unwrap();
    assert_abs_diff_eq!(screen, Point2::new(420.0, 300.0), epsilon = 1e-9);

    // X first: (0, 100, 0) -> (0, 0, 100) -> (100, 0, 0), then (100, 0, -500), factor 8/3
    let both = Camera::new(Vector3::new(0.0, 0.0, 500.0), RotationState::new(90.0, 90.0, 0.0), 800.0);
    let screen = project(&Point3::new(0.0, 100.0, 0.0), &both, 800.0, 600.0).unwrap();
    assert_abs_diff_eq!(screen, Point2::new(400.0 + 800.0 / 3.0, 300.0), epsilon = 1e-9);
}

#[test]
fn zoom_stays_in_range() {
    let mut scene = Scene::default();
    for _ in 0..50 {
        scene.camera_zoom(960.0);
        assert!(scene.camera.position.z <= 1000.0);
    }
    assert_eq!(scene.camera.position.z, 1000.0);

    for _ in 0..50 {
        scene.camera_zoom(-960.0);
        assert!(scene.camera.position.z >= 100.0);
    }
    assert_eq!(scene.camera.position.z, 100.0);

    scene.camera_reset();
    assert_eq!(scene.camera.position.z, 500.0);
}

#[test]
fn drag_then_reset_restores_the_frame() {
    let mut scene = Scene::default();
    let before = scene.render_frame();

    scene.camera_rotate(40.0, -25.0);
    scene.camera_zoom(240.0);
    let ch = scene.find_shape('Ч').unwrap();
    scene.set_shape_dimensions(ch, 10.0, 20.0, 30.0).unwrap();
    scene.set_shape_rotation(ch, Axis::Y, 60.0).unwrap();
    assert_ne!(scene.render_frame(), before);

    scene.camera_reset();
    scene.shape_reset(ch).unwrap();
    assert_eq!(scene.render_frame(), before);
    assert!(scene.shape_reset(ShapeId(7)).is_err());
}

#[test]
fn chart_cells_fail_independently() {
    let functions = [FunctionSpec::new("4/(1-x)", Rgb::new(255, 0, 0), "f")];
    assert_eq!(evaluate(&[0.0], &functions), vec![vec![Some(4.0)]]);
    assert_eq!(evaluate(&[1.0], &functions), vec![vec![None]]);
}

#[test]
fn bounds_round_up_to_step_and_respect_floor() {
    let grid = vec![vec![Some(3.0), Some(4.0)]];
    let rounded = compute_bounds(&grid, 2.0, BoundsPolicy::StepRounded);
    assert_eq!(rounded.max, 8.0);

    let floored = compute_bounds(&grid, 2.0, BoundsPolicy::Floor { limit: 10.0 });
    assert_eq!(floored, AxisBounds { max: 10.0, min: -10.0 });
}
