/// glyph3d core library - geometry, projection and chart scaling
///
/// This library holds the stateless transform and projection pipeline, the
/// glyph wireframe builder, the scene that ties shapes to a camera, and the
/// adaptive scaling behind the function bar chart. Front ends feed it numeric
/// parameters and draw the segments it returns.

pub mod chart;
pub mod config;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use chart::{BoundsPolicy, Chart, ChartFrame, FunctionSpec, Rgb};
pub use config::{AppConfig, ConfigError};
pub use geometry::{build_shape, Dimensions, Edge, Glyph};
pub use projection::{Camera, Viewport};
pub use scene::{Scene, SceneError, Segment, Shape, ShapeId};
pub use transform::{transform_point, Axis, RotationState, Transform};
