/// Wireframe primitives: edges, boxes and the box layouts of each glyph
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A line segment between two 3D points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Edge {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }
}

/// Size of a glyph along each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

/// Vertex index pairs of a box: front face, back face, front-to-back connectors.
#[rustfmt::skip]
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

pub const EDGES_PER_BOX: usize = BOX_EDGES.len();

/// An axis-aligned rectangular prism given by its ranges on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPrimitive {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

impl BoxPrimitive {
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self { x, y, z }
    }

    /// Corners: the front face (z.0) counter-clockwise from bottom-left, then the back face (z.1).
    pub fn vertices(&self) -> [Point3<f64>; 8] {
        let (x1, x2) = self.x;
        let (y1, y2) = self.y;
        let (z1, z2) = self.z;
        [
            Point3::new(x1, y1, z1),
            Point3::new(x2, y1, z1),
            Point3::new(x2, y2, z1),
            Point3::new(x1, y2, z1),
            Point3::new(x1, y1, z2),
            Point3::new(x2, y1, z2),
            Point3::new(x2, y2, z2),
            Point3::new(x1, y2, z2),
        ]
    }

    pub fn edges(&self) -> [Edge; EDGES_PER_BOX] {
        let vertices = self.vertices();
        BOX_EDGES.map(|(a, b)| Edge::new(vertices[a], vertices[b]))
    }
}

/// A box whose ranges are fractions of the glyph's width, height and depth.
///
/// The glyph is centred on the origin, so fractions lie in `[-0.5, 0.5]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FracBox {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

const FULL: (f64, f64) = (-0.5, 0.5);
const LEFT_QUARTER: (f64, f64) = (-0.5, -0.25);
const RIGHT_QUARTER: (f64, f64) = (0.25, 0.5);
const MID_BAND: (f64, f64) = (-1.0 / 12.0, 1.0 / 12.0);

impl FracBox {
    pub const fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self { x, y, z }
    }

    /// Full depth, the usual case for glyph strokes
    pub const fn flat(x: (f64, f64), y: (f64, f64)) -> Self {
        Self::new(x, y, FULL)
    }

    pub fn resolve(&self, dims: &Dimensions) -> BoxPrimitive {
        BoxPrimitive::new(
            (self.x.0 * dims.width, self.x.1 * dims.width),
            (self.y.0 * dims.height, self.y.1 * dims.height),
            (self.z.0 * dims.depth, self.z.1 * dims.depth),
        )
    }
}

/// Ч: tall right stem, middle crossbar, short left stem rising from the crossbar.
pub const CHE_LAYOUT: [FracBox; 3] = [
    FracBox::flat(RIGHT_QUARTER, FULL),
    FracBox::flat(FULL, MID_BAND),
    FracBox::flat(LEFT_QUARTER, (-1.0 / 12.0, 0.5)),
];

/// Ф: top bar, middle bar, centre stem, and the two sides of the upper loop.
pub const EF_LAYOUT: [FracBox; 5] = [
    FracBox::flat(FULL, (1.0 / 3.0, 0.5)),
    FracBox::flat(FULL, MID_BAND),
    FracBox::flat((-0.125, 0.125), FULL),
    FracBox::flat(LEFT_QUARTER, (1.0 / 12.0, 1.0 / 3.0)),
    FracBox::flat(RIGHT_QUARTER, (1.0 / 12.0, 1.0 / 3.0)),
];

/// Glyphs with a built-in box layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Che,
    Ef,
}

impl Glyph {
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'Ч' => Some(Glyph::Che),
            'Ф' => Some(Glyph::Ef),
            _ => None,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Glyph::Che => 'Ч',
            Glyph::Ef => 'Ф',
        }
    }

    pub fn layout(self) -> &'static [FracBox] {
        match self {
            Glyph::Che => &CHE_LAYOUT,
            Glyph::Ef => &EF_LAYOUT,
        }
    }
}

/// Box layout for a tag, `None` for tags without a glyph
pub fn layout_for(tag: char) -> Option<&'static [FracBox]> {
    Glyph::from_tag(tag).map(Glyph::layout)
}

/// Resolve a layout against concrete dimensions and collect all box edges in order.
pub fn build_boxes(layout: &[FracBox], dims: &Dimensions) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(layout.len() * EDGES_PER_BOX);
    for frac in layout {
        edges.extend(frac.resolve(dims).edges());
    }
    edges
}

/// Build the wireframe of a glyph. Unknown tags produce no edges.
pub fn build_shape(tag: char, width: f64, height: f64, depth: f64) -> Vec<Edge> {
    match layout_for(tag) {
        Some(layout) => build_boxes(layout, &Dimensions::new(width, height, depth)),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_has_twelve_edges_over_eight_vertices() {
        let b = BoxPrimitive::new((0.0, 1.0), (0.0, 2.0), (0.0, 3.0));
        let edges = b.edges();
        assert_eq!(edges.len(), 12);
        assert_eq!(edges[0], Edge::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(edges[11], Edge::new(Point3::new(0.0, 2.0, 0.0), Point3::new(0.0, 2.0, 3.0)));
    }

    #[test]
    fn test_che_right_stem_position() {
        let edges = build_shape('Ч', 80.0, 120.0, 20.0);
        assert_eq!(edges.len(), 36);
        // First vertex of the right stem: (right - width/4, bottom, front)
        assert_eq!(edges[0].start, Point3::new(20.0, -60.0, -10.0));
        assert_eq!(edges[1].end, Point3::new(40.0, 60.0, -10.0));
    }

    #[test]
    fn test_ef_box_count() {
        assert_eq!(build_shape('Ф', 100.0, 120.0, 20.0).len(), 60);
        assert_eq!(build_shape('Ф', 1.0, 1.0, 1.0).len(), 60);
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        assert!(build_shape('Q', 10.0, 10.0, 10.0).is_empty());
    }

    #[test]
    fn test_degenerate_dimensions_are_allowed() {
        let edges = build_shape('Ч', 0.0, -5.0, 0.0);
        assert_eq!(edges.len(), 36);
        assert!(edges.iter().all(|e| e.start.x == 0.0 && e.end.x == 0.0));
    }

    #[test]
    fn test_custom_layout() {
        let layout = [FracBox::flat(FULL, FULL)];
        let edges = build_boxes(&layout, &Dimensions::new(2.0, 2.0, 2.0));
        assert_eq!(edges.len(), EDGES_PER_BOX);
        assert_eq!(edges[0].start, Point3::new(-1.0, -1.0, -1.0));
    }
}
