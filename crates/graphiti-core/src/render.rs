//! Collaborator seams: the core computes geometry and highlight flags, implementations of these
//! traits turn them into pixels (or SVG, or test recordings).

use crate::geom::{Point, Rect};
use crate::index::ProbeShape;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeShape {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub title: String,
    pub highlighted: bool,
}

/// A link segment with both endpoints pulled in by the node radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkShape {
    pub id: String,
    pub head: (f64, f64),
    pub tail: (f64, f64),
    pub radius: f64,
    pub title: String,
    pub highlighted: bool,
}

/// Debug outline of a hit-test probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeTrace {
    pub x: f64,
    pub y: f64,
    pub accuracy: f64,
    pub shape: ProbeShape,
}

pub trait Renderer {
    fn clear(&mut self, width: f64, height: f64);

    fn draw_link(&mut self, link: &LinkShape);

    fn draw_node(&mut self, node: &NodeShape);

    fn draw_probe(&mut self, _probe: &ProbeTrace) {}
}

/// The drawing surface as placed in client (window) coordinates.
pub trait Surface {
    fn bounding_rect(&self) -> Rect;
}

impl Surface for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

/// Translates client coordinates into surface-local coordinates.
pub fn to_surface_local(surface: &dyn Surface, client: Point) -> Point {
    let origin = surface.bounding_rect().origin;
    crate::geom::point(client.x - origin.x, client.y - origin.y)
}

/// Records every call, in order. Useful for tests and for replaying a frame elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordingRenderer {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Clear { width: f64, height: f64 },
    Link(LinkShape),
    Node(NodeShape),
    Probe(ProbeTrace),
}

impl RecordingRenderer {
    pub fn nodes(&self) -> impl Iterator<Item = &NodeShape> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Node(n) => Some(n),
            _ => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkShape> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Link(l) => Some(l),
            _ => None,
        })
    }

    pub fn probes(&self) -> impl Iterator<Item = &ProbeTrace> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Probe(p) => Some(p),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(DrawOp::Clear { width, height });
    }

    fn draw_link(&mut self, link: &LinkShape) {
        self.ops.push(DrawOp::Link(link.clone()));
    }

    fn draw_node(&mut self, node: &NodeShape) {
        self.ops.push(DrawOp::Node(node.clone()));
    }

    fn draw_probe(&mut self, probe: &ProbeTrace) {
        self.ops.push(DrawOp::Probe(probe.clone()));
    }
}
