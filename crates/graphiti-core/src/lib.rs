#![forbid(unsafe_code)]

//! Headless core of `graphiti`: a graph scene model, randomized node placement policies and a
//! probe-based hit-testing engine.
//!
//! Pixel output is left to a [`Renderer`] implementation; the core hands it already computed
//! geometry and highlight flags.

pub mod document;
pub mod error;
pub mod geom;
pub mod hover;
pub mod index;
pub mod layout;
pub mod model;
pub mod render;
pub mod scene;

pub use document::{LinkSpec, NodeSpec, SceneDocument};
pub use error::{Error, Result};
pub use hover::{HoverEvent, HoverTracker};
pub use index::{HitProbe, HitTestOptions, ProbeShape, SpatialIndex};
pub use layout::{LayoutOptions, LayoutPolicy, LayoutReport};
pub use model::{EntityKind, HitTarget, Link, Node};
pub use render::{
    DrawOp, LinkShape, NodeShape, ProbeTrace, RecordingRenderer, Renderer, Surface,
};
pub use scene::{Scene, SceneOptions};
