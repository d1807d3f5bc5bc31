#![forbid(unsafe_code)]

//! `graphiti` draws graphs of nodes and directed links onto a 2D surface and answers "what is
//! under the pointer" queries.
//!
//! # Features
//!
//! - `svg`: enable the SVG renderer (`graphiti::svg`)
//!
//! ```
//! use graphiti::{HitTarget, LayoutPolicy, Scene};
//!
//! let mut scene = Scene::with_size(400, 300).unwrap();
//! scene.create_node("a").unwrap();
//! scene.create_node("b").unwrap();
//! scene.create_link("a", "b").unwrap();
//! scene.organize(LayoutPolicy::Harmony);
//! scene.connect();
//!
//! let a = scene.node("a").unwrap().position;
//! assert_eq!(scene.item_at(a.x, a.y), Some(HitTarget::Node("a".into())));
//! ```

pub use graphiti_core::*;

#[cfg(feature = "svg")]
pub mod svg {
    pub use graphiti_svg::{SvgRenderOptions, SvgRenderer, render_scene_svg};
}
