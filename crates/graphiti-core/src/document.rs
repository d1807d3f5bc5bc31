//! JSON description of a scene: surface options plus node and link lists.
//!
//! ```json
//! {
//!   "width": 400, "height": 300, "seed": 7,
//!   "nodes": [{ "id": "a", "title": "A" }, { "id": "b", "x": 120, "y": 40 }],
//!   "links": [{ "head": "a", "tail": "b", "cost": 2 }]
//! }
//! ```

use crate::error::Result;
use crate::geom::point;
use crate::scene::{Scene, SceneOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(flatten)]
    pub options: SceneOptions,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub head: String,
    pub tail: String,
    #[serde(default)]
    pub cost: f64,
}

impl SceneDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a scene; nodes without coordinates start at the origin.
    pub fn to_scene(&self) -> Result<Scene> {
        let mut scene = Scene::new(self.options.clone())?;
        for spec in &self.nodes {
            scene.create_node_with(
                spec.id.clone(),
                spec.title.clone(),
                point(spec.x.unwrap_or(0.0), spec.y.unwrap_or(0.0)),
            )?;
        }
        for spec in &self.links {
            scene.create_link(&spec.head, &spec.tail)?.cost = spec.cost;
        }
        Ok(scene)
    }

    /// Snapshot of a scene, including current node positions.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            options: scene.options().clone(),
            nodes: scene
                .nodes()
                .map(|n| NodeSpec {
                    id: n.id.clone(),
                    title: n.title.clone(),
                    x: Some(n.x()),
                    y: Some(n.y()),
                })
                .collect(),
            links: scene
                .links()
                .map(|l| LinkSpec {
                    head: l.head.clone(),
                    tail: l.tail.clone(),
                    cost: l.cost,
                })
                .collect(),
        }
    }
}
