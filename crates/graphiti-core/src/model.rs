use crate::geom::{Point, point};

/// A graph vertex placed on the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub position: Point,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            position: point(0.0, 0.0),
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = point(x, y);
    }
}

/// A directed link between two nodes, keyed by `head:tail`.
///
/// Endpoints are stored by id; the owning [`crate::Scene`] holds the canonical nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: String,
    pub head: String,
    pub tail: String,
    pub cost: f64,
}

impl Link {
    pub fn new(head: impl Into<String>, tail: impl Into<String>) -> Self {
        let head = head.into();
        let tail = tail.into();
        Self {
            id: link_id(&head, &tail),
            head,
            tail,
            cost: 0.0,
        }
    }
}

pub fn link_id(head: &str, tail: &str) -> String {
    let mut id = String::with_capacity(head.len() + tail.len() + 1);
    id.push_str(head);
    id.push(':');
    id.push_str(tail);
    id
}

/// Kind of entity a hit-test resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Link,
}

/// Identity of a pickable entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum HitTarget {
    Node(String),
    Link(String),
}

impl HitTarget {
    pub fn kind(&self) -> EntityKind {
        match self {
            HitTarget::Node(_) => EntityKind::Node,
            HitTarget::Link(_) => EntityKind::Link,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            HitTarget::Node(id) | HitTarget::Link(id) => id,
        }
    }

    pub fn is_node(&self, id: &str) -> bool {
        matches!(self, HitTarget::Node(n) if n == id)
    }

    pub fn is_link(&self, id: &str) -> bool {
        matches!(self, HitTarget::Link(l) if l == id)
    }
}
