use crate::error::{Error, Result};
use crate::geom::{self, Point};
use crate::hover::{HoverEvent, HoverTracker};
use crate::index::{HitTestOptions, SpatialIndex};
use crate::layout::{self, LayoutBounds, LayoutOptions, LayoutPolicy, LayoutReport};
use crate::model::{HitTarget, Link, Node, link_id};
use crate::render::{LinkShape, NodeShape, ProbeTrace, Renderer, Surface};
use indexmap::IndexMap;
use indexmap::map::Entry;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneOptions {
    pub width: u32,
    pub height: u32,
    pub node_radius: f64,
    /// Seed of the random source shared by the layout policies.
    pub seed: u64,
    pub layout: LayoutOptions,
    pub hit_test: HitTestOptions,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            node_radius: 10.0,
            seed: 0,
            layout: LayoutOptions::default(),
            hit_test: HitTestOptions::default(),
        }
    }
}

/// Owns the nodes and links of one drawing surface and composes layout and hit-testing on top.
#[derive(Debug)]
pub struct Scene {
    options: SceneOptions,
    nodes: FxIndexMap<String, Node>,
    links: FxIndexMap<String, Link>,
    index: SpatialIndex,
    hover: HoverTracker,
    rng: StdRng,
}

impl Scene {
    pub fn new(options: SceneOptions) -> Result<Self> {
        if options.width == 0 || options.height == 0 {
            return Err(Error::InvalidSurface {
                width: options.width,
                height: options.height,
            });
        }
        options.hit_test.validate()?;
        Ok(Self {
            index: SpatialIndex::new(options.hit_test.clone()),
            rng: StdRng::seed_from_u64(options.seed),
            nodes: FxIndexMap::default(),
            links: FxIndexMap::default(),
            hover: HoverTracker::new(),
            options,
        })
    }

    pub fn with_size(width: u32, height: u32) -> Result<Self> {
        Self::new(SceneOptions {
            width,
            height,
            ..Default::default()
        })
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    pub fn width(&self) -> f64 {
        f64::from(self.options.width)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.options.height)
    }

    pub fn node_radius(&self) -> f64 {
        self.options.node_radius
    }

    /// Replaces the hit-test configuration. Takes effect at the next [`Scene::connect`].
    ///
    /// Invalid options are rejected and the current configuration is kept.
    pub fn set_hit_test_options(&mut self, hit_test: HitTestOptions) -> Result<()> {
        hit_test.validate()?;
        self.index.set_options(hit_test.clone());
        self.options.hit_test = hit_test;
        Ok(())
    }

    /// Restarts the shared random source.
    pub fn reseed(&mut self, seed: u64) {
        self.options.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn create_node(&mut self, id: impl Into<String>) -> Result<&mut Node> {
        let id = id.into();
        match self.nodes.entry(id) {
            Entry::Occupied(e) => Err(Error::DuplicateNode { id: e.key().clone() }),
            Entry::Vacant(e) => {
                let node = Node::new(e.key().clone());
                Ok(e.insert(node))
            }
        }
    }

    /// [`Scene::create_node`] with a title and an initial position.
    pub fn create_node_with(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        position: Point,
    ) -> Result<&mut Node> {
        let node = self.create_node(id)?;
        node.title = title.into();
        node.position = position;
        Ok(node)
    }

    /// Creates (or silently replaces) the link `head -> tail`. Both nodes must exist.
    pub fn create_link(&mut self, head: &str, tail: &str) -> Result<&mut Link> {
        for endpoint in [head, tail] {
            if !self.nodes.contains_key(endpoint) {
                return Err(Error::MissingNode {
                    link_id: link_id(head, tail),
                    node_id: endpoint.to_string(),
                });
            }
        }

        let link = Link::new(head, tail);
        let (idx, replaced) = self.links.insert_full(link.id.clone(), link);
        if replaced.is_some() {
            tracing::debug!(head, tail, "link re-created, previous one replaced");
        }
        Ok(&mut self.links[idx])
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn link_mut(&mut self, id: &str) -> Option<&mut Link> {
        self.links.get_mut(id)
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl ExactSizeIterator<Item = &Link> {
        self.links.values()
    }

    /// Moves a node (e.g. when dragged). Returns `false` for unknown ids.
    ///
    /// The spatial index is not refreshed; call [`Scene::connect`] afterwards.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.set_position(x, y);
                true
            }
            None => false,
        }
    }

    pub fn link_endpoints(&self, link: &Link) -> Option<(Point, Point)> {
        let head = self.nodes.get(&link.head)?;
        let tail = self.nodes.get(&link.tail)?;
        Some((head.position, tail.position))
    }

    pub fn link_length(&self, link: &Link) -> Option<f64> {
        self.link_endpoints(link)
            .map(|(head, tail)| geom::segment_length(head, tail))
    }

    pub fn layout_bounds(&self) -> LayoutBounds {
        LayoutBounds {
            width: self.width(),
            height: self.height(),
            radius: self.options.node_radius,
        }
    }

    pub fn organize(&mut self, policy: LayoutPolicy) -> LayoutReport {
        let bounds = self.layout_bounds();
        layout::organize(
            self.nodes.values_mut(),
            bounds,
            policy,
            &self.options.layout,
            &mut self.rng,
        )
    }

    /// Like [`Scene::organize`]; unknown names fall back to `random`.
    pub fn organize_by_name(&mut self, policy: &str) -> LayoutReport {
        self.organize(LayoutPolicy::from_name(policy))
    }

    /// Rebuilds the spatial index from the current geometry.
    pub fn connect(&mut self) -> &SpatialIndex {
        let nodes = &self.nodes;
        self.index.connect(nodes.values(), self.links.values(), |id| {
            nodes.get(id).map(|n| n.position)
        });
        &self.index
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn item_at(&self, x: f64, y: f64) -> Option<HitTarget> {
        self.index.item_at(x, y)
    }

    pub fn clear(&self, renderer: &mut dyn Renderer) {
        renderer.clear(self.width(), self.height());
    }

    /// Emits every link, then every node, flagging `highlight` when it names one of them.
    pub fn draw(&self, renderer: &mut dyn Renderer, highlight: Option<&HitTarget>) {
        let radius = self.options.node_radius;

        for link in self.links.values() {
            let Some((head, tail)) = self.link_endpoints(link) else {
                continue;
            };
            let (head, tail) = match geom::direction(head, tail) {
                Some(dir) => (head + dir * radius, tail - dir * radius),
                None => (head, tail),
            };
            renderer.draw_link(&LinkShape {
                id: link.id.clone(),
                head: (head.x, head.y),
                tail: (tail.x, tail.y),
                radius,
                title: link.id.clone(),
                highlighted: highlight.is_some_and(|t| t.is_link(&link.id)),
            });
        }

        for node in self.nodes.values() {
            renderer.draw_node(&NodeShape {
                id: node.id.clone(),
                x: node.x(),
                y: node.y(),
                radius,
                title: node.title.clone(),
                highlighted: highlight.is_some_and(|t| t.is_node(&node.id)),
            });
        }

        if self.options.hit_test.show_trace {
            for probe in self.index.probes() {
                renderer.draw_probe(&ProbeTrace {
                    x: probe.x,
                    y: probe.y,
                    accuracy: probe.effective_accuracy(),
                    shape: probe.shape,
                });
            }
        }
    }

    pub fn highlight(&self, renderer: &mut dyn Renderer, target: Option<&HitTarget>) {
        self.draw(renderer, target);
    }

    /// Converts client coordinates into scene coordinates using the surface's placement.
    pub fn mouse_position(&self, surface: &dyn Surface, client_x: f64, client_y: f64) -> Point {
        crate::render::to_surface_local(surface, geom::point(client_x, client_y))
    }

    /// Registers a hover observer.
    pub fn on_hover(&mut self, callback: impl FnMut(&HoverEvent) + 'static) {
        self.hover.subscribe(callback);
    }

    /// Hit-tests `(x, y)` and publishes the resulting hover transitions.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> Vec<HoverEvent> {
        let hit = self.index.item_at(x, y);
        self.hover.update(hit, x, y)
    }

    pub fn pointer_left(&mut self) -> Vec<HoverEvent> {
        self.hover.clear()
    }

    pub fn hovered(&self) -> Option<&HitTarget> {
        self.hover.current()
    }
}
