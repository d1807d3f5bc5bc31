//! Probe-based hit-testing.
//!
//! Links are sampled into evenly spaced probes, nodes contribute one probe each, and point
//! queries scan the probe list in build order. The last matching probe wins, so node probes
//! (appended after all link probes) take precedence over the links they sit on.
//!
//! Probes capture geometry at [`SpatialIndex::connect`] time only; moving nodes afterwards leaves
//! the index stale until the next `connect`.
//!
//! Queries go through an R-tree of probe bounding boxes, then run the exact shape test on the
//! candidates and keep the one built last.

use crate::error::{Error, Result};
use crate::geom::{self, Point};
use crate::model::{HitTarget, Link, Node};
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

/// Upper bound on the probes sampled along a single link.
pub const MAX_PROBES_PER_LINK: usize = 10_000;

/// Hit region of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeShape {
    /// Disk of radius `accuracy`.
    #[default]
    Circle,
    /// Axis-aligned square of half-width `accuracy`.
    Square,
}

impl ProbeShape {
    /// Strict containment test of `(dx, dy)` relative to the probe center. A non-positive
    /// `accuracy` contains nothing.
    pub fn contains(self, dx: f64, dy: f64, accuracy: f64) -> bool {
        if !(accuracy > 0.0) {
            return false;
        }
        match self {
            ProbeShape::Square => dx.abs() < accuracy && dy.abs() < accuracy,
            ProbeShape::Circle => dx * dx + dy * dy < accuracy * accuracy,
        }
    }

    pub fn default_node_accuracy(self) -> f64 {
        match self {
            ProbeShape::Circle => 20.0,
            ProbeShape::Square => 25.0,
        }
    }

    pub fn default_link_overlap_ratio(self) -> f64 {
        match self {
            ProbeShape::Circle => 1.5,
            ProbeShape::Square => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HitTestOptions {
    pub node_model: ProbeShape,
    /// Defaults to [`ProbeShape::default_node_accuracy`] of `node_model`.
    pub node_accuracy: Option<f64>,
    pub link_model: ProbeShape,
    pub link_accuracy: f64,
    /// Defaults to [`ProbeShape::default_link_overlap_ratio`] of `link_model`.
    pub link_overlap_ratio: Option<f64>,
    /// Ask the renderer to outline every probe.
    pub show_trace: bool,
}

impl Default for HitTestOptions {
    fn default() -> Self {
        Self {
            node_model: ProbeShape::Circle,
            node_accuracy: None,
            link_model: ProbeShape::Circle,
            link_accuracy: 10.0,
            link_overlap_ratio: None,
            show_trace: false,
        }
    }
}

impl HitTestOptions {
    pub fn node_accuracy(&self) -> f64 {
        self.node_accuracy
            .unwrap_or_else(|| self.node_model.default_node_accuracy())
    }

    pub fn link_overlap_ratio(&self) -> f64 {
        self.link_overlap_ratio
            .unwrap_or_else(|| self.link_model.default_link_overlap_ratio())
    }

    /// Rejects accuracies and overlap ratios that are not finite and positive.
    pub fn validate(&self) -> Result<()> {
        for (option, value) in [
            ("nodeAccuracy", self.node_accuracy()),
            ("linkAccuracy", self.link_accuracy),
            ("linkOverlapRatio", self.link_overlap_ratio()),
        ] {
            if !is_positive(value) {
                return Err(Error::InvalidHitTestOption { option, value });
            }
        }
        Ok(())
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A sample point standing in for a node or a piece of a link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitProbe {
    pub target: HitTarget,
    pub x: f64,
    pub y: f64,
    pub accuracy: f64,
    pub shape: ProbeShape,
    /// Fractional position along the link, `0` at the head and `1` at the tail. Node probes have
    /// none.
    pub coverage: Option<f64>,
}

impl HitProbe {
    /// Multiplier applied to `accuracy`.
    ///
    /// Link probes shrink towards either endpoint and widen towards the midpoint:
    /// `0.5 + ln(2c + 1)` with `c` the distance (in coverage) to the nearer endpoint.
    pub fn coverage_ratio(&self) -> f64 {
        match self.coverage {
            Some(c) => {
                let c = c.min(1.0 - c);
                0.5 + (2.0 * c + 1.0).ln()
            }
            None => 1.0,
        }
    }

    pub fn effective_accuracy(&self) -> f64 {
        self.accuracy * self.coverage_ratio()
    }

    pub fn hits(&self, x: f64, y: f64) -> bool {
        self.shape
            .contains(x - self.x, y - self.y, self.effective_accuracy())
    }
}

/// Bounding box of one probe's effective hit region, keyed by its build position.
#[derive(Debug, Clone, PartialEq)]
struct ProbeEntry {
    order: usize,
    bounds: AABB<[f64; 2]>,
}

impl ProbeEntry {
    fn new(order: usize, probe: &HitProbe) -> Option<Self> {
        let acc = probe.effective_accuracy();
        if !(is_positive(acc) && probe.x.is_finite() && probe.y.is_finite()) {
            return None;
        }
        Some(Self {
            order,
            bounds: AABB::from_corners(
                [probe.x - acc, probe.y - acc],
                [probe.x + acc, probe.y + acc],
            ),
        })
    }
}

impl RTreeObject for ProbeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

#[derive(Clone, Default)]
pub struct SpatialIndex {
    options: HitTestOptions,
    probes: Vec<HitProbe>,
    tree: RTree<ProbeEntry>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("options", &self.options)
            .field("probes", &self.probes.len())
            .finish_non_exhaustive()
    }
}

impl SpatialIndex {
    pub fn new(options: HitTestOptions) -> Self {
        Self {
            options,
            probes: Vec::new(),
            tree: RTree::new(),
        }
    }

    pub fn options(&self) -> &HitTestOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: HitTestOptions) {
        self.options = options;
    }

    pub fn probes(&self) -> &[HitProbe] {
        &self.probes
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Rebuilds the probe set from scratch.
    ///
    /// `position_of` resolves a node id to its current position; links whose endpoints cannot be
    /// resolved are skipped.
    pub fn connect<'a, F>(
        &mut self,
        nodes: impl IntoIterator<Item = &'a Node>,
        links: impl IntoIterator<Item = &'a Link>,
        position_of: F,
    ) -> &mut Self
    where
        F: Fn(&str) -> Option<Point>,
    {
        self.probes.clear();

        for link in links {
            let (Some(head), Some(tail)) = (position_of(&link.head), position_of(&link.tail))
            else {
                tracing::debug!(link = link.id.as_str(), "link endpoint missing, not sampled");
                continue;
            };
            self.sample_link(link, head, tail);
        }
        let link_probes = self.probes.len();

        let accuracy = self.options.node_accuracy();
        if is_positive(accuracy) {
            for node in nodes {
                self.probes.push(HitProbe {
                    target: HitTarget::Node(node.id.clone()),
                    x: node.x(),
                    y: node.y(),
                    accuracy,
                    shape: self.options.node_model,
                    coverage: None,
                });
            }
        } else {
            tracing::debug!(accuracy, "node accuracy is not positive, nodes not sampled");
        }

        let entries: Vec<ProbeEntry> = self
            .probes
            .iter()
            .enumerate()
            .filter_map(|(order, probe)| ProbeEntry::new(order, probe))
            .collect();
        self.tree = RTree::bulk_load(entries);

        tracing::trace!(
            link_probes,
            node_probes = self.probes.len() - link_probes,
            indexed = self.tree.size(),
            "spatial index connected"
        );
        self
    }

    fn sample_link(&mut self, link: &Link, head: Point, tail: Point) {
        let length = geom::segment_length(head, tail);
        if !(length.is_finite() && length > 0.0) {
            tracing::debug!(link = link.id.as_str(), length, "degenerate link, not sampled");
            return;
        }

        let accuracy = self.options.link_accuracy;
        let overlap = self.options.link_overlap_ratio();
        if !(is_positive(accuracy) && is_positive(overlap)) {
            tracing::debug!(
                link = link.id.as_str(),
                accuracy,
                overlap,
                "link accuracy or overlap is not positive, not sampled"
            );
            return;
        }

        let spacing = 2.0 * accuracy;
        let span = overlap * length / spacing;
        let (steps, stride) = if span <= MAX_PROBES_PER_LINK as f64 {
            (span.ceil() as usize, spacing / (length * overlap))
        } else {
            tracing::warn!(
                link = link.id.as_str(),
                span,
                max = MAX_PROBES_PER_LINK,
                "link needs too many probes, spreading the maximum evenly"
            );
            (MAX_PROBES_PER_LINK, 1.0 / MAX_PROBES_PER_LINK as f64)
        };
        for i in 1..steps {
            let fraction = i as f64 * stride;
            let p = geom::point_along(head, tail, fraction);
            self.probes.push(HitProbe {
                target: HitTarget::Link(link.id.clone()),
                x: p.x,
                y: p.y,
                accuracy,
                shape: self.options.link_model,
                coverage: Some(fraction),
            });
        }
    }

    /// The last probe in build order that contains `(x, y)`.
    pub fn probe_at(&self, x: f64, y: f64) -> Option<&HitProbe> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .map(|entry| entry.order)
            .filter(|&order| self.probes[order].hits(x, y))
            .max()
            .map(|order| &self.probes[order])
    }

    /// The entity under `(x, y)`, if any.
    pub fn item_at(&self, x: f64, y: f64) -> Option<HitTarget> {
        self.probe_at(x, y).map(|p| p.target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_derive_defaults_from_shapes() {
        let opts = HitTestOptions::default();
        assert_eq!(opts.node_accuracy(), 20.0);
        assert_eq!(opts.link_overlap_ratio(), 1.5);

        let square = HitTestOptions {
            node_model: ProbeShape::Square,
            link_model: ProbeShape::Square,
            ..Default::default()
        };
        assert_eq!(square.node_accuracy(), 25.0);
        assert_eq!(square.link_overlap_ratio(), 1.0);
    }

    #[test]
    fn shapes_use_strict_containment() {
        assert!(ProbeShape::Circle.contains(3.0, 4.0, 5.01));
        assert!(!ProbeShape::Circle.contains(3.0, 4.0, 5.0));
        assert!(ProbeShape::Square.contains(4.9, -4.9, 5.0));
        assert!(!ProbeShape::Square.contains(5.0, 0.0, 5.0));
        // Corner of the square lies outside the inscribed circle.
        assert!(ProbeShape::Square.contains(4.0, 4.0, 5.0));
        assert!(!ProbeShape::Circle.contains(4.0, 4.0, 5.0));
    }

    #[test]
    fn non_positive_accuracy_contains_nothing() {
        for shape in [ProbeShape::Circle, ProbeShape::Square] {
            assert!(!shape.contains(0.0, 0.0, 0.0));
            assert!(!shape.contains(10.0, 0.0, -20.0));
            assert!(!shape.contains(0.0, 0.0, f64::NAN));
        }
    }

    #[test]
    fn validate_rejects_non_positive_and_non_finite_values() {
        assert!(HitTestOptions::default().validate().is_ok());

        let cases = [
            (
                HitTestOptions {
                    node_accuracy: Some(-20.0),
                    ..Default::default()
                },
                "nodeAccuracy",
            ),
            (
                HitTestOptions {
                    link_accuracy: 0.0,
                    ..Default::default()
                },
                "linkAccuracy",
            ),
            (
                HitTestOptions {
                    link_overlap_ratio: Some(f64::INFINITY),
                    ..Default::default()
                },
                "linkOverlapRatio",
            ),
        ];
        for (opts, expected) in cases {
            match opts.validate() {
                Err(Error::InvalidHitTestOption { option, .. }) => assert_eq!(option, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    fn two_nodes() -> Vec<Node> {
        let mut a = Node::new("a");
        a.set_position(0.0, 0.0);
        let mut b = Node::new("b");
        b.set_position(100.0, 0.0);
        vec![a, b]
    }

    fn connect(index: &mut SpatialIndex, nodes: &[Node], links: &[Link]) {
        index.connect(nodes, links, |id| {
            nodes.iter().find(|n| n.id == id).map(|n| n.position)
        });
    }

    #[test]
    fn unchecked_options_sample_nothing() {
        let nodes = two_nodes();
        let links = [Link::new("a", "b")];
        let mut index = SpatialIndex::new(HitTestOptions {
            node_accuracy: Some(-20.0),
            link_accuracy: -10.0,
            ..Default::default()
        });
        connect(&mut index, &nodes, &links);
        assert!(index.is_empty());
        assert_eq!(index.item_at(10.0, 0.0), None);
    }

    #[test]
    fn tiny_link_accuracy_is_capped_per_link() {
        let nodes = two_nodes();
        let links = [Link::new("a", "b")];
        let mut index = SpatialIndex::new(HitTestOptions {
            link_accuracy: 1e-300,
            ..Default::default()
        });
        connect(&mut index, &nodes, &links);

        let link_probes: Vec<_> = index
            .probes()
            .iter()
            .filter_map(|p| p.coverage)
            .collect();
        assert_eq!(link_probes.len(), MAX_PROBES_PER_LINK - 1);
        assert!(link_probes.iter().all(|c| *c > 0.0 && *c < 1.0));
        assert_eq!(index.probes().len(), MAX_PROBES_PER_LINK + 1);
    }

    #[test]
    fn tree_lookup_prefers_the_latest_overlapping_entry() {
        let mut nodes = two_nodes();
        nodes[1].set_position(5.0, 0.0);
        let mut index = SpatialIndex::new(HitTestOptions::default());
        connect(&mut index, &nodes, &[]);

        assert_eq!(index.item_at(2.0, 0.0), Some(HitTarget::Node("b".into())));
        assert_eq!(index.item_at(-18.0, 0.0), Some(HitTarget::Node("a".into())));
        // Inside both boxes, outside both disks.
        assert_eq!(index.item_at(2.5, 19.9), None);
        assert_eq!(index.item_at(f64::NAN, 0.0), None);
    }

    #[test]
    fn coverage_ratio_is_symmetric_around_midpoint() {
        let probe = |c: f64| HitProbe {
            target: HitTarget::Link("a:b".into()),
            x: 0.0,
            y: 0.0,
            accuracy: 10.0,
            shape: ProbeShape::Circle,
            coverage: Some(c),
        };
        let near_head = probe(0.1).coverage_ratio();
        let near_tail = probe(0.9).coverage_ratio();
        assert!((near_head - near_tail).abs() < 1e-12);
        assert_eq!(probe(0.0).coverage_ratio(), 0.5);
        assert!((probe(0.5).coverage_ratio() - (0.5 + 2f64.ln())).abs() < 1e-12);
    }
}
