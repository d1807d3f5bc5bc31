//! Node placement policies.
//!
//! Every policy writes positions in place and draws all randomness from the caller's RNG, so a
//! seeded RNG yields identical placements across runs.

use crate::geom::{Point, distance, point};
use crate::model::Node;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Placement policy, selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutPolicy {
    /// Independent uniform draw per node.
    #[default]
    Random,
    /// One angular sector per node around the surface center.
    RandomCircle,
    /// One grid cell per node.
    RandomSquare,
    /// Rejection sampling with a minimum pairwise separation.
    Harmony,
}

impl LayoutPolicy {
    /// Resolves a policy name; unknown names fall back to [`LayoutPolicy::Random`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "random" => Self::Random,
            "random-circle" => Self::RandomCircle,
            "random-square" => Self::RandomSquare,
            "harmony" => Self::Harmony,
            other => {
                tracing::debug!(policy = other, "unknown layout policy, using `random`");
                Self::Random
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::RandomCircle => "random-circle",
            Self::RandomSquare => "random-square",
            Self::Harmony => "harmony",
        }
    }
}

impl std::str::FromStr for LayoutPolicy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for LayoutPolicy {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<LayoutPolicy> for String {
    fn from(value: LayoutPolicy) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for LayoutPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Radius used by `random-circle`. `None` draws a random radius per node instead.
    pub circle_radius: Option<f64>,
    /// Candidate draws per node before `harmony` settles for its best candidate.
    pub harmony_max_attempts: usize,
}

impl LayoutOptions {
    pub const DEFAULT_CIRCLE_RADIUS: f64 = 125.0;
    pub const DEFAULT_HARMONY_MAX_ATTEMPTS: usize = 10_000;
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            circle_radius: Some(Self::DEFAULT_CIRCLE_RADIUS),
            harmony_max_attempts: Self::DEFAULT_HARMONY_MAX_ATTEMPTS,
        }
    }
}

/// Surface extent and node radius the policies place into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

impl LayoutBounds {
    pub fn min_x(&self) -> f64 {
        self.radius
    }

    pub fn max_x(&self) -> f64 {
        self.width - self.radius
    }

    pub fn min_y(&self) -> f64 {
        self.radius
    }

    pub fn max_y(&self) -> f64 {
        self.height - self.radius
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Center used by `random-circle`. Both coordinates derive from the width.
    pub fn circle_center(&self) -> Point {
        point(self.width / 2.0, self.width / 2.0)
    }
}

/// Grid used by `random-square` for `n` nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareGrid {
    pub cols: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl SquareGrid {
    pub fn new(n: usize, bounds: &LayoutBounds) -> Self {
        let cols = ((n as f64).sqrt().ceil() as usize).max(1);
        let rows = n.div_ceil(cols).max(1);
        Self {
            cols,
            rows,
            cell_width: (bounds.width - 2.0 * bounds.radius) / cols as f64,
            cell_height: (bounds.height - 2.0 * bounds.radius) / rows as f64,
        }
    }

    /// `(column, row)` of the `i`-th node.
    pub fn cell_of(&self, i: usize) -> (usize, usize) {
        (i % self.cols, i / self.cols)
    }
}

/// Minimum pairwise separation `harmony` aims for with `n` nodes.
pub fn harmony_separation(width: f64, height: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (width * height / (PI * n as f64)).sqrt()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub policy: LayoutPolicy,
    pub placed: usize,
    /// Nodes `harmony` placed below the target separation after running out of attempts.
    pub relaxed: Vec<String>,
    pub min_separation: Option<f64>,
}

impl LayoutReport {
    fn new(policy: LayoutPolicy, placed: usize) -> Self {
        Self {
            policy,
            placed,
            relaxed: Vec::new(),
            min_separation: None,
        }
    }
}

/// Places every node according to `policy`.
pub fn organize<'a, R>(
    nodes: impl IntoIterator<Item = &'a mut Node>,
    bounds: LayoutBounds,
    policy: LayoutPolicy,
    opts: &LayoutOptions,
    rng: &mut R,
) -> LayoutReport
where
    R: Rng + ?Sized,
{
    let mut nodes: Vec<&'a mut Node> = nodes.into_iter().collect();
    tracing::debug!(policy = policy.as_str(), nodes = nodes.len(), "organize");
    match policy {
        LayoutPolicy::Random => random(&mut nodes, &bounds, rng),
        LayoutPolicy::RandomCircle => random_circle(&mut nodes, &bounds, opts, rng),
        LayoutPolicy::RandomSquare => random_square(&mut nodes, &bounds, rng),
        LayoutPolicy::Harmony => harmony(&mut nodes, &bounds, opts, rng),
    }
}

fn random<R: Rng + ?Sized>(
    nodes: &mut [&mut Node],
    bounds: &LayoutBounds,
    rng: &mut R,
) -> LayoutReport {
    for node in nodes.iter_mut() {
        let x = uniform(rng, bounds.min_x(), bounds.max_x());
        let y = uniform(rng, bounds.min_y(), bounds.max_y());
        node.set_position(x, y);
    }
    LayoutReport::new(LayoutPolicy::Random, nodes.len())
}

fn random_circle<R: Rng + ?Sized>(
    nodes: &mut [&mut Node],
    bounds: &LayoutBounds,
    opts: &LayoutOptions,
    rng: &mut R,
) -> LayoutReport {
    let n = nodes.len();
    if n == 0 {
        return LayoutReport::new(LayoutPolicy::RandomCircle, 0);
    }

    let center = bounds.circle_center();
    let sector = 2.0 * PI / n as f64;
    for (i, node) in nodes.iter_mut().enumerate() {
        let start = sector * i as f64;
        let theta = uniform(rng, start, start + sector);
        let rho = match opts.circle_radius {
            Some(r) => r,
            None => uniform(rng, 0.0, bounds.width / 2.0 - bounds.radius),
        };
        node.set_position(center.x + rho * theta.cos(), center.y + rho * theta.sin());
    }
    LayoutReport::new(LayoutPolicy::RandomCircle, n)
}

fn random_square<R: Rng + ?Sized>(
    nodes: &mut [&mut Node],
    bounds: &LayoutBounds,
    rng: &mut R,
) -> LayoutReport {
    let n = nodes.len();
    if n == 0 {
        return LayoutReport::new(LayoutPolicy::RandomSquare, 0);
    }

    let grid = SquareGrid::new(n, bounds);
    let r = bounds.radius;
    for (i, node) in nodes.iter_mut().enumerate() {
        let (col, row) = grid.cell_of(i);
        let x0 = bounds.min_x() + col as f64 * grid.cell_width;
        let y0 = bounds.min_y() + row as f64 * grid.cell_height;
        let x = uniform(rng, x0 + r, x0 + grid.cell_width - r);
        let y = uniform(rng, y0 + r, y0 + grid.cell_height - r);
        node.set_position(x, y);
    }
    LayoutReport::new(LayoutPolicy::RandomSquare, n)
}

fn harmony<R: Rng + ?Sized>(
    nodes: &mut [&mut Node],
    bounds: &LayoutBounds,
    opts: &LayoutOptions,
    rng: &mut R,
) -> LayoutReport {
    let n = nodes.len();
    let mut report = LayoutReport::new(LayoutPolicy::Harmony, n);
    if n == 0 {
        return report;
    }

    let separation = harmony_separation(bounds.width, bounds.height, n);
    report.min_separation = Some(separation);
    let max_attempts = opts.harmony_max_attempts.max(1);
    let mut placed: Vec<Point> = Vec::with_capacity(n);

    for node in nodes.iter_mut() {
        let mut best: Option<(Point, f64)> = None;
        let mut accepted = None;
        for _ in 0..max_attempts {
            let candidate = point(
                uniform(rng, bounds.min_x(), bounds.max_x()),
                uniform(rng, bounds.min_y(), bounds.max_y()),
            );
            let nearest = placed
                .iter()
                .map(|p| distance(*p, candidate))
                .fold(f64::INFINITY, f64::min);
            if nearest > separation {
                accepted = Some(candidate);
                break;
            }
            if best.is_none_or(|(_, d)| nearest > d) {
                best = Some((candidate, nearest));
            }
        }

        let chosen = match (accepted, best) {
            (Some(p), _) => p,
            (None, Some((p, nearest))) => {
                tracing::warn!(
                    node = node.id.as_str(),
                    nearest,
                    separation,
                    max_attempts,
                    "harmony ran out of attempts, keeping best candidate"
                );
                report.relaxed.push(node.id.clone());
                p
            }
            (None, None) => point(bounds.min_x(), bounds.min_y()),
        };
        node.position = chosen;
        placed.push(chosen);
    }
    report
}

/// Uniform draw in `[lo, hi)`; collapses to the midpoint when the range is empty.
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}
