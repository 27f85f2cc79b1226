//! Force descriptors contributing velocity to nodes each step.
//!
//! Every force sees the whole node slice at once and adds to `vx`/`vy`;
//! positions are only integrated by the engine after all forces ran.

use std::fmt::Debug;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::simulation::Node;

/// When a force runs within a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
	/// Long-range fields: repulsion, centering, pointer follow.
	Field,
	/// Short-range corrections that must win over fields, such as collision.
	Resolve,
}

/// A named, swappable rule installed on a [`Simulation`](super::Simulation).
pub trait Force: Debug {
	/// Add this force's contribution, scaled by `alpha`, to each node's velocity.
	fn apply(&mut self, nodes: &mut [Node], alpha: f64, jiggle: &mut Jiggle);

	/// Defaults to [`Stage::Field`].
	fn stage(&self) -> Stage {
		Stage::Field
	}
}

/// Per-node strength of a force.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Strength {
	/// The same for every node.
	Constant(f64),
	/// `base + depth * per_depth`
	ByDepth {
		/// Strength at the root.
		base: f64,
		/// Added per level below the root.
		per_depth: f64,
	},
}

impl Strength {
	/// Strength applied to `node`.
	pub fn of(&self, node: &Node) -> f64 {
		match *self {
			Strength::Constant(s) => s,
			Strength::ByDepth { base, per_depth } => base + node.depth as f64 * per_depth,
		}
	}
}

/// Tiny random offsets used to separate coincident nodes.
#[derive(Clone, Debug)]
pub struct Jiggle(SmallRng);

impl Jiggle {
	/// Deterministic for a given `seed`.
	pub fn new(seed: u64) -> Self {
		Self(SmallRng::seed_from_u64(seed))
	}

	/// A value in `[-5e-7, 5e-7)`.
	pub fn sample(&mut self) -> f64 {
		(self.0.r#gen::<f64>() - 0.5) * 1e-6
	}
}

/// Pairwise repulsion (negative strength) or attraction (positive).
///
/// Naive O(n²) over all pairs. A Barnes-Hut quadtree is the usual upgrade
/// once graphs grow past a few hundred nodes.
#[derive(Clone, Debug)]
pub struct ManyBody {
	/// Strength of the node being acted on by the other.
	pub strength: Strength,
	/// Closer pairs are treated as this far apart.
	pub distance_min: f64,
	/// Pairs at least this far apart are skipped.
	pub distance_max: f64,
}

impl ManyBody {
	/// Uniform strength with no distance cut-off.
	pub fn new(strength: f64) -> Self {
		Self {
			strength: Strength::Constant(strength),
			distance_min: 1.0,
			distance_max: f64::INFINITY,
		}
	}
}

impl Force for ManyBody {
	fn apply(&mut self, nodes: &mut [Node], alpha: f64, jiggle: &mut Jiggle) {
		let (min2, max2) = (
			self.distance_min * self.distance_min,
			self.distance_max * self.distance_max,
		);
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let (mut dx, mut dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
				if dx == 0.0 {
					dx = jiggle.sample();
				}
				if dy == 0.0 {
					dy = jiggle.sample();
				}
				let mut l = dx * dx + dy * dy;
				if l >= max2 {
					continue;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}

				let wi = self.strength.of(&nodes[j]) * alpha / l;
				let wj = self.strength.of(&nodes[i]) * alpha / l;
				nodes[i].vx += dx * wi;
				nodes[i].vy += dy * wi;
				nodes[j].vx -= dx * wj;
				nodes[j].vy -= dy * wj;
			}
		}
	}
}

/// Pushes overlapping circles apart in proportion to the overlap depth.
#[derive(Clone, Debug)]
pub struct Collide {
	/// Radius of every node's circle.
	pub radius: f64,
	/// 0..=1, share of the overlap resolved per step.
	pub strength: f64,
}

impl Collide {
	/// Full-strength collision at `radius`.
	pub fn new(radius: f64) -> Self {
		Self {
			radius,
			strength: 1.0,
		}
	}
}

impl Force for Collide {
	fn apply(&mut self, nodes: &mut [Node], _alpha: f64, jiggle: &mut Jiggle) {
		let r = self.radius * 2.0;
		// equal radii, so each side of a pair takes half of the correction
		let ratio = 0.5;
		for i in 0..nodes.len() {
			let (xi, yi) = (nodes[i].x + nodes[i].vx, nodes[i].y + nodes[i].vy);
			for j in (i + 1)..nodes.len() {
				let mut x = xi - (nodes[j].x + nodes[j].vx);
				let mut y = yi - (nodes[j].y + nodes[j].vy);
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = jiggle.sample();
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle.sample();
					l += y * y;
				}
				let l = l.sqrt();
				let push = (r - l) / l * self.strength;
				let (px, py) = (x * push, y * push);
				nodes[i].vx += px * ratio;
				nodes[i].vy += py * ratio;
				nodes[j].vx -= px * (1.0 - ratio);
				nodes[j].vy -= py * (1.0 - ratio);
			}
		}
	}

	fn stage(&self) -> Stage {
		Stage::Resolve
	}
}

/// Moves the centroid toward `(x, y)` without changing relative positions.
#[derive(Clone, Debug)]
pub struct Center {
	/// Target x.
	pub x: f64,
	/// Target y.
	pub y: f64,
	/// Share of the offset corrected per step at alpha 1.
	pub strength: f64,
}

impl Center {
	/// Centering at strength 0.1.
	pub fn new(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			strength: 0.1,
		}
	}
}

impl Force for Center {
	fn apply(&mut self, nodes: &mut [Node], alpha: f64, _jiggle: &mut Jiggle) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let k = self.strength * alpha;
		let (dx, dy) = ((self.x - sx / n) * k, (self.y - sy / n) * k);
		for node in nodes.iter_mut() {
			node.vx += dx;
			node.vy += dy;
		}
	}
}

/// Pulls every node toward a point with its own strength.
#[derive(Clone, Debug)]
pub struct PointerFollow {
	/// Pointer x.
	pub x: f64,
	/// Pointer y.
	pub y: f64,
	/// Usually [`Strength::ByDepth`], so deeper nodes follow harder.
	pub strength: Strength,
}

impl Force for PointerFollow {
	fn apply(&mut self, nodes: &mut [Node], alpha: f64, _jiggle: &mut Jiggle) {
		for node in nodes.iter_mut() {
			let k = self.strength.of(node) * alpha;
			node.vx += (self.x - node.x) * k;
			node.vy += (self.y - node.y) * k;
		}
	}
}
