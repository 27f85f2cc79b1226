//! Canvas-side bookkeeping: what was drawn where, the node under the
//! pointer, and per-node emphasis transitions.

/// Pointer travel, in pixels, below which a press still counts as a click.
const CLICK_SLOP: f64 = 3.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Where a node's circle was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeHit {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

/// Node circles as drawn in the last frame.
#[derive(Clone, Debug, Default)]
pub struct HitMap {
	nodes: Vec<NodeHit>,
}

impl HitMap {
	pub fn clear(&mut self) {
		self.nodes.clear();
	}

	pub fn push(&mut self, hit: NodeHit) {
		self.nodes.push(hit);
	}

	/// The topmost node whose circle contains `(x, y)`.
	pub fn node_at(&self, x: f64, y: f64) -> Option<&NodeHit> {
		self.nodes.iter().rev().find(|n| {
			let (dx, dy) = (n.x - x, n.y - y);
			dx * dx + dy * dy <= n.radius * n.radius
		})
	}
}

/// A node drag in progress, tracked as an offset from where it started so
/// the node doesn't jump to the pointer.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Set once the pointer travels past the click slop; survives `end`
	/// so the click that follows the release can be told apart.
	pub moved: bool,
}

impl DragState {
	pub fn begin(&mut self, hit: &NodeHit, x: f64, y: f64) {
		self.node = Some(hit.id.clone());
		self.start_x = x;
		self.start_y = y;
		self.node_start_x = hit.x;
		self.node_start_y = hit.y;
		self.moved = false;
	}

	/// Follow the pointer to `(x, y)` and return where the dragged node
	/// should sit.
	pub fn track(&mut self, x: f64, y: f64) -> Option<(&str, f64, f64)> {
		let id = self.node.as_deref()?;
		let (dx, dy) = (x - self.start_x, y - self.start_y);
		if dx * dx + dy * dy > CLICK_SLOP * CLICK_SLOP {
			self.moved = true;
		}
		Some((id, self.node_start_x + dx, self.node_start_y + dy))
	}

	pub fn end(&mut self) -> Option<String> {
		self.node.take()
	}

	/// Whether the last press dragged its node, clearing the flag.
	pub fn take_moved(&mut self) -> bool {
		std::mem::take(&mut self.moved)
	}
}

/// Transition between normal (0) and emphasized (1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emphasis {
	from: f64,
	to: f64,
	start: f64,
	duration: f64,
}

impl Emphasis {
	pub fn new(duration: f64) -> Self {
		Self {
			from: 0.0,
			to: 0.0,
			start: f64::NEG_INFINITY,
			duration,
		}
	}

	/// Head toward the emphasized or normal look, starting at `now`.
	pub fn set(&mut self, active: bool, now: f64) {
		let to = if active { 1.0 } else { 0.0 };
		if to == self.to {
			return;
		}
		self.from = self.level(now);
		self.to = to;
		self.start = now;
	}

	/// Eased emphasis level at `now`.
	pub fn level(&self, now: f64) -> f64 {
		let progress = if self.duration <= 0.0 {
			1.0
		} else {
			((now - self.start) / self.duration).clamp(0.0, 1.0)
		};
		self.from + (self.to - self.from) * ease_out_cubic(progress)
	}

	pub fn in_flight(&self, now: f64) -> bool {
		now - self.start < self.duration
	}
}
