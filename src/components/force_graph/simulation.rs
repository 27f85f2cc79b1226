//! The layout engine: node state, the named force registry and the alpha
//! schedule.

use std::collections::HashMap;
use std::f64::consts::PI;

use indexmap::IndexMap;
use log::debug;

use super::config::SimulationConfig;
use super::error::{LayoutError, Result};
use super::forces::{Force, Jiggle, Stage};
use super::types::{GraphLink, GraphNode};

const INITIAL_RADIUS: f64 = 10.0;

/// A node as the engine moves it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Id from the input graph.
	pub id: String,
	/// Distance from the hierarchy root.
	pub depth: usize,
	/// Position.
	pub x: f64,
	/// Position.
	pub y: f64,
	/// Velocity carried into the next step.
	pub vx: f64,
	/// Velocity carried into the next step.
	pub vy: f64,
	/// Position override while pinned.
	pub fixed: Option<(f64, f64)>,
}

impl Node {
	/// Whether the node is held in place.
	pub fn is_pinned(&self) -> bool {
		self.fixed.is_some()
	}
}

/// Parent/child relation by node index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
	/// Parent index.
	pub source: usize,
	/// Child index.
	pub target: usize,
}

/// Read-only view of the engine after a step.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
	/// Every node, in input order.
	pub nodes: &'a [Node],
	/// Alpha used for the step.
	pub alpha: f64,
}

/// Iterative force-directed layout over a fixed node set.
#[derive(Debug)]
pub struct Simulation {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
	forces: IndexMap<String, Box<dyn Force>>,
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	steps: u64,
	jiggle: Jiggle,
}

impl Simulation {
	/// Build an engine over `nodes`, resolving every link by node id.
	///
	/// Nodes are laid out on a phyllotaxis spiral around `config.origin`
	/// with zero velocity.
	pub fn initialize(
		nodes: &[GraphNode],
		links: &[GraphLink],
		config: SimulationConfig,
	) -> Result<Self> {
		let index: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();

		let resolve = |link: usize, id: &str| {
			index
				.get(id)
				.copied()
				.ok_or_else(|| LayoutError::InvalidTopology {
					link,
					id: id.to_string(),
				})
		};
		let links = links
			.iter()
			.enumerate()
			.map(|(i, l)| -> Result<Link> {
				Ok(Link {
					source: resolve(i, &l.source)?,
					target: resolve(i, &l.target)?,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		let angle_step = PI * (3.0 - 5f64.sqrt());
		let (ox, oy) = config.origin;
		let nodes = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * angle_step;
				Node {
					id: n.id.clone(),
					depth: n.depth,
					x: ox + radius * angle.cos(),
					y: oy + radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					fixed: None,
				}
			})
			.collect::<Vec<_>>();

		debug!(
			"simulation initialized with {} nodes and {} links",
			nodes.len(),
			links.len()
		);

		Ok(Self {
			nodes,
			links,
			index,
			forces: IndexMap::new(),
			alpha: config.alpha,
			alpha_target: config.alpha_target,
			steps: 0,
			jiggle: Jiggle::new(config.seed),
			config,
		})
	}

	/// Install `force` under `name`, replacing any force with that name.
	///
	/// A replaced force keeps its place in the evaluation order.
	pub fn set_force(&mut self, name: impl Into<String>, force: impl Force + 'static) {
		self.forces.insert(name.into(), Box::new(force));
	}

	/// Remove the force named `name`; `false` if there was none.
	pub fn clear_force(&mut self, name: &str) -> bool {
		self.forces.shift_remove(name).is_some()
	}

	/// Whether a force is installed under `name`.
	pub fn has_force(&self, name: &str) -> bool {
		self.forces.contains_key(name)
	}

	/// Advance the layout by one step.
	///
	/// Without `boost` alpha moves toward its target by the decay rate;
	/// with it, alpha is raised to at least that value for this step.
	pub fn step(&mut self, boost: Option<f64>) -> Snapshot<'_> {
		self.alpha = match boost {
			Some(floor) => self.alpha.max(floor).min(1.0),
			None => self.alpha + (self.alpha_target - self.alpha) * self.config.alpha_decay,
		};
		self.steps += 1;

		if !self.nodes.is_empty() {
			for stage in [Stage::Field, Stage::Resolve] {
				for force in self.forces.values_mut().filter(|f| f.stage() == stage) {
					force.apply(&mut self.nodes, self.alpha, &mut self.jiggle);
				}
			}
			let keep = 1.0 - self.config.velocity_decay;
			for node in &mut self.nodes {
				match node.fixed {
					Some((fx, fy)) => {
						node.x = fx;
						node.y = fy;
						node.vx = 0.0;
						node.vy = 0.0;
					}
					None => {
						node.vx *= keep;
						node.vy *= keep;
						node.x += node.vx;
						node.y += node.vy;
					}
				}
			}
		}

		Snapshot {
			nodes: &self.nodes,
			alpha: self.alpha,
		}
	}

	/// Alpha has fallen below `alpha_min`.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min
	}

	/// Hold a node at `(x, y)` until [`unpin`](Self::unpin).
	///
	/// Returns `false` if no node has this id.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.fixed = Some((x, y));
		node.x = x;
		node.y = y;
		node.vx = 0.0;
		node.vy = 0.0;
		true
	}

	/// Release a pinned node; `false` if no node has this id.
	pub fn unpin(&mut self, id: &str) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		self.nodes[i].fixed = None;
		true
	}

	/// Raise alpha to at least `alpha`, waking a settled layout.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha).min(1.0);
	}

	/// Temperature alpha decays toward from now on.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// See [`set_alpha_target`](Self::set_alpha_target).
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Steps taken since initialization.
	pub fn step_count(&self) -> u64 {
		self.steps
	}

	/// Nodes in input order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Resolved links in input order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Position of `id` in [`nodes`](Self::nodes).
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Parameters the engine was built with.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}
}
