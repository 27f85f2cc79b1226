//! Drives the layout engine from display refresh ticks and feeds pointer,
//! resize and drag perturbations into it.

use std::collections::HashSet;

use log::{debug, info};

use super::config::{ForceConfig, InteractionConfig, SimulationConfig};
use super::error::Result;
use super::forces::{Center, Collide, ManyBody, PointerFollow, Strength};
use super::simulation::Simulation;
use super::types::GraphData;

/// Registry name of the centering force.
pub const CENTER_FORCE: &str = "center";
/// Registry name of the many-body repulsion.
pub const CHARGE_FORCE: &str = "charge";
/// Registry name of the collision force.
pub const COLLIDE_FORCE: &str = "collide";
/// Registry name of the pointer-follow force, present once the pointer moved.
pub const POINTER_FORCE: &str = "pointer";

/// One node as it should be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFrame<'a> {
	/// Node id.
	pub id: &'a str,
	/// Position.
	pub x: f64,
	/// Position.
	pub y: f64,
	/// Distance from the root.
	pub depth: usize,
	/// Whether the node is emphasized.
	pub active: bool,
}

/// One link, by endpoint id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkFrame<'a> {
	/// Parent id.
	pub source: &'a str,
	/// Child id.
	pub target: &'a str,
}

/// Everything a sink needs to draw one tick.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
	/// Nodes in engine order.
	pub nodes: Vec<NodeFrame<'a>>,
	/// Links in engine order.
	pub links: Vec<LinkFrame<'a>>,
	/// Engine temperature at this frame.
	pub alpha: f64,
	/// Timestamp of the tick in milliseconds.
	pub time: f64,
}

impl<'a> Frame<'a> {
	fn collect(simulation: &'a Simulation, active: &[bool], time: f64) -> Self {
		let nodes = simulation.nodes();
		Self {
			nodes: nodes
				.iter()
				.zip(active)
				.map(|(n, &active)| NodeFrame {
					id: &n.id,
					x: n.x,
					y: n.y,
					depth: n.depth,
					active,
				})
				.collect(),
			links: simulation
				.links()
				.iter()
				.map(|l| LinkFrame {
					source: &nodes[l.source].id,
					target: &nodes[l.target].id,
				})
				.collect(),
			alpha: simulation.alpha(),
			time,
		}
	}
}

/// Receives a frame on every tick that produced something to draw.
pub trait RenderSink {
	/// Draw `frame`.
	fn render(&mut self, frame: &Frame<'_>);

	/// Whether the sink still has a transition in flight and wants frames
	/// while the layout is idle.
	fn is_animating(&self) -> bool {
		false
	}
}

/// Lifecycle of an [`InteractionLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
	/// Stepping the engine every tick.
	Running,
	/// Settled; the next perturbation resumes stepping.
	Idle,
	/// Cancelled by the owner; ticks do nothing until restarted.
	Stopped,
}

/// Outcome of a single [`InteractionLoop::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
	/// The engine stepped and the sink got a frame.
	Stepped,
	/// Idle, but the sink was handed the current positions again.
	Redrawn,
	/// Nothing to do.
	Idle,
	/// The loop is stopped; the caller should stop scheduling ticks.
	Stopped,
}

/// Owns an engine and a sink, and turns display ticks and input events
/// into layout steps and frames.
pub struct InteractionLoop<S> {
	simulation: Simulation,
	sink: S,
	config: InteractionConfig,
	state: LoopState,
	center: (f64, f64),
	/// Last pointer position the follow force was aimed at.
	pointer: Option<(f64, f64)>,
	pending_pointer: Option<(f64, f64)>,
	pending_viewport: Option<(f64, f64)>,
	boost: Option<f64>,
	dragging: HashSet<String>,
	active: Vec<bool>,
	redraw: bool,
}

/// Register the centering, repulsion and collision forces.
pub fn install_forces(simulation: &mut Simulation, forces: &ForceConfig, center: (f64, f64)) {
	simulation.set_force(CENTER_FORCE, center_force(forces, center));
	simulation.set_force(CHARGE_FORCE, ManyBody::new(forces.charge_strength));
	simulation.set_force(
		COLLIDE_FORCE,
		Collide {
			radius: forces.collide_radius,
			strength: forces.collide_strength,
		},
	);
}

fn center_force(forces: &ForceConfig, (x, y): (f64, f64)) -> Center {
	Center {
		x,
		y,
		strength: forces.center_strength,
	}
}

fn pointer_force(forces: &ForceConfig, (x, y): (f64, f64)) -> PointerFollow {
	PointerFollow {
		x,
		y,
		strength: Strength::ByDepth {
			base: forces.follow_base,
			per_depth: forces.follow_per_depth,
		},
	}
}

impl<S: RenderSink> InteractionLoop<S> {
	/// Start ticking `simulation` as is; its forces are left untouched.
	pub fn start(simulation: Simulation, sink: S, config: InteractionConfig) -> Self {
		let center = simulation.config().origin;
		let active = vec![false; simulation.nodes().len()];
		Self {
			simulation,
			sink,
			config,
			state: LoopState::Running,
			center,
			pointer: None,
			pending_pointer: None,
			pending_viewport: None,
			boost: None,
			dragging: HashSet::new(),
			active,
			redraw: false,
		}
	}

	/// Build an engine for `data` centered in a `width` x `height` viewport,
	/// install the default forces and start ticking.
	pub fn from_graph(
		data: &GraphData,
		(width, height): (f64, f64),
		sink: S,
		config: InteractionConfig,
	) -> Result<Self> {
		let center = (width / 2.0, height / 2.0);
		let simulation = build_simulation(data, &config, center)?;
		Ok(Self::start(simulation, sink, config))
	}

	/// Replace the graph with a freshly initialized engine that keeps the
	/// current center and pointer-follow target.
	///
	/// On error the current engine keeps running.
	pub fn reload(&mut self, data: &GraphData) -> Result<()> {
		let mut simulation = build_simulation(data, &self.config, self.center)?;
		if let Some(pointer) = self.pending_pointer.take().or(self.pointer) {
			self.pointer = Some(pointer);
			simulation.set_force(POINTER_FORCE, pointer_force(&self.config.forces, pointer));
		}
		info!("reloaded graph with {} nodes", data.nodes.len());
		self.active = vec![false; simulation.nodes().len()];
		self.simulation = simulation;
		self.dragging.clear();
		self.boost = None;
		if self.state == LoopState::Idle {
			self.state = LoopState::Running;
		}
		Ok(())
	}

	/// Resume ticking after [`stop`](Self::stop).
	pub fn restart(&mut self) {
		if self.state != LoopState::Running {
			self.state = LoopState::Running;
			self.boost = Some(self.config.reheat_alpha);
		}
	}

	/// Cancel ticking. Ticks already queued by the scheduler become no-ops.
	pub fn stop(&mut self) {
		if self.state != LoopState::Stopped {
			debug!("interaction loop stopped");
		}
		self.state = LoopState::Stopped;
	}

	/// Handle one display refresh at time `now` (milliseconds).
	pub fn tick(&mut self, now: f64) -> Tick {
		if self.state == LoopState::Stopped {
			return Tick::Stopped;
		}
		self.apply_pending();

		if self.state == LoopState::Idle {
			if !self.redraw && !self.sink.is_animating() {
				return Tick::Idle;
			}
			self.emit(now);
			return Tick::Redrawn;
		}

		self.simulation.step(self.boost.take());
		self.emit(now);
		if self.config.auto_stop && self.simulation.is_settled() {
			debug!(
				"layout settled after {} steps",
				self.simulation.step_count()
			);
			self.state = LoopState::Idle;
		}
		Tick::Stepped
	}

	/// Point the pointer-follow force at `(x, y)`. Coalesced per tick.
	pub fn on_pointer_move(&mut self, x: f64, y: f64) {
		self.pending_pointer = Some((x, y));
		self.perturb();
	}

	/// Re-center the layout in the new viewport. Coalesced per tick.
	pub fn on_resize(&mut self, width: f64, height: f64) {
		self.pending_viewport = Some((width, height));
		self.perturb();
	}

	/// Pin `id` where it is and keep the layout warm while it is held.
	pub fn on_drag_start(&mut self, id: &str) {
		let Some((x, y)) = self.simulation.node(id).map(|n| (n.x, n.y)) else {
			debug!("drag start on unknown node `{id}` ignored");
			return;
		};
		self.simulation.pin(id, x, y);
		self.dragging.insert(id.to_string());
		self.simulation
			.set_alpha_target(self.config.drag_alpha_target);
		self.perturb();
	}

	/// Move a dragged node to `(x, y)`.
	pub fn on_drag(&mut self, id: &str, x: f64, y: f64) {
		if !self.dragging.contains(id) {
			debug!("drag on `{id}` without drag start ignored");
			return;
		}
		self.simulation.pin(id, x, y);
		self.wake();
	}

	/// Release a dragged node back to the forces.
	pub fn on_drag_end(&mut self, id: &str) {
		if !self.dragging.remove(id) {
			return;
		}
		self.simulation.unpin(id);
		if self.dragging.is_empty() {
			self.simulation.set_alpha_target(0.0);
		}
	}

	/// Emphasize a node. Only affects what the sink draws.
	pub fn on_node_activate(&mut self, id: &str) {
		self.set_active(id, true);
	}

	/// Return a node to its normal look.
	pub fn on_node_deactivate(&mut self, id: &str) {
		self.set_active(id, false);
	}

	/// Return every node to its normal look.
	pub fn clear_activation(&mut self) {
		self.active.iter_mut().for_each(|a| *a = false);
		self.redraw = true;
	}

	/// Current lifecycle state.
	pub fn state(&self) -> LoopState {
		self.state
	}

	/// The engine being driven.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// The sink frames go to.
	pub fn sink(&self) -> &S {
		&self.sink
	}

	/// Mutable access to the sink, e.g. to resize a canvas.
	pub fn sink_mut(&mut self) -> &mut S {
		&mut self.sink
	}

	/// Point the centering force aims at.
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Whether `id` is emphasized.
	pub fn is_active(&self, id: &str) -> bool {
		self.simulation
			.index_of(id)
			.is_some_and(|i| self.active[i])
	}

	/// Whether `id` is currently held.
	pub fn is_dragging(&self, id: &str) -> bool {
		self.dragging.contains(id)
	}

	fn set_active(&mut self, id: &str, active: bool) {
		match self.simulation.index_of(id) {
			Some(i) => {
				self.active[i] = active;
				self.redraw = true;
			}
			None => debug!("activation change on unknown node `{id}` ignored"),
		}
	}

	/// Reheat on the next step and leave the idle state.
	fn perturb(&mut self) {
		let reheat = self.config.reheat_alpha;
		self.boost = Some(self.boost.map_or(reheat, |b| b.max(reheat)));
		self.wake();
	}

	fn wake(&mut self) {
		if self.state == LoopState::Idle {
			self.state = LoopState::Running;
		}
	}

	fn apply_pending(&mut self) {
		if let Some((width, height)) = self.pending_viewport.take() {
			self.center = (width / 2.0, height / 2.0);
			self.simulation
				.set_force(CENTER_FORCE, center_force(&self.config.forces, self.center));
		}
		if let Some(pointer) = self.pending_pointer.take() {
			self.pointer = Some(pointer);
			self.simulation
				.set_force(POINTER_FORCE, pointer_force(&self.config.forces, pointer));
		}
	}

	fn emit(&mut self, now: f64) {
		self.redraw = false;
		let frame = Frame::collect(&self.simulation, &self.active, now);
		self.sink.render(&frame);
	}
}

fn build_simulation(
	data: &GraphData,
	config: &InteractionConfig,
	center: (f64, f64),
) -> Result<Simulation> {
	let mut simulation = Simulation::initialize(
		&data.nodes,
		&data.links,
		SimulationConfig {
			origin: center,
			..config.simulation.clone()
		},
	)?;
	install_forces(&mut simulation, &config.forces, center);
	Ok(simulation)
}

#[cfg(test)]
mod tests {
	use super::super::types::TreeNode;
	use super::*;

	#[derive(Default)]
	struct Recorder {
		frames: Vec<Vec<(String, f64, f64, bool)>>,
		links: usize,
	}

	impl RenderSink for Recorder {
		fn render(&mut self, frame: &Frame<'_>) {
			self.links = frame.links.len();
			self.frames.push(
				frame
					.nodes
					.iter()
					.map(|n| (n.id.to_string(), n.x, n.y, n.active))
					.collect(),
			);
		}
	}

	fn tree() -> GraphData {
		GraphData::from_tree(&TreeNode::with_children(
			"A",
			vec![
				TreeNode::with_children("B", vec![TreeNode::leaf("D")]),
				TreeNode::leaf("C"),
			],
		))
	}

	fn running() -> InteractionLoop<Recorder> {
		InteractionLoop::from_graph(
			&tree(),
			(400.0, 400.0),
			Recorder::default(),
			InteractionConfig::default(),
		)
		.unwrap()
	}

	fn settle(lp: &mut InteractionLoop<Recorder>) {
		let mut guard = 0;
		while lp.tick(0.0) == Tick::Stepped {
			guard += 1;
			assert!(guard < 1000, "loop never settled");
		}
	}

	#[test]
	fn every_tick_reaches_the_sink() {
		let mut lp = running();
		for _ in 0..3 {
			assert_eq!(lp.tick(16.0), Tick::Stepped);
		}
		assert_eq!(lp.sink().frames.len(), 3);
		assert_eq!(lp.sink().frames[0].len(), 4);
		assert_eq!(lp.sink().links, 3);
	}

	#[test]
	fn stop_is_idempotent_and_silences_queued_ticks() {
		let mut lp = running();
		lp.tick(0.0);
		lp.stop();
		lp.stop();
		assert_eq!(lp.state(), LoopState::Stopped);
		assert_eq!(lp.tick(16.0), Tick::Stopped);
		lp.on_pointer_move(3.0, 4.0);
		assert_eq!(lp.tick(32.0), Tick::Stopped);
		assert_eq!(lp.sink().frames.len(), 1);
	}

	#[test]
	fn restart_after_stop_steps_again() {
		let mut lp = running();
		lp.stop();
		lp.restart();
		assert_eq!(lp.tick(0.0), Tick::Stepped);
	}

	#[test]
	fn settles_then_wakes_on_pointer_move() {
		let mut lp = running();
		settle(&mut lp);
		assert_eq!(lp.state(), LoopState::Idle);
		let frames = lp.sink().frames.len();
		assert_eq!(lp.tick(0.0), Tick::Idle);
		assert_eq!(lp.sink().frames.len(), frames);

		lp.on_pointer_move(10.0, 10.0);
		assert_eq!(lp.state(), LoopState::Running);
		assert_eq!(lp.tick(0.0), Tick::Stepped);
		assert!(lp.simulation().alpha() >= 0.29);
		assert!(lp.simulation().has_force(POINTER_FORCE));
	}

	#[test]
	fn activation_redraws_without_stepping() {
		let mut lp = running();
		settle(&mut lp);
		let steps = lp.simulation().step_count();
		lp.on_node_activate("2");
		assert!(lp.is_active("2"));
		assert_eq!(lp.tick(0.0), Tick::Redrawn);
		assert_eq!(lp.simulation().step_count(), steps);
		let last = lp.sink().frames.last().unwrap();
		assert!(last[2].3);
		assert!(!last[1].3);

		lp.on_node_deactivate("2");
		lp.tick(0.0);
		assert!(!lp.sink().frames.last().unwrap()[2].3);
	}

	#[test]
	fn activation_leaves_physics_alone() {
		let (mut plain, mut emphasized) = (running(), running());
		emphasized.on_node_activate("0");
		emphasized.on_node_activate("3");
		for _ in 0..25 {
			plain.tick(0.0);
			emphasized.tick(0.0);
		}
		assert_eq!(plain.simulation().nodes(), emphasized.simulation().nodes());
	}

	#[test]
	fn pointer_moves_coalesce_to_last() {
		let (mut once, mut twice) = (running(), running());
		twice.on_pointer_move(-500.0, 20.0);
		twice.on_pointer_move(90.0, 120.0);
		once.on_pointer_move(90.0, 120.0);
		for _ in 0..5 {
			once.tick(0.0);
			twice.tick(0.0);
		}
		assert_eq!(once.simulation().nodes(), twice.simulation().nodes());
	}

	#[test]
	fn drag_pins_and_keeps_layout_warm() {
		let mut lp = running();
		lp.on_drag_start("3");
		assert!(lp.is_dragging("3"));
		lp.on_drag("3", 5.0, 5.0);
		for _ in 0..400 {
			lp.tick(0.0);
			let node = lp.simulation().node("3").unwrap();
			assert_eq!((node.x, node.y), (5.0, 5.0));
		}
		assert_eq!(lp.state(), LoopState::Running);

		lp.on_drag_end("3");
		assert!(!lp.is_dragging("3"));
		assert!(!lp.simulation().node("3").unwrap().is_pinned());
		assert_eq!(lp.simulation().alpha_target(), 0.0);
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let mut lp = running();
		lp.on_drag_start("nope");
		lp.on_drag("nope", 1.0, 1.0);
		lp.on_drag_end("nope");
		lp.on_node_activate("nope");
		assert!(!lp.is_dragging("nope"));
		assert_eq!(lp.tick(0.0), Tick::Stepped);
	}

	#[test]
	fn reload_rebuilds_engine() {
		let mut lp = running();
		lp.on_node_activate("1");
		settle(&mut lp);
		let bigger = GraphData::from_tree(&TreeNode::with_children(
			"root",
			(0..6).map(|i| TreeNode::leaf(format!("leaf {i}"))).collect(),
		));
		lp.reload(&bigger).unwrap();
		assert_eq!(lp.state(), LoopState::Running);
		assert_eq!(lp.simulation().nodes().len(), 7);
		assert_eq!(lp.simulation().step_count(), 0);
		assert!(!lp.is_active("1"));
		assert!(lp.simulation().has_force(COLLIDE_FORCE));
	}

	#[test]
	fn reload_keeps_pointer_follow() {
		let mut lp = running();
		lp.on_pointer_move(10.0, 10.0);
		lp.tick(0.0);
		lp.reload(&tree()).unwrap();
		assert!(lp.simulation().has_force(POINTER_FORCE));
		lp.tick(0.0);
		assert!(lp.simulation().has_force(POINTER_FORCE));
	}

	#[test]
	fn pointer_queued_before_reload_is_not_lost() {
		let mut lp = running();
		lp.on_pointer_move(30.0, 40.0);
		lp.reload(&tree()).unwrap();
		assert!(lp.simulation().has_force(POINTER_FORCE));
	}

	#[test]
	fn reload_without_pointer_installs_no_follow_force() {
		let mut lp = running();
		lp.reload(&tree()).unwrap();
		assert!(!lp.simulation().has_force(POINTER_FORCE));
	}

	/// Reports a transition in flight for a fixed number of frames once armed.
	#[derive(Default)]
	struct Fading {
		remaining: usize,
		frames: usize,
	}

	impl RenderSink for Fading {
		fn render(&mut self, _frame: &Frame<'_>) {
			self.frames += 1;
			self.remaining = self.remaining.saturating_sub(1);
		}

		fn is_animating(&self) -> bool {
			self.remaining > 0
		}
	}

	#[test]
	fn idle_loop_redraws_while_sink_animates() {
		let mut lp = InteractionLoop::from_graph(
			&tree(),
			(400.0, 400.0),
			Fading::default(),
			InteractionConfig::default(),
		)
		.unwrap();
		let mut guard = 0;
		while lp.tick(0.0) == Tick::Stepped {
			guard += 1;
			assert!(guard < 1000, "loop never settled");
		}
		assert_eq!(lp.state(), LoopState::Idle);
		let (steps, frames) = (lp.simulation().step_count(), lp.sink().frames);

		lp.sink_mut().remaining = 3;
		for t in 1..=3 {
			assert_eq!(lp.tick(t as f64 * 16.0), Tick::Redrawn);
		}
		assert_eq!(lp.tick(64.0), Tick::Idle);
		assert_eq!(lp.tick(80.0), Tick::Idle);
		assert_eq!(lp.sink().frames, frames + 3);
		assert_eq!(lp.simulation().step_count(), steps);
		assert_eq!(lp.state(), LoopState::Idle);
	}

	#[test]
	fn reload_with_bad_topology_keeps_old_engine() {
		let mut lp = running();
		let mut broken = tree();
		broken.links[0].target = "ghost".into();
		assert!(lp.reload(&broken).is_err());
		assert_eq!(lp.simulation().nodes().len(), 4);
	}
}
