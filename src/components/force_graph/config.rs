//! Tunables for the layout engine, the interaction loop and the canvas.

/// Parameters of the layout engine itself.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Starting temperature.
	pub alpha: f64,
	/// The engine counts as settled once alpha drops below this.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed each step.
	pub alpha_decay: f64,
	/// Temperature alpha decays toward.
	pub alpha_target: f64,
	/// Fraction of velocity removed each step.
	pub velocity_decay: f64,
	/// Point the initial spiral is laid out around.
	pub origin: (f64, f64),
	/// Seed of the jiggle used to separate coincident nodes.
	pub seed: u64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			origin: (0.0, 0.0),
			seed: 0x5eed,
		}
	}
}

/// Strengths of the forces installed by the interaction loop.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Negative repels.
	pub charge_strength: f64,
	/// Radius every node is treated as for collision.
	pub collide_radius: f64,
	/// 0..=1, how much of an overlap is resolved per step.
	pub collide_strength: f64,
	/// Share of the centroid offset corrected per step at alpha 1.
	pub center_strength: f64,
	/// Follow strength of the root.
	pub follow_base: f64,
	/// Added to the follow strength for every level below the root.
	pub follow_per_depth: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			charge_strength: -30.0,
			collide_radius: 30.0,
			collide_strength: 1.0,
			center_strength: 0.1,
			follow_base: 0.15,
			follow_per_depth: 0.1,
		}
	}
}

/// Everything the interaction loop needs to build and drive an engine.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
	/// Engine parameters; `origin` is overridden by the viewport center.
	pub simulation: SimulationConfig,
	/// Forces installed on every engine the loop builds.
	pub forces: ForceConfig,
	/// Alpha floor applied on pointer moves, resizes and drag starts.
	pub reheat_alpha: f64,
	/// Alpha target held while any node is dragged.
	pub drag_alpha_target: f64,
	/// Go idle once the engine settles.
	pub auto_stop: bool,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			simulation: SimulationConfig::default(),
			forces: ForceConfig::default(),
			reheat_alpha: 0.3,
			drag_alpha_target: 0.3,
			auto_stop: true,
		}
	}
}

/// Visual styling of the canvas sink.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig {
	/// CSS color filling the canvas before each frame.
	pub background: String,
	/// CSS color of link lines.
	pub link_stroke: String,
	/// CSS color of node outlines.
	pub node_stroke: String,
	/// RGB fill of a node at rest.
	pub node_fill: (u8, u8, u8),
	/// RGB fill of an emphasized node.
	pub active_fill: (u8, u8, u8),
	/// Circle radius at rest.
	pub node_radius: f64,
	/// Circle radius when emphasized.
	pub active_radius: f64,
	/// Label size at rest, in pixels.
	pub font_size: f64,
	/// Label size when emphasized, in pixels.
	pub active_font_size: f64,
	/// Length of the emphasis transition.
	pub transition_ms: f64,
}

impl Default for StyleConfig {
	fn default() -> Self {
		Self {
			background: "#fafafa".into(),
			link_stroke: "black".into(),
			node_stroke: "black".into(),
			node_fill: (255, 255, 255),
			// lightsteelblue
			active_fill: (176, 196, 222),
			node_radius: 15.0,
			active_radius: 25.0,
			font_size: 12.0,
			active_font_size: 35.0,
			transition_ms: 750.0,
		}
	}
}
