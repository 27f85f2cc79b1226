use force_hierarchy_canvas::components::force_graph::config::{InteractionConfig, SimulationConfig};
use force_hierarchy_canvas::components::force_graph::forces::{Center, ManyBody};
use force_hierarchy_canvas::components::force_graph::{
	Frame, GraphData, InteractionLoop, LayoutError, Node, RenderSink, Simulation, Tick, TreeNode,
};

#[derive(Default)]
struct CountingSink {
	frames: usize,
	last_len: usize,
}

impl RenderSink for CountingSink {
	fn render(&mut self, frame: &Frame<'_>) {
		self.frames += 1;
		self.last_len = frame.nodes.len();
	}
}

/// A (root) with children B and C; B has a child D.
fn chain() -> GraphData {
	GraphData::from_tree(&TreeNode::with_children(
		"A",
		vec![
			TreeNode::with_children("B", vec![TreeNode::leaf("D")]),
			TreeNode::leaf("C"),
		],
	))
}

fn centroid(nodes: &[Node]) -> (f64, f64) {
	let n = nodes.len() as f64;
	let (sx, sy) = nodes
		.iter()
		.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
	(sx / n, sy / n)
}

fn distance((ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
	((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

fn start(data: &GraphData) -> InteractionLoop<CountingSink> {
	InteractionLoop::from_graph(
		data,
		(200.0, 200.0),
		CountingSink::default(),
		InteractionConfig::default(),
	)
	.unwrap()
}

#[test]
fn initialize_then_step_yields_one_entry_per_node() {
	let data = chain();
	let mut sim =
		Simulation::initialize(&data.nodes, &data.links, SimulationConfig::default()).unwrap();
	sim.set_force("charge", ManyBody::new(-30.0));
	assert_eq!(sim.step(None).nodes.len(), data.nodes.len());
}

#[test]
fn dangling_link_fails_initialization() {
	let mut data = chain();
	data.links[1].source = "404".into();
	let err = Simulation::initialize(&data.nodes, &data.links, SimulationConfig::default())
		.unwrap_err();
	assert!(matches!(err, LayoutError::InvalidTopology { link: 1, .. }));
	assert!(err.to_string().contains("404"));
}

#[test]
fn siblings_drift_apart_under_repulsion() {
	let data = GraphData::from_tree(&TreeNode::with_children(
		"A",
		vec![TreeNode::leaf("B"), TreeNode::leaf("C")],
	));
	let mut sim =
		Simulation::initialize(&data.nodes, &data.links, SimulationConfig::default()).unwrap();
	sim.set_force("center", Center::new(0.0, 0.0));
	sim.set_force("charge", ManyBody::new(-30.0));
	let at = |sim: &Simulation, id: &str| {
		let node = sim.node(id).unwrap();
		(node.x, node.y)
	};
	let before = distance(at(&sim, "1"), at(&sim, "2"));
	sim.step(None);
	assert!(distance(at(&sim, "1"), at(&sim, "2")) > before);
}

#[test]
fn resize_pulls_centroid_to_new_center() {
	let mut lp = start(&chain());
	lp.tick(0.0);
	let target = (400.0, 300.0);
	let before = distance(centroid(lp.simulation().nodes()), target);

	lp.on_resize(800.0, 600.0);
	assert_eq!(lp.center(), target);
	for _ in 0..30 {
		lp.tick(0.0);
	}
	let after = distance(centroid(lp.simulation().nodes()), target);
	assert!(after < before, "{after} >= {before}");
}

#[test]
fn deeper_nodes_follow_the_pointer_harder() {
	// collision off, so only the follow strength differs between nodes
	let mut config = InteractionConfig::default();
	config.forces.collide_radius = 0.0;
	let mut lp =
		InteractionLoop::from_graph(&chain(), (800.0, 800.0), CountingSink::default(), config)
			.unwrap();

	let pointer = (100.0, 100.0);
	let position = |lp: &InteractionLoop<CountingSink>, id: &str| {
		let node = lp.simulation().node(id).unwrap();
		(node.x, node.y)
	};
	// "0" is the root, "3" sits two levels below it
	let (root_before, deep_before) = (position(&lp, "0"), position(&lp, "3"));
	assert_eq!(lp.simulation().node("3").unwrap().depth, 2);

	lp.on_pointer_move(pointer.0, pointer.1);
	assert_eq!(lp.tick(0.0), Tick::Stepped);

	let root_gain = distance(root_before, pointer) - distance(position(&lp, "0"), pointer);
	let deep_gain = distance(deep_before, pointer) - distance(position(&lp, "3"), pointer);
	assert!(root_gain > 0.0);
	assert!(deep_gain > root_gain, "{deep_gain} <= {root_gain}");
}

#[test]
fn stopped_loop_never_renders_again() {
	let mut lp = start(&chain());
	lp.tick(0.0);
	lp.tick(16.0);
	lp.stop();
	lp.stop();
	for t in 0..10 {
		assert_eq!(lp.tick(t as f64), Tick::Stopped);
	}
	assert_eq!(lp.sink().frames, 2);
	assert_eq!(lp.sink().last_len, 4);
}
