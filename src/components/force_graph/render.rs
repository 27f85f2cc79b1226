use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::config::StyleConfig;
use super::interaction::{Frame, NodeFrame, RenderSink};
use super::state::{Emphasis, HitMap, NodeHit};
use super::types::GraphData;

fn lerp(a: f64, b: f64, t: f64) -> f64 {
	a + (b - a) * t
}

fn mix((r1, g1, b1): (u8, u8, u8), (r2, g2, b2): (u8, u8, u8), t: f64) -> String {
	let channel = |a: u8, b: u8| lerp(a as f64, b as f64, t).round() as u8;
	format!(
		"rgb({}, {}, {})",
		channel(r1, r2),
		channel(g1, g2),
		channel(b1, b2)
	)
}

/// Draws frames onto a 2D canvas: links as lines, nodes as circles and
/// labels as centered text.
pub struct CanvasSink {
	ctx: CanvasRenderingContext2d,
	style: StyleConfig,
	width: f64,
	height: f64,
	labels: HashMap<String, String>,
	emphasis: Vec<Emphasis>,
	hits: HitMap,
	animating: bool,
}

impl CanvasSink {
	/// A sink drawing into `ctx`, sized `width` x `height`, with labels from `data`.
	pub fn new(
		ctx: CanvasRenderingContext2d,
		data: &GraphData,
		width: f64,
		height: f64,
		style: StyleConfig,
	) -> Self {
		let mut sink = Self {
			ctx,
			style,
			width,
			height,
			labels: HashMap::new(),
			emphasis: Vec::new(),
			hits: HitMap::default(),
			animating: false,
		};
		sink.set_graph(data);
		sink
	}

	/// Forget per-node state and take labels from `data`.
	pub fn set_graph(&mut self, data: &GraphData) {
		self.labels = data
			.nodes
			.iter()
			.filter_map(|n| Some((n.id.clone(), n.label.clone()?)))
			.collect();
		self.emphasis = vec![Emphasis::new(self.style.transition_ms); data.nodes.len()];
		self.hits.clear();
	}

	/// Canvas size used when clearing the background.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// The topmost node drawn under `(x, y)` in the last frame.
	pub fn node_at(&self, x: f64, y: f64) -> Option<&NodeHit> {
		self.hits.node_at(x, y)
	}

	fn draw_links(&self, frame: &Frame<'_>) {
		let positions: HashMap<&str, (f64, f64)> =
			frame.nodes.iter().map(|n| (n.id, (n.x, n.y))).collect();

		self.ctx.set_stroke_style_str(&self.style.link_stroke);
		self.ctx.set_line_width(1.0);
		self.ctx.begin_path();
		for link in &frame.links {
			let (Some(&(x1, y1)), Some(&(x2, y2))) =
				(positions.get(link.source), positions.get(link.target))
			else {
				continue;
			};
			self.ctx.move_to(x1, y1);
			self.ctx.line_to(x2, y2);
		}
		self.ctx.stroke();
	}

	fn draw_node(&self, node: &NodeFrame<'_>, t: f64) -> f64 {
		let style = &self.style;
		let radius = lerp(style.node_radius, style.active_radius, t);

		self.ctx.begin_path();
		let _ = self.ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		self.ctx
			.set_fill_style_str(&mix(style.node_fill, style.active_fill, t));
		self.ctx.fill();
		self.ctx.set_stroke_style_str(&style.node_stroke);
		self.ctx.stroke();

		if let Some(label) = self.labels.get(node.id) {
			let size = lerp(style.font_size, style.active_font_size, t);
			self.ctx.set_fill_style_str("black");
			self.ctx.set_font(&format!("{size}px sans-serif"));
			let _ = self.ctx.fill_text(label, node.x, node.y);
		}
		radius
	}
}

impl RenderSink for CanvasSink {
	fn render(&mut self, frame: &Frame<'_>) {
		if self.emphasis.len() != frame.nodes.len() {
			self.emphasis = vec![Emphasis::new(self.style.transition_ms); frame.nodes.len()];
		}

		self.ctx.set_fill_style_str(&self.style.background);
		self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
		self.draw_links(frame);

		self.ctx.set_text_align("center");
		self.ctx.set_text_baseline("middle");
		self.animating = false;
		let mut hits = std::mem::take(&mut self.hits);
		hits.clear();
		for (node, emphasis) in frame.nodes.iter().zip(self.emphasis.iter_mut()) {
			emphasis.set(node.active, frame.time);
			self.animating |= emphasis.in_flight(frame.time);
		}
		for (node, emphasis) in frame.nodes.iter().zip(&self.emphasis) {
			let radius = self.draw_node(node, emphasis.level(frame.time));
			hits.push(NodeHit {
				id: node.id.to_string(),
				x: node.x,
				y: node.y,
				radius,
			});
		}
		self.hits = hits;
	}

	fn is_animating(&self) -> bool {
		self.animating
	}
}
