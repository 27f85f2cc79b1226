use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::config::{InteractionConfig, SimulationConfig, StyleConfig};
use super::interaction::{InteractionLoop, Tick};
use super::render::CanvasSink;
use super::state::DragState;
use super::types::{GraphData, TreeNode};

type SharedLoop = Rc<RefCell<Option<InteractionLoop<CanvasSink>>>>;

fn viewport_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
			v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
		};
		return (dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0));
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn local_position(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas laying out `data` as a force-directed graph that follows the
/// pointer, with draggable and clickable nodes.
#[component]
pub fn ForceGraphCanvas(
	/// Hierarchy to lay out; changes rebuild the layout in place.
	#[prop(into)]
	data: Signal<TreeNode>,
	/// Size to the window instead of the parent element.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width; defaults to the parent's.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height; defaults to the parent's.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let state: SharedLoop = Rc::new(RefCell::new(None));
	let drag: Rc<RefCell<DragState>> = Rc::new(RefCell::new(DragState::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let graph = GraphData::from_tree(&data.get());

		// New data for a running canvas: rebuild the engine, keep the loop.
		if let Some(ref mut lp) = *state_init.borrow_mut() {
			match lp.reload(&graph) {
				Ok(()) => lp.sink_mut().set_graph(&graph),
				Err(err) => error!("keeping previous graph: {err}"),
			}
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = viewport_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		let config = InteractionConfig {
			simulation: SimulationConfig {
				seed: (js_sys::Math::random() * u32::MAX as f64) as u64,
				..SimulationConfig::default()
			},
			..InteractionConfig::default()
		};
		let sink = CanvasSink::new(ctx, &graph, w, h, StyleConfig::default());
		match InteractionLoop::from_graph(&graph, (w, h), sink, config) {
			Ok(lp) => *state_init.borrow_mut() = Some(lp),
			Err(err) => {
				error!("cannot lay out graph: {err}");
				return;
			}
		}
		info!("force graph mounted at {w}x{h}");

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = viewport_size(&win, &canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut lp) = *state_resize.borrow_mut() {
				lp.sink_mut().resize(nw, nh);
				lp.on_resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, resize_inner) =
			(state_init.clone(), animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let tick = match *state_anim.borrow_mut() {
				Some(ref mut lp) => {
					if !canvas.is_connected() {
						lp.stop();
					}
					lp.tick(now)
				}
				None => Tick::Stopped,
			};
			let Some(win) = web_sys::window() else {
				return;
			};
			if tick == Tick::Stopped {
				if let Some(cb) = resize_inner.borrow_mut().take() {
					let _ = win
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				state_anim.borrow_mut().take();
				// this closure is still running, so it can only be dropped from a later task
				let animate_release = animate_inner.clone();
				let release = Closure::once_into_js(move || {
					animate_release.borrow_mut().take();
				});
				let _ = win.set_timeout_with_callback(release.unchecked_ref());
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (state_md, drag_md) = (state.clone(), drag.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut lp) = *state_md.borrow_mut() {
			let Some(hit) = lp.sink().node_at(x, y).cloned() else {
				return;
			};
			drag_md.borrow_mut().begin(&hit, x, y);
			lp.on_drag_start(&hit.id);
		}
	};

	let (state_mm, drag_mm) = (state.clone(), drag.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut lp) = *state_mm.borrow_mut() {
			lp.on_pointer_move(x, y);
			if let Some((id, nx, ny)) = drag_mm.borrow_mut().track(x, y) {
				lp.on_drag(id, nx, ny);
			}
		}
	};

	let (state_mu, drag_mu) = (state.clone(), drag.clone());
	let on_mouseup = move |_: MouseEvent| {
		if let (Some(id), Some(lp)) = (drag_mu.borrow_mut().end(), &mut *state_mu.borrow_mut()) {
			lp.on_drag_end(&id);
		}
	};

	let (state_ml, drag_ml) = (state.clone(), drag.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let (Some(id), Some(lp)) = (drag_ml.borrow_mut().end(), &mut *state_ml.borrow_mut()) {
			lp.on_drag_end(&id);
		}
	};

	let (state_click, drag_click) = (state.clone(), drag.clone());
	let on_click = move |ev: MouseEvent| {
		// a press that dragged its node is not an activation
		if drag_click.borrow_mut().take_moved() {
			return;
		}
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut lp) = *state_click.borrow_mut() {
			if let Some(id) = lp.sink().node_at(x, y).map(|h| h.id.clone()) {
				lp.on_node_activate(&id);
			}
		}
	};

	let state_dbl = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut lp) = *state_dbl.borrow_mut() {
			if let Some(id) = lp.sink().node_at(x, y).map(|h| h.id.clone()) {
				lp.on_node_deactivate(&id);
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
