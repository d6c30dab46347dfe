use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::simulation::SimulationParams;
use super::state::NoteGraphState;
use super::types::Note;

/// Fixed frame time fed to the hover animation.
const FRAME_DT: f64 = 0.016;

#[derive(Debug, Error)]
pub enum CanvasError {
	#[error("no global window")]
	NoWindow,
	#[error("could not read the viewport size")]
	Viewport,
	#[error("2d canvas context unavailable: {0}")]
	Context(String),
}

fn window() -> Result<Window, CanvasError> {
	web_sys::window().ok_or(CanvasError::NoWindow)
}

fn window_size(window: &Window) -> Result<(f64, f64), CanvasError> {
	let width = window.inner_width().ok().and_then(|v| v.as_f64());
	let height = window.inner_height().ok().and_then(|v| v.as_f64());
	width.zip(height).ok_or(CanvasError::Viewport)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, CanvasError> {
	canvas
		.get_context("2d")
		.map_err(|e| CanvasError::Context(format!("{e:?}")))?
		.ok_or_else(|| CanvasError::Context("canvas returned no context".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| CanvasError::Context("context is not 2d".into()))
}

fn fresh_rng() -> SmallRng {
	SmallRng::seed_from_u64(js_sys::Date::now().to_bits())
}

/// Pointer position relative to the canvas' top-left corner.
fn local_coords(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas view of the links between notes.
///
/// The layout runs once per animation frame while the component is mounted and
/// stops when it is unmounted. Double-clicking a node passes its note id to
/// `on_open`. A change of `notes`, or of `reset`, rebuilds the graph.
#[component]
pub fn NoteGraphCanvas(
	#[prop(into)] notes: Signal<Vec<Note>>,
	#[prop(into)] on_open: Callback<String>,
	#[prop(optional)] params: SimulationParams,
	#[prop(optional, into)] reset: Option<Signal<u32>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<NoteGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let setup = window().and_then(|win| {
			let (w, h) = if fullscreen {
				window_size(&win)?
			} else {
				let parent = canvas.parent_element();
				(
					width.unwrap_or_else(|| {
						parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)
					}),
					height.unwrap_or_else(|| {
						parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)
					}),
				)
			};
			Ok((win, w, h, context_2d(&canvas)?))
		});
		let (win, w, h, ctx) = match setup {
			Ok(setup) => setup,
			Err(e) => {
				error!("note graph canvas setup failed: {e}");
				return;
			}
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let notes_now = notes.get_untracked();
		*state_init.borrow_mut() =
			Some(NoteGraphState::new(&notes_now, w, h, params, &mut fresh_rng()));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let size = window().and_then(|win| window_size(&win));
				let Ok((nw, nh)) = size else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = win.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, resize_inner, alive_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			alive.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				if let Some(ref mut s) = *state_anim.borrow_mut() {
					s.close();
				}
				if let (Ok(win), Some(cb)) = (window(), resize_inner.borrow_mut().take()) {
					let _ = win
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				state_anim.borrow_mut().take();
				info!("note graph view closed");
				// Dropping our own handle ends the frame loop.
				let _ = animate_inner.borrow_mut().take();
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.simulation.is_running() {
					s.tick(FRAME_DT);
				}
				render::render(s, &ctx);
			}
			if let (Ok(win), Some(cb)) = (window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_reset = state.clone();
	Effect::new(move |prev: Option<()>| {
		let current = notes.get();
		if let Some(reset) = reset {
			reset.track();
		}
		if prev.is_none() {
			return;
		}
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.reset(&current, &mut fresh_rng());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_coords(&canvas.into(), &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_coords(&canvas.into(), &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_coords(&canvas.into(), &ev);
		// Release the borrow before handing control to the host.
		let opened = state_dc
			.borrow()
			.as_ref()
			.and_then(|s| s.double_activate(x, y));
		if let Some(id) = opened {
			on_open.run(id);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_coords(&canvas.into(), &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="note-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
