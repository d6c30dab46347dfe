use std::collections::HashSet;

use log::{debug, info};
use rand::Rng;

use super::builder::build_graph_with_wiki_links;
use super::simulation::{Simulation, SimulationParams};
use super::types::{Note, NoteGraph};

pub const NODE_RADIUS: f64 = 5.0;
pub const MAX_NODE_RADIUS: f64 = 14.0;
/// Extra world-space slack around a marker that still counts as a hit.
pub const HIT_SLACK: f64 = 4.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Marker radius for a node with `degree` links.
pub fn node_radius(degree: usize) -> f64 {
	(NODE_RADIUS + 1.5 * (degree as f64).sqrt()).min(MAX_NODE_RADIUS)
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

/// Node position minus pointer position at grab time, in graph space.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub offset_x: f64,
	pub offset_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Everything the note graph view owns while it is open.
pub struct NoteGraphState {
	pub graph: NoteGraph,
	pub simulation: Simulation,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
}

impl NoteGraphState {
	pub fn new<R: Rng>(
		notes: &[Note],
		width: f64,
		height: f64,
		params: SimulationParams,
		rng: &mut R,
	) -> Self {
		info!("opening note graph for {} notes", notes.len());
		Self {
			graph: build_graph_with_wiki_links(notes, width, height, rng),
			simulation: Simulation::new(params),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
		}
	}

	/// Throws the current layout away and rebuilds it from `notes`.
	pub fn reset<R: Rng>(&mut self, notes: &[Note], rng: &mut R) {
		debug!("resetting note graph");
		self.graph = build_graph_with_wiki_links(notes, self.width, self.height, rng);
		self.simulation = Simulation::new(self.simulation.params);
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = HoverState::default();
	}

	pub fn close(&mut self) {
		self.simulation.stop();
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Closest node whose marker (plus slack) contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(i, node)| {
				let dist = ((node.x - gx).powi(2) + (node.y - gy).powi(2)).sqrt();
				(dist < node_radius(node.degree) + HIT_SLACK).then_some((i, dist))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			let node = &self.graph.nodes[idx];
			self.drag = DragState {
				offset_x: node.x - gx,
				offset_y: node.y - gy,
			};
			self.simulation.begin_drag(&mut self.graph, idx);
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.simulation.dragged().is_some() {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.simulation.drag_to(
				&mut self.graph,
				gx + self.drag.offset_x,
				gy + self.drag.offset_y,
				self.width,
				self.height,
			);
			return;
		}

		let hovered = self.node_at_position(sx, sy);
		self.set_hover(hovered);

		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn pointer_up(&mut self) {
		self.simulation.end_drag(&mut self.graph);
		self.drag = DragState::default();
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Zooms about the screen point, keeping the graph point under it fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		// Horizontal-only scrolling
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Id of the note under the pointer, for the host to navigate to.
	pub fn double_activate(&self, sx: f64, sy: f64) -> Option<String> {
		let idx = self.node_at_position(sx, sy)?;
		let id = self.graph.nodes[idx].id.clone();
		info!("opening note {id} from graph");
		Some(id)
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the old highlight around so it can fade out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover.neighbors.extend(self.graph.neighbors(idx));
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// One animation frame: a simulation step plus the hover fade.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.step(&mut self.graph, self.width, self.height);

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.clamp_positions(&mut self.graph, width, height);
	}
}
