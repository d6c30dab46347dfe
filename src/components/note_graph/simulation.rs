//! Per-frame force layout: center gravity, inverse-square repulsion, spring
//! attraction along edges, damping and clamping to the padded viewport.
//!
//! Forces are accumulated against a snapshot of the positions at the start of
//! the frame; nodes move only once every force has been summed.

use log::info;

use super::types::NoteGraph;

/// Tunables for [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
	/// Pull toward the viewport center per unit of displacement.
	pub center_gravity: f64,
	/// Numerator of the inverse-square repulsion.
	pub repulsion: f64,
	/// Spring factor along edges.
	pub attraction: f64,
	/// Velocity multiplier applied each frame.
	pub damping: f64,
	/// Distance kept between nodes and the canvas border.
	pub padding: f64,
	/// Floor for pairwise distances.
	pub min_distance: f64,
}

impl Default for SimulationParams {
	fn default() -> Self {
		Self {
			center_gravity: 0.01,
			repulsion: 5000.0,
			attraction: 0.02,
			damping: 0.9,
			padding: VIEWPORT_PADDING,
			min_distance: 1.0,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	#[default]
	Running,
	Stopped,
}

#[derive(Clone, Debug, Default)]
pub struct Simulation {
	pub params: SimulationParams,
	phase: Phase,
	dragged: Option<usize>,
}

/// Default gap between nodes and the canvas border.
pub const VIEWPORT_PADDING: f64 = 50.0;

/// Clamps one coordinate to `[padding, dimension - padding]`. Collapses to
/// the middle when the canvas is narrower than twice the padding.
pub fn clamp_to_viewport(value: f64, dimension: f64, padding: f64) -> f64 {
	let (lo, hi) = (padding, dimension - padding);
	if lo <= hi {
		value.max(lo).min(hi)
	} else {
		dimension / 2.0
	}
}

/// Golden angle in radians, spreads fallback directions for coincident pairs.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Unit vector pushing `i` away from `j` when the two share a position.
fn fallback_direction(i: usize, j: usize) -> (f64, f64) {
	let angle = GOLDEN_ANGLE * (i + j) as f64;
	let sign = if i < j { 1.0 } else { -1.0 };
	(sign * angle.cos(), sign * angle.sin())
}

impl Simulation {
	pub fn new(params: SimulationParams) -> Self {
		Self {
			params,
			phase: Phase::Running,
			dragged: None,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn is_running(&self) -> bool {
		self.phase() == Phase::Running
	}

	/// Stops the loop for good. There is no way back to running; a new view
	/// builds a new simulation.
	pub fn stop(&mut self) {
		if self.phase == Phase::Running {
			info!("note graph simulation stopped");
		}
		self.phase = Phase::Stopped;
		self.dragged = None;
	}

	pub fn dragged(&self) -> Option<usize> {
		self.dragged
	}

	fn clamp_axis(&self, value: f64, dimension: f64) -> f64 {
		clamp_to_viewport(value, dimension, self.params.padding)
	}

	/// Pulls every node back inside the padded viewport, e.g. after a resize.
	pub fn clamp_positions(&self, graph: &mut NoteGraph, width: f64, height: f64) {
		for node in &mut graph.nodes {
			node.x = self.clamp_axis(node.x, width);
			node.y = self.clamp_axis(node.y, height);
		}
	}

	/// Advances the layout by one frame.
	pub fn step(&mut self, graph: &mut NoteGraph, width: f64, height: f64) {
		if !self.is_running() || graph.is_empty() {
			return;
		}
		let p = self.params;
		let (cx, cy) = (width / 2.0, height / 2.0);
		let positions: Vec<(f64, f64)> = graph.nodes.iter().map(|n| (n.x, n.y)).collect();
		let mut dv = vec![(0.0_f64, 0.0_f64); positions.len()];

		for (i, &(x, y)) in positions.iter().enumerate() {
			dv[i].0 += (cx - x) * p.center_gravity;
			dv[i].1 += (cy - y) * p.center_gravity;
		}

		let min_sq = p.min_distance * p.min_distance;
		for (i, &(xi, yi)) in positions.iter().enumerate() {
			for (j, &(xj, yj)) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let (dx, dy) = (xi - xj, yi - yj);
				let dist_sq = dx * dx + dy * dy;
				let (ux, uy, dist_sq) = if dist_sq > 0.0 {
					let dist = dist_sq.sqrt();
					(dx / dist, dy / dist, dist_sq.max(min_sq))
				} else {
					let (ux, uy) = fallback_direction(i, j);
					(ux, uy, min_sq)
				};
				let force = p.repulsion / dist_sq;
				dv[i].0 += ux * force;
				dv[i].1 += uy * force;
			}
		}

		for edge in &graph.edges {
			let (sx, sy) = positions[edge.source];
			let (tx, ty) = positions[edge.target];
			let (dx, dy) = ((tx - sx) * p.attraction, (ty - sy) * p.attraction);
			dv[edge.source].0 += dx;
			dv[edge.source].1 += dy;
			dv[edge.target].0 -= dx;
			dv[edge.target].1 -= dy;
		}

		for (i, node) in graph.nodes.iter_mut().enumerate() {
			if self.dragged == Some(i) {
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx = (node.vx + dv[i].0) * p.damping;
			node.vy = (node.vy + dv[i].1) * p.damping;
			if !node.vx.is_finite() || !node.vy.is_finite() {
				node.vx = 0.0;
				node.vy = 0.0;
			}
			node.x = self.clamp_axis(node.x + node.vx, width);
			node.y = self.clamp_axis(node.y + node.vy, height);
		}
	}

	/// Marks `idx` as held by the pointer. Out of range indices are ignored.
	pub fn begin_drag(&mut self, graph: &mut NoteGraph, idx: usize) {
		if let Some(node) = graph.nodes.get_mut(idx) {
			node.vx = 0.0;
			node.vy = 0.0;
			self.dragged = Some(idx);
		}
	}

	/// Moves the held node to `(x, y)`, clamped to the canvas.
	pub fn drag_to(&mut self, graph: &mut NoteGraph, x: f64, y: f64, width: f64, height: f64) {
		let Some(idx) = self.dragged else {
			return;
		};
		let (x, y) = (self.clamp_axis(x, width), self.clamp_axis(y, height));
		if let Some(node) = graph.nodes.get_mut(idx) {
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	pub fn end_drag(&mut self, graph: &mut NoteGraph) {
		if let Some(node) = self.dragged.take().and_then(|idx| graph.nodes.get_mut(idx)) {
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::super::builder::build_graph_with_wiki_links;
	use super::super::types::{GraphEdge, GraphNode, Note};
	use super::*;

	fn node(id: &str, x: f64, y: f64) -> GraphNode {
		GraphNode {
			id: id.into(),
			title: id.into(),
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			degree: 0,
		}
	}

	fn assert_in_bounds(graph: &NoteGraph, w: f64, h: f64) {
		for n in &graph.nodes {
			assert!(n.x.is_finite() && n.y.is_finite(), "{} not finite", n.id);
			assert!((50.0..=w - 50.0).contains(&n.x), "{} x={}", n.id, n.x);
			assert!((50.0..=h - 50.0).contains(&n.y), "{} y={}", n.id, n.y);
		}
	}

	#[test]
	fn nodes_stay_clamped() {
		let notes: Vec<Note> = (0..40)
			.map(|i| {
				let content = format!("[[n{}]] [[n{}]]", (i + 1) % 40, (i * 7) % 40);
				Note::new(format!("n{i}"), format!("n{i}"), content)
			})
			.collect();
		let mut rng = SmallRng::seed_from_u64(3);
		let (w, h) = (300.0, 200.0);
		let mut graph = build_graph_with_wiki_links(&notes, w, h, &mut rng);
		let mut sim = Simulation::default();
		for _ in 0..300 {
			sim.step(&mut graph, w, h);
			assert_in_bounds(&graph, w, h);
		}
	}

	#[test]
	fn minimum_viewport_pins_to_center() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 0.0, 0.0), node("b", 100.0, 100.0)],
			edges: vec![],
		};
		let mut sim = Simulation::default();
		sim.step(&mut graph, 100.0, 100.0);
		assert_in_bounds(&graph, 100.0, 100.0);
		for n in &graph.nodes {
			assert_eq!((n.x, n.y), (50.0, 50.0));
		}
	}

	#[test]
	fn empty_graph_is_a_no_op() {
		let mut graph = NoteGraph::default();
		let mut sim = Simulation::default();
		for _ in 0..10 {
			sim.step(&mut graph, 800.0, 600.0);
		}
		assert!(graph.is_empty());
		assert!(sim.is_running());
	}

	#[test]
	fn coincident_nodes_separate_without_nan() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 400.0, 300.0), node("b", 400.0, 300.0), node("c", 400.0, 300.0)],
			edges: vec![],
		};
		let mut sim = Simulation::default();
		sim.step(&mut graph, 800.0, 600.0);
		for n in &graph.nodes {
			assert!(n.x.is_finite() && n.y.is_finite());
		}
		assert_ne!((graph.nodes[0].x, graph.nodes[0].y), (graph.nodes[1].x, graph.nodes[1].y));
	}

	#[test]
	fn unlinked_pair_is_pushed_apart() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 390.0, 300.0), node("b", 410.0, 300.0)],
			edges: vec![],
		};
		let mut sim = Simulation::default();
		sim.step(&mut graph, 800.0, 600.0);
		assert!(graph.nodes[0].x < 390.0);
		assert!(graph.nodes[1].x > 410.0);
	}

	#[test]
	fn linked_pair_settles_closer_than_unlinked() {
		let run = |edges: Vec<GraphEdge>| {
			let mut graph = NoteGraph {
				nodes: vec![node("a", 150.0, 300.0), node("b", 650.0, 300.0)],
				edges,
			};
			let mut sim = Simulation::default();
			for _ in 0..500 {
				sim.step(&mut graph, 800.0, 600.0);
			}
			(graph.nodes[0].x - graph.nodes[1].x).abs()
		};
		let linked = run(GraphEdge::between(0, 1).into_iter().collect());
		let unlinked = run(vec![]);
		assert!(linked < unlinked, "linked {linked} vs unlinked {unlinked}");
	}

	#[test]
	fn damping_decays_velocity() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 400.0, 300.0)],
			edges: vec![],
		};
		graph.nodes[0].vx = 10.0;
		let mut sim = Simulation::default();
		sim.step(&mut graph, 800.0, 600.0);
		assert!((graph.nodes[0].vx - 9.0).abs() < 1e-9);
		assert!((graph.nodes[0].x - 409.0).abs() < 1e-9);
	}

	#[test]
	fn stopped_simulation_does_not_move_nodes() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 100.0, 100.0), node("b", 120.0, 100.0)],
			edges: vec![],
		};
		let mut sim = Simulation::default();
		sim.stop();
		assert_eq!(sim.phase(), Phase::Stopped);
		sim.step(&mut graph, 800.0, 600.0);
		assert_eq!((graph.nodes[0].x, graph.nodes[1].x), (100.0, 120.0));
	}

	#[test]
	fn dragged_node_follows_pointer_only() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 400.0, 300.0), node("b", 420.0, 300.0)],
			edges: GraphEdge::between(0, 1).into_iter().collect(),
		};
		let mut sim = Simulation::default();
		sim.begin_drag(&mut graph, 0);
		sim.drag_to(&mut graph, 200.0, 150.0, 800.0, 600.0);
		for _ in 0..5 {
			sim.step(&mut graph, 800.0, 600.0);
		}
		assert_eq!((graph.nodes[0].x, graph.nodes[0].y), (200.0, 150.0));
		assert_eq!((graph.nodes[0].vx, graph.nodes[0].vy), (0.0, 0.0));

		sim.drag_to(&mut graph, -40.0, 9000.0, 800.0, 600.0);
		assert_eq!((graph.nodes[0].x, graph.nodes[0].y), (50.0, 550.0));

		sim.end_drag(&mut graph);
		assert_eq!(sim.dragged(), None);
		assert_eq!((graph.nodes[0].vx, graph.nodes[0].vy), (0.0, 0.0));
	}

	#[test]
	fn viewport_clamp_collapses_on_narrow_axis() {
		assert_eq!(clamp_to_viewport(10.0, 300.0, VIEWPORT_PADDING), 50.0);
		assert_eq!(clamp_to_viewport(290.0, 300.0, VIEWPORT_PADDING), 250.0);
		assert_eq!(clamp_to_viewport(120.0, 300.0, VIEWPORT_PADDING), 120.0);
		assert_eq!(clamp_to_viewport(5.0, 60.0, VIEWPORT_PADDING), 30.0);
	}

	#[test]
	fn clamp_positions_after_shrink() {
		let mut graph = NoteGraph {
			nodes: vec![node("a", 700.0, 20.0), node("b", 300.0, 550.0)],
			edges: vec![],
		};
		let sim = Simulation::default();
		sim.clamp_positions(&mut graph, 400.0, 300.0);
		assert_in_bounds(&graph, 400.0, 300.0);
		assert_eq!((graph.nodes[0].x, graph.nodes[0].y), (350.0, 50.0));
		assert_eq!((graph.nodes[1].x, graph.nodes[1].y), (300.0, 250.0));
	}

	#[test]
	fn begin_drag_ignores_unknown_index() {
		let mut graph = NoteGraph::default();
		let mut sim = Simulation::default();
		sim.begin_drag(&mut graph, 3);
		assert_eq!(sim.dragged(), None);
	}
}
