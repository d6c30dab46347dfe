use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{NoteGraphState, node_radius};

/// Marker colours, from isolated notes to hubs.
const DEGREE_COLORS: &[&str] = &["#7f7f7f", "#1f77b4", "#2ca02c", "#ff7f0e", "#d62728"];

fn degree_color(degree: usize) -> &'static str {
	let bucket = match degree {
		0 => 0,
		1 => 1,
		2..=3 => 2,
		4..=7 => 3,
		_ => 4,
	};
	DEGREE_COLORS[bucket]
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &NoteGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &NoteGraphState, ctx: &CanvasRenderingContext2d) {
	let (k, t) = (state.transform.k, ease_out_cubic(state.hover.highlight_t));
	let line_width = 1.5 / k;
	let nodes = &state.graph.nodes;

	for edge in &state.graph.edges {
		let (a, b) = (&nodes[edge.source], &nodes[edge.target]);
		let is_highlighted = state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: every edge at 0.5, t=1: highlighted at 0.9, the rest at 0.1
		let (alpha, width) = if is_highlighted {
			(0.5 + 0.4 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.5 - 0.4 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {alpha})"));
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, k: f64, fill: &str) {
	ctx.set_fill_style_str(fill);
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
	let _ = ctx.fill_text(text, x, y);
}

fn draw_nodes(state: &NoteGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	// Dimmed pass first so highlighted nodes end up on top
	for (idx, node) in state.graph.nodes.iter().enumerate() {
		if has_highlight && state.is_highlighted(idx) {
			continue;
		}
		let base = node_radius(node.degree);
		let (alpha, radius) = (1.0 - 0.7 * t, base * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(degree_color(node.degree));
		ctx.fill();
		ctx.set_global_alpha(1.0);

		let fill = format!("rgba(255, 255, 255, {})", alpha * 0.8);
		draw_label(ctx, &node.title, node.x + radius + 3.0, node.y + 3.0, k, &fill);
	}

	if !has_highlight {
		return;
	}

	for (idx, node) in state.graph.nodes.iter().enumerate() {
		if !state.is_highlighted(idx) {
			continue;
		}
		let base = node_radius(node.degree);
		let radius = if state.is_hovered(idx) {
			base * (1.0 + 0.35 * t)
		} else {
			base * (1.0 + 0.2 * t)
		};

		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(degree_color(node.degree));
		ctx.fill();

		if state.is_hovered(idx) && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		draw_label(ctx, &node.title, node.x + radius + 3.0, node.y + 3.0, k, "white");
	}
}
