//! Turns a note collection into the node/edge set the simulation runs on.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::{debug, trace};
use rand::Rng;

use super::links::extract_wiki_links;
use super::simulation::{VIEWPORT_PADDING, clamp_to_viewport};
use super::types::{GraphEdge, GraphNode, Note, NoteGraph, UNTITLED};

/// Fraction of the smaller viewport side used as the seed circle radius.
const SEED_RADIUS_RATIO: f64 = 0.3;
/// Maximum per-axis jitter added to seed positions.
const SEED_JITTER: f64 = 25.0;

fn display_title(note: &Note) -> String {
	let title = note.title.trim();
	if title.is_empty() {
		UNTITLED.to_string()
	} else {
		title.to_string()
	}
}

fn title_key(title: &str) -> String {
	title.trim().to_lowercase()
}

/// Builds the graph using `extract` to find the titles each note references.
///
/// Nodes are seeded on a jittered circle around the viewport center, clamped to
/// the padded viewport. Links to
/// unknown titles and links from a note to itself are dropped, and each pair of
/// notes gets at most one edge regardless of direction or repetition.
pub fn build_graph<F, R>(
	notes: &[Note],
	width: f64,
	height: f64,
	extract: F,
	rng: &mut R,
) -> NoteGraph
where
	F: Fn(&str) -> Vec<String>,
	R: Rng,
{
	let count = notes.len();
	let (cx, cy) = (width / 2.0, height / 2.0);
	let radius = SEED_RADIUS_RATIO * width.min(height);

	let mut nodes: Vec<GraphNode> = notes
		.iter()
		.enumerate()
		.map(|(i, note)| {
			let angle = 2.0 * PI * i as f64 / count as f64;
			let x = cx + radius * angle.cos() + rng.gen_range(-SEED_JITTER..=SEED_JITTER);
			let y = cy + radius * angle.sin() + rng.gen_range(-SEED_JITTER..=SEED_JITTER);
			GraphNode {
				id: note.id.clone(),
				title: display_title(note),
				x: clamp_to_viewport(x, width, VIEWPORT_PADDING),
				y: clamp_to_viewport(y, height, VIEWPORT_PADDING),
				vx: 0.0,
				vy: 0.0,
				degree: 0,
			}
		})
		.collect();

	// First note wins when titles collide.
	let mut by_title: HashMap<String, usize> = HashMap::with_capacity(count);
	for (i, note) in notes.iter().enumerate() {
		let key = title_key(&note.title);
		if !key.is_empty() {
			by_title.entry(key).or_insert(i);
		}
	}

	let mut seen: HashSet<GraphEdge> = HashSet::new();
	let mut edges = Vec::new();
	for (src, note) in notes.iter().enumerate() {
		for target in extract(&note.content) {
			let Some(&dst) = by_title.get(&title_key(&target)) else {
				trace!("dropping link from {} to unknown note {target:?}", note.id);
				continue;
			};
			// None for self references
			let Some(edge) = GraphEdge::between(src, dst) else {
				continue;
			};
			if seen.insert(edge) {
				nodes[edge.source].degree += 1;
				nodes[edge.target].degree += 1;
				edges.push(edge);
			}
		}
	}

	debug!("built note graph: {} nodes, {} edges", nodes.len(), edges.len());
	NoteGraph { nodes, edges }
}

/// [`build_graph`] with `[[wiki link]]` extraction.
pub fn build_graph_with_wiki_links<R>(
	notes: &[Note],
	width: f64,
	height: f64,
	rng: &mut R,
) -> NoteGraph
where
	R: Rng,
{
	build_graph(notes, width, height, extract_wiki_links, rng)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	const W: f64 = 800.0;
	const H: f64 = 600.0;

	fn note(title: &str, content: &str) -> Note {
		Note::new(title, title, content)
	}

	fn build(notes: &[Note]) -> NoteGraph {
		let mut rng = SmallRng::seed_from_u64(7);
		build_graph_with_wiki_links(notes, W, H, &mut rng)
	}

	fn pairs(graph: &NoteGraph) -> HashSet<(String, String)> {
		graph
			.edges
			.iter()
			.map(|e| {
				let (a, b) = (&graph.nodes[e.source].id, &graph.nodes[e.target].id);
				if a < b {
					(a.clone(), b.clone())
				} else {
					(b.clone(), a.clone())
				}
			})
			.collect()
	}

	fn degree_of(graph: &NoteGraph, id: &str) -> usize {
		graph.nodes.iter().find(|n| n.id == id).map(|n| n.degree).unwrap()
	}

	#[test]
	fn mutual_links_collapse_to_one_edge() {
		let graph = build(&[note("A", "[[B]] [[B]]"), note("B", "[[A]]")]);
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(degree_of(&graph, "A"), 1);
		assert_eq!(degree_of(&graph, "B"), 1);
	}

	#[test]
	fn dangling_link_adds_nothing() {
		let graph = build(&[note("A", "[[NoSuchNote]]")]);
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.nodes[0].id, "A");
		assert!(graph.edges.is_empty());
		assert_eq!(graph.nodes[0].degree, 0);
	}

	#[test]
	fn self_reference_is_skipped() {
		let graph = build(&[note("A", "I am [[A]] and [[a]]")]);
		assert!(graph.edges.is_empty());
		assert_eq!(graph.nodes[0].degree, 0);
	}

	#[test]
	fn empty_collection_gives_empty_graph() {
		let graph = build(&[]);
		assert!(graph.is_empty());
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn triangle_scenario() {
		let graph = build(&[note("A", ""), note("B", "[[A]]"), note("C", "[[A]] [[B]]")]);
		assert_eq!(graph.nodes.len(), 3);
		let expected: HashSet<(String, String)> = [("A", "B"), ("A", "C"), ("B", "C")]
			.into_iter()
			.map(|(a, b)| (a.to_string(), b.to_string()))
			.collect();
		assert_eq!(pairs(&graph), expected);
		for id in ["A", "B", "C"] {
			assert_eq!(degree_of(&graph, id), 2);
		}
	}

	#[test]
	fn resolution_ignores_case_and_padding() {
		let notes = [note("Project Plan", ""), note("B", "[[ project plan ]] [[PROJECT PLAN]]")];
		let graph = build(&notes);
		assert_eq!(graph.edges.len(), 1);
	}

	#[test]
	fn degree_matches_incident_edges() {
		let notes = [
			note("hub", "[[a]] [[b]] [[c]] [[missing]]"),
			note("a", "[[b]] [[hub]]"),
			note("b", ""),
			note("c", "[[c]]"),
		];
		let graph = build(&notes);
		for (i, node) in graph.nodes.iter().enumerate() {
			let incident = graph.edges.iter().filter(|e| e.source == i || e.target == i).count();
			assert_eq!(node.degree, incident, "degree of {}", node.id);
		}
		assert_eq!(degree_of(&graph, "hub"), 3);
	}

	#[test]
	fn edges_are_sorted_and_unique() {
		let graph = build(&[note("A", "[[C]]"), note("B", "[[A]]"), note("C", "[[A]] [[B]]")]);
		let unique: HashSet<GraphEdge> = graph.edges.iter().copied().collect();
		assert_eq!(unique.len(), graph.edges.len());
		assert!(graph.edges.iter().all(|e| e.source < e.target));
	}

	#[test]
	fn seeds_on_jittered_circle() {
		let notes: Vec<Note> = (0..12).map(|i| note(&format!("n{i}"), "")).collect();
		let graph = build(&notes);
		let radius = SEED_RADIUS_RATIO * W.min(H);
		let slack = SEED_JITTER * std::f64::consts::SQRT_2 + 1e-9;
		for node in &graph.nodes {
			let d = ((node.x - W / 2.0).powi(2) + (node.y - H / 2.0).powi(2)).sqrt();
			assert!((d - radius).abs() <= slack, "{} at distance {d}", node.id);
			assert_eq!((node.vx, node.vy), (0.0, 0.0));
		}
	}

	#[test]
	fn small_viewport_seeds_inside_padding() {
		let notes: Vec<Note> = (0..8).map(|i| note(&format!("n{i}"), "")).collect();
		let (w, h) = (300.0, 200.0);
		for seed in 0..20 {
			let mut rng = SmallRng::seed_from_u64(seed);
			let graph = build_graph_with_wiki_links(&notes, w, h, &mut rng);
			for node in &graph.nodes {
				assert!((50.0..=w - 50.0).contains(&node.x), "{} x={}", node.id, node.x);
				assert!((50.0..=h - 50.0).contains(&node.y), "{} y={}", node.id, node.y);
			}
		}
	}

	#[test]
	fn tiny_viewport_seeds_at_center() {
		let notes = [note("A", ""), note("B", "")];
		let mut rng = SmallRng::seed_from_u64(2);
		let graph = build_graph_with_wiki_links(&notes, 80.0, 60.0, &mut rng);
		for node in &graph.nodes {
			assert_eq!((node.x, node.y), (40.0, 30.0));
		}
	}

	#[test]
	fn empty_title_gets_placeholder() {
		let graph = build(&[Note::new("x1", "  ", "")]);
		assert_eq!(graph.nodes[0].title, UNTITLED);
	}

	#[test]
	fn custom_extractor_is_used() {
		let notes = [note("A", "B"), note("B", "")];
		let mut rng = SmallRng::seed_from_u64(1);
		let graph = build_graph(&notes, W, H, |c: &str| vec![c.to_string()], &mut rng);
		assert_eq!(graph.edges.len(), 1);
	}
}
