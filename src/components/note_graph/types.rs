/// Title shown for notes whose title is empty.
pub const UNTITLED: &str = "Untitled";

/// A note as handed over by the host application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Note {
	pub id: String,
	pub title: String,
	pub content: String,
}

impl Note {
	pub fn new(
		id: impl Into<String>,
		title: impl Into<String>,
		content: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			content: content.into(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub title: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Incident edge count, fixed at build time.
	pub degree: usize,
}

/// Undirected link between two node indices, stored with `source < target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphEdge {
	pub source: usize,
	pub target: usize,
}

impl GraphEdge {
	/// Builds the canonical (sorted) edge for a pair. Returns `None` for self-loops.
	pub fn between(a: usize, b: usize) -> Option<Self> {
		match a.cmp(&b) {
			std::cmp::Ordering::Less => Some(Self { source: a, target: b }),
			std::cmp::Ordering::Greater => Some(Self { source: b, target: a }),
			std::cmp::Ordering::Equal => None,
		}
	}

	/// The endpoint opposite `idx`, if `idx` is one of the endpoints.
	pub fn other(&self, idx: usize) -> Option<usize> {
		if self.source == idx {
			Some(self.target)
		} else if self.target == idx {
			Some(self.source)
		} else {
			None
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct NoteGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl NoteGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.edges.iter().filter_map(move |e| e.other(idx))
	}
}
