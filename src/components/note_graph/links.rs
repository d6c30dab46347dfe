//! Extraction of `[[wiki link]]` targets from markdown note bodies.

use std::sync::LazyLock;

use regex::Regex;

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\[\[([^\[\]\n]+?)\]\]").expect("wiki link pattern is valid")
});

/// Returns the titles referenced by `[[...]]` links in `content`, in order of
/// appearance. `[[Title|alias]]` and `[[Title#heading]]` both yield `Title`.
/// Case is preserved; resolution is left to the caller.
pub fn extract_wiki_links(content: &str) -> Vec<String> {
	WIKI_LINK
		.captures_iter(content)
		.filter_map(|caps| {
			let inner = caps.get(1)?.as_str();
			let target = inner.split(['|', '#']).next().unwrap_or_default().trim();
			(!target.is_empty()).then(|| target.to_string())
		})
		.collect()
}
