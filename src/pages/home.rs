use leptos::prelude::*;
use log::info;

use crate::components::note_graph::{Note, NoteGraphCanvas};

/// A small linked notebook to show the graph with.
fn sample_notes() -> Vec<Note> {
	vec![
		Note::new("1", "Inbox", "Triage into [[Projects]] or [[Reading List]]."),
		Note::new("2", "Projects", "Active: [[Garden Plan]], [[Rust Notes]]. See [[inbox]]."),
		Note::new("3", "Garden Plan", "Tomatoes, beans. Budget in [[Expenses]]."),
		Note::new("4", "Rust Notes", "Ownership, lifetimes. Links: [[Reading List|books]]."),
		Note::new("5", "Reading List", "- The Rust Book\n- [[Rust Notes#Lifetimes]]"),
		Note::new("6", "Expenses", "Seeds: 12. Tools: see [[Garden Plan]]. [[Taxes 2025]]"),
		Note::new("7", "", "A scratch note with no title."),
		Note::new("8", "Journal", "Worked on [[projects]] and read from the [[reading list]]."),
		Note::new("9", "Recipes", "[[Garden Plan]] harvest ideas."),
	]
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let notes = Signal::derive(sample_notes);
	let (graph_open, set_graph_open) = signal(true);
	let (reset, set_reset) = signal(0u32);
	let (opened, set_opened) = signal(None::<String>);

	let on_open = Callback::new(move |id: String| {
		info!("navigate to note {id}");
		set_opened.set(Some(id));
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<Show when=move || graph_open.get()>
					<NoteGraphCanvas notes=notes on_open=on_open reset=reset fullscreen=true />
				</Show>
				<div class="graph-overlay">
					<h1>"Note Graph"</h1>
					<p class="subtitle">
						"Drag to move notes or pan. Scroll to zoom. Double-click to open."
					</p>
					<button on:click=move |_| set_graph_open.update(|open| *open = !*open)>
						{move || if graph_open.get() { "Close graph" } else { "Open graph" }}
					</button>
					<button on:click=move |_| set_reset.update(|n| *n += 1)>"Reset layout"</button>
					<p class="opened">
						{move || {
							opened
								.get()
								.map(|id| format!("Opened note {id}"))
								.unwrap_or_else(|| "No note opened".into())
						}}
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
