mod builder;
mod component;
mod links;
mod render;
mod simulation;
mod state;
mod types;

pub use component::NoteGraphCanvas;
pub use types::Note;
