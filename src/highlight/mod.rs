//! Highlight extraction for stored field values

mod highlighter;

pub use highlighter::{Fragment, Highlighter};
