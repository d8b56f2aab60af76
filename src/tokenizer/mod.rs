//! Text analysis
//!
//! An [`Analyzer`] turns field text into normalized index terms. The same
//! analyzer runs at index time and at query time so that terms agree.

mod analyzer;

pub use analyzer::{Analyzer, AnalyzerRef, Token, Tokens};
