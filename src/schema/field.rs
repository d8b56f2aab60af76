//! Per-field options

use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;

/// How a single field is indexed and stored
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Whether analyzed terms are searchable (default: true)
    #[serde(default = "default_true")]
    pub indexed: bool,

    /// Whether the original value is retrievable (default: false)
    #[serde(default)]
    pub stored: bool,

    /// Analyzer used at index and query time
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Record term positions in postings (default: true)
    #[serde(default = "default_true")]
    pub positions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            indexed: true,
            stored: false,
            analyzer: AnalyzerConfig::standard(),
            positions: true,
        }
    }
}

impl FieldOptions {
    pub fn new(indexed: bool, stored: bool, analyzer: AnalyzerConfig) -> Self {
        Self {
            indexed,
            stored,
            analyzer,
            positions: true,
        }
    }

    /// Indexed full-text field with the standard analyzer
    pub fn text() -> Self {
        Self::default()
    }

    /// Indexed field matched as a single exact term
    pub fn keyword() -> Self {
        Self::new(true, false, AnalyzerConfig::keyword())
    }

    /// Field kept only for retrieval
    pub fn stored_only() -> Self {
        Self {
            indexed: false,
            stored: true,
            analyzer: AnalyzerConfig::keyword(),
            positions: false,
        }
    }

    pub fn with_stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }

    /// Shorthand for `with_stored(true)`
    pub fn stored(self) -> Self {
        self.with_stored(true)
    }

    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_positions(mut self, positions: bool) -> Self {
        self.positions = positions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_presets() {
        let text = FieldOptions::text();
        assert!(text.indexed);
        assert!(!text.stored);
        assert_eq!(text.analyzer, AnalyzerConfig::standard());

        let keyword = FieldOptions::keyword().stored();
        assert!(keyword.indexed);
        assert!(keyword.stored);
        assert!(!keyword.analyzer.tokenize);

        let stored = FieldOptions::stored_only();
        assert!(!stored.indexed);
        assert!(stored.stored);
    }

    #[test]
    fn test_serde_defaults() {
        let options: FieldOptions = serde_json::from_str(r#"{"stored": true}"#).unwrap();
        assert!(options.indexed);
        assert!(options.stored);
        assert!(options.positions);
        assert_eq!(options.analyzer, AnalyzerConfig::standard());
    }

    #[test]
    fn test_serialization() {
        let options = FieldOptions::text()
            .stored()
            .with_analyzer(AnalyzerConfig::simple());
        let json = serde_json::to_string(&options).unwrap();
        let back: FieldOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, back);
    }
}
