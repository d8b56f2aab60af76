use serde::{Deserialize, Serialize};

use crate::query::MatchOperator;
use crate::segment::Bm25Params;

/// Engine configuration, passed once at construction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    pub highlight: HighlightConfig,
    /// Maximum number of hits returned by `query`
    pub default_limit: usize,
    pub operator: MatchOperator,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            highlight: HighlightConfig::default(),
            default_limit: 10,
            operator: MatchOperator::Or,
        }
    }
}

impl EngineConfig {
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_highlight(mut self, highlight: HighlightConfig) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_bm25(mut self, bm25: Bm25Params) -> Self {
        self.bm25 = bm25;
        self
    }
}

/// Analyzer configuration
///
/// Two fields share an analyzer exactly when their configurations are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Split text into words; when false the whole trimmed value is one term
    pub tokenize: bool,
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnalyzerConfig {
    /// Lowercase, stopword removal and stemming
    pub fn standard() -> Self {
        Self {
            tokenize: true,
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            min_token_length: 2,
            max_token_length: 50,
            language: "english".to_string(),
        }
    }

    /// Lowercase only
    pub fn simple() -> Self {
        Self {
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            ..Self::standard()
        }
    }

    /// The whole value is indexed as a single exact term
    pub fn keyword() -> Self {
        Self {
            tokenize: false,
            lowercase: false,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: usize::MAX,
            language: "english".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_stopwords(mut self, remove: bool) -> Self {
        self.remove_stopwords = remove;
        self
    }

    pub fn with_stemming(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    pub fn with_token_length(mut self, min: usize, max: usize) -> Self {
        self.min_token_length = min;
        self.max_token_length = max;
        self
    }
}

/// Highlight fragment and markup settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// HTML tag wrapped around each match
    pub tag: String,
    pub class: String,
    /// Per-term class prefix, suffixed with the term's index in the query
    pub term_class: String,
    /// Characters of context kept on each side of a match group
    pub surround: usize,
    /// Maximum fragment length in characters
    pub max_chars: usize,
    pub max_fragments: usize,
    pub separator: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            tag: "strong".to_string(),
            class: "match".to_string(),
            term_class: "term".to_string(),
            surround: 20,
            max_chars: 200,
            max_fragments: 3,
            separator: "...".to_string(),
        }
    }
}

impl HighlightConfig {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_surround(mut self, surround: usize) -> Self {
        self.surround = surround;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_max_fragments(mut self, max_fragments: usize) -> Self {
        self.max_fragments = max_fragments;
        self
    }
}
