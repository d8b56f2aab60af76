use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::AnalyzerConfig;
use crate::error::SchemaError;

/// Shared handle to an analyzer
pub type AnalyzerRef = Arc<Analyzer>;

/// A normalized term with its word position and byte span in the source text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    /// Word position, counting words dropped by the filters
    pub position: u32,
    pub start: usize,
    pub end: usize,
}

/// Text analyzer: word splitting, lowercasing, stopword removal and stemming
pub struct Analyzer {
    config: AnalyzerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

fn stemmer_algorithm(language: &str) -> Option<Algorithm> {
    match language.to_lowercase().as_str() {
        "english" | "en" => Some(Algorithm::English),
        "french" | "fr" => Some(Algorithm::French),
        "german" | "de" => Some(Algorithm::German),
        "spanish" | "es" => Some(Algorithm::Spanish),
        "portuguese" | "pt" => Some(Algorithm::Portuguese),
        "italian" | "it" => Some(Algorithm::Italian),
        "dutch" | "nl" => Some(Algorithm::Dutch),
        "russian" | "ru" => Some(Algorithm::Russian),
        _ => None,
    }
}

fn stopword_language(language: &str) -> Option<LANGUAGE> {
    match language.to_lowercase().as_str() {
        "english" | "en" => Some(LANGUAGE::English),
        "french" | "fr" => Some(LANGUAGE::French),
        "german" | "de" => Some(LANGUAGE::German),
        "spanish" | "es" => Some(LANGUAGE::Spanish),
        "portuguese" | "pt" => Some(LANGUAGE::Portuguese),
        "italian" | "it" => Some(LANGUAGE::Italian),
        "dutch" | "nl" => Some(LANGUAGE::Dutch),
        "russian" | "ru" => Some(LANGUAGE::Russian),
        _ => None,
    }
}

fn stopword_set(language: LANGUAGE) -> HashSet<String> {
    get(language)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect()
}

impl Analyzer {
    /// Create a new analyzer from configuration
    pub fn new(config: &AnalyzerConfig) -> Result<Self, SchemaError> {
        let unsupported = || SchemaError::UnsupportedLanguage(config.language.clone());

        let stemmer = if config.stem {
            let algorithm = stemmer_algorithm(&config.language).ok_or_else(unsupported)?;
            Some(Stemmer::create(algorithm))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            stopword_set(stopword_language(&config.language).ok_or_else(unsupported)?)
        } else {
            HashSet::new()
        };

        Ok(Self {
            config: config.clone(),
            stemmer,
            stopwords,
        })
    }

    /// The standard English analyzer
    pub fn standard() -> Self {
        Self {
            config: AnalyzerConfig::standard(),
            stemmer: Some(Stemmer::create(Algorithm::English)),
            stopwords: stopword_set(LANGUAGE::English),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze text into tokens
    ///
    /// The iterator is lazy and holds no state beyond the input, so calling
    /// `analyze` again on the same text yields the same sequence.
    pub fn analyze<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        let pieces: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = if self.config.tokenize {
            Box::new(
                text.unicode_word_indices()
                    .flat_map(|(offset, word)| alphanumeric_runs(offset, word)),
            )
        } else {
            let trimmed = text.trim();
            let offset = text.len() - text.trim_start().len();
            Box::new((!trimmed.is_empty()).then_some((offset, trimmed)).into_iter())
        };

        Tokens {
            analyzer: self,
            pieces,
            position: 0,
        }
    }

    /// Analyze text and return the terms in order
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).map(|t| t.term).collect()
    }

    /// Compute term frequencies for a piece of text
    pub fn term_frequencies(&self, text: &str) -> HashMap<String, u32> {
        let mut freq = HashMap::new();
        for token in self.analyze(text) {
            *freq.entry(token.term).or_insert(0) += 1;
        }
        freq
    }

    fn normalize(&self, word: &str) -> Option<String> {
        let mut token = if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };

        if self.config.tokenize {
            let len = token.chars().count();
            if len < self.config.min_token_length || len > self.config.max_token_length {
                return None;
            }
        }

        if self.stopwords.contains(&token) {
            return None;
        }

        if let Some(stemmer) = &self.stemmer {
            token = stemmer.stem(&token).into_owned();
        }

        Some(token)
    }
}

/// Split a word on every non-alphanumeric character, keeping byte offsets
fn alphanumeric_runs(offset: usize, word: &str) -> Vec<(usize, &str)> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, c) in word.char_indices() {
        match (c.is_alphanumeric(), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                runs.push((offset + start, &word[start..i]));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push((offset + start, &word[start..]));
    }

    runs
}

/// Lazy token stream produced by [`Analyzer::analyze`]
pub struct Tokens<'a> {
    analyzer: &'a Analyzer,
    pieces: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    position: u32,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        for (start, word) in self.pieces.by_ref() {
            let position = self.position;
            self.position += 1;

            if let Some(term) = self.analyzer.normalize(word) {
                return Some(Token {
                    term,
                    position,
                    start,
                    end: start + word.len(),
                });
            }
        }
        None
    }
}
