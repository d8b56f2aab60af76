//! Marks matched query terms inside stored text
//!
//! The text is re-analyzed with the field's analyzer, so a match is any token
//! whose normalized term is one of the query terms. Nearby matches are grouped
//! into fragments with some surrounding context; the best fragments are
//! rendered as HTML and joined.

use serde_json::Value;
use std::fmt::Write;

use crate::config::HighlightConfig;
use crate::tokenizer::Analyzer;

/// A matched token: byte span and the index of its term in the query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Match {
    start: usize,
    end: usize,
    term_index: usize,
}

/// A window of text containing one or more matches
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    /// Byte offsets into the source text
    pub start: usize,
    pub end: usize,
    /// Number of matches inside the window
    pub matches: usize,
}

/// Produces highlighted excerpts
#[derive(Clone, Debug, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Highlight a text, or `None` when no term matches
    ///
    /// `terms` are normalized query terms; a term's index in the slice picks
    /// its CSS class.
    pub fn highlight<S: AsRef<str>>(
        &self,
        text: &str,
        analyzer: &Analyzer,
        terms: &[S],
    ) -> Option<String> {
        let matches = find_matches(text, analyzer, terms);
        if matches.is_empty() {
            return None;
        }

        let fragments = self.best_fragments(text, &matches);
        let mut out = String::new();
        for (i, fragment) in fragments.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.config.separator);
            }
            self.render(&mut out, text, fragment, &matches);
        }
        Some(out)
    }

    /// Highlight a JSON value, returning the original when it is not text or
    /// nothing matches
    pub fn highlight_value<S: AsRef<str>>(
        &self,
        value: &Value,
        analyzer: &Analyzer,
        terms: &[S],
    ) -> Value {
        match value {
            Value::String(text) => self
                .highlight(text, analyzer, terms)
                .map(Value::String)
                .unwrap_or_else(|| value.clone()),
            other => other.clone(),
        }
    }

    /// Group matches into fragments and keep the best ones, in text order
    pub fn fragments<S: AsRef<str>>(
        &self,
        text: &str,
        analyzer: &Analyzer,
        terms: &[S],
    ) -> Vec<Fragment> {
        let matches = find_matches(text, analyzer, terms);
        self.best_fragments(text, &matches)
    }

    fn best_fragments(&self, text: &str, matches: &[Match]) -> Vec<Fragment> {
        let mut fragments = self.group(text, matches);

        // Best by match count, earliest first among equals
        fragments.sort_by(|a, b| b.matches.cmp(&a.matches).then(a.start.cmp(&b.start)));
        fragments.truncate(self.config.max_fragments.max(1));
        fragments.sort_by_key(|f| f.start);
        fragments
    }

    fn group(&self, text: &str, matches: &[Match]) -> Vec<Fragment> {
        let max_chars = self.config.max_chars;
        let mut fragments: Vec<Fragment> = Vec::new();
        let mut i = 0;

        while i < matches.len() {
            let first = matches[i];
            let mut last = first;
            let mut count = 1;
            while let Some(next) = matches.get(i + count) {
                if text[first.start..next.end].chars().count() > max_chars {
                    break;
                }
                last = *next;
                count += 1;
            }
            i += count;

            // Context fills the room left under max_chars, split between sides
            let slack = max_chars.saturating_sub(text[first.start..last.end].chars().count());
            let start = chars_before(text, first.start, self.config.surround.min(slack / 2));
            let used = text[start..first.start].chars().count();
            let end = chars_after(text, last.end, self.config.surround.min(slack - used));
            let mut fragment = Fragment {
                start,
                end,
                matches: count,
            };

            if let Some(prev) = fragments.last_mut() {
                if fragment.start <= prev.end {
                    if text[prev.start..fragment.end].chars().count() <= max_chars {
                        prev.end = fragment.end;
                        prev.matches += fragment.matches;
                        continue;
                    }
                    // Too long to merge: split the shared context at the new group
                    prev.end = prev.end.min(first.start);
                    fragment.start = fragment.start.max(prev.end);
                }
            }
            fragments.push(fragment);
        }

        fragments
    }

    fn render(&self, out: &mut String, text: &str, fragment: &Fragment, matches: &[Match]) {
        let mut cursor = fragment.start;
        for m in matches
            .iter()
            .filter(|m| m.start >= fragment.start && m.end <= fragment.end)
        {
            escape_into(out, &text[cursor..m.start]);
            let _ = write!(
                out,
                "<{tag} class=\"{class} {term_class}{index}\">",
                tag = self.config.tag,
                class = self.config.class,
                term_class = self.config.term_class,
                index = m.term_index,
            );
            escape_into(out, &text[m.start..m.end]);
            let _ = write!(out, "</{}>", self.config.tag);
            cursor = m.end;
        }
        escape_into(out, &text[cursor..fragment.end]);
    }
}

fn find_matches<S: AsRef<str>>(text: &str, analyzer: &Analyzer, terms: &[S]) -> Vec<Match> {
    if terms.is_empty() {
        return Vec::new();
    }
    analyzer
        .analyze(text)
        .filter_map(|token| {
            let term_index = terms.iter().position(|t| t.as_ref() == token.term)?;
            Some(Match {
                start: token.start,
                end: token.end,
                term_index,
            })
        })
        .collect()
}

/// Byte offset `n` characters before `pos`, clamped to the start
fn chars_before(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos)
}

/// Byte offset `n` characters after `pos`, clamped to the end
fn chars_after(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
}
