use crate::types::syntax::{Kind, Syntax};

/// Finds delimiters in template source.
///
/// When several delimiters match at the same position the longest one wins,
/// so `{{-` is preferred over `{{`.
#[derive(Debug, Clone)]
pub struct Searcher {
    patterns: Vec<(Kind, String)>,
}

impl Searcher {
    pub fn new(syntax: Syntax<'_>) -> Self {
        let mut patterns = syntax.patterns;
        patterns.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));
        Self { patterns }
    }

    /// Returns the first delimiter at or after byte `at`.
    pub fn find_at(&self, haystack: &str, at: usize) -> Option<(Kind, usize, usize)> {
        let rest = &haystack[at..];
        let mut best: Option<(Kind, usize, usize)> = None;
        for (kind, pattern) in &self.patterns {
            if let Some(i) = rest.find(pattern.as_str()) {
                let (m, n) = (at + i, at + i + pattern.len());
                // Patterns are sorted longest first so only an earlier match
                // replaces the current one.
                if best.map_or(true, |(_, bm, _)| m < bm) {
                    best = Some((*kind, m, n));
                }
            }
        }
        best
    }

    /// Returns the delimiter starting exactly at byte `at`, if any.
    pub fn starts_with(&self, haystack: &str, at: usize) -> Option<(Kind, usize)> {
        let rest = &haystack[at..];
        self.patterns
            .iter()
            .find(|(_, pattern)| rest.starts_with(pattern.as_str()))
            .map(|(kind, pattern)| (*kind, at + pattern.len()))
    }
}
