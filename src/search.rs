use fuzzy_matcher::FuzzyMatcher;

/// A scored key suggestion.
#[derive(Debug, Clone)]
pub struct KeyMatch {
    pub key: String,
    pub score: i64,
}

/// Suggestion matcher for localization keys.
pub struct KeyMatcher {
    matcher: fuzzy_matcher::skim::SkimMatcherV2,
}

impl KeyMatcher {
    pub fn new() -> Self {
        Self {
            matcher: fuzzy_matcher::skim::SkimMatcherV2::default(),
        }
    }

    /// Exact substring match (highest priority).
    fn exact_match(&self, query: &str, key: &str) -> Option<i64> {
        if key.contains(query) {
            Some(1000 + (query.len() * 10) as i64)
        } else {
            None
        }
    }

    /// Prefix match.
    fn prefix_match(&self, query: &str, key: &str) -> Option<i64> {
        if key.starts_with(query) {
            Some(800 + (query.len() * 8) as i64)
        } else {
            None
        }
    }

    fn fuzzy_match(&self, query: &str, key: &str) -> Option<i64> {
        self.matcher.fuzzy_match(key, query)
    }

    /// Score `key` against `query`, trying strategies by priority.
    pub fn score(&self, query: &str, key: &str) -> Option<i64> {
        if query.is_empty() {
            // Empty query matches everything.
            return Some(0);
        }

        if let Some(score) = self.exact_match(query, key) {
            return Some(score);
        }

        if let Some(score) = self.prefix_match(query, key) {
            return Some(score);
        }

        self.fuzzy_match(query, key)
    }

    /// Score every key and sort the matches best-first; ties break on the
    /// shorter key.
    pub fn suggestions(&self, query: &str, keys: &[String]) -> Vec<KeyMatch> {
        let mut results: Vec<KeyMatch> = keys
            .iter()
            .filter_map(|key| {
                self.score(query, key).map(|score| KeyMatch {
                    key: key.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            if a.score != b.score {
                return b.score.cmp(&a.score);
            }
            a.key.len().cmp(&b.key.len())
        });

        results
    }
}

impl Default for KeyMatcher {
    fn default() -> Self {
        Self::new()
    }
}
