//! Word lists used by the annotator

use crate::config::LexiconOverrides;
use std::collections::HashSet;

/// Default positive affect terms
pub const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "happy", "love", "best", "helpful",
    "useful", "clear", "success", "successful", "effective", "improve", "improved", "benefit",
    "fantastic", "positive", "thanks",
];

/// Default negative affect terms
pub const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "sad", "hate", "worst", "poor", "wrong", "fail",
    "failed", "failure", "problem", "difficult", "error", "broken", "negative", "confusing",
    "useless", "worse",
];

/// Default technical terms
pub const TECHNICAL: &[&str] = &[
    "algorithm", "api", "array", "async", "binary", "cache", "compiler", "concurrency",
    "database", "dataset", "function", "hypothesis", "index", "kernel", "latency", "matrix",
    "memory", "model", "protocol", "query", "recursion", "regression", "runtime", "schema",
    "server", "statistical", "thread", "variable", "vector",
];

/// Default stopwords
pub const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had",
    "has", "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "just", "more", "most", "my", "no", "not", "of", "on", "one", "or", "other", "our",
    "out", "she", "so", "some", "such", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "those", "to", "too", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "will", "with", "would", "you", "your",
];

/// Case-folded word sets
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    technical: HashSet<String>,
    stopwords: HashSet<String>,
}

fn to_set<'a>(words: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    words.into_iter().map(str::to_lowercase).collect()
}

fn pick(replacement: &Option<Vec<String>>, default: &[&str]) -> HashSet<String> {
    match replacement {
        Some(words) => to_set(words.iter().map(String::as_str)),
        None => to_set(default.iter().copied()),
    }
}

impl Lexicon {
    /// Default lists with any configured replacements applied
    pub fn from_overrides(overrides: &LexiconOverrides) -> Self {
        Self {
            positive: pick(&overrides.positive, POSITIVE),
            negative: pick(&overrides.negative, NEGATIVE),
            technical: pick(&overrides.technical, TECHNICAL),
            stopwords: pick(&overrides.stopwords, STOPWORDS),
        }
    }

    /// Positive affect term
    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.contains(token)
    }

    /// Negative affect term
    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.contains(token)
    }

    /// Technical term
    pub fn is_technical(&self, token: &str) -> bool {
        self.technical.contains(token)
    }

    /// Stopword
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_overrides(&LexiconOverrides::default())
    }
}
