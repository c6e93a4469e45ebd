//! Local heuristic scoring

use crate::config::AnnotatorConfig;
use crate::lexicon::Lexicon;
use regex::Regex;
use scholar_domain::traits::TextAnalyzer;
use scholar_domain::AnnotatedText;
use std::collections::HashMap;
use std::future::Future;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:'\w+)*").expect("word pattern compiles"));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("code fence pattern compiles"));

static DEFAULT_ANNOTATOR: LazyLock<Annotator> = LazyLock::new(Annotator::default);

/// Case-folded word tokens in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Annotate with the default configuration
///
/// # Examples
///
/// ```
/// let out = scholar_annotator::annotate("This is good and great");
/// assert!(out.sentiment > 0.5);
/// ```
pub fn annotate(text: &str) -> AnnotatedText {
    DEFAULT_ANNOTATOR.annotate(text)
}

/// Deterministic sentiment, complexity and key-term scoring
///
/// Scores are display hints only. Every string is a valid input; text
/// without words scores `{0.5, 0.0, []}`.
#[derive(Debug, Clone)]
pub struct Annotator {
    config: AnnotatorConfig,
    lexicon: Lexicon,
}

impl Annotator {
    /// Create an annotator; lexicon overrides are applied once here
    pub fn new(config: AnnotatorConfig) -> Self {
        let lexicon = Lexicon::from_overrides(&config.lexicon);
        Self { config, lexicon }
    }

    /// Active configuration
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Score a piece of text
    pub fn annotate(&self, text: &str) -> AnnotatedText {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return AnnotatedText::empty();
        }

        AnnotatedText {
            sentiment: self.sentiment(&tokens),
            complexity: self.complexity(text, &tokens),
            key_terms: self.key_terms(&tokens),
        }
    }

    fn sentiment(&self, tokens: &[String]) -> f64 {
        let delta = tokens.iter().fold(0i64, |acc, token| {
            if self.lexicon.is_positive(token) {
                acc + 1
            } else if self.lexicon.is_negative(token) {
                acc - 1
            } else {
                acc
            }
        });

        (0.5 + self.config.sentiment_step * delta as f64).clamp(0.0, 1.0)
    }

    fn complexity(&self, text: &str, tokens: &[String]) -> f64 {
        let word_count = tokens.len() as f64;

        let total_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
        let word_length = total_chars as f64 / word_count / self.config.word_length_scale;

        let sentences = text
            .split(['.', '!', '?'])
            .filter(|segment| WORD.is_match(segment))
            .count()
            .max(1);
        let sentence_length = word_count / sentences as f64 / self.config.sentence_length_scale;

        let technical = tokens
            .iter()
            .filter(|t| self.lexicon.is_technical(t))
            .count() as f64;
        let technical_fraction = technical / word_count / self.config.technical_fraction_scale;

        let code_block = if CODE_FENCE.is_match(text) { 1.0 } else { 0.0 };

        let w = &self.config.weights;
        let score = w.word_length * word_length.clamp(0.0, 1.0)
            + w.sentence_length * sentence_length.clamp(0.0, 1.0)
            + w.technical * technical_fraction.clamp(0.0, 1.0)
            + w.code_block * code_block;

        score.clamp(0.0, 1.0)
    }

    fn key_terms(&self, tokens: &[String]) -> Vec<String> {
        // token -> (count, first position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

        for (position, token) in tokens.iter().enumerate() {
            if token.chars().count() < self.config.min_term_length
                || token.chars().all(|c| c.is_numeric())
                || self.lexicon.is_stopword(token)
            {
                continue;
            }
            counts.entry(token.as_str()).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(term, (count, first))| (term, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let limit = self.config.max_key_terms.min(AnnotatedText::MAX_KEY_TERMS);
        ranked
            .into_iter()
            .take(limit)
            .map(|(term, _, _)| term.to_string())
            .collect()
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}

impl TextAnalyzer for Annotator {
    fn analyze(&self, text: &str) -> impl Future<Output = AnnotatedText> + Send {
        std::future::ready(self.annotate(text))
    }
}
