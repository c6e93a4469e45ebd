//! Scholar Annotator
//!
//! Heuristic display metadata for message text: a sentiment score, a
//! complexity score and up to five key terms.
//!
//! # Backends
//!
//! - [`Annotator`]: in-process, deterministic, never fails
//! - [`RemoteAnnotator`]: delegates to an HTTP service with the same
//!   request/response shape and falls back to neutral scores on failure
//!
//! [`Analyzer`] wraps either one behind the domain `TextAnalyzer` trait.
//!
//! # Examples
//!
//! ```
//! use scholar_annotator::Annotator;
//!
//! let annotator = Annotator::default();
//! let out = annotator.annotate("Great work on the new database schema.");
//! assert!(out.sentiment > 0.5);
//! assert!(out.key_terms.contains(&"database".to_string()));
//! ```

#![warn(missing_docs)]

mod analysis;
mod config;
mod error;
mod lexicon;
mod remote;

use scholar_domain::traits::TextAnalyzer;
use scholar_domain::AnnotatedText;

pub use analysis::{annotate, tokenize, Annotator};
pub use config::{AnnotatorConfig, ComplexityWeights, LexiconOverrides, RemoteAnnotatorConfig};
pub use error::AnnotatorError;
pub use lexicon::Lexicon;
pub use remote::RemoteAnnotator;

/// Either annotation backend
#[derive(Debug, Clone)]
pub enum Analyzer {
    /// In-process scoring
    Local(Annotator),
    /// HTTP delegate with neutral fallback
    Remote(RemoteAnnotator),
}

impl Analyzer {
    /// Remote when a delegate is configured, local otherwise
    pub fn from_config(
        local: AnnotatorConfig,
        remote: Option<&RemoteAnnotatorConfig>,
    ) -> Result<Self, AnnotatorError> {
        match remote {
            Some(remote) => Ok(Analyzer::Remote(RemoteAnnotator::new(remote)?)),
            None => {
                local.validate().map_err(AnnotatorError::Config)?;
                Ok(Analyzer::Local(Annotator::new(local)))
            }
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::Local(Annotator::default())
    }
}

impl TextAnalyzer for Analyzer {
    async fn analyze(&self, text: &str) -> AnnotatedText {
        match self {
            Analyzer::Local(annotator) => annotator.annotate(text),
            Analyzer::Remote(remote) => remote.annotate(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_analyzer_is_local() {
        let analyzer = Analyzer::default();
        assert!(matches!(analyzer, Analyzer::Local(_)));
        assert_eq!(analyzer.analyze("").await, AnnotatedText::empty());
    }

    #[test]
    fn test_from_config_picks_backend() {
        let local = Analyzer::from_config(AnnotatorConfig::default(), None).unwrap();
        assert!(matches!(local, Analyzer::Local(_)));

        let remote_config = RemoteAnnotatorConfig::default();
        let remote = Analyzer::from_config(AnnotatorConfig::default(), Some(&remote_config)).unwrap();
        assert!(matches!(remote, Analyzer::Remote(_)));
    }

    #[test]
    fn test_from_config_rejects_invalid_local_config() {
        let config = AnnotatorConfig {
            max_key_terms: 10,
            ..Default::default()
        };
        assert!(matches!(
            Analyzer::from_config(config, None),
            Err(AnnotatorError::Config(_))
        ));
    }
}
