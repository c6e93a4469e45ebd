//! Parse inline citation markers out of model completions
//!
//! Marker syntax, emitted by the model because the prompt asks for it:
//!
//! ```text
//! [CITATION]{<title>}|{<url>}|{<text>}
//! ```
//!
//! Fields are any run of characters other than `}`. There is no escaping and
//! no whitespace allowed between groups. Anything that does not match the
//! whole pattern is ordinary text.
//!
//! If the grammar ever needs escaping or nesting, replace the pattern with a
//! small tokenizer instead of growing the regex.

use regex::Regex;
use scholar_domain::Citation;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Literal tag that opens a marker
pub const CITATION_TAG: &str = "[CITATION]";

/// Parenthetical text used when a marker has an empty title
pub const DEFAULT_PLACEHOLDER: &str = "Source";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CITATION\]\{([^}]*)\}\|\{([^}]*)\}\|\{([^}]*)\}")
        .expect("marker pattern compiles")
});

/// Display text and citations split out of one completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationExtraction {
    /// Input with each marker replaced by `(<title>)`
    pub clean_text: String,

    /// One citation per marker, in order of appearance
    pub citations: Vec<Citation>,
}

impl CitationExtraction {
    /// Number of markers that were replaced
    pub fn marker_count(&self) -> usize {
        self.citations.len()
    }
}

/// Extract citations using [`DEFAULT_PLACEHOLDER`] for untitled markers
///
/// # Examples
///
/// ```
/// use scholar_extractor::extract_citations;
///
/// let out = extract_citations("Known [CITATION]{Paper}|{http://x}|{quote}.");
/// assert_eq!(out.clean_text, "Known (Paper).");
/// assert_eq!(out.citations[0].text, "quote");
/// ```
pub fn extract_citations(input: &str) -> CitationExtraction {
    extract_citations_with(input, DEFAULT_PLACEHOLDER)
}

/// Extract citations, labelling untitled markers with `placeholder`
pub fn extract_citations_with(input: &str, placeholder: &str) -> CitationExtraction {
    let mut clean_text = String::with_capacity(input.len());
    let mut citations = Vec::new();
    let mut last_end = 0;

    for caps in MARKER.captures_iter(input) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let (title, url, text) = (field(1), field(2), field(3));

        clean_text.push_str(&input[last_end..whole.start]);
        let label = strip_tags(title);
        clean_text.push('(');
        if label.trim().is_empty() {
            clean_text.push_str(placeholder);
        } else {
            clean_text.push_str(&label);
        }
        clean_text.push(')');
        last_end = whole.end;

        citations.push(Citation::new(title, url, text));
    }
    clean_text.push_str(&input[last_end..]);

    CitationExtraction {
        clean_text,
        citations,
    }
}

/// Remove every marker tag from a title before it is rendered
///
/// Removal repeats because deleting one tag can join the pieces of another.
fn strip_tags(title: &str) -> Cow<'_, str> {
    if !title.contains(CITATION_TAG) {
        return Cow::Borrowed(title);
    }
    let mut label = title.replace(CITATION_TAG, "");
    while label.contains(CITATION_TAG) {
        label = label.replace(CITATION_TAG, "");
    }
    Cow::Owned(label)
}

/// Count well-formed markers without building the cleaned text
pub fn count_markers(input: &str) -> usize {
    MARKER.find_iter(input).count()
}
