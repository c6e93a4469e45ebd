//! Property tests for local annotation

use proptest::prelude::*;
use scholar_annotator::{annotate, Annotator};
use scholar_domain::AnnotatedText;

/// Words that appear in none of the default lexicons
fn neutral_words() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(
        prop::sample::select(vec!["river", "stone", "window", "paper", "garden", "yellow"]),
        0..30,
    )
}

proptest! {
    #[test]
    fn prop_scores_stay_in_bounds(text in any::<String>()) {
        let out = annotate(&text);
        prop_assert!(out.is_within_bounds());
    }

    #[test]
    fn prop_scores_stay_in_bounds_for_prose(text in "[a-zA-Z .!?,'`\n]{0,400}") {
        let out = annotate(&text);
        prop_assert!((0.0..=1.0).contains(&out.sentiment));
        prop_assert!((0.0..=1.0).contains(&out.complexity));
        prop_assert!(out.key_terms.len() <= AnnotatedText::MAX_KEY_TERMS);
    }

    #[test]
    fn prop_annotation_is_deterministic(text in any::<String>()) {
        let annotator = Annotator::default();
        prop_assert_eq!(annotator.annotate(&text), annotator.annotate(&text));
    }

    #[test]
    fn prop_more_positive_words_never_lower_sentiment(
        words in neutral_words(),
        extra in 0usize..5,
    ) {
        let base = words.join(" ");
        let fewer = format!("{} {}", base, "good ".repeat(extra));
        let more = format!("{} {}", base, "good ".repeat(extra + 1));
        prop_assert!(annotate(&more).sentiment >= annotate(&fewer).sentiment);
    }

    #[test]
    fn prop_more_negative_words_never_raise_sentiment(
        words in neutral_words(),
        extra in 0usize..5,
    ) {
        let base = words.join(" ");
        let fewer = format!("{} {}", base, "bad ".repeat(extra));
        let more = format!("{} {}", base, "bad ".repeat(extra + 1));
        prop_assert!(annotate(&more).sentiment <= annotate(&fewer).sentiment);
    }

    #[test]
    fn prop_code_fence_never_lowers_complexity(text in "[a-z .!?]{1,200}") {
        let fenced = format!("```{}```", text);
        prop_assert!(annotate(&fenced).complexity >= annotate(&text).complexity);
    }

    #[test]
    fn prop_key_terms_are_unique(text in "[a-z ]{0,300}") {
        let out = annotate(&text);
        let mut terms = out.key_terms.clone();
        terms.sort();
        terms.dedup();
        prop_assert_eq!(terms.len(), out.key_terms.len());
    }
}

#[test]
fn test_empty_string_is_degenerate() {
    let out = annotate("");
    assert_eq!(out.sentiment, 0.5);
    assert_eq!(out.complexity, 0.0);
    assert!(out.key_terms.is_empty());
}
