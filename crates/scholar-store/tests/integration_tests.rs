//! Integration tests for scholar-store
//!
//! These tests verify the message and citation lifecycle against SQLite.

use scholar_domain::traits::ResearchStore;
use scholar_domain::{
    Citation, CitationId, MessageDetails, MessageMetadata, NewMessage, Role, TokenMetrics,
};
use scholar_store::{SqliteStore, StoreError};

fn user_message(conversation_id: &str, content: &str) -> NewMessage {
    NewMessage {
        conversation_id: conversation_id.to_string(),
        role: Role::User,
        content: content.to_string(),
        model_name: String::new(),
        metadata: MessageMetadata::new(MessageDetails::UserPrompt)
            .with_token_metrics(TokenMetrics::estimate(content)),
    }
}

fn assistant_message(conversation_id: &str, content: &str) -> NewMessage {
    NewMessage {
        conversation_id: conversation_id.to_string(),
        role: Role::Assistant,
        content: content.to_string(),
        model_name: "gemini-pro".to_string(),
        metadata: MessageMetadata::new(MessageDetails::Research {
            model: "gemini-pro".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            citation_count: 2,
        }),
    }
}

#[test]
fn test_conversation_history_is_ordered() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let first = store.save_message(user_message("c1", "What is CRISPR?")).unwrap();
    let second = store
        .save_message(assistant_message("c1", "A gene editing tool (Doudna 2012)."))
        .unwrap();
    store.save_message(user_message("c2", "unrelated")).unwrap();

    let history = store.list_messages("c1").unwrap();
    let ids: Vec<_> = history.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(history[0].role, Role::User);
    assert!(history[0].metadata.token_metrics.is_some());
}

#[test]
fn test_citations_are_scoped_and_newest_first() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let m1 = store.save_message(assistant_message("c1", "a")).unwrap();
    let m2 = store.save_message(assistant_message("c2", "b")).unwrap();

    let older = store
        .save_citation(m1, &Citation::new("Paper A", "http://a", "quote a"))
        .unwrap();
    let newer = store
        .save_citation(m1, &Citation::new("", "", "quote b"))
        .unwrap();
    store
        .save_citation(m2, &Citation::new("Other", "", "elsewhere"))
        .unwrap();

    let citations = store.list_citations("c1").unwrap();
    let ids: Vec<CitationId> = citations.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![newer, older]);
    assert_eq!(citations[0].title, None);
    assert_eq!(citations[0].url, None);
    assert_eq!(citations[1].title.as_deref(), Some("Paper A"));
    assert!(citations.iter().all(|c| c.message_id == m1));
}

#[test]
fn test_update_and_delete_citation() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let message_id = store.save_message(assistant_message("c1", "a")).unwrap();
    let id = store
        .save_citation(message_id, &Citation::new("Draft", "", "old text"))
        .unwrap();

    store
        .update_citation(id, &Citation::new("Final", "http://final", "new text"))
        .unwrap();
    let record = store.get_citation(id).unwrap().unwrap();
    assert_eq!(record.citation(), Citation::new("Final", "http://final", "new text"));
    assert_eq!(record.message_id, message_id);

    assert!(matches!(
        store.update_citation(id, &Citation::new("Final", "", " ")),
        Err(StoreError::Validation(_))
    ));

    store.delete_citation(id).unwrap();
    assert!(store.get_citation(id).unwrap().is_none());
    assert!(matches!(
        store.delete_citation(id),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_update_unknown_citation_is_not_found() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let result = store.update_citation(CitationId::new(), &Citation::new("T", "", "text"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scholar.db");

    let (message_id, citation_id) = {
        let mut store = SqliteStore::new(&path).unwrap();
        let message_id = store.save_message(assistant_message("c1", "kept")).unwrap();
        let citation_id = store
            .save_citation(message_id, &Citation::new("Paper", "http://p", "quote"))
            .unwrap();
        (message_id, citation_id)
    };

    let store = SqliteStore::new(&path).unwrap();
    let message = store.get_message(message_id).unwrap().unwrap();
    assert_eq!(message.content, "kept");
    assert!(matches!(
        message.metadata.details,
        MessageDetails::Research { citation_count: 2, .. }
    ));
    assert_eq!(store.get_citation(citation_id).unwrap().unwrap().text, "quote");
}
