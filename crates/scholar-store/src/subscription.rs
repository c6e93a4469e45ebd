//! Caller-owned live view of a conversation's citations

use crate::{SqliteStore, StoreError};
use scholar_domain::traits::ResearchStore;
use scholar_domain::CitationRecord;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Refetches a conversation's citations whenever any citation changes
///
/// The handle owns the background task. Call [`stop`](Self::stop) to end it
/// and wait for it; dropping the handle aborts it. Several handles may run
/// side by side, each with its own callback.
///
/// Must be started from within a Tokio runtime.
pub struct CitationSubscription {
    conversation_id: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CitationSubscription {
    /// Start watching `conversation_id`
    ///
    /// `on_update` receives the full, newest-first citation list after each
    /// change.
    pub fn start<F>(
        store: Arc<Mutex<SqliteStore>>,
        conversation_id: impl Into<String>,
        mut on_update: F,
    ) -> Result<Self, StoreError>
    where
        F: FnMut(Vec<CitationRecord>) + Send + 'static,
    {
        let conversation_id = conversation_id.into();
        let mut changes = store
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?
            .subscribe();
        let (shutdown, mut shutdown_rx) = oneshot::channel();

        let watched = conversation_id.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    change = changes.recv() => {
                        match change {
                            Ok(change) => {
                                tracing::debug!(
                                    conversation = %watched,
                                    citation = %change.citation_id,
                                    "Citation change: {:?}",
                                    change.kind
                                );
                            }
                            Err(RecvError::Lagged(missed)) => {
                                tracing::warn!(conversation = %watched, missed, "Citation feed lagged");
                            }
                            Err(RecvError::Closed) => break,
                        }

                        match fetch(&store, &watched) {
                            Ok(citations) => on_update(citations),
                            Err(e) => tracing::error!(conversation = %watched, "Citation refresh failed: {}", e),
                        }
                    }
                }
            }
        });

        tracing::info!(conversation = %conversation_id, "Citation subscription started");

        Ok(Self {
            conversation_id,
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// Conversation being watched
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Whether the background task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop watching and wait for the task to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::info!(conversation = %self.conversation_id, "Citation subscription stopped");
    }
}

impl Drop for CitationSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn fetch(
    store: &Mutex<SqliteStore>,
    conversation_id: &str,
) -> Result<Vec<CitationRecord>, StoreError> {
    let store = store.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
    store.list_citations(conversation_id)
}
