//! Scholar Storage Layer
//!
//! Implements the `ResearchStore` trait on SQLite.
//!
//! # Architecture
//!
//! - `messages`: chat turns with their metadata as versioned JSON
//! - `citations`: one row per stored citation, keyed to its message
//! - `bookmarks`: user bookmarks with a note naming the cited source
//!
//! Every citation insert, update and delete is published on a broadcast
//! change feed (see [`SqliteStore::subscribe`] and [`CitationSubscription`]).
//!
//! # Examples
//!
//! ```
//! use scholar_domain::traits::ResearchStore;
//! use scholar_domain::{Citation, MessageDetails, MessageMetadata, NewMessage, Role};
//! use scholar_store::SqliteStore;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! let message_id = store
//!     .save_message(NewMessage {
//!         conversation_id: "conv-1".to_string(),
//!         role: Role::Assistant,
//!         content: "See (Nature).".to_string(),
//!         model_name: "gemini-pro".to_string(),
//!         metadata: MessageMetadata::new(MessageDetails::Chat { model: "gemini-pro".to_string() }),
//!     })
//!     .unwrap();
//!
//! store
//!     .save_citation(message_id, &Citation::new("Nature", "https://nature.com", "Cells divide"))
//!     .unwrap();
//! assert_eq!(store.list_citations("conv-1").unwrap().len(), 1);
//! ```

#![warn(missing_docs)]

mod subscription;

use rusqlite::{params, Connection, OptionalExtension, Row};
use scholar_domain::traits::ResearchStore;
use scholar_domain::{
    unix_now, Citation, CitationError, CitationId, CitationRecord, Message, MessageId,
    MessageMetadata, NewMessage, Role,
};
use std::path::Path;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

pub use subscription::CitationSubscription;

/// Capacity of the citation change feed
pub const CHANGE_FEED_CAPACITY: usize = 64;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Input rejected before writing
    #[error("Validation failed: {0}")]
    Validation(#[from] CitationError),

    /// Store mutex was poisoned
    #[error("Store lock error: {0}")]
    Lock(String),
}

/// What happened to a citation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Inserted
    Created,
    /// Title, url or text replaced
    Updated,
    /// Removed
    Deleted,
}

/// One entry on the citation change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationChange {
    /// Kind of change
    pub kind: ChangeKind,
    /// Affected citation
    pub citation_id: CitationId,
}

/// A stored bookmark
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    /// Row identifier
    pub id: i64,
    /// Bookmarked message, if it still exists
    pub message_id: Option<MessageId>,
    /// Free-form note
    pub note: Option<String>,
    /// Creation time (seconds since the Unix epoch)
    pub created_at: u64,
}

/// SQLite-based implementation of ResearchStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store behind a
/// `Mutex`, or give each thread its own instance.
pub struct SqliteStore {
    conn: Connection,
    changes: broadcast::Sender<CitationChange>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let mut store = Self { conn, changes };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Receive every subsequent citation change
    pub fn subscribe(&self) -> broadcast::Receiver<CitationChange> {
        self.changes.subscribe()
    }

    /// All bookmarks, oldest first
    pub fn list_bookmarks(&self) -> Result<Vec<Bookmark>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, message_id, note, created_at FROM bookmarks ORDER BY id")?;

        let bookmarks = stmt
            .query_map([], |row| {
                let message_id: Option<Vec<u8>> = row.get(1)?;
                let message_id = message_id
                    .map(|bytes| id_from_column::<MessageId>(&bytes, 1, MessageId::from_value))
                    .transpose()?;

                Ok(Bookmark {
                    id: row.get(0)?,
                    message_id,
                    note: row.get(2)?,
                    created_at: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(bookmarks)
    }

    fn publish(&self, kind: ChangeKind, citation_id: CitationId) {
        // No receivers is not an error
        let _ = self.changes.send(CitationChange { kind, citation_id });
    }

    fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
        let id: Vec<u8> = row.get(0)?;
        let role: String = row.get(2)?;
        let metadata: String = row.get(5)?;

        let role = Role::parse(&role).ok_or_else(|| {
            conversion_error(2, rusqlite::types::Type::Text, format!("Unknown role: {}", role))
        })?;
        let metadata: MessageMetadata = serde_json::from_str(&metadata).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Message {
            id: id_from_column(&id, 0, MessageId::from_value)?,
            conversation_id: row.get(1)?,
            role,
            content: row.get(3)?,
            model_name: row.get(4)?,
            metadata,
            created_at: row.get::<_, i64>(6)? as u64,
        })
    }

    fn row_to_citation(row: &Row<'_>) -> rusqlite::Result<CitationRecord> {
        let id: Vec<u8> = row.get(0)?;
        let message_id: Vec<u8> = row.get(1)?;

        Ok(CitationRecord {
            id: id_from_column(&id, 0, CitationId::from_value)?,
            message_id: id_from_column(&message_id, 1, MessageId::from_value)?,
            title: row.get(2)?,
            url: row.get(3)?,
            text: row.get(4)?,
            created_at: row.get::<_, i64>(5)? as u64,
        })
    }
}

fn id_to_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn id_from_column<T>(
    bytes: &[u8],
    column: usize,
    from_value: impl Fn(u128) -> T,
) -> rusqlite::Result<T> {
    let arr: [u8; 16] = bytes.try_into().map_err(|_| {
        conversion_error(
            column,
            rusqlite::types::Type::Blob,
            format!("Expected 16 bytes for id, got {}", bytes.len()),
        )
    })?;
    Ok(from_value(u128::from_be_bytes(arr)))
}

fn conversion_error(
    column: usize,
    sql_type: rusqlite::types::Type,
    message: String,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        sql_type,
        Box::new(StoreError::InvalidData(message)),
    )
}

fn metadata_to_json(metadata: &MessageMetadata) -> Result<String, StoreError> {
    serde_json::to_string(metadata)
        .map_err(|e| StoreError::InvalidData(format!("Failed to encode metadata: {}", e)))
}

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, role, content, model_name, metadata, created_at";

impl ResearchStore for SqliteStore {
    type Error = StoreError;

    fn save_message(&mut self, message: NewMessage) -> Result<MessageId, Self::Error> {
        let id = MessageId::new();
        let metadata = metadata_to_json(&message.metadata)?;

        self.conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, model_name, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id_to_bytes(id.value()),
                &message.conversation_id,
                message.role.as_str(),
                &message.content,
                &message.model_name,
                metadata,
                unix_now() as i64,
            ],
        )?;

        debug!(message = %id, conversation = %message.conversation_id, "Stored message");
        Ok(id)
    }

    fn get_message(&self, id: MessageId) -> Result<Option<Message>, Self::Error> {
        let message = self
            .conn
            .query_row(
                &format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS),
                params![id_to_bytes(id.value())],
                Self::row_to_message,
            )
            .optional()?;

        Ok(message)
    }

    fn update_message(
        &mut self,
        id: MessageId,
        content: &str,
        metadata: &MessageMetadata,
    ) -> Result<(), Self::Error> {
        let mut metadata = metadata.clone();
        metadata.edited_at = Some(unix_now());

        let updated = self.conn.execute(
            "UPDATE messages SET content = ?1, metadata = ?2 WHERE id = ?3",
            params![content, metadata_to_json(&metadata)?, id_to_bytes(id.value())],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("message {}", id)));
        }
        Ok(())
    }

    fn update_message_metadata(
        &mut self,
        id: MessageId,
        metadata: &MessageMetadata,
    ) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE messages SET metadata = ?1 WHERE id = ?2",
            params![metadata_to_json(metadata)?, id_to_bytes(id.value())],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("message {}", id)));
        }
        Ok(())
    }

    fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM messages WHERE conversation_id = ?1 ORDER BY created_at, id",
            MESSAGE_COLUMNS
        ))?;

        let messages = stmt
            .query_map(params![conversation_id], Self::row_to_message)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    fn save_citation(
        &mut self,
        message_id: MessageId,
        citation: &Citation,
    ) -> Result<CitationId, Self::Error> {
        citation.validate()?;

        let id = CitationId::new();
        self.conn.execute(
            "INSERT INTO citations (id, message_id, source_title, source_url, citation_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id_to_bytes(id.value()),
                id_to_bytes(message_id.value()),
                &citation.title,
                &citation.url,
                &citation.text,
                unix_now() as i64,
            ],
        )?;

        self.publish(ChangeKind::Created, id);
        Ok(id)
    }

    fn get_citation(&self, id: CitationId) -> Result<Option<CitationRecord>, Self::Error> {
        let citation = self
            .conn
            .query_row(
                "SELECT id, message_id, source_title, source_url, citation_text, created_at
                 FROM citations WHERE id = ?1",
                params![id_to_bytes(id.value())],
                Self::row_to_citation,
            )
            .optional()?;

        Ok(citation)
    }

    fn list_citations(&self, conversation_id: &str) -> Result<Vec<CitationRecord>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.message_id, c.source_title, c.source_url, c.citation_text, c.created_at
             FROM citations c JOIN messages m ON c.message_id = m.id
             WHERE m.conversation_id = ?1
             ORDER BY c.created_at DESC, c.id DESC",
        )?;

        let citations = stmt
            .query_map(params![conversation_id], Self::row_to_citation)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(citations)
    }

    fn update_citation(&mut self, id: CitationId, citation: &Citation) -> Result<(), Self::Error> {
        citation.validate()?;

        let updated = self.conn.execute(
            "UPDATE citations SET source_title = ?1, source_url = ?2, citation_text = ?3
             WHERE id = ?4",
            params![
                &citation.title,
                &citation.url,
                &citation.text,
                id_to_bytes(id.value())
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("citation {}", id)));
        }

        self.publish(ChangeKind::Updated, id);
        Ok(())
    }

    fn delete_citation(&mut self, id: CitationId) -> Result<(), Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM citations WHERE id = ?1",
            params![id_to_bytes(id.value())],
        )?;

        if deleted == 0 {
            return Err(StoreError::NotFound(format!("citation {}", id)));
        }

        self.publish(ChangeKind::Deleted, id);
        Ok(())
    }

    fn bookmark_citation(
        &mut self,
        message_id: Option<MessageId>,
        source_title: Option<&str>,
    ) -> Result<(), Self::Error> {
        let note = format!(
            "Citation from: {}",
            source_title.filter(|t| !t.is_empty()).unwrap_or("Unknown source")
        );

        self.conn.execute(
            "INSERT INTO bookmarks (message_id, note, created_at) VALUES (?1, ?2, ?3)",
            params![
                message_id.map(|id| id_to_bytes(id.value())),
                note,
                unix_now() as i64,
            ],
        )?;

        Ok(())
    }
}
