use async_trait::async_trait;
use shared_types::{Carrier, Field, FieldDraft, FieldId, FieldUpdate, Form, FormDraft, FormId};

mod memory;

pub use memory::InMemoryStorage;

/// Persistence collaborator for forms and fields.
///
/// Implementations store what they are given. Schema invariants are checked by
/// the authoring layer before any of these calls.
#[async_trait]
pub trait FormStorage: Send + Sync {
    async fn list_forms(&self) -> Result<Vec<Form>, StorageError>;
    async fn get_form(&self, form_id: FormId) -> Result<Option<Form>, StorageError>;
    async fn create_form(&self, draft: &FormDraft, carrier: Carrier) -> Result<Form, StorageError>;
    async fn update_form(
        &self,
        form_id: FormId,
        draft: &FormDraft,
        carrier: Carrier,
        active: bool,
    ) -> Result<Form, StorageError>;
    async fn delete_form(&self, form_id: FormId) -> Result<(), StorageError>;

    /// Fields of a form sorted by order index, ties in insertion order
    async fn list_fields(&self, form_id: FormId) -> Result<Vec<Field>, StorageError>;
    async fn get_field(&self, field_id: FieldId) -> Result<Option<Field>, StorageError>;
    async fn create_field(
        &self,
        form_id: FormId,
        draft: &FieldDraft,
        order_index: i64,
    ) -> Result<Field, StorageError>;
    async fn update_field(
        &self,
        field_id: FieldId,
        update: &FieldUpdate,
    ) -> Result<Field, StorageError>;
    async fn delete_field(&self, field_id: FieldId) -> Result<(), StorageError>;

    /// Rewrite order indices so that `ordered[i]` gets index `i`
    async fn set_field_order(
        &self,
        form_id: FormId,
        ordered: &[FieldId],
    ) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for StorageError {
    fn from(err: anyhow::Error) -> Self {
        StorageError::Other(err.to_string())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound(err.to_string()),
            other => StorageError::OperationFailed(other.to_string()),
        }
    }
}
