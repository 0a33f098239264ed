use crate::storage::StorageError;
use shared_types::FieldId;

/// Errors from authoring operations
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FormError {
    pub fn validation(message: impl Into<String>) -> Self {
        FormError::Validation(message.into())
    }
}

/// Errors raised by network collaborators (upload endpoint, submission sink, catalog)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// 401/403 class response: the session is missing or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RemoteError::Unauthorized(_))
    }

    /// Message suitable for showing to the user as is
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Attempt-level failure of a submission run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptError {
    /// A file failed to upload. The whole attempt was aborted.
    #[error("Upload of '{file_name}' failed: {message}")]
    Upload {
        field_id: FieldId,
        file_name: String,
        message: String,
    },

    /// The session could not be (re)established
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The submission sink refused the submission
    #[error("{0}")]
    Submission(String),
}

impl AttemptError {
    /// Field the UI should annotate, when the error is field-attributable
    pub fn field_id(&self) -> Option<FieldId> {
        match self {
            AttemptError::Upload { field_id, .. } => Some(*field_id),
            AttemptError::Auth(_) | AttemptError::Submission(_) => None,
        }
    }
}
