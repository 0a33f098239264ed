//! Contracts for the services the engine talks to but does not own.

use crate::error::RemoteError;
use crate::values::FileHandle;
use async_trait::async_trait;
use shared_types::{Carrier, FormWithFields, Submission, SubmissionReceipt};

/// Resolves the active form for a carrier
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// `Ok(None)` when the carrier has no active form, which is not an error
    async fn form_for_carrier(&self, carrier: Carrier)
        -> Result<Option<FormWithFields>, RemoteError>;
}

/// Object storage: one file in, one durable URL out
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &FileHandle) -> Result<String, RemoteError>;
}

/// Session owner. Login itself is a black box to the engine.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn is_authenticated(&self) -> bool;

    /// Ask the presentation layer to collect credentials. Resolves to whether
    /// a session was established.
    async fn prompt_login(&self) -> bool;

    /// Email of the signed-in user, if known
    async fn current_email(&self) -> Option<String> {
        None
    }
}

/// Receiver of finished submissions
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, RemoteError>;
}
