pub mod authoring;
pub mod collaborators;
pub mod config;
pub mod database;
pub mod error;
pub mod fill;
pub mod orchestrator;
pub mod remote;
pub mod render;
pub mod schema;
pub mod storage;
pub mod validation;
pub mod values;

#[cfg(test)]
mod test_support;

pub use authoring::{filter_forms, AuthoringService};
pub use collaborators::{AuthProvider, CatalogLookup, SubmissionSink, Uploader};
pub use config::EngineConfig;
pub use database::Database;
pub use error::{AttemptError, FormError, RemoteError};
pub use fill::{load_form_for_carrier, FormFill};
pub use orchestrator::{
    Collaborators, OrchestratorConfig, SubmissionContext, SubmissionObserver,
    SubmissionOrchestrator, SubmissionState, SubmitOutcome,
};
pub use remote::HttpCollaborators;
pub use render::{render_fields, Control, RenderedField};
pub use storage::{FormStorage, InMemoryStorage, StorageError};
pub use validation::{validate, FieldErrors};
pub use values::{FieldValue, FileHandle, ValueSet};
