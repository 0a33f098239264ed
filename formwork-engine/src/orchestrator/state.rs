use crate::error::AttemptError;
use crate::validation::FieldErrors;
use shared_types::{FieldId, SubmissionReceipt};

/// Where a submission attempt currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    /// Validation found problems. Returns to `Idle` on the next edit.
    ValidationFailed { errors: FieldErrors },
    /// Waiting for the user to sign in; answers are held in the pending slot
    AuthGate,
    Uploading {
        field_id: FieldId,
        file_index: usize,
        file_count: usize,
    },
    Submitting,
    Succeeded { receipt: SubmissionReceipt },
    Failed { error: AttemptError },
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::ValidationFailed { .. } => "validation_failed",
            SubmissionState::AuthGate => "auth_gate",
            SubmissionState::Uploading { .. } => "uploading",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded { .. } => "succeeded",
            SubmissionState::Failed { .. } => "failed",
        }
    }
}

/// Result of one `submit` or `resume` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Succeeded(SubmissionReceipt),
    ValidationFailed(FieldErrors),
    /// Login was declined or failed. Answers stay pending until `resume`.
    AwaitingLogin,
    Failed(AttemptError),
    /// Another attempt is in flight, or there was nothing to resume
    Ignored,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }
}

/// Presentation hook, told about every state change in order
pub trait SubmissionObserver: Send + Sync {
    fn on_transition(&self, state: &SubmissionState);
}
