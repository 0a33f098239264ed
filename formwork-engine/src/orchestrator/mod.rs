//! Submission state machine.
//!
//! One orchestrator serves one form fill. It validates, holds answers across a
//! login interruption, uploads attached files one after another, and hands the
//! assembled submission to the sink. Failures end as a state plus a
//! [`SubmitOutcome`]; nothing is returned as `Err`.

mod assemble;
mod state;


pub use assemble::{extract_contact_email, SubmissionContext};
pub use state::{SubmissionObserver, SubmissionState, SubmitOutcome};

use crate::collaborators::{AuthProvider, SubmissionSink, Uploader};
use crate::error::AttemptError;
use crate::render::ordered_fields;
use crate::validation::validate;
use crate::values::{FieldValue, ValueSet};
use assemble::assemble_submission;
use shared_types::{Field, FieldId, FieldType, FormId, FormWithFields};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause after a successful login so the new session is visible to the sink
    pub settle_delay: Duration,
    /// How many times a 401/403 from the sink may send the user back to login
    pub max_reauth_attempts: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            max_reauth_attempts: 1,
        }
    }
}

/// The services an orchestrator needs
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthProvider>,
    pub uploader: Arc<dyn Uploader>,
    pub sink: Arc<dyn SubmissionSink>,
}

/// Answers held across the login interruption
#[derive(Debug, Clone)]
struct PendingSubmission {
    values: ValueSet,
    /// URLs of files already uploaded in this attempt, per field
    uploaded: BTreeMap<FieldId, Vec<String>>,
}

impl PendingSubmission {
    fn new(values: ValueSet) -> Self {
        Self {
            values,
            uploaded: BTreeMap::new(),
        }
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SubmissionOrchestrator {
    form_id: FormId,
    fields: Vec<Field>,
    context: SubmissionContext,
    collaborators: Collaborators,
    observer: Option<Arc<dyn SubmissionObserver>>,
    config: OrchestratorConfig,
    busy: AtomicBool,
    state: Mutex<SubmissionState>,
    pending: Mutex<Option<PendingSubmission>>,
}

impl std::fmt::Debug for SubmissionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionOrchestrator")
            .field("form_id", &self.form_id)
            .field("state", &self.state())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl SubmissionOrchestrator {
    pub fn new(form: &FormWithFields, collaborators: Collaborators) -> Self {
        Self {
            form_id: form.form.id,
            fields: ordered_fields(&form.fields),
            context: SubmissionContext::default(),
            collaborators,
            observer: None,
            config: OrchestratorConfig::default(),
            busy: AtomicBool::new(false),
            state: Mutex::new(SubmissionState::Idle),
            pending: Mutex::new(None),
        }
    }

    pub fn with_context(mut self, context: SubmissionContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn state(&self) -> SubmissionState {
        lock(&self.state).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Answers waiting for a login or a manual retry
    pub fn pending_values(&self) -> Option<ValueSet> {
        lock(&self.pending).as_ref().map(|p| p.values.clone())
    }

    /// Drop held answers, e.g. when the user cancels the form
    pub fn discard_pending(&self) {
        if self.is_busy() {
            return;
        }
        *lock(&self.pending) = None;
        self.transition(SubmissionState::Idle);
    }

    /// The user edited the form after a failed validation
    pub fn note_edit(&self) {
        if self.is_busy() {
            return;
        }
        let cleared = {
            let mut state = lock(&self.state);
            if matches!(*state, SubmissionState::ValidationFailed { .. }) {
                *state = SubmissionState::Idle;
                true
            } else {
                false
            }
        };
        if cleared {
            self.notify(&SubmissionState::Idle);
        }
    }

    /// Start an attempt with the current answers
    pub async fn submit(&self, values: ValueSet) -> SubmitOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!(form_id = self.form_id, "Submission in progress, ignoring submit");
            return SubmitOutcome::Ignored;
        };

        self.transition(SubmissionState::Validating);

        let errors = validate(&self.fields, &values);
        if !errors.is_empty() {
            info!(
                form_id = self.form_id,
                error_count = errors.len(),
                "Submission blocked by validation"
            );
            self.transition(SubmissionState::ValidationFailed {
                errors: errors.clone(),
            });
            return SubmitOutcome::ValidationFailed(errors);
        }

        self.run(PendingSubmission::new(values)).await
    }

    /// Continue from the pending answers, e.g. after the user signed in
    /// through some other screen or wants to retry a failed attempt
    pub async fn resume(&self) -> SubmitOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!(form_id = self.form_id, "Submission in progress, ignoring resume");
            return SubmitOutcome::Ignored;
        };

        let Some(pending) = lock(&self.pending).clone() else {
            debug!(form_id = self.form_id, "Nothing pending to resume");
            return SubmitOutcome::Ignored;
        };

        self.run(pending).await
    }

    async fn run(&self, mut pending: PendingSubmission) -> SubmitOutcome {
        let mut force_login = false;
        let mut reauth_rounds = 0;

        loop {
            if force_login || !self.collaborators.auth.is_authenticated().await {
                self.store_pending(&pending);
                self.transition(SubmissionState::AuthGate);

                if !self.collaborators.auth.prompt_login().await {
                    info!(
                        form_id = self.form_id,
                        "Login not completed, answers kept pending"
                    );
                    return SubmitOutcome::AwaitingLogin;
                }

                if !self.config.settle_delay.is_zero() {
                    tokio::time::sleep(self.config.settle_delay).await;
                }

                // Resume from the snapshot, not from whatever the caller holds by now
                if let Some(snapshot) = lock(&self.pending).clone() {
                    pending = snapshot;
                }
            }

            if let Err(error) = self.upload_files(&mut pending).await {
                pending.uploaded.clear();
                self.store_pending(&pending);
                return self.fail(error);
            }

            self.transition(SubmissionState::Submitting);

            let session_email = self.collaborators.auth.current_email().await;
            let submission = assemble_submission(
                self.form_id,
                &self.fields,
                &pending.values,
                &pending.uploaded,
                self.context,
                session_email,
            );

            match self.collaborators.sink.submit(&submission).await {
                Ok(receipt) => {
                    *lock(&self.pending) = None;
                    info!(
                        form_id = self.form_id,
                        submission_id = receipt.submission_id,
                        order_id = ?receipt.order_id,
                        "Submission accepted"
                    );
                    self.transition(SubmissionState::Succeeded {
                        receipt: receipt.clone(),
                    });
                    self.transition(SubmissionState::Idle);
                    return SubmitOutcome::Succeeded(receipt);
                }
                Err(e) if e.is_auth_failure() => {
                    reauth_rounds += 1;
                    if reauth_rounds > self.config.max_reauth_attempts {
                        pending.uploaded.clear();
                        self.store_pending(&pending);
                        return self.fail(AttemptError::Auth(e.to_string()));
                    }
                    warn!(
                        form_id = self.form_id,
                        error = %e,
                        "Session rejected at submit, asking for login again"
                    );
                    // uploaded URLs are durable and stay in the snapshot
                    force_login = true;
                }
                Err(e) => {
                    pending.uploaded.clear();
                    self.store_pending(&pending);
                    return self.fail(AttemptError::Submission(e.user_message()));
                }
            }
        }
    }

    /// Upload every attached file, field by field, one file at a time.
    /// Fields that already have URLs in the snapshot are not uploaded again.
    async fn upload_files(&self, pending: &mut PendingSubmission) -> Result<(), AttemptError> {
        for field in self
            .fields
            .iter()
            .filter(|f| f.field_type == FieldType::File)
        {
            if pending.uploaded.contains_key(&field.id) {
                debug!(field_id = field.id, "Reusing uploaded files");
                continue;
            }

            let files = match pending.values.get(field.id) {
                Some(FieldValue::Files(files)) if !files.is_empty() => files,
                _ => continue,
            };

            let mut urls = Vec::with_capacity(files.len());
            for (file_index, file) in files.iter().enumerate() {
                self.transition(SubmissionState::Uploading {
                    field_id: field.id,
                    file_index,
                    file_count: files.len(),
                });

                match self.collaborators.uploader.upload(file).await {
                    Ok(url) => {
                        debug!(field_id = field.id, file = %file.file_name, "File uploaded");
                        urls.push(url);
                    }
                    Err(e) => {
                        warn!(
                            field_id = field.id,
                            file = %file.file_name,
                            error = %e,
                            "File upload failed"
                        );
                        return Err(AttemptError::Upload {
                            field_id: field.id,
                            file_name: file.file_name.clone(),
                            message: e.user_message(),
                        });
                    }
                }
            }

            pending.uploaded.insert(field.id, urls);
        }

        Ok(())
    }

    fn store_pending(&self, pending: &PendingSubmission) {
        *lock(&self.pending) = Some(pending.clone());
    }

    fn fail(&self, error: AttemptError) -> SubmitOutcome {
        warn!(form_id = self.form_id, error = %error, "Submission attempt failed");
        self.transition(SubmissionState::Failed {
            error: error.clone(),
        });
        SubmitOutcome::Failed(error)
    }

    fn transition(&self, next: SubmissionState) {
        debug!(
            form_id = self.form_id,
            state = next.name(),
            "Submission state changed"
        );
        *lock(&self.state) = next.clone();
        self.notify(&next);
    }

    fn notify(&self, state: &SubmissionState) {
        if let Some(observer) = &self.observer {
            observer.on_transition(state);
        }
    }
}
