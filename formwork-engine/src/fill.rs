//! Client-side fill session for one form.

use crate::collaborators::CatalogLookup;
use crate::error::RemoteError;
use crate::orchestrator::{SubmissionOrchestrator, SubmitOutcome};
use crate::render::{ordered_fields, render_fields, RenderedField};
use crate::validation::{validate, validate_field, FieldErrors};
use crate::values::{FieldValue, FileHandle, ValueSet};
use shared_types::{Carrier, Field, FieldId, Form, FormWithFields};
use std::sync::Arc;
use tracing::{debug, warn};

/// A form being answered: schema, current answers and the errors on screen.
/// Submitting goes through the attached orchestrator.
#[derive(Debug, Clone)]
pub struct FormFill {
    form: Form,
    fields: Vec<Field>,
    values: ValueSet,
    errors: FieldErrors,
    orchestrator: Option<Arc<SubmissionOrchestrator>>,
}

impl FormFill {
    pub fn new(form: FormWithFields) -> Self {
        Self {
            fields: ordered_fields(&form.fields),
            form: form.form,
            values: ValueSet::new(),
            errors: FieldErrors::new(),
            orchestrator: None,
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: Arc<SubmissionOrchestrator>) -> Self {
        self.attach(orchestrator);
        self
    }

    pub fn attach(&mut self, orchestrator: Arc<SubmissionOrchestrator>) {
        if orchestrator.form_id() != self.form.id {
            warn!(
                form_id = self.form.id,
                orchestrator_form_id = orchestrator.form_id(),
                "Attaching an orchestrator built for another form"
            );
        }
        self.orchestrator = Some(orchestrator);
    }

    pub fn orchestrator(&self) -> Option<&Arc<SubmissionOrchestrator>> {
        self.orchestrator.as_ref()
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Controls in render order with the current error of each field
    pub fn controls(&self) -> Vec<RenderedField> {
        render_fields(&self.fields, &self.errors)
    }

    /// Editing a field clears its stale error
    pub fn set_value(&mut self, field_id: FieldId, value: FieldValue) {
        self.values.set(field_id, value);
        self.edited(field_id);
    }

    pub fn toggle_choice(&mut self, field_id: FieldId, option: &str) {
        self.values.toggle_choice(field_id, option);
        self.edited(field_id);
    }

    pub fn attach_file(&mut self, field_id: FieldId, file: FileHandle) {
        self.values.attach_file(field_id, file);
        self.edited(field_id);
    }

    pub fn clear_value(&mut self, field_id: FieldId) {
        self.values.remove(field_id);
        self.edited(field_id);
    }

    fn edited(&mut self, field_id: FieldId) {
        self.errors.remove(&field_id);
        if let Some(orchestrator) = &self.orchestrator {
            orchestrator.note_edit();
        }
    }

    /// Re-check a single field, e.g. on blur
    pub fn check_field(&mut self, field_id: FieldId) -> Option<&String> {
        let field = self.fields.iter().find(|f| f.id == field_id)?;
        match validate_field(field, self.values.get(field_id)) {
            Some(message) => {
                self.errors.insert(field_id, message);
            }
            None => {
                self.errors.remove(&field_id);
            }
        }
        self.errors.get(&field_id)
    }

    /// Validate everything and replace the error map
    pub fn validate(&mut self) -> bool {
        self.errors = validate(&self.fields, &self.values);
        self.errors.is_empty()
    }

    /// Hand the current answers to the orchestrator and reflect the outcome
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(orchestrator) = self.orchestrator.clone() else {
            warn!(form_id = self.form.id, "No orchestrator attached, ignoring submit");
            return SubmitOutcome::Ignored;
        };
        let outcome = orchestrator.submit(self.values.clone()).await;
        self.apply(&outcome);

        debug!(form_id = self.form.id, outcome = ?outcome, "Form fill submitted");
        outcome
    }

    /// Continue the pending attempt, e.g. once the user has signed in
    pub async fn resume(&mut self) -> SubmitOutcome {
        let Some(orchestrator) = self.orchestrator.clone() else {
            warn!(form_id = self.form.id, "No orchestrator attached, ignoring resume");
            return SubmitOutcome::Ignored;
        };
        let outcome = orchestrator.resume().await;
        self.apply(&outcome);

        debug!(form_id = self.form.id, outcome = ?outcome, "Form fill resumed");
        outcome
    }

    fn apply(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Succeeded(_) => {
                self.values.clear();
                self.errors.clear();
            }
            SubmitOutcome::ValidationFailed(errors) => {
                self.errors = errors.clone();
            }
            SubmitOutcome::Failed(error) => {
                if let Some(field_id) = error.field_id() {
                    self.errors.insert(field_id, error.to_string());
                }
            }
            SubmitOutcome::AwaitingLogin | SubmitOutcome::Ignored => {}
        }
    }
}

/// Fill session for the active form of a carrier, if it has one
pub async fn load_form_for_carrier(
    catalog: &dyn CatalogLookup,
    carrier: Carrier,
) -> Result<Option<FormFill>, RemoteError> {
    let form = catalog.form_for_carrier(carrier).await?;
    if form.is_none() {
        debug!(carrier = %carrier, "No active form for carrier");
    }
    Ok(form.map(FormFill::new))
}
