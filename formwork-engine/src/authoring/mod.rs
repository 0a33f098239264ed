//! Admin-side editing of forms and their fields.
//!
//! Every write is checked against the schema invariants before it reaches the
//! storage. Storage errors are passed through unchanged and nothing is retried.

#[cfg(test)]
mod tests;

use crate::error::FormError;
use crate::schema::{
    validate_activation, validate_field_draft, validate_field_update, validate_form_draft,
};
use crate::storage::FormStorage;
use shared_types::{
    Field, FieldDraft, FieldId, FieldUpdate, Form, FormDraft, FormFilter, FormId, FormWithFields,
    MoveDirection,
};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_DUPLICATE_SUFFIX: &str = " (Copy)";

pub struct AuthoringService<S: FormStorage> {
    storage: Arc<S>,
    duplicate_suffix: String,
}

impl<S: FormStorage> Clone for AuthoringService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            duplicate_suffix: self.duplicate_suffix.clone(),
        }
    }
}

impl<S: FormStorage> AuthoringService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            duplicate_suffix: DEFAULT_DUPLICATE_SUFFIX.to_string(),
        }
    }

    /// Text appended to the title of duplicated forms
    pub fn with_duplicate_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.duplicate_suffix = suffix.into();
        self
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// New forms start inactive and without fields
    pub async fn create_form(&self, draft: &FormDraft) -> Result<Form, FormError> {
        let (draft, carrier) = validate_form_draft(draft)?;
        let form = self.storage.create_form(&draft, carrier).await?;
        info!(form_id = form.id, carrier = %carrier, "Created form");
        Ok(form)
    }

    pub async fn update_form(&self, form_id: FormId, draft: &FormDraft) -> Result<Form, FormError> {
        let existing = self.require_form(form_id).await?;
        let (draft, carrier) = validate_form_draft(draft)?;
        let form = self
            .storage
            .update_form(form_id, &draft, carrier, existing.active)
            .await?;
        info!(form_id, "Updated form");
        Ok(form)
    }

    pub async fn set_active(&self, form_id: FormId, active: bool) -> Result<Form, FormError> {
        let form = self.require_form(form_id).await?;
        if active {
            validate_activation(&form)?;
        }

        let form = self
            .storage
            .update_form(form_id, &draft_of(&form), form.carrier, active)
            .await?;
        info!(form_id, active, "Changed form activation");
        Ok(form)
    }

    pub async fn delete_form(&self, form_id: FormId) -> Result<(), FormError> {
        self.require_form(form_id).await?;
        self.storage.delete_form(form_id).await?;
        info!(form_id, "Deleted form");
        Ok(())
    }

    /// Append a field at the end of the form
    pub async fn add_field(&self, form_id: FormId, draft: &FieldDraft) -> Result<Field, FormError> {
        self.require_form(form_id).await?;
        let draft = validate_field_draft(draft)?;

        let order_index = self.storage.list_fields(form_id).await?.len() as i64;
        let field = self
            .storage
            .create_field(form_id, &draft, order_index)
            .await?;
        info!(
            form_id,
            field_id = field.id,
            field_type = field.field_type.as_str(),
            "Added field"
        );
        Ok(field)
    }

    /// Edit a field. Its type is fixed; changing it means delete and recreate.
    pub async fn update_field(
        &self,
        form_id: FormId,
        field_id: FieldId,
        update: &FieldUpdate,
    ) -> Result<Field, FormError> {
        let field = self.require_field(form_id, field_id).await?;
        let update = validate_field_update(field.field_type, update)?;
        Ok(self.storage.update_field(field_id, &update).await?)
    }

    /// Remove a field and close the gap in the order indices
    pub async fn delete_field(&self, form_id: FormId, field_id: FieldId) -> Result<(), FormError> {
        self.require_field(form_id, field_id).await?;
        self.storage.delete_field(field_id).await?;

        let remaining: Vec<FieldId> = self
            .storage
            .list_fields(form_id)
            .await?
            .iter()
            .map(|f| f.id)
            .collect();
        self.storage.set_field_order(form_id, &remaining).await?;

        info!(form_id, field_id, "Deleted field");
        Ok(())
    }

    /// Swap a field with its neighbour. Moving past either end does nothing.
    /// Returns the fields in their new order.
    pub async fn reorder_field(
        &self,
        form_id: FormId,
        field_id: FieldId,
        direction: MoveDirection,
    ) -> Result<Vec<Field>, FormError> {
        self.require_form(form_id).await?;
        let fields = self.storage.list_fields(form_id).await?;

        let position = fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| {
                FormError::NotFound(format!("Field {} in form {}", field_id, form_id))
            })?;

        let target = match direction {
            MoveDirection::Up if position > 0 => position - 1,
            MoveDirection::Down if position + 1 < fields.len() => position + 1,
            _ => return Ok(fields),
        };

        let mut ordered: Vec<FieldId> = fields.iter().map(|f| f.id).collect();
        ordered.swap(position, target);
        self.storage.set_field_order(form_id, &ordered).await?;

        Ok(self.storage.list_fields(form_id).await?)
    }

    /// Deep copy a form and its fields into a new inactive form.
    ///
    /// Stored fields are checked like fresh drafts before anything is written,
    /// so a form holding an invalid or unsupported field is not copied at all.
    /// When a later step fails, whatever was already copied is deleted again
    /// before the error is returned.
    pub async fn duplicate_form(&self, form_id: FormId) -> Result<FormWithFields, FormError> {
        let source = self.require_form(form_id).await?;
        let fields = self.storage.list_fields(form_id).await?;

        let mut drafts = Vec::with_capacity(fields.len());
        for field in &fields {
            let draft = validate_field_draft(&FieldDraft {
                label: field.label.clone(),
                field_type: field.field_type,
                required: field.required,
                placeholder: field.placeholder.clone(),
                help_text: field.help_text.clone(),
                options: field.options.clone(),
            })
            .map_err(|e| match e {
                FormError::Validation(message) => {
                    FormError::Validation(format!("Field {}: {}", field.id, message))
                }
                other => other,
            })?;
            drafts.push((draft, field.order_index));
        }

        let mut draft = draft_of(&source);
        draft.title = format!("{}{}", source.title, self.duplicate_suffix);
        let (draft, carrier) = validate_form_draft(&draft)?;

        let copy = self.storage.create_form(&draft, carrier).await?;

        let mut copied = Vec::with_capacity(drafts.len());
        for (field_draft, order_index) in &drafts {
            match self
                .storage
                .create_field(copy.id, field_draft, *order_index)
                .await
            {
                Ok(new_field) => copied.push(new_field),
                Err(e) => {
                    warn!(
                        form_id,
                        copy_id = copy.id,
                        error = %e,
                        "Duplicating form failed, removing partial copy"
                    );
                    self.discard_copy(copy.id, &copied).await;
                    return Err(e.into());
                }
            }
        }

        let form = match self.storage.get_form(copy.id).await {
            Ok(Some(form)) => form,
            Ok(None) => {
                self.discard_copy(copy.id, &copied).await;
                return Err(FormError::NotFound(format!("Form {}", copy.id)));
            }
            Err(e) => {
                self.discard_copy(copy.id, &copied).await;
                return Err(e.into());
            }
        };

        info!(form_id, copy_id = form.id, fields = copied.len(), "Duplicated form");
        Ok(FormWithFields {
            form,
            fields: copied,
        })
    }

    /// All forms matching the filter. Filtering happens after the fetch.
    pub async fn list_forms(&self, filter: &FormFilter) -> Result<Vec<Form>, FormError> {
        let forms = self.storage.list_forms().await?;
        Ok(filter_forms(&forms, filter))
    }

    pub async fn form_with_fields(&self, form_id: FormId) -> Result<FormWithFields, FormError> {
        let form = self.require_form(form_id).await?;
        let fields = self.storage.list_fields(form_id).await?;
        Ok(FormWithFields { form, fields })
    }

    async fn discard_copy(&self, copy_id: FormId, copied: &[Field]) {
        for field in copied {
            if let Err(e) = self.storage.delete_field(field.id).await {
                warn!(field_id = field.id, error = %e, "Failed to remove copied field");
            }
        }
        if let Err(e) = self.storage.delete_form(copy_id).await {
            warn!(form_id = copy_id, error = %e, "Failed to remove copied form");
        }
    }

    async fn require_form(&self, form_id: FormId) -> Result<Form, FormError> {
        self.storage
            .get_form(form_id)
            .await?
            .ok_or_else(|| FormError::NotFound(format!("Form {}", form_id)))
    }

    async fn require_field(&self, form_id: FormId, field_id: FieldId) -> Result<Field, FormError> {
        match self.storage.get_field(field_id).await? {
            Some(field) if field.form_id == form_id => Ok(field),
            _ => Err(FormError::NotFound(format!(
                "Field {} in form {}",
                field_id, form_id
            ))),
        }
    }
}

/// Case-insensitive text match over title and description, plus active state
pub fn filter_forms(forms: &[Form], filter: &FormFilter) -> Vec<Form> {
    let needle = filter
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    forms
        .iter()
        .filter(|form| filter.active.map_or(true, |active| form.active == active))
        .filter(|form| match &needle {
            Some(needle) => {
                form.title.to_lowercase().contains(needle)
                    || form
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(needle))
            }
            None => true,
        })
        .cloned()
        .collect()
}

fn draft_of(form: &Form) -> FormDraft {
    FormDraft {
        title: form.title.clone(),
        description: form.description.clone(),
        service_id: form.carrier.service_id(),
        offer_id: form.carrier.offer_id(),
    }
}
