//! Invariant checks for forms and fields.
//!
//! Everything that writes a form or a field goes through these first. Drafts
//! come from hand-built authoring screens, so the backing store is never
//! trusted to enforce them.

use crate::error::FormError;
use shared_types::{Carrier, FieldDraft, FieldType, FieldUpdate, Form, FormDraft};

/// Trim and resolve a form draft. Returns the cleaned draft and its carrier.
pub fn validate_form_draft(draft: &FormDraft) -> Result<(FormDraft, Carrier), FormError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(FormError::validation("Form title cannot be empty"));
    }

    let carrier =
        Carrier::resolve(draft.service_id, draft.offer_id).map_err(FormError::Validation)?;

    let cleaned = FormDraft {
        title: title.to_string(),
        description: non_blank(draft.description.as_deref()),
        service_id: carrier.service_id(),
        offer_id: carrier.offer_id(),
    };

    Ok((cleaned, carrier))
}

/// A form can only be offered publicly with a title and a carrier
pub fn validate_activation(form: &Form) -> Result<(), FormError> {
    if form.title.trim().is_empty() {
        return Err(FormError::validation(format!(
            "Form {} needs a title before it can be activated",
            form.id
        )));
    }
    // Re-resolve from the stored shape so a corrupted row cannot slip through
    Carrier::resolve(form.carrier.service_id(), form.carrier.offer_id())
        .map_err(FormError::Validation)?;
    Ok(())
}

/// Trim entries and drop blank ones
pub fn normalize_options(options: &[String]) -> Vec<String> {
    options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Options must be present exactly for choice types
pub fn check_options(field_type: FieldType, options: &[String]) -> Result<(), FormError> {
    if field_type.has_options() {
        if options.is_empty() {
            return Err(FormError::validation(format!(
                "A {} field needs at least one non-blank option",
                field_type.as_str()
            )));
        }
    } else if !options.is_empty() {
        return Err(FormError::validation(format!(
            "A {} field cannot have options",
            field_type.as_str()
        )));
    }
    Ok(())
}

pub fn validate_field_draft(draft: &FieldDraft) -> Result<FieldDraft, FormError> {
    if draft.field_type == FieldType::Unknown {
        return Err(FormError::validation("Unsupported field type"));
    }

    let label = draft.label.trim();
    if label.is_empty() {
        return Err(FormError::validation("Field label cannot be empty"));
    }

    let options = normalize_options(&draft.options);
    check_options(draft.field_type, &options)?;

    Ok(FieldDraft {
        label: label.to_string(),
        field_type: draft.field_type,
        required: draft.required,
        placeholder: non_blank(draft.placeholder.as_deref()),
        help_text: non_blank(draft.help_text.as_deref()),
        options,
    })
}

/// Validate an edit against the (immutable) type of the existing field
pub fn validate_field_update(
    field_type: FieldType,
    update: &FieldUpdate,
) -> Result<FieldUpdate, FormError> {
    let label = update.label.trim();
    if label.is_empty() {
        return Err(FormError::validation("Field label cannot be empty"));
    }

    let options = normalize_options(&update.options);
    check_options(field_type, &options)?;

    Ok(FieldUpdate {
        label: label.to_string(),
        required: update.required,
        placeholder: non_blank(update.placeholder.as_deref()),
        help_text: non_blank(update.help_text.as_deref()),
        options,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
