use crate::render::renderable_fields;
use crate::values::{FieldValue, ValueSet};
use shared_types::{Field, FieldId, FieldType};
use std::collections::BTreeMap;

/// Field id to message, one entry per failing field
pub type FieldErrors = BTreeMap<FieldId, String>;

/// Check every renderable field against its required flag and type.
///
/// All problems are collected; nothing short-circuits. Pure, so it is safe to
/// call on every keystroke.
pub fn validate(fields: &[Field], values: &ValueSet) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in renderable_fields(fields) {
        if let Some(message) = validate_field(&field, values.get(field.id)) {
            errors.insert(field.id, message);
        }
    }

    errors
}

/// Message for one field, `None` when the value is acceptable
pub fn validate_field(field: &Field, value: Option<&FieldValue>) -> Option<String> {
    let present = value.filter(|v| !v.is_empty());

    let Some(value) = present else {
        return field
            .required
            .then(|| format!("{} is required", field.label));
    };

    if field.field_type == FieldType::Number && !is_number(value) {
        return Some(format!("{} must be a number", field.label));
    }

    None
}

/// Finite decimals only. Signs and exponents are fine, `inf` and `NaN` are not.
fn is_number(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .map(f64::is_finite)
            .unwrap_or(false),
        _ => false,
    }
}
