use crate::render::renderable_fields;
use crate::values::{FieldValue, ValueSet};
use shared_types::{AnswerValue, Field, FieldId, FieldType, FormId, Submission};
use std::collections::BTreeMap;

/// Carrier-derived context picked on the catalog screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    pub price_tier_id: Option<i64>,
    pub portfolio_project_id: Option<i64>,
}

/// Build the final submission from answers and resolved upload URLs.
///
/// Non-file answers are copied verbatim. File fields take their URL list from
/// `uploaded` and are left out when nothing was attached.
pub(crate) fn assemble_submission(
    form_id: FormId,
    fields: &[Field],
    values: &ValueSet,
    uploaded: &BTreeMap<FieldId, Vec<String>>,
    context: SubmissionContext,
    session_email: Option<String>,
) -> Submission {
    let mut submission = Submission::new(form_id);
    submission.price_tier_id = context.price_tier_id;
    submission.portfolio_project_id = context.portfolio_project_id;

    for field in renderable_fields(fields) {
        if field.field_type == FieldType::File {
            if let Some(urls) = uploaded.get(&field.id) {
                submission
                    .answers
                    .insert(field.id, AnswerValue::List(urls.clone()));
            }
            continue;
        }

        let answer = match values.get(field.id) {
            Some(FieldValue::Text(text)) => AnswerValue::Text(text.clone()),
            Some(FieldValue::Flag(checked)) => AnswerValue::Flag(*checked),
            Some(FieldValue::Choices(choices)) => {
                AnswerValue::List(choices.iter().cloned().collect())
            }
            // file handles on a non-file field have nowhere to go
            Some(FieldValue::Files(_)) | None => continue,
        };
        submission.answers.insert(field.id, answer);
    }

    submission.contact_email = extract_contact_email(fields, values).or(session_email);
    submission
}

/// First email-looking answer to a text field labelled as an email
pub fn extract_contact_email(fields: &[Field], values: &ValueSet) -> Option<String> {
    renderable_fields(fields)
        .iter()
        .filter(|f| matches!(f.field_type, FieldType::Text | FieldType::ShortText))
        .filter(|f| {
            let label = f.label.to_lowercase();
            label.contains("email") || label.contains("e-mail")
        })
        .find_map(|f| match values.get(f.id) {
            Some(FieldValue::Text(text)) if text.contains('@') => Some(text.trim().to_string()),
            _ => None,
        })
}
