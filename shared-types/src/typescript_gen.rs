/// Every type the browser client consumes, in dependency order
pub const API_TYPE_NAMES: &[&str] = &[
    "Carrier",
    "FieldType",
    "Form",
    "Field",
    "FormDraft",
    "FieldDraft",
    "FieldUpdate",
    "MoveDirection",
    "FormFilter",
    "FormWithFields",
    "FormListResponse",
    "FormResponse",
    "FieldResponse",
    "SetActiveRequest",
    "MoveFieldRequest",
    "CarrierFormResponse",
    "AnswerValue",
    "Submission",
    "SubmissionReceipt",
    "SubmissionRecord",
    "SubmissionListResponse",
    "UploadResponse",
    "ErrorResponse",
];

pub fn generate_typescript_definitions(
    type_names: &[&str],
) -> Result<String, Box<dyn std::error::Error>> {
    if type_names.is_empty() {
        return Err("No type names provided".into());
    }

    let mut definitions = Vec::new();

    for name in type_names {
        let type_def = export_type(name)?;
        let cleaned = clean_type(type_def);

        if !cleaned.trim().is_empty() {
            definitions.push(cleaned);
        }
    }

    Ok(definitions.join("\n\n"))
}

fn export_type(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    use crate::*;
    use ts_rs::TS;

    let result = match name {
        "Carrier" => Carrier::export_to_string()?,
        "FieldType" => FieldType::export_to_string()?,
        "Form" => Form::export_to_string()?,
        "Field" => Field::export_to_string()?,
        "FormDraft" => FormDraft::export_to_string()?,
        "FieldDraft" => FieldDraft::export_to_string()?,
        "FieldUpdate" => FieldUpdate::export_to_string()?,
        "MoveDirection" => MoveDirection::export_to_string()?,
        "FormFilter" => FormFilter::export_to_string()?,
        "FormWithFields" => FormWithFields::export_to_string()?,
        "FormListResponse" => FormListResponse::export_to_string()?,
        "FormResponse" => FormResponse::export_to_string()?,
        "FieldResponse" => FieldResponse::export_to_string()?,
        "SetActiveRequest" => SetActiveRequest::export_to_string()?,
        "MoveFieldRequest" => MoveFieldRequest::export_to_string()?,
        "CarrierFormResponse" => CarrierFormResponse::export_to_string()?,

        "AnswerValue" => AnswerValue::export_to_string()?,
        "Submission" => Submission::export_to_string()?,
        "SubmissionReceipt" => SubmissionReceipt::export_to_string()?,
        "SubmissionRecord" => SubmissionRecord::export_to_string()?,
        "SubmissionListResponse" => SubmissionListResponse::export_to_string()?,
        "UploadResponse" => UploadResponse::export_to_string()?,

        "ErrorResponse" => ErrorResponse::export_to_string()?,

        _ => {
            return Err(format!(
                "Unknown type: '{}'. Available types can be found in shared-types/src/",
                name
            )
            .into());
        }
    };

    Ok(result)
}

pub(crate) fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let lines: Vec<&str> = type_def.lines().collect();

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
        })
        .cloned()
        .collect();

    filtered.join("\n").trim().to_string()
}
