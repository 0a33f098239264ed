// Form schema types shared between the engine, the api and the browser client

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

pub type FormId = i64;
pub type FieldId = i64;

/// Sellable entity a form is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Carrier {
    /// A sellable service
    Service(i64),
    /// A promotional offer
    Offer(i64),
}

impl Carrier {
    /// Resolve the two optional references coming from an authoring form.
    /// Exactly one of them must be set.
    pub fn resolve(service_id: Option<i64>, offer_id: Option<i64>) -> Result<Self, String> {
        match (service_id, offer_id) {
            (Some(id), None) => Ok(Carrier::Service(id)),
            (None, Some(id)) => Ok(Carrier::Offer(id)),
            (None, None) => Err("Form must be attached to a service or an offer".to_string()),
            (Some(_), Some(_)) => {
                Err("Form cannot be attached to both a service and an offer".to_string())
            }
        }
    }

    pub fn service_id(&self) -> Option<i64> {
        match self {
            Carrier::Service(id) => Some(*id),
            Carrier::Offer(_) => None,
        }
    }

    pub fn offer_id(&self) -> Option<i64> {
        match self {
            Carrier::Offer(id) => Some(*id),
            Carrier::Service(_) => None,
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Carrier::Service(id) => write!(f, "service:{}", id),
            Carrier::Offer(id) => write!(f, "offer:{}", id),
        }
    }
}

/// One questionnaire attached to a carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Form {
    pub id: FormId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the form is offered to clients
    pub active: bool,
    pub carrier: Carrier,
    /// Field ids in render order
    #[serde(default)]
    pub field_ids: Vec<FieldId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Kind of input a field asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input
    Text,
    /// Numeric input, kept as the entered string
    Number,
    /// Short free text
    ShortText,
    /// Long free text
    LongText,
    /// Single choice from the option list
    Select,
    /// Boolean checkbox
    Checkbox,
    /// Multiple choices from the option list
    MultiSelect,
    /// File or media attachments
    File,
    /// Any type this build does not know about. Never authored.
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// Types that carry an option list
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::MultiSelect)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::MultiSelect => "multi_select",
            FieldType::File => "file",
            FieldType::Unknown => "unknown",
        }
    }

    /// Stored or wire name to type. Names this build does not know become `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "short_text" => FieldType::ShortText,
            "long_text" => FieldType::LongText,
            "select" => FieldType::Select,
            "checkbox" => FieldType::Checkbox,
            "multi_select" => FieldType::MultiSelect,
            "file" => FieldType::File,
            _ => FieldType::Unknown,
        }
    }
}

/// One question within a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Field {
    pub id: FieldId,
    pub form_id: FormId,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Populated only for select and multi_select fields
    #[serde(default)]
    pub options: Vec<String>,
    /// Render position within the form
    pub order_index: i64,
}

/// Form attributes as entered in the authoring screen
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub offer_id: Option<i64>,
}

/// Field attributes as entered in the authoring screen
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldDraft {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl FieldDraft {
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            help_text: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Editable field attributes. The type of a field cannot change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldUpdate {
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl From<&Field> for FieldUpdate {
    fn from(field: &Field) -> Self {
        Self {
            label: field.label.clone(),
            required: field.required,
            placeholder: field.placeholder.clone(),
            help_text: field.help_text.clone(),
            options: field.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Client-side filter for the forms list
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormFilter {
    /// Free text matched against title and description
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormWithFields {
    pub form: Form,
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormListResponse {
    pub forms: Vec<Form>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormResponse {
    pub form: Form,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldResponse {
    pub field: Field,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MoveFieldRequest {
    pub direction: MoveDirection,
}

/// Catalog lookup result. `form` is null when the carrier has no active form.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CarrierFormResponse {
    pub form: Option<FormWithFields>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_resolution() {
        assert_eq!(Carrier::resolve(Some(4), None), Ok(Carrier::Service(4)));
        assert_eq!(Carrier::resolve(None, Some(9)), Ok(Carrier::Offer(9)));
        assert!(Carrier::resolve(None, None).is_err());
        assert!(Carrier::resolve(Some(1), Some(2)).is_err());
    }

    #[test]
    fn test_carrier_wire_format() {
        let json = serde_json::to_value(Carrier::Offer(7)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "offer", "id": 7}));
    }

    #[test]
    fn test_unknown_field_type_is_absorbed() {
        let field: Field = serde_json::from_value(serde_json::json!({
            "id": 1,
            "form_id": 1,
            "label": "Signature",
            "type": "signature_pad",
            "required": true,
            "order_index": 0
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Unknown);
        assert!(field.options.is_empty());
    }

    #[test]
    fn test_field_type_str_mapping() {
        for field_type in [
            FieldType::Text,
            FieldType::Number,
            FieldType::ShortText,
            FieldType::LongText,
            FieldType::Select,
            FieldType::Checkbox,
            FieldType::MultiSelect,
            FieldType::File,
        ] {
            assert_eq!(FieldType::parse_lenient(field_type.as_str()), field_type);
        }
        assert_eq!(FieldType::parse_lenient("rating"), FieldType::Unknown);
    }
}
