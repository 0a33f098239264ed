use crate::validation::FieldErrors;
use shared_types::{Field, FieldId, FieldType};

/// Input control chosen for a field
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    TextInput,
    NumberInput,
    ShortTextInput,
    TextArea,
    Dropdown { options: Vec<String> },
    Checkbox,
    MultiSelect { options: Vec<String> },
    FileUpload,
}

impl Control {
    /// Fixed type to control mapping. Unknown types have no control.
    pub fn for_field(field: &Field) -> Option<Self> {
        let control = match field.field_type {
            FieldType::Text => Control::TextInput,
            FieldType::Number => Control::NumberInput,
            FieldType::ShortText => Control::ShortTextInput,
            FieldType::LongText => Control::TextArea,
            FieldType::Select => Control::Dropdown {
                options: field.options.clone(),
            },
            FieldType::Checkbox => Control::Checkbox,
            FieldType::MultiSelect => Control::MultiSelect {
                options: field.options.clone(),
            },
            FieldType::File => Control::FileUpload,
            FieldType::Unknown => return None,
        };
        Some(control)
    }
}

/// Everything the UI needs to draw one question
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub field_id: FieldId,
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub control: Control,
    pub error: Option<String>,
}

/// Sort by order index. The sort is stable, so ties keep the order the fields were given in.
pub fn ordered_fields(fields: &[Field]) -> Vec<Field> {
    let mut ordered = fields.to_vec();
    ordered.sort_by_key(|f| f.order_index);
    ordered
}

/// Fields that get a control, in render order
pub fn renderable_fields(fields: &[Field]) -> Vec<Field> {
    ordered_fields(fields)
        .into_iter()
        .filter(|f| f.field_type != FieldType::Unknown)
        .collect()
}

pub fn render_fields(fields: &[Field], errors: &FieldErrors) -> Vec<RenderedField> {
    ordered_fields(fields)
        .iter()
        .filter_map(|field| {
            let control = Control::for_field(field)?;
            Some(RenderedField {
                field_id: field.id,
                label: field.label.clone(),
                required: field.required,
                placeholder: field.placeholder.clone(),
                help_text: field.help_text.clone(),
                control,
                error: errors.get(&field.id).cloned(),
            })
        })
        .collect()
}
