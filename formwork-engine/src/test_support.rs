use shared_types::{Carrier, Field, FieldId, FieldType, Form, FormId};

pub(crate) fn field(id: FieldId, field_type: FieldType, order_index: i64) -> Field {
    Field {
        id,
        form_id: 1,
        label: format!("Field {}", id),
        field_type,
        required: false,
        placeholder: None,
        help_text: None,
        options: if field_type.has_options() {
            vec!["a".to_string(), "b".to_string()]
        } else {
            vec![]
        },
        order_index,
    }
}

pub(crate) fn required(mut field: Field) -> Field {
    field.required = true;
    field
}

pub(crate) fn labelled(mut field: Field, label: &str) -> Field {
    field.label = label.to_string();
    field
}

pub(crate) fn with_options(mut field: Field, options: &[&str]) -> Field {
    field.options = options.iter().map(|o| o.to_string()).collect();
    field
}

pub(crate) fn form(id: FormId, fields: &[Field]) -> Form {
    Form {
        id,
        title: "Website audit".to_string(),
        description: None,
        active: true,
        carrier: Carrier::Service(10),
        field_ids: fields.iter().map(|f| f.id).collect(),
        created_at: 0,
        updated_at: 0,
    }
}
