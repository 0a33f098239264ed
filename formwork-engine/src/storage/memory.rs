use crate::collaborators::CatalogLookup;
use crate::error::RemoteError;
use crate::storage::{FormStorage, StorageError};
use shared_types::{
    Carrier, Field, FieldDraft, FieldId, FieldUpdate, Form, FormDraft, FormId, FormWithFields,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    next_form_id: FormId,
    next_field_id: FieldId,
    forms: BTreeMap<FormId, Form>,
    fields: BTreeMap<FieldId, Field>,
}

impl State {
    fn sorted_fields(&self, form_id: FormId) -> Vec<Field> {
        let mut fields: Vec<Field> = self
            .fields
            .values()
            .filter(|f| f.form_id == form_id)
            .cloned()
            .collect();
        // BTreeMap iteration is by id, so a stable sort keeps insertion order on ties
        fields.sort_by_key(|f| f.order_index);
        fields
    }

    fn hydrate(&self, form: &Form) -> Form {
        let mut form = form.clone();
        form.field_ids = self.sorted_fields(form.id).iter().map(|f| f.id).collect();
        form
    }
}

/// Process-local form storage, used by tests and embedded setups
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<Mutex<State>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::OperationFailed(format!("Lock error: {}", e)))
    }

    /// Number of stored forms, including inactive ones
    pub fn form_count(&self) -> usize {
        self.state.lock().map(|s| s.forms.len()).unwrap_or(0)
    }

    /// Number of stored fields across all forms
    pub fn field_count(&self) -> usize {
        self.state.lock().map(|s| s.fields.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl FormStorage for InMemoryStorage {
    async fn list_forms(&self) -> Result<Vec<Form>, StorageError> {
        let state = self.lock()?;
        Ok(state.forms.values().map(|f| state.hydrate(f)).collect())
    }

    async fn get_form(&self, form_id: FormId) -> Result<Option<Form>, StorageError> {
        let state = self.lock()?;
        Ok(state.forms.get(&form_id).map(|f| state.hydrate(f)))
    }

    async fn create_form(&self, draft: &FormDraft, carrier: Carrier) -> Result<Form, StorageError> {
        let mut state = self.lock()?;
        state.next_form_id += 1;
        let now = chrono::Utc::now().timestamp();

        let form = Form {
            id: state.next_form_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            active: false,
            carrier,
            field_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.forms.insert(form.id, form.clone());
        Ok(form)
    }

    async fn update_form(
        &self,
        form_id: FormId,
        draft: &FormDraft,
        carrier: Carrier,
        active: bool,
    ) -> Result<Form, StorageError> {
        let mut state = self.lock()?;
        let form = state
            .forms
            .get_mut(&form_id)
            .ok_or_else(|| StorageError::NotFound(format!("Form {}", form_id)))?;

        form.title = draft.title.clone();
        form.description = draft.description.clone();
        form.carrier = carrier;
        form.active = active;
        form.updated_at = chrono::Utc::now().timestamp();

        let form = form.clone();
        Ok(state.hydrate(&form))
    }

    async fn delete_form(&self, form_id: FormId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.forms.remove(&form_id).is_none() {
            return Err(StorageError::NotFound(format!("Form {}", form_id)));
        }
        state.fields.retain(|_, f| f.form_id != form_id);
        Ok(())
    }

    async fn list_fields(&self, form_id: FormId) -> Result<Vec<Field>, StorageError> {
        Ok(self.lock()?.sorted_fields(form_id))
    }

    async fn get_field(&self, field_id: FieldId) -> Result<Option<Field>, StorageError> {
        Ok(self.lock()?.fields.get(&field_id).cloned())
    }

    async fn create_field(
        &self,
        form_id: FormId,
        draft: &FieldDraft,
        order_index: i64,
    ) -> Result<Field, StorageError> {
        let mut state = self.lock()?;
        if !state.forms.contains_key(&form_id) {
            return Err(StorageError::NotFound(format!("Form {}", form_id)));
        }
        state.next_field_id += 1;

        let field = Field {
            id: state.next_field_id,
            form_id,
            label: draft.label.clone(),
            field_type: draft.field_type,
            required: draft.required,
            placeholder: draft.placeholder.clone(),
            help_text: draft.help_text.clone(),
            options: draft.options.clone(),
            order_index,
        };
        state.fields.insert(field.id, field.clone());
        Ok(field)
    }

    async fn update_field(
        &self,
        field_id: FieldId,
        update: &FieldUpdate,
    ) -> Result<Field, StorageError> {
        let mut state = self.lock()?;
        let field = state
            .fields
            .get_mut(&field_id)
            .ok_or_else(|| StorageError::NotFound(format!("Field {}", field_id)))?;

        field.label = update.label.clone();
        field.required = update.required;
        field.placeholder = update.placeholder.clone();
        field.help_text = update.help_text.clone();
        field.options = update.options.clone();
        Ok(field.clone())
    }

    async fn delete_field(&self, field_id: FieldId) -> Result<(), StorageError> {
        self.lock()?
            .fields
            .remove(&field_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("Field {}", field_id)))
    }

    async fn set_field_order(
        &self,
        form_id: FormId,
        ordered: &[FieldId],
    ) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        for (index, field_id) in ordered.iter().enumerate() {
            match state.fields.get_mut(field_id) {
                Some(field) if field.form_id == form_id => field.order_index = index as i64,
                _ => {
                    return Err(StorageError::NotFound(format!(
                        "Field {} in form {}",
                        field_id, form_id
                    )))
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogLookup for InMemoryStorage {
    async fn form_for_carrier(
        &self,
        carrier: Carrier,
    ) -> Result<Option<FormWithFields>, RemoteError> {
        let state = self
            .lock()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(state
            .forms
            .values()
            .find(|f| f.active && f.carrier == carrier)
            .map(|form| FormWithFields {
                form: state.hydrate(form),
                fields: state.sorted_fields(form.id),
            }))
    }
}
