use super::*;
use crate::storage::{InMemoryStorage, StorageError};
use async_trait::async_trait;
use shared_types::{Carrier, FieldType};
use std::sync::atomic::{AtomicUsize, Ordering};

fn service() -> AuthoringService<InMemoryStorage> {
    AuthoringService::new(Arc::new(InMemoryStorage::new()))
}

fn draft(title: &str) -> FormDraft {
    FormDraft {
        title: title.to_string(),
        description: Some("Tell us about your project".to_string()),
        service_id: Some(12),
        offer_id: None,
    }
}

async fn form_with_five_fields(authoring: &AuthoringService<impl FormStorage>) -> Form {
    let form = authoring.create_form(&draft("Website audit")).await.unwrap();
    let drafts = [
        FieldDraft::new("Company", FieldType::Text).required(),
        FieldDraft::new("Budget", FieldType::Number),
        FieldDraft::new("Plan", FieldType::Select).with_options(["Basic", "Pro"]),
        FieldDraft::new("Channels", FieldType::MultiSelect).with_options(["Web", "Email", "Ads"]),
        FieldDraft::new("Brief", FieldType::File),
    ];
    for field in &drafts {
        authoring.add_field(form.id, field).await.unwrap();
    }
    form
}

fn labels(fields: &[Field]) -> Vec<&str> {
    fields.iter().map(|f| f.label.as_str()).collect()
}

fn indices(fields: &[Field]) -> Vec<i64> {
    fields.iter().map(|f| f.order_index).collect()
}

#[tokio::test]
async fn test_create_form_validates_and_starts_inactive() {
    let authoring = service();

    let err = authoring.create_form(&draft("   ")).await.unwrap_err();
    assert!(matches!(err, FormError::Validation(_)));

    let mut both = draft("Audit");
    both.offer_id = Some(3);
    assert!(matches!(
        authoring.create_form(&both).await,
        Err(FormError::Validation(_))
    ));

    let form = authoring.create_form(&draft("  Audit ")).await.unwrap();
    assert_eq!(form.title, "Audit");
    assert!(!form.active);
    assert_eq!(form.carrier, Carrier::Service(12));
    assert!(form.field_ids.is_empty());
}

#[tokio::test]
async fn test_update_form_can_move_carrier_and_keeps_activation() {
    let authoring = service();
    let form = authoring.create_form(&draft("Audit")).await.unwrap();
    authoring.set_active(form.id, true).await.unwrap();

    let moved = FormDraft {
        title: "Audit for offers".to_string(),
        description: None,
        service_id: None,
        offer_id: Some(5),
    };
    let updated = authoring.update_form(form.id, &moved).await.unwrap();

    assert_eq!(updated.carrier, Carrier::Offer(5));
    assert!(updated.active);
    assert_eq!(updated.description, None);

    let missing = authoring.update_form(999, &moved).await.unwrap_err();
    assert!(matches!(missing, FormError::NotFound(_)));
}

#[tokio::test]
async fn test_set_active_toggles() {
    let authoring = service();
    let form = authoring.create_form(&draft("Audit")).await.unwrap();

    assert!(authoring.set_active(form.id, true).await.unwrap().active);
    assert!(!authoring.set_active(form.id, false).await.unwrap().active);
}

#[tokio::test]
async fn test_add_field_appends_and_checks_options() {
    let authoring = service();
    let form = form_with_five_fields(&authoring).await;

    let fields = authoring.form_with_fields(form.id).await.unwrap().fields;
    assert_eq!(indices(&fields), vec![0, 1, 2, 3, 4]);

    let no_options = FieldDraft::new("Tier", FieldType::Select);
    assert!(matches!(
        authoring.add_field(form.id, &no_options).await,
        Err(FormError::Validation(_))
    ));

    let unknown = FieldDraft::new("Signature", FieldType::Unknown);
    assert!(authoring.add_field(form.id, &unknown).await.is_err());

    let orphan = FieldDraft::new("Company", FieldType::Text);
    assert!(matches!(
        authoring.add_field(42, &orphan).await,
        Err(FormError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_field_keeps_type() {
    let authoring = service();
    let form = form_with_five_fields(&authoring).await;
    let fields = authoring.form_with_fields(form.id).await.unwrap().fields;
    let plan = &fields[2];

    let mut update = FieldUpdate::from(plan);
    update.label = "Package".to_string();
    update.options = vec!["Basic".to_string(), " ".to_string(), "Enterprise".to_string()];

    let updated = authoring
        .update_field(form.id, plan.id, &update)
        .await
        .unwrap();
    assert_eq!(updated.label, "Package");
    assert_eq!(updated.field_type, FieldType::Select);
    assert_eq!(updated.options, vec!["Basic", "Enterprise"]);

    // clearing the options of a choice field is rejected
    update.options.clear();
    assert!(authoring
        .update_field(form.id, plan.id, &update)
        .await
        .is_err());

    // a field is only reachable through its own form
    let other = authoring.create_form(&draft("Other")).await.unwrap();
    assert!(matches!(
        authoring.update_field(other.id, plan.id, &update).await,
        Err(FormError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_field_resequences() {
    let authoring = service();
    let form = form_with_five_fields(&authoring).await;
    let fields = authoring.form_with_fields(form.id).await.unwrap().fields;

    authoring.delete_field(form.id, fields[1].id).await.unwrap();

    let remaining = authoring.form_with_fields(form.id).await.unwrap();
    assert_eq!(
        labels(&remaining.fields),
        vec!["Company", "Plan", "Channels", "Brief"]
    );
    assert_eq!(indices(&remaining.fields), vec![0, 1, 2, 3]);
    assert_eq!(remaining.form.field_ids.len(), 4);
}

#[tokio::test]
async fn test_reorder_swaps_neighbours_and_stops_at_edges() {
    let authoring = service();
    let form = form_with_five_fields(&authoring).await;
    let fields = authoring.form_with_fields(form.id).await.unwrap().fields;

    let moved = authoring
        .reorder_field(form.id, fields[3].id, MoveDirection::Up)
        .await
        .unwrap();
    assert_eq!(
        labels(&moved),
        vec!["Company", "Budget", "Channels", "Plan", "Brief"]
    );
    assert_eq!(indices(&moved), vec![0, 1, 2, 3, 4]);

    let top = authoring
        .reorder_field(form.id, fields[0].id, MoveDirection::Up)
        .await
        .unwrap();
    assert_eq!(labels(&top), labels(&moved));

    let bottom = authoring
        .reorder_field(form.id, fields[4].id, MoveDirection::Down)
        .await
        .unwrap();
    assert_eq!(labels(&bottom), labels(&moved));

    let down = authoring
        .reorder_field(form.id, fields[0].id, MoveDirection::Down)
        .await
        .unwrap();
    assert_eq!(labels(&down)[..2], ["Budget", "Company"]);
}

#[tokio::test]
async fn test_duplicate_form_deep_copies() {
    let authoring = service();
    let source = form_with_five_fields(&authoring).await;
    authoring.set_active(source.id, true).await.unwrap();

    let copy = authoring.duplicate_form(source.id).await.unwrap();

    assert_ne!(copy.form.id, source.id);
    assert_eq!(copy.form.title, "Website audit (Copy)");
    assert!(!copy.form.active);
    assert_eq!(copy.form.carrier, source.carrier);
    assert_eq!(copy.fields.len(), 5);
    assert_eq!(indices(&copy.fields), vec![0, 1, 2, 3, 4]);

    let originals = authoring.form_with_fields(source.id).await.unwrap().fields;
    for (original, copied) in originals.iter().zip(&copy.fields) {
        assert_ne!(original.id, copied.id);
        assert_eq!(copied.form_id, copy.form.id);
        assert_eq!(original.label, copied.label);
        assert_eq!(original.options, copied.options);
    }

    // options are copies, editing one side leaves the other alone
    let channels = &copy.fields[3];
    let mut update = FieldUpdate::from(channels);
    update.options = vec!["Print".to_string()];
    authoring
        .update_field(copy.form.id, channels.id, &update)
        .await
        .unwrap();

    let originals = authoring.form_with_fields(source.id).await.unwrap().fields;
    assert_eq!(originals[3].options, vec!["Web", "Email", "Ads"]);
}

#[tokio::test]
async fn test_duplicate_rejects_invalid_stored_field() {
    let authoring = service();
    let source = authoring.create_form(&draft("Audit")).await.unwrap();
    authoring
        .add_field(source.id, &FieldDraft::new("Company", FieldType::Text))
        .await
        .unwrap();
    // written around the authoring checks, as an old or hand-edited row would be
    let broken = authoring
        .storage()
        .create_field(source.id, &FieldDraft::new("Plan", FieldType::Select), 1)
        .await
        .unwrap();

    let err = authoring.duplicate_form(source.id).await.unwrap_err();
    match err {
        FormError::Validation(message) => {
            assert!(message.contains(&format!("Field {}", broken.id)));
            assert!(message.contains("option"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let forms = authoring.list_forms(&FormFilter::default()).await.unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(authoring.storage().field_count(), 2);
}

#[tokio::test]
async fn test_duplicate_suffix_is_configurable() {
    let authoring = service().with_duplicate_suffix(" v2");
    let form = authoring.create_form(&draft("Audit")).await.unwrap();

    let copy = authoring.duplicate_form(form.id).await.unwrap();
    assert_eq!(copy.form.title, "Audit v2");
    assert!(copy.fields.is_empty());
}

#[tokio::test]
async fn test_list_forms_filters_after_fetch() {
    let authoring = service();
    let audit = authoring.create_form(&draft("Website Audit")).await.unwrap();
    authoring.create_form(&draft("Logo brief")).await.unwrap();
    authoring.set_active(audit.id, true).await.unwrap();

    let all = authoring.list_forms(&FormFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let filter = FormFilter {
        q: Some("AUDIT".to_string()),
        active: None,
    };
    assert_eq!(labels_of(&authoring.list_forms(&filter).await.unwrap()), vec!["Website Audit"]);

    let filter = FormFilter {
        q: Some("your project".to_string()),
        active: Some(false),
    };
    assert_eq!(labels_of(&authoring.list_forms(&filter).await.unwrap()), vec!["Logo brief"]);
}

fn labels_of(forms: &[Form]) -> Vec<&str> {
    forms.iter().map(|f| f.title.as_str()).collect()
}

#[tokio::test]
async fn test_delete_form_removes_fields() {
    let storage = Arc::new(InMemoryStorage::new());
    let authoring = AuthoringService::new(storage.clone());
    let form = form_with_five_fields(&authoring).await;

    authoring.delete_form(form.id).await.unwrap();

    assert_eq!(storage.form_count(), 0);
    assert_eq!(storage.field_count(), 0);
    assert!(matches!(
        authoring.delete_form(form.id).await,
        Err(FormError::NotFound(_))
    ));
}

/// Storage that starts refusing field inserts after a number of successes
struct FlakyStorage {
    inner: InMemoryStorage,
    field_inserts_left: AtomicUsize,
}

#[async_trait]
impl FormStorage for FlakyStorage {
    async fn list_forms(&self) -> Result<Vec<Form>, StorageError> {
        self.inner.list_forms().await
    }

    async fn get_form(&self, form_id: FormId) -> Result<Option<Form>, StorageError> {
        self.inner.get_form(form_id).await
    }

    async fn create_form(
        &self,
        draft: &FormDraft,
        carrier: Carrier,
    ) -> Result<Form, StorageError> {
        self.inner.create_form(draft, carrier).await
    }

    async fn update_form(
        &self,
        form_id: FormId,
        draft: &FormDraft,
        carrier: Carrier,
        active: bool,
    ) -> Result<Form, StorageError> {
        self.inner.update_form(form_id, draft, carrier, active).await
    }

    async fn delete_form(&self, form_id: FormId) -> Result<(), StorageError> {
        self.inner.delete_form(form_id).await
    }

    async fn list_fields(&self, form_id: FormId) -> Result<Vec<Field>, StorageError> {
        self.inner.list_fields(form_id).await
    }

    async fn get_field(&self, field_id: FieldId) -> Result<Option<Field>, StorageError> {
        self.inner.get_field(field_id).await
    }

    async fn create_field(
        &self,
        form_id: FormId,
        draft: &FieldDraft,
        order_index: i64,
    ) -> Result<Field, StorageError> {
        let left = self.field_inserts_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StorageError::OperationFailed("disk full".to_string()));
        }
        self.field_inserts_left.store(left - 1, Ordering::SeqCst);
        self.inner.create_field(form_id, draft, order_index).await
    }

    async fn update_field(
        &self,
        field_id: FieldId,
        update: &FieldUpdate,
    ) -> Result<Field, StorageError> {
        self.inner.update_field(field_id, update).await
    }

    async fn delete_field(&self, field_id: FieldId) -> Result<(), StorageError> {
        self.inner.delete_field(field_id).await
    }

    async fn set_field_order(
        &self,
        form_id: FormId,
        ordered: &[FieldId],
    ) -> Result<(), StorageError> {
        self.inner.set_field_order(form_id, ordered).await
    }
}

#[tokio::test]
async fn test_failed_duplicate_leaves_nothing_behind() {
    let storage = Arc::new(FlakyStorage {
        inner: InMemoryStorage::new(),
        // five for the source form, two for the copy
        field_inserts_left: AtomicUsize::new(7),
    });
    let authoring = AuthoringService::new(storage.clone());
    let source = form_with_five_fields(&authoring).await;

    let err = authoring.duplicate_form(source.id).await.unwrap_err();
    assert!(matches!(
        err,
        FormError::Storage(StorageError::OperationFailed(_))
    ));

    let forms = authoring.list_forms(&FormFilter::default()).await.unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].id, source.id);
    assert_eq!(storage.inner.field_count(), 5);
}
