use super::Database;
use crate::collaborators::CatalogLookup;
use crate::error::RemoteError;
use crate::storage::{FormStorage, StorageError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{
    Carrier, Field, FieldDraft, FieldId, FieldType, FieldUpdate, Form, FormDraft, FormId,
    FormWithFields,
};

const FORM_COLUMNS: &str =
    "id, title, description, active, service_id, offer_id, created_at, updated_at";

const FIELD_COLUMNS: &str =
    "id, form_id, label, field_type, required, placeholder, help_text, options, order_index";

fn form_from_row(row: &Row) -> rusqlite::Result<Form> {
    let service_id: Option<i64> = row.get(4)?;
    let offer_id: Option<i64> = row.get(5)?;
    let carrier = Carrier::resolve(service_id, offer_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Integer,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    Ok(Form {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        active: row.get(3)?,
        carrier,
        field_ids: Vec::new(),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn field_from_row(row: &Row) -> rusqlite::Result<Field> {
    let field_type: String = row.get(3)?;
    let options: String = row.get(7)?;
    let options: Vec<String> = serde_json::from_str(&options).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Field {
        id: row.get(0)?,
        form_id: row.get(1)?,
        label: row.get(2)?,
        field_type: FieldType::parse_lenient(&field_type),
        required: row.get(4)?,
        placeholder: row.get(5)?,
        help_text: row.get(6)?,
        options,
        order_index: row.get(8)?,
    })
}

fn load_form(conn: &Connection, form_id: FormId) -> Result<Option<Form>, StorageError> {
    let form = conn
        .query_row(
            &format!("SELECT {} FROM forms WHERE id = ?1", FORM_COLUMNS),
            [form_id],
            form_from_row,
        )
        .optional()?;

    match form {
        Some(mut form) => {
            form.field_ids = load_fields(conn, form.id)?.iter().map(|f| f.id).collect();
            Ok(Some(form))
        }
        None => Ok(None),
    }
}

fn load_fields(conn: &Connection, form_id: FormId) -> Result<Vec<Field>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM form_fields WHERE form_id = ?1 ORDER BY order_index ASC, id ASC",
        FIELD_COLUMNS
    ))?;

    let fields = stmt
        .query_map([form_id], field_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(fields)
}

fn load_field(conn: &Connection, field_id: FieldId) -> Result<Option<Field>, StorageError> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM form_fields WHERE id = ?1", FIELD_COLUMNS),
            [field_id],
            field_from_row,
        )
        .optional()?)
}

#[async_trait]
impl FormStorage for Database {
    async fn list_forms(&self) -> Result<Vec<Form>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM forms ORDER BY id ASC",
            FORM_COLUMNS
        ))?;

        let mut forms = stmt
            .query_map([], form_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for form in &mut forms {
            form.field_ids = load_fields(&conn, form.id)?.iter().map(|f| f.id).collect();
        }
        Ok(forms)
    }

    async fn get_form(&self, form_id: FormId) -> Result<Option<Form>, StorageError> {
        load_form(&*self.conn()?, form_id)
    }

    async fn create_form(&self, draft: &FormDraft, carrier: Carrier) -> Result<Form, StorageError> {
        let conn = self.conn()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO forms (title, description, active, service_id, offer_id, created_at, updated_at)
                VALUES (?1, ?2, 0, ?3, ?4, ?5, ?5)",
            params![
                draft.title,
                draft.description,
                carrier.service_id(),
                carrier.offer_id(),
                now
            ],
        )?;

        load_form(&conn, conn.last_insert_rowid())?
            .ok_or_else(|| StorageError::OperationFailed("Inserted form not found".to_string()))
    }

    async fn update_form(
        &self,
        form_id: FormId,
        draft: &FormDraft,
        carrier: Carrier,
        active: bool,
    ) -> Result<Form, StorageError> {
        let conn = self.conn()?;
        let now = chrono::Utc::now().timestamp();

        let changed = conn.execute(
            "UPDATE forms
                SET title = ?1, description = ?2, service_id = ?3, offer_id = ?4, active = ?5, updated_at = ?6
                WHERE id = ?7",
            params![
                draft.title,
                draft.description,
                carrier.service_id(),
                carrier.offer_id(),
                active,
                now,
                form_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("Form {}", form_id)));
        }

        load_form(&conn, form_id)?
            .ok_or_else(|| StorageError::NotFound(format!("Form {}", form_id)))
    }

    async fn delete_form(&self, form_id: FormId) -> Result<(), StorageError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM forms WHERE id = ?1", [form_id])?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("Form {}", form_id)));
        }
        Ok(())
    }

    async fn list_fields(&self, form_id: FormId) -> Result<Vec<Field>, StorageError> {
        load_fields(&*self.conn()?, form_id)
    }

    async fn get_field(&self, field_id: FieldId) -> Result<Option<Field>, StorageError> {
        load_field(&*self.conn()?, field_id)
    }

    async fn create_field(
        &self,
        form_id: FormId,
        draft: &FieldDraft,
        order_index: i64,
    ) -> Result<Field, StorageError> {
        let conn = self.conn()?;
        let options = serde_json::to_string(&draft.options)?;

        conn.execute(
            "INSERT INTO form_fields (form_id, label, field_type, required, placeholder, help_text, options, order_index)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                form_id,
                draft.label,
                draft.field_type.as_str(),
                draft.required,
                draft.placeholder,
                draft.help_text,
                options,
                order_index
            ],
        )?;

        load_field(&conn, conn.last_insert_rowid())?
            .ok_or_else(|| StorageError::OperationFailed("Inserted field not found".to_string()))
    }

    async fn update_field(
        &self,
        field_id: FieldId,
        update: &FieldUpdate,
    ) -> Result<Field, StorageError> {
        let conn = self.conn()?;
        let options = serde_json::to_string(&update.options)?;

        let changed = conn.execute(
            "UPDATE form_fields
                SET label = ?1, required = ?2, placeholder = ?3, help_text = ?4, options = ?5
                WHERE id = ?6",
            params![
                update.label,
                update.required,
                update.placeholder,
                update.help_text,
                options,
                field_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("Field {}", field_id)));
        }

        load_field(&conn, field_id)?
            .ok_or_else(|| StorageError::NotFound(format!("Field {}", field_id)))
    }

    async fn delete_field(&self, field_id: FieldId) -> Result<(), StorageError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM form_fields WHERE id = ?1", [field_id])?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("Field {}", field_id)));
        }
        Ok(())
    }

    async fn set_field_order(
        &self,
        form_id: FormId,
        ordered: &[FieldId],
    ) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for (index, field_id) in ordered.iter().enumerate() {
            let changed = tx.execute(
                "UPDATE form_fields SET order_index = ?1 WHERE id = ?2 AND form_id = ?3",
                params![index as i64, field_id, form_id],
            )?;
            if changed == 0 {
                // dropping the transaction rolls it back
                return Err(StorageError::NotFound(format!(
                    "Field {} in form {}",
                    field_id, form_id
                )));
            }
        }

        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl CatalogLookup for Database {
    async fn form_for_carrier(
        &self,
        carrier: Carrier,
    ) -> Result<Option<FormWithFields>, RemoteError> {
        let lookup = || -> Result<Option<FormWithFields>, StorageError> {
            let conn = self.conn()?;
            let form_id: Option<FormId> = conn
                .query_row(
                    "SELECT id FROM forms
                        WHERE active = 1 AND (service_id = ?1 OR offer_id = ?2)
                        ORDER BY id ASC LIMIT 1",
                    params![carrier.service_id(), carrier.offer_id()],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(form_id) = form_id else {
                return Ok(None);
            };
            let form = load_form(&conn, form_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Form {}", form_id)))?;
            let fields = load_fields(&conn, form_id)?;
            Ok(Some(FormWithFields { form, fields }))
        };

        lookup().map_err(|e| RemoteError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authoring::AuthoringService;
    use crate::error::FormError;
    use shared_types::{FormFilter, MoveDirection};
    use std::sync::Arc;

    fn draft(title: &str, service_id: Option<i64>, offer_id: Option<i64>) -> FormDraft {
        FormDraft {
            title: title.to_string(),
            description: None,
            service_id,
            offer_id,
        }
    }

    #[tokio::test]
    async fn test_form_and_field_round_trip() {
        let db = Database::in_memory().unwrap();
        let form = db
            .create_form(&draft("Audit", Some(4), None), Carrier::Service(4))
            .await
            .unwrap();
        assert!(!form.active);
        assert_eq!(form.carrier, Carrier::Service(4));

        let plan = FieldDraft::new("Plan", FieldType::Select).with_options(["Basic", "Pro"]);
        let field = db.create_field(form.id, &plan, 0).await.unwrap();
        assert_eq!(field.options, vec!["Basic", "Pro"]);
        assert_eq!(field.field_type, FieldType::Select);

        let loaded = db.get_form(form.id).await.unwrap().unwrap();
        assert_eq!(loaded.field_ids, vec![field.id]);
        assert_eq!(db.get_field(field.id).await.unwrap(), Some(field));
        assert_eq!(db.get_form(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_stored_type_loads_as_unknown() {
        let db = Database::in_memory().unwrap();
        let form = db
            .create_form(&draft("Audit", Some(4), None), Carrier::Service(4))
            .await
            .unwrap();

        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO form_fields (form_id, label, field_type, order_index)
                    VALUES (?1, 'Signature', 'signature_pad', 0)",
                [form.id],
            )
            .unwrap();

        let fields = db.list_fields(form.id).await.unwrap();
        assert_eq!(fields[0].field_type, FieldType::Unknown);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_unsupported_rows_untouched() {
        let db = Arc::new(Database::in_memory().unwrap());
        let authoring = AuthoringService::new(db.clone());
        let form = authoring
            .create_form(&draft("Audit", Some(4), None))
            .await
            .unwrap();

        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO form_fields (form_id, label, field_type, order_index)
                    VALUES (?1, 'Signature', 'signature_pad', 0)",
                [form.id],
            )
            .unwrap();

        let err = authoring.duplicate_form(form.id).await.unwrap_err();
        assert!(matches!(err, FormError::Validation(_)));

        let forms = authoring.list_forms(&FormFilter::default()).await.unwrap();
        assert_eq!(forms.len(), 1);
        let stored: Vec<String> = {
            let conn = db.conn().unwrap();
            let mut stmt = conn
                .prepare("SELECT field_type FROM form_fields ORDER BY id")
                .unwrap();
            let rows = stmt.query_map([], |row| row.get(0)).unwrap();
            rows.map(|r| r.unwrap()).collect()
        };
        assert_eq!(stored, vec!["signature_pad"]);
    }

    #[tokio::test]
    async fn test_deleting_form_cascades_to_fields() {
        let db = Database::in_memory().unwrap();
        let form = db
            .create_form(&draft("Audit", None, Some(2)), Carrier::Offer(2))
            .await
            .unwrap();
        let field = db
            .create_field(form.id, &FieldDraft::new("Name", FieldType::Text), 0)
            .await
            .unwrap();

        db.delete_form(form.id).await.unwrap();
        assert_eq!(db.get_field(field.id).await.unwrap(), None);
        assert!(matches!(
            db.delete_form(form.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_field_order_is_all_or_nothing() {
        let db = Database::in_memory().unwrap();
        let form = db
            .create_form(&draft("Audit", Some(1), None), Carrier::Service(1))
            .await
            .unwrap();
        let a = db
            .create_field(form.id, &FieldDraft::new("A", FieldType::Text), 0)
            .await
            .unwrap();
        let b = db
            .create_field(form.id, &FieldDraft::new("B", FieldType::Text), 1)
            .await
            .unwrap();

        assert!(db
            .set_field_order(form.id, &[b.id, a.id, 999])
            .await
            .is_err());
        let unchanged = db.list_fields(form.id).await.unwrap();
        assert_eq!(unchanged[0].id, a.id);

        db.set_field_order(form.id, &[b.id, a.id]).await.unwrap();
        let swapped = db.list_fields(form.id).await.unwrap();
        assert_eq!(swapped[0].id, b.id);
        assert_eq!(swapped[1].order_index, 1);
    }

    #[tokio::test]
    async fn test_catalog_lookup_only_sees_active_forms() {
        let db = Arc::new(Database::in_memory().unwrap());
        let authoring = AuthoringService::new(db.clone());

        let offer_form = authoring
            .create_form(&draft("Launch offer", None, Some(7)))
            .await
            .unwrap();
        authoring
            .add_field(offer_form.id, &FieldDraft::new("Start date", FieldType::ShortText))
            .await
            .unwrap();

        assert!(db
            .form_for_carrier(Carrier::Offer(7))
            .await
            .unwrap()
            .is_none());

        authoring.set_active(offer_form.id, true).await.unwrap();
        let found = db
            .form_for_carrier(Carrier::Offer(7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.form.id, offer_form.id);
        assert_eq!(found.fields.len(), 1);

        // same id on the other carrier kind is a different carrier
        assert!(db
            .form_for_carrier(Carrier::Service(7))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_authoring_over_sqlite() {
        let db = Arc::new(Database::in_memory().unwrap());
        let authoring = AuthoringService::new(db.clone());

        let form = authoring
            .create_form(&draft("Website audit", Some(1), None))
            .await
            .unwrap();
        for label in ["One", "Two", "Three"] {
            authoring
                .add_field(form.id, &FieldDraft::new(label, FieldType::Text))
                .await
                .unwrap();
        }
        let fields = authoring.form_with_fields(form.id).await.unwrap().fields;

        let moved = authoring
            .reorder_field(form.id, fields[2].id, MoveDirection::Up)
            .await
            .unwrap();
        let labels: Vec<_> = moved.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["One", "Three", "Two"]);

        authoring.delete_field(form.id, fields[0].id).await.unwrap();
        let remaining = authoring.form_with_fields(form.id).await.unwrap().fields;
        let indices: Vec<_> = remaining.iter().map(|f| f.order_index).collect();
        assert_eq!(indices, vec![0, 1]);

        let copy = authoring.duplicate_form(form.id).await.unwrap();
        assert_eq!(copy.form.title, "Website audit (Copy)");
        assert_eq!(copy.fields.len(), 2);

        let listed = authoring.list_forms(&FormFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
    }
}
