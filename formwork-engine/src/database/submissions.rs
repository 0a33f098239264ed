use super::Database;
use crate::collaborators::SubmissionSink;
use crate::error::RemoteError;
use crate::storage::StorageError;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use shared_types::{FormId, Submission, SubmissionReceipt, SubmissionRecord};
use tracing::info;

/// Received submissions
impl Database {
    /// Store a submission. A selected price tier also raises an order.
    pub fn store_submission(
        &self,
        submission: &Submission,
    ) -> Result<SubmissionReceipt, StorageError> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().timestamp();
        let answers = serde_json::to_string(&submission.answers)?;

        let tx = conn.transaction()?;

        let form_exists: Option<i64> = tx
            .query_row(
                "SELECT id FROM forms WHERE id = ?1",
                [submission.form_id],
                |row| row.get(0),
            )
            .optional()?;
        if form_exists.is_none() {
            return Err(StorageError::NotFound(format!(
                "Form {}",
                submission.form_id
            )));
        }

        tx.execute(
            "INSERT INTO submissions (form_id, price_tier_id, portfolio_project_id, answers, contact_email, created_at, received_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                submission.form_id,
                submission.price_tier_id,
                submission.portfolio_project_id,
                answers,
                submission.contact_email,
                submission.created_at,
                now
            ],
        )?;
        let submission_id = tx.last_insert_rowid();

        let order_id = match submission.price_tier_id {
            Some(price_tier_id) => {
                tx.execute(
                    "INSERT INTO orders (submission_id, price_tier_id, created_at)
                        VALUES (?1, ?2, ?3)",
                    params![submission_id, price_tier_id, now],
                )?;
                Some(tx.last_insert_rowid())
            }
            None => None,
        };

        tx.commit()?;

        info!(
            form_id = submission.form_id,
            submission_id,
            order_id = ?order_id,
            "Stored submission"
        );
        Ok(SubmissionReceipt {
            submission_id,
            order_id,
        })
    }

    /// Submissions for one form, newest first
    pub fn list_submissions(&self, form_id: FormId) -> Result<Vec<SubmissionRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT s.id, o.id, s.form_id, s.price_tier_id, s.portfolio_project_id, s.answers,
                    s.contact_email, s.created_at, s.received_at
                FROM submissions s
                LEFT JOIN orders o ON o.submission_id = s.id
                WHERE s.form_id = ?1
                ORDER BY s.received_at DESC, s.id DESC",
        )?;

        let rows = stmt.query_map([form_id], |row| {
            let answers: String = row.get(5)?;
            let answers = serde_json::from_str(&answers).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

            Ok(SubmissionRecord {
                id: row.get(0)?,
                order_id: row.get(1)?,
                submission: Submission {
                    form_id: row.get(2)?,
                    price_tier_id: row.get(3)?,
                    portfolio_project_id: row.get(4)?,
                    answers,
                    contact_email: row.get(6)?,
                    created_at: row.get(7)?,
                },
                received_at: row.get(8)?,
            })
        })?;

        let mut result = Vec::new();
        for record in rows {
            result.push(record?);
        }
        Ok(result)
    }
}

/// Lets an embedded setup hand submissions straight to the local database
#[async_trait]
impl SubmissionSink for Database {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, RemoteError> {
        self.store_submission(submission).map_err(|e| match e {
            StorageError::NotFound(message) => RemoteError::NotFound(message),
            other => RemoteError::Transport(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FormStorage;
    use shared_types::{AnswerValue, Carrier, FormDraft};

    async fn database_with_form() -> (Database, FormId) {
        let db = Database::in_memory().unwrap();
        let draft = FormDraft {
            title: "Audit".to_string(),
            service_id: Some(1),
            ..Default::default()
        };
        let form = db.create_form(&draft, Carrier::Service(1)).await.unwrap();
        (db, form.id)
    }

    #[tokio::test]
    async fn test_price_tier_raises_order() {
        let (db, form_id) = database_with_form().await;

        let mut plain = Submission::new(form_id);
        plain
            .answers
            .insert(1, AnswerValue::Text("Hello".to_string()));
        let receipt = db.submit(&plain).await.unwrap();
        assert_eq!(receipt.order_id, None);

        let mut priced = Submission::new(form_id);
        priced.price_tier_id = Some(3);
        priced.answers.insert(
            2,
            AnswerValue::List(vec!["https://cdn.test/a.png".to_string()]),
        );
        let receipt = db.submit(&priced).await.unwrap();
        assert!(receipt.order_id.is_some());

        let records = db.list_submissions(form_id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, receipt.submission_id);
        assert_eq!(records[0].order_id, receipt.order_id);
        assert_eq!(records[0].submission.answers, priced.answers);
        assert_eq!(records[1].submission.answers, plain.answers);
    }

    #[tokio::test]
    async fn test_submission_for_missing_form_is_rejected() {
        let (db, _) = database_with_form().await;

        let err = db.submit(&Submission::new(404)).await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
        assert!(db.list_submissions(404).unwrap().is_empty());
    }
}
