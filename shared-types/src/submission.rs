use crate::forms::{FieldId, FormId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Resolved answer for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Text, numeric and single choice answers
    Text(String),
    /// Checkbox answers
    Flag(bool),
    /// Multi choice selections, or durable URLs for file fields
    List(Vec<String>),
}

/// Durable record handed to the submission sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Submission {
    pub form_id: FormId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_tier_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_project_id: Option<i64>,
    pub answers: BTreeMap<FieldId, AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub created_at: i64,
}

impl Submission {
    pub fn new(form_id: FormId) -> Self {
        Self {
            form_id,
            price_tier_id: None,
            portfolio_project_id: None,
            answers: BTreeMap::new(),
            contact_email: None,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// What the sink returns for an accepted submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionReceipt {
    pub submission_id: i64,
    /// Present when the submission created an order downstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

/// Stored submission as listed on the staff dashboard
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionRecord {
    pub id: i64,
    pub order_id: Option<i64>,
    pub submission: Submission,
    pub received_at: i64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionRecord>,
}

/// Response of the object storage upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UploadResponse {
    pub url: String,
}
