use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod forms;
pub mod submission;
pub mod typescript_gen;

pub use typescript_gen::generate_typescript_definitions;

pub use forms::{
    Carrier, CarrierFormResponse, Field, FieldDraft, FieldId, FieldResponse, FieldType,
    FieldUpdate, Form, FormDraft, FormFilter, FormId, FormListResponse, FormResponse,
    FormWithFields, MoveDirection, MoveFieldRequest, SetActiveRequest,
};
pub use submission::{
    AnswerValue, Submission, SubmissionListResponse, SubmissionReceipt, SubmissionRecord,
    UploadResponse,
};

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub version: String,
}
