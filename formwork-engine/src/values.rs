use shared_types::FieldId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A file picked by the user and not uploaded yet
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FileHandle {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// The user's answer to one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text kinds, single choice, and numbers as typed
    Text(String),
    Flag(bool),
    Choices(BTreeSet<String>),
    Files(Vec<FileHandle>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Choices(values.into_iter().map(Into::into).collect())
    }

    /// Absent-equivalent values: blank text, unchecked box, nothing selected or attached
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(checked) => !checked,
            FieldValue::Choices(choices) => choices.is_empty(),
            FieldValue::Files(files) => files.is_empty(),
        }
    }
}

/// In-progress answers keyed by field id. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    values: BTreeMap<FieldId, FieldValue>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: FieldId) -> Option<&FieldValue> {
        self.values.get(&field_id)
    }

    pub fn set(&mut self, field_id: FieldId, value: FieldValue) {
        self.values.insert(field_id, value);
    }

    pub fn with(mut self, field_id: FieldId, value: FieldValue) -> Self {
        self.set(field_id, value);
        self
    }

    pub fn remove(&mut self, field_id: FieldId) -> Option<FieldValue> {
        self.values.remove(&field_id)
    }

    /// Flip one option of a multi choice field
    pub fn toggle_choice(&mut self, field_id: FieldId, option: &str) {
        let entry = self
            .values
            .entry(field_id)
            .or_insert_with(|| FieldValue::Choices(BTreeSet::new()));

        match entry {
            FieldValue::Choices(choices) => {
                if !choices.remove(option) {
                    choices.insert(option.to_string());
                }
            }
            other => *other = FieldValue::choices([option]),
        }
    }

    /// Append a file to a file field, keeping attachment order
    pub fn attach_file(&mut self, field_id: FieldId, file: FileHandle) {
        let entry = self
            .values
            .entry(field_id)
            .or_insert_with(|| FieldValue::Files(Vec::new()));

        match entry {
            FieldValue::Files(files) => files.push(file),
            other => *other = FieldValue::Files(vec![file]),
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &FieldValue)> {
        self.values.iter()
    }
}
