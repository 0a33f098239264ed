/// Create the form_fields table. Options are stored as a JSON array.
pub fn migration() -> String {
    r#"
CREATE TABLE form_fields (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    form_id INTEGER NOT NULL,
    label TEXT NOT NULL,
    field_type TEXT NOT NULL,
    required INTEGER NOT NULL DEFAULT 0,
    placeholder TEXT,
    help_text TEXT,
    options TEXT NOT NULL DEFAULT '[]',
    order_index INTEGER NOT NULL,
    FOREIGN KEY (form_id) REFERENCES forms (id) ON DELETE CASCADE
);

CREATE INDEX idx_form_fields_form_order ON form_fields(form_id, order_index);
"#
    .to_string()
}
