/// Create the forms table. A form hangs off exactly one service or offer.
pub fn migration() -> String {
    r#"
CREATE TABLE forms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    active INTEGER NOT NULL DEFAULT 0,
    service_id INTEGER,
    offer_id INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    CHECK ((service_id IS NULL) <> (offer_id IS NULL))
);

CREATE INDEX idx_forms_service ON forms(service_id, active);
CREATE INDEX idx_forms_offer ON forms(offer_id, active);
"#
    .to_string()
}
