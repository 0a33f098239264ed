/// Create the submissions table and the orders raised from priced submissions
pub fn migration() -> String {
    r#"
CREATE TABLE submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    form_id INTEGER NOT NULL,
    price_tier_id INTEGER,
    portfolio_project_id INTEGER,
    answers TEXT NOT NULL,
    contact_email TEXT,
    created_at INTEGER NOT NULL,
    received_at INTEGER NOT NULL,
    FOREIGN KEY (form_id) REFERENCES forms (id) ON DELETE CASCADE
);

CREATE TABLE orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id INTEGER NOT NULL UNIQUE,
    price_tier_id INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'accepted', 'cancelled')),
    created_at INTEGER NOT NULL,
    FOREIGN KEY (submission_id) REFERENCES submissions (id) ON DELETE CASCADE
);

CREATE INDEX idx_submissions_form ON submissions(form_id, received_at);
"#
    .to_string()
}
