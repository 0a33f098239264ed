use refinery::embed_migrations;

embed_migrations!("src/database/migrations");

/// Run the form engine migrations on a database connection.
///
/// Creates `forms`, `form_fields`, `submissions` and `orders`. Public so an
/// embedding application can migrate a connection it owns.
///
/// # Example
/// ```no_run
/// use rusqlite::Connection;
/// use formwork_engine::database::migrations::run_form_migrations;
///
/// let mut conn = Connection::open("forms.db")?;
/// run_form_migrations(&mut conn)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run_form_migrations<C>(conn: &mut C) -> anyhow::Result<()>
where
    C: refinery::Migrate,
{
    migrations::runner().run(conn)?;
    Ok(())
}

/// Check if the form tables exist in a database
pub fn has_form_schema(conn: &rusqlite::Connection) -> anyhow::Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='forms'")?;
    Ok(stmt.exists([])?)
}
