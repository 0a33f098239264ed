#[cfg(test)]
mod tests {
    use crate::database::migrations::{has_form_schema, run_form_migrations};
    use rusqlite::Connection;

    #[test]
    fn test_form_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(!has_form_schema(&conn).unwrap());

        run_form_migrations(&mut conn).expect("Migrations should succeed");
        assert!(has_form_schema(&conn).unwrap());

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"forms".to_string()));
        assert!(tables.contains(&"form_fields".to_string()));
        assert!(tables.contains(&"submissions".to_string()));
        assert!(tables.contains(&"orders".to_string()));
        assert!(tables.contains(&"refinery_schema_history".to_string()));
    }

    #[test]
    fn test_form_needs_exactly_one_carrier() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_form_migrations(&mut conn).unwrap();

        let insert = |service: Option<i64>, offer: Option<i64>| {
            conn.execute(
                "INSERT INTO forms (title, service_id, offer_id, created_at, updated_at)
                 VALUES ('Audit', ?1, ?2, 0, 0)",
                rusqlite::params![service, offer],
            )
        };

        assert!(insert(Some(1), None).is_ok());
        assert!(insert(None, Some(2)).is_ok());
        assert!(insert(None, None).is_err());
        assert!(insert(Some(1), Some(2)).is_err());
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();

        run_form_migrations(&mut conn).expect("First migration should succeed");
        run_form_migrations(&mut conn).expect("Second migration should succeed");

        let migration_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                row.get(0)
            })
            .unwrap();

        assert_eq!(migration_count, 3);
    }
}
