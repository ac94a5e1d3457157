use sqlx::PgPool;

/// Every table except the append-only activity log carries both timestamps.
#[sqlx::test(migrations = "./migrations")]
async fn tables_have_timestamptz_timestamps(pool: PgPool) {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name NOT IN ('_sqlx_migrations', 'activity_log')
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!tables.is_empty());
    for table in &tables {
        for col in ["created_at", "updated_at"] {
            let data_type: Option<String> = sqlx::query_scalar(
                "SELECT data_type::TEXT
                 FROM information_schema.columns
                 WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
            )
            .bind(table)
            .bind(col)
            .fetch_optional(&pool)
            .await
            .unwrap();

            let data_type =
                data_type.unwrap_or_else(|| panic!("Table {table} is missing column {col}"));
            assert_eq!(
                data_type, "timestamp with time zone",
                "Table {table}.{col} should be timestamptz"
            );
        }
    }
}

/// Primary keys are BIGINT.
#[sqlx::test(migrations = "./migrations")]
async fn primary_keys_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::TEXT, data_type::TEXT
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Seeded lookup data is present after migrating.
#[sqlx::test(migrations = "./migrations")]
async fn roles_and_settings_are_seeded(pool: PgPool) {
    let roles: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(roles, vec!["super-admin", "admin", "editor", "viewer"]);

    let setting = erasmus_db::repositories::SettingRepo::find_by_key(&pool, "items_per_page")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(setting.setting_type, "integer");
}
