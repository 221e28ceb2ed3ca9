use rusqlite::{params, Connection};

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS equipment (
          equipment_id TEXT PRIMARY KEY,
          tag TEXT NOT NULL,
          description TEXT,
          tag_and_description TEXT,
          sort_order INTEGER,
          created_on TEXT,
          modified_on TEXT,
          owner_id TEXT,
          owner_name TEXT,
          owner_kind TEXT,
          owner_yomi_name TEXT,
          state_code TEXT
        );

        CREATE TABLE IF NOT EXISTS batches (
          batches_id TEXT PRIMARY KEY,
          batch_number TEXT NOT NULL,
          created_on TEXT,
          modified_on TEXT,
          owner_id TEXT,
          owner_name TEXT,
          owner_kind TEXT,
          owner_yomi_name TEXT,
          state_code TEXT
        );

        CREATE TABLE IF NOT EXISTS operations (
          operations_id TEXT PRIMARY KEY,
          equipment_id TEXT,
          batch_id TEXT,
          start_time TEXT,
          end_time TEXT,
          kind TEXT,
          description TEXT,
          allow_overlap INTEGER,
          created_on TEXT,
          modified_on TEXT,
          state_code TEXT,
          status_code TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_operations_equipment ON operations(equipment_id);
        CREATE INDEX IF NOT EXISTS idx_operations_interval ON operations(start_time, end_time);
        "#,
    )?;

    // Additive migrations for databases that predate newer columns. SQLite
    // only supports ADD COLUMN, so we probe with PRAGMA table_info and add
    // what is missing when opening an existing database.
    ensure_equipment_columns(conn)?;
    backfill_sort_order(conn)?;

    Ok(())
}

fn ensure_equipment_columns(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(equipment)")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut existing = std::collections::HashSet::new();
    for name in rows {
        existing.insert(name?);
    }

    if !existing.contains("sort_order") {
        match conn.execute("ALTER TABLE equipment ADD COLUMN sort_order INTEGER", []) {
            Ok(_) => {}
            // Tolerated when another opener won the race; anything else is fatal.
            Err(err) if is_duplicate_column(&err) => {}
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name")
    )
}

/// Assign sequential order values to pre-existing rows that have none.
/// Rows are numbered by their position in the id-sorted full list, matching
/// the display order older databases implied.
fn backfill_sort_order(conn: &Connection) -> rusqlite::Result<()> {
    let missing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM equipment WHERE sort_order IS NULL",
        [],
        |r| r.get(0),
    )?;
    if missing == 0 {
        return Ok(());
    }

    let mut stmt = conn.prepare("SELECT equipment_id FROM equipment ORDER BY equipment_id")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for (index, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE equipment SET sort_order = ?1 WHERE equipment_id = ?2 AND sort_order IS NULL",
            params![index as i64, id],
        )?;
    }

    Ok(())
}
