use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorRecord {
    pub id: i64,
    /// Empty when the instructor intentionally has no chat account.
    pub discord_id: String,
    pub name: String,
    pub email: String,
}

pub fn open_db(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    // The bot's lesson tables reference instructors(id); replacing a row
    // must not be blocked by them.
    conn.execute("PRAGMA foreign_keys = OFF", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS instructors(
            id INTEGER PRIMARY KEY,
            discord_id TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT
        )",
        [],
    )?;

    // Stores created by the bot predate the email column.
    ensure_instructors_email(&conn)?;

    Ok(conn)
}

pub fn instructor_exists(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM instructors WHERE id = ?", [id], |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn upsert_instructor(conn: &Connection, rec: &InstructorRecord) -> anyhow::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO instructors(id, discord_id, name, email) VALUES(?, ?, ?, ?)",
        (rec.id, &rec.discord_id, &rec.name, &rec.email),
    )?;
    Ok(())
}

#[cfg(test)]
pub fn get_instructor(conn: &Connection, id: i64) -> anyhow::Result<Option<InstructorRecord>> {
    let rec = conn
        .query_row(
            "SELECT id, discord_id, name, COALESCE(email, '') FROM instructors WHERE id = ?",
            [id],
            |r| {
                Ok(InstructorRecord {
                    id: r.get(0)?,
                    discord_id: r.get(1)?,
                    name: r.get(2)?,
                    email: r.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(rec)
}

pub fn count_instructors(conn: &Connection) -> anyhow::Result<i64> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM instructors", [], |r| r.get(0))?;
    Ok(n)
}

fn ensure_instructors_email(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "instructors", "email")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE instructors ADD COLUMN email TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
