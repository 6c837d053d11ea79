use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;
use crate::model::Entry;

use super::migrations::MIGRATIONS;

/// A packaged table artifact: a SQLite database holding the definition
/// attributes and the lookup entries.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) an artifact at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory artifact (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Attribute accessors
impl Database {
    /// Store definition attributes, in the given order. A repeated name
    /// overwrites the earlier value (last occurrence wins).
    pub fn insert_attributes<'a>(
        &self,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO attributes (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            )?;
            for (name, value) in attributes {
                stmt.execute(rusqlite::params![name, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Look up one definition attribute.
    pub fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM attributes WHERE name = ?1")?;
        let mut rows = stmt.query_map([name], |row| row.get(0))?;
        Ok(rows.next().transpose()?)
    }

    /// All attributes in insertion (rowid) order.
    pub fn list_attributes(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM attributes ORDER BY rowid")?;
        let attrs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attrs)
    }
}

// Phrase accessors
impl Database {
    /// Insert entries in the given order, in a single transaction.
    pub fn insert_entries(&self, entries: &[Entry]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO phrases (code, phrase, weight, comment)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for entry in entries {
                stmt.execute(rusqlite::params![
                    entry.code,
                    entry.phrase,
                    entry.weight,
                    entry.comment,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Total number of lookup entries.
    pub fn phrase_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM phrases", [], |row| row.get(0))?;
        Ok(count.unsigned_abs())
    }

    /// Entries whose code equals `code`, weight descending.
    pub fn lookup_exact(&self, code: &str) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, phrase, weight, comment FROM phrases
             WHERE code = ?1
             ORDER BY weight DESC, phrase",
        )?;
        let entries = stmt
            .query_map([code], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Entries whose code starts with `prefix`, code ascending then
    /// weight descending (runtime candidate lookup).
    pub fn lookup_prefix(&self, prefix: &str) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, phrase, weight, comment FROM phrases
             WHERE code LIKE ?1 ESCAPE '\\'
             ORDER BY code, weight DESC, phrase",
        )?;
        let pattern = format!("{}%", escape_like(prefix));
        let entries = stmt
            .query_map([pattern], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// All entries in insertion (rowid) order.
    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, phrase, weight, comment FROM phrases ORDER BY id",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
        Ok(Entry {
            code: row.get(0)?,
            phrase: row.get(1)?,
            weight: row.get(2)?,
            comment: row.get(3)?,
        })
    }
}

/// Escape LIKE metacharacters in a lookup prefix.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<Entry> {
        vec![
            Entry::new("a", "日", 1000),
            Entry::new("a", "曰", 500),
            Entry::new("ab", "明", 900),
            Entry::new("b", "月", 800),
        ]
    }

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_attribute_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_attributes([("NAME", "Test"), ("MAX_KEY_LENGTH", "4")])
            .unwrap();

        assert_eq!(db.get_attribute("NAME").unwrap().as_deref(), Some("Test"));
        assert!(db.get_attribute("MISSING").unwrap().is_none());
        assert_eq!(db.list_attributes().unwrap().len(), 2);
    }

    #[test]
    fn test_attribute_last_occurrence_wins() {
        let db = Database::open_in_memory().unwrap();
        db.insert_attributes([("SERIAL_NUMBER", "20061206"), ("SERIAL_NUMBER", "20120413")])
            .unwrap();
        assert_eq!(
            db.get_attribute("SERIAL_NUMBER").unwrap().as_deref(),
            Some("20120413")
        );
    }

    #[test]
    fn test_insert_preserves_order() {
        let db = Database::open_in_memory().unwrap();
        let entries = sample_entries();
        db.insert_entries(&entries).unwrap();
        assert_eq!(db.list_entries().unwrap(), entries);
        assert_eq!(db.phrase_count().unwrap(), 4);
    }

    #[test]
    fn test_lookup_exact_orders_by_weight() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entries(&sample_entries()).unwrap();

        let hits = db.lookup_exact("a").unwrap();
        let phrases: Vec<&str> = hits.iter().map(|e| e.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["日", "曰"]);
    }

    #[test]
    fn test_lookup_prefix() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entries(&sample_entries()).unwrap();

        let hits = db.lookup_prefix("a").unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].phrase, "日");
        assert_eq!(hits[2].code, "ab");

        assert!(db.lookup_prefix("zz").unwrap().is_empty());
    }

    #[test]
    fn test_lookup_prefix_escapes_metacharacters() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entries(&[Entry::new("a_b", "日", 1), Entry::new("axb", "月", 1)])
            .unwrap();

        let hits = db.lookup_prefix("a_").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "a_b");
    }
}
