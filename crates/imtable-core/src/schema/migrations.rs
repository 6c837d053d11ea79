/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Definition attributes of the packaged table (NAME, VALID_INPUT_CHARS, ...)
CREATE TABLE IF NOT EXISTS attributes (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Lookup entries: key sequence -> phrase, ranked by weight
CREATE TABLE IF NOT EXISTS phrases (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    phrase TEXT NOT NULL,
    weight INTEGER NOT NULL,
    comment TEXT
);

CREATE INDEX IF NOT EXISTS idx_phrases_code ON phrases(code);
CREATE INDEX IF NOT EXISTS idx_phrases_code_weight ON phrases(code, weight DESC);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
