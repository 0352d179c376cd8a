//! SQL schema for the Ballot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Never hard-deleted; active = 0 is a soft delete.
CREATE TABLE IF NOT EXISTS categories (
    id      INTEGER PRIMARY KEY,
    name    TEXT    NOT NULL UNIQUE,   -- slug: [a-z0-9-]+
    active  INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS items (
    id          INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    content     TEXT    NOT NULL,
    active      INTEGER NOT NULL DEFAULT 1,
    slug        TEXT
);

-- At most one live vote per (item, voter). Retraction deletes the row.
CREATE TABLE IF NOT EXISTS votes (
    item_id  INTEGER NOT NULL REFERENCES items(id),
    voter_ip TEXT    NOT NULL,
    vote     INTEGER NOT NULL,          -- 1 = up, 0 = down
    PRIMARY KEY (item_id, voter_ip)
);

-- Append-only; one row per (item, voter, day).
CREATE TABLE IF NOT EXISTS views (
    item_id   INTEGER NOT NULL REFERENCES items(id),
    voter_ip  TEXT    NOT NULL,
    viewed_on TEXT    NOT NULL,         -- YYYY-MM-DD
    PRIMARY KEY (item_id, voter_ip, viewed_on)
);

CREATE INDEX IF NOT EXISTS items_category_idx ON items(category_id, active);

PRAGMA user_version = 1;
";
