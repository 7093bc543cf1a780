//! SQL schema for the login SQLite store.
//!
//! Executed once at connection startup. Natural keys (group identifier,
//! person notation, account identifier) are indexed but not unique.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS user_groups (
    id          TEXT PRIMARY KEY,
    partition   TEXT NOT NULL,   -- graph URI
    uri         TEXT NOT NULL,
    identifier  TEXT NOT NULL,   -- organisation code
    created     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS people (
    id              TEXT PRIMARY KEY,
    partition       TEXT NOT NULL,
    uri             TEXT NOT NULL,
    identifier_id   TEXT NOT NULL,
    identifier_uri  TEXT NOT NULL,
    notation        TEXT NOT NULL,   -- user identifier claim
    first_name      TEXT,
    family_name     TEXT,
    member_of       TEXT NOT NULL    -- group URI
);

CREATE TABLE IF NOT EXISTS accounts (
    id                 TEXT PRIMARY KEY,
    partition          TEXT NOT NULL,
    uri                TEXT NOT NULL,
    identifier         TEXT NOT NULL,   -- account identifier claim
    owner              TEXT NOT NULL,   -- person URI
    service_homepage   TEXT NOT NULL,
    target_group_code  TEXT,
    target_group_name  TEXT,
    created            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id             TEXT PRIMARY KEY,
    partition      TEXT NOT NULL,
    subject        TEXT NOT NULL,   -- mu-session-id
    account        TEXT NOT NULL,   -- account URI
    session_group  TEXT NOT NULL,   -- group URI
    roles          TEXT NOT NULL DEFAULT '[]',
    modified       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS user_groups_identifier_idx ON user_groups(partition, identifier);
CREATE INDEX IF NOT EXISTS user_groups_uri_idx        ON user_groups(partition, uri);
CREATE INDEX IF NOT EXISTS people_notation_idx        ON people(partition, notation);
CREATE INDEX IF NOT EXISTS accounts_owner_idx         ON accounts(partition, owner, identifier);
CREATE INDEX IF NOT EXISTS accounts_uri_idx           ON accounts(partition, uri);
CREATE INDEX IF NOT EXISTS sessions_subject_idx       ON sessions(partition, subject);
CREATE INDEX IF NOT EXISTS sessions_account_idx       ON sessions(partition, account);

PRAGMA user_version = 1;
";
