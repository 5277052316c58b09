//! SQL schema for the summons SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS summons (
    summons_id          TEXT PRIMARY KEY,
    number              TEXT NOT NULL,
    kind                TEXT NOT NULL,
    sub_kind            TEXT,
    urgency             TEXT,            -- Urgency discriminant or NULL
    priority            TEXT,            -- Priority discriminant or NULL
    confidentiality     TEXT,
    motif               TEXT NOT NULL,
    details             TEXT NOT NULL DEFAULT '{}',  -- JSON CaseDetails
    summoned_person     TEXT NOT NULL,               -- JSON SummonedPerson
    assigned_official   TEXT,
    unit                TEXT,
    scheduled_date      TEXT NOT NULL,   -- YYYY-MM-DD
    scheduled_time      TEXT NOT NULL,   -- HH:MM:SS
    delivery_mode       TEXT NOT NULL,   -- DeliveryMode discriminant
    status              TEXT NOT NULL,   -- SummonsStatus discriminant
    created_at          TEXT NOT NULL,   -- RFC 3339 UTC
    sent_at             TEXT,
    honored_at          TEXT,
    cancel_reason       TEXT,
    non_honored_reason  TEXT,            -- NonHonoredReason discriminant or NULL
    non_honored_comment TEXT,
    version             INTEGER NOT NULL DEFAULT 0,
    CHECK ((status = 'CANCELED')    = (cancel_reason IS NOT NULL)),
    CHECK ((status = 'NOT_HONORED') = (non_honored_reason IS NOT NULL))
);

-- History is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS history (
    summons_id  TEXT NOT NULL REFERENCES summons(summons_id),
    position    INTEGER NOT NULL,  -- 0-based insertion order
    action      TEXT NOT NULL,     -- HistoryAction discriminant
    actor       TEXT,
    recorded_at TEXT NOT NULL,
    details     TEXT,
    PRIMARY KEY (summons_id, position)
);

-- Per-channel notification outcomes, independent of history.
CREATE TABLE IF NOT EXISTS deliveries (
    delivery_id INTEGER PRIMARY KEY AUTOINCREMENT,
    summons_id  TEXT NOT NULL REFERENCES summons(summons_id),
    channel     TEXT NOT NULL,
    delivered   INTEGER NOT NULL,
    error       TEXT,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS summons_status_idx     ON summons(status);
CREATE INDEX IF NOT EXISTS summons_unit_idx       ON summons(unit);
CREATE INDEX IF NOT EXISTS summons_scheduled_idx  ON summons(scheduled_date);
CREATE INDEX IF NOT EXISTS deliveries_summons_idx ON deliveries(summons_id);

PRAGMA user_version = 1;
";
