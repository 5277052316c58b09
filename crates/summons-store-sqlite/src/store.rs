//! [`SqliteStore`]: the SQLite implementation of [`SummonsStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use summons_core::{
  history::HistoryEntry,
  notify::DeliveryRecord,
  store::{SaveOutcome, SummonsQuery, SummonsStore},
  summons::Summons,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    RawDelivery, RawHistoryEntry, SUMMONS_COLUMNS, SummonsColumns, encode_dt,
    encode_enum, encode_uuid, encode_version,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A summons store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// A history entry encoded for insertion, tagged with its position.
struct HistoryRow {
  position:    i64,
  action:      &'static str,
  actor:       Option<String>,
  recorded_at: String,
  details:     Option<String>,
}

fn history_rows(history: &[HistoryEntry]) -> Vec<HistoryRow> {
  history
    .iter()
    .enumerate()
    .map(|(i, entry)| HistoryRow {
      position:    i as i64,
      action:      entry.action.discriminant(),
      actor:       entry.actor.clone(),
      recorded_at: encode_dt(entry.timestamp),
      details:     entry.details.clone(),
    })
    .collect()
}

fn insert_history(
  conn: &rusqlite::Connection,
  summons_id: &str,
  rows: &[HistoryRow],
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT INTO history (summons_id, position, action, actor, recorded_at, details)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  for row in rows {
    stmt.execute(rusqlite::params![
      summons_id,
      row.position,
      row.action,
      row.actor,
      row.recorded_at,
      row.details,
    ])?;
  }
  Ok(())
}

fn read_history(
  conn: &rusqlite::Connection,
  summons_id: &str,
) -> rusqlite::Result<Vec<RawHistoryEntry>> {
  let mut stmt = conn.prepare(
    "SELECT action, actor, recorded_at, details
     FROM history WHERE summons_id = ?1 ORDER BY position",
  )?;
  stmt
    .query_map(rusqlite::params![summons_id], |row| {
      Ok(RawHistoryEntry {
        action:      row.get(0)?,
        actor:       row.get(1)?,
        recorded_at: row.get(2)?,
        details:     row.get(3)?,
      })
    })?
    .collect()
}

fn summons_exists(conn: &rusqlite::Connection, summons_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM summons WHERE summons_id = ?1",
        rusqlite::params![summons_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

type RawSummons = (SummonsColumns, i64, Vec<RawHistoryEntry>);

fn decode_summons((cols, version, raw_history): RawSummons) -> Result<Summons> {
  let history = raw_history
    .into_iter()
    .map(RawHistoryEntry::into_entry)
    .collect::<Result<Vec<_>>>()?;
  cols.into_summons(version, history)
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SummonsStore impl ───────────────────────────────────────────────────────

impl SummonsStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, summons: &Summons) -> Result<()> {
    let cols    = SummonsColumns::encode(summons)?;
    let version = encode_version(summons.version)?;
    let history = history_rows(&summons.history);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "INSERT INTO summons ({SUMMONS_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)"
          ),
          rusqlite::params![
            cols.summons_id,
            cols.number,
            cols.kind,
            cols.sub_kind,
            cols.urgency,
            cols.priority,
            cols.confidentiality,
            cols.motif,
            cols.details,
            cols.summoned_person,
            cols.assigned_official,
            cols.unit,
            cols.scheduled_date,
            cols.scheduled_time,
            cols.delivery_mode,
            cols.status,
            cols.created_at,
            cols.sent_at,
            cols.honored_at,
            cols.cancel_reason,
            cols.non_honored_reason,
            cols.non_honored_comment,
            version,
          ],
        )?;
        insert_history(&tx, &cols.summons_id, &history)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load(&self, id: Uuid) -> Result<Option<Summons>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSummons> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!("SELECT {SUMMONS_COLUMNS} FROM summons WHERE summons_id = ?1"),
            rusqlite::params![id_str],
            SummonsColumns::from_row,
          )
          .optional()?;
        let Some((cols, version)) = row else {
          return Ok(None);
        };
        let history = read_history(conn, &id_str)?;
        Ok(Some((cols, version, history)))
      })
      .await?;

    raw.map(decode_summons).transpose()
  }

  async fn save(&self, summons: &Summons, expected_version: u64) -> Result<SaveOutcome> {
    let cols     = SummonsColumns::encode(summons)?;
    let expected = encode_version(expected_version)?;
    let next     = encode_version(expected_version + 1)?;
    let history  = history_rows(&summons.history);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE summons SET
             number = ?2, kind = ?3, sub_kind = ?4, urgency = ?5, priority = ?6,
             confidentiality = ?7, motif = ?8, details = ?9, summoned_person = ?10,
             assigned_official = ?11, unit = ?12, scheduled_date = ?13,
             scheduled_time = ?14, delivery_mode = ?15, status = ?16,
             created_at = ?17, sent_at = ?18, honored_at = ?19, cancel_reason = ?20,
             non_honored_reason = ?21, non_honored_comment = ?22, version = ?23
           WHERE summons_id = ?1 AND version = ?24",
          rusqlite::params![
            cols.summons_id,
            cols.number,
            cols.kind,
            cols.sub_kind,
            cols.urgency,
            cols.priority,
            cols.confidentiality,
            cols.motif,
            cols.details,
            cols.summoned_person,
            cols.assigned_official,
            cols.unit,
            cols.scheduled_date,
            cols.scheduled_time,
            cols.delivery_mode,
            cols.status,
            cols.created_at,
            cols.sent_at,
            cols.honored_at,
            cols.cancel_reason,
            cols.non_honored_reason,
            cols.non_honored_comment,
            next,
            expected,
          ],
        )?;
        if changed == 0 {
          // Dropping `tx` rolls back.
          return Ok(SaveOutcome::Stale);
        }

        let stored: i64 = tx.query_row(
          "SELECT COUNT(*) FROM history WHERE summons_id = ?1",
          rusqlite::params![cols.summons_id],
          |r| r.get(0),
        )?;
        let pending: Vec<HistoryRow> = history
          .into_iter()
          .filter(|row| row.position >= stored)
          .collect();
        insert_history(&tx, &cols.summons_id, &pending)?;

        tx.commit()?;
        Ok(SaveOutcome::Saved)
      })
      .await?;

    Ok(outcome)
  }

  async fn history(&self, id: Uuid) -> Result<Option<Vec<HistoryEntry>>> {
    let id_str = encode_uuid(id);

    let raws: Option<Vec<RawHistoryEntry>> = self
      .conn
      .call(move |conn| {
        if !summons_exists(conn, &id_str)? {
          return Ok(None);
        }
        Ok(Some(read_history(conn, &id_str)?))
      })
      .await?;

    raws
      .map(|raws| {
        raws
          .into_iter()
          .map(RawHistoryEntry::into_entry)
          .collect::<Result<Vec<_>>>()
      })
      .transpose()
  }

  async fn list(&self, query: &SummonsQuery) -> Result<Vec<Summons>> {
    let status_str = query.status.map(|s| s.as_str().to_owned());
    let unit       = query.unit.clone();
    let limit_val  = i64::try_from(query.limit.unwrap_or(100)).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawSummons> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if status_str.is_some() {
          conds.push("status = ?1");
        }
        if unit.is_some() {
          conds.push("unit = ?2");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {SUMMONS_COLUMNS} FROM summons
           {where_clause}
           ORDER BY scheduled_date, scheduled_time, number
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              status_str.as_deref(),
              unit.as_deref(),
              limit_val,
              offset_val,
            ],
            SummonsColumns::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (cols, version) in rows {
          let history = read_history(conn, &cols.summons_id)?;
          out.push((cols, version, history));
        }
        Ok(out)
      })
      .await?;

    raws.into_iter().map(decode_summons).collect()
  }

  // ── Delivery outcomes ─────────────────────────────────────────────────────

  async fn record_deliveries(&self, id: Uuid, records: Vec<DeliveryRecord>) -> Result<()> {
    let id_str = encode_uuid(id);
    let rows = records
      .iter()
      .map(|r| -> Result<_> {
        Ok((
          encode_enum(&r.channel)?,
          r.delivered,
          r.error.clone(),
          encode_dt(r.recorded_at),
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO deliveries (summons_id, channel, delivered, error, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (channel, delivered, error, at) in rows {
            stmt.execute(rusqlite::params![id_str, channel, delivered, error, at])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn deliveries(&self, id: Uuid) -> Result<Vec<DeliveryRecord>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawDelivery> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT channel, delivered, error, recorded_at
           FROM deliveries WHERE summons_id = ?1 ORDER BY delivery_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawDelivery {
              channel:     row.get(0)?,
              delivered:   row.get(1)?,
              error:       row.get(2)?,
              recorded_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDelivery::into_record).collect()
  }
}
