//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`
//! and times as `HH:MM:SS`. Closed enumerations are stored as their
//! SCREAMING_SNAKE_CASE discriminants. Nested records (person, case details)
//! are stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use summons_core::{
  history::{HistoryAction, HistoryEntry},
  notify::{Channel, DeliveryRecord},
  summons::{Summons, SummonsStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Temporal ─────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ─────────────────────────────────────────────────────────────

/// Store a unit-variant enum as its bare serde tag.
pub fn encode_enum<T: Serialize>(value: &T) -> Result<String> {
  match serde_json::to_value(value)? {
    serde_json::Value::String(s) => Ok(s),
    other => Ok(other.to_string()),
  }
}

pub fn decode_enum<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_value(serde_json::Value::String(s.to_owned()))?)
}

// ─── Version ──────────────────────────────────────────────────────────────────

pub fn encode_version(v: u64) -> Result<i64> {
  i64::try_from(v).map_err(|_| Error::VersionOverflow(v))
}

pub fn decode_version(v: i64) -> u64 { v.max(0) as u64 }

// ─── Row types ────────────────────────────────────────────────────────────────

/// Column values for one `summons` row, ready to bind.
pub struct SummonsColumns {
  pub summons_id:          String,
  pub number:              String,
  pub kind:                String,
  pub sub_kind:            Option<String>,
  pub urgency:             Option<String>,
  pub priority:            Option<String>,
  pub confidentiality:     Option<String>,
  pub motif:               String,
  pub details:             String,
  pub summoned_person:     String,
  pub assigned_official:   Option<String>,
  pub unit:                Option<String>,
  pub scheduled_date:      String,
  pub scheduled_time:      String,
  pub delivery_mode:       String,
  pub status:              String,
  pub created_at:          String,
  pub sent_at:             Option<String>,
  pub honored_at:          Option<String>,
  pub cancel_reason:       Option<String>,
  pub non_honored_reason:  Option<String>,
  pub non_honored_comment: Option<String>,
}

/// Column list matching the field order of [`SummonsColumns`].
pub const SUMMONS_COLUMNS: &str = "summons_id, number, kind, sub_kind, urgency, priority,
  confidentiality, motif, details, summoned_person, assigned_official, unit,
  scheduled_date, scheduled_time, delivery_mode, status, created_at, sent_at,
  honored_at, cancel_reason, non_honored_reason, non_honored_comment, version";

impl SummonsColumns {
  pub fn encode(s: &Summons) -> Result<Self> {
    Ok(Self {
      summons_id:          encode_uuid(s.summons_id),
      number:              s.number.clone(),
      kind:                s.kind.clone(),
      sub_kind:            s.sub_kind.clone(),
      urgency:             s.urgency.as_ref().map(encode_enum).transpose()?,
      priority:            s.priority.as_ref().map(encode_enum).transpose()?,
      confidentiality:     s.confidentiality.clone(),
      motif:               s.motif.clone(),
      details:             serde_json::to_string(&s.details)?,
      summoned_person:     serde_json::to_string(&s.summoned_person)?,
      assigned_official:   s.assigned_official.clone(),
      unit:                s.unit.clone(),
      scheduled_date:      encode_date(s.scheduled_date),
      scheduled_time:      encode_time(s.scheduled_time),
      delivery_mode:       encode_enum(&s.delivery_mode)?,
      status:              s.status.as_str().to_owned(),
      created_at:          encode_dt(s.created_at),
      sent_at:             s.sent_at.map(encode_dt),
      honored_at:          s.honored_at.map(encode_dt),
      cancel_reason:       s.cancel_reason.clone(),
      non_honored_reason:  s.non_honored_reason.as_ref().map(encode_enum).transpose()?,
      non_honored_comment: s.non_honored_comment.clone(),
    })
  }

  /// Read the columns selected by [`SUMMONS_COLUMNS`] plus the trailing
  /// version.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Self, i64)> {
    Ok((
      Self {
        summons_id:          row.get(0)?,
        number:              row.get(1)?,
        kind:                row.get(2)?,
        sub_kind:            row.get(3)?,
        urgency:             row.get(4)?,
        priority:            row.get(5)?,
        confidentiality:     row.get(6)?,
        motif:               row.get(7)?,
        details:             row.get(8)?,
        summoned_person:     row.get(9)?,
        assigned_official:   row.get(10)?,
        unit:                row.get(11)?,
        scheduled_date:      row.get(12)?,
        scheduled_time:      row.get(13)?,
        delivery_mode:       row.get(14)?,
        status:              row.get(15)?,
        created_at:          row.get(16)?,
        sent_at:             row.get(17)?,
        honored_at:          row.get(18)?,
        cancel_reason:       row.get(19)?,
        non_honored_reason:  row.get(20)?,
        non_honored_comment: row.get(21)?,
      },
      row.get(22)?,
    ))
  }

  pub fn into_summons(self, version: i64, history: Vec<HistoryEntry>) -> Result<Summons> {
    Ok(Summons {
      summons_id: decode_uuid(&self.summons_id)?,
      number: self.number,
      kind: self.kind,
      sub_kind: self.sub_kind,
      urgency: self.urgency.as_deref().map(decode_enum).transpose()?,
      priority: self.priority.as_deref().map(decode_enum).transpose()?,
      confidentiality: self.confidentiality,
      motif: self.motif,
      details: serde_json::from_str(&self.details)?,
      summoned_person: serde_json::from_str(&self.summoned_person)?,
      assigned_official: self.assigned_official,
      unit: self.unit,
      scheduled_date: decode_date(&self.scheduled_date)?,
      scheduled_time: decode_time(&self.scheduled_time)?,
      delivery_mode: decode_enum(&self.delivery_mode)?,
      status: self.status.parse::<SummonsStatus>()?,
      created_at: decode_dt(&self.created_at)?,
      sent_at: self.sent_at.as_deref().map(decode_dt).transpose()?,
      honored_at: self.honored_at.as_deref().map(decode_dt).transpose()?,
      cancel_reason: self.cancel_reason,
      non_honored_reason: self
        .non_honored_reason
        .as_deref()
        .map(decode_enum)
        .transpose()?,
      non_honored_comment: self.non_honored_comment,
      version: decode_version(version),
      history,
    })
  }
}

/// Raw strings read directly from a `history` row.
pub struct RawHistoryEntry {
  pub action:      String,
  pub actor:       Option<String>,
  pub recorded_at: String,
  pub details:     Option<String>,
}

impl RawHistoryEntry {
  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      action:    self.action.parse::<HistoryAction>()?,
      actor:     self.actor,
      timestamp: decode_dt(&self.recorded_at)?,
      details:   self.details,
    })
  }
}

/// Raw values read directly from a `deliveries` row.
pub struct RawDelivery {
  pub channel:     String,
  pub delivered:   bool,
  pub error:       Option<String>,
  pub recorded_at: String,
}

impl RawDelivery {
  pub fn into_record(self) -> Result<DeliveryRecord> {
    Ok(DeliveryRecord {
      channel:     self.channel.parse::<Channel>()?,
      delivered:   self.delivered,
      error:       self.error,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
