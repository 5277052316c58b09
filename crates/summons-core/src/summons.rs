//! Summons: the aggregate root tracked from creation to resolution.
//!
//! A summons is only ever mutated through [`crate::machine`]. Terminal records
//! (honored, not honored, canceled) are never deleted; they are retained for
//! audit.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, history::HistoryEntry};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a summons stands in its lifecycle.
///
/// The happy path is `Created → Sent → PendingConfirmation → Confirmed →
/// Honored`. `NotHonored` and `Canceled` are alternate outcomes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummonsStatus {
  #[default]
  Created,
  Sent,
  PendingConfirmation,
  Confirmed,
  Honored,
  NotHonored,
  Canceled,
}

impl SummonsStatus {
  pub const ALL: [Self; 7] = [
    Self::Created,
    Self::Sent,
    Self::PendingConfirmation,
    Self::Confirmed,
    Self::Honored,
    Self::NotHonored,
    Self::Canceled,
  ];

  /// The discriminant stored in the `status` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "CREATED",
      Self::Sent => "SENT",
      Self::PendingConfirmation => "PENDING_CONFIRMATION",
      Self::Confirmed => "CONFIRMED",
      Self::Honored => "HONORED",
      Self::NotHonored => "NOT_HONORED",
      Self::Canceled => "CANCELED",
    }
  }
}

impl fmt::Display for SummonsStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SummonsStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::UnknownDiscriminant {
        kind:  "summons status",
        value: s.to_owned(),
      })
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
  Normal,
  Urgent,
  VeryUrgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
  Low,
  Medium,
  High,
  Critical,
}

/// How the summons reaches the summoned person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
  #[default]
  HandDelivery,
  RegisteredMail,
  Email,
  Sms,
  Phone,
}

/// Why a summoned person did not show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NonHonoredReason {
  UnjustifiedAbsence,
  JustifiedAbsence,
  ExcessiveDelay,
  Other,
}

impl NonHonoredReason {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::UnjustifiedAbsence => "UNJUSTIFIED_ABSENCE",
      Self::JustifiedAbsence => "JUSTIFIED_ABSENCE",
      Self::ExcessiveDelay => "EXCESSIVE_DELAY",
      Self::Other => "OTHER",
    }
  }
}

impl fmt::Display for NonHonoredReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Parties ─────────────────────────────────────────────────────────────────

/// The person called to appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonedPerson {
  pub name:    String,
  /// Role in the case, e.g. "witness", "complainant".
  pub quality: Option<String>,
  pub address: Option<String>,
  pub phone:   Option<String>,
  pub email:   Option<String>,
}

/// Optional structured context for the hearing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDetails {
  pub case_reference:        Option<String>,
  pub precise_object:        Option<String>,
  pub preparatory_questions: Option<String>,
  pub documents_requested:   Option<String>,
  pub items_to_bring:        Option<String>,
  pub observations:          Option<String>,
}

// ─── Summons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summons {
  pub summons_id:          Uuid,
  /// Display reference, e.g. "CONV-2025-0042".
  pub number:              String,
  #[serde(rename = "type")]
  pub kind:                String,
  pub sub_kind:            Option<String>,
  pub urgency:             Option<Urgency>,
  pub priority:            Option<Priority>,
  pub confidentiality:     Option<String>,
  pub motif:               String,
  #[serde(default)]
  pub details:             CaseDetails,
  pub summoned_person:     SummonedPerson,
  pub assigned_official:   Option<String>,
  /// Station the summons belongs to.
  pub unit:                Option<String>,
  /// Reflects the most recent reschedule only; earlier values live in history.
  pub scheduled_date:      NaiveDate,
  pub scheduled_time:      NaiveTime,
  pub delivery_mode:       DeliveryMode,
  pub status:              SummonsStatus,
  pub created_at:          DateTime<Utc>,
  pub sent_at:             Option<DateTime<Utc>>,
  pub honored_at:          Option<DateTime<Utc>>,
  /// Set if and only if `status == Canceled`.
  pub cancel_reason:       Option<String>,
  /// Set if and only if `status == NotHonored`.
  pub non_honored_reason:  Option<NonHonoredReason>,
  pub non_honored_comment: Option<String>,
  /// Optimistic-lock counter, bumped by the store on every successful save.
  pub version:             u64,
  /// Append-only audit log, in insertion order.
  pub history:             Vec<HistoryEntry>,
}

// ─── NewSummons ──────────────────────────────────────────────────────────────

/// Input to [`crate::service::SummonsService::create`].
///
/// Identity, status, timestamps and history are assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSummons {
  pub number:            String,
  #[serde(rename = "type")]
  pub kind:              String,
  pub sub_kind:          Option<String>,
  pub urgency:           Option<Urgency>,
  pub priority:          Option<Priority>,
  pub confidentiality:   Option<String>,
  pub motif:             String,
  #[serde(default)]
  pub details:           CaseDetails,
  pub summoned_person:   SummonedPerson,
  pub assigned_official: Option<String>,
  pub unit:              Option<String>,
  pub scheduled_date:    NaiveDate,
  pub scheduled_time:    NaiveTime,
  #[serde(default)]
  pub delivery_mode:     DeliveryMode,
}

impl NewSummons {
  /// Check the fields intake must always provide.
  pub fn validate(&self) -> Result<()> {
    require_text("number", &self.number)?;
    require_text("type", &self.kind)?;
    require_text("motif", &self.motif)?;
    require_text("summoned_person.name", &self.summoned_person.name)?;
    Ok(())
  }

  /// Build the `Created` aggregate. History is left empty; the caller appends
  /// the creation entry.
  pub(crate) fn into_summons(self, summons_id: Uuid, now: DateTime<Utc>) -> Summons {
    Summons {
      summons_id,
      number: self.number,
      kind: self.kind,
      sub_kind: self.sub_kind,
      urgency: self.urgency,
      priority: self.priority,
      confidentiality: self.confidentiality,
      motif: self.motif,
      details: self.details,
      summoned_person: self.summoned_person,
      assigned_official: self.assigned_official,
      unit: self.unit,
      scheduled_date: self.scheduled_date,
      scheduled_time: self.scheduled_time,
      delivery_mode: self.delivery_mode,
      status: SummonsStatus::Created,
      created_at: now,
      sent_at: None,
      honored_at: None,
      cancel_reason: None,
      non_honored_reason: None,
      non_honored_comment: None,
      version: 0,
      history: Vec::new(),
    }
  }
}

/// Reject a missing or whitespace-only text field.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation {
      field,
      message: "must not be empty".into(),
    });
  }
  Ok(())
}
