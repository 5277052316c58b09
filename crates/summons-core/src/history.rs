//! History entries: the append-only audit log of a summons.
//!
//! Every mutating action appends exactly one entry. Entries are never
//! updated, reordered or removed.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::{Error, Result};

/// What happened to the summons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
  Created,
  Sent,
  AwaitingConfirmation,
  Confirmed,
  Honored,
  NotHonored,
  Rescheduled,
  Canceled,
  NotificationSent,
  NoteAdded,
}

impl HistoryAction {
  pub const ALL: [Self; 10] = [
    Self::Created,
    Self::Sent,
    Self::AwaitingConfirmation,
    Self::Confirmed,
    Self::Honored,
    Self::NotHonored,
    Self::Rescheduled,
    Self::Canceled,
    Self::NotificationSent,
    Self::NoteAdded,
  ];

  /// The discriminant stored in the `action` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Sent => "sent",
      Self::AwaitingConfirmation => "awaiting_confirmation",
      Self::Confirmed => "confirmed",
      Self::Honored => "honored",
      Self::NotHonored => "not_honored",
      Self::Rescheduled => "rescheduled",
      Self::Canceled => "canceled",
      Self::NotificationSent => "notification_sent",
      Self::NoteAdded => "note_added",
    }
  }

  /// Human-readable label shown in the audit trail.
  pub fn label(self) -> &'static str {
    match self {
      Self::Created => "Created",
      Self::Sent => "Sent",
      Self::AwaitingConfirmation => "Awaiting confirmation",
      Self::Confirmed => "Confirmed",
      Self::Honored => "Honored",
      Self::NotHonored => "Not honored",
      Self::Rescheduled => "Rescheduled",
      Self::Canceled => "Canceled",
      Self::NotificationSent => "Notification sent",
      Self::NoteAdded => "Note added",
    }
  }
}

impl fmt::Display for HistoryAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for HistoryAction {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|action| action.discriminant() == s)
      .ok_or_else(|| Error::UnknownDiscriminant {
        kind:  "history action",
        value: s.to_owned(),
      })
  }
}

/// One immutable audit record.
///
/// Serialises with an extra `label` field carrying the action's display text;
/// it is ignored on deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
  pub action:    HistoryAction,
  /// Name of the official who acted, when known.
  pub actor:     Option<String>,
  pub timestamp: DateTime<Utc>,
  pub details:   Option<String>,
}

impl HistoryEntry {
  pub fn new(
    action: HistoryAction,
    actor: Option<String>,
    timestamp: DateTime<Utc>,
    details: Option<String>,
  ) -> Self {
    Self { action, actor, timestamp, details }
  }
}

impl Serialize for HistoryEntry {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut entry = serializer.serialize_struct("HistoryEntry", 5)?;
    entry.serialize_field("action", &self.action)?;
    entry.serialize_field("label", self.action.label())?;
    entry.serialize_field("actor", &self.actor)?;
    entry.serialize_field("timestamp", &self.timestamp)?;
    entry.serialize_field("details", &self.details)?;
    entry.end()
  }
}

/// Newest-first view, the order audit screens display.
pub fn reverse_chronological(history: &[HistoryEntry]) -> Vec<&HistoryEntry> {
  history.iter().rev().collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn discriminants_parse_back() {
    for action in HistoryAction::ALL {
      assert_eq!(action.discriminant().parse::<HistoryAction>().unwrap(), action);
    }
  }

  #[test]
  fn serialised_entry_carries_its_label() {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let entry = HistoryEntry::new(
      HistoryAction::NoteAdded,
      Some("Adj. Fall".into()),
      at,
      Some("called back".into()),
    );

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["action"], "note_added");
    assert_eq!(json["label"], "Note added");

    let back: HistoryEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
  }
}
