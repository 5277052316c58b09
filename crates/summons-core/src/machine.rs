//! The summons state machine: guards and transitions.
//!
//! [`Summons::apply`] is the only code path that mutates a summons after
//! creation. It checks the guard, validates the payload, and only then
//! touches the record, so a rejected action leaves it untouched.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  history::{HistoryAction, HistoryEntry},
  notify::NotificationRequest,
  summons::{NonHonoredReason, Summons, SummonsStatus, require_text},
};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A mutating request against one summons.
///
/// Payload fields the caller may omit are `Option`s so that a missing value
/// surfaces as [`Error::Validation`] rather than a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
  MarkSent,
  AwaitConfirmation,
  ConfirmPresence,
  MarkHonored {
    comment: Option<String>,
  },
  MarkNotHonored {
    reason:  Option<NonHonoredReason>,
    comment: Option<String>,
  },
  Reschedule {
    date:   Option<NaiveDate>,
    time:   Option<NaiveTime>,
    reason: Option<String>,
  },
  Cancel {
    reason: Option<String>,
  },
  Notify(NotificationRequest),
  AddNote {
    note: String,
  },
}

impl Action {
  /// Stable name used in logs and error messages.
  pub fn name(&self) -> &'static str {
    match self {
      Self::MarkSent => "mark_sent",
      Self::AwaitConfirmation => "await_confirmation",
      Self::ConfirmPresence => "confirm_presence",
      Self::MarkHonored { .. } => "mark_honored",
      Self::MarkNotHonored { .. } => "mark_not_honored",
      Self::Reschedule { .. } => "reschedule",
      Self::Cancel { .. } => "cancel",
      Self::Notify(_) => "notify",
      Self::AddNote { .. } => "add_note",
    }
  }
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// The single rule every closing-sensitive action consults: a summons that is
/// canceled or honored is closed to edits.
///
/// `NotHonored` deliberately passes; a no-show can still be rescheduled,
/// confirmed or canceled.
pub fn is_open(status: SummonsStatus) -> bool {
  match status {
    SummonsStatus::Canceled | SummonsStatus::Honored => false,
    SummonsStatus::Created
    | SummonsStatus::Sent
    | SummonsStatus::PendingConfirmation
    | SummonsStatus::Confirmed
    | SummonsStatus::NotHonored => true,
  }
}

fn guard(action: &Action, status: SummonsStatus) -> Result<()> {
  let allowed = match action {
    Action::MarkSent => status == SummonsStatus::Created,
    Action::AwaitConfirmation => status == SummonsStatus::Sent,
    Action::ConfirmPresence
    | Action::MarkHonored { .. }
    | Action::MarkNotHonored { .. }
    | Action::Reschedule { .. }
    | Action::Cancel { .. } => is_open(status),
    Action::Notify(_) => status != SummonsStatus::Canceled,
    Action::AddNote { .. } => true,
  };
  if allowed {
    Ok(())
  } else {
    Err(Error::InvalidState { action: action.name(), status })
  }
}

/// Payload checks, independent of state.
fn validate(action: &Action) -> Result<()> {
  match action {
    Action::MarkNotHonored { reason: None, .. } => Err(Error::Validation {
      field:   "reason",
      message: "a non-honored reason is required".into(),
    }),
    Action::Reschedule { date, time, reason } => {
      if date.is_none() {
        return Err(missing("date"));
      }
      if time.is_none() {
        return Err(missing("time"));
      }
      require_text("reason", reason.as_deref().unwrap_or_default())
    }
    Action::Notify(request) => request.validate(),
    Action::AddNote { note } => require_text("note", note),
    _ => Ok(()),
  }
}

fn missing(field: &'static str) -> Error {
  Error::Validation { field, message: "is required".into() }
}

/// Check whether `action` would be accepted against `summons` without
/// applying it.
///
/// `notify` validates its payload before consulting the guard, so an empty
/// channel set is a validation failure in every status. Every other action
/// consults the guard first.
pub fn check(summons: &Summons, action: &Action) -> Result<()> {
  match action {
    Action::Notify(_) => {
      validate(action)?;
      guard(action, summons.status)
    }
    _ => {
      guard(action, summons.status)?;
      validate(action)
    }
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

impl Summons {
  /// Apply `action`, appending exactly one history entry on success.
  ///
  /// On error the summons is left exactly as it was.
  pub fn apply(
    &mut self,
    action: Action,
    actor: Option<String>,
    now: DateTime<Utc>,
  ) -> Result<&HistoryEntry> {
    check(self, &action)?;

    let (history_action, details) = match action {
      Action::MarkSent => {
        self.set_status(SummonsStatus::Sent);
        self.sent_at = Some(now);
        (HistoryAction::Sent, None)
      }
      Action::AwaitConfirmation => {
        self.set_status(SummonsStatus::PendingConfirmation);
        (HistoryAction::AwaitingConfirmation, None)
      }
      Action::ConfirmPresence => {
        self.set_status(SummonsStatus::Confirmed);
        (HistoryAction::Confirmed, None)
      }
      Action::MarkHonored { comment } => {
        self.set_status(SummonsStatus::Honored);
        self.honored_at = Some(now);
        (HistoryAction::Honored, non_blank(comment))
      }
      Action::MarkNotHonored { reason, comment } => {
        let Some(reason) = reason else {
          return Err(missing("reason"));
        };
        let comment = non_blank(comment);
        self.set_status(SummonsStatus::NotHonored);
        self.non_honored_reason = Some(reason);
        self.non_honored_comment = comment.clone();
        let details = match comment {
          Some(c) => format!("{reason}: {c}"),
          None => reason.to_string(),
        };
        (HistoryAction::NotHonored, Some(details))
      }
      Action::Reschedule { date, time, reason } => {
        let (Some(date), Some(time)) = (date, time) else {
          return Err(missing("date"));
        };
        let details = format!(
          "{} {} -> {} {}: {}",
          self.scheduled_date.format("%Y-%m-%d"),
          self.scheduled_time.format("%H:%M"),
          date.format("%Y-%m-%d"),
          time.format("%H:%M"),
          reason.unwrap_or_default().trim(),
        );
        self.scheduled_date = date;
        self.scheduled_time = time;
        (HistoryAction::Rescheduled, Some(details))
      }
      Action::Cancel { reason } => {
        let reason = reason.unwrap_or_default();
        self.set_status(SummonsStatus::Canceled);
        self.cancel_reason = Some(reason.clone());
        (HistoryAction::Canceled, Some(reason))
      }
      Action::Notify(request) => {
        (HistoryAction::NotificationSent, Some(request.describe()))
      }
      Action::AddNote { note } => {
        (HistoryAction::NoteAdded, Some(note.trim().to_owned()))
      }
    };

    self
      .history
      .push(HistoryEntry::new(history_action, actor, now, details));
    // Just pushed, so the log is non-empty.
    Ok(&self.history[self.history.len() - 1])
  }

  /// Change status, clearing outcome fields that only make sense in the
  /// status being left.
  fn set_status(&mut self, status: SummonsStatus) {
    if self.status == SummonsStatus::NotHonored && status != SummonsStatus::NotHonored {
      self.non_honored_reason = None;
      self.non_honored_comment = None;
    }
    self.status = status;
  }
}

fn non_blank(text: Option<String>) -> Option<String> {
  text
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
}
