//! The progress projection: a display-only, four-stage view of a summons.
//!
//! Never stored, always derived from a snapshot and an injected "now".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  elapsed::{days_between, days_until, time_ago},
  summons::{Summons, SummonsStatus},
};

/// The four fixed stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Creation,
  Notification,
  Confirmation,
  Audition,
}

impl Stage {
  pub const ALL: [Self; 4] =
    [Self::Creation, Self::Notification, Self::Confirmation, Self::Audition];

  /// 1-based position.
  pub fn ordinal(self) -> u8 {
    match self {
      Self::Creation => 1,
      Self::Notification => 2,
      Self::Confirmation => 3,
      Self::Audition => 4,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
  Completed,
  Current,
  Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStep {
  pub stage:   Stage,
  pub ordinal: u8,
  pub state:   StepState,
  /// Relative-time annotation, present only when the stage has a timestamp.
  pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressView {
  pub current_step: u8,
  pub label:        String,
  pub steps:        Vec<ProgressStep>,
}

/// Project `summons` as of `now`.
///
/// `NotHonored` and `Canceled` have no stage of their own and fall back to the
/// creation stage.
pub fn project(summons: &Summons, now: DateTime<Utc>) -> ProgressView {
  let today = now.date_naive();

  let (current_step, label) = match summons.status {
    SummonsStatus::Sent => (2, "Notification sent".to_owned()),
    SummonsStatus::PendingConfirmation | SummonsStatus::Confirmed => {
      let days = days_between(today, summons.scheduled_date);
      let label = if days > 0 {
        format!("Rendezvous {}", days_until(summons.scheduled_date, today))
      } else if days == 0 {
        "Rendezvous today".to_owned()
      } else {
        "Awaiting confirmation".to_owned()
      };
      (3, label)
    }
    SummonsStatus::Honored => (4, "Audition completed".to_owned()),
    SummonsStatus::Created
    | SummonsStatus::NotHonored
    | SummonsStatus::Canceled => (1, "Created".to_owned()),
  };

  let steps = Stage::ALL
    .into_iter()
    .map(|stage| {
      let ordinal = stage.ordinal();
      let state = if ordinal < current_step {
        StepState::Completed
      } else if ordinal == current_step {
        StepState::Current
      } else {
        StepState::Upcoming
      };
      let caption = match stage {
        Stage::Creation => Some(time_ago(Some(summons.created_at), now)),
        Stage::Notification => summons.sent_at.map(|at| time_ago(Some(at), now)),
        Stage::Confirmation => (current_step >= 3)
          .then(|| days_until(summons.scheduled_date, today)),
        Stage::Audition => summons.honored_at.map(|at| time_ago(Some(at), now)),
      };
      ProgressStep { stage, ordinal, state, caption }
    })
    .collect();

  ProgressView { current_step, label, steps }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, NaiveTime, TimeZone};

  use super::*;
  use crate::summons::{NewSummons, SummonedPerson};

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 11, 20, 9, 30, 0).unwrap() }

  fn fresh(created_at: DateTime<Utc>) -> Summons {
    NewSummons {
      number:            "CONV-2025-0007".into(),
      kind:              "audition".into(),
      sub_kind:          None,
      urgency:           None,
      priority:          None,
      confidentiality:   None,
      motif:             "traffic incident".into(),
      details:           Default::default(),
      summoned_person:   SummonedPerson {
        name:    "Moussa Fall".into(),
        quality: None,
        address: None,
        phone:   None,
        email:   None,
      },
      assigned_official: None,
      unit:              None,
      scheduled_date:    now().date_naive() + Duration::days(10),
      scheduled_time:    NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
      delivery_mode:     Default::default(),
    }
    .into_summons(uuid::Uuid::new_v4(), created_at)
  }

  fn states(view: &ProgressView) -> Vec<StepState> {
    view.steps.iter().map(|s| s.state).collect()
  }

  #[test]
  fn new_summons_is_at_creation() {
    let view = project(&fresh(now() - Duration::seconds(5)), now());
    assert_eq!(view.current_step, 1);
    assert_eq!(view.label, "Created");
    assert_eq!(view.steps[0].caption.as_deref(), Some("a few seconds ago"));
    assert_eq!(
      states(&view),
      [StepState::Current, StepState::Upcoming, StepState::Upcoming, StepState::Upcoming]
    );
    assert!(view.steps[1..].iter().all(|s| s.caption.is_none()));
  }

  #[test]
  fn pending_confirmation_three_days_out() {
    let mut s = fresh(now() - Duration::days(2));
    s.status = SummonsStatus::PendingConfirmation;
    s.sent_at = Some(now() - Duration::hours(5));
    s.scheduled_date = now().date_naive() + Duration::days(3);

    let view = project(&s, now());
    assert_eq!(view.current_step, 3);
    assert_eq!(view.label, "Rendezvous in 3 days");
    assert_eq!(
      states(&view),
      [StepState::Completed, StepState::Completed, StepState::Current, StepState::Upcoming]
    );
    assert_eq!(view.steps[0].caption.as_deref(), Some("2 days ago"));
    assert_eq!(view.steps[1].caption.as_deref(), Some("5 hours ago"));
    assert_eq!(view.steps[2].caption.as_deref(), Some("in 3 days"));
  }

  #[test]
  fn rendezvous_today_and_past() {
    let mut s = fresh(now() - Duration::days(7));
    s.status = SummonsStatus::Confirmed;

    s.scheduled_date = now().date_naive();
    assert_eq!(project(&s, now()).label, "Rendezvous today");

    s.scheduled_date = now().date_naive() - Duration::days(1);
    let view = project(&s, now());
    assert_eq!(view.label, "Awaiting confirmation");
    assert_eq!(view.steps[2].caption.as_deref(), Some("today"));

    s.scheduled_date = now().date_naive() + Duration::days(1);
    assert_eq!(project(&s, now()).label, "Rendezvous in 1 day");
  }

  #[test]
  fn honored_completes_everything_before_audition() {
    let mut s = fresh(now() - Duration::days(7));
    s.status = SummonsStatus::Honored;
    s.honored_at = Some(now() - Duration::minutes(45));

    let view = project(&s, now());
    assert_eq!(view.current_step, 4);
    assert_eq!(view.label, "Audition completed");
    assert_eq!(view.steps[3].state, StepState::Current);
    assert_eq!(view.steps[3].caption.as_deref(), Some("45 minutes ago"));
  }

  #[test]
  fn closed_outcomes_fall_back_to_creation() {
    for status in [SummonsStatus::NotHonored, SummonsStatus::Canceled] {
      let mut s = fresh(now() - Duration::days(1));
      s.status = status;
      let view = project(&s, now());
      assert_eq!(view.current_step, 1);
      assert_eq!(view.label, "Created");
      assert!(view.steps[2].caption.is_none());
    }
  }

  #[test]
  fn projection_is_pure() {
    let mut s = fresh(now() - Duration::days(3));
    s.status = SummonsStatus::Sent;
    s.sent_at = Some(now() - Duration::days(1));
    let a = serde_json::to_vec(&project(&s, now())).unwrap();
    let b = serde_json::to_vec(&project(&s, now())).unwrap();
    assert_eq!(a, b);
  }
}
