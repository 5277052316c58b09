//! [`SummonsService`]: the single authority permitted to mutate a summons.
//!
//! Every mutating operation is one read-modify-write cycle: load, check the
//! guard, validate, mutate, append one history entry, save against the loaded
//! version. A lost race reloads and reapplies up to
//! [`ServiceConfig::max_attempts`] times, then surfaces
//! [`Error::ConcurrentModification`].

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  history::{HistoryAction, HistoryEntry},
  machine::Action,
  notify::{Channel, ChannelOutcome, DeliveryRecord, Dispatcher, NotificationRequest},
  progress::{ProgressView, project},
  store::{SaveOutcome, SummonsQuery, SummonsStore},
  summons::{NewSummons, NonHonoredReason, Summons},
};

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// How many times a mutating operation is attempted before a lost race is
  /// reported to the caller. `1` disables automatic retry.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
}

fn default_max_attempts() -> u32 { 3 }

impl Default for ServiceConfig {
  fn default() -> Self { Self { max_attempts: default_max_attempts() } }
}

pub struct SummonsService<S, D> {
  store:      S,
  dispatcher: D,
  config:     ServiceConfig,
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

impl<S, D> SummonsService<S, D>
where
  S: SummonsStore,
  D: Dispatcher,
{
  pub fn new(store: S, dispatcher: D, config: ServiceConfig) -> Self {
    Self { store, dispatcher, config }
  }

  pub fn store(&self) -> &S { &self.store }

  // ── Intake ────────────────────────────────────────────────────────────

  /// Register a new summons in `Created` status with its creation entry.
  pub async fn create(&self, input: NewSummons, actor: Option<String>) -> Result<Summons> {
    input.validate()?;

    let now = Utc::now();
    let mut summons = input.into_summons(Uuid::new_v4(), now);
    summons
      .history
      .push(HistoryEntry::new(HistoryAction::Created, actor, now, None));

    self.store.insert(&summons).await.map_err(store_err)?;
    tracing::info!(summons_id = %summons.summons_id, number = %summons.number, "summons created");
    Ok(summons)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get(&self, id: Uuid) -> Result<Summons> {
    self
      .store
      .load(id)
      .await
      .map_err(store_err)?
      .ok_or(Error::NotFound(id))
  }

  /// The audit log in insertion order.
  pub async fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>> {
    self
      .store
      .history(id)
      .await
      .map_err(store_err)?
      .ok_or(Error::NotFound(id))
  }

  pub async fn list(&self, query: &SummonsQuery) -> Result<Vec<Summons>> {
    self.store.list(query).await.map_err(store_err)
  }

  pub async fn deliveries(&self, id: Uuid) -> Result<Vec<DeliveryRecord>> {
    // Distinguish "no deliveries yet" from "no such summons".
    self.get(id).await?;
    self.store.deliveries(id).await.map_err(store_err)
  }

  /// Load and project in one step.
  pub async fn progress(&self, id: Uuid, now: DateTime<Utc>) -> Result<ProgressView> {
    Ok(project(&self.get(id).await?, now))
  }

  // ── Actions ───────────────────────────────────────────────────────────

  pub async fn mark_sent(&self, id: Uuid, actor: Option<String>) -> Result<Summons> {
    self.execute(id, Action::MarkSent, actor).await
  }

  pub async fn await_confirmation(
    &self,
    id: Uuid,
    actor: Option<String>,
  ) -> Result<Summons> {
    self.execute(id, Action::AwaitConfirmation, actor).await
  }

  pub async fn confirm_presence(&self, id: Uuid, actor: Option<String>) -> Result<Summons> {
    self.execute(id, Action::ConfirmPresence, actor).await
  }

  pub async fn mark_honored(
    &self,
    id: Uuid,
    comment: Option<String>,
    actor: Option<String>,
  ) -> Result<Summons> {
    self.execute(id, Action::MarkHonored { comment }, actor).await
  }

  pub async fn mark_not_honored(
    &self,
    id: Uuid,
    reason: Option<NonHonoredReason>,
    comment: Option<String>,
    actor: Option<String>,
  ) -> Result<Summons> {
    self
      .execute(id, Action::MarkNotHonored { reason, comment }, actor)
      .await
  }

  pub async fn reschedule(
    &self,
    id: Uuid,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    reason: Option<String>,
    actor: Option<String>,
  ) -> Result<Summons> {
    self
      .execute(id, Action::Reschedule { date, time, reason }, actor)
      .await
  }

  pub async fn cancel(
    &self,
    id: Uuid,
    reason: Option<String>,
    actor: Option<String>,
  ) -> Result<Summons> {
    self.execute(id, Action::Cancel { reason }, actor).await
  }

  /// Record the notification request, then hand it to the dispatcher.
  ///
  /// The history entry is saved before dispatch, so a transport failure never
  /// affects the aggregate. Per-channel outcomes are stored separately.
  pub async fn notify(
    &self,
    id: Uuid,
    channels: BTreeSet<Channel>,
    message: Option<String>,
    actor: Option<String>,
  ) -> Result<Summons> {
    self
      .execute(id, Action::Notify(NotificationRequest { channels, message }), actor)
      .await
  }

  pub async fn add_note(
    &self,
    id: Uuid,
    note: String,
    actor: Option<String>,
  ) -> Result<Summons> {
    self.execute(id, Action::AddNote { note }, actor).await
  }

  /// Run one guarded read-modify-write cycle for `action`.
  pub async fn execute(
    &self,
    id: Uuid,
    action: Action,
    actor: Option<String>,
  ) -> Result<Summons> {
    let attempts = self.config.max_attempts.max(1);

    for attempt in 1..=attempts {
      let mut summons = self.get(id).await?;
      let expected = summons.version;

      if let Err(e) = summons.apply(action.clone(), actor.clone(), Utc::now()) {
        tracing::debug!(summons_id = %id, action = action.name(), error = %e, "action rejected");
        return Err(e);
      }

      match self.store.save(&summons, expected).await.map_err(store_err)? {
        SaveOutcome::Saved => {
          summons.version = expected + 1;
          tracing::info!(
            summons_id = %id,
            action = action.name(),
            status = %summons.status,
            "action applied"
          );
          if let Action::Notify(request) = &action {
            self.dispatch(&summons, request).await;
          }
          return Ok(summons);
        }
        SaveOutcome::Stale => {
          tracing::debug!(summons_id = %id, action = action.name(), attempt, "stale write, reloading");
        }
      }
    }

    tracing::warn!(summons_id = %id, action = action.name(), attempts, "gave up after concurrent modifications");
    Err(Error::ConcurrentModification(id))
  }

  /// Best-effort delivery; failures are logged and recorded, never returned.
  async fn dispatch(&self, summons: &Summons, request: &NotificationRequest) {
    let mut outcomes = self
      .dispatcher
      .send(request, &summons.summoned_person)
      .await;

    for channel in &request.channels {
      if !outcomes.iter().any(|o| o.channel == *channel) {
        outcomes.push(ChannelOutcome::failed(*channel, "no outcome reported"));
      }
    }

    for outcome in &outcomes {
      if let Some(error) = &outcome.error {
        tracing::warn!(
          summons_id = %summons.summons_id,
          channel = %outcome.channel,
          error = %error,
          "delivery failed"
        );
      }
    }

    let now = Utc::now();
    let records = outcomes
      .into_iter()
      .map(|o| DeliveryRecord::from_outcome(o, now))
      .collect();

    if let Err(e) = self.store.record_deliveries(summons.summons_id, records).await {
      tracing::warn!(summons_id = %summons.summons_id, error = %e, "could not record delivery outcomes");
    }
  }
}
