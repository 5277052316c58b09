//! Handlers for lifecycle actions. Each returns the updated summons.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/summons/:id/send` | none |
//! | `POST` | `/summons/:id/await-confirmation` | none |
//! | `POST` | `/summons/:id/confirm` | none |
//! | `POST` | `/summons/:id/honor` | `{"comment":"..."}` |
//! | `POST` | `/summons/:id/not-honored` | `{"reason":"JUSTIFIED_ABSENCE","comment":"..."}` |
//! | `POST` | `/summons/:id/reschedule` | `{"date":"2025-12-01","time":"10:00:00","reason":"..."}` |
//! | `POST` | `/summons/:id/cancel` | `{"reason":"..."}` |
//! | `POST` | `/summons/:id/notify` | `{"channels":["SMS","EMAIL"],"message":"..."}` |
//! | `POST` | `/summons/:id/notes` | `{"note":"..."}` |
//!
//! Payload fields are optional at the JSON level so that a missing field is
//! reported as a validation error naming it. `honor` and `cancel` also accept
//! a request without a body.

use std::{collections::BTreeSet, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use summons_core::{
  notify::{Channel, Dispatcher},
  service::SummonsService,
  store::SummonsStore,
  summons::{NonHonoredReason, Summons},
};
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError, extract::Payload};

type Service<S, D> = Arc<SummonsService<S, D>>;

// ─── Delivery progression ─────────────────────────────────────────────────────

/// `POST /summons/:id/send`
pub async fn mark_sent<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.mark_sent(id, actor).await?))
}

/// `POST /summons/:id/await-confirmation`
pub async fn await_confirmation<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.await_confirmation(id, actor).await?))
}

// ─── Outcomes ─────────────────────────────────────────────────────────────────

/// `POST /summons/:id/confirm`
pub async fn confirm<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.confirm_presence(id, actor).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct HonorBody {
  pub comment: Option<String>,
}

/// `POST /summons/:id/honor`
pub async fn honor<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  body: Option<Payload<HonorBody>>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  let Payload(body) = body.unwrap_or_default();
  Ok(Json(svc.mark_honored(id, body.comment, actor).await?))
}

#[derive(Debug, Deserialize)]
pub struct NotHonoredBody {
  pub reason:  Option<NonHonoredReason>,
  pub comment: Option<String>,
}

/// `POST /summons/:id/not-honored`
pub async fn not_honored<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Payload(body): Payload<NotHonoredBody>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(
    svc
      .mark_not_honored(id, body.reason, body.comment, actor)
      .await?,
  ))
}

// ─── Scheduling ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RescheduleBody {
  pub date:   Option<NaiveDate>,
  pub time:   Option<NaiveTime>,
  pub reason: Option<String>,
}

/// `POST /summons/:id/reschedule`
pub async fn reschedule<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Payload(body): Payload<RescheduleBody>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(
    svc
      .reschedule(id, body.date, body.time, body.reason, actor)
      .await?,
  ))
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
  pub reason: Option<String>,
}

/// `POST /summons/:id/cancel`
pub async fn cancel<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  body: Option<Payload<CancelBody>>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  let Payload(body) = body.unwrap_or_default();
  Ok(Json(svc.cancel(id, body.reason, actor).await?))
}

// ─── Communication ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NotifyBody {
  #[serde(default)]
  pub channels: BTreeSet<Channel>,
  pub message:  Option<String>,
}

/// `POST /summons/:id/notify`
pub async fn notify<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Payload(body): Payload<NotifyBody>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(
    svc
      .notify(id, body.channels, body.message, actor)
      .await?,
  ))
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  #[serde(default)]
  pub note: String,
}

/// `POST /summons/:id/notes`
pub async fn add_note<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Payload(body): Payload<NoteBody>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.add_note(id, body.note, actor).await?))
}
