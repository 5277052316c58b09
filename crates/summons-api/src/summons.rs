//! Handlers for reading and registering summons.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/summons` | Optional `status`, `unit`, `limit`, `offset` |
//! | `POST` | `/summons` | Body: [`NewSummons`]; returns 201 + stored summons |
//! | `GET`  | `/summons/:id` | 404 if not found |
//! | `GET`  | `/summons/:id/history` | Optional `newest_first=true` |
//! | `GET`  | `/summons/:id/progress` | Four-stage progress view |
//! | `GET`  | `/summons/:id/deliveries` | Per-channel notification outcomes |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use summons_core::{
  history::{HistoryEntry, reverse_chronological},
  notify::{DeliveryRecord, Dispatcher},
  progress::ProgressView,
  service::SummonsService,
  store::{SummonsQuery, SummonsStore},
  summons::{NewSummons, Summons, SummonsStatus},
};
use uuid::Uuid;

use crate::{
  actor::Actor,
  error::ApiError,
  extract::{Params, Payload},
};

type Service<S, D> = Arc<SummonsService<S, D>>;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub status: Option<SummonsStatus>,
  pub unit:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /summons[?status=...][&unit=...][&limit=...][&offset=...]`
pub async fn list<S, D>(
  State(svc): State<Service<S, D>>,
  Params(params): Params<ListParams>,
) -> Result<Json<Vec<Summons>>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  let query = SummonsQuery {
    status: params.status,
    unit:   params.unit,
    limit:  params.limit,
    offset: params.offset,
  };
  Ok(Json(svc.list(&query).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /summons`, returning 201 + the stored [`Summons`].
pub async fn create<S, D>(
  State(svc): State<Service<S, D>>,
  Actor(actor): Actor,
  Payload(body): Payload<NewSummons>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  let summons = svc.create(body, actor).await?;
  Ok((StatusCode::CREATED, Json(summons)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /summons/:id`
pub async fn get_one<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Summons>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.get(id).await?))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct HistoryParams {
  /// Return the newest entry first, as audit screens display it.
  #[serde(default)]
  pub newest_first: bool,
}

/// `GET /summons/:id/history[?newest_first=true]`
pub async fn history<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
  Params(params): Params<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  let entries = svc.history(id).await?;
  if params.newest_first {
    Ok(Json(reverse_chronological(&entries).into_iter().cloned().collect()))
  } else {
    Ok(Json(entries))
  }
}

// ─── Progress ─────────────────────────────────────────────────────────────────

/// `GET /summons/:id/progress`
pub async fn progress<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProgressView>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.progress(id, Utc::now()).await?))
}

// ─── Deliveries ───────────────────────────────────────────────────────────────

/// `GET /summons/:id/deliveries`
pub async fn deliveries<S, D>(
  State(svc): State<Service<S, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<DeliveryRecord>>, ApiError>
where
  S: SummonsStore,
  D: Dispatcher,
{
  Ok(Json(svc.deliveries(id).await?))
}
