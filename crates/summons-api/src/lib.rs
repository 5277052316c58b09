//! JSON REST API for summons tracking.
//!
//! Exposes an axum [`Router`] backed by a [`SummonsService`] over any
//! [`SummonsStore`] and [`Dispatcher`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", summons_api::api_router(service.clone()))
//! ```

pub mod actions;
pub mod actor;
pub mod error;
pub mod extract;
pub mod summons;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use summons_core::{notify::Dispatcher, service::SummonsService, store::SummonsStore};

pub use actor::{ACTOR_HEADER, Actor};
pub use error::ApiError;
pub use extract::{Params, Payload};

/// Build the API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D>(service: Arc<SummonsService<S, D>>) -> Router<()>
where
  S: SummonsStore + 'static,
  D: Dispatcher + 'static,
{
  Router::new()
    // Intake and reads
    .route("/summons", get(summons::list::<S, D>).post(summons::create::<S, D>))
    .route("/summons/{id}", get(summons::get_one::<S, D>))
    .route("/summons/{id}/history", get(summons::history::<S, D>))
    .route("/summons/{id}/progress", get(summons::progress::<S, D>))
    .route("/summons/{id}/deliveries", get(summons::deliveries::<S, D>))
    // Actions
    .route("/summons/{id}/send", post(actions::mark_sent::<S, D>))
    .route("/summons/{id}/await-confirmation", post(actions::await_confirmation::<S, D>))
    .route("/summons/{id}/confirm", post(actions::confirm::<S, D>))
    .route("/summons/{id}/honor", post(actions::honor::<S, D>))
    .route("/summons/{id}/not-honored", post(actions::not_honored::<S, D>))
    .route("/summons/{id}/reschedule", post(actions::reschedule::<S, D>))
    .route("/summons/{id}/cancel", post(actions::cancel::<S, D>))
    .route("/summons/{id}/notify", post(actions::notify::<S, D>))
    .route("/summons/{id}/notes", post(actions::add_note::<S, D>))
    .with_state(service)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use summons_core::{
    notify::{ChannelOutcome, NotificationRequest},
    service::ServiceConfig,
    summons::SummonedPerson,
  };
  use summons_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  /// Fails EMAIL, delivers everything else.
  struct NoEmail;

  impl Dispatcher for NoEmail {
    async fn send(
      &self,
      request: &NotificationRequest,
      _recipient: &SummonedPerson,
    ) -> Vec<ChannelOutcome> {
      request
        .channels
        .iter()
        .map(|c| match c {
          summons_core::notify::Channel::Email => ChannelOutcome::failed(*c, "mailbox full"),
          other => ChannelOutcome::delivered(*other),
        })
        .collect()
    }
  }

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(SummonsService::new(store, NoEmail, ServiceConfig::default())))
  }

  async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(ACTOR_HEADER, "Lt. Gueye");
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn intake() -> Value {
    json!({
      "number": "CONV-2025-0500",
      "type": "audition",
      "urgency": "VERY_URGENT",
      "motif": "hit and run",
      "summoned_person": {
        "name": "Aminata Ndiaye",
        "quality": "witness",
        "phone": "+221 77 111 22 33"
      },
      "unit": "Commissariat Parcelles",
      "scheduled_date": "2030-03-04",
      "scheduled_time": "09:00:00"
    })
  }

  async fn create(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/summons", Some(intake())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["summons_id"].as_str().unwrap().to_owned()
  }

  // ── Intake ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_creation_entry() {
    let app = app().await;
    let (status, body) = call(&app, "POST", "/summons", Some(intake())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "CREATED");
    assert_eq!(body["history"][0]["action"], "created");
    assert_eq!(body["history"][0]["actor"], "Lt. Gueye");
  }

  #[tokio::test]
  async fn create_without_motif_is_a_validation_error() {
    let app = app().await;
    let mut input = intake();
    input["motif"] = json!("");
    let (status, body) = call(&app, "POST", "/summons", Some(input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
  }

  #[tokio::test]
  async fn unknown_summons_returns_404() {
    let app = app().await;
    let uri = format!("/summons/{}", Uuid::new_v4());
    let (status, body) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, _) = call(&app, "POST", &format!("{uri}/confirm"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Actions ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn canceled_summons_rejects_confirmation_with_409() {
    let app = app().await;
    let id = create(&app).await;

    let (status, body) = call(
      &app,
      "POST",
      &format!("/summons/{id}/cancel"),
      Some(json!({ "reason": "no longer relevant" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELED");
    assert_eq!(body["cancel_reason"], "no longer relevant");

    let (status, body) = call(&app, "POST", &format!("/summons/{id}/confirm"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");
  }

  #[tokio::test]
  async fn not_honored_without_reason_is_rejected() {
    let app = app().await;
    let id = create(&app).await;

    let (status, body) = call(
      &app,
      "POST",
      &format!("/summons/{id}/not-honored"),
      Some(json!({ "comment": "did not show" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, history) = call(&app, "GET", &format!("/summons/{id}/history"), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn reschedule_updates_the_rendezvous() {
    let app = app().await;
    let id = create(&app).await;
    call(&app, "POST", &format!("/summons/{id}/confirm"), None).await;

    let (status, body) = call(
      &app,
      "POST",
      &format!("/summons/{id}/reschedule"),
      Some(json!({ "date": "2030-12-01", "time": "10:00:00", "reason": "court unavailable" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "CONFIRMED");
    assert_eq!(body["scheduled_date"], "2030-12-01");
    assert_eq!(body["scheduled_time"], "10:00:00");
  }

  #[tokio::test]
  async fn notify_requires_channels_and_records_outcomes() {
    let app = app().await;
    let id = create(&app).await;

    let (status, body) = call(
      &app,
      "POST",
      &format!("/summons/{id}/notify"),
      Some(json!({ "channels": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, _) = call(
      &app,
      "POST",
      &format!("/summons/{id}/notify"),
      Some(json!({ "channels": ["SMS", "EMAIL"], "message": "please confirm" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, records) = call(&app, "GET", &format!("/summons/{id}/deliveries"), None).await;
    assert_eq!(status, StatusCode::OK);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    let email = records.iter().find(|r| r["channel"] == "EMAIL").unwrap();
    assert_eq!(email["delivered"], false);
    assert_eq!(email["error"], "mailbox full");
  }

  #[tokio::test]
  async fn history_can_be_read_newest_first() {
    let app = app().await;
    let id = create(&app).await;
    call(
      &app,
      "POST",
      &format!("/summons/{id}/notes"),
      Some(json!({ "note": "relative answered the phone" })),
    )
    .await;

    let (_, oldest_first) = call(&app, "GET", &format!("/summons/{id}/history"), None).await;
    assert_eq!(oldest_first[0]["action"], "created");

    let (_, newest_first) = call(
      &app,
      "GET",
      &format!("/summons/{id}/history?newest_first=true"),
      None,
    )
    .await;
    assert_eq!(newest_first[0]["action"], "note_added");
    assert_eq!(newest_first[0]["label"], "Note added");
    assert_eq!(newest_first[0]["details"], "relative answered the phone");
  }

  // ── Payloads ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cancel_and_honor_accept_an_empty_body() {
    let app = app().await;

    let canceled = create(&app).await;
    let (status, body) = call(&app, "POST", &format!("/summons/{canceled}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "CANCELED");
    assert_eq!(body["cancel_reason"], "");

    let honored = create(&app).await;
    let (status, body) = call(&app, "POST", &format!("/summons/{honored}/honor"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "HONORED");
  }

  #[tokio::test]
  async fn unknown_not_honored_reason_is_a_validation_error() {
    let app = app().await;
    let id = create(&app).await;

    let (status, body) = call(
      &app,
      "POST",
      &format!("/summons/{id}/not-honored"),
      Some(json!({ "reason": "LATE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert!(body["error"].as_str().unwrap().contains("LATE"), "{body}");
  }

  #[tokio::test]
  async fn impossible_reschedule_date_is_a_validation_error() {
    let app = app().await;
    let id = create(&app).await;

    let (status, body) = call(
      &app,
      "POST",
      &format!("/summons/{id}/reschedule"),
      Some(json!({ "date": "2030-13-40", "time": "10:00:00", "reason": "typo" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, stored) = call(&app, "GET", &format!("/summons/{id}"), None).await;
    assert_eq!(stored["scheduled_date"], "2030-03-04");
  }

  #[tokio::test]
  async fn malformed_query_is_a_validation_error() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/summons?status=LOST", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
  }

  #[tokio::test]
  async fn progress_follows_the_lifecycle() {
    let app = app().await;
    let id = create(&app).await;

    let (_, view) = call(&app, "GET", &format!("/summons/{id}/progress"), None).await;
    assert_eq!(view["current_step"], 1);
    assert_eq!(view["label"], "Created");

    call(&app, "POST", &format!("/summons/{id}/send"), None).await;
    let (_, view) = call(&app, "GET", &format!("/summons/{id}/progress"), None).await;
    assert_eq!(view["current_step"], 2);
    assert_eq!(view["steps"][0]["state"], "completed");
    assert_eq!(view["steps"][1]["state"], "current");
  }

  #[tokio::test]
  async fn list_filters_by_status() {
    let app = app().await;
    let id = create(&app).await;
    create(&app).await;
    call(&app, "POST", &format!("/summons/{id}/send"), None).await;

    let (status, all) = call(&app, "GET", "/summons", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, sent) = call(&app, "GET", "/summons?status=SENT", None).await;
    let sent = sent.as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["summons_id"], id.as_str());
  }
}
