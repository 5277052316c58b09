//! HTTP server assembly for summons tracking.
//!
//! Holds the runtime configuration, a logging [`Dispatcher`] and the router
//! builder shared by the binary and its tests.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use summons_core::{
  notify::{Channel, ChannelOutcome, Dispatcher, NotificationRequest},
  service::{ServiceConfig, SummonsService},
  store::SummonsStore,
  summons::SummonedPerson,
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SUMMONS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  #[serde(default = "default_max_attempts")]
  pub max_attempts:     u32,
  #[serde(default = "default_dispatch_enabled")]
  pub dispatch_enabled: bool,
}

fn default_max_attempts() -> u32 { ServiceConfig::default().max_attempts }

fn default_dispatch_enabled() -> bool { true }

impl ServerConfig {
  pub fn service_config(&self) -> ServiceConfig {
    ServiceConfig { max_attempts: self.max_attempts.max(1) }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Dispatcher ───────────────────────────────────────────────────────────────

/// A [`Dispatcher`] without real transport.
///
/// Each channel is logged. A channel fails when the recipient has no
/// coordinate for it, or when dispatch is disabled.
#[derive(Debug, Clone)]
pub struct LogDispatcher {
  enabled: bool,
}

impl LogDispatcher {
  pub fn new(enabled: bool) -> Self { Self { enabled } }

  fn attempt(
    &self,
    channel: Channel,
    request: &NotificationRequest,
    recipient: &SummonedPerson,
  ) -> ChannelOutcome {
    if !self.enabled {
      return ChannelOutcome::failed(channel, "dispatch disabled");
    }

    let coordinate = match channel {
      Channel::Sms | Channel::Call => recipient.phone.as_deref(),
      Channel::Email => recipient.email.as_deref(),
      Channel::Mail => recipient.address.as_deref(),
    };
    let Some(coordinate) = coordinate.filter(|c| !c.trim().is_empty()) else {
      return ChannelOutcome::failed(channel, missing_coordinate(channel));
    };

    tracing::info!(
      %channel,
      to = coordinate,
      recipient = %recipient.name,
      message = request.message.as_deref().unwrap_or(""),
      "notification dispatched"
    );
    ChannelOutcome::delivered(channel)
  }
}

fn missing_coordinate(channel: Channel) -> &'static str {
  match channel {
    Channel::Sms | Channel::Call => "no phone number on file",
    Channel::Email => "no email address on file",
    Channel::Mail => "no postal address on file",
  }
}

impl Dispatcher for LogDispatcher {
  async fn send(
    &self,
    request: &NotificationRequest,
    recipient: &SummonedPerson,
  ) -> Vec<ChannelOutcome> {
    request
      .channels
      .iter()
      .map(|channel| self.attempt(*channel, request, recipient))
      .collect()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server router: the summons API with HTTP request tracing.
pub fn router<S, D>(service: Arc<SummonsService<S, D>>) -> Router
where
  S: SummonsStore + 'static,
  D: Dispatcher + 'static,
{
  summons_api::api_router(service).layer(TraceLayer::new_for_http())
}
