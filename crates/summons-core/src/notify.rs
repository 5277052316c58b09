//! The notification boundary.
//!
//! The state machine only records that a notification was requested. Actual
//! transport is delegated to a [`Dispatcher`], whose per-channel outcome is
//! stored separately from the history entry.

use std::{collections::BTreeSet, fmt, future::Future, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, summons::SummonedPerson};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
  Sms,
  Email,
  Call,
  Mail,
}

impl Channel {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sms => "SMS",
      Self::Email => "EMAIL",
      Self::Call => "CALL",
      Self::Mail => "MAIL",
    }
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Channel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "SMS" => Ok(Self::Sms),
      "EMAIL" => Ok(Self::Email),
      "CALL" => Ok(Self::Call),
      "MAIL" => Ok(Self::Mail),
      other => Err(Error::UnknownDiscriminant {
        kind:  "channel",
        value: other.to_owned(),
      }),
    }
  }
}

/// A transient request to reach the summoned person. Only its trace in the
/// history log is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
  pub channels: BTreeSet<Channel>,
  pub message:  Option<String>,
}

impl NotificationRequest {
  pub fn validate(&self) -> Result<()> {
    if self.channels.is_empty() {
      return Err(Error::Validation {
        field:   "channels",
        message: "at least one channel is required".into(),
      });
    }
    Ok(())
  }

  /// Text recorded in the history entry, e.g. `via SMS, EMAIL: "bring ID"`.
  pub fn describe(&self) -> String {
    let channels = self
      .channels
      .iter()
      .map(|c| c.as_str())
      .collect::<Vec<_>>()
      .join(", ");
    match self.message.as_deref().filter(|m| !m.trim().is_empty()) {
      Some(message) => format!("via {channels}: {message:?}"),
      None => format!("via {channels}"),
    }
  }
}

/// The result of attempting one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOutcome {
  pub channel: Channel,
  pub error:   Option<String>,
}

impl ChannelOutcome {
  pub fn delivered(channel: Channel) -> Self { Self { channel, error: None } }

  pub fn failed(channel: Channel, error: impl Into<String>) -> Self {
    Self { channel, error: Some(error.into()) }
  }

  pub fn is_delivered(&self) -> bool { self.error.is_none() }
}

/// A persisted per-channel delivery outcome, kept apart from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
  pub channel:     Channel,
  pub delivered:   bool,
  pub error:       Option<String>,
  pub recorded_at: DateTime<Utc>,
}

impl DeliveryRecord {
  pub fn from_outcome(outcome: ChannelOutcome, recorded_at: DateTime<Utc>) -> Self {
    Self {
      channel: outcome.channel,
      delivered: outcome.error.is_none(),
      error: outcome.error,
      recorded_at,
    }
  }
}

/// Delivers notifications over the requested channels.
///
/// Best-effort: implementations report failures per channel and never fail
/// the whole call.
pub trait Dispatcher: Send + Sync {
  fn send<'a>(
    &'a self,
    request: &'a NotificationRequest,
    recipient: &'a SummonedPerson,
  ) -> impl Future<Output = Vec<ChannelOutcome>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_channel_set_is_invalid() {
    let request = NotificationRequest { channels: BTreeSet::new(), message: None };
    assert!(matches!(
      request.validate(),
      Err(Error::Validation { field: "channels", .. })
    ));
  }

  #[test]
  fn description_lists_channels_and_message() {
    let request = NotificationRequest {
      channels: [Channel::Email, Channel::Sms].into_iter().collect(),
      message:  Some("bring your ID".into()),
    };
    assert_eq!(request.describe(), "via SMS, EMAIL: \"bring your ID\"");
  }

  #[test]
  fn blank_message_is_omitted() {
    let request = NotificationRequest {
      channels: [Channel::Call].into_iter().collect(),
      message:  Some("   ".into()),
    };
    assert_eq!(request.describe(), "via CALL");
  }
}
