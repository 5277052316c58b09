//! Error types for `summons-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::summons::SummonsStatus;

#[derive(Debug, Error)]
pub enum Error {
  /// A required payload field is missing or malformed.
  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  /// The guard for `action` does not hold in `status`.
  #[error("cannot {action} a summons in status {status}")]
  InvalidState {
    action: &'static str,
    status: SummonsStatus,
  },

  #[error("summons not found: {0}")]
  NotFound(Uuid),

  /// Another writer saved the summons first. Reload and retry.
  #[error("summons {0} was modified concurrently")]
  ConcurrentModification(Uuid),

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant {
    kind:  &'static str,
    value: String,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether reloading and reapplying the same action may succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::ConcurrentModification(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
