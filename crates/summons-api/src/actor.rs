//! Extractor for the acting official's name.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the acting official's display name.
pub const ACTOR_HEADER: &str = "x-actor";

/// The official performing the request, if the caller identified one.
/// A blank header counts as absent.
#[derive(Debug, Clone, Default)]
pub struct Actor(pub Option<String>);

impl<St> FromRequestParts<St> for Actor
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(ACTOR_HEADER) else {
      return Ok(Actor(None));
    };
    let name = std::str::from_utf8(value.as_bytes())
      .map_err(|_| ApiError::BadRequest(format!("{ACTOR_HEADER} header is not valid UTF-8")))?
      .trim();
    Ok(Actor((!name.is_empty()).then(|| name.to_owned())))
  }
}
