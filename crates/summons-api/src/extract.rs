//! Body and query extractors whose rejections are reported as [`ApiError`].

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, OptionalFromRequest, Query, Request},
  http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON request body.
///
/// Extracted as `Option<Payload<T>>`, a request without a `Content-Type`
/// header yields `None` instead of a rejection.
#[derive(Debug, Clone, Default)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
    Ok(Self(value))
  }
}

impl<T, S> OptionalFromRequest<S> for Payload<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
    let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
    Ok(body.map(|Json(value)| Self(value)))
  }
}

/// Query-string parameters.
#[derive(Debug, Clone, Default)]
pub struct Params<T>(pub T);

impl<T, S> FromRequestParts<S> for Params<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
    Ok(Self(value))
  }
}
