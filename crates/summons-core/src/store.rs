//! The `SummonsStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `summons-store-sqlite`). [`crate::service::SummonsService`] depends on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  history::HistoryEntry,
  notify::DeliveryRecord,
  summons::{Summons, SummonsStatus},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`SummonsStore::list`].
#[derive(Debug, Clone, Default)]
pub struct SummonsQuery {
  pub status: Option<SummonsStatus>,
  /// Restrict to one station.
  pub unit:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// Result of [`SummonsStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
  Saved,
  /// The stored version no longer matches the expected one; nothing was
  /// written.
  Stale,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a summons store backend.
///
/// History entries are append-only. A save writes the aggregate row and any
/// entries not yet stored in one atomic step, guarded by the version the
/// caller loaded.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SummonsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a newly created summons together with its creation entry.
  fn insert<'a>(
    &'a self,
    summons: &'a Summons,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load a summons with its full history. Returns `None` if not found.
  fn load(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Summons>, Self::Error>> + Send + '_;

  /// Write `summons` if the stored version still equals `expected_version`.
  ///
  /// On [`SaveOutcome::Saved`] the stored version becomes
  /// `expected_version + 1`.
  fn save<'a>(
    &'a self,
    summons: &'a Summons,
    expected_version: u64,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + 'a;

  /// The history of a summons in insertion order. Returns `None` if the
  /// summons does not exist.
  fn history(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<HistoryEntry>>, Self::Error>> + Send + '_;

  /// List summons matching `query`, ordered by scheduled date.
  fn list<'a>(
    &'a self,
    query: &'a SummonsQuery,
  ) -> impl Future<Output = Result<Vec<Summons>, Self::Error>> + Send + 'a;

  // ── Delivery outcomes ─────────────────────────────────────────────────

  /// Append per-channel delivery outcomes for a summons.
  fn record_deliveries(
    &self,
    id: Uuid,
    records: Vec<DeliveryRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All delivery outcomes recorded for a summons, oldest first.
  fn deliveries(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<DeliveryRecord>, Self::Error>> + Send + '_;
}
