//! The Order Store: a keyed, insert-only-then-reconcile record store.
//!
//! Backing storage is pluggable behind one trait: an in-memory map for
//! tests and single-node deployments, PostgreSQL for production. All
//! operations are atomic with respect to a single reference key, and
//! `update` serializes read-modify-write cycles per key so a webhook and a
//! concurrent poll can never interleave into an inconsistent record.

mod memory;
mod postgres;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::OrderRecord;

/// Record transition function applied under the store's per-key lock.
///
/// Mutators must be pure with respect to everything but the record; they are
/// responsible for upholding the terminal-state invariant (see
/// [`crate::reconcile::apply_observation`]).
pub type Mutator<'a> = &'a (dyn Fn(&mut OrderRecord) + Send + Sync);

/// Errors surfaced by Order Store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create` found the reference already present.
    #[error("order reference already exists")]
    AlreadyExists,

    /// The backing database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent mapping from reference → [`OrderRecord`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new record. Creation is single-writer and insert-only:
    /// an existing reference yields [`StoreError::AlreadyExists`].
    async fn create(&self, record: OrderRecord) -> Result<(), StoreError>;

    /// Fetch a record by reference.
    async fn get(&self, reference: &str) -> Result<Option<OrderRecord>, StoreError>;

    /// Apply `mutate` to the record under per-key mutual exclusion and
    /// return the committed result; `None` if the reference is unknown.
    ///
    /// `updated_at` is bumped only when the mutator actually changed the
    /// record, so a no-op transition (e.g. against a terminal record)
    /// returns the stored record byte-for-byte unchanged.
    async fn update(
        &self,
        reference: &str,
        mutate: Mutator<'_>,
    ) -> Result<Option<OrderRecord>, StoreError>;
}
