use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::{Mutator, OrderStore, StoreError};
use crate::entities::OrderRecord;

const SELECT_COLUMNS: &str = "reference, upstream_order_id, amount_minor_units, currency, \
     description, status, created_at, updated_at";

/// PostgreSQL-backed Order Store.
///
/// Per-key serialization comes from a `SELECT ... FOR UPDATE` row lock held
/// for the duration of the read-modify-write transaction; rows for other
/// references stay untouched. The table schema lives in `migrations/`.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[tracing::instrument(skip_all, fields(reference = %record.reference))]
    async fn create(&self, record: OrderRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO order_records \
                 (reference, upstream_order_id, amount_minor_units, currency, \
                  description, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (reference) DO NOTHING",
        )
        .bind(&record.reference)
        .bind(&record.upstream_order_id)
        .bind(record.amount_minor_units)
        .bind(&record.currency)
        .bind(&record.description)
        .bind(record.status)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists);
        }
        Ok(())
    }

    async fn get(&self, reference: &str) -> Result<Option<OrderRecord>, StoreError> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_records WHERE reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update(
        &self,
        reference: &str,
        mutate: Mutator<'_>,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM order_records WHERE reference = $1 FOR UPDATE"
        ))
        .bind(reference)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut record) = record else {
            // dropping the transaction rolls it back
            return Ok(None);
        };

        let before = record.clone();
        mutate(&mut record);
        if record != before {
            record.updated_at = OffsetDateTime::now_utc();
            sqlx::query(
                "UPDATE order_records \
                 SET upstream_order_id = $2, status = $3, updated_at = $4 \
                 WHERE reference = $1",
            )
            .bind(&record.reference)
            .bind(&record.upstream_order_id)
            .bind(record.status)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(record))
    }
}
