use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use super::{Mutator, OrderStore, StoreError};
use crate::entities::OrderRecord;

/// In-memory Order Store.
///
/// Each record sits behind its own mutex, so updates to the same reference
/// serialize while operations on different references never contend. The
/// outer map lock is held only long enough to find or insert the entry.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Arc<Mutex<OrderRecord>>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in no particular order. Diagnostic
    /// accessor for tests and single-node inspection; not part of the
    /// [`OrderStore`] contract.
    pub async fn records(&self) -> Vec<OrderRecord> {
        let slots: Vec<Arc<Mutex<OrderRecord>>> =
            self.orders.read().await.values().cloned().collect();
        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            records.push(slot.lock().await.clone());
        }
        records
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, record: OrderRecord) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        match orders.entry(record.reference.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(record)));
                Ok(())
            }
        }
    }

    async fn get(&self, reference: &str) -> Result<Option<OrderRecord>, StoreError> {
        let slot = self.orders.read().await.get(reference).cloned();
        match slot {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        reference: &str,
        mutate: Mutator<'_>,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let slot = self.orders.read().await.get(reference).cloned();
        let Some(slot) = slot else {
            return Ok(None);
        };

        let mut record = slot.lock().await;
        let before = record.clone();
        mutate(&mut record);
        if *record != before {
            record.updated_at = OffsetDateTime::now_utc();
        }
        Ok(Some(record.clone()))
    }
}
