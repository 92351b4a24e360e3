use crate::cache::cache::{
    Cache, DeltaResult, KeyType as CacheKeyType, Record as CacheRecord,
    SetStatus as CacheSetStatus,
};
use crate::cache::error::Result;
use std::sync::Arc;

pub type Record = CacheRecord;
pub type SetStatus = CacheSetStatus;
pub type KeyType = CacheKeyType;

/**
 * Implements memcache text commands based
 * on the underlying key value store
 */
pub struct MemcStore {
    store: Arc<dyn Cache + Send + Sync>,
}

impl MemcStore {
    pub fn new(store: Arc<dyn Cache + Send + Sync>) -> MemcStore {
        MemcStore { store }
    }

    pub fn set(&self, key: KeyType, record: Record) -> Result<SetStatus> {
        self.store.set(key, record)
    }

    pub fn get(&self, key: &KeyType) -> Result<Record> {
        self.store.get(key)
    }

    pub fn add(&self, key: KeyType, record: Record) -> Result<SetStatus> {
        self.store.add(key, record)
    }

    pub fn replace(&self, key: KeyType, record: Record) -> Result<SetStatus> {
        self.store.replace(key, record)
    }

    pub fn append(&self, key: KeyType, new_record: Record) -> Result<SetStatus> {
        self.store.append(key, new_record)
    }

    pub fn prepend(&self, key: KeyType, new_record: Record) -> Result<SetStatus> {
        self.store.prepend(key, new_record)
    }

    pub fn check_and_set(
        &self,
        key: KeyType,
        record: Record,
        expected_cas: u64,
    ) -> Result<SetStatus> {
        self.store.check_and_set(key, record, expected_cas)
    }

    pub fn increment(&self, key: KeyType, delta: u64) -> Result<DeltaResult> {
        self.store.incr_decr(key, delta, true)
    }

    pub fn decrement(&self, key: KeyType, delta: u64) -> Result<DeltaResult> {
        self.store.incr_decr(key, delta, false)
    }

    pub fn delete(&self, key: KeyType) -> Result<Record> {
        self.store.delete(key)
    }

    pub fn touch(&self, key: KeyType, exp_time: i64) -> Result<()> {
        self.store.touch(key, exp_time)
    }

    pub fn evict_expired(&self) {
        self.store.evict_expired()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod add_tests;
#[cfg(test)]
mod replace_tests;
