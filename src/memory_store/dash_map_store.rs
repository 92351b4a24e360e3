use crate::cache::cache::{Cache, DeltaResult, KeyType, Record, SetStatus};
use crate::cache::error::{CacheError, Result};
use crate::server::timer;

use bytes::{BufMut, Bytes, BytesMut};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::str;
use std::sync::Arc;

type Storage = DashMap<KeyType, Record>;

/// Sharded in-memory store. The DashMap entry guard is held for the
/// whole read-modify-write of every operation, which makes each of them
/// a single linearization point for its key.
pub struct DashMapMemoryStore {
    memory: Storage,
    timer: Arc<dyn timer::Timer + Send + Sync>,
}

impl DashMapMemoryStore {
    pub fn new(timer: Arc<dyn timer::Timer + Send + Sync>) -> DashMapMemoryStore {
        DashMapMemoryStore {
            memory: DashMap::new(),
            timer,
        }
    }

    fn timestamp(&self) -> u64 {
        self.timer.timestamp()
    }

    fn concat(&self, key: KeyType, new_record: Record, append: bool) -> Result<SetStatus> {
        let now = self.timestamp();
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().header.is_expired(now) {
                    occupied.remove();
                    return Err(CacheError::NotStored);
                }
                let record = occupied.get_mut();
                let mut value =
                    BytesMut::with_capacity(record.value.len() + new_record.value.len());
                if append {
                    value.put_slice(&record.value);
                    value.put_slice(&new_record.value);
                } else {
                    value.put_slice(&new_record.value);
                    value.put_slice(&record.value);
                }
                record.value = value.freeze();
                record.header.cas += 1;
                Ok(SetStatus {
                    cas: record.header.cas,
                })
            }
            Entry::Vacant(_) => Err(CacheError::NotStored),
        }
    }
}

impl Cache for DashMapMemoryStore {
    fn get(&self, key: &KeyType) -> Result<Record> {
        let now = self.timestamp();
        let expired = match self.memory.get(key) {
            Some(record) => {
                if !record.header.is_expired(now) {
                    return Ok(record.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.memory
                .remove_if(key, |_key, record| record.header.is_expired(now));
        }
        Err(CacheError::NotFound)
    }

    fn set(&self, key: KeyType, mut record: Record) -> Result<SetStatus> {
        let now = self.timestamp();
        record.header.stored_at = now;
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                record.header.cas = if occupied.get().header.is_expired(now) {
                    1
                } else {
                    occupied.get().header.cas + 1
                };
                let cas = record.header.cas;
                occupied.insert(record);
                Ok(SetStatus { cas })
            }
            Entry::Vacant(vacant) => {
                record.header.cas = 1;
                vacant.insert(record);
                Ok(SetStatus { cas: 1 })
            }
        }
    }

    fn add(&self, key: KeyType, mut record: Record) -> Result<SetStatus> {
        let now = self.timestamp();
        record.header.stored_at = now;
        record.header.cas = 1;
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().header.is_expired(now) {
                    return Err(CacheError::NotStored);
                }
                occupied.insert(record);
                Ok(SetStatus { cas: 1 })
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record);
                Ok(SetStatus { cas: 1 })
            }
        }
    }

    fn replace(&self, key: KeyType, mut record: Record) -> Result<SetStatus> {
        let now = self.timestamp();
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().header.is_expired(now) {
                    occupied.remove();
                    return Err(CacheError::NotStored);
                }
                record.header.stored_at = now;
                record.header.cas = occupied.get().header.cas + 1;
                let cas = record.header.cas;
                occupied.insert(record);
                Ok(SetStatus { cas })
            }
            Entry::Vacant(_) => Err(CacheError::NotStored),
        }
    }

    fn append(&self, key: KeyType, new_record: Record) -> Result<SetStatus> {
        self.concat(key, new_record, true)
    }

    fn prepend(&self, key: KeyType, new_record: Record) -> Result<SetStatus> {
        self.concat(key, new_record, false)
    }

    fn check_and_set(
        &self,
        key: KeyType,
        mut record: Record,
        expected_cas: u64,
    ) -> Result<SetStatus> {
        let now = self.timestamp();
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().header.is_expired(now) {
                    occupied.remove();
                    return Err(CacheError::NotFound);
                }
                if occupied.get().header.cas != expected_cas {
                    return Err(CacheError::KeyExists);
                }
                record.header.stored_at = now;
                record.header.cas = expected_cas + 1;
                let cas = record.header.cas;
                occupied.insert(record);
                Ok(SetStatus { cas })
            }
            Entry::Vacant(_) => Err(CacheError::NotFound),
        }
    }

    fn delete(&self, key: KeyType) -> Result<Record> {
        let now = self.timestamp();
        match self.memory.entry(key) {
            Entry::Occupied(occupied) => {
                let record = occupied.remove();
                if record.header.is_expired(now) {
                    Err(CacheError::NotFound)
                } else {
                    Ok(record)
                }
            }
            Entry::Vacant(_) => Err(CacheError::NotFound),
        }
    }

    fn incr_decr(&self, key: KeyType, delta: u64, increment: bool) -> Result<DeltaResult> {
        let now = self.timestamp();
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().header.is_expired(now) {
                    occupied.remove();
                    return Err(CacheError::NotFound);
                }
                let record = occupied.get_mut();
                if !record.value.iter().all(|byte| byte.is_ascii_digit()) {
                    return Err(CacheError::ArithOnNonNumeric);
                }
                let value = str::from_utf8(&record.value)
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .ok_or(CacheError::ArithOnNonNumeric)?;
                let value = if increment {
                    value.wrapping_add(delta)
                } else {
                    value.saturating_sub(delta)
                };
                record.value = Bytes::from(value.to_string());
                record.header.cas += 1;
                Ok(DeltaResult {
                    cas: record.header.cas,
                    value,
                })
            }
            Entry::Vacant(_) => Err(CacheError::NotFound),
        }
    }

    fn touch(&self, key: KeyType, exp_time: i64) -> Result<()> {
        let now = self.timestamp();
        match self.memory.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().header.is_expired(now) {
                    occupied.remove();
                    return Err(CacheError::NotFound);
                }
                let record = occupied.get_mut();
                record.header.exp_time = exp_time;
                record.header.stored_at = now;
                Ok(())
            }
            Entry::Vacant(_) => Err(CacheError::NotFound),
        }
    }

    fn evict_expired(&self) {
        let now = self.timestamp();
        self.memory
            .retain(|_key, record| !record.header.is_expired(now));
    }

    fn len(&self) -> usize {
        self.memory.len()
    }

    fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}
