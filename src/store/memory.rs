use std::collections::BTreeMap;

use crate::{
    error::MarginaliaError,
    store::{ObjectStore, StagedWrites},
};

/// A store that lives only as long as the process.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.blobs.keys().map(String::as_str)
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MarginaliaError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn commit(&mut self, writes: StagedWrites) -> Result<(), MarginaliaError> {
        tracing::debug!("committing {} writes to memory store", writes.len());
        apply_writes(&mut self.blobs, writes);
        Ok(())
    }
}

pub(crate) fn apply_writes(blobs: &mut BTreeMap<String, Vec<u8>>, writes: StagedWrites) {
    for (key, value) in writes {
        match value {
            Some(bytes) => {
                blobs.insert(key, bytes);
            }
            None => {
                blobs.remove(&key);
            }
        }
    }
}
