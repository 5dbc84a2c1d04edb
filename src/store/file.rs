use std::{
    collections::BTreeMap,
    fs::{read_to_string, remove_file, rename, write},
    path::{Path, PathBuf},
};

use crate::{
    error::MarginaliaError,
    store::{memory::apply_writes, ObjectStore, StagedWrites},
};

/// A store kept in a single JSON file mapping keys to hex encoded blobs.
///
/// Each commit writes the whole map to a sibling temp file and renames it over the store file, so
/// the file on disk always holds either the state before a commit or the state after it.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    blobs: BTreeMap<String, Vec<u8>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; it is created on first commit.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileStore, MarginaliaError> {
        let path = path.as_ref().to_path_buf();
        let blobs = if path.exists() {
            tracing::debug!("Reading store from {:?}", &path);
            let content = read_to_string(&path)?;
            let encoded: BTreeMap<String, String> =
                serde_json::from_str(&content).map_err(|e| {
                    MarginaliaError::Storage(format!("{path:?} is not a store file: {e}"))
                })?;
            encoded
                .into_iter()
                .map(|(key, value)| Ok((key, hex::decode(value)?)))
                .collect::<Result<BTreeMap<_, _>, MarginaliaError>>()?
        } else {
            tracing::debug!("Store file {:?} not found, starting empty", &path);
            BTreeMap::new()
        };
        Ok(FileStore { path, blobs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ObjectStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MarginaliaError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn commit(&mut self, writes: StagedWrites) -> Result<(), MarginaliaError> {
        let count = writes.len();
        let mut next = self.blobs.clone();
        apply_writes(&mut next, writes);
        let encoded: BTreeMap<&str, String> = next
            .iter()
            .map(|(key, value)| (key.as_str(), hex::encode(value)))
            .collect();
        let content = serde_json::to_string_pretty(&encoded)?;
        let temp = self.temp_path();
        if let Err(e) = write(&temp, content).and_then(|_| rename(&temp, &self.path)) {
            if let Err(cleanup) = remove_file(&temp) {
                tracing::warn!("Could not remove temp store file {:?}: {cleanup}", &temp);
            }
            return Err(e.into());
        }
        self.blobs = next;
        tracing::info!("Committed {count} writes to {:?}", &self.path);
        Ok(())
    }
}
