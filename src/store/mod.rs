//! Durable storage of opaque byte blobs.
//!
//! [ObjectStore] is the only thing the core asks of a storage engine: read a blob, and commit a
//! batch of writes all at once. Read-modify-write units run through [ObjectStore::atomically],
//! which stages every write of its body in a [Transaction] and commits them together only when the
//! body succeeds.
//!
//! [Library] sits on top of an injected store and persists outlines, notes and flashcards; the
//! outline, block and style algorithms never touch a store.
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use crate::{
    chapter::Chapter,
    error::MarginaliaError,
    flashcard::FlashcardField,
    properties::{CardId, DocumentId},
};

pub mod file;
pub mod library;
pub mod memory;

pub use file::FileStore;
pub use library::Library;
pub use memory::MemoryStore;

/// Writes waiting for commit. `None` removes the key.
pub type StagedWrites = BTreeMap<String, Option<Vec<u8>>>;

pub trait ObjectStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MarginaliaError>;

    /// Apply every write or none of them.
    fn commit(&mut self, writes: StagedWrites) -> Result<(), MarginaliaError>;

    fn put(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), MarginaliaError> {
        self.commit(StagedWrites::from([(key.to_string(), Some(bytes))]))
    }

    fn remove(&mut self, key: &str) -> Result<(), MarginaliaError> {
        self.commit(StagedWrites::from([(key.to_string(), None)]))
    }

    /// Run `body` against a transaction over this store. Its writes commit together when it
    /// returns `Ok`; an error discards them all.
    fn atomically<T, F>(&mut self, body: F) -> Result<T, MarginaliaError>
    where
        Self: Sized,
        F: FnOnce(&mut Transaction<'_, Self>) -> Result<T, MarginaliaError>,
    {
        let mut txn = Transaction::new(self);
        let output = body(&mut txn)?;
        let staged = txn.staged;
        if !staged.is_empty() {
            self.commit(staged)?;
        }
        Ok(output)
    }
}

/// Staged writes over a read-only view of a store. Reads see the staged writes first.
pub struct Transaction<'a, S: ObjectStore> {
    store: &'a S,
    staged: StagedWrites,
}

impl<'a, S: ObjectStore> Transaction<'a, S> {
    pub fn new(store: &'a S) -> Transaction<'a, S> {
        Transaction {
            store,
            staged: StagedWrites::new(),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MarginaliaError> {
        match self.staged.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.store.get(key),
        }
    }

    pub fn put(&mut self, key: &str, bytes: Vec<u8>) {
        self.staged.insert(key.to_string(), Some(bytes));
    }

    pub fn remove(&mut self, key: &str) {
        self.staged.insert(key.to_string(), None);
    }

    /// Number of staged writes.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }
}

/// The keys the library stores its blobs under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// Outline records of a document.
    Outline(DocumentId),
    /// The note written for one chapter of a document.
    Note(DocumentId, Chapter),
    /// Ids of the flashcards made from a document.
    CardIndex(DocumentId),
    Card(CardId),
    CardField(CardId, FlashcardField),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::Outline(doc) => write!(f, "outline/{doc}"),
            StoreKey::Note(doc, chapter) => write!(f, "note/{doc}/{chapter}"),
            StoreKey::CardIndex(doc) => write!(f, "cards/{doc}"),
            StoreKey::Card(card) => write!(f, "card/{card}"),
            StoreKey::CardField(card, field) => write!(f, "card/{card}/{field}"),
        }
    }
}
