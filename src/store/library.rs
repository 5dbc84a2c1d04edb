use std::collections::BTreeMap;

use crate::{
    chapter::Chapter,
    codec::CodedTextViewContents,
    config::MarginaliaConfig,
    error::MarginaliaError,
    flashcard::{Flashcard, FlashcardField, FlashcardRecord},
    outline::{EditOutcome, OutlineContainer, OutlineEdit, OutlineRecord},
    properties::{CardId, DocumentId, OutlineId},
    store::{ObjectStore, StoreKey, Transaction},
};

/// Persists outlines, chapter notes and flashcards through an injected [ObjectStore].
///
/// Notes are stored per chapter, so outline edits that renumber chapters move the affected notes
/// and flashcards along in the same atomic unit.
#[derive(Debug)]
pub struct Library<S: ObjectStore> {
    store: S,
    max_depth: usize,
    new_item_label: String,
}

impl<S: ObjectStore> Library<S> {
    pub fn new(store: S, config: &MarginaliaConfig) -> Library<S> {
        Library {
            store,
            max_depth: config.outline.max_depth,
            new_item_label: config.outline.new_item_label.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn save_outline(
        &mut self,
        doc: DocumentId,
        outline: &OutlineContainer,
    ) -> Result<(), MarginaliaError> {
        let bytes = serde_json::to_vec(&outline.to_records())?;
        self.store.put(&StoreKey::Outline(doc).to_string(), bytes)
    }

    pub fn load_outline(
        &self,
        doc: DocumentId,
    ) -> Result<Option<OutlineContainer>, MarginaliaError> {
        let Some(bytes) = self.store.get(&StoreKey::Outline(doc).to_string())? else {
            return Ok(None);
        };
        let records: Vec<OutlineRecord> = serde_json::from_slice(&bytes)?;
        Ok(Some(OutlineContainer::from_records(records, self.max_depth)?))
    }

    /// Store the note of `chapter`. The contents are encoded before anything is written.
    pub fn save_contents(
        &mut self,
        doc: DocumentId,
        chapter: &Chapter,
        contents: &CodedTextViewContents,
    ) -> Result<(), MarginaliaError> {
        let bytes = contents.encode()?;
        self.store
            .put(&StoreKey::Note(doc, chapter.clone()).to_string(), bytes)
    }

    pub fn load_contents(
        &self,
        doc: DocumentId,
        chapter: &Chapter,
    ) -> Result<Option<CodedTextViewContents>, MarginaliaError> {
        self.store
            .get(&StoreKey::Note(doc, chapter.clone()).to_string())?
            .map(|bytes| CodedTextViewContents::decode(&bytes))
            .transpose()
    }

    /// Like [Self::load_contents], but a missing or undecodable note reads as an empty one.
    /// Storage failures still surface.
    pub fn load_contents_or_empty(
        &self,
        doc: DocumentId,
        chapter: &Chapter,
    ) -> Result<CodedTextViewContents, MarginaliaError> {
        Ok(self
            .store
            .get(&StoreKey::Note(doc, chapter.clone()).to_string())?
            .map(|bytes| CodedTextViewContents::decode_or_empty(&bytes))
            .unwrap_or_default())
    }

    pub fn save_flashcard(
        &mut self,
        doc: DocumentId,
        card: &Flashcard,
    ) -> Result<(), MarginaliaError> {
        let mut fields = Vec::with_capacity(FlashcardField::ALL.len());
        for field in FlashcardField::ALL {
            let bytes = card.field(field).map(|contents| contents.encode()).transpose()?;
            fields.push((field, bytes));
        }
        let record = serde_json::to_vec(&card.record())?;
        self.store.atomically(|txn| {
            txn.put(&StoreKey::Card(card.id).to_string(), record);
            for (field, bytes) in fields {
                let key = StoreKey::CardField(card.id, field).to_string();
                match bytes {
                    Some(bytes) => txn.put(&key, bytes),
                    None => txn.remove(&key),
                }
            }
            let mut index = card_index(txn, doc)?;
            if !index.contains(&card.id) {
                index.push(card.id);
                put_card_index(txn, doc, &index)?;
            }
            Ok(())
        })
    }

    pub fn load_flashcard(&self, id: CardId) -> Result<Option<Flashcard>, MarginaliaError> {
        let Some(bytes) = self.store.get(&StoreKey::Card(id).to_string())? else {
            return Ok(None);
        };
        let record: FlashcardRecord = serde_json::from_slice(&bytes)?;
        let load = |field: FlashcardField| -> Result<_, MarginaliaError> {
            Ok(self
                .store
                .get(&StoreKey::CardField(id, field).to_string())?
                .map(|bytes| CodedTextViewContents::decode_or_empty(&bytes)))
        };
        Ok(Some(Flashcard {
            id: record.id,
            chapter: record.chapter,
            question: load(FlashcardField::Question)?.unwrap_or_default(),
            hint: if record.has_hint {
                load(FlashcardField::Hint)?
            } else {
                None
            },
            answer: load(FlashcardField::Answer)?.unwrap_or_default(),
        }))
    }

    /// Every flashcard of `doc`, in creation order.
    pub fn flashcards(&self, doc: DocumentId) -> Result<Vec<Flashcard>, MarginaliaError> {
        let index = read_card_index(&self.store, doc)?;
        let mut cards = Vec::with_capacity(index.len());
        for id in index {
            match self.load_flashcard(id)? {
                Some(card) => cards.push(card),
                None => tracing::warn!("Card index of {doc} lists missing card {id}"),
            }
        }
        Ok(cards)
    }

    pub fn delete_flashcard(&mut self, doc: DocumentId, id: CardId) -> Result<(), MarginaliaError> {
        self.store.atomically(|txn| {
            remove_card(txn, id);
            let mut index = card_index(txn, doc)?;
            index.retain(|card| *card != id);
            put_card_index(txn, doc, &index)
        })
    }

    /// Insert a new item with the configured label right after `id`'s subtree.
    pub fn add_item_below(
        &mut self,
        doc: DocumentId,
        id: OutlineId,
    ) -> Result<EditOutcome, MarginaliaError> {
        let label = self.new_item_label.clone();
        self.apply_outline_edit(doc, &OutlineEdit::AddSiblingBelow { id, label })
    }

    /// Append a new last child with the configured label under `id`.
    pub fn add_subitem(
        &mut self,
        doc: DocumentId,
        id: OutlineId,
    ) -> Result<EditOutcome, MarginaliaError> {
        let label = self.new_item_label.clone();
        self.apply_outline_edit(doc, &OutlineEdit::AddChild { id, label })
    }

    /// Run `edit` on the stored outline of `doc` and persist the result in one atomic unit:
    /// the renumbered outline, the notes of moved chapters under their new keys, and the chapters
    /// of affected flashcards. Notes and flashcards of removed items are deleted.
    pub fn apply_outline_edit(
        &mut self,
        doc: DocumentId,
        edit: &OutlineEdit,
    ) -> Result<EditOutcome, MarginaliaError> {
        let mut outline = self
            .load_outline(doc)?
            .ok_or_else(|| MarginaliaError::NotFound(format!("outline of document {doc}")))?;
        let outcome = outline.apply(edit)?;
        let records = serde_json::to_vec(&outline.to_records())?;

        let moves: BTreeMap<Chapter, Chapter> = outcome
            .changes
            .iter()
            .map(|change| (change.old.clone(), change.new.clone()))
            .collect();
        let removed: Vec<Chapter> = outcome
            .removed
            .iter()
            .map(|(_, chapter)| chapter.clone())
            .collect();

        self.store.atomically(|txn| {
            txn.put(&StoreKey::Outline(doc).to_string(), records);

            // Read every moved note before writing any, since moves can chain.
            let mut notes = Vec::new();
            for (old, new) in moves.iter() {
                let key = StoreKey::Note(doc, old.clone()).to_string();
                if let Some(bytes) = txn.get(&key)? {
                    notes.push((key, StoreKey::Note(doc, new.clone()).to_string(), bytes));
                }
            }
            for (old_key, _, _) in notes.iter() {
                txn.remove(old_key);
            }
            for chapter in removed.iter() {
                txn.remove(&StoreKey::Note(doc, chapter.clone()).to_string());
            }
            for (_, new_key, bytes) in notes {
                txn.put(&new_key, bytes);
            }

            let mut index = card_index(txn, doc)?;
            let mut dropped = Vec::new();
            for id in index.iter() {
                let key = StoreKey::Card(*id).to_string();
                let Some(bytes) = txn.get(&key)? else {
                    continue;
                };
                let mut record: FlashcardRecord = serde_json::from_slice(&bytes)?;
                if removed.contains(&record.chapter) {
                    dropped.push(*id);
                } else if let Some(new) = moves.get(&record.chapter) {
                    record.chapter = new.clone();
                    txn.put(&key, serde_json::to_vec(&record)?);
                }
            }
            if !dropped.is_empty() {
                for id in dropped.iter() {
                    remove_card(txn, *id);
                }
                index.retain(|id| !dropped.contains(id));
                put_card_index(txn, doc, &index)?;
            }
            tracing::debug!(
                "outline edit on {doc}: {} chapters moved, {} removed, {} staged writes",
                moves.len(),
                removed.len(),
                txn.staged()
            );
            Ok(())
        })?;
        Ok(outcome)
    }
}

fn read_card_index<S: ObjectStore>(
    store: &S,
    doc: DocumentId,
) -> Result<Vec<CardId>, MarginaliaError> {
    match store.get(&StoreKey::CardIndex(doc).to_string())? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}

fn card_index<S: ObjectStore>(
    txn: &Transaction<'_, S>,
    doc: DocumentId,
) -> Result<Vec<CardId>, MarginaliaError> {
    match txn.get(&StoreKey::CardIndex(doc).to_string())? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}

fn put_card_index<S: ObjectStore>(
    txn: &mut Transaction<'_, S>,
    doc: DocumentId,
    index: &[CardId],
) -> Result<(), MarginaliaError> {
    txn.put(
        &StoreKey::CardIndex(doc).to_string(),
        serde_json::to_vec(index)?,
    );
    Ok(())
}

fn remove_card<S: ObjectStore>(txn: &mut Transaction<'_, S>, id: CardId) {
    txn.remove(&StoreKey::Card(id).to_string());
    for field in FlashcardField::ALL {
        txn.remove(&StoreKey::CardField(id, field).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::Block, store::MemoryStore};
    use test_log::test;

    fn library() -> Library<MemoryStore> {
        Library::new(MemoryStore::new(), &MarginaliaConfig::default())
    }

    #[test]
    fn test_missing_things_read_as_none() {
        let library = library();
        let doc = DocumentId::new();
        assert!(library.load_outline(doc).unwrap().is_none());
        assert!(library.load_contents(doc, &Chapter::root()).unwrap().is_none());
        assert!(library
            .load_contents_or_empty(doc, &Chapter::root())
            .unwrap()
            .is_empty());
        assert!(library.load_flashcard(CardId::new()).unwrap().is_none());
        assert!(library.flashcards(doc).unwrap().is_empty());
    }

    #[test]
    fn test_encode_failure_writes_nothing() {
        let mut library = library();
        let doc = DocumentId::new();
        let bad = CodedTextViewContents::new(vec![Block::image(Vec::new())]);
        assert!(matches!(
            library.save_contents(doc, &Chapter::new([0]), &bad),
            Err(MarginaliaError::Encode(_))
        ));
        assert!(library.store().is_empty());
    }

    #[test]
    fn test_undecodable_note_reads_empty() {
        let mut store = MemoryStore::new();
        let doc = DocumentId::new();
        store
            .put(&StoreKey::Note(doc, Chapter::new([0])).to_string(), b"garbage".to_vec())
            .unwrap();
        let library = Library::new(store, &MarginaliaConfig::default());
        assert!(library.load_contents(doc, &Chapter::new([0])).is_err());
        assert!(library
            .load_contents_or_empty(doc, &Chapter::new([0]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_edit_without_outline_is_not_found() {
        let mut library = library();
        let result = library.apply_outline_edit(
            DocumentId::new(),
            &OutlineEdit::Delete {
                id: OutlineId::new(),
            },
        );
        assert!(matches!(result, Err(MarginaliaError::NotFound(_))));
    }
}
