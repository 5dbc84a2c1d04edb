use marginalia_core::{
    chapter::Chapter,
    codec::CodedTextViewContents,
    config::MarginaliaConfig,
    flashcard::Flashcard,
    outline::OutlineEdit,
    properties::DocumentId,
    store::{FileStore, Library, MemoryStore, ObjectStore},
    MarginaliaError,
};
use tempfile::TempDir;
use test_log::test;

mod common;

fn note(text: &str) -> CodedTextViewContents {
    CodedTextViewContents::from_plain_text(text)
}

fn seeded<S: ObjectStore>(store: S) -> (Library<S>, DocumentId) {
    let doc = DocumentId::new();
    let mut library = Library::new(store, &MarginaliaConfig::default());
    library.save_outline(doc, &common::small_outline()).unwrap();
    library
        .save_contents(doc, &Chapter::new([0]), &note("chapter one"))
        .unwrap();
    library
        .save_contents(doc, &Chapter::new([0, 0]), &note("section one"))
        .unwrap();
    (library, doc)
}

#[test]
fn test_new_item_shifted_left_carries_its_note_and_cards() {
    let (mut library, doc) = seeded(MemoryStore::new());
    let outline = library.load_outline(doc).unwrap().unwrap();
    let section = outline.item_at(&Chapter::new([0, 0])).unwrap().id;

    let outcome = library.add_item_below(doc, section).unwrap();
    let added = outcome.inserted.unwrap();
    let outline = library.load_outline(doc).unwrap().unwrap();
    assert_eq!(outline.item(&added).unwrap().label, "New Chapter");
    assert_eq!(outline.item(&added).unwrap().chapter, Chapter::new([0, 1]));

    library
        .save_contents(doc, &Chapter::new([0, 1]), &note("new notes"))
        .unwrap();
    let card = Flashcard::from_selection(Chapter::new([0, 1]), note("what is new?"), "this");
    library.save_flashcard(doc, &card).unwrap();

    library
        .apply_outline_edit(doc, &OutlineEdit::ShiftLeft { id: added })
        .unwrap();
    assert!(library
        .load_contents(doc, &Chapter::new([0, 1]))
        .unwrap()
        .is_none());
    assert_eq!(
        library
            .load_contents(doc, &Chapter::new([1]))
            .unwrap()
            .unwrap()
            .plain_text(),
        "new notes"
    );
    let moved = library.load_flashcard(card.id).unwrap().unwrap();
    assert_eq!(moved.chapter, Chapter::new([1]));
    assert_eq!(moved.answer.plain_text(), "this");
}

#[test]
fn test_deleting_a_chapter_drops_its_notes_and_cards() {
    let (mut library, doc) = seeded(MemoryStore::new());
    let card = Flashcard::from_selection(Chapter::new([0, 0]), note("q"), "a");
    library.save_flashcard(doc, &card).unwrap();
    let outline = library.load_outline(doc).unwrap().unwrap();
    let ch1 = outline.item_at(&Chapter::new([0])).unwrap().id;

    let outcome = library
        .apply_outline_edit(doc, &OutlineEdit::Delete { id: ch1 })
        .unwrap();
    assert_eq!(outcome.removed.len(), 2);
    assert!(library
        .load_contents(doc, &Chapter::new([0]))
        .unwrap()
        .is_none());
    assert!(library
        .load_contents(doc, &Chapter::new([0, 0]))
        .unwrap()
        .is_none());
    assert!(library.load_flashcard(card.id).unwrap().is_none());
    assert!(library.flashcards(doc).unwrap().is_empty());
    assert_eq!(library.load_outline(doc).unwrap().unwrap().len(), 1);
}

#[test]
fn test_illegal_edit_leaves_store_unchanged() {
    let (mut library, doc) = seeded(MemoryStore::new());
    let before: Vec<String> = library.store().keys().map(str::to_string).collect();
    let outline = library.load_outline(doc).unwrap().unwrap();
    let root = outline.root().unwrap().id;

    let err = library
        .apply_outline_edit(doc, &OutlineEdit::Delete { id: root })
        .unwrap_err();
    assert!(matches!(err, MarginaliaError::InvalidEdit(_)));
    let after: Vec<String> = library.store().keys().map(str::to_string).collect();
    assert_eq!(before, after);
    assert_eq!(library.load_outline(doc).unwrap().unwrap(), outline);

    let missing = library.apply_outline_edit(DocumentId::new(), &OutlineEdit::Delete { id: root });
    assert!(matches!(missing, Err(MarginaliaError::NotFound(_))));
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    let (mut library, doc) = seeded(FileStore::open(&path).unwrap());
    let card = Flashcard::new(
        Chapter::new([0]),
        note("Who wrote it?"),
        Some(note("initials A.B.")),
        note("Someone"),
    );
    library.save_flashcard(doc, &card).unwrap();
    drop(library);

    let library = Library::new(FileStore::open(&path).unwrap(), &MarginaliaConfig::default());
    let outline = library.load_outline(doc).unwrap().unwrap();
    let labels: Vec<&str> = outline.items().iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["Root", "Ch1", "Ch1.1"]);
    assert!(outline.validate().is_ok());
    assert_eq!(
        library
            .load_contents_or_empty(doc, &Chapter::new([0, 0]))
            .unwrap()
            .plain_text(),
        "section one"
    );
    assert!(library
        .load_contents_or_empty(doc, &Chapter::new([3]))
        .unwrap()
        .is_empty());
    let cards = library.flashcards(doc).unwrap();
    assert_eq!(cards, vec![card]);
    assert!(cards[0].matches("a.b."));
}
