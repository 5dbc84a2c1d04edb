//! Table-of-contents outlines addressed by [Chapter] paths.
//!
//! An [OutlineContainer] owns the flat, chapter-ordered item list of one document. Items keep a
//! stable [OutlineId] while structural edits renumber their chapters, and each item's parent is an
//! id the container recomputes after every edit.
//!
//! Besides the full list the container offers a depth-limited view: items deeper than the
//! configured maximum depth collapse into their ancestor at that depth. Notes and flashcards attach
//! to chapters of this coarser view.
use serde::{Deserialize, Serialize};

use crate::{chapter::Chapter, properties::OutlineId};

pub mod container;
pub mod snapshot;

pub use container::OutlineContainer;
pub use snapshot::OutlineNode;

/// Page number of items whose page the outline source did not know.
pub const UNKNOWN_PAGE: i64 = -1;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutlineItem {
    pub id: OutlineId,
    pub label: String,
    /// Zero based page, or [UNKNOWN_PAGE].
    pub page: i64,
    pub chapter: Chapter,
    /// The enclosing item, `None` for the root item and for top-level items when the outline has
    /// no root item.
    pub parent: Option<OutlineId>,
}

impl OutlineItem {
    pub fn new<S: Into<String>>(label: S, page: i64, chapter: Chapter) -> OutlineItem {
        OutlineItem {
            id: OutlineId::new(),
            label: label.into(),
            page: page.max(UNKNOWN_PAGE),
            chapter,
            parent: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.chapter.depth()
    }

    pub fn has_page(&self) -> bool {
        self.page != UNKNOWN_PAGE
    }
}

/// Persisted form of an outline item. Parents are derived from chapters on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineRecord {
    pub id: OutlineId,
    pub label: String,
    pub page: i64,
    pub chapter: Chapter,
}

impl From<&OutlineItem> for OutlineRecord {
    fn from(item: &OutlineItem) -> Self {
        OutlineRecord {
            id: item.id,
            label: item.label.clone(),
            page: item.page,
            chapter: item.chapter.clone(),
        }
    }
}

/// One line of a flat table of contents as an outline parser reports it. Depth 0 is the root
/// entry, 1 a top-level entry and so on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub label: String,
    pub page: i64,
    pub depth: usize,
}

impl TocEntry {
    pub fn new<S: Into<String>>(label: S, page: i64, depth: usize) -> TocEntry {
        TocEntry {
            label: label.into(),
            page,
            depth,
        }
    }
}

/// A nested table of contents entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocNode {
    pub label: String,
    pub page: i64,
    #[serde(default)]
    pub children: Vec<TocNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutlineSelector {
    /// First item in document order on this page.
    Page(i64),
    Chapter(Chapter),
    /// Last item strictly before the chapter in document order.
    PreviousBefore(Chapter),
    /// First item strictly after the chapter in document order.
    NextAfter(Chapter),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineEdit {
    AddSiblingBelow { id: OutlineId, label: String },
    AddChild { id: OutlineId, label: String },
    Delete { id: OutlineId },
    ShiftLeft { id: OutlineId },
    ShiftRight { id: OutlineId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterChange {
    pub id: OutlineId,
    pub old: Chapter,
    pub new: Chapter,
}

/// What an edit did: every surviving item whose chapter changed, plus the inserted or removed ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub changes: Vec<ChapterChange>,
    pub inserted: Option<OutlineId>,
    /// Removed items with the chapters they had before the edit.
    pub removed: Vec<(OutlineId, Chapter)>,
}
