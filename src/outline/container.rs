use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use crate::{
    chapter::Chapter,
    error::MarginaliaError,
    outline::{
        snapshot::OutlineNode, ChapterChange, EditOutcome, OutlineEdit, OutlineItem,
        OutlineRecord, OutlineSelector, TocEntry, TocNode, UNKNOWN_PAGE,
    },
    properties::OutlineId,
};

/// Default collapse depth of the depth-limited view.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// The outline of one document.
///
/// Items are kept sorted by chapter, which is pre-order document order. Chapters are pairwise
/// distinct and dense: every non-root item's parent chapter is present (or is the root) and
/// sibling indexes count up from zero without gaps.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineContainer {
    items: Vec<OutlineItem>,
    index: BTreeMap<OutlineId, usize>,
    max_depth: usize,
}

impl Default for OutlineContainer {
    fn default() -> Self {
        OutlineContainer {
            items: Vec::new(),
            index: BTreeMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Edits work on the pre-order list of items paired with their depths; [renumber] turns such a
/// list back into chapters.
type Levels = Vec<(OutlineItem, usize)>;

impl OutlineContainer {
    pub fn new(max_depth: usize) -> OutlineContainer {
        OutlineContainer {
            max_depth,
            ..Default::default()
        }
    }

    /// Build from `(label, page, chapter)` triples in any order.
    ///
    /// Two entries with the same chapter are rejected. Entries whose parent chapter is missing
    /// attach to their nearest present ancestor (the root when there is none), and sibling indexes
    /// are renumbered densely, so the stored chapters may differ from the given ones.
    pub fn from_items<S: Into<String>>(
        entries: Vec<(S, i64, Chapter)>,
        max_depth: usize,
    ) -> Result<OutlineContainer, MarginaliaError> {
        let items = entries
            .into_iter()
            .map(|(label, page, chapter)| OutlineItem::new(label, page, chapter))
            .collect();
        OutlineContainer::from_outline_items(items, max_depth)
    }

    /// Rebuild a persisted outline. Ids are kept, so a round trip through [Self::to_records]
    /// preserves identity.
    pub fn from_records(
        records: Vec<OutlineRecord>,
        max_depth: usize,
    ) -> Result<OutlineContainer, MarginaliaError> {
        let mut seen = BTreeSet::new();
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id) {
                return Err(MarginaliaError::StructuralInvariant(format!(
                    "outline id {} appears twice",
                    record.id
                )));
            }
            items.push(OutlineItem {
                id: record.id,
                label: record.label,
                page: record.page.max(UNKNOWN_PAGE),
                chapter: record.chapter,
                parent: None,
            });
        }
        OutlineContainer::from_outline_items(items, max_depth)
    }

    /// Build from a flat table of contents in document order, numbering chapters in pre-order.
    /// A depth more than one level below the previous entry is clamped to one level. Only the
    /// first entry may be the root entry (depth 0); later depth 0 entries become top-level.
    pub fn from_toc(entries: Vec<TocEntry>, max_depth: usize) -> OutlineContainer {
        let levels = entries
            .into_iter()
            .enumerate()
            .map(|(n, entry)| {
                let depth = if n > 0 { entry.depth.max(1) } else { entry.depth };
                (OutlineItem::new(entry.label, entry.page, Chapter::root()), depth)
            })
            .collect();
        let mut container = OutlineContainer::new(max_depth);
        container.install(renumber(levels));
        container
    }

    /// Build from a nested table of contents. The given nodes become top-level items under an
    /// absent root.
    pub fn from_tree(roots: Vec<TocNode>, max_depth: usize) -> OutlineContainer {
        fn walk(node: TocNode, depth: usize, out: &mut Vec<TocEntry>) {
            out.push(TocEntry::new(node.label, node.page, depth));
            for child in node.children {
                walk(child, depth + 1, out);
            }
        }
        let mut entries = Vec::new();
        for root in roots {
            walk(root, 1, &mut entries);
        }
        OutlineContainer::from_toc(entries, max_depth)
    }

    fn from_outline_items(
        mut items: Vec<OutlineItem>,
        max_depth: usize,
    ) -> Result<OutlineContainer, MarginaliaError> {
        items.sort_by(|a, b| a.chapter.cmp(&b.chapter));
        if let Some(pair) = items.windows(2).find(|pair| pair[0].chapter == pair[1].chapter) {
            return Err(MarginaliaError::DuplicateChapter(format!(
                "'{}' and '{}' both claim chapter '{}'",
                pair[0].label, pair[1].label, pair[0].chapter
            )));
        }

        // Depth of each item is one below its nearest present ancestor.
        let mut depths: BTreeMap<Chapter, usize> = BTreeMap::new();
        let mut levels = Vec::with_capacity(items.len());
        for item in items {
            let depth = if item.chapter.is_root() {
                0
            } else {
                let mut ancestor = item.chapter.parent();
                let mut parent_depth = 0;
                while let Some(chapter) = ancestor {
                    if chapter.is_root() {
                        break;
                    }
                    if let Some(depth) = depths.get(&chapter) {
                        parent_depth = *depth;
                        break;
                    }
                    ancestor = chapter.parent();
                }
                parent_depth + 1
            };
            depths.insert(item.chapter.clone(), depth);
            levels.push((item, depth));
        }

        let mut container = OutlineContainer::new(max_depth);
        container.install(renumber(levels));
        Ok(container)
    }

    pub fn to_records(&self) -> Vec<OutlineRecord> {
        self.items.iter().map(OutlineRecord::from).collect()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in document order.
    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    pub fn root(&self) -> Option<&OutlineItem> {
        self.items.first().filter(|item| item.chapter.is_root())
    }

    pub fn item(&self, id: &OutlineId) -> Option<&OutlineItem> {
        self.index.get(id).map(|pos| &self.items[*pos])
    }

    pub fn item_at(&self, chapter: &Chapter) -> Option<&OutlineItem> {
        self.position_of(chapter).map(|pos| &self.items[pos])
    }

    pub fn parent(&self, id: &OutlineId) -> Option<&OutlineItem> {
        self.item(id)
            .and_then(|item| item.parent)
            .and_then(|parent| self.item(&parent))
    }

    pub fn children(&self, id: &OutlineId) -> Vec<&OutlineItem> {
        match self.index.get(id) {
            Some(pos) => {
                let depth = self.items[*pos].depth();
                self.items[pos + 1..]
                    .iter()
                    .take_while(|item| item.depth() > depth)
                    .filter(|item| item.parent == Some(*id))
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// The order-preserving projection onto items at most [Self::max_depth] deep.
    pub fn depth_limited_list(&self) -> Vec<&OutlineItem> {
        self.items
            .iter()
            .filter(|item| item.depth() <= self.max_depth)
            .collect()
    }

    /// The item an item collapses into in the depth-limited view: itself when shallow enough,
    /// otherwise its ancestor at the max depth.
    pub fn collapsed(&self, item: &OutlineItem) -> Option<&OutlineItem> {
        if item.depth() <= self.max_depth {
            self.item(&item.id)
        } else {
            self.item_at(&item.chapter.truncated(self.max_depth))
        }
    }

    /// Look up an item. Misses are `None`.
    ///
    /// With `depth_limited` the search runs over the depth-limited view: a page hit deeper than
    /// the max depth maps to its ancestor at that depth, and the relative selectors compare
    /// against the query chapter cut down to the max depth.
    pub fn get(&self, selector: &OutlineSelector, depth_limited: bool) -> Option<&OutlineItem> {
        match selector {
            OutlineSelector::Page(page) => {
                let hit = self.items.iter().find(|item| item.page == *page)?;
                if depth_limited {
                    self.collapsed(hit)
                } else {
                    Some(hit)
                }
            }
            OutlineSelector::Chapter(chapter) => {
                if depth_limited {
                    self.item_at(&chapter.truncated(self.max_depth))
                } else {
                    self.item_at(chapter)
                }
            }
            OutlineSelector::PreviousBefore(chapter) => {
                if depth_limited {
                    let chapter = chapter.truncated(self.max_depth);
                    self.items[..self.lower_bound(&chapter)]
                        .iter()
                        .rev()
                        .find(|item| item.depth() <= self.max_depth)
                } else {
                    self.lower_bound(chapter)
                        .checked_sub(1)
                        .map(|pos| &self.items[pos])
                }
            }
            OutlineSelector::NextAfter(chapter) => {
                if depth_limited {
                    let chapter = chapter.truncated(self.max_depth);
                    self.items[self.upper_bound(&chapter)..]
                        .iter()
                        .find(|item| item.depth() <= self.max_depth)
                } else {
                    self.items.get(self.upper_bound(chapter))
                }
            }
        }
    }

    /// Apply an edit. Illegal edits fail with [MarginaliaError::InvalidEdit] and leave the outline
    /// unchanged.
    pub fn apply(&mut self, edit: &OutlineEdit) -> Result<EditOutcome, MarginaliaError> {
        match edit {
            OutlineEdit::AddSiblingBelow { id, label } => self.add_sibling_below(id, label.clone()),
            OutlineEdit::AddChild { id, label } => self.add_child(id, label.clone()),
            OutlineEdit::Delete { id } => self.delete_item(id),
            OutlineEdit::ShiftLeft { id } => self.shift_left(id),
            OutlineEdit::ShiftRight { id } => self.shift_right(id),
        }
    }

    /// Insert a new item right after `id`'s subtree, at the same depth. The new item starts on
    /// the same page as `id`.
    pub fn add_sibling_below<S: Into<String>>(
        &mut self,
        id: &OutlineId,
        label: S,
    ) -> Result<EditOutcome, MarginaliaError> {
        let pos = self.require(id)?;
        let anchor = &self.items[pos];
        if anchor.chapter.is_root() {
            return Err(MarginaliaError::InvalidEdit(
                "the root item cannot have siblings".to_string(),
            ));
        }
        let new_item = OutlineItem::new(label, anchor.page, Chapter::root());
        let new_id = new_item.id;
        let depth = anchor.depth();
        let mut levels = self.levels();
        let at = subtree_end(&levels, pos);
        levels.insert(at, (new_item, depth));
        tracing::debug!("add sibling below {}: new item {new_id}", self.items[pos].chapter);
        let mut outcome = self.commit(levels);
        outcome.inserted = Some(new_id);
        Ok(outcome)
    }

    /// Append a new last child under `id`.
    pub fn add_child<S: Into<String>>(
        &mut self,
        id: &OutlineId,
        label: S,
    ) -> Result<EditOutcome, MarginaliaError> {
        let pos = self.require(id)?;
        let anchor = &self.items[pos];
        let new_item = OutlineItem::new(label, anchor.page, Chapter::root());
        let new_id = new_item.id;
        let depth = anchor.depth() + 1;
        let mut levels = self.levels();
        let at = subtree_end(&levels, pos);
        levels.insert(at, (new_item, depth));
        tracing::debug!("add child under '{}': new item {new_id}", self.items[pos].chapter);
        let mut outcome = self.commit(levels);
        outcome.inserted = Some(new_id);
        Ok(outcome)
    }

    /// Remove `id` and its whole subtree.
    pub fn delete_item(&mut self, id: &OutlineId) -> Result<EditOutcome, MarginaliaError> {
        let pos = self.require(id)?;
        if self.items[pos].chapter.is_root() {
            return Err(MarginaliaError::InvalidEdit(
                "the root item cannot be deleted".to_string(),
            ));
        }
        let mut levels = self.levels();
        let end = subtree_end(&levels, pos);
        let removed: Vec<(OutlineId, Chapter)> = levels
            .drain(pos..end)
            .map(|(item, _)| (item.id, item.chapter))
            .collect();
        tracing::debug!(
            "delete '{}' with {} descendants",
            self.items[pos].chapter,
            removed.len() - 1
        );
        let mut outcome = self.commit(levels);
        outcome.removed = removed;
        Ok(outcome)
    }

    /// Promote `id` one level. It becomes the sibling directly after its former parent, taking
    /// its subtree along; its later siblings stay with the former parent.
    pub fn shift_left(&mut self, id: &OutlineId) -> Result<EditOutcome, MarginaliaError> {
        let pos = self.require(id)?;
        let depth = self.items[pos].depth();
        if depth < 2 {
            return Err(MarginaliaError::InvalidEdit(format!(
                "'{}' is already at the top level",
                self.items[pos].label
            )));
        }
        let mut levels = self.levels();
        let parent_pos = (0..pos)
            .rev()
            .find(|p| levels[*p].1 < depth)
            .ok_or_else(|| {
                MarginaliaError::StructuralInvariant(format!(
                    "'{}' has no parent",
                    self.items[pos].chapter
                ))
            })?;
        let end = subtree_end(&levels, pos);
        let moved: Levels = levels
            .drain(pos..end)
            .map(|(item, level)| (item, level - 1))
            .collect();
        let at = subtree_end(&levels, parent_pos);
        levels.splice(at..at, moved);
        tracing::debug!("shift left '{}'", self.items[pos].chapter);
        Ok(self.commit(levels))
    }

    /// Demote `id` one level, making it the last child of its previous sibling.
    pub fn shift_right(&mut self, id: &OutlineId) -> Result<EditOutcome, MarginaliaError> {
        let pos = self.require(id)?;
        let item = &self.items[pos];
        if item.chapter.is_root() {
            return Err(MarginaliaError::InvalidEdit(
                "the root item cannot be shifted".to_string(),
            ));
        }
        if item.chapter.index() == Some(0) {
            return Err(MarginaliaError::InvalidEdit(format!(
                "'{}' has no previous sibling to move under",
                item.label
            )));
        }
        let mut levels = self.levels();
        let end = subtree_end(&levels, pos);
        for (_, level) in levels[pos..end].iter_mut() {
            *level += 1;
        }
        tracing::debug!("shift right '{}'", self.items[pos].chapter);
        Ok(self.commit(levels))
    }

    /// An immutable tree of the whole outline, for observers that must not see later edits.
    pub fn snapshot(&self) -> Arc<OutlineNode> {
        OutlineNode::build(&self.items)
    }

    /// Check the ordering, density and parent invariants.
    pub fn validate(&self) -> Result<(), MarginaliaError> {
        let fail = |msg: String| Err(MarginaliaError::StructuralInvariant(msg));
        for pair in self.items.windows(2) {
            if pair[0].chapter >= pair[1].chapter {
                return fail(format!(
                    "'{}' does not sort before '{}'",
                    pair[0].chapter, pair[1].chapter
                ));
            }
        }
        for (pos, item) in self.items.iter().enumerate() {
            if item.chapter.is_root() && pos != 0 {
                return fail("root item is not first".to_string());
            }
            if self.index.get(&item.id) != Some(&pos) {
                return fail(format!("index out of date for {}", item.id));
            }
            let Some(parent_chapter) = item.chapter.parent() else {
                continue;
            };
            let expected_parent = self.item_at(&parent_chapter).map(|parent| parent.id);
            if !parent_chapter.is_root() && expected_parent.is_none() {
                return fail(format!("'{}' has no parent item", item.chapter));
            }
            if item.parent != expected_parent {
                return fail(format!("'{}' has a stale parent link", item.chapter));
            }
            if let Some(index) = item.chapter.index() {
                if index > 0 && self.item_at(&item.chapter.sibling(index - 1)).is_none() {
                    return fail(format!("'{}' follows a gap", item.chapter));
                }
            }
        }
        if self.index.len() != self.items.len() {
            return fail("duplicate outline ids".to_string());
        }
        Ok(())
    }

    fn require(&self, id: &OutlineId) -> Result<usize, MarginaliaError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| MarginaliaError::NotFound(format!("outline item {id}")))
    }

    fn position_of(&self, chapter: &Chapter) -> Option<usize> {
        self.items
            .binary_search_by(|item| item.chapter.cmp(chapter))
            .ok()
    }

    /// Number of items strictly before `chapter`.
    fn lower_bound(&self, chapter: &Chapter) -> usize {
        self.items.partition_point(|item| item.chapter < *chapter)
    }

    /// Number of items at or before `chapter`.
    fn upper_bound(&self, chapter: &Chapter) -> usize {
        self.items.partition_point(|item| item.chapter <= *chapter)
    }

    fn levels(&self) -> Levels {
        self.items
            .iter()
            .map(|item| (item.clone(), item.depth()))
            .collect()
    }

    fn commit(&mut self, levels: Levels) -> EditOutcome {
        let before: BTreeMap<OutlineId, Chapter> = self
            .items
            .iter()
            .map(|item| (item.id, item.chapter.clone()))
            .collect();
        self.install(renumber(levels));
        let changes = self
            .items
            .iter()
            .filter_map(|item| {
                let old = before.get(&item.id)?;
                (*old != item.chapter).then(|| ChapterChange {
                    id: item.id,
                    old: old.clone(),
                    new: item.chapter.clone(),
                })
            })
            .collect();
        debug_assert!(self.validate().is_ok(), "{:?}", self.validate());
        EditOutcome {
            changes,
            ..Default::default()
        }
    }

    fn install(&mut self, items: Vec<OutlineItem>) {
        self.index = items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id, pos))
            .collect();
        self.items = items;
    }
}

/// End (exclusive) of the subtree starting at `pos`.
fn subtree_end(levels: &[(OutlineItem, usize)], pos: usize) -> usize {
    let depth = levels[pos].1;
    levels[pos + 1..]
        .iter()
        .position(|(_, level)| *level <= depth)
        .map(|offset| pos + 1 + offset)
        .unwrap_or(levels.len())
}

/// Assign chapters and parent ids to a pre-order list of items with depths.
///
/// Depth 0 marks the root item. A depth more than one below the previous item is clamped, and
/// non-root items are at least one deep.
fn renumber(levels: Levels) -> Vec<OutlineItem> {
    let mut path: Vec<u32> = Vec::new();
    let mut ancestors: Vec<OutlineId> = Vec::new();
    let mut root_id = None;
    let mut items = Vec::with_capacity(levels.len());
    for (mut item, depth) in levels {
        if depth == 0 && root_id.is_none() && items.is_empty() {
            item.chapter = Chapter::root();
            item.parent = None;
            root_id = Some(item.id);
            items.push(item);
            continue;
        }
        let depth = depth.clamp(1, path.len() + 1);
        if depth <= path.len() {
            path.truncate(depth);
            path[depth - 1] += 1;
        } else {
            path.push(0);
        }
        ancestors.truncate(depth - 1);
        item.parent = ancestors.last().copied().or(root_id);
        item.chapter = Chapter::new(path.clone());
        ancestors.push(item.id);
        items.push(item);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn book() -> OutlineContainer {
        OutlineContainer::from_items(
            vec![
                ("Root", 0, Chapter::root()),
                ("Ch1", 5, Chapter::new([0])),
                ("Ch1.1", 10, Chapter::new([0, 0])),
                ("Ch1.2", 12, Chapter::new([0, 1])),
                ("Ch2", 20, Chapter::new([1])),
                ("Ch2.1", 22, Chapter::new([1, 0])),
                ("Ch3", 30, Chapter::new([2])),
            ],
            1,
        )
        .unwrap()
    }

    fn labels(container: &OutlineContainer) -> Vec<(&str, String)> {
        container
            .items()
            .iter()
            .map(|item| (item.label.as_str(), item.chapter.to_string()))
            .collect()
    }

    fn id_of(container: &OutlineContainer, label: &str) -> OutlineId {
        container
            .items()
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.id)
            .unwrap()
    }

    #[test]
    fn test_lookup_by_page_and_depth_limit() {
        let outline = book();
        assert_eq!(outline.get(&OutlineSelector::Page(10), false).unwrap().label, "Ch1.1");
        assert_eq!(outline.get(&OutlineSelector::Page(10), true).unwrap().label, "Ch1");
        assert!(outline.get(&OutlineSelector::Page(11), false).is_none());
        let limited: Vec<&str> = outline
            .depth_limited_list()
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(limited, vec!["Root", "Ch1", "Ch2", "Ch3"]);
    }

    #[test]
    fn test_relative_lookups() {
        let outline = book();
        let ch1_2 = Chapter::new([0, 1]);
        assert_eq!(
            outline.get(&OutlineSelector::NextAfter(ch1_2.clone()), false).unwrap().label,
            "Ch2"
        );
        assert_eq!(
            outline.get(&OutlineSelector::PreviousBefore(ch1_2.clone()), false).unwrap().label,
            "Ch1.1"
        );
        assert_eq!(
            outline.get(&OutlineSelector::PreviousBefore(ch1_2.clone()), true).unwrap().label,
            "Root"
        );
        assert_eq!(
            outline.get(&OutlineSelector::NextAfter(ch1_2), true).unwrap().label,
            "Ch2"
        );
        assert!(outline
            .get(&OutlineSelector::PreviousBefore(Chapter::root()), false)
            .is_none());
        assert!(outline
            .get(&OutlineSelector::NextAfter(Chapter::new([2])), false)
            .is_none());
        assert_eq!(
            outline
                .get(&OutlineSelector::Chapter(Chapter::new([1, 0])), true)
                .unwrap()
                .label,
            "Ch2"
        );
    }

    #[test]
    fn test_duplicate_chapter_rejected() {
        let result = OutlineContainer::from_items(
            vec![("A", 0, Chapter::new([0])), ("B", 1, Chapter::new([0]))],
            1,
        );
        assert!(matches!(result, Err(MarginaliaError::DuplicateChapter(_))));
    }

    #[test]
    fn test_orphans_and_gaps_normalized() {
        let outline = OutlineContainer::from_items(
            vec![
                ("Ch5", 50, Chapter::new([4])),
                ("Lost", 60, Chapter::new([7, 3, 2])),
                ("Ch1", 10, Chapter::new([0])),
                ("Ch5.3", 55, Chapter::new([4, 2])),
            ],
            1,
        )
        .unwrap();
        assert_eq!(
            labels(&outline),
            vec![
                ("Ch1", "0".to_string()),
                ("Ch5", "1".to_string()),
                ("Ch5.3", "1,0".to_string()),
                ("Lost", "2".to_string()),
            ]
        );
        outline.validate().unwrap();
        assert!(outline.root().is_none());
        assert_eq!(outline.item_at(&Chapter::new([0])).unwrap().parent, None);
    }

    #[test]
    fn test_add_sibling_below_renumbers_followers() {
        let mut outline = book();
        let ch1 = id_of(&outline, "Ch1");
        let outcome = outline.add_sibling_below(&ch1, "New").unwrap();
        let new_id = outcome.inserted.unwrap();
        assert_eq!(outline.item(&new_id).unwrap().chapter, Chapter::new([1]));
        assert_eq!(outline.item(&new_id).unwrap().page, 5);
        let ch2_1 = id_of(&outline, "Ch2.1");
        assert_eq!(outline.item(&ch2_1).unwrap().chapter, Chapter::new([2, 0]));
        let moved: BTreeSet<OutlineId> = outcome.changes.iter().map(|c| c.id).collect();
        assert_eq!(moved.len(), 3);
        assert!(moved.contains(&ch2_1));
    }

    #[test]
    fn test_add_child_appends_last() {
        let mut outline = book();
        let ch1 = id_of(&outline, "Ch1");
        let outcome = outline.add_child(&ch1, "Ch1.3").unwrap();
        assert!(outcome.changes.is_empty());
        let new_item = outline.item(&outcome.inserted.unwrap()).unwrap();
        assert_eq!(new_item.chapter, Chapter::new([0, 2]));
        assert_eq!(new_item.parent, Some(ch1));

        let root = outline.root().unwrap().id;
        let outcome = outline.add_child(&root, "Ch4").unwrap();
        assert_eq!(
            outline.item(&outcome.inserted.unwrap()).unwrap().chapter,
            Chapter::new([3])
        );
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut outline = book();
        let ch1 = id_of(&outline, "Ch1");
        let outcome = outline.delete_item(&ch1).unwrap();
        assert_eq!(outcome.removed.len(), 3);
        assert_eq!(
            labels(&outline),
            vec![
                ("Root", "".to_string()),
                ("Ch2", "0".to_string()),
                ("Ch2.1", "0,0".to_string()),
                ("Ch3", "1".to_string()),
            ]
        );
        let root = outline.root().unwrap().id;
        assert!(matches!(
            outline.delete_item(&root),
            Err(MarginaliaError::InvalidEdit(_))
        ));
    }

    #[test]
    fn test_shift_left_moves_after_parent() {
        let mut outline = book();
        let ch1_1 = id_of(&outline, "Ch1.1");
        outline.shift_left(&ch1_1).unwrap();
        assert_eq!(
            labels(&outline),
            vec![
                ("Root", "".to_string()),
                ("Ch1", "0".to_string()),
                ("Ch1.2", "0,0".to_string()),
                ("Ch1.1", "1".to_string()),
                ("Ch2", "2".to_string()),
                ("Ch2.1", "2,0".to_string()),
                ("Ch3", "3".to_string()),
            ]
        );
        let ch2 = id_of(&outline, "Ch2");
        assert!(matches!(
            outline.shift_left(&ch2),
            Err(MarginaliaError::InvalidEdit(_))
        ));
    }

    #[test]
    fn test_shift_right_nests_under_previous_sibling() {
        let mut outline = book();
        let ch2 = id_of(&outline, "Ch2");
        let outcome = outline.shift_right(&ch2).unwrap();
        assert_eq!(
            labels(&outline),
            vec![
                ("Root", "".to_string()),
                ("Ch1", "0".to_string()),
                ("Ch1.1", "0,0".to_string()),
                ("Ch1.2", "0,1".to_string()),
                ("Ch2", "0,2".to_string()),
                ("Ch2.1", "0,2,0".to_string()),
                ("Ch3", "1".to_string()),
            ]
        );
        assert_eq!(outline.parent(&ch2).unwrap().label, "Ch1");
        assert_eq!(outcome.changes.len(), 3);

        let before = outline.clone();
        let ch1 = id_of(&outline, "Ch1");
        assert!(matches!(
            outline.shift_right(&ch1),
            Err(MarginaliaError::InvalidEdit(_))
        ));
        assert_eq!(outline, before);
    }

    #[test]
    fn test_unknown_id() {
        let mut outline = book();
        assert!(matches!(
            outline.delete_item(&OutlineId::new()),
            Err(MarginaliaError::NotFound(_))
        ));
    }

    #[test]
    fn test_toc_clamps_depth_jumps() {
        let outline = OutlineContainer::from_toc(
            vec![
                TocEntry::new("Book", 0, 0),
                TocEntry::new("Part", 1, 1),
                TocEntry::new("Deep", 2, 4),
                TocEntry::new("Next", 3, 2),
            ],
            1,
        );
        assert_eq!(
            labels(&outline),
            vec![
                ("Book", "".to_string()),
                ("Part", "0".to_string()),
                ("Deep", "0,0".to_string()),
                ("Next", "0,1".to_string()),
            ]
        );
        outline.validate().unwrap();
    }

    #[test]
    fn test_tree_and_records_round_trip() {
        let outline = OutlineContainer::from_tree(
            vec![
                TocNode {
                    label: "A".to_string(),
                    page: 1,
                    children: vec![TocNode {
                        label: "A.1".to_string(),
                        page: 2,
                        children: Vec::new(),
                    }],
                },
                TocNode {
                    label: "B".to_string(),
                    page: 3,
                    children: Vec::new(),
                },
            ],
            2,
        );
        assert_eq!(
            labels(&outline),
            vec![
                ("A", "0".to_string()),
                ("A.1", "0,0".to_string()),
                ("B", "1".to_string()),
            ]
        );
        let restored = OutlineContainer::from_records(outline.to_records(), 2).unwrap();
        assert_eq!(restored, outline);

        let mut records = outline.to_records();
        records[1].id = records[0].id;
        assert!(matches!(
            OutlineContainer::from_records(records, 2),
            Err(MarginaliaError::StructuralInvariant(_))
        ));
    }

    #[test]
    fn test_children_and_parent_links() {
        let outline = book();
        let ch1 = id_of(&outline, "Ch1");
        let children: Vec<&str> = outline
            .children(&ch1)
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(children, vec!["Ch1.1", "Ch1.2"]);
        let root = outline.root().unwrap().id;
        assert_eq!(outline.parent(&ch1).unwrap().id, root);
        assert_eq!(outline.children(&root).len(), 3);
    }
}
