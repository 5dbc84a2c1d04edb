use std::sync::Arc;

use crate::{
    chapter::Chapter,
    outline::{OutlineItem, UNKNOWN_PAGE},
    properties::OutlineId,
};

/// A frozen outline tree. Nodes are shared through [Arc], so snapshots are cheap to hand to
/// several observers and never change after they are taken.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineNode {
    item: OutlineItem,
    children: Vec<Arc<OutlineNode>>,
}

impl OutlineNode {
    /// Build the tree of chapter-ordered `items`. When the outline has no root item the tree gets
    /// a placeholder root with a nil id, an empty label and an unknown page.
    pub(crate) fn build(items: &[OutlineItem]) -> Arc<OutlineNode> {
        let (root, rest) = match items.first() {
            Some(first) if first.chapter.is_root() => (first.clone(), &items[1..]),
            _ => (
                OutlineItem {
                    id: OutlineId::nil(),
                    label: String::new(),
                    page: UNKNOWN_PAGE,
                    chapter: Chapter::root(),
                    parent: None,
                },
                items,
            ),
        };
        let mut pos = 0;
        let children = build_children(rest, &mut pos, 1);
        Arc::new(OutlineNode {
            item: root,
            children,
        })
    }

    pub fn item(&self) -> &OutlineItem {
        &self.item
    }

    pub fn children(&self) -> &[Arc<OutlineNode>] {
        &self.children
    }

    /// The node at `chapter` below this node.
    pub fn find(&self, chapter: &Chapter) -> Option<&OutlineNode> {
        let relative = chapter
            .indexes()
            .strip_prefix(self.item.chapter.indexes())?;
        let mut node = self;
        for index in relative {
            node = node.children.get(*index as usize)?;
        }
        Some(node)
    }

    /// Every item of the tree in document order.
    pub fn items(&self) -> Vec<&OutlineItem> {
        let mut out = vec![&self.item];
        for child in self.children.iter() {
            out.extend(child.items());
        }
        out
    }

    /// The item a reader on `page` is in: the last item in document order that starts on or
    /// before the page. Items with unknown pages are skipped.
    pub fn locate_page(&self, page: i64) -> Option<&OutlineItem> {
        self.items()
            .into_iter()
            .rev()
            .find(|item| item.has_page() && item.page <= page)
    }
}

fn build_children(items: &[OutlineItem], pos: &mut usize, depth: usize) -> Vec<Arc<OutlineNode>> {
    let mut children = Vec::new();
    while let Some(item) = items.get(*pos) {
        if item.depth() != depth {
            break;
        }
        *pos += 1;
        let grandchildren = build_children(items, pos, depth + 1);
        children.push(Arc::new(OutlineNode {
            item: item.clone(),
            children: grandchildren,
        }));
    }
    children
}
