//! [Chapter] is the position of an outline item within its document tree.
//!
//! A chapter is the list of zero-based sibling indexes walked from the (implicit) root down to the
//! item. Ordering chapters lexicographically yields pre-order document order, and a chapter is an
//! ancestor of another exactly when its indexes are a strict prefix of the other's.
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::MarginaliaError;

/// Separator used by the persisted form of a chapter.
pub const CHAPTER_SEPARATOR: char = ',';

/// Compare two index paths: first by the first differing index, then by length, so a parent always
/// sorts directly before its descendants.
pub(crate) fn chapter_order(a: &[u32], b: &[u32]) -> Ordering {
    if let Some(order) = a.iter().zip(b.iter()).find_map(|(sub_a, sub_b)| {
        let cmp = sub_a.cmp(sub_b);
        match cmp {
            Ordering::Equal => None,
            _ => Some(cmp),
        }
    }) {
        order
    } else {
        a.len().cmp(&b.len())
    }
}

#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chapter {
    indexes: Vec<u32>,
}

impl Chapter {
    pub fn new<I: Into<Vec<u32>>>(indexes: I) -> Chapter {
        Chapter {
            indexes: indexes.into(),
        }
    }

    pub fn root() -> Chapter {
        Chapter::default()
    }

    pub fn indexes(&self) -> &[u32] {
        &self.indexes
    }

    pub fn depth(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_root(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Human readable numbering, 1-indexed per level: `[2, 4]` reads as `"3.5"`. The root reads
    /// as `"0"`.
    pub fn prefix(&self) -> String {
        if self.is_root() {
            return "0".to_string();
        }
        self.indexes
            .iter()
            .map(|idx| (u64::from(*idx) + 1).to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// True iff `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Chapter) -> bool {
        self.depth() < other.depth() && other.indexes.starts_with(&self.indexes)
    }

    /// Position among siblings, `None` for the root.
    pub fn index(&self) -> Option<u32> {
        self.indexes.last().copied()
    }

    pub fn parent(&self) -> Option<Chapter> {
        if self.is_root() {
            None
        } else {
            Some(Chapter::new(&self.indexes[..self.depth() - 1]))
        }
    }

    pub fn child(&self, index: u32) -> Chapter {
        let mut indexes = self.indexes.clone();
        indexes.push(index);
        Chapter { indexes }
    }

    /// The chapter at the same depth with its last index replaced. The root has no siblings and
    /// is returned unchanged.
    pub fn sibling(&self, index: u32) -> Chapter {
        let mut indexes = self.indexes.clone();
        if let Some(last) = indexes.last_mut() {
            *last = index;
        }
        Chapter { indexes }
    }

    /// Cut the chapter down to at most `depth` levels. This is the ancestor the chapter collapses
    /// into within a depth-limited view.
    pub fn truncated(&self, depth: usize) -> Chapter {
        Chapter::new(&self.indexes[..self.depth().min(depth)])
    }
}

impl Ord for Chapter {
    fn cmp(&self, other: &Self) -> Ordering {
        chapter_order(&self.indexes, &other.indexes)
    }
}

impl PartialOrd for Chapter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Chapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .indexes
            .iter()
            .map(|idx| idx.to_string())
            .collect::<Vec<_>>()
            .join(&CHAPTER_SEPARATOR.to_string());
        write!(f, "{joined}")
    }
}

impl FromStr for Chapter {
    type Err = MarginaliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Chapter::root());
        }
        let indexes = s
            .split(CHAPTER_SEPARATOR)
            .map(|token| {
                let digits = token.trim();
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(MarginaliaError::Decode(format!(
                        "Malformed chapter '{s}': token '{token}' is not an index"
                    )));
                }
                digits.parse::<u32>().map_err(|e| {
                    MarginaliaError::Decode(format!(
                        "Malformed chapter '{s}' at token '{token}': {e}"
                    ))
                })
            })
            .collect::<Result<Vec<u32>, MarginaliaError>>()?;
        Ok(Chapter { indexes })
    }
}

impl TryFrom<String> for Chapter {
    type Error = MarginaliaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for Chapter {
    type Error = MarginaliaError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Chapter> for String {
    fn from(val: Chapter) -> Self {
        val.to_string()
    }
}

impl From<&Chapter> for String {
    fn from(val: &Chapter) -> Self {
        val.to_string()
    }
}

impl From<Vec<u32>> for Chapter {
    fn from(indexes: Vec<u32>) -> Self {
        Chapter { indexes }
    }
}

impl From<&[u32]> for Chapter {
    fn from(indexes: &[u32]) -> Self {
        Chapter::new(indexes)
    }
}
