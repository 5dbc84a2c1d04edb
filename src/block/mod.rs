//! Blocks are the structural units of a rich text field: paragraphs, headers, list items, code
//! snippets and images.
//!
//! [BlockType] is the closed set of kinds (including the two non-content markers used by the
//! editor's block menu) and [Block] is the sum type holding each kind's content. Adding a kind is
//! a compile error in every exhaustive match, which is where the codec and the style builder
//! dispatch.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    ops::Range,
    str::FromStr,
};

use crate::error::MarginaliaError;

pub mod text;

pub use text::{StyleRun, StyledText};

/// Deepest nesting level a list item may carry.
pub const MAX_LIST_INDENT: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Header1,
    Header2,
    List,
    OrderedList,
    CodeSnippet,
    Image,
    /// Block menu marker: turn the selection into a flashcard. Never stored as a block.
    Flashcard,
    /// Block menu marker: emphasize the selection. Never stored as a block.
    Emphasized,
}

/// Static description of a block kind, as shown in the block menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub markdown_trigger: Option<&'static str>,
    /// Symbol name resolved by the UI layer.
    pub icon: &'static str,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Text,
        BlockType::Header1,
        BlockType::Header2,
        BlockType::List,
        BlockType::OrderedList,
        BlockType::CodeSnippet,
        BlockType::Image,
        BlockType::Flashcard,
        BlockType::Emphasized,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Header1 => "header1",
            BlockType::Header2 => "header2",
            BlockType::List => "list",
            BlockType::OrderedList => "orderedlist",
            BlockType::CodeSnippet => "codesnippet",
            BlockType::Image => "image",
            BlockType::Flashcard => "flashcard",
            BlockType::Emphasized => "emphasized",
        }
    }

    pub fn descriptor(&self) -> BlockDescriptor {
        match self {
            BlockType::Text => BlockDescriptor {
                name: "Text",
                description: "Plain paragraph text",
                markdown_trigger: None,
                icon: "text.alignleft",
            },
            BlockType::Header1 => BlockDescriptor {
                name: "Heading 1",
                description: "Large section heading",
                markdown_trigger: Some("#"),
                icon: "textformat.size.larger",
            },
            BlockType::Header2 => BlockDescriptor {
                name: "Heading 2",
                description: "Medium section heading",
                markdown_trigger: Some("##"),
                icon: "textformat.size",
            },
            BlockType::List => BlockDescriptor {
                name: "Bulleted List",
                description: "A simple bulleted list item",
                markdown_trigger: Some("-"),
                icon: "list.bullet",
            },
            BlockType::OrderedList => BlockDescriptor {
                name: "Numbered List",
                description: "A list item with numbering",
                markdown_trigger: Some("1."),
                icon: "list.number",
            },
            BlockType::CodeSnippet => BlockDescriptor {
                name: "Code",
                description: "A multi-line code snippet",
                markdown_trigger: Some("```"),
                icon: "chevron.left.forwardslash.chevron.right",
            },
            BlockType::Image => BlockDescriptor {
                name: "Image",
                description: "An embedded image",
                markdown_trigger: None,
                icon: "photo",
            },
            BlockType::Flashcard => BlockDescriptor {
                name: "Flashcard",
                description: "Create a flashcard from the selection",
                markdown_trigger: None,
                icon: "rectangle.on.rectangle",
            },
            BlockType::Emphasized => BlockDescriptor {
                name: "Emphasized",
                description: "Call out the selection",
                markdown_trigger: None,
                icon: "exclamationmark.bubble",
            },
        }
    }

    /// Content kinds can be stored in a document; markers only drive editor commands.
    pub fn is_content(&self) -> bool {
        !matches!(self, BlockType::Flashcard | BlockType::Emphasized)
    }

    /// Every kind holds a single line except code snippets.
    pub fn is_single_line(&self) -> bool {
        !matches!(self, BlockType::CodeSnippet)
    }

    /// Kinds whose content is text, and so feed the search index.
    pub fn is_string_based(&self) -> bool {
        matches!(
            self,
            BlockType::Text
                | BlockType::Header1
                | BlockType::Header2
                | BlockType::List
                | BlockType::OrderedList
                | BlockType::CodeSnippet
        )
    }

    /// The block kind whose markdown trigger is exactly `token`.
    pub fn from_markdown_trigger(token: &str) -> Option<BlockType> {
        MARKDOWN_TRIGGERS
            .iter()
            .find(|(trigger, _)| *trigger == token)
            .map(|(_, block_type)| *block_type)
    }

    /// Detect a markdown trigger at the start of `line`. A trigger must be followed by a space,
    /// except the code fence which may also stand alone. Longer triggers are tried first so `"## "`
    /// is a second level header and never a first level one.
    ///
    /// Returns the kind and the number of chars (trigger plus space) to strip from the line.
    pub fn detect_markdown_prefix(line: &str) -> Option<(BlockType, usize)> {
        MARKDOWN_TRIGGERS.iter().find_map(|(trigger, block_type)| {
            let rest = line.strip_prefix(trigger)?;
            let trigger_len = trigger.chars().count();
            if rest.starts_with(' ') {
                Some((*block_type, trigger_len + 1))
            } else if rest.is_empty() && *block_type == BlockType::CodeSnippet {
                Some((*block_type, trigger_len))
            } else {
                None
            }
        })
    }
}

/// Markdown triggers, longest first.
static MARKDOWN_TRIGGERS: Lazy<Vec<(&'static str, BlockType)>> = Lazy::new(|| {
    let mut triggers: Vec<(&'static str, BlockType)> = BlockType::ALL
        .iter()
        .filter_map(|block_type| {
            block_type
                .descriptor()
                .markdown_trigger
                .map(|trigger| (trigger, *block_type))
        })
        .collect();
    triggers.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.1.cmp(&b.1)));
    triggers
});

impl Display for BlockType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for BlockType {
    type Err = MarginaliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .find(|block_type| block_type.tag() == s)
            .copied()
            .ok_or_else(|| MarginaliaError::InvalidType(format!("unrecognized block type '{s}'")))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    pub content: StyledText,
    pub indent: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedListBlock {
    pub content: StyledText,
    pub indent: u8,
    /// The number shown in front of the item, starting at 1.
    pub ordinal: u32,
}

impl Default for OrderedListBlock {
    fn default() -> Self {
        OrderedListBlock {
            content: StyledText::default(),
            indent: 0,
            ordinal: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub data: Vec<u8>,
    /// Display size in points, when the user resized the image.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Text(StyledText),
    Header1(StyledText),
    Header2(StyledText),
    List(ListBlock),
    OrderedList(OrderedListBlock),
    CodeSnippet(StyledText),
    Image(ImageBlock),
}

impl Block {
    /// Build a block of `block_type` holding `content`. Images have no text content and markers
    /// are never blocks, so both are rejected.
    pub fn new<T: Into<StyledText>>(
        block_type: BlockType,
        content: T,
    ) -> Result<Block, MarginaliaError> {
        let content = content.into();
        match block_type {
            BlockType::Text => Ok(Block::Text(content)),
            BlockType::Header1 => Ok(Block::Header1(content)),
            BlockType::Header2 => Ok(Block::Header2(content)),
            BlockType::List => Ok(Block::List(ListBlock { content, indent: 0 })),
            BlockType::OrderedList => Ok(Block::OrderedList(OrderedListBlock {
                content,
                ..Default::default()
            })),
            BlockType::CodeSnippet => Ok(Block::CodeSnippet(content)),
            BlockType::Image => Err(MarginaliaError::InvalidData(
                "image blocks are built from image data, not text".to_string(),
            )),
            BlockType::Flashcard | BlockType::Emphasized => Err(MarginaliaError::InvalidType(
                format!("'{block_type}' is a marker, not a content block"),
            )),
        }
    }

    /// Build a block over `range` of an owning text storage.
    pub fn from_storage(
        block_type: BlockType,
        storage: &StyledText,
        range: Range<usize>,
    ) -> Result<Block, MarginaliaError> {
        let len = storage.char_len();
        if range.start > range.end || range.end > len {
            return Err(MarginaliaError::InvalidData(format!(
                "block range {range:?} outside storage of length {len}"
            )));
        }
        Block::new(block_type, storage.slice(range))
    }

    pub fn text_block<S: Into<String>>(text: S) -> Block {
        Block::Text(StyledText::new(text))
    }

    pub fn image(data: Vec<u8>) -> Block {
        Block::Image(ImageBlock {
            data,
            ..Default::default()
        })
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Text(_) => BlockType::Text,
            Block::Header1(_) => BlockType::Header1,
            Block::Header2(_) => BlockType::Header2,
            Block::List(_) => BlockType::List,
            Block::OrderedList(_) => BlockType::OrderedList,
            Block::CodeSnippet(_) => BlockType::CodeSnippet,
            Block::Image(_) => BlockType::Image,
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.block_type().is_single_line()
    }

    pub fn is_string_based(&self) -> bool {
        self.block_type().is_string_based()
    }

    pub fn styled_text(&self) -> Option<&StyledText> {
        match self {
            Block::Text(content)
            | Block::Header1(content)
            | Block::Header2(content)
            | Block::CodeSnippet(content) => Some(content),
            Block::List(list) => Some(&list.content),
            Block::OrderedList(list) => Some(&list.content),
            Block::Image(_) => None,
        }
    }

    pub fn styled_text_mut(&mut self) -> Option<&mut StyledText> {
        match self {
            Block::Text(content)
            | Block::Header1(content)
            | Block::Header2(content)
            | Block::CodeSnippet(content) => Some(content),
            Block::List(list) => Some(&mut list.content),
            Block::OrderedList(list) => Some(&mut list.content),
            Block::Image(_) => None,
        }
    }

    /// The block's text; empty for images.
    pub fn text(&self) -> &str {
        self.styled_text().map(StyledText::text).unwrap_or("")
    }

    pub fn runs(&self) -> &[StyleRun] {
        self.styled_text().map(StyledText::runs).unwrap_or(&[])
    }

    pub fn list_indent(&self) -> Option<u8> {
        match self {
            Block::List(list) => Some(list.indent),
            Block::OrderedList(list) => Some(list.indent),
            _ => None,
        }
    }

    /// Convert into another kind, keeping the text. Used when the user picks a kind from the block
    /// menu or types a markdown trigger.
    pub fn convert(&self, block_type: BlockType) -> Result<Block, MarginaliaError> {
        match self {
            Block::Image(_) if block_type == BlockType::Image => Ok(self.clone()),
            Block::Image(_) => Err(MarginaliaError::InvalidData(
                "image blocks cannot be converted to text blocks".to_string(),
            )),
            _ => Block::new(block_type, self.styled_text().cloned().unwrap_or_default()),
        }
    }

    /// Check the block can be persisted; the error names what is wrong.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Block::Text(content)
            | Block::Header1(content)
            | Block::Header2(content)
            | Block::CodeSnippet(content) => content.check_runs(),
            Block::List(list) => {
                check_indent(list.indent)?;
                list.content.check_runs()
            }
            Block::OrderedList(list) => {
                check_indent(list.indent)?;
                if list.ordinal == 0 {
                    return Err("ordered list ordinal must start at 1".to_string());
                }
                list.content.check_runs()
            }
            Block::Image(image) => {
                if image.data.is_empty() {
                    return Err("image block has no data".to_string());
                }
                for size in [image.width, image.height].into_iter().flatten() {
                    if !size.is_finite() || size <= 0.0 {
                        return Err(format!("image display size {size} is not positive"));
                    }
                }
                Ok(())
            }
        }
    }
}

fn check_indent(indent: u8) -> Result<(), String> {
    if indent > MAX_LIST_INDENT {
        Err(format!(
            "list indent {indent} exceeds maximum {MAX_LIST_INDENT}"
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_tags_round_trip() {
        for block_type in BlockType::ALL {
            assert_eq!(block_type.tag().parse::<BlockType>().unwrap(), block_type);
            let json = serde_json::to_string(&block_type).unwrap();
            assert_eq!(json, format!("\"{}\"", block_type.tag()));
        }
        assert!(matches!(
            "paragraph".parse::<BlockType>(),
            Err(MarginaliaError::InvalidType(_))
        ));
    }

    #[test]
    fn test_single_line_and_string_based() {
        for block_type in BlockType::ALL {
            assert_eq!(
                block_type.is_single_line(),
                block_type != BlockType::CodeSnippet
            );
        }
        assert!(!BlockType::Image.is_string_based());
        assert!(BlockType::CodeSnippet.is_string_based());
        assert!(!BlockType::Flashcard.is_content());
    }

    #[test]
    fn test_markdown_triggers_longest_first() {
        assert_eq!(
            BlockType::from_markdown_trigger("##"),
            Some(BlockType::Header2)
        );
        assert_eq!(BlockType::from_markdown_trigger("#"), Some(BlockType::Header1));
        assert_eq!(BlockType::from_markdown_trigger("*"), None);
        assert_eq!(
            BlockType::detect_markdown_prefix("## Intro"),
            Some((BlockType::Header2, 3))
        );
        assert_eq!(
            BlockType::detect_markdown_prefix("# Intro"),
            Some((BlockType::Header1, 2))
        );
        assert_eq!(
            BlockType::detect_markdown_prefix("1. first"),
            Some((BlockType::OrderedList, 3))
        );
        assert_eq!(
            BlockType::detect_markdown_prefix("- item"),
            Some((BlockType::List, 2))
        );
        assert_eq!(
            BlockType::detect_markdown_prefix("```"),
            Some((BlockType::CodeSnippet, 3))
        );
        assert_eq!(BlockType::detect_markdown_prefix("#hashtag"), None);
        assert_eq!(BlockType::detect_markdown_prefix("plain"), None);
        assert!(BlockType::Text.descriptor().markdown_trigger.is_none());
        assert!(BlockType::Image.descriptor().markdown_trigger.is_none());
    }

    #[test]
    fn test_construct_and_convert() {
        let block = Block::new(BlockType::Header1, "Title").unwrap();
        assert_eq!(block.block_type(), BlockType::Header1);
        assert_eq!(block.text(), "Title");
        let list = block.convert(BlockType::OrderedList).unwrap();
        assert_eq!(list.text(), "Title");
        assert_eq!(list.list_indent(), Some(0));
        assert!(matches!(
            Block::new(BlockType::Flashcard, "x"),
            Err(MarginaliaError::InvalidType(_))
        ));
        assert!(matches!(
            Block::new(BlockType::Image, "x"),
            Err(MarginaliaError::InvalidData(_))
        ));
        let image = Block::image(vec![1, 2, 3]);
        assert_eq!(image.text(), "");
        assert!(image.runs().is_empty());
        assert!(image.convert(BlockType::Text).is_err());
    }

    #[test]
    fn test_from_storage() {
        let mut storage = StyledText::new("first line\nsecond");
        storage.set_style(6..13, crate::style::InlineStyle::Bold, true);
        let block = Block::from_storage(BlockType::Text, &storage, 11..17).unwrap();
        assert_eq!(block.text(), "second");
        assert_eq!(block.runs().len(), 1);
        assert_eq!(block.runs()[0].range, 0..2);
        assert!(Block::from_storage(BlockType::Text, &storage, 11..40).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Block::text_block("ok").validate().is_ok());
        let deep = Block::List(ListBlock {
            content: StyledText::new("x"),
            indent: MAX_LIST_INDENT + 1,
        });
        assert!(deep.validate().is_err());
        let zero = Block::OrderedList(OrderedListBlock {
            ordinal: 0,
            ..Default::default()
        });
        assert!(zero.validate().is_err());
        assert!(Block::image(Vec::new()).validate().is_err());
        let mut sized = ImageBlock {
            data: vec![0],
            width: Some(-1.0),
            height: None,
        };
        assert!(Block::Image(sized.clone()).validate().is_err());
        sized.width = Some(120.0);
        assert!(Block::Image(sized).validate().is_ok());
    }
}
