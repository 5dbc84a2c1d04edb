//! Functions exported to the host application.
//!
//! Everything here takes and returns plain values (strings, byte buffers, integers) so the host
//! does not need to mirror the core's types.
use enumset::EnumSet;

use crate::{
    block::{Block, BlockType},
    chapter::Chapter,
    codec::CodedTextViewContents,
    error::MarginaliaError,
    style::{style_for_chord, InlineStyles, KeyChord, Modifier},
};

/// Encoded contents holding `text` as one unstyled text block.
#[uniffi::export]
pub fn plain_text_contents(text: String) -> Result<Vec<u8>, MarginaliaError> {
    CodedTextViewContents::from_plain_text(text).encode()
}

/// The dotted, 1-indexed numbering of a persisted chapter string.
#[uniffi::export]
pub fn chapter_prefix(chapter: String) -> Result<String, MarginaliaError> {
    Ok(chapter.parse::<Chapter>()?.prefix())
}

/// Text of each string-based block of encoded contents.
#[uniffi::export]
pub fn block_texts(contents: Vec<u8>) -> Result<Vec<String>, MarginaliaError> {
    let contents = CodedTextViewContents::decode(&contents)?;
    Ok(contents
        .text_blocks()
        .map(|block| block.text().to_string())
        .collect())
}

/// Searchable text of encoded contents. Unreadable contents have none.
#[uniffi::export]
pub fn searchable_text(contents: Vec<u8>) -> String {
    CodedTextViewContents::decode_or_empty(&contents).plain_text()
}

/// The inline style bit a key chord toggles, if it is a formatting shortcut. `modifiers` is a
/// bit set of command (1), shift (2), alt (4) and control (8).
#[uniffi::export]
pub fn style_for_key_chord(modifiers: u32, key_code: u16) -> Option<u32> {
    let chord = KeyChord::new(EnumSet::<Modifier>::from_u32_truncated(modifiers), key_code);
    style_for_chord(&chord).map(|style| InlineStyles::only(style).as_u32())
}

/// Block type tag selected by a markdown trigger at the start of `line`.
#[uniffi::export]
pub fn markdown_block_type(line: String) -> Option<String> {
    BlockType::detect_markdown_prefix(&line).map(|(block_type, _)| block_type.tag().to_string())
}

/// Encoded contents whose blocks are `(tag, text)` pairs, unstyled.
#[uniffi::export]
pub fn contents_from_texts(blocks: Vec<Vec<String>>) -> Result<Vec<u8>, MarginaliaError> {
    let blocks = blocks
        .into_iter()
        .map(|pair| match pair.as_slice() {
            [tag, text] => Block::new(tag.parse()?, text.as_str()),
            _ => Err(MarginaliaError::InvalidData(
                "expected a [type, text] pair".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    CodedTextViewContents::new(blocks).encode()
}
