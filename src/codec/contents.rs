use std::ops::Range;

use crate::{
    block::{Block, BlockType, StyledText},
    codec::{decode, encode},
    error::MarginaliaError,
};

/// The block sequence of one text field: a note chapter, or a flashcard question, hint or answer.
///
/// Keeps an index of its string-based blocks for search. Every mutation goes through this type so
/// the index is rebuilt whenever the sequence changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodedTextViewContents {
    blocks: Vec<Block>,
    text_blocks: Vec<usize>,
}

impl CodedTextViewContents {
    pub fn new(blocks: Vec<Block>) -> CodedTextViewContents {
        let mut contents = CodedTextViewContents {
            blocks,
            text_blocks: Vec::new(),
        };
        contents.reindex();
        contents
    }

    /// One unstyled text block holding `text`.
    pub fn from_plain_text<S: Into<String>>(text: S) -> CodedTextViewContents {
        CodedTextViewContents::new(vec![Block::text_block(text)])
    }

    /// Build a field from one text storage and its block layout. Block `i` covers `layout[i].1`
    /// of `storage`.
    pub fn from_storage(
        storage: &StyledText,
        layout: &[(BlockType, Range<usize>)],
    ) -> Result<CodedTextViewContents, MarginaliaError> {
        let blocks = layout
            .iter()
            .map(|(block_type, range)| Block::from_storage(*block_type, storage, range.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CodedTextViewContents::new(blocks))
    }

    pub fn decode(bytes: &[u8]) -> Result<CodedTextViewContents, MarginaliaError> {
        Ok(CodedTextViewContents::new(decode(bytes)?))
    }

    /// Decode `bytes`, falling back to an empty field when they are unreadable. For callers that
    /// must show something rather than fail.
    pub fn decode_or_empty(bytes: &[u8]) -> CodedTextViewContents {
        match CodedTextViewContents::decode(bytes) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Stored text field could not be decoded, showing it empty: {e}");
                CodedTextViewContents::default()
            }
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, MarginaliaError> {
        encode(&self.blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Positions of the string-based blocks, in order.
    pub fn text_block_indexes(&self) -> &[usize] {
        &self.text_blocks
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.text_blocks.iter().map(|idx| &self.blocks[*idx])
    }

    /// Text of the string-based blocks, one per line.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The string-based blocks joined into one storage, newline separated, runs kept.
    pub fn flatten(&self) -> StyledText {
        let mut storage = StyledText::default();
        for (n, block) in self.text_blocks().enumerate() {
            if n > 0 {
                storage.append(&StyledText::new("\n"));
            }
            if let Some(content) = block.styled_text() {
                storage.append(content);
            }
        }
        storage
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
        self.reindex();
    }

    pub fn insert(&mut self, idx: usize, block: Block) -> Result<(), MarginaliaError> {
        if idx > self.blocks.len() {
            return Err(MarginaliaError::InvalidEdit(format!(
                "cannot insert block at {idx}, field has {} blocks",
                self.blocks.len()
            )));
        }
        self.blocks.insert(idx, block);
        self.reindex();
        Ok(())
    }

    pub fn remove(&mut self, idx: usize) -> Option<Block> {
        if idx >= self.blocks.len() {
            return None;
        }
        let removed = self.blocks.remove(idx);
        self.reindex();
        Some(removed)
    }

    /// Swap the block at `idx` for `block`, returning the old one.
    pub fn replace(&mut self, idx: usize, block: Block) -> Result<Block, MarginaliaError> {
        let slot = self.blocks.get_mut(idx).ok_or_else(|| {
            MarginaliaError::NotFound(format!("no block at {idx}"))
        })?;
        let old = std::mem::replace(slot, block);
        self.reindex();
        Ok(old)
    }

    /// Edit the block at `idx` in place.
    pub fn update<F: FnOnce(&mut Block)>(
        &mut self,
        idx: usize,
        edit: F,
    ) -> Result<(), MarginaliaError> {
        let block = self
            .blocks
            .get_mut(idx)
            .ok_or_else(|| MarginaliaError::NotFound(format!("no block at {idx}")))?;
        edit(block);
        self.reindex();
        Ok(())
    }

    /// If the text block at `idx` starts with a markdown trigger, strip it and convert the block.
    /// Returns the new kind when a conversion happened.
    pub fn apply_markdown_trigger(
        &mut self,
        idx: usize,
    ) -> Result<Option<BlockType>, MarginaliaError> {
        let Some(Block::Text(content)) = self.blocks.get(idx) else {
            return Ok(None);
        };
        let Some((block_type, strip)) = BlockType::detect_markdown_prefix(content.text()) else {
            return Ok(None);
        };
        let mut content = content.clone();
        content.delete(0..strip);
        let converted = Block::new(block_type, content)?;
        tracing::debug!("block {idx} converted to {block_type} by markdown trigger");
        self.replace(idx, converted)?;
        Ok(Some(block_type))
    }

    fn reindex(&mut self) {
        self.text_blocks = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_string_based())
            .map(|(idx, _)| idx)
            .collect();
    }
}

impl From<Vec<Block>> for CodedTextViewContents {
    fn from(blocks: Vec<Block>) -> Self {
        CodedTextViewContents::new(blocks)
    }
}
