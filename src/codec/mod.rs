//! Persisted byte form of block sequences.
//!
//! A document field encodes as a JSON array with one tagged entry per block:
//!
//! ```json
//! [
//!   {"type": "header1", "coded": {"text": "Notes"}},
//!   {"type": "text", "coded": {
//!     "text": "hello",
//!     "runs": [{"location": 0, "length": 5, "styles": 1}]
//!   }},
//!   {"type": "image", "coded": {"data": [137, 80, 78, 71]}}
//! ]
//! ```
//!
//! Round trips are semantic: decoding what was encoded gives equal blocks, but re-encoding is not
//! promised to reproduce the same bytes.
//!
//! ## Key Components
//!
//! - [`encode`] / [`decode`] - whole-sequence conversion
//! - [`CodedBlock`] - one tagged entry of the array
//! - [`CodedTextViewContents`] - an owned block sequence for one text field, the unit the
//!   persistence layer stores
use serde::{Deserialize, Serialize};

use crate::{block::Block, error::MarginaliaError};

pub mod contents;
pub mod payload;

pub use contents::CodedTextViewContents;
pub use payload::CodedRun;

/// One tagged entry of the encoded array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodedBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub coded: serde_json::Value,
}

impl CodedBlock {
    pub fn from_block(block: &Block) -> Result<CodedBlock, MarginaliaError> {
        block.validate().map_err(|reason| {
            MarginaliaError::Encode(format!("cannot encode {} block: {reason}", block.block_type()))
        })?;
        let coded = payload::encode_payload(block).map_err(|e| {
            MarginaliaError::Encode(format!("cannot encode {} block: {e}", block.block_type()))
        })?;
        Ok(CodedBlock {
            block_type: block.block_type().tag().to_string(),
            coded,
        })
    }

    pub fn into_block(self) -> Result<Block, MarginaliaError> {
        payload::decode_payload(&self.block_type, self.coded)
    }
}

/// Encode `blocks`. Nothing is produced unless every block encodes.
pub fn encode(blocks: &[Block]) -> Result<Vec<u8>, MarginaliaError> {
    let coded = blocks
        .iter()
        .map(CodedBlock::from_block)
        .collect::<Result<Vec<_>, _>>()?;
    let bytes = serde_json::to_vec(&coded)
        .map_err(|e| MarginaliaError::Encode(format!("cannot write block array: {e}")))?;
    tracing::debug!("encoded {} blocks into {} bytes", blocks.len(), bytes.len());
    Ok(bytes)
}

/// Decode bytes produced by [encode].
pub fn decode(bytes: &[u8]) -> Result<Vec<Block>, MarginaliaError> {
    let coded: Vec<CodedBlock> = serde_json::from_slice(bytes)
        .map_err(|e| MarginaliaError::FailedToConvertBlockDataToBlocks(e.to_string()))?;
    let blocks = coded
        .into_iter()
        .map(CodedBlock::into_block)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!("decoded {} blocks from {} bytes", blocks.len(), bytes.len());
    Ok(blocks)
}
