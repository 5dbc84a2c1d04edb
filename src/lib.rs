//! # marginalia-core
//!
//! The document core of a reader that pairs books and PDFs with block-structured notes and
//! flashcards.
//!
//! ## Overview
//!
//! A note is an ordered sequence of typed blocks (text, headers, lists, code, images) whose text
//! carries inline styling: bold, italic, underline, code, highlight, links and page links. Notes
//! and flashcard fields share one JSON byte encoding. Each note belongs to a chapter of the book's
//! outline, addressed by a dotted path that stays ordered and collision free while the outline is
//! edited.
//!
//! ## Architecture
//!
//! - **[`chapter`]**: the `Chapter` path address and its document order
//! - **[`style`]**: inline style masks, attribute resolution, palette and key chords
//! - **[`block`]**: block types, styled text runs and range style editing
//! - **[`codec`]**: the byte encoding and `CodedTextViewContents`, one persisted text field
//! - **[`outline`]**: `OutlineContainer` lookups, depth-limited view, structural edits, snapshots
//! - **[`flashcard`]**: question, hint and answer cards
//! - **[`store`]**: the `ObjectStore` seam, memory and file stores, and the `Library` adapter
//! - **[`config`]**: TOML backed settings
//!
//! Only [`store`] touches persistence. The rest is pure, synchronous and single threaded.
//!
//! ## Quick Start
//!
//! ```rust
//! use marginalia_core::{
//!     block::{Block, StyledText},
//!     chapter::Chapter,
//!     codec::{decode, encode},
//!     outline::{OutlineContainer, OutlineSelector},
//!     style::InlineStyle,
//! };
//!
//! let mut text = StyledText::new("hello world");
//! text.set_style(0..5, InlineStyle::Bold, true);
//! let bytes = encode(&[Block::Text(text)])?;
//! let blocks = decode(&bytes)?;
//! assert_eq!(blocks[0].runs()[0].range, 0..5);
//!
//! let outline = OutlineContainer::from_items(
//!     vec![
//!         ("Root", 0, Chapter::root()),
//!         ("Ch1", 5, Chapter::new([0])),
//!         ("Ch1.1", 10, Chapter::new([0, 0])),
//!     ],
//!     1,
//! )?;
//! let item = outline.get(&OutlineSelector::Page(10), false).unwrap();
//! assert_eq!(item.chapter.prefix(), "1.1");
//! # Ok::<(), marginalia_core::MarginaliaError>(())
//! ```
pub mod block;
pub mod chapter;
pub mod codec;
pub mod config;
pub mod error;
pub mod ffi;
pub mod flashcard;
pub mod outline;
pub mod properties;
pub mod store;
pub mod style;
#[cfg(test)]
mod tests;

pub use error::*;

uniffi::setup_scaffolding!();
