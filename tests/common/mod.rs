//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use marginalia_core::{
    block::{Block, BlockType, StyledText},
    chapter::Chapter,
    outline::OutlineContainer,
    style::InlineStyle,
};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// The three item outline used by the end-to-end lookups.
#[allow(dead_code)]
pub fn small_outline() -> OutlineContainer {
    OutlineContainer::from_items(
        vec![
            ("Root", 0, Chapter::root()),
            ("Ch1", 5, Chapter::new([0])),
            ("Ch1.1", 10, Chapter::new([0, 0])),
        ],
        1,
    )
    .unwrap()
}

/// A short note: a heading and a paragraph with one bold word.
#[allow(dead_code)]
pub fn short_note() -> Vec<Block> {
    let mut body = StyledText::new("remember this");
    body.set_style(0..8, InlineStyle::Bold, true);
    vec![
        Block::new(BlockType::Header1, "Summary").unwrap(),
        Block::Text(body),
    ]
}
