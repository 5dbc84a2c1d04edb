//! Shared test utilities for unit tests.

use crate::{
    block::{Block, BlockType, ImageBlock, ListBlock, OrderedListBlock, StyleRun, StyledText},
    chapter::Chapter,
    outline::OutlineContainer,
    style::InlineStyle,
};
use url::Url;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// "Read the manual carefully" with bold, a linked code span and a page link.
pub fn sample_styled_text() -> StyledText {
    let mut text = StyledText::new("Read the manual carefully");
    text.set_style(0..4, InlineStyle::Bold, true);
    text.set_style(9..15, InlineStyle::Code, true);
    text.set_link(
        9..15,
        Some(Url::parse("https://example.com/manual").unwrap()),
    );
    text.set_page_link(16..25, Some(42));
    text
}

/// One block of every concrete type.
pub fn sample_blocks() -> Vec<Block> {
    init_logging();
    vec![
        Block::new(BlockType::Header1, "Chapter notes").unwrap(),
        Block::Text(sample_styled_text()),
        Block::new(BlockType::Header2, "Details").unwrap(),
        Block::List(ListBlock {
            content: StyledText::with_runs(
                "first point",
                vec![StyleRun::new(0..5, InlineStyle::Italic | InlineStyle::Underline)],
            )
            .unwrap(),
            indent: 1,
        }),
        Block::OrderedList(OrderedListBlock {
            content: StyledText::new("step two"),
            indent: 0,
            ordinal: 2,
        }),
        Block::new(BlockType::CodeSnippet, "fn main() {\n    println!(\"hi\");\n}").unwrap(),
        Block::Image(ImageBlock {
            data: vec![0x89, 0x50, 0x4e, 0x47],
            width: Some(320.0),
            height: None,
        }),
    ]
}

/// Root, two chapters with sections, and a bare third chapter.
pub fn sample_outline() -> OutlineContainer {
    init_logging();
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
