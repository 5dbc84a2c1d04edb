//! Performance benchmarks for the note codec and outline edits
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marginalia_core::{
    block::{Block, BlockType, StyledText},
    chapter::Chapter,
    codec::{decode, encode, CodedTextViewContents},
    outline::{OutlineContainer, TocEntry},
    style::InlineStyle,
};

// A long note: alternating headers, styled paragraphs and list items.
fn long_note(blocks: usize) -> Vec<Block> {
    (0..blocks)
        .map(|n| match n % 3 {
            0 => Block::new(BlockType::Header2, format!("Section {n}")).unwrap(),
            1 => {
                let mut text = StyledText::new(
                    "A paragraph with a few styled words and a link to page forty two.",
                );
                text.set_style(2..11, InlineStyle::Bold, true);
                text.set_style(19..25, InlineStyle::Italic, true);
                text.set_page_link(33..65, Some(41));
                Block::Text(text)
            }
            _ => Block::new(BlockType::List, "a list item").unwrap(),
        })
        .collect()
}

fn book_outline(chapters: usize) -> OutlineContainer {
    let mut entries = vec![TocEntry::new("Root", 0, 0)];
    for n in 0..chapters {
        entries.push(TocEntry::new(format!("Chapter {n}"), (n * 10) as i64, 1));
        for s in 0..4 {
            entries.push(TocEntry::new(format!("Section {s}"), (n * 10 + s) as i64, 2));
        }
    }
    OutlineContainer::from_toc(entries, 1)
}

fn bench_encode(c: &mut Criterion) {
    let blocks = long_note(300);
    c.bench_function("encode_300_blocks", |b| {
        b.iter(|| encode(black_box(&blocks)).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = encode(&long_note(300)).unwrap();
    c.bench_function("decode_300_blocks", |b| {
        b.iter(|| decode(black_box(&bytes)).unwrap())
    });
}

fn bench_flatten(c: &mut Criterion) {
    let contents = CodedTextViewContents::new(long_note(300));
    c.bench_function("flatten_300_blocks", |b| b.iter(|| contents.flatten()));
}

fn bench_outline_edit(c: &mut Criterion) {
    let outline = book_outline(100);
    let first = outline.item_at(&Chapter::new([0])).unwrap().id;
    c.bench_function("add_child_to_first_of_500_items", |b| {
        b.iter(|| {
            let mut outline = outline.clone();
            outline.add_child(black_box(&first), "New Chapter").unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_flatten,
    bench_outline_edit
);
criterion_main!(benches);
