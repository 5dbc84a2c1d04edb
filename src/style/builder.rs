use enumset::EnumSet;
use serde::{Deserialize, Serialize};

use crate::{
    block::{Block, BlockType},
    style::{Attributes, Color, Font, FontTrait, InlineStyle, InlineStyles, ParagraphStyle},
};

/// The block-level style every span of a block starts out from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseStyle {
    pub color: Color,
    pub font_size: f32,
    pub paragraph_spacing: f32,
    pub block_type: BlockType,
}

/// Fonts, sizes and colours used when building attributes. Every field has a default so a partial
/// `[palette]` table in the config file is enough.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePalette {
    pub body_family: String,
    pub code_family: String,
    pub text_size: f32,
    pub header1_size: f32,
    pub header2_size: f32,
    pub paragraph_spacing: f32,
    pub header_spacing: f32,
    /// Indent per list level, in points.
    pub list_indent: f32,
    pub text_color: Color,
    pub code_foreground: Color,
    pub code_background: Color,
    pub highlight_background: Color,
    pub page_link_foreground: Color,
    pub page_link_background: Color,
}

impl Default for StylePalette {
    fn default() -> Self {
        StylePalette {
            body_family: "Helvetica Neue".to_string(),
            code_family: "Menlo".to_string(),
            text_size: 14.0,
            header1_size: 24.0,
            header2_size: 19.0,
            paragraph_spacing: 6.0,
            header_spacing: 10.0,
            list_indent: 18.0,
            text_color: Color::rgb(0x1d, 0x1d, 0x1f),
            code_foreground: Color::rgb(0xc4, 0x1a, 0x16),
            code_background: Color::rgb(0xf2, 0xf2, 0xf4),
            highlight_background: Color::rgba(0xff, 0xe0, 0x66, 0xcc),
            page_link_foreground: Color::rgb(0x0a, 0x5c, 0xc2),
            page_link_background: Color::rgba(0xd6, 0xe8, 0xff, 0xcc),
        }
    }
}

impl StylePalette {
    pub fn base_style(&self, block_type: BlockType) -> BaseStyle {
        let (font_size, paragraph_spacing) = match block_type {
            BlockType::Header1 => (self.header1_size, self.header_spacing),
            BlockType::Header2 => (self.header2_size, self.header_spacing),
            BlockType::Text
            | BlockType::List
            | BlockType::OrderedList
            | BlockType::CodeSnippet
            | BlockType::Image
            | BlockType::Flashcard
            | BlockType::Emphasized => (self.text_size, self.paragraph_spacing),
        };
        BaseStyle {
            color: self.text_color,
            font_size,
            paragraph_spacing,
            block_type,
        }
    }
}

/// Resolves inline style masks into [Attributes].
#[derive(Clone, Debug, Default)]
pub struct StyleBuilder {
    palette: StylePalette,
}

impl StyleBuilder {
    pub fn new(palette: StylePalette) -> StyleBuilder {
        StyleBuilder { palette }
    }

    pub fn palette(&self) -> &StylePalette {
        &self.palette
    }

    /// The attribute set for unstyled text in a block of the given base style.
    pub fn base_attributes(&self, base: &BaseStyle) -> Attributes {
        let family = match base.block_type {
            BlockType::CodeSnippet => &self.palette.code_family,
            _ => &self.palette.body_family,
        };
        let mut font = Font::new(family.clone(), base.font_size);
        if matches!(base.block_type, BlockType::Header1 | BlockType::Header2) {
            font.traits |= FontTrait::Bold;
        }
        Attributes {
            font: font.clone(),
            foreground: base.color,
            base_font: font,
            base_foreground: base.color,
            background: None,
            underline: false,
            paragraph: ParagraphStyle {
                spacing: base.paragraph_spacing,
                head_indent: 0.0,
            },
            block_type: base.block_type,
            inline: InlineStyles::empty(),
            link: None,
            page_link: None,
        }
    }

    /// Base attributes for a concrete block, including the list indent.
    pub fn block_attributes(&self, block: &Block) -> Attributes {
        let mut attrs = self.base_attributes(&self.palette.base_style(block.block_type()));
        if let Some(indent) = block.list_indent() {
            attrs.paragraph.head_indent = self.palette.list_indent * (f32::from(indent) + 1.0);
        }
        attrs
    }

    /// Resolve `styles` on top of `prior`.
    ///
    /// Resolution starts from the block-level parts of `prior` (base font and colour, block type,
    /// paragraph style) and drops whatever inline styling `prior` carried; link and page-link
    /// targets are carried over untouched. Code replaces the font wholesale with the monospaced
    /// family at the base size, keeping the accumulated traits, so `{code, bold}` is bold
    /// monospace and never the bold body font.
    pub fn resolve(&self, prior: &Attributes, styles: InlineStyles) -> Attributes {
        let mut attrs = Attributes {
            font: prior.base_font.clone(),
            foreground: prior.base_foreground,
            background: None,
            underline: false,
            inline: styles,
            ..prior.clone()
        };

        let mut traits = EnumSet::<FontTrait>::new();
        if styles.contains(InlineStyle::Bold) {
            traits |= FontTrait::Bold;
        }
        if styles.contains(InlineStyle::Italic) {
            traits |= FontTrait::Italic;
        }

        if styles.contains(InlineStyle::Underline) {
            attrs.underline = true;
        }

        if styles.contains(InlineStyle::Highlight) {
            attrs.background = Some(self.palette.highlight_background);
        }

        if styles.contains(InlineStyle::PageLink) {
            attrs.foreground = self.palette.page_link_foreground;
            attrs.background = Some(self.palette.page_link_background);
        }

        if styles.contains(InlineStyle::Code) {
            attrs.font = Font::new(self.palette.code_family.clone(), prior.base_font.size)
                .with_traits(traits);
            attrs.foreground = self.palette.code_foreground;
            attrs.background = Some(self.palette.code_background);
        } else if !traits.is_empty() {
            attrs.font = attrs.font.with_traits(traits);
        }
        attrs
    }
}
