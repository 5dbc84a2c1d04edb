//! Inline styling and attribute resolution.
//!
//! Inline styles are stored per style run as an [InlineStyles] set (persisted as an integer
//! bitmask). The [StyleBuilder] turns a block's base style plus such a set into the concrete
//! [Attributes] a text renderer paints with.
use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

use crate::{block::BlockType, error::MarginaliaError};

pub mod builder;
pub mod keys;

pub use builder::{BaseStyle, StyleBuilder, StylePalette};
pub use keys::{style_for_chord, KeyChord, Modifier};

/// One inline character style. The declaration order fixes the bit position within the persisted
/// mask: bold = 1, italic = 2, underline = 4, code = 8, highlight = 16, page link = 32.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[enumset(repr = "u32")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Code,
    Highlight,
    PageLink,
}

impl Display for InlineStyle {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The empty set means "no inline style".
pub type InlineStyles = EnumSet<InlineStyle>;

/// Rebuild a style set from its persisted bitmask. Bits that name no style are dropped.
pub fn styles_from_bits(bits: u32) -> InlineStyles {
    EnumSet::from_u32_truncated(bits)
}

/// Font traits that can be applied on top of a font family.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[enumset(repr = "u32")]
pub enum FontTrait {
    Bold,
    Italic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b, self.a]))
    }
}

impl TryFrom<&str> for Color {
    type Error = MarginaliaError;

    /// Accepts `#rrggbb` and `#rrggbbaa`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let digits = value.trim().trim_start_matches('#');
        let bytes = hex::decode(digits)
            .map_err(|e| MarginaliaError::Serialization(format!("Invalid color '{value}': {e}")))?;
        match bytes.as_slice() {
            &[r, g, b] => Ok(Color::rgb(r, g, b)),
            &[r, g, b, a] => Ok(Color::rgba(r, g, b, a)),
            _ => Err(MarginaliaError::Serialization(format!(
                "Invalid color '{value}': expected 3 or 4 channels"
            ))),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = MarginaliaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::try_from(value.as_str())
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub traits: EnumSet<FontTrait>,
}

impl Font {
    pub fn new<S: Into<String>>(family: S, size: f32) -> Font {
        Font {
            family: family.into(),
            size,
            traits: EnumSet::new(),
        }
    }

    pub fn with_traits(mut self, traits: EnumSet<FontTrait>) -> Font {
        self.traits |= traits;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Space after each paragraph, in points.
    pub spacing: f32,
    /// Leading indent of the paragraph, in points. Used by list blocks.
    pub head_indent: f32,
}

/// The concrete attribute set for one span of text.
///
/// `base_font` and `base_foreground` hold the block-level values the span started from, so inline
/// styles can be resolved again without losing them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub font: Font,
    pub foreground: Color,
    pub base_font: Font,
    pub base_foreground: Color,
    pub background: Option<Color>,
    pub underline: bool,
    pub paragraph: ParagraphStyle,
    pub block_type: BlockType,
    pub inline: InlineStyles,
    pub link: Option<Url>,
    pub page_link: Option<u32>,
}

impl Attributes {
    /// Copy of these attributes carrying the given link targets.
    pub fn with_targets(&self, link: Option<Url>, page_link: Option<u32>) -> Attributes {
        Attributes {
            link,
            page_link,
            ..self.clone()
        }
    }
}
