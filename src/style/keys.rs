use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::style::InlineStyle;

#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
pub enum Modifier {
    Command,
    Shift,
    Alt,
    Control,
}

/// Virtual key codes of the ANSI keyboard layout, as reported by the host key event.
pub mod key_codes {
    pub const C: u16 = 0x08;
    pub const B: u16 = 0x0B;
    pub const U: u16 = 0x20;
    pub const I: u16 = 0x22;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub modifiers: EnumSet<Modifier>,
    pub key_code: u16,
}

impl KeyChord {
    pub fn new<M: Into<EnumSet<Modifier>>>(modifiers: M, key_code: u16) -> KeyChord {
        KeyChord {
            modifiers: modifiers.into(),
            key_code,
        }
    }
}

/// Map a key chord to the inline style it toggles. Chords that are not formatting shortcuts yield
/// `None`, which callers treat as "no style change".
pub fn style_for_chord(chord: &KeyChord) -> Option<InlineStyle> {
    let command = EnumSet::only(Modifier::Command);
    let command_shift = Modifier::Command | Modifier::Shift;
    if chord.modifiers == command {
        match chord.key_code {
            key_codes::B => Some(InlineStyle::Bold),
            key_codes::I => Some(InlineStyle::Italic),
            key_codes::U => Some(InlineStyle::Underline),
            _ => None,
        }
    } else if chord.modifiers == command_shift {
        match chord.key_code {
            key_codes::C => Some(InlineStyle::Code),
            key_codes::B => Some(InlineStyle::Highlight),
            _ => None,
        }
    } else {
        None
    }
}
