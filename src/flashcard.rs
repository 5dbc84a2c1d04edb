//! Flashcards: a question, an optional hint and an answer, each a rich text field, attached to the
//! outline chapter they were made from.
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::{
    chapter::Chapter, codec::CodedTextViewContents, error::MarginaliaError, properties::CardId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashcardField {
    Question,
    Hint,
    Answer,
}

impl FlashcardField {
    pub const ALL: [FlashcardField; 3] = [
        FlashcardField::Question,
        FlashcardField::Hint,
        FlashcardField::Answer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlashcardField::Question => "question",
            FlashcardField::Hint => "hint",
            FlashcardField::Answer => "answer",
        }
    }
}

impl Display for FlashcardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlashcardField {
    type Err = MarginaliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlashcardField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| MarginaliaError::Decode(format!("unknown flashcard field '{s}'")))
    }
}

/// The part of a flashcard stored next to its field blobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    pub id: CardId,
    pub chapter: Chapter,
    #[serde(default)]
    pub has_hint: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Flashcard {
    pub id: CardId,
    pub chapter: Chapter,
    pub question: CodedTextViewContents,
    pub hint: Option<CodedTextViewContents>,
    pub answer: CodedTextViewContents,
}

impl Flashcard {
    pub fn new(
        chapter: Chapter,
        question: CodedTextViewContents,
        hint: Option<CodedTextViewContents>,
        answer: CodedTextViewContents,
    ) -> Flashcard {
        Flashcard {
            id: CardId::new(),
            chapter,
            question,
            hint,
            answer,
        }
    }

    /// A card whose answer is a text selection from the reader.
    pub fn from_selection<S: Into<String>>(
        chapter: Chapter,
        question: CodedTextViewContents,
        selection: S,
    ) -> Flashcard {
        Flashcard::new(
            chapter,
            question,
            None,
            CodedTextViewContents::from_plain_text(selection),
        )
    }

    pub fn field(&self, field: FlashcardField) -> Option<&CodedTextViewContents> {
        match field {
            FlashcardField::Question => Some(&self.question),
            FlashcardField::Hint => self.hint.as_ref(),
            FlashcardField::Answer => Some(&self.answer),
        }
    }

    /// Present fields, in question, hint, answer order.
    pub fn fields(&self) -> impl Iterator<Item = (FlashcardField, &CodedTextViewContents)> + '_ {
        FlashcardField::ALL
            .into_iter()
            .filter_map(move |field| self.field(field).map(|contents| (field, contents)))
    }

    pub fn record(&self) -> FlashcardRecord {
        FlashcardRecord {
            id: self.id,
            chapter: self.chapter.clone(),
            has_hint: self.hint.is_some(),
        }
    }

    /// Case-insensitive search over the text of every field.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.fields()
            .any(|(_, contents)| contents.plain_text().to_lowercase().contains(&query))
    }
}
