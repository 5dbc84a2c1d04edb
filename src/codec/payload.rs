//! Type-specific `coded` payloads of the block wire format.
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    block::{Block, BlockType, ImageBlock, ListBlock, OrderedListBlock, StyleRun, StyledText},
    error::MarginaliaError,
    style::InlineStyles,
};

/// One style run on the wire. Optional parts are omitted when unset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodedRun {
    pub location: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<InlineStyles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_link: Option<u32>,
}

impl From<&StyleRun> for CodedRun {
    fn from(run: &StyleRun) -> Self {
        CodedRun {
            location: run.range.start,
            length: run.range.len(),
            styles: (!run.styles.is_empty()).then_some(run.styles),
            link: run.link.as_ref().map(Url::to_string),
            page_link: run.page_link,
        }
    }
}

impl TryFrom<CodedRun> for StyleRun {
    type Error = MarginaliaError;

    fn try_from(coded: CodedRun) -> Result<Self, Self::Error> {
        let end = coded.location.checked_add(coded.length).ok_or_else(|| {
            MarginaliaError::InvalidData(format!(
                "run at {} with length {} overflows",
                coded.location, coded.length
            ))
        })?;
        let link = coded
            .link
            .map(|link| {
                Url::parse(&link).map_err(|e| {
                    MarginaliaError::InvalidData(format!("run link '{link}' is not a URL: {e}"))
                })
            })
            .transpose()?;
        Ok(StyleRun {
            range: coded.location..end,
            styles: coded.styles.unwrap_or_default(),
            link,
            page_link: coded.page_link,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<CodedRun>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<CodedRun>,
    #[serde(default)]
    pub indent: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderedListPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<CodedRun>,
    #[serde(default)]
    pub indent: u8,
    pub ordinal: u32,
}

/// Image bytes are embedded as a plain JSON array of numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

fn coded_runs(content: &StyledText) -> Vec<CodedRun> {
    content.runs().iter().map(CodedRun::from).collect()
}

fn styled_text(text: String, runs: Vec<CodedRun>) -> Result<StyledText, MarginaliaError> {
    let runs = runs
        .into_iter()
        .map(StyleRun::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    StyledText::with_runs(text, runs)
}

fn text_payload(content: &StyledText) -> TextPayload {
    TextPayload {
        text: content.text().to_string(),
        runs: coded_runs(content),
    }
}

/// Produce the `coded` value for a block. The block must already be valid.
pub(crate) fn encode_payload(block: &Block) -> Result<serde_json::Value, serde_json::Error> {
    match block {
        Block::Text(content)
        | Block::Header1(content)
        | Block::Header2(content)
        | Block::CodeSnippet(content) => serde_json::to_value(text_payload(content)),
        Block::List(list) => serde_json::to_value(ListPayload {
            text: list.content.text().to_string(),
            runs: coded_runs(&list.content),
            indent: list.indent,
        }),
        Block::OrderedList(list) => serde_json::to_value(OrderedListPayload {
            text: list.content.text().to_string(),
            runs: coded_runs(&list.content),
            indent: list.indent,
            ordinal: list.ordinal,
        }),
        Block::Image(image) => serde_json::to_value(ImagePayload {
            data: image.data.clone(),
            width: image.width,
            height: image.height,
        }),
    }
}

fn shape<T: serde::de::DeserializeOwned>(
    tag: &str,
    coded: serde_json::Value,
) -> Result<T, MarginaliaError> {
    serde_json::from_value(coded)
        .map_err(|e| MarginaliaError::InvalidData(format!("'{tag}' payload: {e}")))
}

/// Rebuild a block from its tag and `coded` value.
pub(crate) fn decode_payload(
    tag: &str,
    coded: serde_json::Value,
) -> Result<Block, MarginaliaError> {
    let block_type = tag.parse::<BlockType>()?;
    let block = match block_type {
        BlockType::Text => {
            let payload: TextPayload = shape(tag, coded)?;
            Block::Text(styled_text(payload.text, payload.runs)?)
        }
        BlockType::Header1 => {
            let payload: TextPayload = shape(tag, coded)?;
            Block::Header1(styled_text(payload.text, payload.runs)?)
        }
        BlockType::Header2 => {
            let payload: TextPayload = shape(tag, coded)?;
            Block::Header2(styled_text(payload.text, payload.runs)?)
        }
        BlockType::CodeSnippet => {
            let payload: TextPayload = shape(tag, coded)?;
            Block::CodeSnippet(styled_text(payload.text, payload.runs)?)
        }
        BlockType::List => {
            let payload: ListPayload = shape(tag, coded)?;
            Block::List(ListBlock {
                content: styled_text(payload.text, payload.runs)?,
                indent: payload.indent,
            })
        }
        BlockType::OrderedList => {
            let payload: OrderedListPayload = shape(tag, coded)?;
            Block::OrderedList(OrderedListBlock {
                content: styled_text(payload.text, payload.runs)?,
                indent: payload.indent,
                ordinal: payload.ordinal,
            })
        }
        BlockType::Image => {
            let payload: ImagePayload = shape(tag, coded)?;
            Block::Image(ImageBlock {
                data: payload.data,
                width: payload.width,
                height: payload.height,
            })
        }
        BlockType::Flashcard | BlockType::Emphasized => {
            return Err(MarginaliaError::InvalidData(format!(
                "'{tag}' is a block menu marker and carries no stored payload"
            )));
        }
    };
    block.validate().map_err(MarginaliaError::InvalidData)?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::InlineStyle;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_run_omits_unset_fields() {
        let run = StyleRun::new(2..5, InlineStyles::empty()).with_page_link(7);
        let value = serde_json::to_value(CodedRun::from(&run)).unwrap();
        assert_eq!(value, json!({"location": 2, "length": 3, "pageLink": 7}));

        let bold = StyleRun::new(0..1, InlineStyle::Bold.into());
        let value = serde_json::to_value(CodedRun::from(&bold)).unwrap();
        assert_eq!(value, json!({"location": 0, "length": 1, "styles": 1}));
    }

    #[test]
    fn test_run_missing_optionals_decode_unset() {
        let coded: CodedRun = serde_json::from_value(json!({"location": 1, "length": 2})).unwrap();
        let run = StyleRun::try_from(coded).unwrap();
        assert_eq!(run.range, 1..3);
        assert!(run.styles.is_empty());
        assert!(run.link.is_none());
        assert!(run.page_link.is_none());
    }

    #[test]
    fn test_run_bad_link_is_invalid_data() {
        let coded: CodedRun = serde_json::from_value(
            json!({"location": 0, "length": 1, "link": "not a url"}),
        )
        .unwrap();
        assert!(matches!(
            StyleRun::try_from(coded),
            Err(MarginaliaError::InvalidData(_))
        ));
    }

    #[test]
    fn test_decode_payload_errors() {
        assert!(matches!(
            decode_payload("table", json!({"text": ""})),
            Err(MarginaliaError::InvalidType(_))
        ));
        assert!(matches!(
            decode_payload("text", json!({"data": [1, 2]})),
            Err(MarginaliaError::InvalidData(_))
        ));
        assert!(matches!(
            decode_payload("orderedlist", json!({"text": "a"})),
            Err(MarginaliaError::InvalidData(_))
        ));
        assert!(matches!(
            decode_payload("flashcard", json!({})),
            Err(MarginaliaError::InvalidData(_))
        ));
        assert!(matches!(
            decode_payload("text", json!({"text": "ab", "runs": [{"location": 1, "length": 4}]})),
            Err(MarginaliaError::InvalidData(_))
        ));
    }

    #[test]
    fn test_image_sizes_decode_exactly() {
        for width in [394.46003264093275, 0.1 + 0.2, 1.0 / 3.0, 511.99999999999994] {
            let block = Block::Image(ImageBlock {
                data: vec![1],
                width: Some(width),
                height: Some(width * 137.0),
            });
            let value = encode_payload(&block).unwrap();
            let bytes = serde_json::to_vec(&value).unwrap();
            let back: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decode_payload("image", back).unwrap(), block);
        }
    }

    #[test]
    fn test_image_bytes_are_a_number_array() {
        let value = encode_payload(&Block::image(vec![0, 255, 7])).unwrap();
        assert_eq!(value, json!({"data": [0, 255, 7]}));
    }
}
