use serde::{Deserialize, Serialize};
use std::ops::Range;
use url::Url;

use crate::{
    error::MarginaliaError,
    style::{Attributes, InlineStyle, InlineStyles, StyleBuilder},
};

/// A character range with its inline styles and optional link targets.
///
/// Offsets count Unicode scalar values (`char`s) of the owning text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRun {
    pub range: Range<usize>,
    pub styles: InlineStyles,
    pub link: Option<Url>,
    pub page_link: Option<u32>,
}

impl StyleRun {
    pub fn new(range: Range<usize>, styles: InlineStyles) -> StyleRun {
        StyleRun {
            range,
            styles,
            link: None,
            page_link: None,
        }
    }

    pub fn with_link(mut self, link: Url) -> StyleRun {
        self.link = Some(link);
        self
    }

    pub fn with_page_link(mut self, page: u32) -> StyleRun {
        self.page_link = Some(page);
        self
    }

    /// A plain run carries nothing a gap wouldn't.
    pub fn is_plain(&self) -> bool {
        self.styles.is_empty() && self.link.is_none() && self.page_link.is_none()
    }

    fn same_attributes(&self, other: &StyleRun) -> bool {
        self.styles == other.styles && self.link == other.link && self.page_link == other.page_link
    }

    fn with_range(&self, range: Range<usize>) -> StyleRun {
        StyleRun {
            range,
            ..self.clone()
        }
    }
}

/// Text plus its sorted, non-overlapping style runs. Gaps between runs are unstyled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyledText {
    text: String,
    runs: Vec<StyleRun>,
}

impl StyledText {
    pub fn new<S: Into<String>>(text: S) -> StyledText {
        StyledText {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    /// Build styled text from explicit runs. The runs are taken as given (no merging), but must be
    /// sorted, non-overlapping, non-empty and within the text.
    pub fn with_runs<S: Into<String>>(
        text: S,
        runs: Vec<StyleRun>,
    ) -> Result<StyledText, MarginaliaError> {
        let styled = StyledText {
            text: text.into(),
            runs,
        };
        styled.check_runs().map_err(MarginaliaError::InvalidData)?;
        Ok(styled)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Describe the first way the runs break their invariants, if any.
    pub(crate) fn check_runs(&self) -> Result<(), String> {
        let len = self.char_len();
        let mut previous_end = 0;
        for (idx, run) in self.runs.iter().enumerate() {
            if run.range.start >= run.range.end {
                return Err(format!("run {idx} has empty range {:?}", run.range));
            }
            if run.range.end > len {
                return Err(format!(
                    "run {idx} range {:?} exceeds text length {len}",
                    run.range
                ));
            }
            if run.range.start < previous_end {
                return Err(format!(
                    "run {idx} range {:?} overlaps or precedes the previous run",
                    run.range
                ));
            }
            previous_end = run.range.end;
        }
        Ok(())
    }

    /// Byte offset of the char offset `offset`, clamped to the end of the text.
    fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(byte, _)| byte)
            .unwrap_or(self.text.len())
    }

    fn clamp(&self, range: &Range<usize>) -> Range<usize> {
        let len = self.char_len();
        let start = range.start.min(len);
        start..range.end.clamp(start, len)
    }

    /// The run covering `offset`, if the offset is not in a gap.
    pub fn run_at(&self, offset: usize) -> Option<&StyleRun> {
        self.runs.iter().find(|run| run.range.contains(&offset))
    }

    pub fn styles_at(&self, offset: usize) -> InlineStyles {
        self.run_at(offset)
            .map(|run| run.styles)
            .unwrap_or_default()
    }

    /// Copy out `range` as its own styled text, with runs clipped and shifted to start at zero.
    pub fn slice(&self, range: Range<usize>) -> StyledText {
        let range = self.clamp(&range);
        let bytes = self.byte_offset(range.start)..self.byte_offset(range.end);
        let text = self.text[bytes].to_string();
        let runs = self
            .runs
            .iter()
            .filter_map(|run| {
                let start = run.range.start.max(range.start);
                let end = run.range.end.min(range.end);
                (start < end).then(|| run.with_range(start - range.start..end - range.start))
            })
            .collect();
        StyledText { text, runs }
    }

    /// Append `other`, shifting its runs behind the current text.
    pub fn append(&mut self, other: &StyledText) {
        let shift = self.char_len();
        self.text.push_str(&other.text);
        let mut segments = std::mem::take(&mut self.runs);
        segments.extend(
            other
                .runs
                .iter()
                .map(|run| run.with_range(run.range.start + shift..run.range.end + shift)),
        );
        self.runs = normalize(segments);
    }

    /// Insert `insert` at `offset`. The new characters take the styles of the character before
    /// them (of the first character when inserting at the start).
    pub fn insert(&mut self, offset: usize, insert: &str) {
        let offset = offset.min(self.char_len());
        let added = insert.chars().count();
        if added == 0 {
            return;
        }
        let byte = self.byte_offset(offset);
        self.text.insert_str(byte, insert);
        for run in self.runs.iter_mut() {
            let extends = (run.range.start < offset && offset <= run.range.end)
                || (offset == 0 && run.range.start == 0);
            if extends {
                run.range.end += added;
            } else if run.range.start >= offset {
                run.range.start += added;
                run.range.end += added;
            }
        }
        let segments = std::mem::take(&mut self.runs);
        self.runs = normalize(segments);
    }

    /// Remove the characters in `range`, shrinking or dropping the runs it touches.
    pub fn delete(&mut self, range: Range<usize>) {
        let range = self.clamp(&range);
        let removed = range.end - range.start;
        if removed == 0 {
            return;
        }
        let (start_byte, end_byte) = (self.byte_offset(range.start), self.byte_offset(range.end));
        self.text.replace_range(start_byte..end_byte, "");
        let shift = |offset: usize| {
            if offset <= range.start {
                offset
            } else if offset >= range.end {
                offset - removed
            } else {
                range.start
            }
        };
        let segments = self
            .runs
            .iter()
            .map(|run| run.with_range(shift(run.range.start)..shift(run.range.end)))
            .filter(|run| run.range.start < run.range.end)
            .collect();
        self.runs = normalize(segments);
    }

    /// Every range of the text, gaps included, in order.
    fn segments(&self) -> Vec<StyleRun> {
        let mut segments = Vec::with_capacity(self.runs.len() * 2 + 1);
        let mut cursor = 0;
        for run in self.runs.iter() {
            if run.range.start > cursor {
                segments.push(StyleRun::new(cursor..run.range.start, InlineStyles::empty()));
            }
            segments.push(run.clone());
            cursor = run.range.end;
        }
        let len = self.char_len();
        if cursor < len {
            segments.push(StyleRun::new(cursor..len, InlineStyles::empty()));
        }
        segments
    }

    /// Apply `edit` to every part of the text inside `range`, splitting runs at the range edges.
    fn apply<F: Fn(&mut StyleRun)>(&mut self, range: Range<usize>, edit: F) {
        let range = self.clamp(&range);
        if range.start == range.end {
            return;
        }
        let mut edited = Vec::new();
        for segment in self.segments() {
            let (start, end) = (segment.range.start, segment.range.end);
            if end <= range.start || start >= range.end {
                edited.push(segment);
                continue;
            }
            if start < range.start {
                edited.push(segment.with_range(start..range.start));
            }
            let mut inner = segment.with_range(start.max(range.start)..end.min(range.end));
            edit(&mut inner);
            edited.push(inner);
            if end > range.end {
                edited.push(segment.with_range(range.end..end));
            }
        }
        self.runs = normalize(edited);
    }

    pub fn set_style(&mut self, range: Range<usize>, style: InlineStyle, on: bool) {
        tracing::debug!("set_style {style} = {on} over {range:?}");
        self.apply(range, |run| {
            if on {
                run.styles |= style;
            } else {
                run.styles -= style;
            }
        });
    }

    /// True iff every character in `range` carries `style`. An empty range never does.
    pub fn has_style(&self, range: Range<usize>, style: InlineStyle) -> bool {
        let range = self.clamp(&range);
        if range.start == range.end {
            return false;
        }
        self.segments()
            .iter()
            .filter(|seg| seg.range.end > range.start && seg.range.start < range.end)
            .all(|seg| seg.styles.contains(style))
    }

    /// Toggle `style` over `range`: it is removed when the whole range already carries it and
    /// added everywhere otherwise. Returns the new state.
    pub fn toggle_style(&mut self, range: Range<usize>, style: InlineStyle) -> bool {
        let on = !self.has_style(range.clone(), style);
        self.set_style(range, style, on);
        on
    }

    pub fn set_link(&mut self, range: Range<usize>, link: Option<Url>) {
        self.apply(range, |run| run.link = link.clone());
    }

    /// Setting a page link also sets the page-link style bit; clearing it removes both.
    pub fn set_page_link(&mut self, range: Range<usize>, page: Option<u32>) {
        self.apply(range, |run| {
            run.page_link = page;
            if page.is_some() {
                run.styles |= InlineStyle::PageLink;
            } else {
                run.styles -= InlineStyle::PageLink;
            }
        });
    }

    /// Resolved attributes for the whole text, gaps included, for the rendering collaborator.
    pub fn resolved_spans(
        &self,
        builder: &StyleBuilder,
        base: &Attributes,
    ) -> Vec<(Range<usize>, Attributes)> {
        self.segments()
            .into_iter()
            .map(|seg| {
                let prior = base.with_targets(seg.link.clone(), seg.page_link);
                (seg.range, builder.resolve(&prior, seg.styles))
            })
            .collect()
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        StyledText::new(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        StyledText::new(text)
    }
}

/// Drop plain and empty segments and merge touching segments with equal attributes.
fn normalize(segments: Vec<StyleRun>) -> Vec<StyleRun> {
    let mut runs: Vec<StyleRun> = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.is_plain() || segment.range.start >= segment.range.end {
            continue;
        }
        match runs.last_mut() {
            Some(last)
                if last.range.end == segment.range.start && last.same_attributes(&segment) =>
            {
                last.range.end = segment.range.end;
            }
            _ => runs.push(segment),
        }
    }
    runs
}
