//! Word-level change spans inside a removed/added hunk.

use std::ops::Range;

use similar::{Algorithm, DiffTag, TextDiff};
use thiserror::Error;

use crate::annotation::Annotation;
use crate::diff::{ChangeHunk, DiffLine};
use crate::markup::SpanMarkup;

/// Stands in for the `-`/`+` marker so both sides line up byte for byte.
const SENTINEL: u8 = 0;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum IntralineError {
    #[error("hunk text is not valid UTF-8")]
    InvalidUtf8,
    #[error("hunk is {len} bytes, above the {max} byte limit")]
    TooLarge { len: usize, max: usize },
    #[error("change span {span:?} falls outside the hunk text")]
    SpanOutOfRange { span: Range<usize> },
}

/// Changed byte ranges of each side, in the coordinates of the texts passed
/// to [`IntralineDiff::changed_ranges`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangedRanges {
    pub old: Vec<Range<usize>>,
    pub new: Vec<Range<usize>>,
}

pub trait IntralineDiff {
    fn changed_ranges(&self, old: &str, new: &str) -> Result<ChangedRanges, IntralineError>;
}

/// Myers diff over words and whitespace runs.
#[derive(Clone, Copy, Debug)]
pub struct WordDiff {
    pub max_bytes: usize,
}

impl Default for WordDiff {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024,
        }
    }
}

impl IntralineDiff for WordDiff {
    fn changed_ranges(&self, old: &str, new: &str) -> Result<ChangedRanges, IntralineError> {
        let len = old.len() + new.len();
        if len > self.max_bytes {
            return Err(IntralineError::TooLarge {
                len,
                max: self.max_bytes,
            });
        }

        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_words(old, new);
        let old_offsets = token_offsets(diff.old_slices());
        let new_offsets = token_offsets(diff.new_slices());

        let mut ranges = ChangedRanges::default();
        for op in diff.ops() {
            let (tag, old_tokens, new_tokens) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => {}
                DiffTag::Delete => {
                    push_range(&mut ranges.old, &old_offsets, old_tokens);
                }
                DiffTag::Insert => {
                    push_range(&mut ranges.new, &new_offsets, new_tokens);
                }
                DiffTag::Replace => {
                    push_range(&mut ranges.old, &old_offsets, old_tokens);
                    push_range(&mut ranges.new, &new_offsets, new_tokens);
                }
            }
        }
        Ok(ranges)
    }
}

fn token_offsets(tokens: &[&str]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(tokens.len() + 1);
    let mut offset = 0;
    offsets.push(offset);
    for token in tokens {
        offset += token.len();
        offsets.push(offset);
    }
    offsets
}

fn push_range(out: &mut Vec<Range<usize>>, offsets: &[usize], tokens: Range<usize>) {
    let start = offsets[tokens.start];
    let end = offsets[tokens.end];
    if start == end {
        return;
    }
    // Consecutive ops on one side merge into one span.
    if let Some(last) = out.last_mut() {
        if last.end == start {
            last.end = end;
            return;
        }
    }
    out.push(start..end);
}

/// One side of a hunk with markers swapped for the sentinel.
struct SideText {
    text: String,
    /// `(text offset, source span)` per line; the source span includes the
    /// marker byte and excludes the newline.
    lines: Vec<(usize, Range<usize>)>,
}

impl SideText {
    fn build(src: &[u8], lines: &[DiffLine]) -> Result<Self, IntralineError> {
        let mut bytes = Vec::new();
        let mut offsets = Vec::with_capacity(lines.len());
        for line in lines {
            offsets.push((bytes.len(), line.span.clone()));
            bytes.push(SENTINEL);
            bytes.extend_from_slice(src.get(line.span.start + 1..line.span.end).unwrap_or(&[]));
            bytes.push(b'\n');
        }
        let text = String::from_utf8(bytes).map_err(|_| IntralineError::InvalidUtf8)?;
        Ok(Self {
            text,
            lines: offsets,
        })
    }

    /// Maps a text range onto per-line source ranges, skipping sentinels and
    /// newlines.
    fn remap(&self, range: &Range<usize>, out: &mut Vec<Range<usize>>) -> Result<(), IntralineError> {
        if range.end > self.text.len() {
            return Err(IntralineError::SpanOutOfRange {
                span: range.clone(),
            });
        }
        for (text_start, span) in &self.lines {
            let content_start = text_start + 1;
            let content_end = text_start + span.len();
            let start = range.start.max(content_start);
            let end = range.end.min(content_end);
            if start < end {
                out.push(span.start + (start - text_start)..span.start + (end - text_start));
            }
        }
        Ok(())
    }
}

/// Fine-grained change annotations for one hunk, in source offsets.
pub fn hunk_annotations(
    src: &[u8],
    lines: &[DiffLine],
    hunk: &ChangeHunk,
    differ: &dyn IntralineDiff,
    markup: &SpanMarkup,
) -> Result<Vec<Annotation>, IntralineError> {
    let removed = lines
        .get(hunk.removed.clone())
        .ok_or_else(|| IntralineError::SpanOutOfRange {
            span: hunk.old_range.clone(),
        })?;
    let added = lines
        .get(hunk.added.clone())
        .ok_or_else(|| IntralineError::SpanOutOfRange {
            span: hunk.new_range.clone(),
        })?;
    let old = SideText::build(src, removed)?;
    let new = SideText::build(src, added)?;
    let changed = differ.changed_ranges(&old.text, &new.text)?;

    let mut spans = Vec::new();
    for range in &changed.old {
        old.remap(range, &mut spans)?;
    }
    for range in &changed.new {
        new.remap(range, &mut spans)?;
    }

    Ok(spans
        .into_iter()
        .map(|span| Annotation {
            start: span.start,
            end: span.end,
            open: markup.open.clone().into_bytes(),
            close: markup.close.clone().into_bytes(),
            want_inner: true,
        })
        .collect())
}
