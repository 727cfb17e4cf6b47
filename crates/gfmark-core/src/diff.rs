//! Splits unified-diff text into runs of removed and added lines.

use std::ops::Range;

use crate::annotation::Annotation;
use crate::markup::DiffMarkup;
use crate::source_map::SourceMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind {
    Context,
    Removed,
    Added,
}

impl LineKind {
    /// Classifies a line by its first byte only.
    pub fn of(line: &[u8]) -> Self {
        match line.first() {
            Some(b'-') => LineKind::Removed,
            Some(b'+') => LineKind::Added,
            _ => LineKind::Context,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiffLine {
    pub kind: LineKind,
    /// Byte range of the line, newline excluded.
    pub span: Range<usize>,
}

/// A run of removed lines followed by a run of added lines.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeHunk {
    /// Line indices of the removed run.
    pub removed: Range<usize>,
    /// Line indices of the added run.
    pub added: Range<usize>,
    pub old_range: Range<usize>,
    pub new_range: Range<usize>,
    /// The run was closed by a `@@` line, so it is the `---`/`+++` file
    /// header rather than changed content.
    pub header: bool,
}

impl ChangeHunk {
    /// File headers are the only hunks left out of word-level highlighting;
    /// a one-sided hunk marks its whole content as changed.
    pub fn wants_intraline(&self) -> bool {
        !self.header
    }
}

#[derive(Clone, Debug)]
pub struct Segmentation {
    pub lines: Vec<DiffLine>,
    pub hunks: Vec<ChangeHunk>,
}

pub fn segment(src: &[u8]) -> Segmentation {
    let map = SourceMap::new(src);
    let lines: Vec<DiffLine> = (0..map.line_count())
        .map(|index| {
            let span = map.line_span(index);
            DiffLine {
                kind: LineKind::of(&src[span.clone()]),
                span,
            }
        })
        .collect();

    let mut hunks = Vec::new();
    let mut last_removed: Option<usize> = None;
    let mut last_added: Option<usize> = None;

    for (index, line) in lines.iter().enumerate() {
        match line.kind {
            LineKind::Removed => {
                // A removal after an addition run starts a new hunk.
                if last_added.is_some() {
                    if let Some(hunk) = close_hunk(&map, last_removed, last_added, index, None) {
                        hunks.push(hunk);
                    }
                    last_added = None;
                    last_removed = None;
                }
                last_removed.get_or_insert(index);
            }
            LineKind::Added => {
                last_added.get_or_insert(index);
            }
            LineKind::Context => {
                let closing = src.get(line.span.start).copied();
                if let Some(hunk) = close_hunk(&map, last_removed, last_added, index, closing) {
                    hunks.push(hunk);
                }
                last_removed = None;
                last_added = None;
            }
        }
    }

    // An unterminated final line can leave a run open.
    if let Some(hunk) = close_hunk(&map, last_removed, last_added, lines.len(), None) {
        hunks.push(hunk);
    }

    Segmentation { lines, hunks }
}

fn close_hunk(
    map: &SourceMap,
    last_removed: Option<usize>,
    last_added: Option<usize>,
    current: usize,
    closing: Option<u8>,
) -> Option<ChangeHunk> {
    if last_removed.is_none() && last_added.is_none() {
        return None;
    }
    let added_start = last_added.unwrap_or(current);
    let removed_start = last_removed.unwrap_or(added_start);
    Some(ChangeHunk {
        removed: removed_start..added_start,
        added: added_start..current,
        old_range: map.line_start(removed_start)..map.line_start(added_start),
        new_range: map.line_start(added_start)..map.line_start(current),
        header: closing == Some(b'@'),
    })
}

/// One removed-block and one added-block wrapper per hunk, including empty
/// sides.
pub fn coarse_annotations(hunks: &[ChangeHunk], markup: &DiffMarkup) -> Vec<Annotation> {
    let mut anns = Vec::with_capacity(hunks.len() * 2);
    for hunk in hunks {
        anns.push(Annotation {
            start: hunk.old_range.start,
            end: hunk.old_range.end,
            open: markup.removed_block.open.clone().into_bytes(),
            close: markup.removed_block.close.clone().into_bytes(),
            want_inner: true,
        });
        anns.push(Annotation {
            start: hunk.new_range.start,
            end: hunk.new_range.end,
            open: markup.added_block.open.clone().into_bytes(),
            close: markup.added_block.close.clone().into_bytes(),
            want_inner: true,
        });
    }
    anns
}
