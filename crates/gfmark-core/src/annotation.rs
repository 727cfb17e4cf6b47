use std::cmp::Ordering;
use std::ops::Range;

use thiserror::Error;

/// A markup span over a byte range of one source buffer.
///
/// `open` is emitted at `start` and `close` at `end`. When `want_inner` is
/// false the covered bytes are dropped and the markup stands in for them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Annotation {
    pub start: usize,
    pub end: usize,
    pub open: Vec<u8>,
    pub close: Vec<u8>,
    pub want_inner: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AnnotationError {
    #[error("annotation range is inverted: {start} > {end}")]
    Inverted { start: usize, end: usize },
    #[error("annotation {start}..{end} exceeds buffer length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("annotations {outer:?} and {inner:?} cross without nesting")]
    Overlap {
        outer: Range<usize>,
        inner: Range<usize>,
    },
}

impl Annotation {
    pub fn new(
        start: usize,
        end: usize,
        open: impl Into<Vec<u8>>,
        close: impl Into<Vec<u8>>,
        want_inner: bool,
    ) -> Result<Self, AnnotationError> {
        if start <= end {
            Ok(Self {
                start,
                end,
                open: open.into(),
                close: close.into(),
                want_inner,
            })
        } else {
            Err(AnnotationError::Inverted { start, end })
        }
    }

    /// Wraps `range` in `open`/`close`, keeping the covered bytes.
    pub fn wrap(
        range: Range<usize>,
        open: impl Into<Vec<u8>>,
        close: impl Into<Vec<u8>>,
    ) -> Result<Self, AnnotationError> {
        Self::new(range.start, range.end, open, close, true)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: &Annotation) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_disjoint(&self, other: &Annotation) -> bool {
        self.end <= other.start || other.end <= self.start
    }

    /// Two annotations may share one render when they are disjoint or one
    /// nests the other.
    pub fn is_compatible(&self, other: &Annotation) -> bool {
        self.is_disjoint(other) || self.contains(other) || other.contains(self)
    }
}

/// Render order: `start` ascending, then `end` descending so an outer span
/// opens before an inner one at the same offset. Equal keys keep input order.
pub fn render_order(a: &Annotation, b: &Annotation) -> Ordering {
    a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end))
}

pub fn sort_annotations(annotations: &mut [Annotation]) {
    annotations.sort_by(render_order);
}

/// Checks a sorted annotation list against a buffer of `len` bytes.
///
/// Every range must be in bounds and the family must be laminar.
pub(crate) fn validate_sorted(
    annotations: &[Annotation],
    len: usize,
) -> Result<(), AnnotationError> {
    let mut open: Vec<&Annotation> = Vec::new();
    for ann in annotations {
        if ann.start > ann.end {
            return Err(AnnotationError::Inverted {
                start: ann.start,
                end: ann.end,
            });
        }
        if ann.end > len {
            return Err(AnnotationError::OutOfBounds {
                start: ann.start,
                end: ann.end,
                len,
            });
        }
        while let Some(top) = open.last() {
            if top.end <= ann.start {
                open.pop();
            } else {
                break;
            }
        }
        if let Some(top) = open.last() {
            if ann.end > top.end {
                return Err(AnnotationError::Overlap {
                    outer: top.range(),
                    inner: ann.range(),
                });
            }
        }
        open.push(ann);
    }
    Ok(())
}
