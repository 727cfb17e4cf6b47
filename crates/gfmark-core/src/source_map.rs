use std::ops::Range as ByteRange;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Line start offsets of a byte buffer.
///
/// A buffer ending in `\n` has a final empty line starting at its length.
#[derive(Clone, Debug)]
pub struct SourceMap {
    source_len: usize,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: impl AsRef<[u8]>) -> Self {
        let source = source.as_ref();
        let mut line_starts = Vec::new();
        line_starts.push(0);
        for (idx, byte) in source.iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            source_len: source.len(),
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Start offset of `line`; one past the last line maps to the buffer end.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.source_len)
    }

    /// Byte range of `line` without its newline.
    pub fn line_span(&self, line: usize) -> ByteRange<usize> {
        let start = self.line_start(line);
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.source_len,
        };
        start..end.max(start)
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        Position {
            line,
            // Byte offset from line start.
            character: offset.saturating_sub(line_start),
        }
    }

    pub fn range(&self, span: ByteRange<usize>) -> Range {
        Range {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}
