mod annotate;
mod annotation;
mod autolink;
mod code;
mod diagnostic;
mod diff;
mod escape;
mod heading;
mod highlight;
mod intraline;
mod markup;
mod node;
mod render;
mod sanitize;
mod slug;
mod source_map;

pub use annotate::annotate;
pub use annotation::{Annotation, AnnotationError, render_order, sort_annotations};
pub use code::{BlockIssue, CodeBlockHtml, render_code_block, render_code_block_with};
pub use diagnostic::{
    Diagnostic, DiagnosticSeverity, I_HEADING_FALLBACK, W_ANNOTATION_OVERLAP, W_HIGHLIGHT_FAILED,
    W_INTRALINE_SKIPPED,
};
pub use diff::{ChangeHunk, DiffLine, LineKind, Segmentation, coarse_annotations, segment};
pub use escape::{escape_html, escape_html_byte};
pub use heading::{RenderedHeading, TitleText, extract_title, heading_html, render_heading};
pub use highlight::{
    Strategy, TokenizeError, language_tag, lookup, token_annotations, token_annotations_with,
};
pub use intraline::{ChangedRanges, IntralineDiff, IntralineError, WordDiff, hunk_annotations};
pub use markup::{DIFF_MARKUP, DiffMarkup, SpanMarkup, TOKEN_CLASSES, TokenClasses};
pub use render::{RenderOptions, RenderResult, markdown, render, render_with_options};
pub use sanitize::sanitize;
pub use slug::create as slugify;
pub use source_map::{Position, Range, SourceMap};
