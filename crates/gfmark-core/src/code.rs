//! Fenced and indented code blocks.

use tracing::{debug, warn};

use crate::annotate::annotate;
use crate::diagnostic::{W_ANNOTATION_OVERLAP, W_HIGHLIGHT_FAILED, W_INTRALINE_SKIPPED};
use crate::diff::{coarse_annotations, segment};
use crate::escape::{escape_html, escape_html_byte};
use crate::highlight::{Strategy, language_tag, lookup, token_annotations};
use crate::intraline::{IntralineDiff, WordDiff, hunk_annotations};
use crate::markup::DIFF_MARKUP;
use crate::render::RenderOptions;

/// Something that made a block render with less highlighting than asked for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockIssue {
    pub code: &'static str,
    pub message: String,
}

impl BlockIssue {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodeBlockHtml {
    pub html: String,
    pub issues: Vec<BlockIssue>,
}

pub fn render_code_block(info: &str, literal: &str, options: &RenderOptions) -> CodeBlockHtml {
    let differ = WordDiff {
        max_bytes: options.intraline_max_bytes,
    };
    render_code_block_with(info, literal, options, &differ)
}

/// [`render_code_block`] with the word differ used for diff blocks supplied
/// by the caller.
pub fn render_code_block_with(
    info: &str,
    literal: &str,
    options: &RenderOptions,
    differ: &dyn IntralineDiff,
) -> CodeBlockHtml {
    let lang = language_tag(info);
    let strategy = if options.highlight { lookup(lang) } else { None };
    let mut issues = Vec::new();

    let Some(strategy) = strategy else {
        debug!(lang, "no highlighter for code block");
        return CodeBlockHtml {
            html: format!("<pre><code>{}</code></pre>", escape_html(literal)),
            issues,
        };
    };

    let highlighted = match strategy {
        Strategy::Diff => highlight_diff(literal, options.intraline, differ, &mut issues),
        Strategy::Syntax(syntax) => highlight_tokens(literal, syntax, &mut issues),
    };
    let inner = highlighted.unwrap_or_else(|| escape_html(literal));

    CodeBlockHtml {
        html: format!(
            "<div class=\"highlight highlight-{}\"><pre>{}</pre></div>",
            escape_html(lang),
            inner
        ),
        issues,
    }
}

fn highlight_tokens(
    literal: &str,
    syntax: &syntect::parsing::SyntaxReference,
    issues: &mut Vec<BlockIssue>,
) -> Option<String> {
    let anns = match token_annotations(literal, syntax) {
        Ok(anns) => anns,
        Err(err) => {
            warn!(%err, syntax = %syntax.name, "tokenizer failed, rendering plain");
            issues.push(BlockIssue::new(W_HIGHLIGHT_FAILED, err.to_string()));
            return None;
        }
    };
    match annotate(literal.as_bytes(), anns, escape_html_byte) {
        Ok(out) => into_html(out, issues),
        Err(err) => {
            warn!(%err, "token spans do not nest, rendering plain");
            issues.push(BlockIssue::new(W_ANNOTATION_OVERLAP, err.to_string()));
            None
        }
    }
}

fn highlight_diff(
    literal: &str,
    intraline: bool,
    differ: &dyn IntralineDiff,
    issues: &mut Vec<BlockIssue>,
) -> Option<String> {
    let src = literal.as_bytes();
    let seg = segment(src);
    let coarse = coarse_annotations(&seg.hunks, &DIFF_MARKUP);

    let mut fine = Vec::new();
    if intraline {
        for hunk in seg.hunks.iter().filter(|hunk| hunk.wants_intraline()) {
            match hunk_annotations(src, &seg.lines, hunk, differ, &DIFF_MARKUP.changed) {
                Ok(anns) => fine.extend(anns),
                Err(err) => {
                    warn!(%err, old = ?hunk.old_range, "skipping intra-line highlight");
                    issues.push(BlockIssue::new(W_INTRALINE_SKIPPED, err.to_string()));
                }
            }
        }
    }

    if !fine.is_empty() {
        let mut all = coarse.clone();
        all.extend(fine);
        match annotate(src, all, escape_html_byte) {
            Ok(out) => return into_html(out, issues),
            Err(err) => {
                warn!(%err, "intra-line spans do not nest, keeping block spans only");
                issues.push(BlockIssue::new(W_ANNOTATION_OVERLAP, err.to_string()));
            }
        }
    }

    match annotate(src, coarse, escape_html_byte) {
        Ok(out) => into_html(out, issues),
        Err(err) => {
            warn!(%err, "diff spans do not nest, rendering plain");
            issues.push(BlockIssue::new(W_ANNOTATION_OVERLAP, err.to_string()));
            None
        }
    }
}

fn into_html(out: Vec<u8>, issues: &mut Vec<BlockIssue>) -> Option<String> {
    match String::from_utf8(out) {
        Ok(html) => Some(html),
        Err(err) => {
            warn!(%err, "highlighted output split a character, rendering plain");
            issues.push(BlockIssue::new(W_HIGHLIGHT_FAILED, err.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render_code_block, render_code_block_with};
    use crate::intraline::{ChangedRanges, IntralineDiff, IntralineError};
    use crate::render::RenderOptions;

    fn render(info: &str, literal: &str) -> String {
        let block = render_code_block(info, literal, &RenderOptions::default());
        assert!(block.issues.is_empty(), "unexpected issues: {:?}", block.issues);
        block.html
    }

    #[test]
    fn unknown_language_is_plain_and_escaped() {
        assert_eq!(
            render("klingon", "<a href=\"x\">&</a>\n"),
            "<pre><code>&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;\n</code></pre>"
        );
    }

    #[test]
    fn empty_info_is_plain() {
        assert_eq!(render("", "x\n"), "<pre><code>x\n</code></pre>");
    }

    #[test]
    fn pure_addition_diff_marks_added_text() {
        assert_eq!(
            render("diff", " a\n+b\n"),
            "<div class=\"highlight highlight-diff\"><pre> a\n<span class=\"gi input-block\"><span class=\"gd input-block\"></span>+<span class=\"x\">b</span>\n</span></pre></div>"
        );
    }

    #[test]
    fn changed_lines_get_intraline_spans() {
        let html = render("diff", "-let x = 1;\n+let x = 2;\n");
        assert_eq!(
            html,
            "<div class=\"highlight highlight-diff\"><pre><span class=\"gd input-block\">-let x = <span class=\"x\">1;</span>\n</span><span class=\"gi input-block\">+let x = <span class=\"x\">2;</span>\n</span></pre></div>"
        );
    }

    #[test]
    fn file_header_gets_no_intraline_spans() {
        let html = render("diff", "--- a/f\n+++ b/f\n@@ -1 +1 @@\n");
        assert!(html.contains("<span class=\"gd input-block\">--- a/f\n</span>"));
        assert!(html.contains("<span class=\"gi input-block\">+++ b/f\n</span>"));
        assert!(!html.contains("class=\"x\""));
    }

    #[test]
    fn intraline_can_be_disabled() {
        let options = RenderOptions {
            intraline: false,
            ..RenderOptions::default()
        };
        let block = render_code_block("diff", "-a\n+b\n", &options);
        assert!(!block.html.contains("class=\"x\""));
    }

    #[test]
    fn oversized_hunk_keeps_block_spans_and_reports() {
        let options = RenderOptions {
            intraline_max_bytes: 2,
            ..RenderOptions::default()
        };
        let block = render_code_block("diff", "-abc\n+abd\n", &options);
        assert!(block.html.contains("<span class=\"gd input-block\">-abc\n</span>"));
        assert_eq!(block.issues.len(), 1);
        assert_eq!(block.issues[0].code, "W_INTRALINE_SKIPPED");
    }

    #[test]
    fn recognized_language_escapes_text() {
        let html = render("go", "if a < b && c > d {}\n");
        assert!(html.starts_with("<div class=\"highlight highlight-go\"><pre>"));
        assert!(html.ends_with("</pre></div>"));
        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;&amp;"));
        assert!(html.contains("&gt;"));
    }

    #[test]
    fn highlighting_can_be_disabled() {
        let options = RenderOptions {
            highlight: false,
            ..RenderOptions::default()
        };
        let block = render_code_block("go", "x\n", &options);
        assert_eq!(block.html, "<pre><code>x\n</code></pre>");
    }

    /// Reports two crossing ranges on the old side.
    struct Crossing;

    impl IntralineDiff for Crossing {
        fn changed_ranges(&self, _old: &str, _new: &str) -> Result<ChangedRanges, IntralineError> {
            Ok(ChangedRanges {
                old: vec![1..4, 2..6],
                new: Vec::new(),
            })
        }
    }

    #[test]
    fn crossing_change_spans_fall_back_to_block_spans() {
        let block =
            render_code_block_with("diff", "-abcdef
+abcdeg
", &RenderOptions::default(), &Crossing);
        assert_eq!(
            block.html,
            "<div class=\"highlight highlight-diff\"><pre><span class=\"gd input-block\">-abcdef\n</span><span class=\"gi input-block\">+abcdeg\n</span></pre></div>"
        );
        assert_eq!(block.issues.len(), 1);
        assert_eq!(block.issues[0].code, "W_ANNOTATION_OVERLAP");
    }

    #[test]
    fn pure_deletion_marks_the_removed_text() {
        let html = render("diff", " keep
-gone
");
        assert!(html.contains("<span class=\"gd input-block\">-<span class=\"x\">gone</span>\n</span>"));
    }
}
