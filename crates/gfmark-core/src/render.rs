use pulldown_cmark::{Options, Parser, html};
use tracing::debug;

use crate::autolink::autolink;
use crate::code::render_code_block;
use crate::diagnostic::{Diagnostic, DiagnosticSeverity, I_HEADING_FALLBACK};
use crate::heading::render_heading;
use crate::intraline::WordDiff;
use crate::node::{Node, collect_nodes};
use crate::sanitize::sanitize;
use crate::slug;
use crate::source_map::SourceMap;

#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Run the output through the sanitizer policy.
    pub sanitize: bool,
    /// Highlight fenced blocks whose language is recognized.
    pub highlight: bool,
    /// Word-level change spans inside diff hunks.
    pub intraline: bool,
    pub intraline_max_bytes: usize,
    pub slug: fn(&str) -> String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            highlight: true,
            intraline: true,
            intraline_max_bytes: WordDiff::default().max_bytes,
            slug: slug::create,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RenderResult {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

pub fn render_with_options(text: &str, options: &RenderOptions) -> RenderResult {
    let source_map = SourceMap::new(text);
    let events = autolink(Parser::new_ext(text, parser_options()).into_offset_iter());
    let nodes = collect_nodes(events);
    debug!(nodes = nodes.len(), "rendering document");

    let mut out = String::with_capacity(text.len() * 3 / 2);
    let mut diagnostics = Vec::new();

    for node in nodes {
        match node {
            Node::Heading {
                level,
                content,
                span,
            } => {
                let heading = render_heading(level, &content, options.slug);
                if heading.title.is_fallback() {
                    diagnostics.push(Diagnostic::new(
                        source_map.range(span),
                        DiagnosticSeverity::Info,
                        I_HEADING_FALLBACK,
                        "heading content could not be read as markup; anchor uses raw text",
                    ));
                }
                out.push_str(&heading.html);
                out.push('\n');
            }
            Node::CodeBlock {
                info,
                literal,
                span,
            } => {
                let block = render_code_block(&info, &literal, options);
                for issue in block.issues {
                    diagnostics.push(Diagnostic::new(
                        source_map.range(span.clone()),
                        DiagnosticSeverity::Warning,
                        issue.code,
                        issue.message,
                    ));
                }
                out.push_str(&block.html);
                out.push('\n');
            }
            Node::Other(events) => html::push_html(&mut out, events.into_iter()),
        }
    }

    let html = if options.sanitize { sanitize(&out) } else { out };
    RenderResult { html, diagnostics }
}

/// Renders with the default options.
pub fn markdown(text: &str) -> String {
    render_with_options(text, &RenderOptions::default()).html
}

/// Byte-oriented entry point; invalid UTF-8 is replaced before parsing.
pub fn render(source: &[u8]) -> Vec<u8> {
    markdown(&String::from_utf8_lossy(source)).into_bytes()
}
