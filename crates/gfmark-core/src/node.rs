use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd, html};

/// The parts of a document the renderer treats specially; everything else is
/// passed through to the parser's own HTML writer.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<'a> {
    Heading {
        level: u8,
        /// Inline HTML of the heading content.
        content: String,
        span: Range<usize>,
    },
    CodeBlock {
        /// Fence info string; empty for indented blocks.
        info: String,
        literal: String,
        span: Range<usize>,
    },
    Other(Vec<Event<'a>>),
}

/// Groups an offset-annotated event stream into nodes.
pub fn collect_nodes<'a, I>(events: I) -> Vec<Node<'a>>
where
    I: IntoIterator<Item = (Event<'a>, Range<usize>)>,
{
    let mut nodes = Vec::new();
    let mut pending: Vec<Event<'a>> = Vec::new();
    let mut events = events.into_iter();

    while let Some((event, span)) = events.next() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(&mut nodes, &mut pending);
                let mut inner = Vec::new();
                for (event, _) in events.by_ref() {
                    if matches!(event, Event::End(TagEnd::Heading(_))) {
                        break;
                    }
                    inner.push(event);
                }
                let mut content = String::new();
                html::push_html(&mut content, inner.into_iter());
                nodes.push(Node::Heading {
                    level: level as u8,
                    content,
                    span,
                });
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                flush(&mut nodes, &mut pending);
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let mut literal = String::new();
                for (event, _) in events.by_ref() {
                    match event {
                        Event::Text(text) => literal.push_str(&text),
                        Event::End(TagEnd::CodeBlock) => break,
                        _ => {}
                    }
                }
                nodes.push(Node::CodeBlock {
                    info,
                    literal,
                    span,
                });
            }
            other => pending.push(other),
        }
    }
    flush(&mut nodes, &mut pending);
    nodes
}

fn flush<'a>(nodes: &mut Vec<Node<'a>>, pending: &mut Vec<Event<'a>>) {
    if !pending.is_empty() {
        nodes.push(Node::Other(std::mem::take(pending)));
    }
}
