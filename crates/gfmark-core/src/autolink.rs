use std::ops::Range;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

type Spanned<'a> = (Event<'a>, Range<usize>);

/// Turns bare `http://`, `https://`, `ftp://` and `www.` runs in text into
/// links. Text inside links, images and code blocks is left alone.
pub fn autolink<'a, I>(events: I) -> Vec<Spanned<'a>>
where
    I: IntoIterator<Item = Spanned<'a>>,
{
    let mut out = Vec::new();
    let mut pending: Option<(String, Range<usize>)> = None;
    let mut opaque = 0usize;

    for (event, span) in events {
        match event {
            Event::Text(text) if opaque == 0 => match pending.as_mut() {
                Some((buf, range)) => {
                    buf.push_str(&text);
                    range.end = range.end.max(span.end);
                }
                None => pending = Some((text.into_string(), span)),
            },
            other => {
                if let Some((text, range)) = pending.take() {
                    split_links(&mut out, text, range);
                }
                match &other {
                    Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                        opaque += 1
                    }
                    Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                        opaque = opaque.saturating_sub(1)
                    }
                    _ => {}
                }
                out.push((other, span));
            }
        }
    }
    if let Some((text, range)) = pending.take() {
        split_links(&mut out, text, range);
    }
    out
}

fn split_links<'a>(out: &mut Vec<Spanned<'a>>, text: String, span: Range<usize>) {
    // Sub-ranges are only exact when the text is a verbatim copy of its span.
    let exact = span.len() == text.len();
    let sub = |from: usize, to: usize| {
        if exact {
            span.start + from..span.start + to
        } else {
            span.clone()
        }
    };

    let mut links = Vec::new();
    let mut i = 0usize;
    while i < text.len() {
        if !text.is_char_boundary(i) {
            i += 1;
            continue;
        }
        match match_literal(&text, i) {
            Some(link) => {
                i = link.end;
                links.push(link);
            }
            None => i += 1,
        }
    }
    if links.is_empty() {
        out.push((Event::Text(text.into()), span));
        return;
    }

    let mut last = 0usize;
    for link in links {
        if link.start > last {
            out.push((
                Event::Text(text[last..link.start].to_string().into()),
                sub(last, link.start),
            ));
        }
        let range = sub(link.start, link.end);
        out.push((
            Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: link.url.into(),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }),
            range.clone(),
        ));
        out.push((
            Event::Text(text[link.start..link.end].to_string().into()),
            range.clone(),
        ));
        out.push((Event::End(TagEnd::Link), range));
        last = link.end;
    }
    if last < text.len() {
        out.push((Event::Text(text[last..].to_string().into()), sub(last, text.len())));
    }
}

struct LinkLiteral {
    start: usize,
    end: usize,
    url: String,
}

const SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

fn match_literal(text: &str, start: usize) -> Option<LinkLiteral> {
    let prev = start.checked_sub(1).map(|at| text.as_bytes()[at]);
    if !is_boundary(prev) {
        return None;
    }
    let rest = &text[start..];
    if let Some(scheme) = SCHEMES.iter().find(|scheme| rest.starts_with(**scheme)) {
        let end = scan_end(text, start);
        if end <= start + scheme.len() {
            return None;
        }
        return Some(LinkLiteral {
            start,
            end,
            url: text[start..end].to_string(),
        });
    }
    if rest.starts_with("www.") {
        let end = scan_end(text, start);
        if end <= start + 4 || !text[start + 4..end].contains('.') {
            return None;
        }
        return Some(LinkLiteral {
            start,
            end,
            url: format!("http://{}", &text[start..end]),
        });
    }
    None
}

fn is_boundary(prev: Option<u8>) -> bool {
    match prev {
        None => true,
        Some(b) => b.is_ascii_whitespace() || matches!(b, b'(' | b'[' | b'{' | b'"' | b'\''),
    }
}

fn scan_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b'"' | b'\'') {
            break;
        }
        end += 1;
    }
    trim_trailing(bytes, start, end)
}

fn trim_trailing(bytes: &[u8], start: usize, mut end: usize) -> usize {
    loop {
        let before = end;
        while end > start && matches!(bytes[end - 1], b'.' | b',' | b';' | b':' | b'!' | b'?') {
            end -= 1;
        }
        for (open, close) in [(b'(', b')'), (b'[', b']'), (b'{', b'}')] {
            end = trim_unbalanced(bytes, start, end, open, close);
        }
        if end == before {
            return end;
        }
    }
}

fn trim_unbalanced(bytes: &[u8], start: usize, mut end: usize, open: u8, close: u8) -> usize {
    let opened = bytes[start..end].iter().filter(|b| **b == open).count();
    let mut closed = bytes[start..end].iter().filter(|b| **b == close).count();
    while end > start && bytes[end - 1] == close && closed > opened {
        end -= 1;
        closed -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{Event, Parser, Tag, html};

    use super::autolink;

    fn to_html(text: &str) -> String {
        let events = autolink(Parser::new(text).into_offset_iter());
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter().map(|(event, _)| event));
        out
    }

    #[test]
    fn bare_urls_become_links() {
        assert_eq!(
            to_html("Visit https://example.com today\n"),
            "<p>Visit <a href=\"https://example.com\">https://example.com</a> today</p>\n"
        );
    }

    #[test]
    fn link_ranges_cover_the_url() {
        let events = autolink(Parser::new("Visit https://example.com today\n").into_offset_iter());
        let (_, range) = events
            .iter()
            .find(|(event, _)| matches!(event, Event::Start(Tag::Link { .. })))
            .expect("link");
        assert_eq!(*range, 6..25);
    }

    #[test]
    fn trailing_punctuation_and_unbalanced_brackets_stay_outside() {
        assert_eq!(
            to_html("(see https://a.io/x).\n"),
            "<p>(see <a href=\"https://a.io/x\">https://a.io/x</a>).</p>\n"
        );
        assert!(to_html("https://en.wikipedia.org/wiki/Rust_(language)\n")
            .contains("href=\"https://en.wikipedia.org/wiki/Rust_(language)\""));
    }

    #[test]
    fn www_prefix_gets_a_scheme() {
        assert_eq!(
            to_html("go to www.example.com.\n"),
            "<p>go to <a href=\"http://www.example.com\">www.example.com</a>.</p>\n"
        );
        assert!(!to_html("www.nothing here\n").contains("<a"));
    }

    #[test]
    fn urls_must_start_at_a_word_boundary() {
        assert!(!to_html("xhttps://a.io\n").contains("<a"));
        assert!(!to_html("https://\n").contains("<a"));
    }

    #[test]
    fn links_and_code_are_left_alone() {
        assert_eq!(to_html("[https://a.io](https://b.io)\n").matches("<a ").count(), 1);
        assert!(!to_html("`https://a.io`\n").contains("<a"));
        assert!(!to_html("```\nhttps://a.io\n```\n").contains("<a"));
        assert!(!to_html("    https://a.io\n").contains("<a"));
    }

    #[test]
    fn split_text_events_are_joined_before_matching() {
        let html = to_html("a\\_b https://a.io/x_y\n");
        assert!(html.contains("<a href=\"https://a.io/x_y\">https://a.io/x_y</a>"));
        assert!(html.starts_with("<p>a_b "));
    }
}
