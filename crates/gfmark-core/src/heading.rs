use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, CharacterTokens, ParseError, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use tracing::debug;

use crate::escape::escape_html;
use crate::markup::ANCHOR_ICON;

/// Plain-text title recovered from a heading's inline HTML.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TitleText {
    /// Text nodes of the parsed fragment, concatenated in document order.
    Parsed(String),
    /// The tokenizer reported the fragment as malformed; this is the text it
    /// recovered anyway.
    Fallback(String),
}

impl TitleText {
    pub fn as_str(&self) -> &str {
        match self {
            TitleText::Parsed(text) | TitleText::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TitleText::Fallback(_))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedHeading {
    pub anchor_name: String,
    pub html: String,
    pub title: TitleText,
}

/// Flattens a heading's inline HTML to its text with an HTML tokenizer.
/// Tags and comments are dropped and character references resolved. Any
/// tokenizer error marks the result as a fallback, which still carries the
/// recovered text.
pub fn extract_title(fragment: &str) -> TitleText {
    let sink = TextSink::default();
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let queue = BufferQueue::default();
    queue.push_back(StrTendril::from(fragment));
    let _ = tokenizer.feed(&queue);
    tokenizer.end();

    let sink = tokenizer.sink;
    let text = sink.text.into_inner();
    match sink.error.into_inner() {
        Some(err) => {
            debug!(%err, "heading fragment is malformed html");
            TitleText::Fallback(text)
        }
        None => TitleText::Parsed(text),
    }
}

#[derive(Default)]
struct TextSink {
    text: RefCell<String>,
    error: Cell<Option<Cow<'static, str>>>,
}

impl TokenSink for TextSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            CharacterTokens(chars) => self.text.borrow_mut().push_str(&chars),
            ParseError(err) => {
                let first = self.error.take().unwrap_or(err);
                self.error.set(Some(first));
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Builds the anchored heading for `level` around the original inline HTML.
/// The slug is derived from the flattened text only.
pub fn render_heading(level: u8, inline_html: &str, slug: fn(&str) -> String) -> RenderedHeading {
    let title = extract_title(inline_html);
    let anchor_name = slug(title.as_str());
    let html = heading_markup(level, &anchor_name, inline_html);
    RenderedHeading {
        anchor_name,
        html,
        title,
    }
}

/// Heading for a plain-text title; the title is escaped for display.
pub fn heading_html(level: u8, title: &str) -> String {
    let anchor_name = crate::slug::create(title);
    heading_markup(level, &anchor_name, &escape_html(title))
}

fn heading_markup(level: u8, anchor_name: &str, content: &str) -> String {
    let level = level.clamp(1, 6);
    let name = escape_html(anchor_name);
    format!(
        "<h{level}><a name=\"{name}\" class=\"anchor\" href=\"#{name}\" rel=\"nofollow\" aria-hidden=\"true\">{icon}</a>{content}</h{level}>",
        level = level,
        name = name,
        icon = ANCHOR_ICON,
        content = content,
    )
}
