use std::collections::HashMap;

use once_cell::sync::Lazy;
use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;
use tracing::trace;

use crate::annotation::Annotation;
use crate::markup::{SpanMarkup, TOKEN_CLASSES, TokenClasses};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// How a recognized language tag is highlighted.
#[derive(Clone, Copy, Debug)]
pub enum Strategy {
    Diff,
    Syntax(&'static SyntaxReference),
}

/// Aliases kept for documents written against older renderers.
const ALIASES: &[(&str, &str)] = &[("Go-unformatted", "Go")];

static REGISTRY: Lazy<HashMap<String, Strategy>> = Lazy::new(|| {
    let syntax_set: &'static SyntaxSet = &SYNTAX_SET;
    let mut registry = HashMap::new();
    for syntax in syntax_set.syntaxes() {
        registry
            .entry(syntax.name.clone())
            .or_insert(Strategy::Syntax(syntax));
        registry
            .entry(syntax.name.to_lowercase())
            .or_insert(Strategy::Syntax(syntax));
        for extension in &syntax.file_extensions {
            registry
                .entry(extension.clone())
                .or_insert(Strategy::Syntax(syntax));
        }
    }
    for (alias, name) in ALIASES {
        if let Some(syntax) = syntax_set.find_syntax_by_name(name) {
            registry.insert(alias.to_string(), Strategy::Syntax(syntax));
        }
    }
    registry.insert("diff".to_string(), Strategy::Diff);
    registry
});

/// Language tag of a fence info string: everything up to the first space or
/// tab.
pub fn language_tag(info: &str) -> &str {
    let end = info.find([' ', '\t']).unwrap_or(info.len());
    &info[..end]
}

/// Case-sensitive lookup of a language tag.
pub fn lookup(lang: &str) -> Option<Strategy> {
    if lang.is_empty() {
        return None;
    }
    REGISTRY.get(lang).copied()
}

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("tokenizer failed: {0}")]
    Parse(#[from] syntect::parsing::ParsingError),
    #[error("scope stack out of sync: {0}")]
    Scope(#[from] syntect::parsing::ScopeError),
}

/// Token annotations for `src`, one flat span per classified token.
pub fn token_annotations(
    src: &str,
    syntax: &SyntaxReference,
) -> Result<Vec<Annotation>, TokenizeError> {
    token_annotations_with(src, syntax, &TOKEN_CLASSES)
}

pub fn token_annotations_with(
    src: &str,
    syntax: &SyntaxReference,
    classes: &TokenClasses,
) -> Result<Vec<Annotation>, TokenizeError> {
    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut anns: Vec<Annotation> = Vec::new();
    let mut markup_cache: HashMap<&'static str, SpanMarkup> = HashMap::new();
    let mut line_start = 0usize;

    for line in LinesWithEndings::from(src) {
        let ops = state.parse_line(line, &SYNTAX_SET)?;
        for (range, op) in ScopeRangeIterator::new(&ops, line) {
            stack.apply(op)?;
            if range.is_empty() {
                continue;
            }
            let Some(class) = token_class(&stack, classes) else {
                continue;
            };
            let start = line_start + range.start;
            let end = line_start + range.end;
            let markup = markup_cache
                .entry(class)
                .or_insert_with(|| SpanMarkup::class(class));
            // Merge with the previous token when it carries the same class.
            if let Some(last) = anns.last_mut() {
                if last.end == start && last.open == markup.open.as_bytes() {
                    last.end = end;
                    continue;
                }
            }
            anns.push(Annotation {
                start,
                end,
                open: markup.open.clone().into_bytes(),
                close: markup.close.clone().into_bytes(),
                want_inner: true,
            });
        }
        line_start += line.len();
    }

    trace!(syntax = %syntax.name, tokens = anns.len(), "tokenized code block");
    Ok(anns)
}

/// Class of the outermost classified scope, so a string keeps one class
/// across its quotes and escapes.
fn token_class(stack: &ScopeStack, classes: &TokenClasses) -> Option<&'static str> {
    let names: Vec<String> = stack.as_slice().iter().map(|scope| scope.build_string()).collect();
    names
        .iter()
        .enumerate()
        .find_map(|(depth, name)| classes.class_within(&names[..depth], name))
}
