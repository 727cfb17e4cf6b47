//! Class names and wrapper markup shared by every render call.

use once_cell::sync::Lazy;

/// Open/close markup for one kind of highlight span.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpanMarkup {
    pub open: String,
    pub close: String,
}

impl SpanMarkup {
    pub fn class(class: &str) -> Self {
        Self {
            open: format!("<span class=\"{}\">", class),
            close: "</span>".to_string(),
        }
    }
}

/// Markup used for diff blocks.
#[derive(Clone, Debug)]
pub struct DiffMarkup {
    pub removed_block: SpanMarkup,
    pub added_block: SpanMarkup,
    pub changed: SpanMarkup,
}

/// Scope-prefix to class table for tokenized code, most specific first.
#[derive(Clone, Debug)]
pub struct TokenClasses {
    pub rules: Vec<(&'static str, &'static str)>,
    /// `(enclosing, scope, class)`: overrides `rules` for `scope` when one of
    /// its ancestors matches `enclosing`.
    pub nested_rules: Vec<(&'static str, &'static str, &'static str)>,
}

impl TokenClasses {
    pub fn class_for(&self, scope: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|(prefix, _)| scope_matches(scope, prefix))
            .map(|(_, class)| *class)
    }

    /// Class for `scope` given the scopes enclosing it, outermost first.
    pub fn class_within<S: AsRef<str>>(
        &self,
        ancestors: &[S],
        scope: &str,
    ) -> Option<&'static str> {
        self.nested_rules
            .iter()
            .find(|(enclosing, prefix, _)| {
                scope_matches(scope, prefix)
                    && ancestors
                        .iter()
                        .any(|ancestor| scope_matches(ancestor.as_ref(), enclosing))
            })
            .map(|(_, _, class)| *class)
            .or_else(|| self.class_for(scope))
    }
}

fn scope_matches(scope: &str, prefix: &str) -> bool {
    scope == prefix
        || scope
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

pub static DIFF_MARKUP: Lazy<DiffMarkup> = Lazy::new(|| DiffMarkup {
    removed_block: SpanMarkup::class("gd input-block"),
    added_block: SpanMarkup::class("gi input-block"),
    changed: SpanMarkup::class("x"),
});

pub static TOKEN_CLASSES: Lazy<TokenClasses> = Lazy::new(|| TokenClasses {
    rules: vec![
        ("comment", "c"),
        ("string", "s"),
        ("constant.numeric", "m"),
        ("constant", "o"),
        ("keyword", "k"),
        ("storage", "k"),
        ("entity.name.tag", "tag"),
        ("entity.other.attribute-name", "atn"),
        ("punctuation.definition.tag", "htm"),
        ("entity.name.type", "n"),
        ("entity.name.class", "n"),
        ("support.type", "n"),
        ("support.class", "n"),
        ("punctuation", "p"),
    ],
    nested_rules: vec![("meta.attribute-with-value", "string", "atv")],
});

pub const ANCHOR_ICON: &str = "<span class=\"octicon octicon-link\"></span>";
