use std::borrow::Cow;

use ammonia::Builder;
use once_cell::sync::Lazy;

/// The user-generated-content policy with the extra attributes headings,
/// highlighted code and task lists need.
static POLICY: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .add_tags(["input"])
        .add_tag_attributes("div", ["class"])
        .add_tag_attributes("span", ["class"])
        .add_tag_attributes("a", ["class", "name", "aria-hidden"])
        .add_tag_attributes("input", ["type", "checked", "disabled"])
        .add_url_schemes(["data"])
        .link_rel(Some("nofollow"))
        .attribute_filter(filter_attribute);
    builder
});

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    let allowed = match (element, attribute) {
        (_, "class") => is_space_separated_tokens(value),
        ("a", "name") => is_space_separated_tokens(value),
        ("a", "aria-hidden") => value == "true",
        ("input", "type") => value == "checkbox",
        ("input", "checked") | ("input", "disabled") => value.is_empty(),
        ("img", "src") => !is_data_uri(value) || value.starts_with("data:image/"),
        (_, "href") | (_, "src") | (_, "cite") => !is_data_uri(value),
        _ => true,
    };
    if allowed { Some(Cow::Borrowed(value)) } else { None }
}

fn is_space_separated_tokens(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_whitespace() || ch.is_alphanumeric() || ch == '_' || ch == '-')
}

fn is_data_uri(value: &str) -> bool {
    value
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Strips everything the policy does not allow from `html`.
pub fn sanitize(html: &str) -> String {
    POLICY.clean(html).to_string()
}
