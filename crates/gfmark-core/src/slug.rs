/// Anchor name for a heading title.
///
/// Letters and digits are kept and lowercased; every other run of characters
/// becomes a single `-` between words. Leading and trailing separators are
/// dropped, so the result is stable under repeated application.
pub fn create(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
