use crate::annotation::{Annotation, AnnotationError, sort_annotations, validate_sorted};

/// Overlays `annotations` on `src`, escaping every copied byte with `escape`.
///
/// The annotations may arrive in any order. They are sorted by start
/// ascending and end descending, then checked: each must lie inside `src`
/// and the set must nest properly. A crossing pair is rejected with
/// [`AnnotationError::Overlap`] instead of producing broken markup.
pub fn annotate<F>(
    src: &[u8],
    mut annotations: Vec<Annotation>,
    escape: F,
) -> Result<Vec<u8>, AnnotationError>
where
    F: Fn(u8, &mut Vec<u8>),
{
    sort_annotations(&mut annotations);
    validate_sorted(&annotations, src.len())?;

    let markup_len: usize = annotations
        .iter()
        .map(|ann| ann.open.len() + ann.close.len())
        .sum();
    let mut out = Vec::with_capacity(src.len() + markup_len);
    let mut stack: Vec<&Annotation> = Vec::new();
    // Open annotations whose inner bytes are replaced by their markup.
    let mut suppressed = 0usize;
    let mut next = 0usize;
    let mut pos = 0usize;

    loop {
        while let Some(top) = stack.last() {
            if top.end > pos {
                break;
            }
            out.extend_from_slice(&top.close);
            if !top.want_inner {
                suppressed -= 1;
            }
            stack.pop();
        }

        while let Some(ann) = annotations.get(next) {
            if ann.start != pos {
                break;
            }
            next += 1;
            out.extend_from_slice(&ann.open);
            if ann.is_empty() {
                out.extend_from_slice(&ann.close);
                continue;
            }
            if !ann.want_inner {
                suppressed += 1;
            }
            stack.push(ann);
        }

        if pos >= src.len() {
            break;
        }

        let mut boundary = src.len();
        if let Some(top) = stack.last() {
            boundary = boundary.min(top.end);
        }
        if let Some(ann) = annotations.get(next) {
            boundary = boundary.min(ann.start);
        }
        if suppressed == 0 {
            for &byte in &src[pos..boundary] {
                escape(byte, &mut out);
            }
        }
        pos = boundary;
    }

    // Validation keeps every end inside the buffer, so this only drains
    // what the loop above already closed.
    while let Some(top) = stack.pop() {
        out.extend_from_slice(&top.close);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::annotate;
    use crate::annotation::{Annotation, AnnotationError};
    use crate::escape::escape_html_byte;

    fn render(src: &str, anns: Vec<Annotation>) -> Result<String, AnnotationError> {
        annotate(src.as_bytes(), anns, escape_html_byte)
            .map(|out| String::from_utf8(out).expect("utf-8 output"))
    }

    fn wrap(start: usize, end: usize, tag: &str) -> Annotation {
        Annotation::wrap(start..end, format!("<{}>", tag), format!("</{}>", tag))
            .expect("valid range")
    }

    #[test]
    fn no_annotations_only_escapes() {
        assert_eq!(render("a<b&c", Vec::new()), Ok("a&lt;b&amp;c".to_string()));
    }

    #[test]
    fn nested_annotations_close_innermost_first() {
        let html = render("hello world", vec![wrap(6, 11, "i"), wrap(0, 11, "b")]);
        assert_eq!(html, Ok("<b>hello <i>world</i></b>".to_string()));
    }

    #[test]
    fn adjacent_annotations_close_before_opening() {
        let html = render("abcd", vec![wrap(2, 4, "i"), wrap(0, 2, "b")]);
        assert_eq!(html, Ok("<b>ab</b><i>cd</i>".to_string()));
    }

    #[test]
    fn equal_starts_open_outer_first() {
        let html = render("x<y", vec![wrap(0, 1, "i"), wrap(0, 3, "b")]);
        assert_eq!(html, Ok("<b><i>x</i>&lt;y</b>".to_string()));
    }

    #[test]
    fn empty_annotations_emit_open_and_close() {
        let html = render("ab", vec![wrap(1, 1, "i"), wrap(2, 2, "u")]);
        assert_eq!(html, Ok("a<i></i>b<u></u>".to_string()));
    }

    #[test]
    fn replacing_annotation_drops_inner_bytes() {
        let image = Annotation::new(2, 5, "<img>", "", false).expect("valid range");
        let html = render("a [x] b", vec![image, wrap(3, 4, "i")]);
        assert_eq!(html, Ok("a <img><i></i> b".to_string()));
    }

    #[test]
    fn crossing_annotations_are_rejected() {
        let html = render("abcdefgh", vec![wrap(0, 5, "b"), wrap(3, 8, "i")]);
        assert_eq!(
            html,
            Err(AnnotationError::Overlap {
                outer: 0..5,
                inner: 3..8
            })
        );
    }

    #[test]
    fn out_of_bounds_annotation_is_rejected() {
        let html = render("abc", vec![wrap(1, 4, "b")]);
        assert!(matches!(html, Err(AnnotationError::OutOfBounds { .. })));
    }

    #[test]
    fn multibyte_text_is_copied_untouched() {
        let src = "λ → μ";
        let html = render(src, vec![wrap(0, 2, "b")]);
        assert_eq!(html, Ok("<b>λ</b> → μ".to_string()));
    }
}
