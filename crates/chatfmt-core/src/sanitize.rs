/// Escapes HTML metacharacters. `&` goes first so entities introduced by the later
/// replacements are not escaped twice.
pub fn sanitize_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}

/// Replaces every newline with a single space.
pub fn singleline(text: &str) -> String {
    text.replace('\n', " ")
}

pub(crate) fn newlines_to_breaks(text: &str) -> String {
    text.replace('\n', "<br />")
}

#[cfg(test)]
mod tests {
    use super::{sanitize_html, singleline};

    #[test]
    fn escapes_all_metacharacters() {
        assert_eq!(
            sanitize_html("<a href=\"x\">Tom's & Jerry</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom&#39;s &amp; Jerry&lt;/a&gt;"
        );
    }

    #[test]
    fn ampersand_is_escaped_once() {
        assert_eq!(sanitize_html("<"), "&lt;");
        assert_eq!(sanitize_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn plain_text_is_unchanged() {
        let text = "hello world, nothing to escape here.";
        assert_eq!(sanitize_html(text), text);
        assert_eq!(sanitize_html(&sanitize_html(text)), sanitize_html(text));
    }

    #[test]
    fn singleline_replaces_each_newline() {
        assert_eq!(singleline("a\nb\n\nc"), "a b  c");
    }
}
