use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const BASE_CSS: &str = include_str!("../assets/chatfmt.css");
const BASE_JS: &str = include_str!("../assets/chatfmt.js");

const CODE_OPEN: &str = "<pre><code class=\"";
const CODE_CLOSE: &str = "</code></pre>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
}

/// Presents formatted chat fragments as standalone pages: theme variables, the base
/// stylesheet, the click-to-search script and syntax highlighting of fenced code.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    custom_vars: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, true));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&indent_root_block(&dark_vars));
                out.push_str("}\n");
            }
            Theme::Light => out.push_str(&root_block(&light_vars, true)),
            Theme::Dark => out.push_str(&root_block(&dark_vars, true)),
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, false));
        }

        out.push_str(BASE_CSS);
        out
    }

    /// Wraps one formatted message in a complete HTML document.
    pub fn embed_html(&self, fragment: &str, with_inline_css: bool, with_inline_js: bool) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        if with_inline_css {
            out.push_str("  <style>\n");
            out.push_str(&self.stylesheet());
            out.push_str("\n  </style>\n");
        }
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str("<div class=\"chatfmt-message\">\n");
        out.push_str(fragment);
        if !fragment.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</div>\n");
        if with_inline_js {
            out.push_str("  <script>\n");
            out.push_str(BASE_JS);
            out.push_str("\n  </script>\n");
        }
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    pub fn generate_files(&self, out_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(out_dir)?;
        fs::write(out_dir.join("chatfmt.css"), self.stylesheet())?;
        fs::write(out_dir.join("chatfmt.js"), BASE_JS)?;
        Ok(())
    }

    /// Colors every `<pre><code class="language-*">` block. Blocks without a known
    /// language are left as they are.
    pub fn highlight_html(&self, html: &str) -> String {
        if !html.contains(CODE_OPEN) {
            return html.to_string();
        }
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        match pick_theme(self.theme, &theme_set) {
            Some(theme) => highlight_html_inner(html, &syntax_set, theme),
            None => html.to_string(),
        }
    }
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--chatfmt-bg".to_string(), "#ffffff".to_string()),
        ("--chatfmt-fg".to_string(), "#1d1c1d".to_string()),
        ("--chatfmt-muted".to_string(), "#616061".to_string()),
        ("--chatfmt-border".to_string(), "#dddddd".to_string()),
        ("--chatfmt-accent".to_string(), "#1264a3".to_string()),
        ("--chatfmt-mention-fg".to_string(), "#1264a3".to_string()),
        ("--chatfmt-mention-bg".to_string(), "#fdf2c5".to_string()),
        ("--chatfmt-search-bg".to_string(), "#ffe58f".to_string()),
        ("--chatfmt-code-bg".to_string(), "#f6f6f6".to_string()),
        ("--chatfmt-code-fg".to_string(), "#c01343".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--chatfmt-bg".to_string(), "#1a1d21".to_string()),
        ("--chatfmt-fg".to_string(), "#d1d2d3".to_string()),
        ("--chatfmt-muted".to_string(), "#9a9b9d".to_string()),
        ("--chatfmt-border".to_string(), "#35373b".to_string()),
        ("--chatfmt-accent".to_string(), "#1d9bd1".to_string()),
        ("--chatfmt-mention-fg".to_string(), "#1d9bd1".to_string()),
        ("--chatfmt-mention-bg".to_string(), "#4a3f14".to_string()),
        ("--chatfmt-search-bg".to_string(), "#6b5a12".to_string()),
        ("--chatfmt-code-bg".to_string(), "#222529".to_string()),
        ("--chatfmt-code-fg".to_string(), "#e8912d".to_string()),
    ]);

    (light, dark)
}

fn format_vars(vars: &BTreeMap<String, String>, indent: &str) -> String {
    let mut out = String::new();
    for (key, value) in vars {
        out.push_str(indent);
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out
}

fn root_block(vars: &BTreeMap<String, String>, include_color_scheme: bool) -> String {
    let mut out = String::new();
    out.push_str(":root {\n");
    if include_color_scheme {
        out.push_str("  color-scheme: light dark;\n");
    }
    out.push_str(&format_vars(vars, "  "));
    out.push_str("}\n");
    out
}

fn indent_root_block(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("  :root {\n");
    out.push_str("    color-scheme: light dark;\n");
    out.push_str(&format_vars(vars, "    "));
    out.push_str("  }\n");
    out
}

fn pick_theme(theme: Theme, theme_set: &ThemeSet) -> Option<&SyntectTheme> {
    let candidates = match theme {
        Theme::Dark => ["Monokai Extended Bright", "Monokai Extended", "base16-ocean.dark"],
        Theme::Light | Theme::Auto => ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
    };
    candidates
        .iter()
        .find_map(|name| theme_set.themes.get(*name))
        .or_else(|| theme_set.themes.values().next())
}

fn highlight_html_inner(html: &str, syntax_set: &SyntaxSet, theme: &SyntectTheme) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(CODE_OPEN) {
        out.push_str(&rest[..start]);
        let block = &rest[start..];
        let end = match block.find(CODE_CLOSE) {
            Some(index) => index + CODE_CLOSE.len(),
            None => {
                out.push_str(block);
                return out;
            }
        };
        out.push_str(&highlight_block(&block[..end], syntax_set, theme));
        rest = &block[end..];
    }

    out.push_str(rest);
    out
}

fn highlight_block(block: &str, syntax_set: &SyntaxSet, theme: &SyntectTheme) -> String {
    let inner_end = block.len() - CODE_CLOSE.len();
    let tag_end = match block[CODE_OPEN.len()..].find('>') {
        Some(index) if CODE_OPEN.len() + index < inner_end => CODE_OPEN.len() + index,
        _ => return block.to_string(),
    };
    let class_attr = block[CODE_OPEN.len()..tag_end].trim_end_matches('"');
    let Some(syntax) = extract_language(class_attr)
        .and_then(|token| syntax_set.find_syntax_by_token(token))
    else {
        return block.to_string();
    };
    let code_inner = &block[tag_end + 1..inner_end];
    let highlighted = highlight_code(&unescape_html_code(code_inner), syntax_set, syntax, theme);

    let mut out = String::with_capacity(block.len() + highlighted.len());
    out.push_str(&block[..=tag_end]);
    out.push_str(&highlighted);
    out.push_str(CODE_CLOSE);
    out
}

fn highlight_code(
    code: &str,
    syntax_set: &SyntaxSet,
    syntax: &SyntaxReference,
    theme: &SyntectTheme,
) -> String {
    let mut out = String::with_capacity(code.len() * 2);
    let mut highlighter = HighlightLines::new(syntax, theme);
    for line in LinesWithEndings::from(code) {
        let html = highlighter
            .highlight_line(line, syntax_set)
            .ok()
            .and_then(|ranges| styled_line_to_highlighted_html(&ranges, IncludeBackground::No).ok());
        match html {
            Some(html) => out.push_str(&strip_font_weight(&html)),
            None => out.push_str(&escape_html_code(line)),
        }
    }
    out
}

fn extract_language(class_attr: &str) -> Option<&str> {
    class_attr
        .split_whitespace()
        .find_map(|class_name| class_name.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
}

fn escape_html_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_html_code(text: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| tail.starts_with(entity))
        {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_font_weight(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find("font-weight:") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + "font-weight:".len()..];
        match tail.find(';') {
            Some(index) => rest = &tail[index + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, Theme, unescape_html_code};

    #[test]
    fn embed_html_includes_css_and_js() {
        let renderer = Renderer::new(Theme::Light);
        let html = renderer.embed_html("<p>Hi</p>", true, true);
        assert!(html.contains("<style>"));
        assert!(html.contains("<script>"));
        assert!(html.contains("<div class=\"chatfmt-message\">\n<p>Hi</p>\n</div>"));
    }

    #[test]
    fn embed_html_can_skip_assets() {
        let renderer = Renderer::new(Theme::Light);
        let html = renderer.embed_html("<p>Hi</p>", false, false);
        assert!(!html.contains("<style>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<p>Hi</p>"));
    }

    #[test]
    fn stylesheet_styles_output_classes() {
        let css = Renderer::new(Theme::Auto).stylesheet();
        for selector in ["a.theme", "a.mention-link", ".search-highlight", ".mention-highlight"] {
            assert!(css.contains(selector), "missing {}", selector);
        }
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    #[test]
    fn custom_vars_override_theme() {
        let css = Renderer::new(Theme::Dark)
            .with_var("--chatfmt-accent", "#ff0000")
            .stylesheet();
        assert!(css.contains("--chatfmt-accent: #ff0000;"));
        assert!(!css.contains("@media"));
    }

    #[test]
    fn highlights_fenced_code_with_language() {
        let renderer = Renderer::new(Theme::Light);
        let html = "<p>x</p><pre><code class=\"language-rust\">let s = &quot;a&quot;;\n</code></pre>";
        let highlighted = renderer.highlight_html(html);
        assert!(highlighted.starts_with("<p>x</p><pre><code class=\"language-rust\">"));
        assert!(highlighted.contains("style=\""));
        assert!(highlighted.ends_with("</code></pre>"));
    }

    #[test]
    fn code_without_language_is_untouched() {
        let renderer = Renderer::new(Theme::Dark);
        let html = "<pre><code>plain &lt;text&gt;\n</code></pre>";
        assert_eq!(renderer.highlight_html(html), html);
    }

    #[test]
    fn unescape_reverses_entities() {
        assert_eq!(unescape_html_code("a &lt;b&gt; &amp; &#39;c&#39; &x"), "a <b> & 'c' &x");
    }
}
