// ABOUTME: Rich HTML rendering of step content with variable chips
// ABOUTME: Substitutes tokens into styled spans and auto-links bare URLs

use super::engine::Renderer;
use crate::model::Variable;

impl Renderer {
    /// Render HTML-bearing step content. Resolved tokens become
    /// variable chips; a resolved variable with an empty value shows
    /// the token text inside the chip as an unfilled placeholder.
    /// Unresolved tokens pass through literally. The content comes
    /// from the in-app editor and is emitted as-is, without escaping.
    pub fn render_html(&self, content: &str, variables: &[Variable]) -> String {
        if content.is_empty() {
            return String::new();
        }

        let substituted = self.substitute_chips(content, variables);
        self.linkify(&substituted)
    }

    fn substitute_chips(&self, content: &str, variables: &[Variable]) -> String {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for caps in self.token.captures_iter(content) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            out.push_str(&content[last..whole.start()]);

            let key = inner.as_str().trim();
            match variables.iter().find(|v| v.key == key) {
                Some(variable) => {
                    let shown = if variable.value.is_empty() {
                        whole.as_str()
                    } else {
                        variable.value.as_str()
                    };
                    out.push_str("<span class=\"rich-variable\">");
                    out.push_str(shown);
                    out.push_str("</span>");
                }
                None => out.push_str(whole.as_str()),
            }

            last = whole.end();
        }

        out.push_str(&content[last..]);
        out
    }

    /// Wrap bare http(s) URLs in anchors, leaving URLs already inside
    /// an href attribute untouched.
    fn linkify(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for m in self.url.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            let url = m.as_str();
            if preceded_by_href(text, m.start()) {
                out.push_str(url);
            } else {
                out.push_str(&format!(
                    "<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"rich-link\">{url}</a>"
                ));
            }
            last = m.end();
        }

        out.push_str(&text[last..]);
        out
    }
}

/// The pattern has no lookbehind, so attribute context is checked by
/// inspecting the text right before the match.
fn preceded_by_href(text: &str, start: usize) -> bool {
    let prefix = &text[..start];
    prefix.ends_with("href=\"") || prefix.ends_with("href='")
}
