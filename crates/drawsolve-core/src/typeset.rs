//! Math typesetting seam.
//!
//! Whatever displays solve answers owns a [`MathTypesetter`] and passes it
//! in. There is no global typesetting state.

/// Turns LaTeX into display markup.
pub trait MathTypesetter {
    fn render(&self, latex: &str) -> String;
}

/// Emits inline-math delimited markup, HTML-escaped, for a client-side
/// typesetter to pick up.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineMarkup;

impl MathTypesetter for InlineMarkup {
    fn render(&self, latex: &str) -> String {
        format!("\\({}\\)", escape_html(latex.trim()))
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
