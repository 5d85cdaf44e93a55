use std::fmt::Write as _;

use super::{BlockStyle, SelectionForm};

/// Rendered output ready to be handed to the student as a download.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("selection form has no content to render")]
    EmptyForm,
    #[error("failed to lay out selection form: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("failed to write PDF selection form: {0}")]
    Pdf(String),
}

/// Sink turning a selection form into a byte stream.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, form: &SelectionForm) -> Result<RenderedDocument, RenderError>;
}

const DEFAULT_WIDTH: usize = 80;
const CONTINUATION_INDENT: &str = "   ";

/// Fixed-width UTF-8 text layout of the form.
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    width: usize,
}

impl PlainTextRenderer {
    pub fn with_width(width: usize) -> Self {
        Self {
            width: width.max(20),
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::with_width(DEFAULT_WIDTH)
    }
}

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, form: &SelectionForm) -> Result<RenderedDocument, RenderError> {
        if form.blocks().is_empty() {
            return Err(RenderError::EmptyForm);
        }

        let mut out = String::new();
        let mut previous = None;

        for block in form.blocks() {
            match block.style {
                BlockStyle::Title => {
                    let title = centered(&block.text, self.width);
                    let rule = centered(&"=".repeat(block.text.chars().count()), self.width);
                    writeln!(out, "{title}")?;
                    writeln!(out, "{rule}")?;
                    writeln!(out)?;
                }
                BlockStyle::Field => writeln!(out, "{}", block.text)?,
                BlockStyle::Heading | BlockStyle::Note => {
                    writeln!(out)?;
                    for line in wrap(&block.text, self.width) {
                        writeln!(out, "{line}")?;
                    }
                }
                BlockStyle::Choice => {
                    if previous == Some(BlockStyle::Field) {
                        writeln!(out)?;
                    }
                    for line in wrap(&block.text, self.width) {
                        writeln!(out, "{line}")?;
                    }
                }
            }
            previous = Some(block.style);
        }

        Ok(RenderedDocument {
            file_name: format!("{}.txt", form.file_stem()),
            content_type: mime::TEXT_PLAIN_UTF_8,
            bytes: out.into_bytes(),
        })
    }
}

fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Greedy word wrap; continuation lines carry a hanging indent.
pub(super) fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        let word_len = word.chars().count();
        let is_fresh_line = current.is_empty() || current == CONTINUATION_INDENT;

        if !is_fresh_line && current_len + 1 + word_len > width {
            lines.push(std::mem::replace(
                &mut current,
                CONTINUATION_INDENT.to_string(),
            ));
        }

        if !(current.is_empty() || current == CONTINUATION_INDENT) {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_long_lines_with_indent() {
        let lines = wrap("one two three four five six", 12);
        assert_eq!(lines, vec!["one two", "   three", "   four five", "   six"]);
    }

    #[test]
    fn wrap_keeps_overlong_words_whole() {
        let lines = wrap("supercalifragilistic ok", 10);
        assert_eq!(lines, vec!["supercalifragilistic", "   ok"]);
    }

    #[test]
    fn centered_pads_left() {
        assert_eq!(centered("ab", 6), "  ab");
        assert_eq!(centered("abcdef", 4), "abcdef");
    }
}
