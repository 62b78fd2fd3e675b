//! Editable text and word wrapping for sub-application views.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text edited at its end, with grapheme-aware deletion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    /// Remove the last grapheme cluster. Returns false when already empty.
    pub fn backspace(&mut self) -> bool {
        let Some((start, _)) = self.text.grapheme_indices(true).next_back() else {
            return false;
        };
        self.text.truncate(start);
        true
    }

    pub fn take_text(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Word-wrap `text` to `width` columns. Words wider than a line are broken at
/// grapheme boundaries; `\n` always starts a new line. Never returns an empty vec.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.split('\n') {
        wrap_line(line, width, &mut out);
    }
    out
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_inclusive(' ') {
        let visible = word.trim_end_matches(' ');
        let visible_width = visible.width();

        if !current.is_empty() && current_width + visible_width > width {
            out.push(current.trim_end().to_string());
            current.clear();
            current_width = 0;
        }

        if visible_width > width {
            for grapheme in word.graphemes(true) {
                let grapheme_width = grapheme.width();
                if !current.is_empty() && current_width + grapheme_width > width {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push_str(grapheme);
                current_width += grapheme_width;
            }
            continue;
        }

        current.push_str(word);
        current_width += word.width();
    }

    if current_width > width {
        out.push(current.trim_end().to_string());
    } else {
        out.push(current);
    }
}
