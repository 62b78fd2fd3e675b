//! Modal overlays owned by the shell: error dialogs and the Run prompt.

use std::collections::VecDeque;

use mks_types::sanitize_label;

use crate::text::TextBuffer;

/// Most dialogs kept; the oldest waiting one is dropped first.
const MAX_QUEUED_DIALOGS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
}

impl ErrorDialog {
    /// Control characters are stripped here, so renderers can paint the text as-is.
    pub fn new(title: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        Self {
            title: sanitize_label(title.as_ref()).into_owned(),
            message: sanitize_label(message.as_ref()).into_owned(),
        }
    }
}

/// Error dialogs shown one at a time, oldest first.
#[derive(Debug, Default)]
pub struct DialogQueue {
    pending: VecDeque<ErrorDialog>,
}

impl DialogQueue {
    pub fn push(&mut self, dialog: ErrorDialog) {
        // The front dialog is on screen and stays until dismissed.
        if self.pending.len() == MAX_QUEUED_DIALOGS {
            self.pending.remove(1);
        }
        self.pending.push_back(dialog);
    }

    #[must_use]
    pub fn current(&self) -> Option<&ErrorDialog> {
        self.pending.front()
    }

    pub fn dismiss(&mut self) -> Option<ErrorDialog> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One-line command entry opened with Ctrl+R.
#[derive(Debug, Default)]
pub struct RunPrompt {
    input: TextBuffer,
}

impl RunPrompt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn push(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.backspace();
    }

    /// The command to run, if anything but whitespace was typed.
    #[must_use]
    pub fn submit(mut self) -> Option<String> {
        let command = self.input.take_text();
        let command = command.trim();
        (!command.is_empty()).then(|| command.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogs_are_shown_oldest_first() {
        let mut queue = DialogQueue::default();
        queue.push(ErrorDialog::new("one", "first"));
        queue.push(ErrorDialog::new("two", "second"));
        assert_eq!(queue.current().unwrap().title, "one");
        queue.dismiss();
        assert_eq!(queue.current().unwrap().title, "two");
        queue.dismiss();
        assert!(queue.is_empty());
        assert!(queue.dismiss().is_none());
    }

    #[test]
    fn queue_is_bounded() {
        let mut queue = DialogQueue::default();
        for i in 0..MAX_QUEUED_DIALOGS + 3 {
            queue.push(ErrorDialog::new("e", i.to_string()));
        }
        assert_eq!(queue.len(), MAX_QUEUED_DIALOGS);
        // The visible dialog survives; the oldest waiting ones make room.
        assert_eq!(queue.current().unwrap().message, "0");
        queue.dismiss();
        assert_eq!(queue.current().unwrap().message, "4");
    }

    #[test]
    fn dialog_text_is_sanitized() {
        let dialog = ErrorDialog::new("bad\x1b[2Jtitle", "line1\nline2");
        assert_eq!(dialog.title, "badtitle");
        assert_eq!(dialog.message, "line1 line2");
    }

    #[test]
    fn prompt_submits_trimmed_command() {
        let mut prompt = RunPrompt::new();
        for c in "  ls -la ".chars() {
            prompt.push(c);
        }
        prompt.backspace();
        assert_eq!(prompt.submit().as_deref(), Some("ls -la"));

        let mut blank = RunPrompt::new();
        blank.push(' ');
        assert_eq!(blank.submit(), None);
    }
}
