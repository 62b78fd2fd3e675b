use std::path::{Path, PathBuf};

use mks_types::{Key, KeyInput, Point};
use unicode_width::UnicodeWidthStr;

use super::{AppRequest, LineStyle, SubApp, ViewLine, WindowView, display_name, tail};
use crate::text::{TextBuffer, wrap_text};

const DEFAULT_FILE_NAME: &str = "untitled.txt";
const DEFAULT_EXTENSION: &str = "txt";

/// Plain-text editor with a "Save as" prompt on Ctrl+S. Ctrl+E closes the window.
#[derive(Debug)]
pub struct Notepad {
    buffer: TextBuffer,
    path: Option<PathBuf>,
    start_dir: PathBuf,
    save_prompt: Option<TextBuffer>,
    dirty: bool,
}

impl Notepad {
    #[must_use]
    pub fn new(start_dir: &Path) -> Self {
        Self {
            buffer: TextBuffer::new(),
            path: None,
            start_dir: start_dir.to_path_buf(),
            save_prompt: None,
            dirty: false,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn is_prompting(&self) -> bool {
        self.save_prompt.is_some()
    }

    fn open_prompt(&mut self) {
        let suggested = self
            .path
            .clone()
            .unwrap_or_else(|| self.start_dir.join(DEFAULT_FILE_NAME));
        self.save_prompt = Some(TextBuffer::with_text(suggested.display().to_string()));
    }

    fn save_to(&mut self, raw: &str) -> AppRequest {
        let raw = raw.trim();
        if raw.is_empty() {
            return AppRequest::error("Save error", "No file name given");
        }
        let mut path = PathBuf::from(raw);
        if path.extension().is_none() {
            path.set_extension(DEFAULT_EXTENSION);
        }
        match mks_utils::atomic_write(&path, self.buffer.text().as_bytes()) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Notepad saved file");
                self.path = Some(path);
                self.dirty = false;
                AppRequest::None
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "Error saving file: {e}");
                AppRequest::error("Save error", e.to_string())
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyInput) -> AppRequest {
        let Some(prompt) = self.save_prompt.as_mut() else {
            return AppRequest::None;
        };
        match key.key {
            Key::Esc => self.save_prompt = None,
            Key::Enter => {
                let raw = prompt.take_text();
                self.save_prompt = None;
                return self.save_to(&raw);
            }
            Key::Backspace => {
                prompt.backspace();
            }
            Key::Char(c) if !key.ctrl => prompt.push(c),
            _ => {}
        }
        AppRequest::None
    }
}

impl SubApp for Notepad {
    fn title(&self) -> String {
        let mut title = match &self.path {
            Some(path) => format!("Notepad - {}", display_name(path)),
            None => "Notepad".to_string(),
        };
        if self.dirty {
            title.push('*');
        }
        title
    }

    fn size(&self) -> (u16, u16) {
        (56, 18)
    }

    fn view(&self, width: u16, height: u16) -> WindowView {
        let width = usize::from(width.max(1));
        let mut text_rows = usize::from(height);
        let prompt_line = self.save_prompt.as_ref().map(|prompt| {
            text_rows = text_rows.saturating_sub(1);
            let label = format!("Save as: {}", prompt.text());
            // Keep the end of a long path visible.
            let overflow = label.width().saturating_sub(width);
            let shown: String = label.chars().skip(overflow).collect();
            ViewLine::new(shown, LineStyle::Selected)
        });

        let wrapped = wrap_text(self.buffer.text(), width);
        let mut lines = tail(wrapped.into_iter().map(ViewLine::normal).collect(), text_rows);

        let cursor = if let Some(prompt) = prompt_line {
            let col = prompt.text.width().min(width.saturating_sub(1));
            lines.push(prompt);
            Some(Point::new(col as u16, (lines.len() - 1) as u16))
        } else if let Some(last) = lines.last() {
            let col = last.text.width().min(width.saturating_sub(1));
            Some(Point::new(col as u16, (lines.len() - 1) as u16))
        } else {
            None
        };

        WindowView { lines, cursor }
    }

    fn handle_key(&mut self, key: KeyInput) -> AppRequest {
        if self.save_prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if key.is_ctrl('s') {
            self.open_prompt();
            return AppRequest::None;
        }
        if key.is_ctrl('e') {
            return AppRequest::Close;
        }
        match key.key {
            Key::Enter => {
                self.buffer.push('\n');
                self.dirty = true;
            }
            Key::Backspace => {
                if self.buffer.backspace() {
                    self.dirty = true;
                }
            }
            Key::Char(c) if !key.ctrl => {
                self.buffer.push(c);
                self.dirty = true;
            }
            _ => {}
        }
        AppRequest::None
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn type_text(app: &mut Notepad, text: &str) {
        for c in text.chars() {
            let key = if c == '\n' { Key::Enter } else { Key::Char(c) };
            assert_eq!(app.handle_key(KeyInput::plain(key)), AppRequest::None);
        }
    }

    #[test]
    fn typing_edits_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        type_text(&mut app, "hi\nthere");
        app.handle_key(KeyInput::plain(Key::Backspace));
        assert_eq!(app.text(), "hi\nther");
        assert_eq!(app.title(), "Notepad*");
    }

    #[test]
    fn ctrl_keys_are_not_inserted() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        app.handle_key(KeyInput::ctrl('x'));
        assert_eq!(app.text(), "");
    }

    #[test]
    fn save_as_writes_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        type_text(&mut app, "Привет\nworld");

        app.handle_key(KeyInput::ctrl('s'));
        assert!(app.is_prompting());
        let request = app.handle_key(KeyInput::plain(Key::Enter));
        assert_eq!(request, AppRequest::None);

        let saved = dir.path().join(DEFAULT_FILE_NAME);
        assert_eq!(fs::read_to_string(&saved).unwrap(), "Привет\nworld");
        assert_eq!(app.path(), Some(saved.as_path()));
        assert_eq!(app.title(), "Notepad - untitled.txt");
    }

    #[test]
    fn save_failure_becomes_error_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(&dir.path().join("missing"));
        type_text(&mut app, "x");

        app.handle_key(KeyInput::ctrl('s'));
        let request = app.handle_key(KeyInput::plain(Key::Enter));
        assert!(matches!(request, AppRequest::ShowError { ref title, .. } if title == "Save error"));
        assert!(!app.is_prompting());
    }

    #[test]
    fn bare_name_is_saved_as_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        type_text(&mut app, "x");

        let request = app.save_to(&dir.path().join("notes").display().to_string());
        assert_eq!(request, AppRequest::None);
        let saved = dir.path().join("notes.txt");
        assert_eq!(fs::read_to_string(&saved).unwrap(), "x");
        assert_eq!(app.path(), Some(saved.as_path()));
        assert!(!dir.path().join("notes").exists());
    }

    #[test]
    fn explicit_extension_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        let target = dir.path().join("README.md");
        assert_eq!(app.save_to(&target.display().to_string()), AppRequest::None);
        assert!(target.exists());
    }

    #[test]
    fn ctrl_e_closes_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        type_text(&mut app, "draft");
        assert_eq!(app.handle_key(KeyInput::ctrl('e')), AppRequest::Close);
        assert_eq!(app.text(), "draft");
    }

    #[test]
    fn ctrl_e_is_ignored_while_saving() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        app.handle_key(KeyInput::ctrl('s'));
        assert_eq!(app.handle_key(KeyInput::ctrl('e')), AppRequest::None);
        assert!(app.is_prompting());
    }

    #[test]
    fn escape_cancels_prompt_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        app.handle_key(KeyInput::ctrl('s'));
        app.handle_key(KeyInput::plain(Key::Esc));
        assert!(!app.is_prompting());
        assert!(!dir.path().join(DEFAULT_FILE_NAME).exists());
    }

    #[test]
    fn view_wraps_and_follows_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Notepad::new(dir.path());
        type_text(&mut app, "one two three\nfour");

        let view = app.view(8, 2);
        let texts: Vec<_> = view.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["three", "four"]);
        assert_eq!(view.cursor, Some(Point::new(4, 1)));
    }

    #[test]
    fn prompt_occupies_the_last_row() {
        let mut app = Notepad::new(Path::new("/tmp"));
        app.handle_key(KeyInput::ctrl('s'));
        let view = app.view(40, 5);
        let last = view.lines.last().unwrap();
        assert_eq!(last.style, LineStyle::Selected);
        assert!(last.text.starts_with("Save as: "));
        assert!(last.text.ends_with(DEFAULT_FILE_NAME));
    }
}
