use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mks_types::{Key, KeyInput, sanitize_label};

use super::{AppRequest, LineStyle, SubApp, ViewLine, WindowView};

const UP_ROW: &str = ".. (Up)";
const FOOTER: &str = "Enter: open   Backspace: up";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Directory browser. Row 0 is always ".. (Up)", then directories, then files.
#[derive(Debug)]
pub struct FileExplorer {
    current: PathBuf,
    entries: Vec<Entry>,
    selected: usize,
    pending: AppRequest,
}

impl FileExplorer {
    #[must_use]
    pub fn open(start_dir: &Path) -> Self {
        let mut explorer = Self {
            current: start_dir.to_path_buf(),
            entries: Vec::new(),
            selected: 0,
            pending: AppRequest::None,
        };
        explorer.pending = explorer.populate();
        explorer
    }

    #[must_use]
    pub fn current_dir(&self) -> &Path {
        &self.current
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Row labels as shown, including the ".. (Up)" row.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        std::iter::once(UP_ROW.to_string())
            .chain(self.entries.iter().map(|entry| {
                let prefix = if entry.is_dir { "[D] " } else { "[F] " };
                format!("{prefix}{}", sanitize_label(&entry.name))
            }))
            .collect()
    }

    fn row_count(&self) -> usize {
        self.entries.len() + 1
    }

    fn populate(&mut self) -> AppRequest {
        self.selected = 0;
        match read_entries(&self.current) {
            Ok(entries) => {
                self.entries = entries;
                AppRequest::None
            }
            Err(e) => {
                tracing::warn!(path = %self.current.display(), "Cannot list directory: {e}");
                self.entries.clear();
                AppRequest::error("Permission Denied", format!("{}: {e}", self.current.display()))
            }
        }
    }

    fn go_up(&mut self) -> AppRequest {
        let Some(parent) = self.current.parent().map(Path::to_path_buf) else {
            return AppRequest::None;
        };
        self.current = parent;
        self.populate()
    }

    fn activate(&mut self, row: usize) -> AppRequest {
        if row == 0 {
            return self.go_up();
        }
        let Some(entry) = self.entries.get(row - 1) else {
            return AppRequest::None;
        };
        if entry.is_dir {
            self.current = entry.path.clone();
            self.populate()
        } else {
            AppRequest::OpenPath(entry.path.clone())
        }
    }

    fn list_rows(height: u16) -> usize {
        // Path heading and footer.
        usize::from(height).saturating_sub(2).max(1)
    }

    fn scroll_offset(&self, visible: usize) -> usize {
        self.selected.saturating_sub(visible.saturating_sub(1))
    }
}

fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir)? {
        let item = item?;
        let path = item.path();
        entries.push(Entry {
            name: item.file_name().to_string_lossy().into_owned(),
            is_dir: path.is_dir(),
            path,
        });
    }
    entries.sort_by_cached_key(|entry| (!entry.is_dir, entry.name.to_lowercase()));
    Ok(entries)
}

impl SubApp for FileExplorer {
    fn title(&self) -> String {
        "File Explorer".to_string()
    }

    fn size(&self) -> (u16, u16) {
        (60, 18)
    }

    fn view(&self, _width: u16, height: u16) -> WindowView {
        let visible = Self::list_rows(height);
        let offset = self.scroll_offset(visible);

        let mut lines = vec![ViewLine::new(
            sanitize_label(&self.current.display().to_string()).into_owned(),
            LineStyle::Heading,
        )];
        lines.extend(
            self.rows()
                .into_iter()
                .enumerate()
                .skip(offset)
                .take(visible)
                .map(|(i, text)| {
                    let style = if i == self.selected {
                        LineStyle::Selected
                    } else {
                        LineStyle::Normal
                    };
                    ViewLine::new(text, style)
                }),
        );
        if height > 2 {
            while lines.len() < usize::from(height) - 1 {
                lines.push(ViewLine::normal(""));
            }
            lines.push(ViewLine::new(FOOTER, LineStyle::Muted));
        }
        WindowView {
            lines,
            cursor: None,
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> AppRequest {
        match key.key {
            Key::Up => {
                self.selected = self.selected.saturating_sub(1);
                AppRequest::None
            }
            Key::Down => {
                self.selected = (self.selected + 1).min(self.row_count() - 1);
                AppRequest::None
            }
            Key::Enter => self.activate(self.selected),
            Key::Backspace => self.go_up(),
            _ => AppRequest::None,
        }
    }

    fn handle_click(&mut self, row: u16, height: u16) -> AppRequest {
        let visible = Self::list_rows(height);
        let row = usize::from(row);
        if row == 0 || row > visible {
            return AppRequest::None;
        }
        let index = self.scroll_offset(visible) + row - 1;
        if index >= self.row_count() {
            return AppRequest::None;
        }
        if index == self.selected {
            self.activate(index)
        } else {
            self.selected = index;
            AppRequest::None
        }
    }

    fn take_pending(&mut self) -> AppRequest {
        std::mem::replace(&mut self.pending, AppRequest::None)
    }
}
