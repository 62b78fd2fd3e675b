//! Sub-application launch contract and the built-in applications.
//!
//! The shell only ever sees a `Box<dyn SubApp>`: it asks for a title, a preferred
//! size and a text view, forwards keys and clicks, and reacts to the returned
//! [`AppRequest`]. Everything else is the application's business.

mod file_explorer;
mod notepad;
mod settings;

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mks_types::{KeyInput, Point, Theme};

use crate::error::LaunchError;

pub use file_explorer::FileExplorer;
pub use notepad::Notepad;
pub use settings::SettingsPanel;

/// What a launcher is given to construct its application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContext {
    /// Starting directory for file-oriented applications.
    pub start_dir: PathBuf,
    /// Theme in effect when the application was opened.
    pub theme: Theme,
}

/// Request from an application back to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRequest {
    None,
    /// Close this window.
    Close,
    /// Hand a path to the platform file-open handler.
    OpenPath(PathBuf),
    /// Persist a new theme.
    SetTheme(Theme),
    ShowError { title: String, message: String },
}

impl AppRequest {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShowError {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Normal,
    Heading,
    Selected,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub text: String,
    pub style: LineStyle,
}

impl ViewLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(text, LineStyle::Normal)
    }
}

/// Window content, already fitted to the content area it was requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowView {
    pub lines: Vec<ViewLine>,
    /// Text cursor, relative to the content area.
    pub cursor: Option<Point>,
}

pub trait SubApp {
    fn title(&self) -> String;

    /// Preferred outer size (border included), in cells.
    fn size(&self) -> (u16, u16);

    fn view(&self, width: u16, height: u16) -> WindowView;

    fn handle_key(&mut self, key: KeyInput) -> AppRequest;

    /// Click on content row `row` of a content area `height` rows tall.
    fn handle_click(&mut self, _row: u16, _height: u16) -> AppRequest {
        AppRequest::None
    }

    /// Request produced while the application was being constructed.
    fn take_pending(&mut self) -> AppRequest {
        AppRequest::None
    }

    /// Called exactly once when the window is closed normally.
    fn on_close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

type LaunchFn = dyn Fn(&LaunchContext) -> Result<Box<dyn SubApp>, LaunchError>;

/// A named capability that opens one kind of application.
#[derive(Clone)]
pub struct Launcher {
    name: String,
    open: Rc<LaunchFn>,
}

impl Launcher {
    pub fn new<F>(name: impl Into<String>, open: F) -> Self
    where
        F: Fn(&LaunchContext) -> Result<Box<dyn SubApp>, LaunchError> + 'static,
    {
        Self {
            name: name.into(),
            open: Rc::new(open),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn launch(&self, ctx: &LaunchContext) -> Result<Box<dyn SubApp>, LaunchError> {
        (self.open)(ctx)
    }
}

impl fmt::Debug for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

pub const NOTEPAD: &str = "Notepad";
pub const FILE_EXPLORER: &str = "File Explorer";
pub const SETTINGS: &str = "Settings";

/// Notepad, File Explorer and Settings, in desktop order.
#[must_use]
pub fn builtin_launchers() -> Vec<Launcher> {
    vec![
        Launcher::new(NOTEPAD, |ctx| Ok(Box::new(Notepad::new(&ctx.start_dir)))),
        Launcher::new(FILE_EXPLORER, |ctx| {
            Ok(Box::new(FileExplorer::open(&ctx.start_dir)))
        }),
        Launcher::new(SETTINGS, |ctx| Ok(Box::new(SettingsPanel::new(ctx.theme)))),
    ]
}

/// Keep the tail of `lines` that fits in `height` rows.
pub(crate) fn tail(lines: Vec<ViewLine>, height: usize) -> Vec<ViewLine> {
    let skip = lines.len().saturating_sub(height);
    lines.into_iter().skip(skip).collect()
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_launchers_open_their_apps() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = LaunchContext {
            start_dir: dir.path().to_path_buf(),
            theme: Theme::Light,
        };
        let names: Vec<_> = builtin_launchers()
            .iter()
            .map(|launcher| {
                let app = launcher.launch(&ctx).unwrap();
                assert!(app.title().starts_with(launcher.name()));
                launcher.name().to_string()
            })
            .collect();
        assert_eq!(names, [NOTEPAD, FILE_EXPLORER, SETTINGS]);
    }

    #[test]
    fn tail_keeps_last_rows() {
        let lines: Vec<_> = (0..5).map(|i| ViewLine::normal(i.to_string())).collect();
        let kept = tail(lines, 2);
        assert_eq!(kept[0].text, "3");
        assert_eq!(kept[1].text, "4");
    }
}
