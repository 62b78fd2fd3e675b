//! The terminal as the shell's root surface.

use std::io::{self, Write};

use crossterm::{
    execute,
    style::{Color, SetBackgroundColor},
    terminal::{self, Clear, ClearType, SetSize, SetTitle},
};

use mks_engine::{Geometry, RootSurface, SurfaceSettings};

type SizeProbe = Box<dyn Fn() -> io::Result<(u16, u16)>>;

/// Applies title, size and background with terminal escape sequences.
///
/// Terminals that ignore resize requests keep their size; the shell lays out for
/// whatever size the terminal reports.
pub struct TerminalSurface<W: Write> {
    out: W,
    size: SizeProbe,
    applied: Option<SurfaceSettings>,
    destroyed: bool,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), Box::new(terminal::size))
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, size: SizeProbe) -> Self {
        Self {
            out,
            size,
            applied: None,
            destroyed: false,
        }
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> RootSurface for TerminalSurface<W> {
    fn apply(&mut self, settings: &SurfaceSettings) {
        let (r, g, b) = settings.background;
        let result = execute!(
            self.out,
            SetTitle(&settings.title),
            SetSize(settings.geometry.width(), settings.geometry.height()),
            SetBackgroundColor(Color::Rgb { r, g, b }),
            Clear(ClearType::All)
        );
        if let Err(e) = result {
            tracing::warn!("Failed to configure terminal surface: {e}");
        }
        tracing::debug!(geometry = %settings.geometry, title = %settings.title, "Surface configured");
        self.applied = Some(settings.clone());
    }

    fn current_geometry(&self) -> Option<Geometry> {
        let (width, height) = match (self.size)() {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!("Failed to read terminal size: {e}");
                return None;
            }
        };
        // Terminals do not report their position; keep the offset that was applied.
        let offset = self.applied.as_ref().and_then(|s| s.geometry.offset());
        let geometry = match offset {
            Some((x, y)) => Geometry::with_offset(width, height, x, y),
            None => Geometry::new(width, height),
        };
        geometry
            .inspect_err(|e| tracing::warn!("Terminal reported an unusable size: {e}"))
            .ok()
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Err(e) = execute!(self.out, Clear(ClearType::All)) {
            tracing::warn!("Failed to clear terminal surface: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use mks_engine::DESKTOP_BACKGROUND;

    use super::*;

    fn surface(size: (u16, u16)) -> TerminalSurface<Vec<u8>> {
        TerminalSurface::new(Vec::new(), Box::new(move || Ok(size)))
    }

    fn settings(geometry: &str) -> SurfaceSettings {
        SurfaceSettings {
            geometry: geometry.parse().unwrap(),
            title: "MKS OS".to_string(),
            background: DESKTOP_BACKGROUND,
        }
    }

    #[test]
    fn apply_sets_title_and_size() {
        let mut surface = surface((100, 32));
        surface.apply(&settings("100x32"));
        let written = String::from_utf8_lossy(surface.output()).into_owned();
        assert!(written.contains("MKS OS"));
        assert!(written.contains("\x1b[8;32;100t"));
    }

    #[test]
    fn geometry_reports_terminal_size_with_applied_offset() {
        let mut surface = surface((132, 43));
        assert_eq!(
            surface.current_geometry().unwrap().to_string(),
            "132x43"
        );
        surface.apply(&settings("100x32+10-4"));
        assert_eq!(
            surface.current_geometry().unwrap().to_string(),
            "132x43+10-4"
        );
    }

    #[test]
    fn unreadable_or_zero_size_is_none() {
        let failing = TerminalSurface::new(Vec::new(), Box::new(|| Err(io::Error::other("no tty"))));
        assert_eq!(failing.current_geometry(), None);
        assert_eq!(surface((0, 0)).current_geometry(), None);
    }

    #[test]
    fn destroy_runs_once() {
        let mut surface = surface((80, 24));
        surface.destroy();
        let len = surface.output().len();
        assert!(len > 0);
        surface.destroy();
        assert_eq!(surface.output().len(), len);
    }
}
