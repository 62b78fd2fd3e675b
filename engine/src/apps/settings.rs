use mks_types::{Key, KeyInput, Theme};

use super::{AppRequest, LineStyle, SubApp, ViewLine, WindowView};

const THEME_ROW: u16 = 3;

/// Theme chooser. Fullscreen is listed but cannot be enabled.
#[derive(Debug)]
pub struct SettingsPanel {
    choice: Theme,
    applied: Theme,
}

impl SettingsPanel {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            choice: theme,
            applied: theme,
        }
    }

    fn apply(&mut self) -> AppRequest {
        self.applied = self.choice;
        tracing::info!(theme = %self.choice, "Applying theme");
        AppRequest::SetTheme(self.choice)
    }
}

fn theme_option(theme: Theme, choice: Theme) -> String {
    let mark = if theme == choice { '•' } else { ' ' };
    format!("({mark}) {theme}")
}

impl SubApp for SettingsPanel {
    fn title(&self) -> String {
        "Settings".to_string()
    }

    fn size(&self) -> (u16, u16) {
        (42, 10)
    }

    fn view(&self, _width: u16, _height: u16) -> WindowView {
        let options: Vec<_> = Theme::ALL
            .into_iter()
            .map(|theme| theme_option(theme, self.choice))
            .collect();
        let status = if self.applied == self.choice {
            format!("Current theme: {}", self.applied)
        } else {
            "Enter: apply".to_string()
        };
        WindowView {
            lines: vec![
                ViewLine::new("[ ] Enable experimental fullscreen", LineStyle::Muted),
                ViewLine::new("    (not implemented)", LineStyle::Muted),
                ViewLine::new("Theme:", LineStyle::Heading),
                ViewLine::new(format!("  {}", options.join("   ")), LineStyle::Selected),
                ViewLine::normal(""),
                ViewLine::new(status, LineStyle::Muted),
            ],
            cursor: None,
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> AppRequest {
        match key.key {
            Key::Left | Key::Right | Key::Up | Key::Down => {
                self.choice = self.choice.toggled();
                AppRequest::None
            }
            Key::Enter => self.apply(),
            _ => AppRequest::None,
        }
    }

    fn handle_click(&mut self, row: u16, _height: u16) -> AppRequest {
        if row == THEME_ROW {
            self.choice = self.choice.toggled();
        }
        AppRequest::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_choose_and_enter_applies() {
        let mut panel = SettingsPanel::new(Theme::Dark);
        assert_eq!(panel.handle_key(KeyInput::plain(Key::Right)), AppRequest::None);
        assert_eq!(panel.choice, Theme::Light);
        assert_eq!(
            panel.handle_key(KeyInput::plain(Key::Enter)),
            AppRequest::SetTheme(Theme::Light)
        );
        panel.handle_key(KeyInput::plain(Key::Up));
        assert_eq!(panel.choice, Theme::Dark);
    }

    #[test]
    fn fullscreen_line_is_disabled_and_stays_unchecked() {
        let mut panel = SettingsPanel::new(Theme::Dark);
        let before = panel.view(40, 8);
        assert_eq!(before.lines[0].style, LineStyle::Muted);
        assert!(before.lines[0].text.starts_with("[ ]"));

        assert_eq!(panel.handle_click(0, 8), AppRequest::None);
        assert_eq!(panel.view(40, 8).lines[0], before.lines[0]);
    }

    #[test]
    fn view_marks_current_choice() {
        let mut panel = SettingsPanel::new(Theme::Light);
        assert!(panel.view(40, 8).lines[3].text.contains("(•) Light"));
        panel.handle_click(THEME_ROW, 8);
        let view = panel.view(40, 8);
        assert!(view.lines[3].text.contains("(•) Dark"));
        assert_eq!(view.lines[5].text, "Enter: apply");
    }
}
