//! Cell layout of the desktop, shared by hit-testing and rendering.

use mks_types::{Point, Region};

pub const START_LABEL: &str = "[ Start ]";
/// `HH:MM:SS  YYYY-MM-DD`
pub const CLOCK_WIDTH: u16 = 20;
pub const MENU_WIDTH: u16 = 20;
const PROMPT_MAX_WIDTH: u16 = 60;
const DIALOG_MAX_WIDTH: u16 = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    width: u16,
    height: u16,
}

impl ShellLayout {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(2),
        }
    }

    #[must_use]
    pub fn size(self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Everything above the taskbar.
    #[must_use]
    pub fn desktop(self) -> Region {
        Region::new(0, 0, self.width, self.height - 1)
    }

    #[must_use]
    pub fn taskbar(self) -> Region {
        Region::new(0, self.height - 1, self.width, 1)
    }

    #[must_use]
    pub fn start_button(self) -> Region {
        Region::new(1, self.height - 1, START_LABEL.len() as u16, 1)
    }

    #[must_use]
    pub fn clock(self) -> Region {
        let x = self.width.saturating_sub(CLOCK_WIDTH + 1);
        Region::new(x, self.height - 1, CLOCK_WIDTH.min(self.width), 1)
    }

    /// Column of the `│` between the taskbar body and the clock.
    #[must_use]
    pub fn clock_separator(self) -> Point {
        Point::new(self.clock().x.saturating_sub(2), self.height - 1)
    }

    /// Menu box for `items` entries, anchored bottom-left above the taskbar.
    #[must_use]
    pub fn start_menu(self, items: usize) -> Region {
        let height = (items as u16 + 2).min(self.height - 1);
        let desktop = self.desktop();
        Region::new(0, desktop.bottom() - height, MENU_WIDTH.min(self.width), height)
    }

    /// Row of menu item `index` inside `menu`.
    #[must_use]
    pub fn menu_item(menu: Region, index: usize) -> Region {
        Region::new(
            menu.x + 1,
            menu.y + 1 + index as u16,
            menu.width.saturating_sub(2),
            1,
        )
    }

    #[must_use]
    pub fn run_prompt(self) -> Region {
        self.centered(PROMPT_MAX_WIDTH, 3)
    }

    /// Error dialog box tall enough for `message_lines` wrapped lines.
    #[must_use]
    pub fn dialog(self, message_lines: u16) -> Region {
        self.centered(DIALOG_MAX_WIDTH, message_lines + 4)
    }

    /// Text width available inside a dialog.
    #[must_use]
    pub fn dialog_text_width(self) -> u16 {
        self.centered(DIALOG_MAX_WIDTH, 1).width.saturating_sub(4)
    }

    fn centered(self, max_width: u16, height: u16) -> Region {
        let desktop = self.desktop();
        let width = max_width.min(desktop.width.saturating_sub(4)).max(1);
        let height = height.min(desktop.height);
        Region::new(
            (desktop.width - width) / 2,
            (desktop.height - height) / 2,
            width,
            height,
        )
    }
}
