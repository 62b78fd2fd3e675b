//! Start Menu overlay state.

use crate::apps::Launcher;
use crate::icons::IconBoard;

/// Label of the item that shuts the shell down.
pub const EXIT_LABEL: &str = "Close MKS OS";

#[derive(Debug, Clone)]
pub enum MenuAction {
    Launch(Launcher),
    Exit,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

/// The open overlay. Exists only while the menu is shown.
#[derive(Debug, Clone)]
pub struct MenuOverlay {
    items: Vec<MenuItem>,
    selected: usize,
}

impl MenuOverlay {
    fn from_board(board: &IconBoard) -> Self {
        let mut items: Vec<_> = board
            .launchers()
            .map(|launcher| MenuItem {
                label: launcher.name().to_string(),
                action: MenuAction::Launch(launcher.clone()),
            })
            .collect();
        items.push(MenuItem {
            label: EXIT_LABEL.to_string(),
            action: MenuAction::Exit,
        });
        Self { items, selected: 0 }
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }
}

#[derive(Debug, Clone, Default)]
pub enum StartMenuState {
    #[default]
    Closed,
    Open(MenuOverlay),
}

/// Holds at most one overlay; opening always builds a fresh one.
#[derive(Debug, Default)]
pub struct StartMenu {
    state: StartMenuState,
}

impl StartMenu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, board: &IconBoard) {
        self.state = match self.state {
            StartMenuState::Closed => StartMenuState::Open(MenuOverlay::from_board(board)),
            StartMenuState::Open(_) => StartMenuState::Closed,
        };
    }

    pub fn close(&mut self) {
        self.state = StartMenuState::Closed;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, StartMenuState::Open(_))
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&MenuOverlay> {
        match &self.state {
            StartMenuState::Open(overlay) => Some(overlay),
            StartMenuState::Closed => None,
        }
    }

    pub fn select_next(&mut self) {
        if let StartMenuState::Open(overlay) = &mut self.state {
            overlay.selected = (overlay.selected + 1) % overlay.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if let StartMenuState::Open(overlay) = &mut self.state {
            let len = overlay.items.len();
            overlay.selected = (overlay.selected + len - 1) % len;
        }
    }

    #[must_use]
    pub fn selected_action(&self) -> Option<MenuAction> {
        let overlay = self.overlay()?;
        self.action_at(overlay.selected)
    }

    #[must_use]
    pub fn action_at(&self, index: usize) -> Option<MenuAction> {
        self.overlay()?
            .items
            .get(index)
            .map(|item| item.action.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::builtin_launchers;
    use crate::icons::IconEntry;

    fn board() -> IconBoard {
        IconBoard::new(builtin_launchers().into_iter().map(IconEntry::from).collect())
    }

    #[test]
    fn toggle_twice_returns_to_closed() {
        let board = board();
        let mut menu = StartMenu::new();
        menu.toggle(&board);
        assert!(menu.is_open());
        menu.toggle(&board);
        assert!(!menu.is_open());
        assert!(menu.overlay().is_none());
    }

    #[test]
    fn overlay_lists_launchers_then_exit() {
        let board = board();
        let mut menu = StartMenu::new();
        menu.toggle(&board);
        let labels: Vec<_> = menu
            .overlay()
            .unwrap()
            .items()
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(labels, ["Notepad", "File Explorer", "Settings", EXIT_LABEL]);
        assert!(matches!(menu.action_at(3), Some(MenuAction::Exit)));
        assert!(menu.action_at(4).is_none());
    }

    #[test]
    fn selection_wraps_both_ways() {
        let board = board();
        let mut menu = StartMenu::new();
        menu.toggle(&board);
        menu.select_prev();
        assert!(matches!(menu.selected_action(), Some(MenuAction::Exit)));
        menu.select_next();
        assert!(matches!(
            menu.selected_action(),
            Some(MenuAction::Launch(ref l)) if l.name() == "Notepad"
        ));
    }

    #[test]
    fn close_is_valid_from_either_state() {
        let board = board();
        let mut menu = StartMenu::new();
        menu.close();
        assert!(!menu.is_open());
        menu.toggle(&board);
        menu.close();
        assert!(!menu.is_open());
        assert!(menu.selected_action().is_none());
    }

    #[test]
    fn reopening_resets_selection() {
        let board = board();
        let mut menu = StartMenu::new();
        menu.toggle(&board);
        menu.select_next();
        menu.close();
        menu.toggle(&board);
        assert_eq!(menu.overlay().unwrap().selected(), 0);
    }
}
