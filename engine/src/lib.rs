//! Desktop shell engine for MKS OS.
//!
//! This crate owns the shell state machine without terminal dependencies: the window
//! registry, the Start Menu, the desktop icons, the taskbar clock and persistence of
//! the shell configuration. The TUI crate reads state through [`Shell`] accessors
//! and feeds input back through [`Shell::handle_key`] and [`Shell::handle_click`].

mod apps;
mod clock;
mod dialog;
mod error;
mod external;
mod icons;
mod layout;
mod registry;
mod start_menu;
mod surface;
mod text;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::time::Instant;

pub use mks_config::{
    CONFIG_ENV_VAR, ConfigLoadError, ConfigSaveError, ConfigStore, config_dir,
    default_config_path,
};
pub use mks_types::{
    ClockTick, Geometry, Key, KeyInput, MIN_HEIGHT, MIN_WIDTH, Point, Region, ShellConfig, Theme,
    WindowId, sanitize_label,
};

pub use apps::{
    AppRequest, FILE_EXPLORER, FileExplorer, LaunchContext, Launcher, LineStyle, NOTEPAD, Notepad,
    SETTINGS, SettingsPanel, SubApp, ViewLine, WindowView, builtin_launchers,
};
pub use clock::{CLOCK_INTERVAL, ClockTicker, SystemClock, WallClock};
pub use dialog::{DialogQueue, ErrorDialog, RunPrompt};
pub use error::{ExternalCommandError, LaunchError};
pub use external::{
    ExternalOutcome, ExternalRunner, ProcessRunner, ShellProgram, detect_shell, open_handler,
};
pub use icons::{GLYPH_HEIGHT, GLYPH_WIDTH, ICON_ORIGIN, ICON_SPACING, IconBoard, IconEntry, IconSlot};
pub use layout::{CLOCK_WIDTH, MENU_WIDTH, START_LABEL, ShellLayout};
pub use registry::{CLOSE_BUDGET, OpenWindow, WindowRegistry};
pub use start_menu::{EXIT_LABEL, MenuAction, MenuItem, MenuOverlay, StartMenu, StartMenuState};
pub use surface::{DESKTOP_BACKGROUND, RootSurface, SurfaceSettings};
pub use text::{TextBuffer, wrap_text};

use error::panic_message;

/// Process exit code after a normal shutdown.
pub const EXIT_OK: i32 = 0;

/// Collaborators the shell is started with.
pub struct ShellDeps {
    pub store: ConfigStore,
    pub surface: Box<dyn RootSurface>,
    pub clock: Box<dyn WallClock>,
    pub runner: Box<dyn ExternalRunner>,
    /// Starting directory handed to launched applications.
    pub start_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Terminated { exit_code: i32 },
}

/// Everything the shell mutates. One value, owned by [`Shell`].
#[derive(Debug)]
pub struct ShellState {
    config: ShellConfig,
    layout: ShellLayout,
    icons: IconBoard,
    menu: StartMenu,
    windows: WindowRegistry,
    ticker: ClockTicker,
    clock_label: String,
    dialogs: DialogQueue,
    prompt: Option<RunPrompt>,
    start_dir: PathBuf,
    lifecycle: Lifecycle,
}

/// The desktop shell controller.
pub struct Shell {
    store: ConfigStore,
    surface: Box<dyn RootSurface>,
    runner: Box<dyn ExternalRunner>,
    state: ShellState,
}

impl Shell {
    /// Start with the built-in Notepad, File Explorer and Settings launchers.
    pub fn start(deps: ShellDeps, now: Instant) -> Self {
        Self::start_with_launchers(deps, builtin_launchers(), now)
    }

    /// Startup sequence, in order: load config, apply it to the root surface, build the
    /// icons, build the taskbar, start the clock, arm the Start Menu.
    pub fn start_with_launchers(deps: ShellDeps, launchers: Vec<Launcher>, now: Instant) -> Self {
        let ShellDeps {
            store,
            mut surface,
            clock,
            runner,
            start_dir,
        } = deps;

        let config = store.load();

        let geometry = config.geometry.at_least_minimum();
        surface.apply(&SurfaceSettings {
            geometry,
            title: sanitize_label(&config.title).into_owned(),
            background: DESKTOP_BACKGROUND,
        });
        let layout = ShellLayout::new(geometry.width(), geometry.height());

        let icons = IconBoard::new(launchers.into_iter().map(IconEntry::from).collect());

        let clock_label = String::new();

        let mut ticker = ClockTicker::new(CLOCK_INTERVAL, clock);
        ticker.start(now);

        let menu = StartMenu::new();

        tracing::info!(
            %geometry,
            theme = %config.theme,
            icons = icons.len(),
            "Shell started"
        );

        let mut shell = Self {
            store,
            surface,
            runner,
            state: ShellState {
                config,
                layout,
                icons,
                menu,
                windows: WindowRegistry::new(),
                ticker,
                clock_label,
                dialogs: DialogQueue::default(),
                prompt: None,
                start_dir,
                lifecycle: Lifecycle::Running,
            },
        };
        shell.poll_clock(now);
        shell
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.state.config
    }

    #[must_use]
    pub fn layout(&self) -> ShellLayout {
        self.state.layout
    }

    #[must_use]
    pub fn icons(&self) -> &IconBoard {
        &self.state.icons
    }

    #[must_use]
    pub fn start_menu(&self) -> &StartMenu {
        &self.state.menu
    }

    #[must_use]
    pub fn windows(&self) -> &WindowRegistry {
        &self.state.windows
    }

    #[must_use]
    pub fn ticker(&self) -> &ClockTicker {
        &self.state.ticker
    }

    #[must_use]
    pub fn clock_label(&self) -> &str {
        &self.state.clock_label
    }

    #[must_use]
    pub fn current_dialog(&self) -> Option<&ErrorDialog> {
        self.state.dialogs.current()
    }

    #[must_use]
    pub fn pending_dialogs(&self) -> usize {
        self.state.dialogs.len()
    }

    #[must_use]
    pub fn run_prompt(&self) -> Option<&RunPrompt> {
        self.state.prompt.as_ref()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self.state.lifecycle, Lifecycle::Terminated { .. })
    }

    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self.state.lifecycle {
            Lifecycle::Terminated { exit_code } => Some(exit_code),
            Lifecycle::Running => None,
        }
    }

    // ------------------------------------------------------------------
    // Periodic work
    // ------------------------------------------------------------------

    /// Advance the clock and collect collaborator outcomes. Called once per frame.
    pub fn tick(&mut self, now: Instant) {
        if self.is_terminated() {
            return;
        }
        self.poll_clock(now);
        for failure in self.runner.drain_failures() {
            self.state
                .dialogs
                .push(ErrorDialog::new(failure.title(), failure.to_string()));
        }
    }

    fn poll_clock(&mut self, now: Instant) {
        if let Some(tick) = self.state.ticker.poll(now) {
            self.state.clock_label = tick.label();
        }
    }

    /// The surface was resized to `width` x `height` cells.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        let layout = ShellLayout::new(width, height);
        if layout == self.state.layout {
            return;
        }
        self.state.layout = layout;
        self.state.windows.fit_within(layout.desktop());
    }

    // ------------------------------------------------------------------
    // Input routing
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyInput) {
        if self.is_terminated() {
            return;
        }
        if key.is_ctrl('c') || key.is_ctrl('q') {
            self.request_close();
            return;
        }

        if self.state.dialogs.current().is_some() {
            if matches!(key.key, Key::Enter | Key::Esc) {
                self.state.dialogs.dismiss();
            }
            return;
        }

        if let Some(prompt) = self.state.prompt.as_mut() {
            match key.key {
                Key::Esc => self.state.prompt = None,
                Key::Enter => self.submit_prompt(),
                Key::Backspace => prompt.backspace(),
                Key::Char(c) if !key.ctrl => prompt.push(c),
                _ => {}
            }
            return;
        }

        if key.key == Key::F(10) {
            self.toggle_start_menu();
            return;
        }

        if self.state.menu.is_open() {
            match key.key {
                Key::Esc => self.state.menu.close(),
                Key::Up => self.state.menu.select_prev(),
                Key::Down => self.state.menu.select_next(),
                Key::Enter => {
                    if let Some(action) = self.state.menu.selected_action() {
                        self.activate_menu_item(action);
                    }
                }
                _ => {}
            }
            return;
        }

        if key.is_ctrl('r') {
            self.state.prompt = Some(RunPrompt::new());
            return;
        }
        if key.is_ctrl('w') {
            if let Some(id) = self.state.windows.focused() {
                self.close_window(id);
            }
            return;
        }
        if key.key == Key::Tab {
            self.state.windows.focus_next();
            return;
        }

        if let Some(id) = self.state.windows.focused() {
            self.dispatch(id, "key", |app| app.handle_key(key));
        }
    }

    pub fn handle_click(&mut self, point: Point) {
        if self.is_terminated() {
            return;
        }
        let layout = self.state.layout;

        if self.state.dialogs.current().is_some() {
            self.state.dialogs.dismiss();
            return;
        }

        if self.state.prompt.is_some() {
            if !layout.run_prompt().contains(point) {
                self.state.prompt = None;
            }
            return;
        }

        if let Some(items) = self.state.menu.overlay().map(|o| o.items().len()) {
            let menu = layout.start_menu(items);
            let hit = (0..items).find(|&i| ShellLayout::menu_item(menu, i).contains(point));
            if let Some(action) = hit.and_then(|i| self.state.menu.action_at(i)) {
                self.activate_menu_item(action);
            } else if layout.start_button().contains(point) {
                self.toggle_start_menu();
            } else if !menu.contains(point) {
                self.state.menu.close();
            }
            return;
        }

        if layout.start_button().contains(point) {
            self.toggle_start_menu();
            return;
        }

        if let Some(id) = self.state.windows.window_at(point) {
            self.state.windows.focus(id);
            let Some(window) = self.state.windows.get(id) else {
                return;
            };
            if window.close_button().contains(point) {
                self.close_window(id);
                return;
            }
            let content = window.content();
            if content.contains(point) {
                let row = point.y - content.y;
                let height = content.height;
                self.dispatch(id, "click", |app| app.handle_click(row, height));
            }
            return;
        }

        if layout.desktop().contains(point)
            && let Some(launcher) = self.state.icons.handle_click(point).cloned()
        {
            self.launch(&launcher);
        }
    }

    fn toggle_start_menu(&mut self) {
        self.state.menu.toggle(&self.state.icons);
    }

    fn activate_menu_item(&mut self, action: MenuAction) {
        match action {
            MenuAction::Launch(launcher) => {
                self.state.menu.close();
                self.launch(&launcher);
            }
            MenuAction::Exit => {
                self.request_close();
                self.state.menu.close();
            }
        }
    }

    fn submit_prompt(&mut self) {
        let Some(prompt) = self.state.prompt.take() else {
            return;
        };
        if let Some(command) = prompt.submit() {
            self.runner.run_command(&command);
        }
    }

    // ------------------------------------------------------------------
    // Windows
    // ------------------------------------------------------------------

    /// Open a window through `launcher`. Failures become an error dialog.
    pub fn launch(&mut self, launcher: &Launcher) -> Option<WindowId> {
        if self.is_terminated() {
            return None;
        }
        let ctx = LaunchContext {
            start_dir: self.state.start_dir.clone(),
            theme: self.state.config.theme,
        };
        let desktop = self.state.layout.desktop();
        match self
            .state
            .windows
            .spawn(launcher.name(), desktop, || launcher.launch(&ctx))
        {
            Ok(id) => {
                tracing::info!(window = %id, app = launcher.name(), "Launched");
                self.dispatch(id, "startup", |app| app.take_pending());
                Some(id)
            }
            Err(e) => {
                tracing::error!(app = launcher.name(), "Launch failed: {e}");
                self.state
                    .dialogs
                    .push(ErrorDialog::new("Launch Error", e.to_string()));
                None
            }
        }
    }

    /// Close `id` normally: its close behaviour runs, then it is unregistered.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        self.state.windows.close(id)
    }

    /// Run `handler` against window `id`, containing any panic.
    ///
    /// A panicking application is force-closed without its close behaviour and
    /// reported in a dialog.
    fn dispatch<F>(&mut self, id: WindowId, event: &str, handler: F)
    where
        F: FnOnce(&mut dyn SubApp) -> AppRequest,
    {
        let Some(window) = self.state.windows.get_mut(id) else {
            return;
        };
        let title = sanitize_label(&window.title()).into_owned();
        match catch_unwind(AssertUnwindSafe(|| handler(window.app_mut()))) {
            Ok(request) => self.apply_request(id, request),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(window = %id, event, "{title} panicked: {message}");
                self.state.windows.on_closed(id);
                self.state.dialogs.push(ErrorDialog::new(
                    "Application Error",
                    format!("{title} stopped unexpectedly and was closed: {message}"),
                ));
            }
        }
    }

    fn apply_request(&mut self, id: WindowId, request: AppRequest) {
        match request {
            AppRequest::None => {}
            AppRequest::Close => {
                self.close_window(id);
            }
            AppRequest::OpenPath(path) => self.runner.open_path(&path),
            AppRequest::SetTheme(theme) => self.set_theme(theme),
            AppRequest::ShowError { title, message } => {
                self.state.dialogs.push(ErrorDialog::new(title, message));
            }
        }
    }

    /// Record and persist `theme`. Rendered colours are not changed.
    pub fn set_theme(&mut self, theme: Theme) {
        self.state.config.theme = theme;
        if let Err(e) = self.store.save(&self.state.config) {
            tracing::error!("Failed to save config: {e}");
        }
    }

    // ------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------

    /// Shutdown sequence, in order: capture geometry, save config, close every
    /// window, stop the clock, destroy the root surface. Runs once.
    pub fn request_close(&mut self) {
        if self.is_terminated() {
            return;
        }
        tracing::info!(windows = self.state.windows.len(), "Shutting down");

        if let Some(geometry) = self.surface.current_geometry() {
            self.state.config.geometry = geometry;
        }

        if let Err(e) = self.store.save(&self.state.config) {
            tracing::error!("Failed to save config: {e}");
        }

        let closed = self.state.windows.close_all();
        tracing::debug!(closed, "Closed all windows");

        self.state.ticker.stop();

        self.surface.destroy();

        self.state.prompt = None;
        self.state.lifecycle = Lifecycle::Terminated { exit_code: EXIT_OK };
    }
}
