//! Open sub-application windows.
//!
//! The registry owns every window from spawn until its close notification. Windows
//! are placed by a fixed cascade and never moved by the user; the only ordering
//! that matters is which window has focus, since that one is painted last.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use mks_types::{Point, Region, WindowId};

use crate::apps::SubApp;
use crate::error::{LaunchError, panic_message};

/// A close handler running longer than this is logged.
pub const CLOSE_BUDGET: Duration = Duration::from_millis(250);

const CASCADE_ORIGIN: Point = Point::new(16, 1);
const CASCADE_STEP: (u16, u16) = (3, 1);
const CASCADE_SLOTS: u16 = 6;

pub struct OpenWindow {
    id: WindowId,
    region: Region,
    app: Box<dyn SubApp>,
}

impl std::fmt::Debug for OpenWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWindow")
            .field("id", &self.id)
            .field("region", &self.region)
            .field("title", &self.app.title())
            .finish()
    }
}

impl OpenWindow {
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.app.title()
    }

    #[must_use]
    pub fn app(&self) -> &dyn SubApp {
        self.app.as_ref()
    }

    pub fn app_mut(&mut self) -> &mut dyn SubApp {
        self.app.as_mut()
    }

    /// The `[X]` on the top border.
    #[must_use]
    pub fn close_button(&self) -> Region {
        let r = self.region;
        Region::new(r.right().saturating_sub(4), r.y, 3, 1)
    }

    /// Inside of the border.
    #[must_use]
    pub fn content(&self) -> Region {
        let r = self.region;
        Region::new(
            r.x.saturating_add(1),
            r.y.saturating_add(1),
            r.width.saturating_sub(2),
            r.height.saturating_sub(2),
        )
    }
}

#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, OpenWindow>,
    next_id: u64,
    focused: Option<WindowId>,
}

impl WindowRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a window through `factory` and register it inside `desktop`.
    ///
    /// A panicking factory is reported as [`LaunchError::Panicked`]; nothing is registered.
    pub fn spawn<F>(&mut self, name: &str, desktop: Region, factory: F) -> Result<WindowId, LaunchError>
    where
        F: FnOnce() -> Result<Box<dyn SubApp>, LaunchError>,
    {
        let app = match catch_unwind(AssertUnwindSafe(factory)) {
            Ok(result) => result?,
            Err(payload) => {
                return Err(LaunchError::Panicked {
                    app: name.to_string(),
                    message: panic_message(payload.as_ref()),
                });
            }
        };

        self.next_id += 1;
        let id = WindowId::new(self.next_id);
        let region = self.cascade_region(app.size(), desktop);
        self.windows.insert(id, OpenWindow { id, region, app });
        self.focused = Some(id);
        tracing::debug!(window = %id, name, "Window opened");
        Ok(id)
    }

    fn cascade_region(&self, (width, height): (u16, u16), desktop: Region) -> Region {
        let slot = ((self.next_id - 1) % u64::from(CASCADE_SLOTS)) as u16;
        let x = desktop.x + CASCADE_ORIGIN.x + slot * CASCADE_STEP.0;
        let y = desktop.y + CASCADE_ORIGIN.y + slot * CASCADE_STEP.1;
        Region::new(x, y, width, height).clamp_within(desktop)
    }

    /// Close notification: forget `id`. Returns false if it was already gone.
    pub fn on_closed(&mut self, id: WindowId) -> bool {
        let removed = self.windows.remove(&id).is_some();
        if removed && self.focused == Some(id) {
            self.focused = self.windows.keys().next_back().copied();
        }
        removed
    }

    /// Run every window's close behaviour, then empty the registry. Returns how many
    /// windows were closed.
    pub fn close_all(&mut self) -> usize {
        let count = self.windows.len();
        for window in self.windows.values_mut() {
            run_close_handler(window);
        }
        self.windows.clear();
        self.focused = None;
        count
    }

    /// Run one window's close behaviour and drop it.
    pub fn close(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        run_close_handler(window);
        self.on_closed(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&OpenWindow> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut OpenWindow> {
        self.windows.get_mut(&id)
    }

    /// Windows in open order.
    pub fn iter(&self) -> impl Iterator<Item = &OpenWindow> {
        self.windows.values()
    }

    #[must_use]
    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn focus(&mut self, id: WindowId) -> bool {
        if self.windows.contains_key(&id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// Move focus to the next window in open order, wrapping around.
    pub fn focus_next(&mut self) {
        let next = match self.focused {
            Some(current) => self
                .windows
                .range(current..)
                .nth(1)
                .or_else(|| self.windows.iter().next())
                .map(|(id, _)| *id),
            None => self.windows.keys().next().copied(),
        };
        self.focused = next;
    }

    /// Paint order: open order with the focused window last.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&OpenWindow> {
        let mut order: Vec<_> = self
            .windows
            .values()
            .filter(|w| Some(w.id) != self.focused)
            .collect();
        if let Some(focused) = self.focused.and_then(|id| self.windows.get(&id)) {
            order.push(focused);
        }
        order
    }

    /// Topmost window under `point`.
    #[must_use]
    pub fn window_at(&self, point: Point) -> Option<WindowId> {
        self.draw_order()
            .into_iter()
            .rev()
            .find(|w| w.region.contains(point))
            .map(|w| w.id)
    }

    /// Keep every window inside a resized desktop.
    pub fn fit_within(&mut self, desktop: Region) {
        for window in self.windows.values_mut() {
            window.region = window.region.clamp_within(desktop);
        }
    }
}

fn run_close_handler(window: &mut OpenWindow) {
    let started = Instant::now();
    let id = window.id;
    match catch_unwind(AssertUnwindSafe(|| window.app.on_close())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(window = %id, "Close handler failed: {e:#}"),
        Err(payload) => tracing::error!(
            window = %id,
            "Close handler panicked: {}",
            panic_message(payload.as_ref())
        ),
    }
    let elapsed = started.elapsed();
    if elapsed > CLOSE_BUDGET {
        tracing::warn!(window = %id, ?elapsed, "Close handler exceeded its budget");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use mks_types::KeyInput;

    use super::*;
    use crate::apps::{AppRequest, WindowView};

    const DESKTOP: Region = Region::new(0, 0, 100, 31);

    #[derive(Default)]
    struct Probe {
        closes: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        fail: bool,
        panic: bool,
    }

    impl SubApp for Probe {
        fn title(&self) -> String {
            self.name.to_string()
        }
        fn size(&self) -> (u16, u16) {
            (30, 10)
        }
        fn view(&self, _: u16, _: u16) -> WindowView {
            WindowView::default()
        }
        fn handle_key(&mut self, _: KeyInput) -> AppRequest {
            AppRequest::None
        }
        fn on_close(&mut self) -> anyhow::Result<()> {
            self.closes.borrow_mut().push(self.name);
            if self.panic {
                panic!("close panicked");
            }
            if self.fail {
                anyhow::bail!("close failed");
            }
            Ok(())
        }
    }

    fn spawn_probe(
        registry: &mut WindowRegistry,
        closes: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> WindowId {
        let closes = Rc::clone(closes);
        registry
            .spawn(name, DESKTOP, move || {
                Ok(Box::new(Probe {
                    closes,
                    name,
                    ..Probe::default()
                }))
            })
            .unwrap()
    }

    #[test]
    fn spawn_and_close_track_count() {
        let closes = Rc::default();
        let mut registry = WindowRegistry::new();
        let a = spawn_probe(&mut registry, &closes, "a");
        let b = spawn_probe(&mut registry, &closes, "b");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.on_closed(a));
        assert_eq!(registry.len(), 1);
        assert!(!registry.on_closed(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn close_all_runs_every_handler_even_when_some_fail() {
        let closes: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let mut registry = WindowRegistry::new();
        spawn_probe(&mut registry, &closes, "a");
        for (name, fail, panic) in [("failing", true, false), ("panicking", false, true)] {
            let closes = Rc::clone(&closes);
            registry
                .spawn(name, DESKTOP, move || {
                    Ok(Box::new(Probe {
                        closes,
                        name,
                        fail,
                        panic,
                    }))
                })
                .unwrap();
        }
        spawn_probe(&mut registry, &closes, "z");

        assert_eq!(registry.close_all(), 4);
        assert!(registry.is_empty());
        assert_eq!(registry.focused(), None);
        assert_eq!(*closes.borrow(), ["a", "failing", "panicking", "z"]);
    }

    #[test]
    fn factory_errors_and_panics_register_nothing() {
        let mut registry = WindowRegistry::new();
        let err = registry
            .spawn("broken", DESKTOP, || Err(LaunchError::failed("broken", "no")))
            .unwrap_err();
        assert!(matches!(err, LaunchError::Failed { .. }));

        let err = registry
            .spawn("crashy", DESKTOP, || panic!("boom"))
            .unwrap_err();
        assert!(matches!(err, LaunchError::Panicked { ref message, .. } if message == "boom"));
        assert!(registry.is_empty());
    }

    #[test]
    fn windows_cascade_and_stay_on_the_desktop() {
        let closes = Rc::default();
        let mut registry = WindowRegistry::new();
        let first = spawn_probe(&mut registry, &closes, "a");
        let second = spawn_probe(&mut registry, &closes, "b");
        assert_eq!(registry.get(first).unwrap().region(), Region::new(16, 1, 30, 10));
        assert_eq!(registry.get(second).unwrap().region(), Region::new(19, 2, 30, 10));

        let small = Region::new(0, 0, 40, 12);
        registry.fit_within(small);
        for window in registry.iter() {
            let r = window.region();
            assert!(r.right() <= small.right() && r.bottom() <= small.bottom());
        }
    }

    #[test]
    fn focus_cycles_and_moves_on_close() {
        let closes = Rc::default();
        let mut registry = WindowRegistry::new();
        let a = spawn_probe(&mut registry, &closes, "a");
        let b = spawn_probe(&mut registry, &closes, "b");
        let c = spawn_probe(&mut registry, &closes, "c");
        assert_eq!(registry.focused(), Some(c));

        registry.focus_next();
        assert_eq!(registry.focused(), Some(a));
        registry.focus_next();
        assert_eq!(registry.focused(), Some(b));
        assert_eq!(registry.draw_order().last().map(|w| w.id()), Some(b));

        assert!(registry.close(b));
        assert_eq!(registry.focused(), Some(c));
        assert_eq!(*closes.borrow(), ["b"]);
    }

    #[test]
    fn topmost_window_wins_hit_test() {
        let closes = Rc::default();
        let mut registry = WindowRegistry::new();
        let a = spawn_probe(&mut registry, &closes, "a");
        let b = spawn_probe(&mut registry, &closes, "b");
        let overlap = Point::new(20, 5);
        assert_eq!(registry.window_at(overlap), Some(b));
        registry.focus(a);
        assert_eq!(registry.window_at(overlap), Some(a));
        assert_eq!(registry.window_at(Point::new(0, 0)), None);
    }

    #[test]
    fn chrome_regions_sit_on_the_border() {
        let closes = Rc::default();
        let mut registry = WindowRegistry::new();
        let id = spawn_probe(&mut registry, &closes, "a");
        let window = registry.get(id).unwrap();
        assert_eq!(window.close_button(), Region::new(42, 1, 3, 1));
        assert_eq!(window.content(), Region::new(17, 2, 28, 8));
    }
}
