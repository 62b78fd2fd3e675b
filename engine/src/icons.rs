//! Desktop icons and click hit-testing.

use mks_types::{Point, Region};
use unicode_width::UnicodeWidthStr;

use crate::apps::Launcher;

/// Rows between the tops of consecutive icons.
pub const ICON_SPACING: u16 = 5;
/// Top-left corner of the first icon glyph.
pub const ICON_ORIGIN: Point = Point::new(3, 1);
pub const GLYPH_WIDTH: u16 = 8;
pub const GLYPH_HEIGHT: u16 = 3;

#[derive(Debug, Clone)]
pub struct IconEntry {
    pub label: String,
    pub launcher: Launcher,
}

impl IconEntry {
    pub fn new(label: impl Into<String>, launcher: Launcher) -> Self {
        Self {
            label: label.into(),
            launcher,
        }
    }
}

impl From<Launcher> for IconEntry {
    fn from(launcher: Launcher) -> Self {
        Self::new(launcher.name().to_string(), launcher)
    }
}

/// Where one icon is painted: the glyph box and the label line centred under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSlot {
    pub glyph: Region,
    pub label: Region,
}

impl IconSlot {
    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        self.glyph.contains(point) || self.label.contains(point)
    }

    #[must_use]
    pub fn intersects(self, other: IconSlot) -> bool {
        [self.glyph, self.label]
            .into_iter()
            .any(|a| [other.glyph, other.label].into_iter().any(|b| a.intersects(b)))
    }
}

#[derive(Debug)]
pub struct IconBoard {
    icons: Vec<(IconEntry, IconSlot)>,
}

impl IconBoard {
    #[must_use]
    pub fn new(entries: Vec<IconEntry>) -> Self {
        Self::with_layout(entries, ICON_ORIGIN, ICON_SPACING)
    }

    /// Lay `entries` out in one column from `origin`, `spacing` rows apart.
    #[must_use]
    pub fn with_layout(entries: Vec<IconEntry>, origin: Point, spacing: u16) -> Self {
        let icons: Vec<_> = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let top = origin.y.saturating_add(spacing.saturating_mul(i as u16));
                let slot = slot_at(origin.x, top, &entry.label);
                (entry, slot)
            })
            .collect();

        for (i, (first, first_slot)) in icons.iter().enumerate() {
            for (later, later_slot) in &icons[i + 1..] {
                if first_slot.intersects(*later_slot) {
                    tracing::warn!(
                        first = %first.label,
                        later = %later.label,
                        "Desktop icons overlap; clicks on the shared area go to the first"
                    );
                }
            }
        }

        Self { icons }
    }

    /// Launcher of the first icon under `point`.
    #[must_use]
    pub fn handle_click(&self, point: Point) -> Option<&Launcher> {
        self.icons
            .iter()
            .find(|(_, slot)| slot.contains(point))
            .map(|(entry, _)| &entry.launcher)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IconEntry, IconSlot)> {
        self.icons.iter().map(|(entry, slot)| (entry, *slot))
    }

    pub fn launchers(&self) -> impl Iterator<Item = &Launcher> {
        self.icons.iter().map(|(entry, _)| &entry.launcher)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

fn slot_at(x: u16, top: u16, label: &str) -> IconSlot {
    let glyph = Region::new(x, top, GLYPH_WIDTH, GLYPH_HEIGHT);
    let label_width = label.width().max(1) as u16;
    let centre = x + GLYPH_WIDTH / 2;
    let label_x = centre.saturating_sub(label_width / 2);
    IconSlot {
        glyph,
        label: Region::new(label_x, top + GLYPH_HEIGHT, label_width, 1),
    }
}
