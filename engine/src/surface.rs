use mks_types::Geometry;

/// Desktop background colour, `#0b2545`.
pub const DESKTOP_BACKGROUND: (u8, u8, u8) = (0x0b, 0x25, 0x45);

/// What the shell applies to the root surface at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSettings {
    /// Already raised to the minimum size.
    pub geometry: Geometry,
    pub title: String,
    pub background: (u8, u8, u8),
}

/// The single top-level surface the desktop is drawn on.
pub trait RootSurface {
    fn apply(&mut self, settings: &SurfaceSettings);

    /// Geometry to persist at shutdown. `None` if it cannot be determined.
    fn current_geometry(&self) -> Option<Geometry>;

    /// Tear the surface down. Called once, as the last step of shutdown.
    fn destroy(&mut self);
}
