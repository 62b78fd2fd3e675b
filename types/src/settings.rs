//! Resolved shell configuration shared across crates.
//!
//! The raw, loosely-typed document stays private in `mks-config`; the loader resolves it
//! into these types at the parse boundary, falling back field by field to the defaults
//! below. A `ShellConfig` is always complete.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Geometry;

pub const DEFAULT_GEOMETRY: &str = "100x32";
pub const DEFAULT_TITLE: &str = "mks-os 1.1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme {0:?} (expected \"Dark\" or \"Light\")")]
pub struct ThemeParseError(pub String);

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Dark, Theme::Light];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// The other theme; the settings panel cycles through two options.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dark" => Ok(Self::Dark),
            "Light" => Ok(Self::Light),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub geometry: Geometry,
    pub theme: Theme,
    pub title: String,
}

impl ShellConfig {
    #[must_use]
    pub fn default_geometry() -> Geometry {
        Geometry::DEFAULT
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            geometry: Self::default_geometry(),
            theme: Theme::default(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_named_constants() {
        let config = ShellConfig::default();
        assert_eq!(config.geometry.to_string(), DEFAULT_GEOMETRY);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn theme_names_are_case_sensitive() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("Light".parse::<Theme>(), Ok(Theme::Light));
        assert!("dark".parse::<Theme>().is_err());
        assert!("Blue".parse::<Theme>().is_err());
    }

    #[test]
    fn theme_toggle_is_an_involution() {
        for theme in Theme::ALL {
            assert_eq!(theme.toggled().toggled(), theme);
            assert_ne!(theme.toggled(), theme);
        }
    }
}
