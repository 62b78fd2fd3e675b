//! Root surface geometry in `WxH` / `WxH+X+Y` form.
//!
//! Sizes are terminal cells. Offsets are signed and keep the sign they were
//! written with (`100x32-4+2`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Smallest surface the shell lays itself out for.
pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("geometry must look like WxH or WxH+X+Y, got {0:?}")]
    Malformed(String),
    #[error("geometry size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u16, height: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: u16,
    height: u16,
    offset: Option<(i32, i32)>,
}

impl Geometry {
    /// `100x32`, the size used when nothing usable is stored.
    pub const DEFAULT: Geometry = Geometry {
        width: 100,
        height: 32,
        offset: None,
    };

    pub fn new(width: u16, height: u16) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::ZeroSize { width, height });
        }
        Ok(Self {
            width,
            height,
            offset: None,
        })
    }

    pub fn with_offset(width: u16, height: u16, x: i32, y: i32) -> Result<Self, GeometryError> {
        let mut geometry = Self::new(width, height)?;
        geometry.offset = Some((x, y));
        Ok(geometry)
    }

    #[must_use]
    pub fn width(self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn offset(self) -> Option<(i32, i32)> {
        self.offset
    }

    /// Same geometry with the size raised to the shell minimum.
    #[must_use]
    pub fn at_least_minimum(self) -> Self {
        Self {
            width: self.width.max(MIN_WIDTH),
            height: self.height.max(MIN_HEIGHT),
            offset: self.offset,
        }
    }
}

fn parse_signed(raw: &str, input: &str) -> Result<i32, GeometryError> {
    // Accept "+5", "-5"; a bare number is not a valid offset component.
    let malformed = || GeometryError::Malformed(input.to_string());
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'+') => (1_i64, &raw[1..]),
        Some(b'-') => (-1_i64, &raw[1..]),
        _ => return Err(malformed()),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    // Parsed wider so `-2147483648` survives the sign flip.
    let magnitude = digits.parse::<i64>().map_err(|_| malformed())?;
    i32::try_from(magnitude * sign).map_err(|_| malformed())
}

fn parse_dimension(raw: &str, input: &str) -> Result<u16, GeometryError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GeometryError::Malformed(input.to_string()));
    }
    raw.parse::<u16>()
        .map_err(|_| GeometryError::Malformed(input.to_string()))
}

impl FromStr for Geometry {
    type Err = GeometryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (width_raw, rest) = trimmed
            .split_once(['x', 'X'])
            .ok_or_else(|| GeometryError::Malformed(input.to_string()))?;

        let split_at = rest.find(['+', '-']);
        let (height_raw, offsets) = match split_at {
            Some(pos) => rest.split_at(pos),
            None => (rest, ""),
        };

        let width = parse_dimension(width_raw, input)?;
        let height = parse_dimension(height_raw, input)?;

        if offsets.is_empty() {
            return Self::new(width, height);
        }

        // Second offset starts at the next sign after the first one.
        let second = offsets[1..]
            .find(['+', '-'])
            .map(|pos| pos + 1)
            .ok_or_else(|| GeometryError::Malformed(input.to_string()))?;
        let (x_raw, y_raw) = offsets.split_at(second);
        let x = parse_signed(x_raw, input)?;
        let y = parse_signed(y_raw, input)?;
        Self::with_offset(width, height, x, y)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some((x, y)) = self.offset {
            write!(f, "{x:+}{y:+}")?;
        }
        Ok(())
    }
}
