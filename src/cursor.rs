//! On-screen cursor driven by the smoothed index fingertip.
//!
//! Landmarks arrive in source video pixels; the cursor lives in viewport
//! pixels. The mapping scales between the two and keeps the rendered cursor
//! fully inside the viewport.

use crate::constants::{
    DEFAULT_CURSOR_SIZE, DEFAULT_SOURCE_HEIGHT, DEFAULT_SOURCE_WIDTH, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH,
};
use crate::{Error, Result};

/// Smoothed cursor position in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

impl CursorPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "{what} size must be positive, got {}x{}",
                self.width, self.height
            )))
        }
    }
}

/// Maps source video coordinates onto the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMapper {
    source: Extent,
    viewport: Extent,
    cursor_size: f64,
}

impl Default for CursorMapper {
    fn default() -> Self {
        Self {
            source: Extent::new(DEFAULT_SOURCE_WIDTH, DEFAULT_SOURCE_HEIGHT),
            viewport: Extent::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            cursor_size: DEFAULT_CURSOR_SIZE,
        }
    }
}

impl CursorMapper {
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty extents or a negative cursor size.
    pub fn new(source: Extent, viewport: Extent, cursor_size: f64) -> Result<Self> {
        source.validate("Source")?;
        viewport.validate("Viewport")?;
        if !(cursor_size >= 0.0 && cursor_size < viewport.width.min(viewport.height)) {
            return Err(Error::InvalidInput(format!(
                "Cursor size {cursor_size} does not fit the viewport"
            )));
        }
        Ok(Self {
            source,
            viewport,
            cursor_size,
        })
    }

    /// Starting position before any hand was seen
    #[must_use]
    pub fn centre(&self) -> CursorPosition {
        CursorPosition::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Scale a smoothed source position into the viewport and clamp it
    #[must_use]
    pub fn map(&self, x: f64, y: f64) -> CursorPosition {
        let max_x = self.viewport.width - self.cursor_size;
        let max_y = self.viewport.height - self.cursor_size;
        let vx = x / self.source.width * self.viewport.width;
        let vy = y / self.source.height * self.viewport.height;
        CursorPosition::new(vx.clamp(0.0, max_x), vy.clamp(0.0, max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CursorMapper {
        CursorMapper::new(Extent::new(640.0, 480.0), Extent::new(1280.0, 960.0), 20.0).unwrap()
    }

    #[test]
    fn test_map_scales() {
        let pos = mapper().map(320.0, 240.0);
        assert_eq!(pos, CursorPosition::new(640.0, 480.0));
    }

    #[test]
    fn test_map_clamps_to_viewport() {
        let m = mapper();
        assert_eq!(m.map(-50.0, -1.0), CursorPosition::new(0.0, 0.0));
        assert_eq!(m.map(640.0, 480.0), CursorPosition::new(1260.0, 940.0));
    }

    #[test]
    fn test_centre() {
        assert_eq!(mapper().centre(), CursorPosition::new(640.0, 480.0));
    }

    #[test]
    fn test_invalid_extents() {
        assert!(CursorMapper::new(Extent::new(0.0, 480.0), Extent::new(100.0, 100.0), 0.0).is_err());
        assert!(CursorMapper::new(Extent::new(640.0, 480.0), Extent::new(10.0, 10.0), 20.0).is_err());
    }
}
