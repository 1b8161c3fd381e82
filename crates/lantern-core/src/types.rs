//! Common types used throughout Lantern.

/// Zero-based parameter index. Stable for the lifetime of the plugin.
pub type ParameterIndex = u32;

/// Parameter value in natural units (e.g. 0.0 to 100.0).
pub type ParameterValue = f64;

/// Maximum number of audio channels per port.
pub const MAX_CHANNELS: usize = 8;

/// Maximum number of audio ports per direction.
pub const MAX_PORTS: usize = 4;

/// Size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp each dimension between `min` and `max`.
    pub fn clamp(self, min: Size, max: Size) -> Self {
        Self {
            width: self.width.clamp(min.width, max.width.max(min.width)),
            height: self.height.clamp(min.height, max.height.max(min.height)),
        }
    }
}

/// Rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Get the width of the rectangle.
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    /// Get the height of the rectangle.
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}
