//! GUI sizing.

use crate::types::Size;

/// Initial editor size used when a plugin does not specify one.
pub const DEFAULT_EDITOR_SIZE: Size = Size::new(1080, 720);

/// Size constraints for the plugin GUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiConstraints {
    /// Minimum size.
    pub min: Size,
    /// Maximum size.
    pub max: Size,
    /// Whether the GUI is resizable.
    pub resizable: bool,
}

impl GuiConstraints {
    /// Constraints allowing sizes between `min` and `max`.
    pub const fn new(min: Size, max: Size) -> Self {
        Self { min, max, resizable: true }
    }

    /// Constraints pinning the GUI to one size.
    pub const fn fixed(size: Size) -> Self {
        Self { min: size, max: size, resizable: false }
    }

    /// Apply the constraints to a requested size.
    pub fn constrain(&self, size: Size) -> Size {
        size.clamp(self.min, self.max)
    }
}

impl Default for GuiConstraints {
    fn default() -> Self {
        Self::new(Size::new(400, 300), Size::new(3840, 2160))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constraints_pin_size() {
        let constraints = GuiConstraints::fixed(Size::new(600, 400));
        assert!(!constraints.resizable);
        assert_eq!(constraints.constrain(Size::new(1200, 100)), Size::new(600, 400));
    }

    #[test]
    fn test_default_constraints_accept_default_size() {
        let constraints = GuiConstraints::default();
        assert_eq!(constraints.constrain(DEFAULT_EDITOR_SIZE), DEFAULT_EDITOR_SIZE);
    }
}
