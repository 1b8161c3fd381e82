//! Parameter metadata types.
//!
//! This module provides types for describing parameter metadata:
//! - [`ParameterInfo`] - Complete parameter description (name, range, direction, flags)
//! - [`ParameterDirection`] - Whether the host/UI or the processing side owns the value
//! - [`ParameterFlags`] - Behavioral flags (automation, visibility)

use crate::types::{ParameterIndex, ParameterValue};

/// Direction of a parameter's data flow.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDirection {
    /// Written by the host or UI, consumed by processing.
    #[default]
    Input,
    /// Written by processing, displayed by the host and UI.
    Output,
}

/// Flags controlling parameter behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterFlags {
    /// Parameter can be automated by the host.
    pub can_automate: bool,
    /// Parameter is hidden from the DAW's parameter list.
    pub is_hidden: bool,
}

impl Default for ParameterFlags {
    fn default() -> Self {
        Self {
            can_automate: true,
            is_hidden: false,
        }
    }
}

/// Metadata describing a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Zero-based index, also used as the host-facing parameter ID.
    pub index: ParameterIndex,
    /// Full parameter name (e.g., "Param1").
    pub name: &'static str,
    /// Short parameter name for constrained UIs.
    pub short_name: &'static str,
    /// Unit label (e.g., "dB", "%").
    pub units: &'static str,
    /// Lower bound of the declared range.
    pub min: ParameterValue,
    /// Upper bound of the declared range.
    pub max: ParameterValue,
    /// Value the parameter holds after initialization.
    pub default: ParameterValue,
    /// Data flow direction.
    pub direction: ParameterDirection,
    /// Behavioral flags.
    pub flags: ParameterFlags,
}

impl ParameterInfo {
    /// Create a new input parameter with range 0..1 and default 0.
    pub const fn new(index: ParameterIndex, name: &'static str) -> Self {
        Self {
            index,
            name,
            short_name: name,
            units: "",
            min: 0.0,
            max: 1.0,
            default: 0.0,
            direction: ParameterDirection::Input,
            flags: ParameterFlags {
                can_automate: true,
                is_hidden: false,
            },
        }
    }

    /// Set the declared range.
    pub const fn with_range(mut self, min: ParameterValue, max: ParameterValue) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the default value.
    pub const fn with_default(mut self, default: ParameterValue) -> Self {
        self.default = default;
        self
    }

    /// Set the short name.
    pub const fn with_short_name(mut self, short_name: &'static str) -> Self {
        self.short_name = short_name;
        self
    }

    /// Set the unit label.
    pub const fn with_units(mut self, units: &'static str) -> Self {
        self.units = units;
        self
    }

    /// Mark the parameter as written by the processing side.
    pub const fn output(mut self) -> Self {
        self.direction = ParameterDirection::Output;
        self
    }

    /// Set whether the host may automate the parameter.
    pub const fn automatable(mut self, can_automate: bool) -> Self {
        self.flags.can_automate = can_automate;
        self
    }

    /// Hide the parameter from host parameter lists.
    pub const fn hidden(mut self) -> Self {
        self.flags.is_hidden = true;
        self
    }

    /// Whether the processing side owns this parameter's value.
    pub const fn is_output(&self) -> bool {
        matches!(self.direction, ParameterDirection::Output)
    }

    /// Clamp a plain value into the declared range.
    pub fn clamp(&self, value: ParameterValue) -> ParameterValue {
        value.clamp(self.min, self.max)
    }

    /// Map a plain value to 0.0..=1.0.
    pub fn normalize(&self, plain: ParameterValue) -> ParameterValue {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((plain - self.min) / span).clamp(0.0, 1.0)
    }

    /// Map a 0.0..=1.0 value back to the declared range.
    pub fn denormalize(&self, normalized: ParameterValue) -> ParameterValue {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }

    /// Format a plain value for display.
    pub fn format(&self, plain: ParameterValue) -> String {
        if self.units.is_empty() {
            format!("{plain:.2}")
        } else {
            format!("{plain:.2} {}", self.units)
        }
    }

    /// Parse a display string back to a plain value.
    ///
    /// Accepts an optional trailing unit label. The result is clamped to the
    /// declared range.
    pub fn parse(&self, text: &str) -> Option<ParameterValue> {
        let trimmed = text.trim();
        let number = if self.units.is_empty() {
            trimmed
        } else {
            trimmed.strip_suffix(self.units).unwrap_or(trimmed).trim_end()
        };
        let value: ParameterValue = number.parse().ok()?;
        value.is_finite().then(|| self.clamp(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter() -> ParameterInfo {
        ParameterInfo::new(0, "Param1").with_range(0.0, 100.0).output()
    }

    #[test]
    fn test_builder_defaults() {
        let info = ParameterInfo::new(3, "Gain");
        assert_eq!(info.index, 3);
        assert_eq!(info.short_name, "Gain");
        assert_eq!(info.direction, ParameterDirection::Input);
        assert!(info.flags.can_automate);
        assert!(!info.flags.is_hidden);
    }

    #[test]
    fn test_normalize_roundtrip_range() {
        let info = meter();
        assert!((info.normalize(42.0) - 0.42).abs() < 1e-12);
        assert!((info.denormalize(0.42) - 42.0).abs() < 1e-12);
        assert_eq!(info.normalize(-5.0), 0.0);
        assert_eq!(info.normalize(150.0), 1.0);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        let info = ParameterInfo::new(0, "Fixed").with_range(5.0, 5.0);
        assert_eq!(info.normalize(5.0), 0.0);
        assert_eq!(info.denormalize(0.7), 5.0);
    }

    #[test]
    fn test_format_and_parse() {
        let info = meter().with_units("%");
        assert_eq!(info.format(17.0), "17.00 %");
        assert_eq!(info.parse("17.00 %"), Some(17.0));
        assert_eq!(info.parse(" 250 "), Some(100.0));
        assert_eq!(info.parse("loud"), None);
        assert_eq!(info.parse("NaN"), None);
    }
}
