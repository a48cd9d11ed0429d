//! Derived display state.

use std::fmt;

/// Battery level quantized to a whole percent.
///
/// This is the value compared against thresholds and handed to the
/// presentation layer; it exists only once a valid observation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayedLevel(u8);

impl DisplayedLevel {
    /// Quantize a fractional level in [0, 1] by rounding. Out-of-range
    /// input clamps; NaN yields `None`.
    pub fn from_fraction(level: f32) -> Option<Self> {
        if level.is_nan() {
            return None;
        }
        Some(Self((level.clamp(0.0, 1.0) * 100.0).round() as u8))
    }

    /// Build directly from a whole percent, clamped to 100.
    pub fn from_percent(pct: u8) -> Self {
        Self(pct.min(100))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DisplayedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Snapshot published for on-screen rendering.
///
/// The presentation layer reads this and nothing else; threshold
/// bookkeeping stays private to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryDisplay {
    pub level: Option<DisplayedLevel>,
    pub charging: Option<bool>,
}
