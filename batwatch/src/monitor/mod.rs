mod controller;
mod display;
mod thresholds;

pub use controller::BatteryMonitor;
pub use display::{BatteryDisplay, DisplayedLevel};
pub use thresholds::{FULL_LEVEL, LOW_LEVEL, RECOMMENDED_LEVEL, ThresholdState};
