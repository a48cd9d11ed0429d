//! The threshold state machine.
//!
//! The observation stream is level-triggered: it keeps reporting
//! "level is 20" for as long as the battery sits there, and every
//! charging-status flip re-delivers the current pair. The user should
//! hear about each crossing once per cycle, so every rule carries a
//! guard flag that converts the signal into an edge-triggered one.
//!
//! ```text
//!                rule fires (request emitted)
//!   armed ────────────────────────────────────► notified
//!     ▲                                            │
//!     │         cycle boundary (reset step)        │
//!     └────────────────────────────────────────────┘
//! ```
//!
//! - **armed:** The rule may fire on its next qualifying observation.
//! - **notified:** The alert went out this cycle. Suppressed until the
//!   device leaves the state that made the rule relevant: plugging in
//!   (or recovering above the threshold) re-arms the low rule,
//!   unplugging re-arms the full and recommended rules.
//!
//! The reset step runs before rule evaluation on every call, so a
//! single "just unplugged at 100%" observation clears the full and
//! recommended flags without re-firing either in the same step.

use super::display::DisplayedLevel;
use crate::notify::NotificationRequest;

/// Alert when the level falls to this percent while discharging.
pub const LOW_LEVEL: u8 = 20;

/// Alert when the level reaches this percent while on the charger.
pub const FULL_LEVEL: u8 = 100;

/// Alert when the level reaches this percent while on the charger, to
/// encourage unplugging before a full charge wears the battery.
pub const RECOMMENDED_LEVEL: u8 = 80;

/// Per-session guard flags, one per threshold rule.
///
/// Created with all flags clear at the start of a monitoring session
/// and dropped with it; nothing persists across sessions. Only
/// [`evaluate`](Self::evaluate) mutates the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThresholdState {
    low_notified: bool,
    full_notified: bool,
    recommended_notified: bool,
}

impl ThresholdState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One evaluation step.
    ///
    /// Runs the reset step, then the three rules in fixed order (low,
    /// full, recommended), returning the requests to dispatch in that
    /// order. A rule that fires sets its guard flag immediately; the
    /// caller dispatches fire-and-forget, so delivery failure does not
    /// re-arm the rule.
    ///
    /// With no displayed level yet there is nothing to compare against,
    /// so the step is a no-op.
    pub fn evaluate(
        &mut self,
        level: Option<DisplayedLevel>,
        charging: bool,
    ) -> Vec<NotificationRequest> {
        let Some(level) = level else {
            return Vec::new();
        };

        self.reset(level, charging);

        let pct = level.percent();
        let mut requests = Vec::new();

        if pct <= LOW_LEVEL && !charging && !self.low_notified {
            requests.push(NotificationRequest::immediate(
                "Bateria baixa!",
                "Conecte o celular ao carregador.",
            ));
            self.low_notified = true;
        }

        if pct == FULL_LEVEL && charging && !self.full_notified {
            requests.push(NotificationRequest::immediate(
                "Bateria cheia!",
                "Retire o celular do carregador.",
            ));
            self.full_notified = true;
        }

        if pct >= RECOMMENDED_LEVEL && charging && !self.recommended_notified {
            requests.push(NotificationRequest::immediate(
                "Nível recomendado atingido!",
                "Retire o celular do carregador para preservar a vida útil da bateria.",
            ));
            self.recommended_notified = true;
        }

        requests
    }

    /// Clear flags whose cycle has ended, so the next crossing can
    /// fire again.
    ///
    /// Plugging in answers the low alert; so does the level recovering
    /// above the threshold on its own. Unplugging starts a fresh
    /// charge cycle for the full and recommended alerts.
    fn reset(&mut self, level: DisplayedLevel, charging: bool) {
        if charging || level.percent() > LOW_LEVEL {
            self.low_notified = false;
        }

        if !charging {
            self.full_notified = false;
            self.recommended_notified = false;
        }
    }
}
