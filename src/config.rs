//! Stage configuration.

use std::time::Duration;

/// How long an authentication attempt may sit idle before the watchdog
/// cancels it.
pub const DEFAULT_WAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between switching the backdrops to their wallpaper presentation and
/// revealing the authentication children, letting the backdrop transition
/// finish first.
//
// FIXME: this should follow the backdrop's transition-complete notification
// instead of a fixed delay; sometimes the wallpaper is already showing.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(260);

// =============================================================================
// Alignment
// =============================================================================

/// Placement of a widget along one axis of its monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

// =============================================================================
// Config
// =============================================================================

/// Session-wide settings threaded into the stage at construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Inactivity timeout for an in-progress authentication attempt.
    pub wake_timeout: Duration,
    /// Settle delay between the wallpaper switch and the reveal of the
    /// authentication children.
    pub settle_delay: Duration,
    /// Name of the configured screensaver plugin. When empty, the clock is
    /// the idle presentation and stays revealed permanently.
    pub screensaver_name: String,
    /// Configured clock alignment while dormant.
    pub clock_halign: Alignment,
    pub clock_valign: Alignment,
    /// Away message shown by the clock widget.
    pub away_message: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_timeout: DEFAULT_WAKE_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            screensaver_name: String::new(),
            clock_halign: Alignment::Center,
            clock_valign: Alignment::Center,
            away_message: None,
        }
    }
}
