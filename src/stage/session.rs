//! Session state machine.
//!
//! Drives the transitions between [`SessionState::Dormant`] and
//! [`SessionState::Authenticating`], the inactivity watchdog that cancels an
//! abandoned authentication attempt, and the handling of authentication
//! outcomes. All operations absorb out-of-state calls silently; this is a
//! UI guard layer, not a data-integrity system.

use tracing::{debug, info, trace};

use crate::config::Alignment;
use crate::subscriptions::Signal;

use super::types::{Role, SessionState};
use super::Stage;

/// Inactivity watchdog; at most one is ever scheduled.
pub(super) const WAKE_TIMEOUT_TIMER: &str = "wake-timeout";

/// One-shot settle delay between the wallpaper switch and the reveal of the
/// authentication children.
pub(super) const SETTLE_TIMER: &str = "unlock-settle";

// =============================================================================
// Wake and cancel transitions
// =============================================================================

impl Stage {
    /// Wakes the session for authentication.
    ///
    /// No-op when already authenticating. The backdrops switch to their
    /// wallpaper presentation first; the authentication children are
    /// revealed after the settle delay so that transition can finish. A
    /// second call during the settle window replaces the pending timer
    /// rather than doubling the transition.
    pub fn raise_unlock_widget(&mut self) {
        self.reset_timeout();

        if self.session_state.is_awake() {
            trace!("raise_unlock_widget: already awake");
            return;
        }

        let Some(children) = self.children.as_mut() else {
            return;
        };

        info!("waking session for authentication");

        children.clock.stop_positioning();

        for backdrop in &mut children.backdrops {
            backdrop.show_wallpaper_presentation();
        }

        let delay = self.config.settle_delay;
        self.subscriptions.start(SETTLE_TIMER, delay, |state| {
            state.stage.after_wallpaper_shown_for_unlock();
            false
        });
    }

    fn after_wallpaper_shown_for_unlock(&mut self) {
        let Some(children) = self.children.as_mut() else {
            return;
        };

        self.overlay.reorder(Role::Clock, true);
        self.overlay.reorder(Role::Unlock, true);

        children.clock.set_alignment(Alignment::Start, Alignment::Center);
        children.clock.show();
        self.overlay.set_visible(Role::Clock, true);
        children.clock.reveal();
        self.overlay.set_revealed(Role::Clock, true);

        children.unlock.show();
        self.overlay.set_visible(Role::Unlock, true);
        children.unlock.reveal();
        self.overlay.set_revealed(Role::Unlock, true);

        children.audio_status.show();
        self.overlay.set_visible(Role::AudioStatus, true);
        children.info_status.show();
        self.overlay.set_visible(Role::InfoStatus, true);
        children.audio_status.reveal();
        self.overlay.set_revealed(Role::AudioStatus, true);
        children.info_status.reveal();
        self.overlay.set_revealed(Role::InfoStatus, true);

        self.session_state = SessionState::Authenticating;
        info!("session awake");

        self.reset_timeout();
        self.relayout();
    }

    /// Puts an awake session back to sleep.
    ///
    /// No-op while dormant, and while a previous cancel is still waiting for
    /// the dialog's unreveal to complete. Final cleanup happens when the
    /// dialog's reveal-completion signal fires.
    pub fn cancel_unlock_widget(&mut self) {
        if !self.session_state.is_awake() {
            trace!("cancel_unlock_widget: already dormant");
            return;
        }
        if self.subscriptions.has_binding(Signal::UnlockRevealChanged) {
            trace!("cancel_unlock_widget: unreveal already in flight");
            return;
        }

        info!("cancelling authentication, returning to dormant");

        self.set_timeout_active(false);

        let Some(children) = self.children.as_mut() else {
            return;
        };

        if !self.config.screensaver_name.is_empty() {
            children.clock.unreveal();
            self.overlay.set_revealed(Role::Clock, false);
            children.clock.hide();
            self.overlay.set_visible(Role::Clock, false);
        }

        self.subscriptions
            .connect_once(Signal::UnlockRevealChanged, Box::new(|state| {
                state.stage.after_unlock_unrevealed();
            }));

        children.unlock.unreveal();
        children.audio_status.unreveal();
        self.overlay.set_revealed(Role::AudioStatus, false);
        children.info_status.unreveal();
        self.overlay.set_revealed(Role::InfoStatus, false);
    }

    fn after_unlock_unrevealed(&mut self) {
        let Some(children) = self.children.as_mut() else {
            return;
        };

        children.unlock.hide();
        self.overlay.set_visible(Role::Unlock, false);
        self.overlay.set_revealed(Role::Unlock, false);
        children.unlock.cancel();

        children.audio_status.hide();
        self.overlay.set_visible(Role::AudioStatus, false);
        children.info_status.hide();
        self.overlay.set_visible(Role::InfoStatus, false);

        for backdrop in &mut children.backdrops {
            backdrop.show_idle_presentation();
        }

        self.session_state = SessionState::Dormant;
        info!("session dormant");

        children
            .clock
            .set_alignment(self.config.clock_halign, self.config.clock_valign);
        children.clock.start_positioning();
        self.relayout();
    }

    // =========================================================================
    // Authentication outcomes
    // =========================================================================

    /// Handles the dialog's verdict on one authentication attempt.
    pub fn on_authentication_result(&mut self, success: bool) {
        let Some(children) = self.children.as_mut() else {
            return;
        };

        if success {
            info!("authentication succeeded, unlocking session");

            children.clock.hide();
            self.overlay.set_visible(Role::Clock, false);
            children.unlock.hide();
            self.overlay.set_visible(Role::Unlock, false);

            self.manager.unlock();
        } else {
            debug!("authentication failed");
            children.unlock.blink();
        }
    }

    // =========================================================================
    // Inactivity watchdog
    // =========================================================================

    /// Restarts the watchdog from the configured duration. Any user input
    /// while awake funnels through here; the watchdog guards inactivity,
    /// not a hard deadline from wake.
    pub fn reset_timeout(&mut self) {
        self.set_timeout_active(true);
    }

    /// Arms or disarms the watchdog. Arming is a no-op while dormant or
    /// while a collaborator holds the inhibit guard; arming an armed
    /// watchdog replaces its deadline.
    pub fn set_timeout_active(&mut self, active: bool) {
        if active {
            if !self.session_state.is_awake() || self.timeout_inhibited {
                trace!("not arming wake timeout (dormant or inhibited)");
                return;
            }

            let timeout = self.config.wake_timeout;
            self.subscriptions.start(WAKE_TIMEOUT_TIMER, timeout, |state| {
                state.stage.on_wake_timeout();
                false
            });
        } else {
            self.subscriptions.cancel(WAKE_TIMEOUT_TIMER);
        }
    }

    fn on_wake_timeout(&mut self) {
        debug!("wake timeout expired, requesting re-lock");
        self.manager.cancel_unlock_widget();
    }

    pub(super) fn on_inhibit_timeout(&mut self) {
        self.timeout_inhibited = true;
        self.set_timeout_active(false);
    }

    pub(super) fn on_uninhibit_timeout(&mut self) {
        self.timeout_inhibited = false;
        self.set_timeout_active(true);
    }
}
