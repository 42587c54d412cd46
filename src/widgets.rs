//! Collaborator contracts.
//!
//! The stage composites and positions its children but never renders them.
//! Everything behind these traits is host-owned: widget drawing, the
//! credential check, reveal animations and the fade engine. Collaborators
//! report asynchronous outcomes (authentication results, reveal completion,
//! timeout inhibition) by having the host emit the matching
//! [`Signal`](crate::subscriptions::Signal) into the state.

use std::time::Duration;

use smithay::utils::{Logical, Rectangle, Size};

use crate::config::Alignment;
use crate::input::KeyEvent;
use crate::stage::MonitorDescriptor;

// =============================================================================
// BackgroundImage
// =============================================================================

/// Opaque handle to a wallpaper image sized for one monitor.
///
/// Pixel data stays with the display provider; the stage only routes the
/// handle from the provider to the backdrop it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundImage {
    pub size: Size<i32, Logical>,
}

// =============================================================================
// Widget contracts
// =============================================================================

/// Per-monitor background view.
///
/// Owns the transition between the idle presentation (screensaver plugin or
/// clock) and the plain wallpaper shown behind the unlock dialog.
pub trait MonitorBackdrop {
    fn rect(&self) -> Rectangle<i32, Logical>;
    fn set_initial_image(&mut self, image: BackgroundImage);
    fn set_next_image(&mut self, image: BackgroundImage);
    fn show_idle_presentation(&mut self);
    fn show_wallpaper_presentation(&mut self);
    fn reveal(&mut self);
    fn unreveal(&mut self);
}

/// The clock/message widget.
pub trait ClockWidget {
    fn preferred_size(&self) -> Size<i32, Logical>;
    /// Monitor the clock positions itself on while dormant.
    fn current_monitor(&self) -> usize;
    fn set_alignment(&mut self, halign: Alignment, valign: Alignment);
    fn set_message(&mut self, message: &str);
    /// Starts the widget's own dormant repositioning cycle.
    fn start_positioning(&mut self);
    fn stop_positioning(&mut self);
    fn show(&mut self);
    fn hide(&mut self);
    fn reveal(&mut self);
    fn unreveal(&mut self);
}

/// The authentication dialog.
///
/// Raises `InhibitTimeout`/`UninhibitTimeout` around credential verification
/// and `AuthSuccess`/`AuthFailure` for attempt outcomes. Unreveal completion
/// is reported through `UnlockRevealChanged`.
pub trait UnlockDialog {
    fn preferred_size(&self) -> Size<i32, Logical>;
    /// Aborts any in-progress authentication attempt.
    fn cancel(&mut self);
    /// Visible rejected-attempt cue.
    fn blink(&mut self);
    /// Raw key events are queued verbatim; the dialog owns credential-entry
    /// semantics.
    fn queue_key_event(&mut self, event: KeyEvent);
    fn show(&mut self);
    fn hide(&mut self);
    fn reveal(&mut self);
    fn unreveal(&mut self);
}

/// Audio or info status bar.
pub trait StatusBar {
    fn preferred_size(&self) -> Size<i32, Logical>;
    fn show(&mut self);
    fn hide(&mut self);
    fn reveal(&mut self);
    fn unreveal(&mut self);
}

// =============================================================================
// Host contracts
// =============================================================================

/// The display-surface provider.
///
/// Supplies monitor geometry at stage construction, the filtered input
/// stream (delivered by the host through
/// [`State::process_input_event`](crate::stage::State::process_input_event)),
/// and wallpaper images. Background configuration changes are reported via
/// the `BackgroundChanged` signal.
pub trait DisplaySurface {
    fn monitor_count(&self) -> usize;
    fn monitor_geometry(&self, index: usize) -> Rectangle<i32, Logical>;
    /// Asks the host surface to span every monitor.
    fn fullscreen_across_monitors(&mut self);
    fn start_event_capture(&mut self);
    fn stop_event_capture(&mut self);
    fn create_background_image(&self, size: Size<i32, Logical>) -> BackgroundImage;
}

/// The owning session manager.
pub trait SessionManager {
    /// Ends the lock session after successful authentication.
    fn unlock(&mut self);
    /// External re-lock request; the manager routes it back into
    /// [`Stage::cancel_unlock_widget`](crate::stage::Stage::cancel_unlock_widget).
    fn cancel_unlock_widget(&mut self);
}

/// Stage-level fade engine.
pub trait Fader {
    fn fade_in(&mut self, duration: Duration);
    fn fade_out(&mut self, duration: Duration);
    fn cancel(&mut self);
}

/// Builds the stage's children at construction, in z-order.
pub trait WidgetFactory {
    fn create_backdrop(&mut self, monitor: &MonitorDescriptor) -> Box<dyn MonitorBackdrop>;
    fn create_clock(&mut self) -> Box<dyn ClockWidget>;
    fn create_unlock_dialog(&mut self) -> Box<dyn UnlockDialog>;
    fn create_audio_status(&mut self) -> Box<dyn StatusBar>;
    fn create_info_status(&mut self) -> Box<dyn StatusBar>;
}
