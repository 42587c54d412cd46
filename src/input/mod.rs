//! Input event routing.
//!
//! Raw pointer and keyboard events from the display surface are dispatched
//! either to wake detection (while dormant) or to the authentication dialog
//! (while awake). Every path funnels through the same rule: any input while
//! awake resets the inactivity watchdog.

use smithay::backend::input::{ButtonState, KeyState};
use smithay::utils::{Logical, Point};
use tracing::trace;

use crate::stage::State;

// =============================================================================
// Event types
// =============================================================================

/// One raw key event, forwarded verbatim to the dialog's key queue; the
/// router never interprets key content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub code: u32,
    pub state: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub button: u32,
    pub state: ButtonState,
}

/// A filtered low-level event from the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMotion { position: Point<f64, Logical> },
    Key(KeyEvent),
    Button(ButtonEvent),
}

// =============================================================================
// Dispatch
// =============================================================================

impl State {
    pub fn process_input_event(&mut self, event: InputEvent) {
        if self.stage.destroying() {
            trace!("dropping input event during teardown");
            return;
        }

        match event {
            InputEvent::PointerMotion { position } => self.on_pointer_motion(position),
            InputEvent::Key(key) => self.on_key(key),
            InputEvent::Button(button) => self.on_button(button),
        }
    }

    fn on_pointer_motion(&mut self, position: Point<f64, Logical>) {
        if self.stage.is_awake() {
            self.stage.reset_timeout();
        }

        if let Some(monitor) = self.stage.monitors().monitor_at(position) {
            self.stage.maybe_update_layout(monitor);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.stage.is_awake() {
            self.stage.reset_timeout();
            self.stage.queue_dialog_key_event(key);
            return;
        }

        // Typing wakes the session; the keystroke is queued so the first
        // character of the password is not lost.
        if key.state == KeyState::Pressed {
            self.stage.raise_unlock_widget();
            self.stage.queue_dialog_key_event(key);
        }
    }

    fn on_button(&mut self, button: ButtonEvent) {
        if button.state != ButtonState::Pressed {
            return;
        }

        if self.stage.is_awake() {
            // Any interaction counts as "still present".
            self.stage.reset_timeout();
        } else {
            self.stage.raise_unlock_widget();
        }
    }
}
