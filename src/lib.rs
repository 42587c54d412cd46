//! Presentation shell of a screen-lock session.
//!
//! The stage is a full-screen surface spanning every monitor. It composites
//! per-monitor background views, a clock, two status bars and an
//! authentication dialog, and moves between a dormant (locked, idle) and an
//! authenticating (awake) state in response to user input and timeouts.
//!
//! The core owns the session state machine, the overlay z-stack and its
//! per-role layout policy, the input event router, and the subscription
//! registry that tears every listener and timer down exactly once. Widget
//! rendering, credential verification and fade animation live behind the
//! collaborator traits in [`widgets`]; everything runs single-threaded on a
//! calloop event loop.

pub mod config;
pub mod input;
pub mod stage;
pub mod subscriptions;
pub mod widgets;

pub use config::{Alignment, Config};
pub use stage::{Stage, State};
pub use subscriptions::{BindingId, Signal};
