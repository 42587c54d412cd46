//! Pure data types for the stage.
//!
//! These types have no behavior beyond basic accessors and are used
//! throughout the shell.

use smithay::utils::{Logical, Rectangle};

// =============================================================================
// SessionState
// =============================================================================

/// The two settled states of the lock session.
///
/// Owned exclusively by the stage's session logic; everything else reads it
/// through [`Stage::session_state`](super::Stage::session_state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Locked and idle; no authentication UI visible.
    #[default]
    Dormant,
    /// Awake; authentication UI and status bars visible, guarded by the
    /// inactivity watchdog.
    Authenticating,
}

impl SessionState {
    pub fn is_awake(&self) -> bool {
        matches!(self, Self::Authenticating)
    }
}

// =============================================================================
// Role
// =============================================================================

/// Identity of an overlay child, keying its layout rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Background view pinned to one monitor.
    Background(usize),
    Clock,
    Unlock,
    AudioStatus,
    InfoStatus,
}

impl Role {
    pub fn is_background(&self) -> bool {
        matches!(self, Self::Background(_))
    }
}

// =============================================================================
// OverlayChild
// =============================================================================

/// Compositor bookkeeping for one child surface.
#[derive(Debug, Clone, Copy)]
pub struct OverlayChild {
    pub role: Role,
    /// Gates rendering.
    pub visible: bool,
    /// Last commanded reveal state; cleared when the collaborator reports
    /// unreveal completion.
    pub revealed: bool,
    /// Last placement computed by the layout policy. Doubles as the sticky
    /// rect for the status bars while dormant.
    pub placement: Option<Rectangle<i32, Logical>>,
}

impl OverlayChild {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            visible: false,
            revealed: false,
            placement: None,
        }
    }
}
