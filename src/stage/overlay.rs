//! Overlay compositor.
//!
//! Owns the z-ordered list of child surfaces and their visibility, reveal
//! and placement bookkeeping. Placement itself is delegated to the layout
//! policy; reorder operations flag a redraw request for the host to pick up.

use tracing::warn;

use smithay::utils::{Logical, Rectangle};

use super::types::{OverlayChild, Role};

#[derive(Debug, Default)]
pub struct OverlayCompositor {
    /// Children bottom to top; insertion order is the default z-order.
    children: Vec<OverlayChild>,
    redraw_queued: bool,
}

impl OverlayCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Child management
    // =========================================================================

    /// Appends a child on top of the current stack. One child per role.
    pub fn add(&mut self, role: Role) {
        if self.contains(role) {
            warn!("overlay already has a {role:?} child");
            return;
        }
        self.children.push(OverlayChild::new(role));
    }

    pub fn contains(&self, role: Role) -> bool {
        self.position(role).is_some()
    }

    /// Moves a child to the top or the bottom of the stack and requests a
    /// redraw. Unknown roles are ignored.
    pub fn reorder(&mut self, role: Role, to_top: bool) {
        let Some(pos) = self.position(role) else {
            return;
        };

        let child = self.children.remove(pos);
        if to_top {
            self.children.push(child);
        } else {
            self.children.insert(0, child);
        }
        self.redraw_queued = true;
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    // =========================================================================
    // Per-child state
    // =========================================================================

    pub fn set_visible(&mut self, role: Role, visible: bool) {
        if let Some(child) = self.child_mut(role) {
            child.visible = visible;
        }
    }

    pub fn set_revealed(&mut self, role: Role, revealed: bool) {
        if let Some(child) = self.child_mut(role) {
            child.revealed = revealed;
        }
    }

    pub fn set_placement(&mut self, role: Role, placement: Rectangle<i32, Logical>) {
        if let Some(child) = self.child_mut(role) {
            child.placement = Some(placement);
        }
    }

    pub fn placement(&self, role: Role) -> Option<Rectangle<i32, Logical>> {
        self.child(role).and_then(|child| child.placement)
    }

    pub fn child(&self, role: Role) -> Option<&OverlayChild> {
        self.children.iter().find(|child| child.role == role)
    }

    fn child_mut(&mut self, role: Role) -> Option<&mut OverlayChild> {
        self.children.iter_mut().find(|child| child.role == role)
    }

    fn position(&self, role: Role) -> Option<usize> {
        self.children.iter().position(|child| child.role == role)
    }

    /// Children bottom to top.
    pub fn children(&self) -> impl Iterator<Item = &OverlayChild> {
        self.children.iter()
    }

    /// Roles of currently visible children, bottom to top.
    pub fn visible_roles(&self) -> Vec<Role> {
        self.children
            .iter()
            .filter(|child| child.visible)
            .map(|child| child.role)
            .collect()
    }

    // =========================================================================
    // Redraw requests
    // =========================================================================

    /// Takes the pending redraw request, if any.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_queued)
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    #[cfg(test)]
    pub fn verify_invariants(&self) {
        // One child per role.
        for (i, child) in self.children.iter().enumerate() {
            assert!(
                !self.children[i + 1..].iter().any(|c| c.role == child.role),
                "duplicate {:?} child",
                child.role
            );
        }

        // Backgrounds stay below every other child.
        let highest_background = self
            .children
            .iter()
            .rposition(|child| child.role.is_background());
        let lowest_other = self
            .children
            .iter()
            .position(|child| !child.role.is_background());
        if let (Some(background), Some(other)) = (highest_background, lowest_other) {
            assert!(
                background < other,
                "background child stacked above a non-background child"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacked() -> OverlayCompositor {
        let mut overlay = OverlayCompositor::new();
        overlay.add(Role::Background(0));
        overlay.add(Role::Background(1));
        overlay.add(Role::Clock);
        overlay.add(Role::Unlock);
        overlay.add(Role::AudioStatus);
        overlay.add(Role::InfoStatus);
        overlay
    }

    fn roles(overlay: &OverlayCompositor) -> Vec<Role> {
        overlay.children().map(|child| child.role).collect()
    }

    #[test]
    fn insertion_order_is_default_z_order() {
        let overlay = stacked();
        overlay.verify_invariants();
        assert_eq!(
            roles(&overlay),
            vec![
                Role::Background(0),
                Role::Background(1),
                Role::Clock,
                Role::Unlock,
                Role::AudioStatus,
                Role::InfoStatus,
            ],
        );
    }

    #[test]
    fn duplicate_roles_are_rejected() {
        let mut overlay = stacked();
        overlay.add(Role::Clock);
        assert_eq!(roles(&overlay).len(), 6);
    }

    #[test]
    fn reorder_moves_to_top_and_requests_redraw() {
        let mut overlay = stacked();
        assert!(!overlay.take_redraw_request());

        overlay.reorder(Role::Clock, true);
        overlay.reorder(Role::Unlock, true);

        assert!(overlay.take_redraw_request());
        assert!(!overlay.take_redraw_request());
        assert_eq!(roles(&overlay)[4], Role::Clock);
        assert_eq!(roles(&overlay)[5], Role::Unlock);
        overlay.verify_invariants();
    }

    #[test]
    fn reorder_to_top_keeps_backgrounds_in_relative_order() {
        let mut overlay = stacked();
        overlay.reorder(Role::Unlock, true);
        overlay.reorder(Role::Clock, true);

        let backgrounds: Vec<Role> = roles(&overlay)
            .into_iter()
            .filter(Role::is_background)
            .collect();
        assert_eq!(backgrounds, vec![Role::Background(0), Role::Background(1)]);
        overlay.verify_invariants();
    }

    #[test]
    fn reorder_to_bottom_moves_below_everything() {
        let mut overlay = OverlayCompositor::new();
        overlay.add(Role::Clock);
        overlay.add(Role::AudioStatus);
        overlay.add(Role::InfoStatus);

        overlay.reorder(Role::InfoStatus, false);

        assert_eq!(roles(&overlay)[0], Role::InfoStatus);
        assert!(overlay.take_redraw_request());
    }

    #[test]
    fn reorder_of_unknown_role_is_ignored() {
        let mut overlay = OverlayCompositor::new();
        overlay.add(Role::Clock);
        overlay.reorder(Role::Unlock, true);
        assert!(!overlay.take_redraw_request());
    }
}
