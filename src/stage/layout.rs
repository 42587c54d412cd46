//! Placement policy for overlay children.
//!
//! Pure geometry: one rule per [`Role`], computed from the session state,
//! the monitor set, the monitor under the pointer and the child's natural
//! size. The stage gathers the inputs and stores the result back on the
//! overlay child.

use tracing::warn;

use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::config::Alignment;

use super::monitors::MonitorSet;
use super::types::{Role, SessionState};

/// Clock inputs while dormant: its own monitor and the configured alignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockPlacement {
    pub monitor: usize,
    pub halign: Alignment,
    pub valign: Alignment,
}

/// Inputs to one placement computation.
pub struct PlacementCtx<'a> {
    pub monitors: &'a MonitorSet,
    pub state: SessionState,
    /// Monitor under the pointer, sentinel already resolved by the caller.
    pub focused_monitor: usize,
    pub natural_size: Size<i32, Logical>,
    pub clock: ClockPlacement,
    /// Previous placement of the child, if any; the dormant sticky rect for
    /// the status bars.
    pub sticky: Option<Rectangle<i32, Logical>>,
}

/// Computes the placement rectangle for `role`.
pub fn place(role: Role, ctx: &PlacementCtx<'_>) -> Rectangle<i32, Logical> {
    let nat = ctx.natural_size;

    match role {
        // Fixed to its monitor's full rect; never affected by focus changes.
        Role::Background(index) => monitor_rect(ctx, index),

        Role::Unlock => centered_in(monitor_rect(ctx, ctx.focused_monitor), nat),

        Role::Clock => {
            let (monitor, halign, valign) = match ctx.state {
                SessionState::Dormant => (ctx.clock.monitor, ctx.clock.halign, ctx.clock.valign),
                SessionState::Authenticating => {
                    (ctx.focused_monitor, Alignment::Start, Alignment::Center)
                }
            };
            aligned_in(monitor_rect(ctx, monitor), nat, halign, valign)
        }

        Role::AudioStatus => match ctx.state {
            SessionState::Authenticating => {
                let monitor = monitor_rect(ctx, ctx.focused_monitor);
                Rectangle::new(monitor.loc, nat)
            }
            SessionState::Dormant => match ctx.sticky {
                Some(prev) => Rectangle::new(prev.loc, nat),
                None => Rectangle::new(monitor_rect(ctx, 0).loc, nat),
            },
        },

        Role::InfoStatus => match ctx.state {
            SessionState::Authenticating => {
                let monitor = monitor_rect(ctx, ctx.focused_monitor);
                right_pinned(monitor.loc, monitor.size.w, nat)
            }
            SessionState::Dormant => match ctx.sticky {
                Some(prev) => right_pinned(prev.loc, prev.size.w, nat),
                None => {
                    let monitor = monitor_rect(ctx, 0);
                    right_pinned(monitor.loc, monitor.size.w, nat)
                }
            },
        },
    }
}

fn monitor_rect(ctx: &PlacementCtx<'_>, index: usize) -> Rectangle<i32, Logical> {
    match ctx.monitors.get(index) {
        Some(monitor) => monitor.rect,
        None => {
            warn!("placement requested for unknown monitor {index}");
            Rectangle::default()
        }
    }
}

fn centered_in(
    rect: Rectangle<i32, Logical>,
    size: Size<i32, Logical>,
) -> Rectangle<i32, Logical> {
    aligned_in(rect, size, Alignment::Center, Alignment::Center)
}

fn aligned_in(
    rect: Rectangle<i32, Logical>,
    size: Size<i32, Logical>,
    halign: Alignment,
    valign: Alignment,
) -> Rectangle<i32, Logical> {
    let x = match halign {
        Alignment::Start => rect.loc.x,
        Alignment::Center => rect.loc.x + (rect.size.w - size.w) / 2,
        Alignment::End => rect.loc.x + rect.size.w - size.w,
    };
    let y = match valign {
        Alignment::Start => rect.loc.y,
        Alignment::Center => rect.loc.y + (rect.size.h - size.h) / 2,
        Alignment::End => rect.loc.y + rect.size.h - size.h,
    };
    Rectangle::new(Point::from((x, y)), size)
}

/// Anchors `size` to the right edge of a region starting at `loc` with width
/// `width`, flush with its top.
fn right_pinned(
    loc: Point<i32, Logical>,
    width: i32,
    size: Size<i32, Logical>,
) -> Rectangle<i32, Logical> {
    Rectangle::new(Point::from((loc.x + width - size.w, loc.y)), size)
}
