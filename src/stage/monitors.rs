//! Monitor geometry, immutable per session.

use smithay::utils::{Logical, Point, Rectangle};

use crate::widgets::DisplaySurface;

/// Geometry of one monitor, queried once at stage construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorDescriptor {
    pub index: usize,
    pub rect: Rectangle<i32, Logical>,
}

/// Ordered, index-addressable set of monitor descriptors.
#[derive(Debug, Clone, Default)]
pub struct MonitorSet {
    monitors: Vec<MonitorDescriptor>,
}

impl MonitorSet {
    /// Queries the display provider once; the result never changes for the
    /// lifetime of the session.
    pub fn query(display: &dyn DisplaySurface) -> Self {
        let monitors = (0..display.monitor_count())
            .map(|index| MonitorDescriptor {
                index,
                rect: display.monitor_geometry(index),
            })
            .collect();
        Self { monitors }
    }

    #[cfg(test)]
    pub fn from_descriptors(monitors: Vec<MonitorDescriptor>) -> Self {
        Self { monitors }
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MonitorDescriptor> {
        self.monitors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitorDescriptor> {
        self.monitors.iter()
    }

    /// Returns the monitor under `position`, if any.
    pub fn monitor_at(&self, position: Point<f64, Logical>) -> Option<usize> {
        self.monitors
            .iter()
            .position(|monitor| monitor.rect.to_f64().contains(position))
    }

    /// Union of every monitor rect; the geometry of the stage surface.
    pub fn bounding_rect(&self) -> Rectangle<i32, Logical> {
        self.monitors
            .iter()
            .map(|monitor| monitor.rect)
            .reduce(|acc, rect| acc.merge(rect))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use smithay::utils::{Point, Rectangle, Size};

    use super::*;

    fn set(rects: &[(i32, i32, i32, i32)]) -> MonitorSet {
        MonitorSet {
            monitors: rects
                .iter()
                .enumerate()
                .map(|(index, &(x, y, w, h))| MonitorDescriptor {
                    index,
                    rect: Rectangle::new(Point::from((x, y)), Size::from((w, h))),
                })
                .collect(),
        }
    }

    #[test]
    fn hit_test_picks_the_right_monitor() {
        let monitors = set(&[(0, 0, 1920, 1080), (1920, 0, 1920, 1080)]);

        assert_eq!(monitors.monitor_at(Point::from((10., 10.))), Some(0));
        assert_eq!(monitors.monitor_at(Point::from((2000., 500.))), Some(1));
        assert_eq!(monitors.monitor_at(Point::from((4000., 500.))), None);
    }

    #[test]
    fn bounding_rect_spans_all_monitors() {
        let monitors = set(&[(0, 0, 1920, 1080), (1920, 0, 2560, 1440)]);

        let rect = monitors.bounding_rect();
        assert_eq!(rect.loc, Point::from((0, 0)));
        assert_eq!(rect.size, Size::from((4480, 1440)));
    }

    #[test]
    fn empty_set_has_zero_bounds() {
        let monitors = MonitorSet::default();
        assert_eq!(monitors.bounding_rect(), Rectangle::default());
    }
}
