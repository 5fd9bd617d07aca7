use crate::domain::chart::LogicalRange;

/// Highlighted part of the minimap, clamped to `[0, width]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub width: f64,
}

/// Maps between minimap pixels and the chart's logical range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapScale {
    pub total_bars: usize,
    pub width: f64,
}

impl MinimapScale {
    pub fn new(total_bars: usize, width: f64) -> Option<Self> {
        (total_bars > 0 && width.is_finite() && width > 0.0).then_some(Self { total_bars, width })
    }

    fn bars(&self) -> f64 {
        self.total_bars as f64
    }

    pub fn viewport_rect(&self, range: LogicalRange) -> Option<ViewportRect> {
        if !range.is_finite() {
            return None;
        }
        let x1 = (range.from / self.bars() * self.width).clamp(0.0, self.width);
        let x2 = (range.to / self.bars() * self.width).clamp(0.0, self.width);
        Some(ViewportRect { x: x1, width: (x2 - x1).max(0.0) })
    }

    pub fn logical_at(&self, x: f64) -> f64 {
        x / self.width * self.bars()
    }

    pub fn logical_delta(&self, dx: f64) -> f64 {
        dx / self.width * self.bars()
    }

    /// Index of the bar drawn under a logical position, clamped to the series.
    pub fn bar_index(&self, logical: f64) -> usize {
        let last = self.total_bars - 1;
        if logical.is_nan() {
            return 0;
        }
        logical.round().clamp(0.0, last as f64) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    start_x: f64,
    start_range: LogicalRange,
}

/// Click-to-recenter and drag-to-pan state
#[derive(Debug, Clone, Default)]
pub struct MinimapNavigator {
    drag: Option<DragAnchor>,
}

impl MinimapNavigator {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Recenter `current` on the clicked position and start a pan from there.
    pub fn press(&mut self, x: f64, scale: MinimapScale, current: LogicalRange) -> LogicalRange {
        let recentered = current.centered_on(scale.logical_at(x));
        self.drag = Some(DragAnchor { start_x: x, start_range: recentered });
        recentered
    }

    /// Range for the pointer at `x`, or `None` when no pan is in progress.
    pub fn drag_to(&self, x: f64, scale: MinimapScale) -> Option<LogicalRange> {
        let anchor = self.drag?;
        Some(anchor.start_range.shifted(scale.logical_delta(x - anchor.start_x)))
    }

    pub fn release(&mut self) -> bool {
        self.drag.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_clamped_even_when_range_is_outside_the_series() {
        let scale = MinimapScale::new(100, 200.0).unwrap();
        assert_eq!(
            scale.viewport_rect(LogicalRange::new(-20.0, 10.0)),
            Some(ViewportRect { x: 0.0, width: 20.0 })
        );
        assert_eq!(
            scale.viewport_rect(LogicalRange::new(150.0, 250.0)),
            Some(ViewportRect { x: 200.0, width: 0.0 })
        );
    }

    #[test]
    fn press_then_drag_keeps_span() {
        let scale = MinimapScale::new(1000, 500.0).unwrap();
        let mut nav = MinimapNavigator::default();
        let centered = nav.press(250.0, scale, LogicalRange::new(0.0, 100.0));
        assert_eq!(centered, LogicalRange::new(450.0, 550.0));
        let panned = nav.drag_to(300.0, scale).unwrap();
        assert_eq!(panned, LogicalRange::new(550.0, 650.0));
        assert!(nav.release());
        assert!(nav.drag_to(310.0, scale).is_none());
    }

    #[test]
    fn zero_sized_scale_is_rejected() {
        assert!(MinimapScale::new(0, 100.0).is_none());
        assert!(MinimapScale::new(10, 0.0).is_none());
    }
}
