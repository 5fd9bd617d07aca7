//! Measurement overlay lifecycle: `Idle → Dragging → Frozen ⇄ Splitting`.
//!
//! The machine is pure. It never touches the chart; callers translate the
//! returned [`Transition`] into input locking, canceller arming and repaint.

use super::readout::order_by_time;
use crate::config::{OverlayConfig, ZeroDragPolicy};
use crate::domain::chart::SurfaceSize;
use crate::domain::market_data::Bar;
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPoint {
    pub bar: Bar,
    pub x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        start_bar: Bar,
        start_x: f64,
        current_x: f64,
        current_bar: Bar,
    },
    /// `start_bar`/`end_bar` are ordered by time, `left_x <= right_x`.
    Frozen {
        start_bar: Bar,
        end_bar: Bar,
        left_x: f64,
        right_x: f64,
        split: Option<SplitPoint>,
    },
    Splitting {
        start_bar: Bar,
        end_bar: Bar,
        left_x: f64,
        right_x: f64,
        split: SplitPoint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum GestureMode {
    Idle,
    Dragging,
    Frozen,
    Splitting,
}

impl GestureMode {
    /// Modes that own the pointer and therefore the chart's pan/zoom input.
    pub fn holds_pointer(&self) -> bool {
        matches!(self, GestureMode::Dragging | GestureMode::Splitting)
    }
}

impl GestureState {
    pub fn mode(&self) -> GestureMode {
        match self {
            GestureState::Idle => GestureMode::Idle,
            GestureState::Dragging { .. } => GestureMode::Dragging,
            GestureState::Frozen { .. } => GestureMode::Frozen,
            GestureState::Splitting { .. } => GestureMode::Splitting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum DismissReason {
    Escape,
    /// Pointer pressed outside the overlay, outside the chart, or without the split modifier.
    Click,
    ViewChanged,
    SeriesReplaced,
    /// Pointer released where no bar could be resolved.
    NoEndBar,
    /// Press and release without movement under [`ZeroDragPolicy::Discard`].
    ZeroMovement,
    /// A coordinate lookup produced a non-finite value.
    GeometryFailure,
    /// Pointer left the window or was cancelled mid-gesture.
    PointerLost,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    PointerDown { x: f64, on_chart: bool, bar: Option<Bar>, split_modifier: bool },
    PointerMove { x: f64, bar: Option<Bar> },
    PointerUp { x: f64, bar: Option<Bar> },
    Dismiss(DismissReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GestureMode,
    pub to: GestureMode,
    /// Set when the gesture was torn down back to `Idle`.
    pub dismissed: Option<DismissReason>,
}

impl Transition {
    pub fn changed_mode(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone)]
pub struct GestureMachine {
    state: GestureState,
    zero_drag: ZeroDragPolicy,
    click_tolerance_px: f64,
}

impl GestureMachine {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            state: GestureState::Idle,
            zero_drag: config.zero_drag,
            click_tolerance_px: config.click_tolerance_px.max(0.0),
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn mode(&self) -> GestureMode {
        self.state.mode()
    }

    pub fn handle(&mut self, input: GestureInput, surface: SurfaceSize) -> Transition {
        let from = self.state.mode();
        let (next, dismissed) = self.next(self.state, input, surface);
        self.state = next;
        Transition { from, to: next.mode(), dismissed }
    }

    fn next(
        &self,
        state: GestureState,
        input: GestureInput,
        surface: SurfaceSize,
    ) -> (GestureState, Option<DismissReason>) {
        use GestureInput::*;
        use GestureState::*;

        match (state, input) {
            (Idle, Dismiss(_)) => (Idle, None),
            (_, Dismiss(reason)) => (Idle, Some(reason)),

            (Idle, PointerDown { x, on_chart: true, bar: Some(bar), .. }) if x.is_finite() && bar.is_valid() => {
                let x = surface.clamp_x(x);
                (Dragging { start_bar: bar, start_x: x, current_x: x, current_bar: bar }, None)
            }
            (Idle, _) => (Idle, None),

            (Dragging { start_bar, start_x, current_bar, .. }, PointerMove { x, bar }) => {
                if !x.is_finite() || bar.is_some_and(|b| !b.is_valid()) {
                    return (Idle, Some(DismissReason::GeometryFailure));
                }
                let current_x = surface.clamp_x(x);
                (Dragging { start_bar, start_x, current_x, current_bar: bar.unwrap_or(current_bar) }, None)
            }
            (Dragging { start_bar, start_x, .. }, PointerUp { x, bar }) => {
                self.finish_drag(start_bar, start_x, x, bar, surface)
            }
            (dragging @ Dragging { .. }, PointerDown { .. }) => (dragging, None),

            (Frozen { start_bar, end_bar, left_x, right_x, .. }, PointerDown { x, on_chart, bar, split_modifier }) => {
                let inside = on_chart && x.is_finite() && x >= left_x && x <= right_x;
                if !(inside && split_modifier) {
                    return (Idle, Some(DismissReason::Click));
                }
                match bar.filter(Bar::is_valid) {
                    Some(bar) => {
                        let split = SplitPoint { bar: clamp_bar(bar, start_bar, end_bar), x };
                        (Splitting { start_bar, end_bar, left_x, right_x, split }, None)
                    }
                    None => (Idle, Some(DismissReason::GeometryFailure)),
                }
            }
            (frozen @ Frozen { .. }, PointerMove { .. } | PointerUp { .. }) => (frozen, None),

            (Splitting { start_bar, end_bar, left_x, right_x, split }, PointerMove { x, bar }) => {
                if !x.is_finite() || bar.is_some_and(|b| !b.is_valid()) {
                    return (Idle, Some(DismissReason::GeometryFailure));
                }
                let split = SplitPoint {
                    bar: bar.map_or(split.bar, |b| clamp_bar(b, start_bar, end_bar)),
                    x: x.clamp(left_x, right_x),
                };
                (Splitting { start_bar, end_bar, left_x, right_x, split }, None)
            }
            (Splitting { start_bar, end_bar, left_x, right_x, split }, PointerUp { .. }) => {
                (Frozen { start_bar, end_bar, left_x, right_x, split: Some(split) }, None)
            }
            (splitting @ Splitting { .. }, PointerDown { .. }) => (splitting, None),
        }
    }

    fn finish_drag(
        &self,
        start_bar: Bar,
        start_x: f64,
        x: f64,
        bar: Option<Bar>,
        surface: SurfaceSize,
    ) -> (GestureState, Option<DismissReason>) {
        if !x.is_finite() {
            return (GestureState::Idle, Some(DismissReason::GeometryFailure));
        }
        let Some(end) = bar.filter(Bar::is_valid) else {
            return (GestureState::Idle, Some(DismissReason::NoEndBar));
        };
        let end_x = surface.clamp_x(x);
        let no_movement = end.time == start_bar.time || (end_x - start_x).abs() <= self.click_tolerance_px;
        if no_movement && self.zero_drag == ZeroDragPolicy::Discard {
            return (GestureState::Idle, Some(DismissReason::ZeroMovement));
        }
        let (start_bar, end_bar) = order_by_time(start_bar, end);
        let frozen = GestureState::Frozen {
            start_bar,
            end_bar,
            left_x: start_x.min(end_x),
            right_x: start_x.max(end_x),
            split: None,
        };
        (frozen, None)
    }
}

fn clamp_bar(bar: Bar, start: Bar, end: Bar) -> Bar {
    if bar.time < start.time {
        start
    } else if bar.time > end.time {
        end
    } else {
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Price, Timestamp};

    const SURFACE: SurfaceSize = SurfaceSize { width: 400.0, height: 200.0 };

    fn bar(time: i64, price: f64) -> Bar {
        Bar::new(Timestamp::from_secs(time), Price::from(price))
    }

    fn down(x: f64, b: Bar) -> GestureInput {
        GestureInput::PointerDown { x, on_chart: true, bar: Some(b), split_modifier: false }
    }

    fn frozen_machine() -> GestureMachine {
        let mut m = GestureMachine::new(&OverlayConfig::default());
        m.handle(down(300.0, bar(30, 120.0)), SURFACE);
        m.handle(GestureInput::PointerMove { x: 100.0, bar: Some(bar(10, 100.0)) }, SURFACE);
        m.handle(GestureInput::PointerUp { x: 100.0, bar: Some(bar(10, 100.0)) }, SURFACE);
        m
    }

    #[test]
    fn right_to_left_drag_freezes_in_time_order() {
        let m = frozen_machine();
        match *m.state() {
            GestureState::Frozen { start_bar, end_bar, left_x, right_x, split } => {
                assert_eq!(start_bar.time.secs(), 10);
                assert_eq!(end_bar.time.secs(), 30);
                assert_eq!((left_x, right_x), (100.0, 300.0));
                assert!(split.is_none());
            }
            other => panic!("expected frozen, got {other:?}"),
        }
    }

    #[test]
    fn idle_ignores_everything_but_a_valid_press() {
        let mut m = GestureMachine::new(&OverlayConfig::default());
        let t = m.handle(GestureInput::PointerUp { x: 10.0, bar: Some(bar(1, 1.0)) }, SURFACE);
        assert_eq!(t.to, GestureMode::Idle);
        let t = m.handle(GestureInput::PointerDown { x: 10.0, on_chart: true, bar: None, split_modifier: false }, SURFACE);
        assert_eq!(t.to, GestureMode::Idle);
        let t = m.handle(down(10.0, bar(1, f64::NAN)), SURFACE);
        assert_eq!(t.to, GestureMode::Idle);
        let t = m.handle(GestureInput::Dismiss(DismissReason::Escape), SURFACE);
        assert_eq!(t, Transition { from: GestureMode::Idle, to: GestureMode::Idle, dismissed: None });
    }

    #[test]
    fn release_without_bar_discards() {
        let mut m = GestureMachine::new(&OverlayConfig::default());
        m.handle(down(50.0, bar(5, 10.0)), SURFACE);
        let t = m.handle(GestureInput::PointerUp { x: 120.0, bar: None }, SURFACE);
        assert_eq!(t.to, GestureMode::Idle);
        assert_eq!(t.dismissed, Some(DismissReason::NoEndBar));
    }

    #[test]
    fn zero_movement_follows_policy() {
        let mut discard = GestureMachine::new(&OverlayConfig::default());
        discard.handle(down(50.0, bar(5, 10.0)), SURFACE);
        let t = discard.handle(GestureInput::PointerUp { x: 51.0, bar: Some(bar(5, 10.0)) }, SURFACE);
        assert_eq!(t.dismissed, Some(DismissReason::ZeroMovement));

        let config = OverlayConfig { zero_drag: ZeroDragPolicy::Freeze, ..OverlayConfig::default() };
        let mut freeze = GestureMachine::new(&config);
        freeze.handle(down(50.0, bar(5, 10.0)), SURFACE);
        let t = freeze.handle(GestureInput::PointerUp { x: 50.0, bar: Some(bar(5, 10.0)) }, SURFACE);
        assert_eq!(t.to, GestureMode::Frozen);
    }

    #[test]
    fn split_requires_modifier_inside_overlay() {
        let mut m = frozen_machine();
        let t = m.handle(
            GestureInput::PointerDown { x: 200.0, on_chart: true, bar: Some(bar(20, 110.0)), split_modifier: true },
            SURFACE,
        );
        assert_eq!(t.to, GestureMode::Splitting);

        let t = m.handle(GestureInput::PointerMove { x: 380.0, bar: Some(bar(40, 130.0)) }, SURFACE);
        assert_eq!(t.to, GestureMode::Splitting);
        match *m.state() {
            GestureState::Splitting { split, .. } => {
                assert_eq!(split.x, 300.0);
                assert_eq!(split.bar.time.secs(), 30);
            }
            other => panic!("expected splitting, got {other:?}"),
        }

        let t = m.handle(GestureInput::PointerUp { x: 380.0, bar: None }, SURFACE);
        assert_eq!(t.to, GestureMode::Frozen);
        assert!(matches!(m.state(), GestureState::Frozen { split: Some(_), .. }));

        let mut plain = frozen_machine();
        let t = plain.handle(down(200.0, bar(20, 110.0)), SURFACE);
        assert_eq!(t.dismissed, Some(DismissReason::Click));
    }

    #[test]
    fn non_finite_move_aborts() {
        let mut m = GestureMachine::new(&OverlayConfig::default());
        m.handle(down(50.0, bar(5, 10.0)), SURFACE);
        let t = m.handle(GestureInput::PointerMove { x: f64::NAN, bar: None }, SURFACE);
        assert_eq!(t.dismissed, Some(DismissReason::GeometryFailure));
    }
}
