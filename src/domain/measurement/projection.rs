use super::gesture::{GestureState, SplitPoint};
use super::readout::{IntervalReadout, Trend, format_price};
use crate::config::{OverlayConfig, ThemeConfig};
use crate::domain::chart::{Color, SurfaceSize};
use crate::domain::market_data::{Bar, Resolution};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayRect {
    pub left: f64,
    pub width: f64,
}

impl OverlayRect {
    fn between(a: f64, b: f64) -> Self {
        Self { left: a.min(b), width: (a - b).abs() }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagRole {
    Start,
    End,
    Split,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTag {
    pub role: TagRole,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayTooltip {
    /// Horizontal center, kept away from the container edges.
    pub x: f64,
    pub color: Color,
    pub readout: IntervalReadout,
}

/// Everything the overlay shows for one gesture state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OverlayView {
    pub rect: Option<OverlayRect>,
    pub tags: Vec<PriceTag>,
    pub divider_x: Option<f64>,
    pub tooltips: Vec<OverlayTooltip>,
}

impl OverlayView {
    pub fn is_hidden(&self) -> bool {
        self.rect.is_none()
    }
}

/// Projects gesture state and pixel geometry into an [`OverlayView`].
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    edge_margin: f64,
    up_color: Color,
    down_color: Color,
}

impl OverlayRenderer {
    pub fn new(overlay: &OverlayConfig, theme: &ThemeConfig) -> Self {
        Self {
            edge_margin: overlay.tooltip_edge_margin_px.max(0.0),
            up_color: theme.up_color,
            down_color: theme.down_color,
        }
    }

    pub fn project(&self, state: &GestureState, surface: SurfaceSize, resolution: Resolution) -> OverlayView {
        match *state {
            GestureState::Idle => OverlayView::default(),
            GestureState::Dragging { start_bar, start_x, current_x, current_bar } => {
                let rect = OverlayRect::between(start_x, current_x);
                let tooltips = self
                    .tooltip(start_bar, current_bar, rect.left, rect.right(), surface, resolution)
                    .into_iter()
                    .collect();
                OverlayView { rect: Some(rect), tags: Vec::new(), divider_x: None, tooltips }
            }
            GestureState::Frozen { start_bar, end_bar, left_x, right_x, split } => {
                self.frozen(start_bar, end_bar, left_x, right_x, split, surface, resolution)
            }
            GestureState::Splitting { start_bar, end_bar, left_x, right_x, split } => {
                self.frozen(start_bar, end_bar, left_x, right_x, Some(split), surface, resolution)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn frozen(
        &self,
        start_bar: Bar,
        end_bar: Bar,
        left_x: f64,
        right_x: f64,
        split: Option<SplitPoint>,
        surface: SurfaceSize,
        resolution: Resolution,
    ) -> OverlayView {
        let rect = OverlayRect::between(left_x, right_x);
        let mid_y = surface.height / 2.0;
        let mut tags = vec![tag(TagRole::Start, left_x, mid_y, start_bar), tag(TagRole::End, right_x, mid_y, end_bar)];

        let (divider_x, tooltips) = match split {
            None => {
                let whole = self.tooltip(start_bar, end_bar, left_x, right_x, surface, resolution);
                (None, whole.into_iter().collect())
            }
            Some(split) => {
                tags.push(tag(TagRole::Split, split.x, mid_y, split.bar));
                let halves = [
                    self.tooltip(start_bar, split.bar, left_x, split.x, surface, resolution),
                    self.tooltip(split.bar, end_bar, split.x, right_x, surface, resolution),
                ];
                (Some(split.x), halves.into_iter().flatten().collect())
            }
        };

        OverlayView { rect: Some(rect), tags, divider_x, tooltips }
    }

    fn tooltip(
        &self,
        a: Bar,
        b: Bar,
        left_x: f64,
        right_x: f64,
        surface: SurfaceSize,
        resolution: Resolution,
    ) -> Option<OverlayTooltip> {
        let readout = IntervalReadout::between(a, b, resolution)?;
        let color = match readout.trend {
            Trend::Up => self.up_color,
            Trend::Down => self.down_color,
        };
        Some(OverlayTooltip { x: self.clamp_to_edges((left_x + right_x) / 2.0, surface), color, readout })
    }

    fn clamp_to_edges(&self, x: f64, surface: SurfaceSize) -> f64 {
        let lo = self.edge_margin;
        let hi = (surface.width - self.edge_margin).max(lo);
        x.clamp(lo, hi)
    }
}

fn tag(role: TagRole, x: f64, y: f64, bar: Bar) -> PriceTag {
    PriceTag { role, x, y, label: format_price(bar.price.value()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Price, Timestamp};

    fn bar(time: i64, price: f64) -> Bar {
        Bar::new(Timestamp::from_secs(time), Price::from(price))
    }

    fn renderer() -> OverlayRenderer {
        OverlayRenderer::new(&OverlayConfig::default(), &ThemeConfig::default())
    }

    #[test]
    fn tooltip_stays_off_the_edges() {
        let surface = SurfaceSize::new(300.0, 100.0);
        let state = GestureState::Dragging {
            start_bar: bar(0, 10.0),
            start_x: 0.0,
            current_x: 4.0,
            current_bar: bar(4, 11.0),
        };
        let view = renderer().project(&state, surface, Resolution::ONE_SECOND);
        assert_eq!(view.tooltips[0].x, 16.0);
        assert!(view.tags.is_empty());
    }

    #[test]
    fn narrow_surface_does_not_invert_clamp() {
        let surface = SurfaceSize::new(20.0, 100.0);
        let x = renderer().clamp_to_edges(15.0, surface);
        assert_eq!(x, 16.0);
    }

    #[test]
    fn split_state_has_three_tags_and_two_tooltips() {
        let state = GestureState::Splitting {
            start_bar: bar(0, 100.0),
            end_bar: bar(100, 120.0),
            left_x: 10.0,
            right_x: 210.0,
            split: SplitPoint { bar: bar(50, 90.0), x: 110.0 },
        };
        let view = renderer().project(&state, SurfaceSize::new(400.0, 300.0), Resolution::ONE_SECOND);
        assert_eq!(view.tags.len(), 3);
        assert!(view.tags.iter().all(|t| t.y == 150.0));
        assert_eq!(view.divider_x, Some(110.0));
        assert_eq!(view.tooltips.len(), 2);
        assert_eq!(view.tooltips[0].x, 60.0);
        assert_eq!(view.tooltips[0].readout.trend, Trend::Down);
        assert_eq!(view.tooltips[1].x, 160.0);
        assert_eq!(view.tooltips[1].color, ThemeConfig::default().up_color);
    }
}
