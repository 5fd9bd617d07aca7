use super::overlay_dom::{create_div, document, ensure_positioned, set_styles};
use crate::application::{MinimapCanvas, MinimapCursor};
use crate::config::{LINE_ALPHA, MinimapConfig, VIEWPORT_FILL_ALPHA, VIEWPORT_STROKE_ALPHA};
use crate::domain::chart::SurfaceSize;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::LogComponent;
use crate::domain::minimap::{CacheKey, SparklineGeometry, ViewportRect};
use crate::log_warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, ImageData};

const COMPONENT: LogComponent = LogComponent::Infrastructure("MinimapCanvas");

/// 2D canvas filling its container, plus a hover tooltip element
pub struct HtmlMinimapCanvas {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    tooltip: HtmlElement,
    snapshot: Option<ImageData>,
    drawn: SurfaceSize,
}

impl HtmlMinimapCanvas {
    pub fn mount(container: &HtmlElement) -> AppResult<Self> {
        let document = document()?;
        ensure_positioned(container);

        let canvas = document
            .create_element("canvas")
            .map_err(|_| AppError::BrowserApi("failed to create canvas".to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::BrowserApi("created element is not a canvas".to_string()))?;
        canvas.set_class_name("timeline-canvas");
        set_styles(&canvas, &[("display", "block"), ("width", "100%"), ("height", "100%")]);

        let context = canvas
            .get_context("2d")
            .map_err(|_| AppError::BrowserApi("failed to get 2D context".to_string()))?
            .ok_or_else(|| AppError::BrowserApi("2D context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::BrowserApi("failed to cast to 2D context".to_string()))?;

        let tooltip = create_div(&document, "timeline-tooltip")?;
        set_styles(
            &tooltip,
            &[
                ("position", "absolute"),
                ("bottom", "100%"),
                ("transform", "translateX(-50%)"),
                ("padding", "2px 6px"),
                ("border-radius", "3px"),
                ("font-size", "11px"),
                ("pointer-events", "none"),
                ("background", "rgba(11,15,20,0.9)"),
                ("color", "#e5e7eb"),
                ("display", "none"),
            ],
        );

        for element in [canvas.unchecked_ref::<HtmlElement>(), &tooltip] {
            container
                .append_child(element)
                .map_err(|_| AppError::BrowserApi("failed to attach minimap element".to_string()))?;
        }

        Ok(Self {
            container: container.clone(),
            canvas,
            context,
            tooltip,
            snapshot: None,
            drawn: SurfaceSize::new(0.0, 0.0),
        })
    }

    pub fn canvas_element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn apply_pixel_ratio(&self) {
        let ratio = self.pixel_ratio();
        if let Err(error) = self.context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            log_warn!(COMPONENT, "setTransform failed: {:?}", error);
        }
    }
}

impl Drop for HtmlMinimapCanvas {
    fn drop(&mut self) {
        self.canvas.remove();
        self.tooltip.remove();
    }
}

impl MinimapCanvas for HtmlMinimapCanvas {
    fn css_size(&self) -> SurfaceSize {
        let rect = self.container.get_bounding_client_rect();
        SurfaceSize::new(rect.width(), rect.height())
    }

    fn pixel_ratio(&self) -> f64 {
        web_sys::window()
            .map(|window| window.device_pixel_ratio())
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            .unwrap_or(1.0)
    }

    fn rasterize(&mut self, key: CacheKey, geometry: &SparklineGeometry, style: &MinimapConfig) {
        // Resizing the backing store also resets the transform.
        self.canvas.set_width(key.pixel_width);
        self.canvas.set_height(key.pixel_height);
        self.apply_pixel_ratio();
        self.drawn = SurfaceSize::new(geometry.width, geometry.height);

        let ctx = &self.context;
        ctx.clear_rect(0.0, 0.0, geometry.width, geometry.height);

        for band in &geometry.bands {
            ctx.set_fill_style_str(&band.color.to_css());
            ctx.fill_rect(band.x, 0.0, band.width, geometry.height);
        }

        ctx.begin_path();
        for (i, (x, y)) in geometry.points.iter().enumerate() {
            if i == 0 {
                ctx.move_to(*x, *y);
            } else {
                ctx.line_to(*x, *y);
            }
        }
        ctx.set_stroke_style_str(&style.line_color.with_alpha(LINE_ALPHA).to_css());
        ctx.set_line_width(1.0);
        ctx.stroke();

        self.snapshot = ctx
            .get_image_data(0.0, 0.0, f64::from(key.pixel_width), f64::from(key.pixel_height))
            .map_err(|error| log_warn!(COMPONENT, "getImageData failed: {:?}", error))
            .ok();
    }

    fn blit_viewport(&mut self, viewport: Option<ViewportRect>, style: &MinimapConfig) {
        let Some(snapshot) = &self.snapshot else { return };
        // putImageData works in device pixels and ignores the transform.
        if let Err(error) = self.context.put_image_data(snapshot, 0.0, 0.0) {
            log_warn!(COMPONENT, "putImageData failed: {:?}", error);
            return;
        }
        self.apply_pixel_ratio();

        let Some(rect) = viewport else { return };
        let height = self.drawn.height;
        let ctx = &self.context;
        ctx.set_fill_style_str(&style.viewport_fill.with_alpha(VIEWPORT_FILL_ALPHA).to_css());
        ctx.fill_rect(rect.x, 0.0, rect.width, height);
        ctx.set_stroke_style_str(&style.viewport_stroke.with_alpha(VIEWPORT_STROKE_ALPHA).to_css());
        ctx.set_line_width(1.0);
        ctx.stroke_rect(rect.x + 0.5, 0.5, (rect.width - 1.0).max(0.0), (height - 1.0).max(0.0));
    }

    fn show_tooltip(&mut self, x: f64, label: &str) {
        self.tooltip.set_text_content(Some(label));
        set_styles(&self.tooltip, &[("display", "block"), ("left", &format!("{x}px"))]);
    }

    fn hide_tooltip(&mut self) {
        let _ = self.tooltip.style().set_property("display", "none");
    }

    fn set_cursor(&mut self, cursor: MinimapCursor) {
        let _ = self.canvas.style().set_property("cursor", cursor.as_ref());
    }

    fn clear(&mut self) {
        self.snapshot = None;
        self.context.clear_rect(0.0, 0.0, self.drawn.width, self.drawn.height);
        self.hide_tooltip();
    }
}
