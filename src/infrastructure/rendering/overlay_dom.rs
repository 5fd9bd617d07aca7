use crate::application::OverlayPainter;
use crate::config::{OVERLAY_FILL_ALPHA, ThemeConfig};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::measurement::{OverlayTooltip, OverlayView, PriceTag, TagRole};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Absolutely positioned elements layered over the chart container
pub struct OverlayDom {
    overlay: HtmlElement,
    divider: HtmlElement,
    start_tag: HtmlElement,
    end_tag: HtmlElement,
    split_tag: HtmlElement,
    tooltips: [HtmlElement; 2],
}

pub(crate) fn document() -> AppResult<Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| AppError::BrowserApi("document not available".to_string()))
}

pub(crate) fn create_div(document: &Document, class: &str) -> AppResult<HtmlElement> {
    let element = document
        .create_element("div")
        .map_err(|_| AppError::BrowserApi("failed to create element".to_string()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| AppError::BrowserApi("created element is not an HtmlElement".to_string()))?;
    element.set_class_name(class);
    Ok(element)
}

pub(crate) fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in styles {
        let _ = style.set_property(name, value);
    }
}

/// Positioned children need a positioned parent.
pub(crate) fn ensure_positioned(container: &HtmlElement) {
    let style = container.style();
    if style.get_property_value("position").unwrap_or_default().is_empty() {
        let _ = style.set_property("position", "relative");
    }
}

impl OverlayDom {
    pub fn mount(container: &HtmlElement, theme: &ThemeConfig) -> AppResult<Self> {
        let document = document()?;
        ensure_positioned(container);

        let overlay = create_div(&document, "measure-overlay")?;
        let fill = theme.overlay_fill.with_alpha(OVERLAY_FILL_ALPHA).to_css();
        set_styles(
            &overlay,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("bottom", "0"),
                ("pointer-events", "none"),
                ("background", &fill),
                ("z-index", "5"),
            ],
        );

        let divider = create_div(&document, "measure-divider")?;
        let divider_color = theme.divider_color.to_css();
        set_styles(
            &divider,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("bottom", "0"),
                ("width", "1px"),
                ("pointer-events", "none"),
                ("background", &divider_color),
                ("z-index", "6"),
            ],
        );

        let tag_background = theme.tag_background.to_css();
        let tag = |class: &str| -> AppResult<HtmlElement> {
            let tag = create_div(&document, class)?;
            set_styles(
                &tag,
                &[
                    ("position", "absolute"),
                    ("transform", "translate(-50%, -50%)"),
                    ("padding", "1px 4px"),
                    ("border-radius", "3px"),
                    ("font-size", "11px"),
                    ("white-space", "nowrap"),
                    ("pointer-events", "none"),
                    ("background", &tag_background),
                    ("color", "#e5e7eb"),
                    ("z-index", "7"),
                ],
            );
            Ok(tag)
        };
        let start_tag = tag("measure-tag measure-tag-start")?;
        let end_tag = tag("measure-tag measure-tag-end")?;
        let split_tag = tag("measure-tag measure-tag-split")?;

        let tooltip = || -> AppResult<HtmlElement> {
            let tooltip = create_div(&document, "measure-tooltip")?;
            set_styles(
                &tooltip,
                &[
                    ("position", "absolute"),
                    ("top", "8px"),
                    ("transform", "translateX(-50%)"),
                    ("padding", "4px 8px"),
                    ("border-radius", "4px"),
                    ("font-size", "12px"),
                    ("white-space", "nowrap"),
                    ("pointer-events", "none"),
                    ("background", "rgba(11,15,20,0.9)"),
                    ("color", "#e5e7eb"),
                    ("z-index", "8"),
                ],
            );
            Ok(tooltip)
        };
        let tooltips = [tooltip()?, tooltip()?];

        let dom = Self { overlay, divider, start_tag, end_tag, split_tag, tooltips };
        for element in dom.elements() {
            hide(element);
            container
                .append_child(element)
                .map_err(|_| AppError::BrowserApi("failed to attach overlay element".to_string()))?;
        }
        Ok(dom)
    }

    fn elements(&self) -> [&HtmlElement; 7] {
        [
            &self.overlay,
            &self.divider,
            &self.start_tag,
            &self.end_tag,
            &self.split_tag,
            &self.tooltips[0],
            &self.tooltips[1],
        ]
    }

    fn tag_element(&self, role: TagRole) -> &HtmlElement {
        match role {
            TagRole::Start => &self.start_tag,
            TagRole::End => &self.end_tag,
            TagRole::Split => &self.split_tag,
        }
    }
}

impl Drop for OverlayDom {
    fn drop(&mut self) {
        for element in self.elements() {
            element.remove();
        }
    }
}

fn hide(element: &HtmlElement) {
    let _ = element.style().set_property("display", "none");
}

fn show_at(element: &HtmlElement, left: f64) {
    set_styles(element, &[("display", "block"), ("left", &format!("{left}px"))]);
}

fn tooltip_html(tooltip: &OverlayTooltip) -> String {
    let readout = &tooltip.readout;
    format!(
        "<span style=\"color:{};font-weight:600\">{}</span> · {}",
        tooltip.color.to_css(),
        readout.percent_label,
        readout.details(),
    )
}

impl OverlayPainter for OverlayDom {
    fn paint(&mut self, view: &OverlayView) {
        let Some(rect) = view.rect else {
            for element in self.elements() {
                hide(element);
            }
            return;
        };

        show_at(&self.overlay, rect.left);
        let _ = self.overlay.style().set_property("width", &format!("{}px", rect.width));

        match view.divider_x {
            Some(x) => show_at(&self.divider, x),
            None => hide(&self.divider),
        }

        for role in [TagRole::Start, TagRole::End, TagRole::Split] {
            let element = self.tag_element(role);
            match view.tags.iter().find(|tag| tag.role == role) {
                Some(PriceTag { x, y, label, .. }) => {
                    show_at(element, *x);
                    let _ = element.style().set_property("top", &format!("{y}px"));
                    element.set_text_content(Some(label.as_str()));
                }
                None => hide(element),
            }
        }

        for (index, element) in self.tooltips.iter().enumerate() {
            match view.tooltips.get(index) {
                Some(tooltip) => {
                    element.set_inner_html(&tooltip_html(tooltip));
                    show_at(element, tooltip.x);
                }
                None => hide(element),
            }
        }
    }
}
