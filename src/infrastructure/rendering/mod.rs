pub mod minimap_canvas;
pub mod overlay_dom;

pub use minimap_canvas::HtmlMinimapCanvas;
pub use overlay_dom::OverlayDom;
