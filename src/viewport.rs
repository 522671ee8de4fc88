use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub surface_width: f64,
    pub surface_height: f64,
}

impl Viewport {
    /// Largest uniform scale at which the whole board fits the window.
    pub fn fit(window_width: f64, window_height: f64, base_width: f64, base_height: f64) -> Self {
        let scale = compute_scale(window_width, window_height, base_width, base_height);
        Self {
            scale,
            surface_width: base_width * scale,
            surface_height: base_height * scale,
        }
    }
}

pub fn compute_scale(window_width: f64, window_height: f64, base_width: f64, base_height: f64) -> f64 {
    (window_width / base_width).min(window_height / base_height)
}

/// Resizes the canvas to the scaled board and sets the context transform so
/// drawing coordinates stay in base units.
///
/// Resizing a canvas resets its context state, so the transform is set
/// absolutely rather than accumulated.
pub fn apply(
    canvas: &HtmlCanvasElement,
    context: &CanvasRenderingContext2d,
    viewport: &Viewport,
) -> Result<(), JsValue> {
    let width = viewport.surface_width.max(0.0) as u32;
    let height = viewport.surface_height.max(0.0) as u32;

    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }

    context.set_transform(viewport.scale, 0.0, 0.0, viewport.scale, 0.0, 0.0)
}
