//! Replays the action log onto raster surfaces.
//!
//! Everything is drawn at the base image's native resolution first (the
//! composite). On-screen frames are produced by sampling that composite
//! through the view transform; exports never go through the transform.

mod raster;
mod text;

use image::{Rgba, RgbaImage};

use crate::editor::tools::{
    DrawAction, Shape, Stroke, TextPlacement, HIGHLIGHTER_OPACITY, HIGHLIGHTER_WIDTH_FACTOR,
};
use crate::geometry::{ScreenPoint, ViewState};
use raster::{
    padded_bounds, stroke_circle, stroke_polyline, stroke_rectangle, Composite, CoverageMask,
};

pub use text::{load_font_file, FontBook, FontError};

/// Size of the on-screen drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    fonts: FontBook,
}

impl Renderer {
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }

    /// Base image with `actions` painted over it in order, at native resolution.
    pub fn composite<'a>(
        &self,
        base: &RgbaImage,
        actions: impl IntoIterator<Item = &'a DrawAction>,
    ) -> RgbaImage {
        let mut surface = base.clone();
        for action in actions {
            self.draw_action(&mut surface, action);
        }
        surface
    }

    /// On-screen frame: clears the viewport, applies translate(pan) then
    /// scale(zoom) and draws the composite of the log plus the preview action.
    pub fn render_view(
        &self,
        base: &RgbaImage,
        actions: &[DrawAction],
        preview: Option<&DrawAction>,
        view: &ViewState,
        viewport: Viewport,
    ) -> RgbaImage {
        let composite = self.composite(base, actions.iter().chain(preview));
        let mut frame = RgbaImage::from_pixel(viewport.width, viewport.height, Rgba([0, 0, 0, 0]));
        let (source_width, source_height) = composite.dimensions();
        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            let screen = ScreenPoint::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let canvas = view.screen_to_canvas(screen);
            let (sx, sy) = (canvas.x.floor(), canvas.y.floor());
            if sx < 0.0 || sy < 0.0 || sx >= f64::from(source_width) || sy >= f64::from(source_height) {
                continue;
            }
            *pixel = *composite.get_pixel(sx as u32, sy as u32);
        }
        frame
    }

    pub fn draw_action(&self, surface: &mut RgbaImage, action: &DrawAction) {
        match action {
            DrawAction::Pen(stroke) => {
                draw_stroke(surface, stroke, stroke.line_width, 1.0, Composite::SourceOver)
            }
            DrawAction::Highlighter(stroke) => draw_stroke(
                surface,
                stroke,
                stroke.line_width * HIGHLIGHTER_WIDTH_FACTOR,
                HIGHLIGHTER_OPACITY,
                Composite::SourceOver,
            ),
            DrawAction::Eraser(stroke) => {
                draw_stroke(surface, stroke, stroke.line_width, 1.0, Composite::DestinationOut)
            }
            DrawAction::Rectangle(shape) => draw_rectangle(surface, shape),
            DrawAction::Circle(shape) => draw_circle(surface, shape),
            DrawAction::Text(text) => self.draw_text(surface, text),
        }
    }

    fn draw_text(&self, surface: &mut RgbaImage, text: &TextPlacement) {
        let Some(font) = self.fonts.face(&text.font_family) else {
            tracing::debug!(font = %text.font_spec(), "no font face available; skipping text");
            return;
        };
        let Some(mut mask) = CoverageMask::full(surface.width(), surface.height()) else {
            return;
        };
        text::rasterize_text(&mut mask, font, text);
        mask.apply(surface, text.color, 1.0, Composite::SourceOver);
    }
}

fn draw_stroke(surface: &mut RgbaImage, stroke: &Stroke, width: f64, opacity: f32, mode: Composite) {
    let Some(bounds) = padded_bounds(&stroke.points, width / 2.0 + 1.0) else {
        return;
    };
    let Some(mut mask) = CoverageMask::within(bounds, surface.width(), surface.height()) else {
        return;
    };
    stroke_polyline(&mut mask, &stroke.points, width);
    mask.apply(surface, stroke.color, opacity, mode);
}

fn draw_rectangle(surface: &mut RgbaImage, shape: &Shape) {
    let bounds = shape.bounds();
    let margin = shape.line_width / 2.0 + 1.0;
    let padded = (
        bounds.0 - margin,
        bounds.1 - margin,
        bounds.2 + margin,
        bounds.3 + margin,
    );
    let Some(mut mask) = CoverageMask::within(padded, surface.width(), surface.height()) else {
        return;
    };
    stroke_rectangle(&mut mask, bounds, shape.line_width);
    mask.apply(surface, shape.color, 1.0, Composite::SourceOver);
}

fn draw_circle(surface: &mut RgbaImage, shape: &Shape) {
    let center = shape.center();
    let radius = shape.circle_radius();
    let reach = radius + shape.line_width / 2.0 + 1.0;
    let bounds = (
        center.x - reach,
        center.y - reach,
        center.x + reach,
        center.y + reach,
    );
    let Some(mut mask) = CoverageMask::within(bounds, surface.width(), surface.height()) else {
        return;
    };
    stroke_circle(&mut mask, center, radius, shape.line_width);
    mask.apply(surface, shape.color, 1.0, Composite::SourceOver);
}
