use image::{Rgba, RgbaImage};

use crate::geometry::{CanvasPoint, Color};

/// How a coverage mask is combined with the destination pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Composite {
    SourceOver,
    /// Removes destination alpha in proportion to coverage; source color is ignored.
    DestinationOut,
}

/// Per-pixel coverage in `[0, 1]` over a clipped region of the target image.
///
/// Shapes are accumulated with `max`, so overlapping pieces of one action
/// (polyline segments, glyphs) are blended onto the target exactly once.
#[derive(Debug, Clone)]
pub(crate) struct CoverageMask {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl CoverageMask {
    /// Mask over the pixels touched by `(left, top, right, bottom)`, clipped
    /// to a `surface_width` x `surface_height` image. `None` when nothing is visible.
    pub(crate) fn within(
        bounds: (f64, f64, f64, f64),
        surface_width: u32,
        surface_height: u32,
    ) -> Option<Self> {
        let (left, top, right, bottom) = bounds;
        if !(left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite()) {
            return None;
        }
        let clamp_x = |value: f64| value.clamp(0.0, f64::from(surface_width)) as u32;
        let clamp_y = |value: f64| value.clamp(0.0, f64::from(surface_height)) as u32;
        let x0 = clamp_x(left.floor());
        let y0 = clamp_y(top.floor());
        let x1 = clamp_x(right.ceil());
        let y1 = clamp_y(bottom.ceil());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let width = x1 - x0;
        let height = y1 - y0;
        Some(Self {
            left: x0,
            top: y0,
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        })
    }

    pub(crate) fn full(surface_width: u32, surface_height: u32) -> Option<Self> {
        Self::within(
            (0.0, 0.0, f64::from(surface_width), f64::from(surface_height)),
            surface_width,
            surface_height,
        )
    }

    /// Records coverage for the absolute pixel `(x, y)`; out-of-mask pixels are ignored.
    pub(crate) fn plot(&mut self, x: i64, y: i64, coverage: f32) {
        let local_x = x - i64::from(self.left);
        let local_y = y - i64::from(self.top);
        if local_x < 0
            || local_y < 0
            || local_x >= i64::from(self.width)
            || local_y >= i64::from(self.height)
        {
            return;
        }
        let index = local_y as usize * self.width as usize + local_x as usize;
        let slot = &mut self.data[index];
        *slot = slot.max(coverage.clamp(0.0, 1.0));
    }

    /// Evaluates `coverage_at(pixel_x, pixel_y)` for every pixel in the mask.
    fn accumulate(&mut self, coverage_at: impl Fn(u32, u32) -> f32) {
        for local_y in 0..self.height {
            for local_x in 0..self.width {
                let coverage = coverage_at(self.left + local_x, self.top + local_y);
                if coverage > 0.0 {
                    let index = local_y as usize * self.width as usize + local_x as usize;
                    let slot = &mut self.data[index];
                    *slot = slot.max(coverage.min(1.0));
                }
            }
        }
    }

    pub(crate) fn apply(&self, target: &mut RgbaImage, color: Color, opacity: f32, mode: Composite) {
        for local_y in 0..self.height {
            for local_x in 0..self.width {
                let coverage =
                    self.data[local_y as usize * self.width as usize + local_x as usize];
                if coverage <= 0.0 {
                    continue;
                }
                let pixel = target.get_pixel_mut(self.left + local_x, self.top + local_y);
                let alpha = coverage * opacity;
                match mode {
                    Composite::SourceOver => blend_source_over(pixel, color, alpha),
                    Composite::DestinationOut => blend_destination_out(pixel, alpha),
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn coverage(&self, x: u32, y: u32) -> f32 {
        if x < self.left || y < self.top || x >= self.left + self.width || y >= self.top + self.height {
            return 0.0;
        }
        self.data[(y - self.top) as usize * self.width as usize + (x - self.left) as usize]
    }
}

fn unit(channel: u8) -> f32 {
    f32::from(channel) / 255.0
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn blend_source_over(pixel: &mut Rgba<u8>, color: Color, alpha: f32) {
    let source_alpha = alpha.clamp(0.0, 1.0);
    if source_alpha <= 0.0 {
        return;
    }
    let dest_alpha = unit(pixel[3]);
    let out_alpha = source_alpha + dest_alpha * (1.0 - source_alpha);
    if out_alpha <= 0.0 {
        *pixel = Rgba([0, 0, 0, 0]);
        return;
    }
    let (r, g, b) = color.rgb();
    let mix = |source: u8, dest: u8| {
        (unit(source) * source_alpha + unit(dest) * dest_alpha * (1.0 - source_alpha)) / out_alpha
    };
    *pixel = Rgba([
        to_channel(mix(r, pixel[0])),
        to_channel(mix(g, pixel[1])),
        to_channel(mix(b, pixel[2])),
        to_channel(out_alpha),
    ]);
}

pub(crate) fn blend_destination_out(pixel: &mut Rgba<u8>, alpha: f32) {
    let remaining = unit(pixel[3]) * (1.0 - alpha.clamp(0.0, 1.0));
    pixel[3] = to_channel(remaining);
}

fn distance_to_segment(point: CanvasPoint, start: CanvasPoint, end: CanvasPoint) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;
    if length_squared == 0.0 {
        return point.distance_to(start);
    }
    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0);
    point.distance_to(CanvasPoint::new(start.x + t * dx, start.y + t * dy))
}

fn pixel_center(x: u32, y: u32) -> CanvasPoint {
    CanvasPoint::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

/// Anti-aliased coverage of a band of `half_width` around a distance field.
fn band_coverage(distance: f64, half_width: f64) -> f32 {
    (half_width - distance + 0.5).clamp(0.0, 1.0) as f32
}

/// Bounding box of `points` grown by `margin`.
pub(crate) fn padded_bounds(points: &[CanvasPoint], margin: f64) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let init = (first.x, first.y, first.x, first.y);
    let (left, top, right, bottom) = points.iter().fold(init, |acc, point| {
        (
            acc.0.min(point.x),
            acc.1.min(point.y),
            acc.2.max(point.x),
            acc.3.max(point.y),
        )
    });
    Some((left - margin, top - margin, right + margin, bottom + margin))
}

/// Polyline with round caps and joins. A single point draws a dot.
pub(crate) fn stroke_polyline(mask: &mut CoverageMask, points: &[CanvasPoint], width: f64) {
    let half_width = width / 2.0;
    match points {
        [] => {}
        [only] => {
            let center = *only;
            mask.accumulate(|x, y| band_coverage(pixel_center(x, y).distance_to(center), half_width));
        }
        _ => {
            for pair in points.windows(2) {
                let (start, end) = (pair[0], pair[1]);
                let Some(bounds) = padded_bounds(&[start, end], half_width + 1.0) else {
                    continue;
                };
                let mut segment = mask.restricted_to(bounds);
                segment.accumulate(|x, y| {
                    band_coverage(distance_to_segment(pixel_center(x, y), start, end), half_width)
                });
                mask.merge(&segment);
            }
        }
    }
}

/// Outline of the axis-aligned box `(left, top, right, bottom)`, centred on its
/// edges with mitered corners.
pub(crate) fn stroke_rectangle(mask: &mut CoverageMask, bounds: (f64, f64, f64, f64), width: f64) {
    let half_width = width / 2.0;
    let (left, top, right, bottom) = bounds;
    let outer = (left - half_width, top - half_width, right + half_width, bottom + half_width);
    let inner = (left + half_width, top + half_width, right - half_width, bottom - half_width);
    mask.accumulate(|x, y| {
        let pixel = (f64::from(x), f64::from(y), f64::from(x) + 1.0, f64::from(y) + 1.0);
        (overlap_area(pixel, outer) - overlap_area(pixel, inner)).max(0.0) as f32
    });
}

pub(crate) fn stroke_circle(mask: &mut CoverageMask, center: CanvasPoint, radius: f64, width: f64) {
    let half_width = width / 2.0;
    mask.accumulate(|x, y| {
        let distance = pixel_center(x, y).distance_to(center);
        band_coverage((distance - radius).abs(), half_width)
    });
}

fn overlap_area(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> f64 {
    let width = (a.2.min(b.2) - a.0.max(b.0)).max(0.0);
    let height = (a.3.min(b.3) - a.1.max(b.1)).max(0.0);
    width * height
}

impl CoverageMask {
    fn restricted_to(&self, bounds: (f64, f64, f64, f64)) -> Self {
        let right = f64::from(self.left + self.width);
        let bottom = f64::from(self.top + self.height);
        let clipped = (
            bounds.0.max(f64::from(self.left)),
            bounds.1.max(f64::from(self.top)),
            bounds.2.min(right),
            bounds.3.min(bottom),
        );
        Self::within(clipped, self.left + self.width, self.top + self.height).unwrap_or(Self {
            left: self.left,
            top: self.top,
            width: 0,
            height: 0,
            data: Vec::new(),
        })
    }

    fn merge(&mut self, other: &Self) {
        for local_y in 0..other.height {
            for local_x in 0..other.width {
                let coverage = other.data[local_y as usize * other.width as usize + local_x as usize];
                if coverage > 0.0 {
                    self.plot(
                        i64::from(other.left + local_x),
                        i64::from(other.top + local_y),
                        coverage,
                    );
                }
            }
        }
    }
}
