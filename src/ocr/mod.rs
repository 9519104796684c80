//! Text and font detection port used by the select tool.
//!
//! The editor only samples a region of the composite and hands it to a
//! [`TextRegionDetector`]; recognition itself lives outside this crate.

use image::{imageops, RgbaImage};
use serde::Serialize;

use crate::geometry::CanvasPoint;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("recognition failed: {message}")]
    Recognition { message: String },
    #[error("invalid region: {message}")]
    InvalidRegion { message: String },
}

pub type OcrResult<T> = Result<T, OcrError>;

/// Width and height of the region sampled around a select-tool click.
pub const SAMPLE_REGION_WIDTH: u32 = 160;
pub const SAMPLE_REGION_HEIGHT: u32 = 48;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontMetadata {
    pub family: Option<String>,
    pub size_px: Option<f64>,
    pub weight: Option<u16>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSample {
    pub text: String,
    pub font: FontMetadata,
}

/// Region in canvas pixels that was sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub trait TextRegionDetector {
    fn detect(&mut self, region: &RgbaImage) -> OcrResult<TextSample>;
}

/// Clamps a sample box centred on `at` to the image; `None` when `at` is outside it.
pub fn sample_region_around(
    at: CanvasPoint,
    image_width: u32,
    image_height: u32,
) -> Option<SampleRegion> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    if at.x < 0.0 || at.y < 0.0 || at.x >= f64::from(image_width) || at.y >= f64::from(image_height)
    {
        return None;
    }
    let width = SAMPLE_REGION_WIDTH.min(image_width);
    let height = SAMPLE_REGION_HEIGHT.min(image_height);
    let center_x = at.x.floor() as u32;
    let center_y = at.y.floor() as u32;
    let x = center_x
        .saturating_sub(width / 2)
        .min(image_width - width);
    let y = center_y
        .saturating_sub(height / 2)
        .min(image_height - height);
    Some(SampleRegion {
        x,
        y,
        width,
        height,
    })
}

pub fn crop_region(image: &RgbaImage, region: SampleRegion) -> OcrResult<RgbaImage> {
    let fits_x = region.x.checked_add(region.width).is_some_and(|end| end <= image.width());
    let fits_y = region.y.checked_add(region.height).is_some_and(|end| end <= image.height());
    if region.width == 0 || region.height == 0 || !fits_x || !fits_y {
        return Err(OcrError::InvalidRegion {
            message: format!(
                "{}x{}+{}+{} outside {}x{}",
                region.width,
                region.height,
                region.x,
                region.y,
                image.width(),
                image.height()
            ),
        });
    }
    Ok(imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image())
}
