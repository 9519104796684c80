//! Shared geometric and color primitives used by the editor, input and render modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in the base image's native pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A pointer position relative to the on-screen canvas widget.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Maps a screen position into canvas space: `(screen - pan) / zoom`.
pub fn to_canvas_space(screen: ScreenPoint, pan: ScreenPoint, zoom: f64) -> CanvasPoint {
    CanvasPoint::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Inverse of [`to_canvas_space`].
pub fn to_screen_space(canvas: CanvasPoint, pan: ScreenPoint, zoom: f64) -> ScreenPoint {
    ScreenPoint::new(canvas.x * zoom + pan.x, canvas.y * zoom + pan.y)
}

const ZOOM_MIN: f64 = 0.01;
const ZOOM_MAX: f64 = 16.0;
const ZOOM_LEVELS_PERCENT: &[u16] = &[
    1, 2, 3, 4, 5, 8, 10, 12, 16, 20, 25, 33, 50, 67, 75, 80, 90, 100, 110, 125, 150, 175, 200,
    250, 300, 400, 500, 600, 800, 1000, 1200, 1600,
];

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(ZOOM_MIN, ZOOM_MAX)
    } else {
        1.0
    }
}

fn next_zoom_in_level(current: f64) -> f64 {
    ZOOM_LEVELS_PERCENT
        .iter()
        .map(|&level| f64::from(level) / 100.0)
        .find(|&level| level > current + f64::EPSILON)
        .unwrap_or(ZOOM_MAX)
}

fn next_zoom_out_level(current: f64) -> f64 {
    ZOOM_LEVELS_PERCENT
        .iter()
        .rev()
        .map(|&level| f64::from(level) / 100.0)
        .find(|&level| level < current - f64::EPSILON)
        .unwrap_or(ZOOM_MIN)
}

/// Zoom factor and pan offset. Affects rendering and pointer mapping only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    zoom: f64,
    pan: ScreenPoint,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub const fn new() -> Self {
        Self {
            zoom: 1.0,
            pan: ScreenPoint::new(0.0, 0.0),
        }
    }

    pub fn with(zoom: f64, pan: ScreenPoint) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan,
        }
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    pub const fn pan(&self) -> ScreenPoint {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = next_zoom_in_level(self.zoom);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = next_zoom_out_level(self.zoom);
    }

    pub fn pan_by(&mut self, delta_x: f64, delta_y: f64) {
        self.pan.x += delta_x;
        self.pan.y += delta_y;
    }

    pub fn set_actual_size(&mut self) {
        *self = Self::new();
    }

    pub fn screen_to_canvas(&self, screen: ScreenPoint) -> CanvasPoint {
        to_canvas_space(screen, self.pan, self.zoom)
    }

    pub fn canvas_to_screen(&self, canvas: CanvasPoint) -> ScreenPoint {
        to_screen_space(canvas, self.pan, self.zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}: expected #rgb or #rrggbb")]
pub struct ColorParseError(pub String);

/// An opaque RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(value.to_string());
        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |text: &str| u8::from_str_radix(text, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |index: usize| -> Result<u8, ColorParseError> {
                    let nibble = channel(&digits[index..index + 1])?;
                    Ok(nibble * 17)
                };
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
