use serde::{Deserialize, Serialize};

use super::{CanvasPoint, Color};

pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// A text label anchored at its alphabetic baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub color: Color,
    pub origin: CanvasPoint,
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
}

impl TextPlacement {
    pub fn new(
        color: Color,
        origin: CanvasPoint,
        content: impl Into<String>,
        font_size: f64,
        font_family: impl Into<String>,
    ) -> Self {
        Self {
            color,
            origin,
            content: content.into(),
            font_size,
            font_family: font_family.into(),
        }
    }

    /// CSS-style font shorthand, e.g. `24px sans-serif`.
    pub fn font_spec(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}
