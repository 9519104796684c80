use serde::{Deserialize, Serialize};

use super::{CanvasPoint, Color};

/// Rectangle or circle described by an origin and signed drag deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub color: Color,
    pub line_width: f64,
    pub origin: CanvasPoint,
    pub width: f64,
    pub height: f64,
}

impl Shape {
    pub const fn new(color: Color, line_width: f64, origin: CanvasPoint) -> Self {
        Self {
            color,
            line_width,
            origin,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn drag_to(&mut self, point: CanvasPoint) {
        self.width = point.x - self.origin.x;
        self.height = point.y - self.origin.y;
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Normalized `(left, top, right, bottom)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let x2 = self.origin.x + self.width;
        let y2 = self.origin.y + self.height;
        (
            self.origin.x.min(x2),
            self.origin.y.min(y2),
            self.origin.x.max(x2),
            self.origin.y.max(y2),
        )
    }

    pub fn center(&self) -> CanvasPoint {
        CanvasPoint::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    /// Half the bounding-box diagonal. Circles use this instead of fitting an ellipse.
    pub fn circle_radius(&self) -> f64 {
        self.width.hypot(self.height) / 2.0
    }
}
