use serde::{Deserialize, Serialize};

use super::{CanvasPoint, Color};

/// Freehand path shared by the pen, highlighter and eraser tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub line_width: f64,
    pub points: Vec<CanvasPoint>,
}

impl Stroke {
    pub fn new(color: Color, line_width: f64, start: CanvasPoint) -> Self {
        Self {
            color,
            line_width,
            points: vec![start],
        }
    }

    pub fn push(&mut self, point: CanvasPoint) {
        self.points.push(point);
    }

    /// True when at least two distinct points were recorded.
    pub fn has_length(&self) -> bool {
        match self.points.split_first() {
            Some((first, rest)) => rest.iter().any(|point| point != first),
            None => false,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = (CanvasPoint, CanvasPoint)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}
