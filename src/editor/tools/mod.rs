mod shape;
mod stroke;
mod text;

use serde::{Deserialize, Serialize};

pub use crate::geometry::{CanvasPoint, Color};
pub use shape::Shape;
pub use stroke::Stroke;
pub use text::{TextPlacement, DEFAULT_FONT_FAMILY};

/// Opacity applied to highlighter strokes.
pub const HIGHLIGHTER_OPACITY: f32 = 0.3;
/// Highlighter strokes are painted at this multiple of the nominal line width.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Select,
    Pen,
    Highlighter,
    Rectangle,
    Circle,
    Text,
    Eraser,
    Move,
}

impl ToolKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Pen => "pen",
            Self::Highlighter => "highlighter",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Text => "text",
            Self::Eraser => "eraser",
            Self::Move => "move",
        }
    }
}

/// Snapshot of the picker state handed to every gesture call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: Color,
    pub line_width: f64,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: Color::new(0xff, 0x00, 0x00),
            line_width: 3.0,
            font_size: 24.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl ToolSettings {
    pub fn with_tool(&self, tool: ToolKind) -> Self {
        Self {
            tool,
            ..self.clone()
        }
    }

    pub fn set_line_width(&mut self, line_width: f64) {
        self.line_width = clamp_positive(line_width, MIN_LINE_WIDTH);
    }

    pub fn set_font_size(&mut self, font_size: f64) {
        self.font_size = clamp_positive(font_size, MIN_FONT_SIZE);
    }

    /// Clamps sizes that arrived without going through the setters.
    pub fn sanitized(mut self) -> Self {
        self.set_line_width(self.line_width);
        self.set_font_size(self.font_size);
        self
    }
}

const MIN_LINE_WIDTH: f64 = 0.5;
const MIN_FONT_SIZE: f64 = 1.0;

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn clamp_positive(value: f64, min: f64) -> f64 {
    if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

/// One committed annotation. Immutable once it lands in the action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum DrawAction {
    Pen(Stroke),
    Highlighter(Stroke),
    Eraser(Stroke),
    Rectangle(Shape),
    Circle(Shape),
    Text(TextPlacement),
}

impl DrawAction {
    pub const fn tool(&self) -> ToolKind {
        match self {
            Self::Pen(_) => ToolKind::Pen,
            Self::Highlighter(_) => ToolKind::Highlighter,
            Self::Eraser(_) => ToolKind::Eraser,
            Self::Rectangle(_) => ToolKind::Rectangle,
            Self::Circle(_) => ToolKind::Circle,
            Self::Text(_) => ToolKind::Text,
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Self::Pen(stroke) | Self::Highlighter(stroke) | Self::Eraser(stroke) => Some(stroke),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Self::Rectangle(shape) | Self::Circle(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextPlacement> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this action carries enough geometry to be worth committing.
    pub fn is_drawable(&self) -> bool {
        match self {
            Self::Pen(stroke) | Self::Highlighter(stroke) | Self::Eraser(stroke) => {
                is_positive(stroke.line_width) && stroke.has_length()
            }
            Self::Rectangle(shape) | Self::Circle(shape) => {
                is_positive(shape.line_width) && !shape.is_degenerate()
            }
            Self::Text(text) => is_positive(text.font_size) && !text.content.is_empty(),
        }
    }
}
