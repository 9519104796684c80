use serde::{Deserialize, Serialize};

use crate::editor::tools::{DrawAction, Shape, Stroke, ToolKind, ToolSettings};
use crate::geometry::{CanvasPoint, ScreenPoint, ViewState};

/// What to do with a stroke in progress when the pointer leaves the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerLeavePolicy {
    /// Keep what was drawn so far, same as a pointer-up.
    #[default]
    Commit,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Drawing(DrawAction),
    Panning {
        last: ScreenPoint,
    },
}

/// Result of a pointer-down, telling the session what the gesture needs next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerDown {
    Drawing,
    Panning,
    /// Text is atomic: the caller asks for a string and commits directly.
    PlaceText(CanvasPoint),
    /// Select samples the image at this point and never touches the log.
    Sample(CanvasPoint),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMove {
    Ignored,
    Preview,
    Panned { delta_x: f64, delta_y: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub const fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// The action being drawn, shown as a preview on top of the log.
    pub fn in_progress(&self) -> Option<&DrawAction> {
        match &self.state {
            GestureState::Drawing(action) => Some(action),
            _ => None,
        }
    }

    /// Starts a gesture. Any gesture still active is dropped; callers that
    /// want to keep it should call [`Self::pointer_up`] first.
    pub fn pointer_down(
        &mut self,
        screen: ScreenPoint,
        view: &ViewState,
        settings: &ToolSettings,
    ) -> PointerDown {
        let start = view.screen_to_canvas(screen);
        let (next, outcome) = match settings.tool {
            ToolKind::Move => (
                GestureState::Panning { last: screen },
                PointerDown::Panning,
            ),
            ToolKind::Text => (GestureState::Idle, PointerDown::PlaceText(start)),
            ToolKind::Select => (GestureState::Idle, PointerDown::Sample(start)),
            ToolKind::Pen | ToolKind::Highlighter | ToolKind::Eraser => {
                let stroke = Stroke::new(settings.color, settings.line_width, start);
                let action = match settings.tool {
                    ToolKind::Highlighter => DrawAction::Highlighter(stroke),
                    ToolKind::Eraser => DrawAction::Eraser(stroke),
                    _ => DrawAction::Pen(stroke),
                };
                (GestureState::Drawing(action), PointerDown::Drawing)
            }
            ToolKind::Rectangle | ToolKind::Circle => {
                let shape = Shape::new(settings.color, settings.line_width, start);
                let action = if settings.tool == ToolKind::Circle {
                    DrawAction::Circle(shape)
                } else {
                    DrawAction::Rectangle(shape)
                };
                (GestureState::Drawing(action), PointerDown::Drawing)
            }
        };
        tracing::debug!(
            tool = settings.tool.label(),
            x = start.x,
            y = start.y,
            ?outcome,
            "pointer down"
        );
        self.state = next;
        outcome
    }

    pub fn pointer_move(&mut self, screen: ScreenPoint, view: &mut ViewState) -> PointerMove {
        match &mut self.state {
            GestureState::Idle => PointerMove::Ignored,
            GestureState::Drawing(action) => {
                let point = view.screen_to_canvas(screen);
                match action {
                    DrawAction::Pen(stroke)
                    | DrawAction::Highlighter(stroke)
                    | DrawAction::Eraser(stroke) => stroke.push(point),
                    DrawAction::Rectangle(shape) | DrawAction::Circle(shape) => {
                        shape.drag_to(point)
                    }
                    DrawAction::Text(_) => return PointerMove::Ignored,
                }
                PointerMove::Preview
            }
            GestureState::Panning { last } => {
                let delta_x = screen.x - last.x;
                let delta_y = screen.y - last.y;
                view.pan_by(delta_x, delta_y);
                *last = screen;
                PointerMove::Panned { delta_x, delta_y }
            }
        }
    }

    /// Ends the gesture, returning the action to commit if it is drawable.
    pub fn pointer_up(&mut self) -> Option<DrawAction> {
        match std::mem::take(&mut self.state) {
            GestureState::Drawing(action) => {
                if action.is_drawable() {
                    Some(action)
                } else {
                    tracing::debug!(tool = action.tool().label(), "discarding empty gesture");
                    None
                }
            }
            GestureState::Panning { .. } => {
                tracing::debug!("pan finished");
                None
            }
            GestureState::Idle => None,
        }
    }

    pub fn pointer_leave(&mut self, policy: PointerLeavePolicy) -> Option<DrawAction> {
        match policy {
            PointerLeavePolicy::Commit => self.pointer_up(),
            PointerLeavePolicy::Discard => {
                if let GestureState::Drawing(action) = std::mem::take(&mut self.state) {
                    tracing::debug!(
                        tool = action.tool().label(),
                        "pointer left canvas; discarding gesture"
                    );
                }
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}
