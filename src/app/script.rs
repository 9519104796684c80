use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;
use thiserror::Error;

use crate::editor::{
    EditorError, EditorSession, ShortcutOutcome, TextPrompt, ToolKind, ToolSettings,
};
use crate::geometry::{CanvasPoint, Color, ScreenPoint};
use crate::input::{ShortcutKey, ShortcutModifiers};
use crate::ocr::TextSample;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not load image {path}")]
    ImageLoad { path: PathBuf },
    #[error("unknown shortcut key {key:?}")]
    UnknownKey { key: String },
    #[error("step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: EditorError,
    },
}

/// A recorded editing session: an optional base image plus the steps to replay.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionScript {
    pub image: Option<PathBuf>,
    pub settings: Option<ToolSettings>,
    pub steps: Vec<ScriptStep>,
}

/// One editing step. Pointer coordinates are in screen space.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Mid-session load. Failure keeps the current image and log, like the
    /// editor's file picker; only the script's top-level `image` is required.
    LoadImage {
        path: PathBuf,
    },
    SelectTool {
        tool: ToolKind,
    },
    SetColor {
        color: Color,
    },
    SetLineWidth {
        width: f64,
    },
    SetFont {
        #[serde(default)]
        size: Option<f64>,
        #[serde(default)]
        family: Option<String>,
    },
    /// Queues the answer for the next text placement.
    TypeText {
        text: String,
    },
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    PointerLeave,
    /// Pointer-down on the first point, moves through the rest, pointer-up.
    Drag {
        points: Vec<[f64; 2]>,
    },
    Undo,
    Redo,
    Clear,
    Zoom {
        level: f64,
    },
    ZoomIn,
    ZoomOut,
    ActualSize,
    Pan {
        dx: f64,
        dy: f64,
    },
    Shortcut {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    Export,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub exported: Vec<PathBuf>,
    pub samples: Vec<TextSample>,
}

/// Text prompt answered from a queue the script fills with `type_text` steps.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTextPrompt {
    answers: Rc<RefCell<VecDeque<String>>>,
}

impl ScriptedTextPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, text: impl Into<String>) {
        self.answers.borrow_mut().push_back(text.into());
    }

    pub fn pending(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl TextPrompt for ScriptedTextPrompt {
    fn request_text(&mut self, at: CanvasPoint) -> Option<String> {
        let answer = self.answers.borrow_mut().pop_front();
        if answer.is_none() {
            tracing::debug!(x = at.x, y = at.y, "no scripted text for placement");
        }
        answer
    }
}

pub fn load_script(path: &Path) -> Result<SessionScript, ScriptError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_shortcut_key(key: &str) -> Result<ShortcutKey, ScriptError> {
    let normalized = key.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "escape" | "esc" => return Ok(ShortcutKey::Escape),
        "delete" | "del" => return Ok(ShortcutKey::Delete),
        _ => {}
    }
    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ShortcutKey::Character(ch)),
        _ => Err(ScriptError::UnknownKey {
            key: key.to_string(),
        }),
    }
}

/// Resolves `path` against the directory the script was read from.
pub fn resolve_relative(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Replays `steps` against `session`. `prompt` must be the prompt the session was built with.
pub fn replay(
    session: &mut EditorSession,
    prompt: &ScriptedTextPrompt,
    steps: &[ScriptStep],
    base_dir: Option<&Path>,
) -> Result<ReplayReport, ScriptError> {
    let mut report = ReplayReport::default();
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(index, ?step, "replaying step");
        apply_step(session, prompt, step, base_dir, &mut report)
            .map_err(|source| ScriptError::Step { index, source })?;
    }
    if prompt.pending() > 0 {
        tracing::warn!(unused = prompt.pending(), "script queued text that was never placed");
    }
    Ok(report)
}

fn apply_step(
    session: &mut EditorSession,
    prompt: &ScriptedTextPrompt,
    step: &ScriptStep,
    base_dir: Option<&Path>,
    report: &mut ReplayReport,
) -> Result<(), EditorError> {
    match step {
        ScriptStep::LoadImage { path } => {
            let path = resolve_relative(base_dir, path);
            if !session.load_image_file(Some(&path)) {
                tracing::warn!(
                    path = %path.display(),
                    "load_image step failed; keeping current image"
                );
            }
        }
        ScriptStep::SelectTool { tool } => session.select_tool(*tool),
        ScriptStep::SetColor { color } => session.settings_mut().color = *color,
        ScriptStep::SetLineWidth { width } => session.settings_mut().set_line_width(*width),
        ScriptStep::SetFont { size, family } => {
            let settings = session.settings_mut();
            if let Some(size) = size {
                settings.set_font_size(*size);
            }
            if let Some(family) = family {
                settings.font_family = family.clone();
            }
        }
        ScriptStep::TypeText { text } => prompt.queue(text.clone()),
        ScriptStep::PointerDown { x, y } => {
            if let Some(sample) = session.pointer_down(ScreenPoint::new(*x, *y)) {
                report.samples.push(sample);
            }
        }
        ScriptStep::PointerMove { x, y } => session.pointer_move(ScreenPoint::new(*x, *y)),
        ScriptStep::PointerUp => {
            session.pointer_up();
        }
        ScriptStep::PointerLeave => {
            session.pointer_leave();
        }
        ScriptStep::Drag { points } => {
            let mut points = points.iter().map(|[x, y]| ScreenPoint::new(*x, *y));
            if let Some(first) = points.next() {
                if let Some(sample) = session.pointer_down(first) {
                    report.samples.push(sample);
                }
                for point in points {
                    session.pointer_move(point);
                }
                session.pointer_up();
            }
        }
        ScriptStep::Undo => {
            session.undo();
        }
        ScriptStep::Redo => {
            session.redo();
        }
        ScriptStep::Clear => session.clear(),
        ScriptStep::Zoom { level } => session.set_zoom(*level),
        ScriptStep::ZoomIn => session.zoom_in(),
        ScriptStep::ZoomOut => session.zoom_out(),
        ScriptStep::ActualSize => session.set_actual_size(),
        ScriptStep::Pan { dx, dy } => session.pan_by(*dx, *dy),
        ScriptStep::Shortcut { key, ctrl, shift } => {
            let key = match parse_shortcut_key(key) {
                Ok(key) => key,
                Err(err) => {
                    tracing::warn!("skipping shortcut: {err}");
                    return Ok(());
                }
            };
            if let Some(ShortcutOutcome::Exported(path)) =
                session.apply_shortcut(key, ShortcutModifiers::new(*ctrl, *shift))?
            {
                report.exported.push(path);
            }
        }
        ScriptStep::Export => report.exported.push(session.export()?),
    }
    Ok(())
}
