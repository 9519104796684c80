//! The annotation session: base image, action log, view and gesture state.

pub mod history;
pub mod tools;

use std::fmt;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::geometry::{CanvasPoint, ScreenPoint, ViewState};
use crate::input::{
    resolve_shortcut, GestureMachine, InputContext, PointerDown, PointerLeavePolicy, PointerMove,
    ShortcutAction, ShortcutKey, ShortcutModifiers,
};
use crate::notification::{Notice, Notifier, NullNotifier};
use crate::ocr::{crop_region, sample_region_around, TextRegionDetector, TextSample};
use crate::render::{Renderer, Viewport};
use crate::storage::{ExportStorage, StorageError};

pub use history::ActionHistory;
pub use tools::{
    DrawAction, Shape, Stroke, TextPlacement, ToolKind, ToolSettings,
};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no image loaded")]
    NoImageLoaded,
    #[error("no export destination configured")]
    NoExportTarget,
    #[error("storage error while exporting: {source}")]
    Export {
        #[source]
        source: StorageError,
    },
}

/// Supplies the content of a text annotation placed at a canvas point.
pub trait TextPrompt {
    fn request_text(&mut self, at: CanvasPoint) -> Option<String>;
}

/// Prompt that never answers; text placement records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextPrompt;

impl TextPrompt for NoTextPrompt {
    fn request_text(&mut self, _at: CanvasPoint) -> Option<String> {
        None
    }
}

/// What a resolved shortcut did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutOutcome {
    Applied(ShortcutAction),
    Exported(PathBuf),
}

pub struct EditorSession {
    base: Option<RgbaImage>,
    history: ActionHistory,
    view: ViewState,
    gesture: GestureMachine,
    settings: ToolSettings,
    renderer: Renderer,
    pointer_leave: PointerLeavePolicy,
    redraw_requested: bool,
    notifier: Box<dyn Notifier>,
    text_prompt: Box<dyn TextPrompt>,
    detector: Option<Box<dyn TextRegionDetector>>,
    storage: Option<Box<dyn ExportStorage>>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("image", &self.base.as_ref().map(RgbaImage::dimensions))
            .field("actions", &self.history.len())
            .field("redo", &self.history.redo_buffer().len())
            .field("view", &self.view)
            .field("gesture", self.gesture.state())
            .field("settings", &self.settings)
            .field("pointer_leave", &self.pointer_leave)
            .finish_non_exhaustive()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Renderer::default())
    }
}

impl EditorSession {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            base: None,
            history: ActionHistory::new(),
            view: ViewState::new(),
            gesture: GestureMachine::new(),
            settings: ToolSettings::default(),
            renderer,
            pointer_leave: PointerLeavePolicy::default(),
            redraw_requested: false,
            notifier: Box::new(NullNotifier),
            text_prompt: Box::new(NoTextPrompt),
            detector: None,
            storage: None,
        }
    }

    pub fn with_settings(mut self, settings: ToolSettings) -> Self {
        self.settings = settings.sanitized();
        self
    }

    pub fn with_pointer_leave_policy(mut self, policy: PointerLeavePolicy) -> Self {
        self.pointer_leave = policy;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_text_prompt(mut self, prompt: impl TextPrompt + 'static) -> Self {
        self.text_prompt = Box::new(prompt);
        self
    }

    pub fn with_detector(mut self, detector: impl TextRegionDetector + 'static) -> Self {
        self.detector = Some(Box::new(detector));
        self
    }

    pub fn with_storage(mut self, storage: impl ExportStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn has_image(&self) -> bool {
        self.base.is_some()
    }

    pub fn base_image(&self) -> Option<&RgbaImage> {
        self.base.as_ref()
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn actions(&self) -> &[DrawAction] {
        self.history.actions()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings.sanitized();
    }

    /// Picker state is read fresh by every gesture call, so edits here apply
    /// to the next pointer-down.
    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        if self.settings.tool != tool {
            tracing::debug!(from = self.settings.tool.label(), to = tool.label(), "tool changed");
        }
        self.settings.tool = tool;
    }

    pub fn pointer_leave_policy(&self) -> PointerLeavePolicy {
        self.pointer_leave
    }

    /// Returns whether a redraw was requested since the last call and resets the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Replaces the base image and starts a fresh session on it. `None` or an
    /// empty raster leaves everything untouched.
    pub fn load_image(&mut self, image: Option<RgbaImage>) -> bool {
        let Some(image) = image else {
            tracing::debug!("no image supplied; keeping current session");
            return false;
        };
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            tracing::warn!("ignoring empty image");
            return false;
        }

        self.base = Some(image);
        self.history.clear();
        self.view = ViewState::new();
        self.gesture.cancel();
        self.request_redraw();
        tracing::info!(width, height, "image loaded");
        self.notifier.notify(Notice::ImageLoaded { width, height });
        true
    }

    pub fn load_image_file(&mut self, path: Option<&Path>) -> bool {
        let Some(path) = path else {
            return self.load_image(None);
        };
        match image::open(path) {
            Ok(decoded) => self.load_image(Some(decoded.to_rgba8())),
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to load image: {err}");
                false
            }
        }
    }

    /// Handles a pointer press. Only the select tool produces a value: the
    /// detected text under the pointer, if any.
    pub fn pointer_down(&mut self, screen: ScreenPoint) -> Option<TextSample> {
        if self.base.is_none() {
            tracing::debug!("pointer down ignored: no image loaded");
            return None;
        }
        if !self.gesture.is_idle() {
            self.pointer_up();
        }

        match self.gesture.pointer_down(screen, &self.view, &self.settings) {
            PointerDown::Drawing => {
                self.request_redraw();
                None
            }
            PointerDown::Panning => None,
            PointerDown::PlaceText(at) => {
                self.place_text(at);
                None
            }
            PointerDown::Sample(at) => self.sample_text(at),
        }
    }

    pub fn pointer_move(&mut self, screen: ScreenPoint) {
        match self.gesture.pointer_move(screen, &mut self.view) {
            PointerMove::Ignored => {}
            PointerMove::Preview | PointerMove::Panned { .. } => self.request_redraw(),
        }
    }

    /// Finishes the current gesture; true when an action was committed.
    pub fn pointer_up(&mut self) -> bool {
        let finished = self.gesture.pointer_up();
        self.finish_gesture(finished)
    }

    pub fn pointer_leave(&mut self) -> bool {
        let finished = self.gesture.pointer_leave(self.pointer_leave);
        self.finish_gesture(finished)
    }

    pub fn cancel_gesture(&mut self) {
        if self.gesture.in_progress().is_some() {
            self.request_redraw();
        }
        self.gesture.cancel();
    }

    fn finish_gesture(&mut self, finished: Option<DrawAction>) -> bool {
        match finished {
            Some(action) => self.commit(action),
            None => {
                // The preview of a discarded gesture must disappear.
                self.request_redraw();
                false
            }
        }
    }

    /// Appends a drawable action to the log and clears the redo buffer.
    pub fn commit(&mut self, action: DrawAction) -> bool {
        if !action.is_drawable() {
            tracing::debug!(tool = action.tool().label(), "refusing to commit empty action");
            return false;
        }
        tracing::debug!(
            tool = action.tool().label(),
            index = self.history.len(),
            "action committed"
        );
        self.history.commit(action);
        self.request_redraw();
        true
    }

    fn place_text(&mut self, at: CanvasPoint) {
        let Some(content) = self.text_prompt.request_text(at) else {
            tracing::debug!("text placement cancelled");
            return;
        };
        if content.is_empty() {
            tracing::debug!("empty text ignored");
            return;
        }
        let text = TextPlacement::new(
            self.settings.color,
            at,
            content,
            self.settings.font_size,
            self.settings.font_family.clone(),
        );
        self.commit(DrawAction::Text(text));
    }

    fn sample_text(&mut self, at: CanvasPoint) -> Option<TextSample> {
        let base = self.base.as_ref()?;
        let Some(region) = sample_region_around(at, base.width(), base.height()) else {
            tracing::debug!(x = at.x, y = at.y, "select outside image");
            return None;
        };
        let detector = match self.detector.as_mut() {
            Some(detector) => detector,
            None => {
                tracing::debug!("no text detector configured");
                return None;
            }
        };
        let composite = self.renderer.composite(base, self.history.actions());
        let sampled = match crop_region(&composite, region) {
            Ok(sampled) => sampled,
            Err(err) => {
                tracing::warn!("text sample failed: {err}");
                return None;
            }
        };
        match detector.detect(&sampled) {
            Ok(sample) => {
                tracing::debug!(text = %sample.text, "text detected");
                Some(sample)
            }
            Err(err) => {
                tracing::warn!("text detection failed: {err}");
                None
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        if self.history.undo() {
            tracing::debug!(remaining = self.history.len(), "undo applied");
            self.request_redraw();
            true
        } else {
            tracing::debug!("undo stack empty");
            self.notifier.notify(Notice::NothingToUndo);
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo() {
            tracing::debug!(actions = self.history.len(), "redo applied");
            self.request_redraw();
            true
        } else {
            tracing::debug!("redo stack empty");
            self.notifier.notify(Notice::NothingToRedo);
            false
        }
    }

    /// Drops every committed and undone action. The base image stays.
    pub fn clear(&mut self) {
        self.gesture.cancel();
        self.history.clear();
        self.request_redraw();
        tracing::info!("annotations cleared");
        self.notifier.notify(Notice::Cleared);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
        self.request_redraw();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
        self.request_redraw();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.set_zoom(zoom);
        self.request_redraw();
    }

    pub fn pan_by(&mut self, delta_x: f64, delta_y: f64) {
        self.view.pan_by(delta_x, delta_y);
        self.request_redraw();
    }

    pub fn set_actual_size(&mut self) {
        self.view.set_actual_size();
        self.request_redraw();
    }

    /// On-screen frame: committed log plus the gesture preview through the view transform.
    pub fn render_frame(&self, viewport: Viewport) -> RgbaImage {
        match self.base.as_ref() {
            Some(base) => self.renderer.render_view(
                base,
                self.history.actions(),
                self.gesture.in_progress(),
                &self.view,
                viewport,
            ),
            None => RgbaImage::from_pixel(viewport.width, viewport.height, Rgba([0, 0, 0, 0])),
        }
    }

    /// Base image plus committed actions at native resolution.
    pub fn export_image(&self) -> Result<RgbaImage, EditorError> {
        let base = self.base.as_ref().ok_or(EditorError::NoImageLoaded)?;
        Ok(self.renderer.composite(base, self.history.actions()))
    }

    pub fn export_to(&mut self, storage: &dyn ExportStorage) -> Result<PathBuf, EditorError> {
        let image = self.export_image()?;
        let path = storage
            .save_export(&image)
            .map_err(|source| EditorError::Export { source })?;
        self.notifier.notify(Notice::Exported { path: path.clone() });
        Ok(path)
    }

    /// Exports through the storage attached with [`Self::with_storage`].
    pub fn export(&mut self) -> Result<PathBuf, EditorError> {
        let storage = self.storage.take().ok_or(EditorError::NoExportTarget)?;
        let result = self.export_to(&*storage);
        self.storage = Some(storage);
        result
    }

    pub fn apply_shortcut(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
    ) -> Result<Option<ShortcutOutcome>, EditorError> {
        let context = InputContext {
            gesture_active: !self.gesture.is_idle(),
            has_image: self.has_image(),
        };
        let Some(action) = resolve_shortcut(key, modifiers, context) else {
            return Ok(None);
        };
        tracing::debug!(?action, "shortcut");
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::ClearAll => self.clear(),
            ShortcutAction::Export => {
                let path = self.export()?;
                return Ok(Some(ShortcutOutcome::Exported(path)));
            }
            ShortcutAction::CancelGesture => self.cancel_gesture(),
            ShortcutAction::SelectTool(tool) => self.select_tool(tool),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ActualSize => self.set_actual_size(),
        }
        Ok(Some(ShortcutOutcome::Applied(action)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::ocr::{FontMetadata, OcrError, OcrResult};
    use crate::storage::StorageResult;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        notices: Rc<RefCell<Vec<Notice>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notice: Notice) {
            self.notices.borrow_mut().push(notice);
        }
    }

    struct QueuedPrompt {
        answers: VecDeque<Option<String>>,
    }

    impl TextPrompt for QueuedPrompt {
        fn request_text(&mut self, _at: CanvasPoint) -> Option<String> {
            self.answers.pop_front().flatten()
        }
    }

    #[derive(Clone, Default)]
    struct FakeDetector {
        regions: Rc<RefCell<Vec<(u32, u32)>>>,
        fail: bool,
    }

    impl TextRegionDetector for FakeDetector {
        fn detect(&mut self, region: &RgbaImage) -> OcrResult<TextSample> {
            self.regions.borrow_mut().push(region.dimensions());
            if self.fail {
                return Err(OcrError::Recognition {
                    message: "no text".to_string(),
                });
            }
            Ok(TextSample {
                text: "Hello".to_string(),
                font: FontMetadata {
                    family: Some("Inter".to_string()),
                    size_px: Some(14.0),
                    weight: Some(400),
                    color: Some("#000000".to_string()),
                },
            })
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        saved: RefCell<Vec<RgbaImage>>,
    }

    impl ExportStorage for MemoryStorage {
        fn save_export(&self, image: &RgbaImage) -> StorageResult<PathBuf> {
            let mut saved = self.saved.borrow_mut();
            saved.push(image.clone());
            Ok(PathBuf::from(format!("/memory/export-{}.png", saved.len())))
        }
    }

    fn session_with_image(width: u32, height: u32) -> EditorSession {
        let mut session = EditorSession::default();
        assert!(session.load_image(Some(RgbaImage::from_pixel(width, height, WHITE))));
        session
    }

    fn drag(session: &mut EditorSession, points: &[(f64, f64)]) -> bool {
        let (first, rest) = points.split_first().expect("at least one point");
        session.pointer_down(ScreenPoint::new(first.0, first.1));
        for &(x, y) in rest {
            session.pointer_move(ScreenPoint::new(x, y));
        }
        session.pointer_up()
    }

    #[test]
    fn pen_stroke_commits_once_and_undo_redo_round_trips() {
        let mut session = session_with_image(100, 100);
        session.settings_mut().color = Color::new(0, 0, 0);

        assert!(drag(&mut session, &[(10.0, 10.0), (20.0, 20.0), (30.0, 10.0)]));

        assert_eq!(session.actions().len(), 1);
        let committed = session.actions()[0].clone();
        let stroke = committed.as_stroke().expect("pen stroke");
        assert_eq!(committed.tool(), ToolKind::Pen);
        assert_eq!(
            stroke.points,
            vec![
                CanvasPoint::new(10.0, 10.0),
                CanvasPoint::new(20.0, 20.0),
                CanvasPoint::new(30.0, 10.0)
            ]
        );

        assert!(session.undo());
        assert!(session.actions().is_empty());
        assert_eq!(session.history().redo_buffer(), &[committed.clone()]);

        assert!(session.redo());
        assert_eq!(session.actions(), &[committed]);
        assert!(session.history().redo_buffer().is_empty());
    }

    #[test]
    fn rectangle_drawn_while_zoomed_exports_at_native_coordinates() {
        let mut session = session_with_image(100, 60);
        *session.settings_mut() = ToolSettings {
            tool: ToolKind::Rectangle,
            color: Color::new(0, 0, 255),
            line_width: 2.0,
            ..ToolSettings::default()
        };
        session.set_zoom(2.0);

        assert!(drag(&mut session, &[(20.0, 20.0), (60.0, 40.0), (100.0, 60.0)]));

        let shape = *session.actions()[0].as_shape().expect("shape");
        assert_eq!(shape.origin, CanvasPoint::new(10.0, 10.0));
        assert_eq!((shape.width, shape.height), (40.0, 20.0));

        let exported = session.export_image().expect("export");
        assert_eq!(exported.dimensions(), (100, 60));
        assert_eq!(*exported.get_pixel(10, 20), Rgba([0, 0, 255, 255]));
        assert_eq!(*exported.get_pixel(30, 20), WHITE);

        session.set_zoom(0.5);
        session.pan_by(37.0, -12.0);
        assert_eq!(session.export_image().expect("export"), exported);
    }

    #[test]
    fn eraser_leaves_transparent_pixels() {
        let mut session = session_with_image(40, 20);
        *session.settings_mut() = ToolSettings {
            tool: ToolKind::Eraser,
            line_width: 10.0,
            ..ToolSettings::default()
        };

        assert!(drag(&mut session, &[(10.0, 10.0), (30.0, 10.0)]));

        let exported = session.export_image().expect("export");
        assert_eq!(exported.get_pixel(20, 10)[3], 0);
        assert_eq!(*exported.get_pixel(20, 1), WHITE);
    }

    #[test]
    fn export_without_image_is_refused() {
        let mut session = EditorSession::default().with_storage(MemoryStorage::default());
        assert!(matches!(session.export_image(), Err(EditorError::NoImageLoaded)));
        assert!(matches!(session.export(), Err(EditorError::NoImageLoaded)));
    }

    #[test]
    fn export_without_storage_is_refused() {
        let mut session = session_with_image(4, 4);
        assert!(matches!(session.export(), Err(EditorError::NoExportTarget)));
    }

    #[test]
    fn export_saves_composite_and_notifies() {
        let notifier = RecordingNotifier::default();
        let notices = notifier.notices.clone();
        let mut session = EditorSession::default()
            .with_notifier(notifier)
            .with_storage(MemoryStorage::default());
        session.load_image(Some(RgbaImage::from_pixel(8, 8, WHITE)));

        let path = session.export().expect("export");
        assert_eq!(path, PathBuf::from("/memory/export-1.png"));
        assert_eq!(
            notices.borrow().last(),
            Some(&Notice::Exported {
                path: PathBuf::from("/memory/export-1.png")
            })
        );
    }

    #[test]
    fn invalid_load_is_a_no_op() {
        let mut session = session_with_image(20, 20);
        assert!(drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]));
        session.zoom_in();
        let view = *session.view();

        let bogus = std::env::temp_dir().join("smartkit-annotate-not-an-image.png");
        std::fs::write(&bogus, b"garbage").expect("write temp file");
        assert!(!session.load_image_file(Some(&bogus)));
        let _ = std::fs::remove_file(&bogus);

        assert!(!session.load_image_file(None));
        assert!(!session.load_image(None));
        assert!(!session.load_image(Some(RgbaImage::new(0, 0))));

        assert_eq!(session.actions().len(), 1);
        assert_eq!(*session.view(), view);
        assert_eq!(session.base_image().map(RgbaImage::dimensions), Some((20, 20)));
    }

    #[test]
    fn loading_a_new_image_resets_the_session() {
        let mut session = session_with_image(20, 20);
        assert!(drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]));
        assert!(drag(&mut session, &[(2.0, 8.0), (9.0, 8.0)]));
        session.undo();
        session.zoom_in();
        session.pointer_down(ScreenPoint::new(3.0, 3.0));

        assert!(session.load_image(Some(RgbaImage::from_pixel(30, 10, WHITE))));
        assert!(session.actions().is_empty());
        assert!(session.history().redo_buffer().is_empty());
        assert_eq!(*session.view(), ViewState::new());
        assert!(session.gesture().is_idle());
    }

    #[test]
    fn new_commit_clears_redo_buffer() {
        let mut session = session_with_image(20, 20);
        assert!(drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]));
        assert!(drag(&mut session, &[(2.0, 8.0), (9.0, 8.0)]));
        assert!(session.undo());
        assert!(session.history().can_redo());

        assert!(drag(&mut session, &[(3.0, 3.0), (4.0, 9.0)]));
        assert!(!session.history().can_redo());
        assert!(!session.redo());
        assert_eq!(session.actions().len(), 2);
    }

    #[test]
    fn exhausted_undo_and_redo_notify() {
        let notifier = RecordingNotifier::default();
        let notices = notifier.notices.clone();
        let mut session = EditorSession::default().with_notifier(notifier);

        assert!(!session.undo());
        assert!(!session.redo());
        assert_eq!(
            *notices.borrow(),
            vec![Notice::NothingToUndo, Notice::NothingToRedo]
        );
    }

    #[test]
    fn text_tool_commits_prompted_text_only_when_non_empty() {
        let mut session = EditorSession::default().with_text_prompt(QueuedPrompt {
            answers: VecDeque::from([Some("Hi".to_string()), Some(String::new()), None]),
        });
        session.load_image(Some(RgbaImage::from_pixel(50, 50, WHITE)));
        session.settings_mut().tool = ToolKind::Text;
        session.settings_mut().font_size = 18.0;

        session.pointer_down(ScreenPoint::new(12.0, 30.0));
        session.pointer_down(ScreenPoint::new(20.0, 30.0));
        session.pointer_down(ScreenPoint::new(25.0, 30.0));

        assert_eq!(session.actions().len(), 1);
        let text = session.actions()[0].as_text().expect("text action");
        assert_eq!(text.content, "Hi");
        assert_eq!(text.origin, CanvasPoint::new(12.0, 30.0));
        assert_eq!(text.font_size, 18.0);
        assert!(session.gesture().is_idle());
    }

    #[test]
    fn select_tool_samples_without_mutating_the_log() {
        let detector = FakeDetector::default();
        let regions = detector.regions.clone();
        let mut session = EditorSession::default().with_detector(detector);
        session.load_image(Some(RgbaImage::from_pixel(300, 200, WHITE)));
        assert!(drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]));
        let before = session.history().clone();

        session.select_tool(ToolKind::Select);
        let sample = session.pointer_down(ScreenPoint::new(150.0, 100.0));
        session.pointer_up();

        assert_eq!(sample.map(|sample| sample.text), Some("Hello".to_string()));
        assert_eq!(*regions.borrow(), vec![(160, 48)]);
        assert_eq!(*session.history(), before);
    }

    #[test]
    fn select_tool_without_detector_or_on_failure_returns_nothing() {
        let mut session = session_with_image(50, 50);
        session.select_tool(ToolKind::Select);
        assert!(session.pointer_down(ScreenPoint::new(10.0, 10.0)).is_none());

        let mut failing = EditorSession::default().with_detector(FakeDetector {
            fail: true,
            ..FakeDetector::default()
        });
        failing.load_image(Some(RgbaImage::from_pixel(50, 50, WHITE)));
        failing.select_tool(ToolKind::Select);
        assert!(failing.pointer_down(ScreenPoint::new(10.0, 10.0)).is_none());
        assert!(failing.actions().is_empty());
    }

    #[test]
    fn pointer_leave_follows_configured_policy() {
        let mut committing = session_with_image(20, 20);
        committing.pointer_down(ScreenPoint::new(1.0, 1.0));
        committing.pointer_move(ScreenPoint::new(6.0, 6.0));
        assert!(committing.pointer_leave());
        assert_eq!(committing.actions().len(), 1);

        let mut discarding = EditorSession::default()
            .with_pointer_leave_policy(PointerLeavePolicy::Discard);
        discarding.load_image(Some(RgbaImage::from_pixel(20, 20, WHITE)));
        discarding.pointer_down(ScreenPoint::new(1.0, 1.0));
        discarding.pointer_move(ScreenPoint::new(6.0, 6.0));
        assert!(!discarding.pointer_leave());
        assert!(discarding.actions().is_empty());
        assert!(discarding.gesture().is_idle());
    }

    #[test]
    fn pointer_down_during_gesture_finishes_it_first() {
        let mut session = session_with_image(20, 20);
        session.pointer_down(ScreenPoint::new(1.0, 1.0));
        session.pointer_move(ScreenPoint::new(8.0, 8.0));
        session.pointer_down(ScreenPoint::new(10.0, 10.0));

        assert_eq!(session.actions().len(), 1);
        assert!(session.gesture().in_progress().is_some());
    }

    #[test]
    fn zero_length_gestures_are_discarded() {
        let mut session = session_with_image(20, 20);
        assert!(!drag(&mut session, &[(4.0, 4.0), (4.0, 4.0)]));

        session.select_tool(ToolKind::Circle);
        assert!(!drag(&mut session, &[(4.0, 4.0)]));
        assert!(session.actions().is_empty());
    }

    #[test]
    fn non_positive_sizes_never_reach_the_log() {
        let mut session = EditorSession::default().with_settings(ToolSettings {
            line_width: -4.0,
            font_size: 0.0,
            ..ToolSettings::default()
        });
        assert!(session.settings().line_width > 0.0);
        assert!(session.settings().font_size > 0.0);

        session.load_image(Some(RgbaImage::from_pixel(40, 40, WHITE)));
        session.settings_mut().line_width = 0.0;
        assert!(!drag(&mut session, &[(1.0, 1.0), (30.0, 30.0)]));
        assert!(session.actions().is_empty());
        assert!(!session.history().can_undo());
    }

    #[test]
    fn pointer_input_without_image_is_ignored() {
        let mut session = EditorSession::default();
        assert!(session.pointer_down(ScreenPoint::new(1.0, 1.0)).is_none());
        session.pointer_move(ScreenPoint::new(5.0, 5.0));
        assert!(!session.pointer_up());
        assert!(session.actions().is_empty());
    }

    #[test]
    fn panning_moves_view_without_touching_the_log() {
        let mut session = session_with_image(20, 20);
        session.select_tool(ToolKind::Move);
        assert!(!drag(&mut session, &[(10.0, 10.0), (15.0, 4.0)]));

        assert!(session.actions().is_empty());
        assert_eq!(session.view().pan(), ScreenPoint::new(5.0, -6.0));
    }

    #[test]
    fn preview_shows_in_frame_but_not_in_export() {
        let mut session = session_with_image(20, 20);
        session.settings_mut().color = Color::new(0, 0, 0);
        session.settings_mut().line_width = 4.0;
        session.pointer_down(ScreenPoint::new(2.0, 10.0));
        session.pointer_move(ScreenPoint::new(18.0, 10.0));

        assert!(session.take_redraw_request());
        assert!(!session.take_redraw_request());

        let frame = session.render_frame(Viewport::new(20, 20));
        assert_eq!(*frame.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
        assert_eq!(*session.export_image().expect("export").get_pixel(10, 10), WHITE);
    }

    #[test]
    fn frame_without_image_is_transparent() {
        let session = EditorSession::default();
        let frame = session.render_frame(Viewport::new(3, 2));
        assert!(frame.pixels().all(|pixel| pixel[3] == 0));
    }

    #[test]
    fn clear_empties_log_and_redo_and_notifies() {
        let notifier = RecordingNotifier::default();
        let notices = notifier.notices.clone();
        let mut session = EditorSession::default().with_notifier(notifier);
        session.load_image(Some(RgbaImage::from_pixel(20, 20, WHITE)));
        assert!(drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]));
        assert!(drag(&mut session, &[(2.0, 8.0), (9.0, 8.0)]));
        session.undo();

        session.clear();
        assert!(session.actions().is_empty());
        assert!(session.history().redo_buffer().is_empty());
        assert!(session.has_image());
        assert_eq!(notices.borrow().last(), Some(&Notice::Cleared));
    }

    #[test]
    fn shortcuts_drive_the_session() {
        let mut session = session_with_image(20, 20).with_storage(MemoryStorage::default());
        assert!(drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]));
        let ctrl = ShortcutModifiers::new(true, false);

        let undone = session
            .apply_shortcut(ShortcutKey::Character('z'), ctrl)
            .expect("shortcut");
        assert_eq!(undone, Some(ShortcutOutcome::Applied(ShortcutAction::Undo)));
        assert!(session.actions().is_empty());

        session
            .apply_shortcut(ShortcutKey::Character('y'), ctrl)
            .expect("shortcut");
        assert_eq!(session.actions().len(), 1);

        session
            .apply_shortcut(ShortcutKey::Character('r'), ShortcutModifiers::default())
            .expect("shortcut");
        assert_eq!(session.settings().tool, ToolKind::Rectangle);

        let exported = session
            .apply_shortcut(ShortcutKey::Character('s'), ctrl)
            .expect("shortcut");
        assert_eq!(
            exported,
            Some(ShortcutOutcome::Exported(PathBuf::from("/memory/export-1.png")))
        );
    }

    #[test]
    fn escape_cancels_gesture_without_committing() {
        let mut session = session_with_image(20, 20);
        session.pointer_down(ScreenPoint::new(1.0, 1.0));
        session.pointer_move(ScreenPoint::new(8.0, 8.0));

        let outcome = session
            .apply_shortcut(ShortcutKey::Escape, ShortcutModifiers::default())
            .expect("shortcut");
        assert_eq!(
            outcome,
            Some(ShortcutOutcome::Applied(ShortcutAction::CancelGesture))
        );
        assert!(session.gesture().is_idle());
        assert!(!session.pointer_up());
        assert!(session.actions().is_empty());
    }
}
