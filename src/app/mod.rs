//! Headless driver: builds an editor session from the user config and
//! replays a recorded script against it.

mod script;

use std::path::{Path, PathBuf};

pub use script::{
    load_script, parse_shortcut_key, replay, resolve_relative, ReplayReport, ScriptError,
    ScriptStep, ScriptedTextPrompt, SessionScript,
};

use crate::config::AppConfig;
use crate::editor::EditorSession;
use crate::error::AppResult;
use crate::notification::DesktopNotifier;
use crate::render::{FontBook, Renderer};
use crate::storage::ExportDirectory;

/// Per-run overrides supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub script: PathBuf,
    pub image: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Command-line directory, then the configured one, then `~/Pictures`.
    pub fn export_directory(&self, override_dir: Option<&Path>) -> AppResult<ExportDirectory> {
        if let Some(dir) = override_dir.or(self.config.export_dir.as_deref()) {
            return Ok(ExportDirectory::new(dir));
        }
        Ok(ExportDirectory::with_default_path()?)
    }

    pub fn build_session(
        &self,
        prompt: ScriptedTextPrompt,
        storage: ExportDirectory,
        notify: bool,
    ) -> EditorSession {
        let renderer = Renderer::new(FontBook::from_paths(&self.config.fonts));
        let session = EditorSession::new(renderer)
            .with_settings(self.config.defaults.clone())
            .with_pointer_leave_policy(self.config.pointer_leave)
            .with_text_prompt(prompt)
            .with_storage(storage);
        if notify && self.config.notifications {
            session.with_notifier(DesktopNotifier)
        } else {
            session
        }
    }

    /// Loads the script's image (or `options.image`) and replays its steps.
    pub fn run_script(
        &self,
        script: &SessionScript,
        script_dir: Option<&Path>,
        options: &RunOptions,
    ) -> AppResult<ReplayReport> {
        let storage = self.export_directory(options.output_dir.as_deref())?;
        let prompt = ScriptedTextPrompt::new();
        let mut session = self.build_session(prompt.clone(), storage, !options.quiet);
        if let Some(settings) = script.settings.clone() {
            session.set_settings(settings);
        }

        let image = options
            .image
            .clone()
            .or_else(|| script.image.as_ref().map(|path| resolve_relative(script_dir, path)));
        if let Some(path) = image {
            if !session.load_image_file(Some(&path)) {
                return Err(ScriptError::ImageLoad { path }.into());
            }
        }

        let report = replay(&mut session, &prompt, &script.steps, script_dir)?;
        tracing::info!(
            actions = session.actions().len(),
            exported = report.exported.len(),
            "script finished"
        );
        Ok(report)
    }

    pub fn run(&self, options: &RunOptions) -> AppResult<ReplayReport> {
        let script = load_script(&options.script)?;
        let script_dir = options.script.parent().filter(|dir| !dir.as_os_str().is_empty());
        self.run_script(&script, script_dir, options)
    }
}
