pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod notification;
pub mod ocr;
pub mod render;
pub mod storage;
pub use app::{ReplayReport, RunOptions};
pub use error::{AppError, AppResult};

/// Entrypoint used by the CLI binding.
pub fn run(options: RunOptions) -> AppResult<ReplayReport> {
    logging::init(options.quiet);
    tracing::info!(script = %options.script.display(), "starting SmartKit annotate");

    let config = match options.config.as_deref() {
        Some(path) => config::read_app_config(path)?,
        None => config::load_app_config(),
    };
    let app = app::App::new(config);
    let report = app.run(&options)?;

    tracing::info!(exported = report.exported.len(), "session complete");
    Ok(report)
}
