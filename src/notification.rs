use std::path::PathBuf;

/// User-facing feedback emitted by the editor. Delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ImageLoaded { width: u32, height: u32 },
    Cleared,
    Exported { path: PathBuf },
    NothingToUndo,
    NothingToRedo,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::ImageLoaded { width, height } => format!("Image loaded ({width}x{height})"),
            Self::Cleared => "All annotations cleared".to_string(),
            Self::Exported { path } => format!("Image saved to {}", path.display()),
            Self::NothingToUndo => "Nothing to undo".to_string(),
            Self::NothingToRedo => "Nothing to redo".to_string(),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, notice: Notice) {
        tracing::debug!(message = %notice.message(), "notification suppressed");
    }
}

/// Desktop toast through the session notification daemon.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&mut self, notice: Notice) {
        send(notice.message());
    }
}

pub fn send(body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname("SmartKit")
        .summary("Screenshot Editor")
        .body(&body)
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}
