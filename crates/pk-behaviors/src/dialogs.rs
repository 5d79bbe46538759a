//! User-facing dialogs raised by page behaviors.

/// Host surface for blocking notices (`window.alert` in a browser).
pub trait Dialogs {
    fn alert(&mut self, message: &str);
}

/// Keeps every alert in order. Used by tests and headless runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingDialogs {
    pub alerts: Vec<String>,
}

impl Dialogs for RecordingDialogs {
    fn alert(&mut self, message: &str) {
        tracing::info!(message, "alert");
        self.alerts.push(message.to_owned());
    }
}
