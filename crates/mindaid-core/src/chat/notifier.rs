//! User-facing error notification.

/// Shows a failure to the user (toast, banner, stderr line).
///
/// Called at most once per failed stream.
pub trait ErrorNotifier: Send + Sync {
    fn notify_error(&self, message: &str);
}
