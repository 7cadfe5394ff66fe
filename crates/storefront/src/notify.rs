//! User-facing notifications ("toasts").
//!
//! The storefront never renders anything itself. Components that need to tell
//! the shopper something (mostly the API client on failure) hand a [`Toast`]
//! to a [`Notifier`]; the front end decides how to show it.

use std::sync::{Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A short message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    /// Error toast.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    /// Success toast.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    /// Show (or queue) a notification. Must not block.
    fn notify(&self, toast: Toast);
}

/// Notifier that writes every toast to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => tracing::error!(toast = %toast.message, "notification"),
            ToastLevel::Warning => tracing::warn!(toast = %toast.message, "notification"),
            ToastLevel::Success | ToastLevel::Info => {
                tracing::info!(toast = %toast.message, "notification");
            }
        }
    }
}

/// Notifier that keeps every toast in memory, for front ends that poll and
/// for tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything received so far.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of everything received so far.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_drain() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Toast::error("Erro no servidor"));
        notifier.notify(Toast::success("Pedido realizado"));

        assert_eq!(notifier.toasts().len(), 2);
        let drained = notifier.drain();
        assert_eq!(drained[0].level, ToastLevel::Error);
        assert_eq!(drained[1].message, "Pedido realizado");
        assert!(notifier.toasts().is_empty());
    }
}
