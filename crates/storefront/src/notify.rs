//! User-facing error notifications.
//!
//! Failed cart mutations end up here with a short, non-technical message.
//! A web front end would render these as toasts; the CLI prints them.

use std::sync::{Mutex, PoisonError};

/// Receiver for messages the shopper should see.
pub trait ErrorSink: Send + Sync {
    /// Show an error message.
    fn error(&self, message: &str);
}

/// Sink that logs the message and leaves a Sentry breadcrumb.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::warn!(message, "User-facing cart error");
        crate::error::add_breadcrumb("cart", message, None);
    }
}

/// Sink that keeps every message, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ErrorSink for RecordingSink {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.error("first");
        sink.error("second");
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.error("Could not clear cart. Please try again.");
    }
}
