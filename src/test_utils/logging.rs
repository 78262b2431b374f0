//! Log capture for asserting on boundary-layer tracing events.

use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::prelude::*;

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Layer recording every event into shared storage.
struct CaptureLayer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

struct MessageVisitor<'a> {
    message: &'a mut String,
}

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{value:?}");
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut message = String::new();
        event.record(&mut MessageVisitor {
            message: &mut message,
        });

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message,
            });
        }
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<LogEntry>) {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        entries: Arc::clone(&entries),
    });

    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = entries.lock().map(|e| e.clone()).unwrap_or_default();
    (result, captured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_logs_records_level_and_message() {
        let (value, logs) = capture_logs(|| {
            tracing::warn!("disk is {}", "full");
            tracing::debug!(count = 3, "scanned");
            7
        });
        assert_eq!(value, 7);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].level, Level::WARN);
        assert_eq!(logs[0].message, "disk is full");
        assert_eq!(logs[1].message, "scanned");
    }
}
