use crate::consts::FEEDBACK_HISTORY_LIMIT;
use chrono::Local;
use log::warn;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{LineWriter, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Build the context list of a feedback event from `"key" => value` pairs.
/// Values may be anything `serde_json::json!` accepts as a scalar.
#[macro_export]
macro_rules! context {
    () => { ::std::vec::Vec::new() };
    ($($key:literal => $value:expr),+ $(,)?) => {
        vec![$(($key, ::serde_json::json!($value))),+]
    };
}

/////////////////////////////////////////////////////////////////////////////////////
// FeedbackEvent
/////////////////////////////////////////////////////////////////////////////////////

/// One structured event on the bus. `context` keeps insertion order so the
/// rendered line is stable.
#[derive(Debug, Clone)]
pub struct FeedbackEvent {
    /// ISO-8601 local timestamp with millisecond precision.
    pub timestamp: String,
    /// Upper-cased severity (DEBUG, INFO, WARNING, ERROR or caller-defined).
    pub level: String,
    /// Stable machine-readable code, e.g. `detect:final`.
    pub code: String,
    pub message: String,
    pub context: Vec<(&'static str, Value)>,
}

/// Handle returned by [`FeedbackBus::subscribe`]; pass it back to
/// [`FeedbackBus::unsubscribe`] to detach the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Callback = Arc<dyn Fn(&FeedbackEvent) + Send + Sync>;

struct BusState {
    subscribers: Vec<(u64, Callback)>,
    next_subscription: u64,
    history: VecDeque<FeedbackEvent>,
    console_enabled: bool,
    file_path: Option<PathBuf>,
    file_sink: Option<LineWriter<fs::File>>,
}

/////////////////////////////////////////////////////////////////////////////////////
// FeedbackBus
/////////////////////////////////////////////////////////////////////////////////////

/// Shared observability channel for the detector.
///
/// Cloning the bus produces another handle onto the same state, so a caller
/// can keep one handle for subscriptions while a [`crate::Detector`] owns
/// another. A single mutex covers the subscriber list, the bounded history
/// ring and both sinks; subscriber callbacks run outside the lock and a
/// panicking subscriber is logged and ignored, never affecting the others or
/// the emitting caller.
#[derive(Clone)]
pub struct FeedbackBus {
    state: Arc<Mutex<BusState>>,
}

impl Default for FeedbackBus {
    fn default() -> Self {
        FeedbackBus::new()
    }
}

impl fmt::Debug for FeedbackBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FeedbackBus")
    }
}

impl FeedbackBus {
    pub fn new() -> Self {
        FeedbackBus {
            state: Arc::new(Mutex::new(BusState {
                subscribers: vec![],
                next_subscription: 0,
                history: VecDeque::with_capacity(FEEDBACK_HISTORY_LIMIT),
                console_enabled: false,
                file_path: None,
                file_sink: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        // Subscribers run outside the lock, so a poisoned mutex only means an
        // emitter died mid-update; the state is still a consistent ring.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach a callback invoked for every emitted event.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FeedbackEvent) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.subscribers.push((id, Arc::new(callback)));
        Subscription(id)
    }

    /// Detach a previously subscribed callback. Unknown handles are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut state = self.lock();
        state.subscribers.retain(|(id, _)| *id != subscription.0);
    }

    pub fn enable_console(&self, enabled: bool) {
        self.lock().console_enabled = enabled;
    }

    /// Open a line-buffered file sink in append mode, creating parent
    /// directories as needed. Replaces (and closes) any previous sink.
    pub fn set_file_sink<P: AsRef<Path>>(&self, file_path: P) -> Result<(), String> {
        let path = file_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating feedback sink directory: {e}"))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Error opening feedback sink: {e}"))?;
        let mut state = self.lock();
        state.file_sink = Some(LineWriter::new(file));
        state.file_path = Some(path);
        Ok(())
    }

    pub fn disable_file_sink(&self) {
        let mut state = self.lock();
        state.file_sink = None;
        state.file_path = None;
    }

    pub fn file_sink_path(&self) -> Option<PathBuf> {
        self.lock().file_path.clone()
    }

    /// Emit one event: record it in the history ring, write the configured
    /// sinks, then notify subscribers outside the lock.
    pub fn emit(
        &self,
        level: &str,
        code: &str,
        message: &str,
        context: Vec<(&'static str, Value)>,
    ) -> FeedbackEvent {
        let event = FeedbackEvent {
            timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            level: level.to_uppercase(),
            code: code.to_string(),
            message: message.to_string(),
            context,
        };

        let callbacks: Vec<Callback> = {
            let mut state = self.lock();
            state.history.push_back(event.clone());
            if state.history.len() > FEEDBACK_HISTORY_LIMIT {
                state.history.pop_front();
            }

            let line = FeedbackBus::format_event(&event);
            if state.console_enabled {
                println!("{line}");
            }
            if let Some(sink) = state.file_sink.as_mut() {
                if writeln!(sink, "{line}").is_err() {
                    warn!("feedback file sink write failed, disabling sink");
                    state.file_sink = None;
                    state.file_path = None;
                }
            }
            state
                .subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                warn!("feedback subscriber panicked on event {}", event.code);
            }
        }
        event
    }

    pub fn debug(&self, code: &str, message: &str, context: Vec<(&'static str, Value)>) -> FeedbackEvent {
        self.emit("DEBUG", code, message, context)
    }

    pub fn info(&self, code: &str, message: &str, context: Vec<(&'static str, Value)>) -> FeedbackEvent {
        self.emit("INFO", code, message, context)
    }

    pub fn warning(&self, code: &str, message: &str, context: Vec<(&'static str, Value)>) -> FeedbackEvent {
        self.emit("WARNING", code, message, context)
    }

    pub fn error(&self, code: &str, message: &str, context: Vec<(&'static str, Value)>) -> FeedbackEvent {
        self.emit("ERROR", code, message, context)
    }

    /// Snapshot of the bounded history ring, oldest first.
    pub fn history(&self) -> Vec<FeedbackEvent> {
        self.lock().history.iter().cloned().collect()
    }

    /// Shut the bus down: closes the file sink. Subscribers and history stay
    /// intact so late readers can still inspect what happened.
    pub fn close(&self) {
        self.disable_file_sink();
    }

    /// Render an event in the line form used by the console and file sinks:
    /// `<timestamp> [<LEVEL>] <code>: <message> | k1=v1, k2=v2`.
    pub fn format_event(event: &FeedbackEvent) -> String {
        let mut line = format!(
            "{} [{}] {}: {}",
            event.timestamp, event.level, event.code, event.message
        );
        if !event.context.is_empty() {
            line.push_str(" | ");
            for (index, (key, value)) in event.context.iter().enumerate() {
                if index > 0 {
                    line.push_str(", ");
                }
                match value {
                    // Strings render bare, without JSON quoting.
                    Value::String(text) => {
                        let _ = write!(line, "{key}={text}");
                    }
                    other => {
                        let _ = write!(line, "{key}={other}");
                    }
                }
            }
        }
        line
    }
}
