use crate::consts::FEEDBACK_HISTORY_LIMIT;
use crate::context;
use crate::feedback::{FeedbackBus, FeedbackEvent};
use serde_json::json;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn scratch_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "charset-detector-rs-{}-{}",
        label,
        std::process::id()
    ))
}

#[test]
fn test_emit_normalizes_level_and_keeps_context_order() {
    let bus = FeedbackBus::new();
    let event = bus.emit(
        "warning",
        "probe:check",
        "something happened",
        context! { "first" => 1, "second" => "two" },
    );
    assert_eq!(event.level, "WARNING");
    assert_eq!(event.code, "probe:check");
    assert_eq!(event.context[0].0, "first");
    assert_eq!(event.context[1].0, "second");
}

#[test]
fn test_format_event() {
    let event = FeedbackEvent {
        timestamp: "2024-01-01T12:00:00.000".to_string(),
        level: "INFO".to_string(),
        code: "detect:final".to_string(),
        message: "Detection finished".to_string(),
        context: context! { "encoding" => "utf-8", "confidence" => 0.97 },
    };
    assert_eq!(
        FeedbackBus::format_event(&event),
        "2024-01-01T12:00:00.000 [INFO] detect:final: Detection finished | encoding=utf-8, confidence=0.97"
    );

    let bare = FeedbackEvent {
        context: vec![],
        ..event
    };
    assert_eq!(
        FeedbackBus::format_event(&bare),
        "2024-01-01T12:00:00.000 [INFO] detect:final: Detection finished",
        "Empty context should not leave a trailing separator"
    );
}

#[test]
fn test_history_is_bounded_drop_oldest() {
    let bus = FeedbackBus::new();
    for i in 0..FEEDBACK_HISTORY_LIMIT + 50 {
        bus.debug("history:tick", "tick", context! { "i" => i });
    }
    let history = bus.history();
    assert_eq!(history.len(), FEEDBACK_HISTORY_LIMIT);
    // Oldest events are gone, the first survivor is number 50.
    assert_eq!(history[0].context[0].1, json!(50));
    assert_eq!(
        history.last().unwrap().context[0].1,
        json!(FEEDBACK_HISTORY_LIMIT + 49)
    );
}

#[test]
fn test_subscribe_and_unsubscribe() {
    let bus = FeedbackBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = bus.subscribe(move |event| sink.lock().unwrap().push(event.code.clone()));

    bus.info("a:one", "first", context! {});
    bus.info("a:two", "second", context! {});
    bus.unsubscribe(subscription);
    bus.info("a:three", "third", context! {});

    assert_eq!(*seen.lock().unwrap(), vec!["a:one", "a:two"]);
}

#[test]
fn test_panicking_subscriber_is_isolated() {
    let bus = FeedbackBus::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let healthy = Arc::clone(&counter);

    bus.subscribe(|_event| panic!("subscriber exploded"));
    bus.subscribe(move |_event| {
        healthy.fetch_add(1, Ordering::SeqCst);
    });

    let event = bus.info("boom:test", "still alive", context! {});
    assert_eq!(event.code, "boom:test", "Emitter must not observe the panic");
    assert_eq!(
        counter.load(Ordering::SeqCst),
        1,
        "Second subscriber should still be notified"
    );

    bus.info("boom:again", "again", context! {});
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_file_sink_writes_lines_and_creates_parents() {
    let dir = scratch_dir("sink");
    let path = dir.join("nested").join("feedback.log");
    let bus = FeedbackBus::new();
    bus.set_file_sink(&path).expect("sink should open");

    bus.info("sink:one", "first line", context! { "n" => 1 });
    bus.info("sink:two", "second line", context! {});
    bus.disable_file_sink();
    bus.info("sink:three", "after close", context! {});

    let content = fs::read_to_string(&path).expect("sink file should exist");
    assert!(content.contains("sink:one"));
    assert!(content.contains("n=1"));
    assert!(content.contains("sink:two"));
    assert!(
        !content.contains("sink:three"),
        "Events after disable_file_sink must not be written"
    );
    assert_eq!(content.lines().count(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_file_sink_open_failure_is_propagated() {
    let dir = scratch_dir("sink-fail");
    fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let bus = FeedbackBus::new();
    let result = bus.set_file_sink(blocker.join("feedback.log"));
    assert!(result.is_err(), "Opening a sink under a file should fail");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_replacing_file_sink_switches_output() {
    let dir = scratch_dir("sink-replace");
    let first = dir.join("first.log");
    let second = dir.join("second.log");
    let bus = FeedbackBus::new();

    bus.set_file_sink(&first).unwrap();
    bus.info("replace:one", "to first", context! {});
    bus.set_file_sink(&second).unwrap();
    bus.info("replace:two", "to second", context! {});
    bus.close();

    let first_content = fs::read_to_string(&first).unwrap();
    let second_content = fs::read_to_string(&second).unwrap();
    assert!(first_content.contains("replace:one"));
    assert!(!first_content.contains("replace:two"));
    assert!(second_content.contains("replace:two"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_shared_handles_see_one_state() {
    let bus = FeedbackBus::new();
    let clone = bus.clone();
    clone.debug("clone:event", "emitted through clone", context! {});
    assert_eq!(bus.history().len(), 1);
    assert_eq!(bus.history()[0].code, "clone:event");
}
