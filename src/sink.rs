//! The host sink boundary.
//!
//! The [`ExecutionSink`] is the sole contact point between the core and any
//! rendering or console host. Core code never touches stdout or stderr;
//! only a host-side sink implementation may.

use std::io::Write;
use std::sync::Mutex;

use crate::object::Object;
use crate::unicode::{process, shape};

/// Abstract output channel for pipeline results and diagnostics.
///
/// Implementations must serialize concurrent writes: stages run in parallel
/// and write whenever their records are ready.
pub trait ExecutionSink: Send + Sync {
    fn write_object(&self, object: Object);
    fn write_error(&self, message: &str);
    fn write_warning(&self, message: &str);
    fn write_debug(&self, message: &str);
}

/// Terminal host sink: shapes and reorders text into visual order before
/// writing it.
///
/// This is the single place where visual order exists. Everything upstream
/// of the sink works in logical order.
#[derive(Default)]
pub struct ConsoleSink {
    stdout: Mutex<()>,
}

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical text to visual order, line by line.
    fn render(text: &str) -> String {
        text.lines()
            .map(|line| process(&shape(line), -1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ExecutionSink for ConsoleSink {
    fn write_object(&self, object: Object) {
        let rendered = Self::render(&object.to_display_string());
        let _guard = self.stdout.lock().expect("console sink lock");
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{rendered}");
    }

    fn write_error(&self, message: &str) {
        let rendered = Self::render(message);
        let _guard = self.stdout.lock().expect("console sink lock");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "error: {rendered}");
    }

    fn write_warning(&self, message: &str) {
        let rendered = Self::render(message);
        let _guard = self.stdout.lock().expect("console sink lock");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "warning: {rendered}");
    }

    fn write_debug(&self, message: &str) {
        let rendered = Self::render(message);
        let _guard = self.stdout.lock().expect("console sink lock");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "debug: {rendered}");
    }
}

/// In-memory sink used for subexpression evaluation.
///
/// Objects are collected for hand-off to the enclosing pipeline; errors and
/// warnings are kept so the caller can re-report them on the real sink.
#[derive(Default)]
pub struct BufferSink {
    objects: Mutex<Vec<Object>>,
    errors: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl BufferSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain collected objects.
    #[must_use]
    pub fn take_objects(&self) -> Vec<Object> {
        std::mem::take(&mut self.objects.lock().expect("buffer sink lock"))
    }

    #[must_use]
    pub fn take_errors(&self) -> Vec<String> {
        std::mem::take(&mut self.errors.lock().expect("buffer sink lock"))
    }

    #[must_use]
    pub fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut self.warnings.lock().expect("buffer sink lock"))
    }
}

impl ExecutionSink for BufferSink {
    fn write_object(&self, object: Object) {
        self.objects.lock().expect("buffer sink lock").push(object);
    }

    fn write_error(&self, message: &str) {
        self.errors
            .lock()
            .expect("buffer sink lock")
            .push(message.to_string());
    }

    fn write_warning(&self, message: &str) {
        self.warnings
            .lock()
            .expect("buffer sink lock")
            .push(message.to_string());
    }

    fn write_debug(&self, _message: &str) {}
}

/// Test sink: records every call in arrival order.
#[derive(Default)]
pub struct RecordingSink {
    objects: Mutex<Vec<Object>>,
    errors: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    debugs: Mutex<Vec<String>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn objects(&self) -> Vec<Object> {
        self.objects.lock().expect("recording sink lock").clone()
    }

    /// Display projections of the recorded objects.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.objects()
            .iter()
            .map(Object::to_display_string)
            .collect()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("recording sink lock").clone()
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("recording sink lock").clone()
    }

    #[must_use]
    pub fn debugs(&self) -> Vec<String> {
        self.debugs.lock().expect("recording sink lock").clone()
    }
}

impl ExecutionSink for RecordingSink {
    fn write_object(&self, object: Object) {
        self.objects.lock().expect("recording sink lock").push(object);
    }

    fn write_error(&self, message: &str) {
        self.errors
            .lock()
            .expect("recording sink lock")
            .push(message.to_string());
    }

    fn write_warning(&self, message: &str) {
        self.warnings
            .lock()
            .expect("recording sink lock")
            .push(message.to_string());
    }

    fn write_debug(&self, message: &str) {
        self.debugs
            .lock()
            .expect("recording sink lock")
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_collects_and_drains() {
        let sink = BufferSink::new();
        sink.write_object(Object::text("a"));
        sink.write_object(Object::text("b"));
        sink.write_error("oops");
        assert_eq!(
            sink.take_objects(),
            vec![Object::text("a"), Object::text("b")]
        );
        assert!(sink.take_objects().is_empty());
        assert_eq!(sink.take_errors(), vec!["oops".to_string()]);
    }

    #[test]
    fn recording_sink_keeps_all_streams() {
        let sink = RecordingSink::new();
        sink.write_object(Object::text("x"));
        sink.write_warning("w");
        sink.write_debug("d");
        assert_eq!(sink.lines(), vec!["x".to_string()]);
        assert_eq!(sink.warnings(), vec!["w".to_string()]);
        assert_eq!(sink.debugs(), vec!["d".to_string()]);
    }

    #[test]
    fn console_render_is_visual_order() {
        // Hebrew reverses; the ASCII prefix stays put.
        assert_eq!(
            ConsoleSink::render("id \u{05D0}\u{05D1}"),
            "id \u{05D1}\u{05D0}"
        );
    }

    #[test]
    fn sinks_are_object_safe() {
        fn accepts(_sink: &dyn ExecutionSink) {}
        accepts(&ConsoleSink::new());
        accepts(&BufferSink::new());
        accepts(&RecordingSink::new());
    }
}
