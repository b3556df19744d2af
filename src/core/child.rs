//! Child loggers
//!
//! A child borrows its parent and carries only an extra context. Every call
//! merges the child's context under the call's own context and hands the
//! result to the parent, so the parent's configuration and sinks are always
//! the ones in force.

use super::log_context::{merge_context, LogContext};
use super::log_level::LogLevel;
use super::logger::Log;
use serde_json::Value;
use std::fmt;

/// Logger that adds a fixed context to every record
///
/// # Examples
///
/// ```
/// use cc_logger::prelude::*;
/// use cc_logger::appenders::BufferTerminal;
/// use serde_json::json;
///
/// let screen = BufferTerminal::new();
/// let logger = Logger::builder().terminal(screen.clone()).build().unwrap();
///
/// let request = logger.child(LogContext::new().with_field("request_id", "xyz"));
/// let user = request.child(LogContext::new().with_field("user", "bob"));
/// user.info(&[json!("ok")]);
///
/// assert!(screen.lines()[0].ends_with("[request_id=xyz,user=bob] ok"));
/// ```
pub struct ChildLogger<'a> {
    parent: &'a dyn Log,
    context: LogContext,
}

impl<'a> ChildLogger<'a> {
    pub fn new(parent: &'a dyn Log, context: LogContext) -> Self {
        Self { parent, context }
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }
}

impl Log for ChildLogger<'_> {
    fn log_with_context(&self, level: LogLevel, context: Option<&LogContext>, args: &[Value]) {
        if !self.parent.is_enabled(level) {
            return;
        }
        let merged = merge_context(Some(&self.context), context);
        self.parent.log_with_context(level, merged.as_ref(), args);
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        self.parent.is_enabled(level)
    }
}

impl fmt::Debug for ChildLogger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildLogger")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Records what reaches the root
    struct Recorder {
        threshold: LogLevel,
        calls: Mutex<Vec<(LogLevel, Option<LogContext>, Vec<Value>)>>,
    }

    impl Recorder {
        fn new(threshold: LogLevel) -> Self {
            Self {
                threshold,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Log for Recorder {
        fn log_with_context(&self, level: LogLevel, context: Option<&LogContext>, args: &[Value]) {
            self.calls.lock().push((level, context.cloned(), args.to_vec()));
        }

        fn is_enabled(&self, level: LogLevel) -> bool {
            level.is_enabled_at(self.threshold)
        }
    }

    #[test]
    fn test_child_adds_context() {
        let root = Recorder::new(LogLevel::Trace);
        let child = root.child(LogContext::new().with_field("job", "dig"));

        child.info(&[json!("started")]);

        let calls = root.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.as_ref().unwrap().get("job"), Some(&json!("dig")));
        assert_eq!(calls[0].2, vec![json!("started")]);
    }

    #[test]
    fn test_call_context_wins() {
        let root = Recorder::new(LogLevel::Trace);
        let child = root.child(LogContext::new().with_field("user", "bob").with_field("step", 1));

        child.info_with_context(&LogContext::new().with_field("step", 2), &[json!("next")]);

        let calls = root.calls.lock();
        let ctx = calls[0].1.as_ref().unwrap();
        assert_eq!(ctx.get("user"), Some(&json!("bob")));
        assert_eq!(ctx.get("step"), Some(&json!(2)));
    }

    #[test]
    fn test_grandchild_merges_outward() {
        let root = Recorder::new(LogLevel::Trace);
        let child = root.child(LogContext::new().with_field("a", 1).with_field("b", 1));
        let grandchild = child.child(LogContext::new().with_field("b", 2).with_field("c", 2));

        grandchild.warn(&[json!("deep")]);

        let calls = root.calls.lock();
        let ctx = calls[0].1.as_ref().unwrap();
        assert_eq!(ctx.format_fields(), "a=1,b=2,c=2");
        assert!(child.context().get("c").is_none());
    }

    #[test]
    fn test_parent_threshold_applies() {
        let root = Recorder::new(LogLevel::Error);
        let child = root.child(LogContext::new().with_field("k", "v"));

        child.warn(&[json!("dropped")]);
        child.error(&[json!("kept")]);

        assert_eq!(root.calls.lock().len(), 1);
        assert!(!child.is_enabled(LogLevel::Info));
    }

    #[test]
    fn test_child_value_rejects_non_maps() {
        let root = Recorder::new(LogLevel::Trace);
        assert!(root.child_value(json!({"k": 1})).is_ok());
        assert!(root.child_value(json!("k=1")).is_err());
        assert!(root.child_value(json!([1, 2])).is_err());
    }
}
