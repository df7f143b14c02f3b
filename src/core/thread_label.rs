//! Human-readable labels for threads
//!
//! Consulted by the `$Q` designator. Mutated only by the worker while it
//! processes `RegisterLabel`/`UnregisterLabel` queue items; every mutation
//! produces an audit line.

use super::log_event::thread_identity;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::thread::ThreadId;

/// Outcome of a registry mutation, rendered as the audit line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelAudit {
    Registered {
        thread: ThreadId,
        label: String,
    },
    Replaced {
        thread: ThreadId,
        previous: String,
        label: String,
    },
    Unregistered {
        thread: ThreadId,
        label: String,
    },
    NotRegistered {
        thread: ThreadId,
    },
}

impl fmt::Display for LabelAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelAudit::Registered { thread, label } => write!(
                f,
                "Registered label [{}] for thread {}",
                label,
                thread_identity(*thread)
            ),
            LabelAudit::Replaced {
                thread,
                previous,
                label,
            } => write!(
                f,
                "Replaced label [{}] with [{}] for thread {}",
                previous,
                label,
                thread_identity(*thread)
            ),
            LabelAudit::Unregistered { thread, label } => write!(
                f,
                "Unregistered label [{}] for thread {}",
                label,
                thread_identity(*thread)
            ),
            LabelAudit::NotRegistered { thread } => write!(
                f,
                "No label registered for thread {}, nothing to unregister",
                thread_identity(*thread)
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreadLabelRegistry {
    labels: HashMap<ThreadId, String>,
}

impl ThreadLabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite the label of `thread`
    pub fn register(&mut self, thread: ThreadId, label: impl Into<String>) -> LabelAudit {
        let label = label.into();
        match self.labels.insert(thread, label.clone()) {
            Some(previous) => LabelAudit::Replaced {
                thread,
                previous,
                label,
            },
            None => LabelAudit::Registered { thread, label },
        }
    }

    /// Remove the label of `thread`; absent keys are a no-op
    pub fn unregister(&mut self, thread: ThreadId) -> LabelAudit {
        match self.labels.remove(&thread) {
            Some(label) => LabelAudit::Unregistered { thread, label },
            None => LabelAudit::NotRegistered { thread },
        }
    }

    pub fn get(&self, thread: ThreadId) -> Option<&str> {
        self.labels.get(&thread).map(String::as_str)
    }

    /// Label if registered, raw thread identity otherwise
    pub fn display(&self, thread: ThreadId) -> Cow<'_, str> {
        match self.get(thread) {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(thread_identity(thread)),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn other_thread_id() -> ThreadId {
        thread::spawn(|| thread::current().id())
            .join()
            .expect("thread panicked")
    }

    #[test]
    fn test_register_then_display() {
        let mut registry = ThreadLabelRegistry::new();
        let id = thread::current().id();

        let audit = registry.register(id, "main");
        assert!(matches!(audit, LabelAudit::Registered { .. }));
        assert_eq!(registry.display(id), "main");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = ThreadLabelRegistry::new();
        let id = thread::current().id();

        registry.register(id, "first");
        let audit = registry.register(id, "second");

        assert_eq!(
            audit,
            LabelAudit::Replaced {
                thread: id,
                previous: "first".to_string(),
                label: "second".to_string(),
            }
        );
        assert_eq!(registry.get(id), Some("second"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_restores_identity() {
        let mut registry = ThreadLabelRegistry::new();
        let id = thread::current().id();

        registry.register(id, "worker");
        let audit = registry.unregister(id);

        assert!(matches!(audit, LabelAudit::Unregistered { .. }));
        assert_eq!(registry.display(id), thread_identity(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let mut registry = ThreadLabelRegistry::new();
        let registered = thread::current().id();
        let absent = other_thread_id();
        registry.register(registered, "main");

        let audit = registry.unregister(absent);

        assert_eq!(audit, LabelAudit::NotRegistered { thread: absent });
        assert_eq!(registry.get(registered), Some("main"));
    }

    #[test]
    fn test_audit_lines() {
        let id = thread::current().id();
        let raw = thread_identity(id);

        let line = LabelAudit::Registered {
            thread: id,
            label: "main".into(),
        }
        .to_string();
        assert_eq!(line, format!("Registered label [main] for thread {}", raw));

        let line = LabelAudit::NotRegistered { thread: id }.to_string();
        assert!(line.contains("nothing to unregister"));
    }
}
