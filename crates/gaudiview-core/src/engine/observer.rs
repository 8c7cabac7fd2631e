use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Merge,
    Sort,
    Filter,
    Cluster,
    RemoveRows,
    Undo,
    Reset,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merge => "merge",
            Self::Sort => "sort",
            Self::Filter => "filter",
            Self::Cluster => "cluster",
            Self::RemoveRows => "remove-rows",
            Self::Undo => "undo",
            Self::Reset => "reset",
        })
    }
}

/// Receives a notification before and after every change to a session's table.
///
/// `mutation_finished` always follows a `mutation_started`, including when the operation
/// fails.
pub trait MutationObserver {
    fn mutation_started(&self, kind: MutationKind);
    fn mutation_finished(&self, kind: MutationKind);
}

#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Box<dyn MutationObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn MutationObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn begin(&self, kind: MutationKind) {
        trace!(%kind, "Mutation started");
        for observer in &self.observers {
            observer.mutation_started(kind);
        }
    }

    pub fn end(&self, kind: MutationKind) {
        for observer in &self.observers {
            observer.mutation_finished(kind);
        }
        trace!(%kind, "Mutation finished");
    }

    /// Runs `op` between a begin and an end notification.
    pub fn bracket<T>(&self, kind: MutationKind, op: impl FnOnce() -> T) -> T {
        self.begin(kind);
        let result = op();
        self.end(kind);
        result
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl MutationObserver for Recorder {
        fn mutation_started(&self, kind: MutationKind) {
            self.log.borrow_mut().push(format!("{} begin {}", self.tag, kind));
        }
        fn mutation_finished(&self, kind: MutationKind) {
            self.log.borrow_mut().push(format!("{} end {}", self.tag, kind));
        }
    }

    #[test]
    fn bracket_notifies_every_observer_around_the_operation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.register(Box::new(Recorder { tag: "a", log: log.clone() }));
        registry.register(Box::new(Recorder { tag: "b", log: log.clone() }));

        let value = registry.bracket(MutationKind::Sort, || {
            log.borrow_mut().push("op".to_string());
            7
        });

        assert_eq!(value, 7);
        assert_eq!(
            *log.borrow(),
            vec!["a begin sort", "b begin sort", "op", "a end sort", "b end sort"]
        );
    }

    #[test]
    fn end_is_sent_when_operation_fails() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.register(Box::new(Recorder { tag: "a", log: log.clone() }));

        let result: Result<(), &str> = registry.bracket(MutationKind::Merge, || Err("boom"));

        assert!(result.is_err());
        assert_eq!(*log.borrow(), vec!["a begin merge", "a end merge"]);
    }

    #[test]
    fn empty_registry_just_runs_the_operation() {
        let registry = ObserverRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.bracket(MutationKind::Undo, || 1 + 1), 2);
    }
}
