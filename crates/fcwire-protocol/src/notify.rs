use std::collections::HashMap;
use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::session::Session;

type Handler = Box<dyn FnMut()>;

/// Maps notification names to zero-argument handlers.
///
/// Handlers run synchronously on the caller's thread, one at a time, in the
/// order the notifications arrived. A notification with no registered
/// handler is discarded silently.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a notification name.
    ///
    /// Upsert: registering under an existing name replaces the previous
    /// handler.
    pub fn register(&mut self, name: impl Into<String>, handler: impl FnMut() + 'static) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// True if a handler is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Drain the session's notification queue, invoking handlers FIFO.
    ///
    /// A panicking handler is caught and logged; the remaining queued
    /// notifications are still processed. Returns the number of
    /// notifications that had a handler.
    pub fn drain<R: Read, W: Write>(&mut self, session: &mut Session<R, W>) -> usize {
        let mut handled = 0;
        while let Some(name) = session.pop_notification() {
            debug!(notification = %name, "handling notification");
            let Some(handler) = self.handlers.get_mut(&name) else {
                continue;
            };
            handled += 1;
            if catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                warn!(notification = %name, "notification handler panicked");
            }
        }
        handled
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Dispatcher").field("handlers", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    use super::*;

    fn session_with_notifications(names: &[&str]) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        let mut input = String::from("COMMAND x\n");
        for name in names {
            input.push_str(&format!("NOTIFY {name}\n"));
        }
        input.push_str("DONE\n");
        let mut session = Session::new(Cursor::new(input.into_bytes()), Vec::new());
        session.send("x").unwrap();
        session
    }

    #[test]
    fn drain_on_empty_queue_is_noop() {
        let mut session = session_with_notifications(&[]);
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("anything", || panic!("must not run"));
        assert_eq!(dispatcher.drain(&mut session), 0);
    }

    #[test]
    fn handlers_run_in_arrival_order() {
        let mut session = session_with_notifications(&["first", "second", "first"]);
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut dispatcher = Dispatcher::new();
        let seen = Rc::clone(&order);
        dispatcher.register("first", move || seen.borrow_mut().push("first"));
        let seen = Rc::clone(&order);
        dispatcher.register("second", move || seen.borrow_mut().push("second"));

        assert_eq!(dispatcher.drain(&mut session), 3);
        assert_eq!(*order.borrow(), vec!["first", "second", "first"]);
        assert_eq!(session.pending_notifications(), 0);
    }

    #[test]
    fn unregistered_names_are_discarded_silently() {
        let mut session = session_with_notifications(&["unknown", "known"]);
        let hits = Rc::new(RefCell::new(0));

        let mut dispatcher = Dispatcher::new();
        let count = Rc::clone(&hits);
        dispatcher.register("known", move || *count.borrow_mut() += 1);

        assert_eq!(dispatcher.drain(&mut session), 1);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(session.pending_notifications(), 0);
    }

    #[test]
    fn reregistration_replaces_handler() {
        let mut session = session_with_notifications(&["wp"]);
        let hits = Rc::new(RefCell::new(Vec::new()));

        let mut dispatcher = Dispatcher::new();
        let log = Rc::clone(&hits);
        dispatcher.register("wp", move || log.borrow_mut().push("old"));
        let log = Rc::clone(&hits);
        dispatcher.register("wp", move || log.borrow_mut().push("new"));

        dispatcher.drain(&mut session);
        assert_eq!(*hits.borrow(), vec!["new"]);
    }

    #[test]
    fn panicking_handler_does_not_stop_the_drain() {
        let mut session = session_with_notifications(&["boom", "ok"]);
        let hits = Rc::new(RefCell::new(0));

        let mut dispatcher = Dispatcher::new();
        dispatcher.register("boom", || panic!("handler failure"));
        let count = Rc::clone(&hits);
        dispatcher.register("ok", move || *count.borrow_mut() += 1);

        assert_eq!(dispatcher.drain(&mut session), 2);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(session.pending_notifications(), 0);
    }
}
