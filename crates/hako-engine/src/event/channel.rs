use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identity of one listener registration.
///
/// Returned by [`EventChannel::on`] and [`EventChannel::once`]; pass it to
/// [`EventChannel::off`] to remove that registration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

type Callback<P> = Rc<dyn Fn(&P)>;

struct Registration<P> {
    id: ListenerId,
    once: bool,
    callback: Callback<P>,
}

/// Event name to ordered listener list.
///
/// Invariants:
/// - listeners run in registration order
/// - `emit` iterates a snapshot taken before the first call, so changes made
///   by listeners only affect later emissions
pub struct EventChannel<P> {
    listeners: RefCell<HashMap<String, Vec<Registration<P>>>>,
    next_id: Cell<u64>,
}

impl<P> EventChannel<P> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Appends a listener for `event`.
    pub fn on(&self, event: &str, listener: impl Fn(&P) + 'static) -> ListenerId {
        self.register(event, false, Rc::new(listener))
    }

    /// Appends a listener that removes itself the first time it runs.
    pub fn once(&self, event: &str, listener: impl Fn(&P) + 'static) -> ListenerId {
        self.register(event, true, Rc::new(listener))
    }

    /// Removes the registration `id` from `event`. Returns `false` when absent.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut map = self.listeners.borrow_mut();
        let Some(list) = map.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(|r| r.id == id) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            map.remove(event);
        }
        true
    }

    /// Invokes every listener of `event` synchronously.
    pub fn emit(&self, event: &str, payload: &P) {
        let snapshot: Vec<(ListenerId, bool, Callback<P>)> = match self.listeners.borrow().get(event) {
            Some(list) => list.iter().map(|r| (r.id, r.once, Rc::clone(&r.callback))).collect(),
            None => return,
        };

        for (id, once, callback) in snapshot {
            if once {
                self.off(event, id);
            }
            callback(payload);
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    /// Drops every registration on every event.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn register(&self, event: &str, once: bool, callback: Callback<P>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners
            .borrow_mut()
            .entry(event.to_owned())
            .or_default()
            .push(Registration { id, once, callback });
        id
    }
}

impl<P> Default for EventChannel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.listeners.borrow();
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        f.debug_struct("EventChannel").field("events", &names).finish()
    }
}
