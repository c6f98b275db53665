//! Editor and form events, and the per-form queue that carries them.
//!
//! Editors never call back into their form. They push [`EditorEvent`]s onto
//! the form's [`EventBus`]; the form drains the bus when it dispatches.
//! Work that must run after the current turn (debounced change detection,
//! the blur consensus check) is queued as a deferred task guarded by the
//! liveness flag of its owner.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Kind of an editor event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The value changed.
    Change,
    /// The editor gained focus.
    Focus,
    /// The editor lost focus.
    Blur,
    /// An option was picked (select-like editors).
    Select,
    /// Any other named event, including relayed nested ones.
    Other(String),
}

impl EventKind {
    /// Returns the event name.
    pub fn name(&self) -> &str {
        match self {
            Self::Change => "change",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Select => "select",
            Self::Other(name) => name,
        }
    }

    /// Parses an event name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "change" => Self::Change,
            "focus" => Self::Focus,
            "blur" => Self::Blur,
            "select" => Self::Select,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An event raised by an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorEvent {
    /// Key of the emitting editor.
    pub key: String,
    /// What happened.
    pub kind: EventKind,
}

/// An event raised by a form.
///
/// Editor events are re-broadcast as `"<key>:<event>"`; the form's own
/// aggregate events are plain `"change"`, `"focus"` and `"blur"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEvent {
    /// Event name.
    pub name: String,
    /// Key of the originating editor, for re-broadcast events.
    pub key: Option<String>,
}

impl FormEvent {
    /// Creates a form-level event.
    pub fn form(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: None,
        }
    }

    /// Creates a re-broadcast editor event.
    pub fn editor(key: &str, kind: &EventKind) -> Self {
        Self {
            name: format!("{key}:{}", kind.name()),
            key: Some(key.to_string()),
        }
    }
}

/// Work scheduled to run after the current dispatch turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Compare an editor's value with its last observed value.
    DetermineChange {
        /// Editor key.
        key: String,
    },
    /// Emit form `blur` unless some editor regained focus.
    BlurConsensus,
}

#[derive(Debug)]
struct Deferred {
    task: Task,
    alive: Rc<Cell<bool>>,
}

#[derive(Debug, Default)]
struct BusState {
    events: VecDeque<EditorEvent>,
    deferred: VecDeque<Deferred>,
}

/// A form's event and task queue.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    state: Rc<RefCell<BusState>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an emitter bound to this bus for one editor.
    pub fn emitter(&self, key: &str, alive: Rc<Cell<bool>>) -> Emitter {
        Emitter {
            bus: Rc::downgrade(&self.state),
            key: key.to_string(),
            alive,
        }
    }

    /// Queues an event.
    pub fn push(&self, event: EditorEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    /// Takes the next queued event.
    pub fn pop_event(&self) -> Option<EditorEvent> {
        self.state.borrow_mut().events.pop_front()
    }

    /// Schedules a task owned by whoever holds `alive`.
    pub fn defer(&self, task: Task, alive: Rc<Cell<bool>>) {
        self.state
            .borrow_mut()
            .deferred
            .push_back(Deferred { task, alive });
    }

    /// Takes every deferred task scheduled so far whose owner is still alive.
    pub fn take_deferred(&self) -> Vec<Task> {
        let drained: Vec<Deferred> = self.state.borrow_mut().deferred.drain(..).collect();
        drained
            .into_iter()
            .filter(|deferred| deferred.alive.get())
            .map(|deferred| deferred.task)
            .collect()
    }

    /// Returns whether nothing is queued.
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.events.is_empty() && state.deferred.is_empty()
    }

    /// Drops everything queued.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.events.clear();
        state.deferred.clear();
    }
}

/// Handle an editor uses to raise events on its form's bus.
#[derive(Debug, Clone)]
pub struct Emitter {
    bus: Weak<RefCell<BusState>>,
    key: String,
    alive: Rc<Cell<bool>>,
}

impl Emitter {
    /// Creates an emitter attached to no bus; events are dropped.
    pub fn detached(key: &str) -> Self {
        Self {
            bus: Weak::new(),
            key: key.to_string(),
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Raises an event, unless the owner was disposed.
    pub fn emit(&self, kind: EventKind) {
        if !self.alive.get() {
            return;
        }
        if let Some(state) = self.bus.upgrade() {
            state.borrow_mut().events.push_back(EditorEvent {
                key: self.key.clone(),
                kind,
            });
        }
    }

    /// Schedules a task guarded by the owner's liveness flag.
    pub fn defer(&self, task: Task) {
        if let Some(state) = self.bus.upgrade() {
            state.borrow_mut().deferred.push_back(Deferred {
                task,
                alive: Rc::clone(&self.alive),
            });
        }
    }

    /// Returns the key events are raised under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the owner's liveness flag.
    pub fn alive(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.alive)
    }
}
