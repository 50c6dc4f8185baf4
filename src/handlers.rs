//! Handler tables
//!
//! Compiled programs register closures per event kind. Every handler receives
//! the [`Context`] mutably, so it can create figures, draw, query input and
//! register further handlers.
//!
//! Dispatch lends a table out of the context for the duration of the pass and
//! merges it back afterwards; handlers registered during a pass are appended
//! behind the existing ones and run from the next pass on.

use crate::context::Context;
use crate::deferred::Task;
use crate::error::ScriptError;
use crate::input::canonical_key;
use std::collections::HashMap;

/// What a startup handler hands back to the scheduler.
#[derive(Debug)]
pub enum Startup {
    /// Already settled
    Done,
    /// Settles when the task does; polled once per refresh
    Pending(Task),
}

impl From<()> for Startup {
    fn from(_: ()) -> Self {
        Startup::Done
    }
}

impl From<Task> for Startup {
    fn from(task: Task) -> Self {
        Startup::Pending(task)
    }
}

pub type StartHandler = Box<dyn FnMut(&mut Context) -> Result<Startup, ScriptError>>;
pub type FrameHandler = Box<dyn FnMut(&mut Context, f32) -> Result<(), ScriptError>>;
pub type KeyHandler = Box<dyn FnMut(&mut Context) -> Result<(), ScriptError>>;
pub type CollisionHandler = Box<dyn FnMut(&mut Context) -> Result<(), ScriptError>>;

/// Start, per-frame and per-key handlers, in registration order.
#[derive(Default)]
pub struct Handlers {
    pub(crate) start: Vec<StartHandler>,
    pub(crate) frame: Vec<FrameHandler>,
    pub(crate) keys: HashMap<String, Vec<KeyHandler>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_start(&mut self, handler: StartHandler) {
        self.start.push(handler);
    }

    pub fn add_frame(&mut self, handler: FrameHandler) {
        self.frame.push(handler);
    }

    /// Registers under the canonical key name, so `"ArrowLeft"`, `"LEFT"` and
    /// `"left"` all land on the same table.
    pub fn add_key(&mut self, key: &str, handler: KeyHandler) {
        self.keys.entry(canonical_key(key)).or_default().push(handler);
    }

    pub fn start_count(&self) -> usize {
        self.start.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frame.len()
    }

    pub fn key_count(&self, key: &str) -> usize {
        self.keys.get(&canonical_key(key)).map_or(0, Vec::len)
    }

    pub fn take_start(&mut self) -> Vec<StartHandler> {
        std::mem::take(&mut self.start)
    }

    pub fn take_frame(&mut self) -> Vec<FrameHandler> {
        std::mem::take(&mut self.frame)
    }

    pub fn take_keys(&mut self, key: &str) -> Vec<KeyHandler> {
        self.keys.remove(key).unwrap_or_default()
    }

    /// Puts a lent table back in front of anything registered meanwhile.
    pub fn restore_frame(&mut self, mut lent: Vec<FrameHandler>) {
        lent.append(&mut self.frame);
        self.frame = lent;
    }

    pub fn restore_start(&mut self, mut lent: Vec<StartHandler>) {
        lent.append(&mut self.start);
        self.start = lent;
    }

    pub fn restore_keys(&mut self, key: &str, mut lent: Vec<KeyHandler>) {
        if let Some(added) = self.keys.get_mut(key) {
            lent.append(added);
        }
        if !lent.is_empty() {
            self.keys.insert(key.to_string(), lent);
        }
    }

    pub fn clear(&mut self) {
        self.start.clear();
        self.frame.clear();
        self.keys.clear();
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("start", &self.start.len())
            .field("frame", &self.frame.len())
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
