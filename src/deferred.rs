//! Deferred values and pollable tasks
//!
//! The runtime is single-threaded and never blocks, so "waiting" is modelled
//! with explicit handles instead of threads:
//!
//! - [`Deferred<T>`]: a shared slot that is settled exactly once (fulfilled or
//!   rejected). Returned by `ask`, `wait` and `swap_image`.
//! - [`Task`]: a continuation a startup handler hands back to the scheduler,
//!   polled once per refresh until it settles.
//! - [`Timers`]: deadlines that fulfil their deferreds when the frame clock
//!   passes them.
//!
//! # Example
//!
//! ```ignore
//! engine.on_start(|ctx| {
//!     let name = ctx.ask("What's your name?");
//!     Ok(Task::wait_for(name))
//! });
//! ```

use crate::context::Context;
use crate::error::{RuntimeError, ScriptError};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::task::Poll;
use std::time::Instant;

/// Settlement state of a [`Deferred`].
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    Pending,
    Fulfilled(T),
    Rejected(RuntimeError),
}

/// Single-threaded, settle-once completion handle.
///
/// Clones share the same slot: the producer keeps one to settle, the consumer
/// keeps another to poll.
pub struct Deferred<T> {
    slot: Rc<RefCell<Settled<T>>>,
}

impl<T> Deferred<T> {
    pub fn new() -> Self {
        Deferred {
            slot: Rc::new(RefCell::new(Settled::Pending)),
        }
    }

    /// An already rejected handle.
    pub fn rejected(error: impl Into<RuntimeError>) -> Self {
        let deferred = Deferred::new();
        deferred.reject(error);
        deferred
    }

    /// Fulfils the handle. Returns `false` if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        let mut slot = self.slot.borrow_mut();
        if !matches!(*slot, Settled::Pending) {
            return false;
        }
        *slot = Settled::Fulfilled(value);
        true
    }

    /// Rejects the handle. Returns `false` if it was already settled.
    pub fn reject(&self, error: impl Into<RuntimeError>) -> bool {
        let mut slot = self.slot.borrow_mut();
        if !matches!(*slot, Settled::Pending) {
            return false;
        }
        *slot = Settled::Rejected(error.into());
        true
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.slot.borrow(), Settled::Pending)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Poll view without cloning the value: `Ready(Err)` carries the rejection.
    fn poll_settled(&self) -> Poll<Result<(), RuntimeError>> {
        match &*self.slot.borrow() {
            Settled::Pending => Poll::Pending,
            Settled::Fulfilled(_) => Poll::Ready(Ok(())),
            Settled::Rejected(err) => Poll::Ready(Err(err.clone())),
        }
    }
}

impl<T: Clone> Deferred<T> {
    pub fn state(&self) -> Settled<T> {
        self.slot.borrow().clone()
    }

    /// The fulfilled value, if any.
    pub fn value(&self) -> Option<T> {
        match &*self.slot.borrow() {
            Settled::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Deferred {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").field(&*self.slot.borrow()).finish()
    }
}

type PollFn = Box<dyn FnMut(&mut Context) -> Poll<Result<(), ScriptError>>>;

/// A startup continuation polled by the scheduler until it settles.
pub struct Task {
    poll: PollFn,
}

impl Task {
    pub fn new(poll: impl FnMut(&mut Context) -> Poll<Result<(), ScriptError>> + 'static) -> Self {
        Task {
            poll: Box::new(poll),
        }
    }

    /// Settles when `deferred` settles; a rejection becomes a task failure.
    pub fn wait_for<T: 'static>(deferred: Deferred<T>) -> Self {
        Task::new(move |_| match deferred.poll_settled() {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                Poll::Ready(result.map_err(|err| ScriptError::new(err.to_string())))
            }
        })
    }

    /// Waits for `deferred`, then runs `then` once with its value.
    pub fn after<T, F>(deferred: Deferred<T>, then: F) -> Self
    where
        T: Clone + 'static,
        F: FnOnce(&mut Context, T) -> Result<(), ScriptError> + 'static,
    {
        let mut then = Some(then);
        Task::new(move |ctx| match deferred.state() {
            Settled::Pending => Poll::Pending,
            Settled::Rejected(err) => Poll::Ready(Err(ScriptError::new(err.to_string()))),
            Settled::Fulfilled(value) => match then.take() {
                Some(then) => Poll::Ready(then(ctx, value)),
                None => Poll::Ready(Ok(())),
            },
        })
    }

    pub fn poll(&mut self, ctx: &mut Context) -> Poll<Result<(), ScriptError>> {
        (self.poll)(ctx)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task")
    }
}

/// Pending `wait` deadlines.
#[derive(Debug, Default)]
pub struct Timers {
    entries: Vec<(Instant, Deferred<()>)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant) -> Deferred<()> {
        let deferred = Deferred::new();
        self.entries.push((deadline, deferred.clone()));
        deferred
    }

    /// Fulfils every timer whose deadline is at or before `now`.
    pub fn fire(&mut self, now: Instant) {
        self.entries.retain(|(deadline, deferred)| {
            if *deadline <= now {
                deferred.resolve(());
                false
            } else {
                true
            }
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
