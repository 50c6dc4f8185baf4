//! Frame scheduler
//!
//! The host drives the engine with two calls:
//!
//! - [`Engine::frame`] once per display refresh
//! - [`Engine::handle_input`] for every keyboard or mouse event
//!
//! # Frame order
//!
//! 1. finish image loads, fire timers, poll the startup barrier
//! 2. clear the surface
//! 3. while the barrier is up: draw the prompt overlay only
//! 4. while a prompt is active: draw figures under the overlay only
//! 5. otherwise: per-frame handlers, clear just-pressed keys, collisions,
//!    draw figures
//!
//! Startup handlers run inside `start`. Any that hand back a [`Task`] keep the
//! barrier up until every task has settled; key, frame and collision handlers
//! stay quiet until then.

use crate::collision::{self, CollisionId};
use crate::config::RuntimeConfig;
use crate::context::Context;
use crate::deferred::Task;
use crate::error::{RuntimeError, ScriptError};
use crate::figure::FigureId;
use crate::handlers::Startup;
use crate::input::{canonical_key, is_gameplay_key, InputEvent, InputOutcome, SurfaceGeometry};
use crate::surface::{RectF, Surface};
use chrono::{DateTime, Local};
use std::task::Poll;
use std::time::Instant;

/// Whether the host should keep scheduling frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Stopped,
}

pub struct Engine {
    ctx: Context,
    running: bool,
    /// Startup tasks still pending; `Some` while the barrier is up
    barrier: Option<Vec<Task>>,
    last_tick: Option<Instant>,
    started_at: Option<DateTime<Local>>,
}

impl Engine {
    pub fn new(config: RuntimeConfig) -> Self {
        Engine {
            ctx: Context::new(config),
            running: false,
            barrier: None,
            last_tick: None,
            started_at: None,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn barrier_active(&self) -> bool {
        self.barrier.is_some()
    }

    /// Wall-clock time of the last `start`.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    /// Attaches the drawing surface and the input listener. Calling it again
    /// replaces both.
    pub fn initialize(&mut self, surface: Box<dyn Surface>) {
        let (width, height) = surface.size();
        self.ctx.attach_surface(surface);
        let listener = self.ctx.input.attach(SurfaceGeometry::unscaled(width, height));
        log::info!("Surface attached ({}x{}), input listener {}", width, height, listener.0);
    }

    /// Hosts that show the surface scaled or offset report where it sits, so
    /// mouse positions map back to surface pixels.
    pub fn set_display(&mut self, display: RectF) {
        self.ctx.input.set_display(display);
    }

    // ========== Registration ==========

    pub fn on_start<F, R>(&mut self, handler: F)
    where
        F: FnMut(&mut Context) -> Result<R, ScriptError> + 'static,
        R: Into<Startup>,
    {
        self.ctx.on_start(handler);
    }

    pub fn on_frame<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Context, f32) -> Result<(), ScriptError> + 'static,
    {
        self.ctx.on_frame(handler);
    }

    pub fn on_key<F>(&mut self, key: &str, handler: F)
    where
        F: FnMut(&mut Context) -> Result<(), ScriptError> + 'static,
    {
        self.ctx.on_key(key, handler);
    }

    pub fn on_collision<F>(&mut self, a: FigureId, b: FigureId, handler: F) -> CollisionId
    where
        F: FnMut(&mut Context) -> Result<(), ScriptError> + 'static,
    {
        self.ctx.on_collision(a, b, handler)
    }

    // ========== Lifecycle ==========

    /// Runs the startup handlers and begins scheduling. Does nothing while
    /// already running.
    pub fn start(&mut self, now: Instant) -> Result<(), RuntimeError> {
        if self.running {
            return Ok(());
        }
        if self.ctx.surface.is_none() {
            log::error!("Cannot start: no drawing surface attached");
            return Err(RuntimeError::SurfaceMissing);
        }

        self.running = true;
        self.last_tick = Some(now);
        self.ctx.set_now(now);
        let started = Local::now();
        self.started_at = Some(started);
        log::info!("Game started at {}", started.format("%H:%M:%S"));

        let mut handlers = self.ctx.handlers.take_start();
        if !handlers.is_empty() {
            let mut pending = Vec::new();
            for handler in handlers.iter_mut() {
                match handler(&mut self.ctx) {
                    Ok(Startup::Done) => {}
                    Ok(Startup::Pending(task)) => pending.push(task),
                    Err(err) => log::error!("Error in start handler: {}", err),
                }
            }
            log::debug!("startup barrier up, {} task(s) pending", pending.len());
            self.barrier = Some(pending);
        }
        self.ctx.handlers.restore_start(handlers);

        if self.ctx.take_stop_request() {
            self.stop();
        }
        Ok(())
    }

    /// Stops scheduling and hides any prompt.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Game stopped");
        }
        self.running = false;
        self.ctx.text_input.stop();
    }

    /// Stops and forgets everything the program registered or created.
    pub fn reset(&mut self) {
        self.stop();
        self.ctx.clear_world();
        self.barrier = None;
        self.last_tick = None;
        self.started_at = None;
        log::info!("Game reset");
    }

    /// One refresh. Returns `Stopped` once the engine is no longer running;
    /// a failing handler stops the engine and comes back as the error.
    pub fn frame(&mut self, now: Instant) -> Result<FrameStatus, RuntimeError> {
        self.ctx.pump(now);
        if !self.running {
            return Ok(FrameStatus::Stopped);
        }

        let dt = self
            .last_tick
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_tick = Some(now);
        self.poll_barrier();

        self.ctx.clear_surface();

        if self.barrier.is_some() {
            if self.ctx.text_input.is_active() {
                self.ctx.draw_overlay();
            }
            self.ctx.present();
            return Ok(FrameStatus::Running);
        }

        if self.ctx.text_input.is_active() {
            self.ctx.draw_figures();
            self.ctx.draw_overlay();
            self.ctx.present();
            return Ok(FrameStatus::Running);
        }

        let result = run_frame_handlers(&mut self.ctx, dt);
        self.check(result)?;
        self.ctx.input.keys.clear_just_pressed();
        let result = run_collisions(&mut self.ctx);
        self.check(result)?;

        self.ctx.draw_figures();
        self.ctx.present();

        if self.ctx.take_stop_request() {
            self.stop();
        }
        Ok(if self.running {
            FrameStatus::Running
        } else {
            FrameStatus::Stopped
        })
    }

    fn poll_barrier(&mut self) {
        let Some(tasks) = self.barrier.as_mut() else {
            return;
        };
        let ctx = &mut self.ctx;
        tasks.retain_mut(|task| match task.poll(ctx) {
            Poll::Pending => true,
            Poll::Ready(Ok(())) => false,
            Poll::Ready(Err(err)) => {
                log::error!("Error in start handler: {}", err);
                false
            }
        });
        if tasks.is_empty() {
            log::debug!("startup barrier released");
            self.barrier = None;
        }
    }

    /// Halts on a script error.
    fn check(&mut self, result: Result<(), ScriptError>) -> Result<(), RuntimeError> {
        result.map_err(|err| {
            log::error!("Script error, stopping: {}", err);
            self.stop();
            RuntimeError::Script(err)
        })
    }

    // ========== Input ==========

    /// Routes one host event. Key downs always land in key state; an active
    /// prompt then takes the key, otherwise key handlers run once the barrier
    /// is down.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<InputOutcome, RuntimeError> {
        if !self.ctx.input.is_attached() {
            log::trace!("input before initialize ignored: {:?}", event);
            return Ok(InputOutcome::PASS);
        }

        match event {
            InputEvent::KeyDown { key, repeat } => self.key_down(&key, repeat),
            InputEvent::KeyUp { key } => {
                self.ctx.input.keys.release(&canonical_key(&key));
                Ok(InputOutcome::PASS)
            }
            mouse => {
                self.ctx.input.apply_mouse(&mouse);
                Ok(InputOutcome::PASS)
            }
        }
    }

    fn key_down(&mut self, key: &str, repeat: bool) -> Result<InputOutcome, RuntimeError> {
        let canonical = canonical_key(key);
        if self.ctx.text_input.is_active() {
            if !repeat {
                self.ctx.input.keys.press(&canonical);
            }
            return Ok(self.ctx.text_input.handle_key(key));
        }
        // The Enter that committed the last prompt must not reach gameplay
        if key == "Enter" && self.ctx.text_input.take_guard() {
            return Ok(InputOutcome::CONSUMED);
        }

        let outcome = InputOutcome {
            suppress_default: self.running && is_gameplay_key(&canonical),
            release_focus: false,
        };
        if repeat {
            return Ok(outcome);
        }

        self.ctx.input.keys.press(&canonical);
        if self.barrier.is_some() {
            return Ok(outcome);
        }

        let result = dispatch_key(&mut self.ctx, &canonical);
        self.check(result)?;
        if self.ctx.take_stop_request() {
            self.stop();
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("running", &self.running)
            .field("barrier", &self.barrier.as_ref().map(Vec::len))
            .field("context", &self.ctx)
            .finish()
    }
}

fn run_frame_handlers(ctx: &mut Context, dt: f32) -> Result<(), ScriptError> {
    let mut handlers = ctx.handlers.take_frame();
    let result = handlers.iter_mut().try_for_each(|handler| handler(ctx, dt));
    ctx.handlers.restore_frame(handlers);
    result
}

fn dispatch_key(ctx: &mut Context, key: &str) -> Result<(), ScriptError> {
    let mut handlers = ctx.handlers.take_keys(key);
    if handlers.is_empty() {
        return Ok(());
    }
    log::trace!("dispatching {} handler(s) for {}", handlers.len(), key);
    let result = handlers.iter_mut().try_for_each(|handler| handler(ctx));
    ctx.handlers.restore_keys(key, handlers);
    result
}

/// Fires the handler of every registered pair that overlaps right now.
/// Registrations purged by an earlier handler in the same pass are skipped.
fn run_collisions(ctx: &mut Context) -> Result<(), ScriptError> {
    for id in ctx.collisions.ids() {
        let Some((a, b)) = ctx.collisions.pair(id) else {
            continue;
        };
        if !collision::figures_collide(&ctx.figures, a, b) {
            continue;
        }
        let Some(mut handler) = ctx.collisions.take_handler(id) else {
            continue;
        };
        let result = handler(ctx);
        ctx.collisions.restore_handler(id, handler);
        result?;
    }
    Ok(())
}
