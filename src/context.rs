//! Script-facing runtime state
//!
//! Everything a compiled program touches goes through [`Context`]: figures,
//! drawing, input queries, sound, prompts, timers and handler registration.
//! Handlers receive `&mut Context`, so a handler can do anything the program's
//! top level can.
//!
//! Calls that target a figure by id are silent no-ops when the figure no
//! longer exists, and drawing calls made without a surface are dropped.

use crate::assets::{AssetResolver, LoadKind, LoadRequest, PendingLoads};
use crate::audio::AudioPlayer;
use crate::collision::{self, CollisionId, CollisionRegistry};
use crate::color::Color;
use crate::config::RuntimeConfig;
use crate::deferred::{Deferred, Timers};
use crate::error::{AssetError, ScriptError};
use crate::figure::{Figure, FigureId, FigureStore};
use crate::handlers::{Handlers, Startup};
use crate::input::{canonical_key, InputState};
use crate::surface::{self, DrawResult, RectF, Surface};
use crate::text_input::TextInput;
use crate::util;
use std::time::{Duration, Instant};

/// Width of lines drawn by [`Context::draw_line`].
const LINE_WIDTH: f32 = 2.0;

pub struct Context {
    pub(crate) figures: FigureStore,
    pub(crate) collisions: CollisionRegistry,
    pub(crate) handlers: Handlers,
    pub(crate) input: InputState,
    pub(crate) text_input: TextInput,
    pub(crate) surface: Option<Box<dyn Surface>>,
    audio: Option<Box<dyn AudioPlayer>>,
    loads: PendingLoads,
    timers: Timers,
    resolver: AssetResolver,
    pub(crate) config: RuntimeConfig,
    size: (u32, u32),
    now: Instant,
    stop_requested: bool,
}

impl Context {
    pub fn new(config: RuntimeConfig) -> Self {
        Context {
            figures: FigureStore::new(),
            collisions: CollisionRegistry::new(),
            handlers: Handlers::new(),
            input: InputState::new(),
            text_input: TextInput::new(config.default_prompt.clone()),
            surface: None,
            audio: None,
            loads: PendingLoads::new(),
            timers: Timers::new(),
            resolver: config.resolver(),
            size: (config.width, config.height),
            config,
            now: Instant::now(),
            stop_requested: false,
        }
    }

    // ========== Wiring ==========

    /// Takes the drawing surface and reads its size once.
    pub(crate) fn attach_surface(&mut self, surface: Box<dyn Surface>) {
        self.size = surface.size();
        self.surface = Some(surface);
    }

    pub fn set_audio(&mut self, audio: Box<dyn AudioPlayer>) {
        self.audio = Some(audio);
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn figures(&self) -> &FigureStore {
        &self.figures
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn text_input(&self) -> &TextInput {
        &self.text_input
    }

    pub fn collisions(&self) -> &CollisionRegistry {
        &self.collisions
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Time of the current frame.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Start-of-frame housekeeping: finish image loads, fire due timers and
    /// drop the text-input guard from the previous frame.
    pub(crate) fn pump(&mut self, now: Instant) {
        self.now = now;
        if let Some(surface) = self.surface.as_deref_mut() {
            self.loads
                .complete(&mut self.figures, surface, &self.resolver, self.config.placeholder);
        }
        self.timers.fire(now);
        self.text_input.clear_guard();
    }

    pub(crate) fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    /// Asks the engine to stop after the current handler pass.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub(crate) fn take_stop_request(&mut self) -> bool {
        std::mem::replace(&mut self.stop_requested, false)
    }

    /// Forgets figures, handlers, registrations, input and prompts.
    pub(crate) fn clear_world(&mut self) {
        self.figures.clear();
        self.collisions.clear();
        self.handlers.clear();
        self.input.reset();
        self.text_input.reset();
        self.stop_requested = false;
    }

    // ========== Handler registration ==========

    /// Runs once at start. Return `Ok(())` when done, or `Ok(task)` to keep
    /// the game waiting until the task settles.
    pub fn on_start<F, R>(&mut self, mut handler: F)
    where
        F: FnMut(&mut Context) -> Result<R, ScriptError> + 'static,
        R: Into<Startup>,
    {
        self.handlers
            .add_start(Box::new(move |ctx| handler(ctx).map(Into::into)));
    }

    /// Runs every frame with the elapsed time in seconds.
    pub fn on_frame<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Context, f32) -> Result<(), ScriptError> + 'static,
    {
        self.handlers.add_frame(Box::new(handler));
    }

    /// Runs when `key` goes down (auto-repeat excluded).
    pub fn on_key<F>(&mut self, key: &str, handler: F)
    where
        F: FnMut(&mut Context) -> Result<(), ScriptError> + 'static,
    {
        self.handlers.add_key(key, Box::new(handler));
    }

    /// Runs every frame in which `a` and `b` overlap.
    pub fn on_collision<F>(&mut self, a: FigureId, b: FigureId, handler: F) -> CollisionId
    where
        F: FnMut(&mut Context) -> Result<(), ScriptError> + 'static,
    {
        self.collisions.register(a, b, Box::new(handler))
    }

    // ========== Figures ==========

    /// Creates a figure right away; its image arrives on the next frame.
    pub fn create_figure(&mut self, path: &str) -> FigureId {
        let id = self
            .figures
            .create(self.config.figure_width, self.config.figure_height);
        self.loads.push(LoadRequest {
            figure: id,
            asset: path.to_string(),
            kind: LoadKind::Create,
        });
        log::debug!("created figure {} with image {}", id, path);
        id
    }

    pub fn figure(&self, id: FigureId) -> Option<&Figure> {
        self.figures.get(id)
    }

    pub fn figure_mut(&mut self, id: FigureId) -> Option<&mut Figure> {
        self.figures.get_mut(id)
    }

    pub fn move_to(&mut self, id: FigureId, x: f32, y: f32) {
        if let Some(figure) = self.figures.get_mut(id) {
            figure.move_to(x, y);
        }
    }

    pub fn move_by(&mut self, id: FigureId, dx: f32, dy: f32) {
        if let Some(figure) = self.figures.get_mut(id) {
            figure.x += dx;
            figure.y += dy;
        }
    }

    pub fn rotate(&mut self, id: FigureId, degrees: f32) {
        if let Some(figure) = self.figures.get_mut(id) {
            figure.rotate_by(degrees);
        }
    }

    pub fn scale(&mut self, id: FigureId, factor: f32) {
        if let Some(figure) = self.figures.get_mut(id) {
            figure.scale_to(factor);
        }
    }

    pub fn set_size(&mut self, id: FigureId, width: f32, height: f32) {
        if let Some(figure) = self.figures.get_mut(id) {
            figure.set_width(width);
            figure.set_height(height);
        }
    }

    pub fn set_visible(&mut self, id: FigureId, visible: bool) {
        if let Some(figure) = self.figures.get_mut(id) {
            figure.visible = visible;
        }
    }

    /// Removes a figure and every collision registration naming it.
    pub fn remove_figure(&mut self, id: FigureId) {
        if self.figures.remove(id) {
            let purged = self.collisions.purge(id);
            log::debug!("removed figure {} ({} collision handlers)", id, purged);
        }
    }

    /// Replaces a figure's image. Settles on the next frame; a failed load
    /// falls back to the placeholder and rejects.
    pub fn swap_image(&mut self, id: FigureId, path: &str) -> Deferred<()> {
        if !self.figures.contains(id) {
            log::warn!("Cannot swap image: no figure {}", id);
            return Deferred::rejected(AssetError::MissingFigure(id.0));
        }
        let done = Deferred::new();
        self.loads.push(LoadRequest {
            figure: id,
            asset: path.to_string(),
            kind: LoadKind::Swap(done.clone()),
        });
        done
    }

    /// Current overlap of two figures, same test as collision handlers.
    pub fn touching(&self, a: FigureId, b: FigureId) -> bool {
        collision::figures_collide(&self.figures, a, b)
    }

    // ========== Drawing ==========

    fn draw(&mut self, what: &str, op: impl FnOnce(&mut dyn Surface) -> DrawResult) {
        let Some(surface) = self.surface.as_deref_mut() else {
            log::trace!("{} dropped: no surface", what);
            return;
        };
        if let Err(err) = op(surface) {
            log::warn!("{} failed: {}", what, err);
        }
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &str) {
        let color = Color::parse_or_white(color);
        self.draw("draw_rect", |s| s.fill_rect(RectF::new(x, y, width, height), color));
    }

    pub fn draw_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
        let color = Color::parse_or_white(color);
        self.draw("draw_circle", |s| s.fill_circle(x, y, radius, color));
    }

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: &str) {
        let color = Color::parse_or_white(color);
        self.draw("draw_line", |s| s.line((x1, y1), (x2, y2), color, LINE_WIDTH));
    }

    /// Draws text with its baseline at `y`.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, color: &str, size: f32) {
        let color = Color::parse_or_white(color);
        self.draw("draw_text", |s| s.fill_text(text, x, y, color, size));
    }

    /// Draws every visible figure that has an image, in store order.
    pub(crate) fn draw_figures(&mut self) {
        let Some(surface) = self.surface.as_deref_mut() else {
            return;
        };
        for figure in self.figures.iter().filter(|f| f.visible) {
            if let Err(err) = surface::draw_figure(surface, figure) {
                log::warn!("drawing figure {} failed: {}", figure.id(), err);
            }
        }
    }

    pub(crate) fn draw_overlay(&mut self) {
        let Some(surface) = self.surface.as_deref_mut() else {
            return;
        };
        let result = self
            .text_input
            .draw(surface, &self.config.overlay, self.config.caret_interval);
        if let Err(err) = result {
            log::warn!("drawing prompt failed: {}", err);
        }
    }

    pub(crate) fn clear_surface(&mut self) {
        let background = self.config.background;
        self.draw("clear", |s| s.clear(background));
    }

    pub(crate) fn present(&mut self) {
        if let Some(surface) = self.surface.as_deref_mut() {
            surface.present();
        }
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    // ========== Input ==========

    pub fn key_held(&self, key: &str) -> bool {
        self.input.keys.is_held(&canonical_key(key))
    }

    /// True only in the frame the key went down.
    pub fn key_tapped(&self, key: &str) -> bool {
        self.input.keys.is_just_pressed(&canonical_key(key))
    }

    pub fn last_key(&self) -> String {
        self.input.keys.last_pressed().to_string()
    }

    pub fn mouse_x(&self) -> f32 {
        self.input.mouse.x
    }

    pub fn mouse_y(&self) -> f32 {
        self.input.mouse.y
    }

    pub fn mouse_down(&self) -> bool {
        self.input.mouse.down
    }

    // ========== Sound, prompts, time ==========

    pub fn play_sound(&mut self, path: &str) {
        let Some(audio) = self.audio.as_deref_mut() else {
            log::debug!("no audio backend, skipping {}", path);
            return;
        };
        let result = self
            .resolver
            .resolve(path)
            .and_then(|resolved| audio.play(&resolved));
        if let Err(err) = result {
            log::warn!("Sound could not be played: {} ({})", path, err);
        }
    }

    /// Shows a prompt and returns the answer once Enter is pressed.
    pub fn ask(&mut self, prompt: &str) -> Deferred<String> {
        self.text_input.request(prompt)
    }

    /// Settles once `ms` milliseconds of frame time have passed.
    pub fn wait(&mut self, ms: u64) -> Deferred<()> {
        self.timers.schedule(self.now + Duration::from_millis(ms))
    }

    pub fn random(&self, min: i64, max: i64) -> i64 {
        util::random(min, max)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("figures", &self.figures.len())
            .field("collisions", &self.collisions.len())
            .field("handlers", &self.handlers)
            .field("pending_loads", &self.loads.len())
            .field("timers", &self.timers.len())
            .field("surface", &self.surface.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    fn context_with_surface(surface: RecordingSurface) -> Context {
        let mut ctx = Context::new(RuntimeConfig::default());
        ctx.attach_surface(Box::new(surface));
        ctx
    }

    #[test]
    fn test_mutators_on_missing_figure_are_noops() {
        let mut ctx = Context::new(RuntimeConfig::default());
        let id = ctx.create_figure("cat.png");
        ctx.remove_figure(id);

        ctx.move_to(id, 1.0, 2.0);
        ctx.rotate(id, 90.0);
        ctx.scale(id, 2.0);
        ctx.set_size(id, 5.0, 5.0);
        ctx.remove_figure(id);
        assert!(ctx.figure(id).is_none());
    }

    #[test]
    fn test_remove_figure_purges_collisions() {
        let mut ctx = Context::new(RuntimeConfig::default());
        let a = ctx.create_figure("a.png");
        let b = ctx.create_figure("b.png");
        let c = ctx.create_figure("c.png");
        ctx.on_collision(a, b, |_| Ok(()));
        ctx.on_collision(b, c, |_| Ok(()));
        ctx.on_collision(a, c, |_| Ok(()));

        ctx.remove_figure(b);
        assert_eq!(ctx.collisions().len(), 1);
        assert!(!ctx.collisions().names(b));
    }

    #[test]
    fn test_image_arrives_on_pump() {
        let surface = RecordingSurface::new(800, 600).with_image("cat.png", 64, 48);
        let mut ctx = context_with_surface(surface);
        let id = ctx.create_figure("cat.png");
        assert!(ctx.figure(id).unwrap().image.is_none());

        ctx.pump(Instant::now());
        let figure = ctx.figure(id).unwrap();
        assert!(figure.image.is_some());
        assert_eq!((figure.width(), figure.height()), (64.0, 48.0));
    }

    #[test]
    fn test_swap_image_on_missing_figure_rejects() {
        let mut ctx = Context::new(RuntimeConfig::default());
        let done = ctx.swap_image(FigureId(99), "cat.png");
        assert!(done.is_settled());
        assert!(done.value().is_none());
    }

    #[test]
    fn test_swap_image_resolves_after_pump() {
        let surface = RecordingSurface::new(800, 600).with_image("dog.png", 30, 20);
        let mut ctx = context_with_surface(surface);
        let id = ctx.create_figure("missing.png");
        ctx.pump(Instant::now());

        let done = ctx.swap_image(id, "dog.png");
        assert!(done.is_pending());
        ctx.pump(Instant::now());
        assert_eq!(done.value(), Some(()));
        assert_eq!(ctx.figure(id).unwrap().width(), 30.0);
    }

    #[test]
    fn test_wait_settles_with_frame_clock() {
        let mut ctx = Context::new(RuntimeConfig::default());
        let start = Instant::now();
        ctx.set_now(start);
        let done = ctx.wait(100);

        ctx.pump(start + Duration::from_millis(50));
        assert!(done.is_pending());
        ctx.pump(start + Duration::from_millis(100));
        assert!(done.is_settled());
    }

    #[test]
    fn test_drawing_parses_colours() {
        let surface = RecordingSurface::new(800, 600);
        let log = surface.log();
        let mut ctx = context_with_surface(surface);

        ctx.draw_rect(1.0, 2.0, 3.0, 4.0, "#f00");
        ctx.draw_circle(5.0, 5.0, 2.0, "banana");
        ctx.draw_line(0.0, 0.0, 10.0, 10.0, "");

        assert_eq!(
            log.commands(),
            vec![
                DrawCommand::FillRect {
                    rect: RectF::new(1.0, 2.0, 3.0, 4.0),
                    color: Color::rgb(255, 0, 0),
                },
                DrawCommand::Circle { cx: 5.0, cy: 5.0, radius: 2.0, color: Color::WHITE },
                DrawCommand::Line {
                    from: (0.0, 0.0),
                    to: (10.0, 10.0),
                    color: Color::WHITE,
                    line_width: 2.0,
                },
            ]
        );
    }

    #[test]
    fn test_drawing_without_surface_is_dropped() {
        let mut ctx = Context::new(RuntimeConfig::default());
        ctx.draw_text("hello", 10.0, 30.0, "white", 20.0);
        assert_eq!((ctx.width(), ctx.height()), (800, 600));
    }

    #[test]
    fn test_surface_size_is_read_on_attach() {
        let ctx = context_with_surface(RecordingSurface::new(320, 240));
        assert_eq!((ctx.width(), ctx.height()), (320, 240));
    }

    struct Sounds(Rc<RefCell<Vec<PathBuf>>>);

    impl AudioPlayer for Sounds {
        fn play(&mut self, path: &Path) -> Result<(), AssetError> {
            self.0.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_play_sound_resolves_against_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sounds")).unwrap();
        std::fs::write(dir.path().join("sounds/coin.wav"), b"wav").unwrap();

        let config = RuntimeConfig {
            asset_root: dir.path().to_path_buf(),
            ..RuntimeConfig::default()
        };
        let mut ctx = Context::new(config);
        let played = Rc::new(RefCell::new(Vec::new()));
        ctx.set_audio(Box::new(Sounds(Rc::clone(&played))));

        ctx.play_sound("coin.wav");
        ctx.play_sound("../escape.wav");
        assert_eq!(*played.borrow(), vec![dir.path().join("sounds/coin.wav")]);
    }

    #[test]
    fn test_key_queries_accept_raw_names() {
        let mut ctx = Context::new(RuntimeConfig::default());
        ctx.input.keys.press("left");
        assert!(ctx.key_held("ArrowLeft"));
        assert!(ctx.key_tapped("LEFT"));
        assert_eq!(ctx.last_key(), "left");
    }
}
