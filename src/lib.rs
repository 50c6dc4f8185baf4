//! Playfield: the runtime behind compiled kid-friendly game scripts
//!
//! A compiled program registers handlers on an [`Engine`] and the host drives
//! it once per display refresh. The runtime provides:
//!
//! - figures (sprites) with lazily loaded images
//! - pairwise AABB collision handlers
//! - keyboard and mouse state with per-key handlers
//! - a modal text prompt (`ask`) that pauses the game while it is up
//! - drawing primitives over a pluggable [`Surface`]
//!
//! # Example
//!
//! ```no_run
//! use playfield::{Engine, RecordingSurface, RuntimeConfig};
//! use std::time::Instant;
//!
//! let mut engine = Engine::new(RuntimeConfig::default());
//! engine.initialize(Box::new(RecordingSurface::new(800, 600)));
//!
//! let cat = engine.context_mut().create_figure("cat.png");
//! engine.on_key("right", move |ctx| {
//!     ctx.move_by(cat, 5.0, 0.0);
//!     Ok(())
//! });
//!
//! engine.start(Instant::now()).unwrap();
//! engine.frame(Instant::now()).unwrap();
//! ```

pub mod assets;
pub mod audio;
pub mod collision;
pub mod color;
pub mod config;
pub mod context;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod figure;
pub mod font;
pub mod handlers;
#[cfg(feature = "sdl")]
pub mod host;
pub mod input;
pub mod surface;
pub mod text_input;
pub mod util;

pub use color::Color;
pub use config::RuntimeConfig;
pub use context::Context;
pub use deferred::{Deferred, Settled, Task};
pub use engine::{Engine, FrameStatus};
pub use error::{AssetError, ConfigError, RuntimeError, ScriptError};
pub use figure::{Figure, FigureId};
pub use handlers::Startup;
pub use input::{InputEvent, InputOutcome};
pub use surface::{RecordingSurface, Surface};
