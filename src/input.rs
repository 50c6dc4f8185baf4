//! Input subsystem
//!
//! The host forwards raw events as [`InputEvent`]s; key names arrive the way a
//! browser reports them (`"ArrowLeft"`, `" "`, `"a"`) and are canonicalised
//! before anything is stored or looked up.
//!
//! # State
//!
//! - `KeyState`: held keys, keys pressed this frame, last pressed key
//! - `MouseState`: position in surface pixels plus a button flag
//! - `SurfaceGeometry`: where the surface sits on screen, used to rescale and
//!   scope mouse events
//!
//! Routing (text input first, then the startup barrier, then key handlers)
//! happens in the engine, which owns the handlers.

use crate::surface::RectF;
use std::collections::{HashMap, HashSet};

/// A raw event from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: String, repeat: bool },
    KeyUp { key: String },
    /// Display coordinates, relative to the host window
    MouseMove { x: f32, y: f32 },
    MouseDown { x: f32, y: f32 },
    MouseUp { x: f32, y: f32 },
}

impl InputEvent {
    pub fn key_down(key: impl Into<String>) -> Self {
        InputEvent::KeyDown {
            key: key.into(),
            repeat: false,
        }
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        InputEvent::KeyUp { key: key.into() }
    }
}

/// What the host should do with the event after the runtime saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    /// Skip the host's default action (scrolling, shortcuts, ...)
    pub suppress_default: bool,
    /// The last queued prompt was answered; hand keyboard focus back
    pub release_focus: bool,
}

impl InputOutcome {
    pub const PASS: InputOutcome = InputOutcome {
        suppress_default: false,
        release_focus: false,
    };

    pub const CONSUMED: InputOutcome = InputOutcome {
        suppress_default: true,
        release_focus: false,
    };
}

/// Maps a raw host key identifier onto the name scripts use.
pub fn canonical_key(raw: &str) -> String {
    match raw {
        "ArrowLeft" => "left".to_string(),
        "ArrowRight" => "right".to_string(),
        "ArrowUp" => "up".to_string(),
        "ArrowDown" => "down".to_string(),
        " " => "space".to_string(),
        "Enter" => "enter".to_string(),
        "Escape" => "escape".to_string(),
        other => other.to_lowercase(),
    }
}

/// Keys whose default host action is suppressed during play: arrows, space,
/// letters and digits. Takes a canonical name.
pub fn is_gameplay_key(key: &str) -> bool {
    match key {
        "left" | "right" | "up" | "down" | "space" => true,
        _ => {
            let mut chars = key.chars();
            matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_ascii_lowercase() || c.is_ascii_digit()
            )
        }
    }
}

/// Keyboard state keyed by canonical key names.
#[derive(Debug, Default)]
pub struct KeyState {
    held: HashMap<String, bool>,
    just_pressed: HashSet<String>,
    last_pressed: String,
}

impl KeyState {
    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_string(), true);
        self.just_pressed.insert(key.to_string());
        self.last_pressed = key.to_string();
    }

    pub fn release(&mut self, key: &str) {
        self.held.insert(key.to_string(), false);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.get(key).copied().unwrap_or(false)
    }

    pub fn is_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains(key)
    }

    /// Most recently pressed key, or an empty string.
    pub fn last_pressed(&self) -> &str {
        &self.last_pressed
    }

    /// Called once per frame, after the per-frame handlers.
    pub fn clear_just_pressed(&mut self) {
        self.just_pressed.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.last_pressed.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub down: bool,
}

/// Placement of the surface on screen versus its backing-store size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    display: RectF,
    backing_width: f32,
    backing_height: f32,
}

impl SurfaceGeometry {
    /// Surface shown at its own size in the window's top-left corner.
    pub fn unscaled(width: u32, height: u32) -> Self {
        SurfaceGeometry {
            display: RectF::new(0.0, 0.0, width as f32, height as f32),
            backing_width: width as f32,
            backing_height: height as f32,
        }
    }

    pub fn with_display(mut self, display: RectF) -> Self {
        self.display = display;
        self
    }

    pub fn display(&self) -> RectF {
        self.display
    }

    /// Maps a display point to surface pixels, or `None` when it falls
    /// outside the displayed surface.
    pub fn to_surface(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        let d = &self.display;
        if d.width <= 0.0 || d.height <= 0.0 {
            return None;
        }
        if x < d.x || y < d.y || x >= d.x + d.width || y >= d.y + d.height {
            return None;
        }
        let scale_x = self.backing_width / d.width;
        let scale_y = self.backing_height / d.height;
        Some(((x - d.x) * scale_x, (y - d.y) * scale_y))
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        SurfaceGeometry::unscaled(0, 0)
    }
}

/// Handle of an attached listener set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(pub u64);

/// Keyboard and mouse state plus the listener attachment.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys: KeyState,
    pub mouse: MouseState,
    geometry: SurfaceGeometry,
    listener: Option<ListenerId>,
    listeners_created: u64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previously attached listener set with a fresh one.
    pub fn attach(&mut self, geometry: SurfaceGeometry) -> ListenerId {
        if let Some(old) = self.detach() {
            log::debug!("detached input listener {}", old.0);
        }
        self.listeners_created += 1;
        let id = ListenerId(self.listeners_created);
        self.listener = Some(id);
        self.geometry = geometry;
        id
    }

    pub fn detach(&mut self) -> Option<ListenerId> {
        self.listener.take()
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    /// The host moved or resized the displayed surface.
    pub fn set_display(&mut self, display: RectF) {
        self.geometry = self.geometry.with_display(display);
    }

    /// Applies a mouse event. Events outside the surface are ignored.
    pub fn apply_mouse(&mut self, event: &InputEvent) {
        let (x, y, down) = match *event {
            InputEvent::MouseMove { x, y } => (x, y, None),
            InputEvent::MouseDown { x, y } => (x, y, Some(true)),
            InputEvent::MouseUp { x, y } => (x, y, Some(false)),
            _ => return,
        };
        let Some((sx, sy)) = self.geometry.to_surface(x, y) else {
            return;
        };
        match down {
            None => {
                self.mouse.x = sx;
                self.mouse.y = sy;
            }
            Some(pressed) => self.mouse.down = pressed,
        }
    }

    /// Forgets key and mouse state; the listener stays attached.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.mouse = MouseState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_names() {
        assert_eq!(canonical_key("ArrowLeft"), "left");
        assert_eq!(canonical_key("ArrowDown"), "down");
        assert_eq!(canonical_key(" "), "space");
        assert_eq!(canonical_key("Enter"), "enter");
        assert_eq!(canonical_key("Escape"), "escape");
        assert_eq!(canonical_key("A"), "a");
        assert_eq!(canonical_key("Shift"), "shift");
    }

    #[test]
    fn test_gameplay_allow_list() {
        for key in ["left", "right", "up", "down", "space", "a", "z", "0", "9"] {
            assert!(is_gameplay_key(key), "{key} should be a gameplay key");
        }
        for key in ["enter", "escape", "f5", "shift", "tab", "-"] {
            assert!(!is_gameplay_key(key), "{key} should not be a gameplay key");
        }
    }

    #[test]
    fn test_just_pressed_cleared_but_held_kept() {
        let mut keys = KeyState::default();
        keys.press("space");
        assert!(keys.is_held("space"));
        assert!(keys.is_just_pressed("space"));

        keys.clear_just_pressed();
        assert!(keys.is_held("space"));
        assert!(!keys.is_just_pressed("space"));
        assert_eq!(keys.last_pressed(), "space");

        keys.release("space");
        assert!(!keys.is_held("space"));
        // Last pressed survives the release
        assert_eq!(keys.last_pressed(), "space");
    }

    #[test]
    fn test_mouse_is_rescaled_to_backing_store() {
        let mut input = InputState::new();
        // 800x600 surface shown at half size, offset by (10, 20)
        let display = RectF::new(10.0, 20.0, 400.0, 300.0);
        input.attach(SurfaceGeometry::unscaled(800, 600).with_display(display));

        input.apply_mouse(&InputEvent::MouseMove { x: 110.0, y: 70.0 });
        assert_eq!((input.mouse.x, input.mouse.y), (200.0, 100.0));
    }

    #[test]
    fn test_mouse_outside_surface_is_ignored() {
        let mut input = InputState::new();
        input.attach(SurfaceGeometry::unscaled(800, 600));

        input.apply_mouse(&InputEvent::MouseDown { x: 900.0, y: 10.0 });
        assert!(!input.mouse.down);

        input.apply_mouse(&InputEvent::MouseDown { x: 5.0, y: 5.0 });
        assert!(input.mouse.down);
        input.apply_mouse(&InputEvent::MouseUp { x: 5.0, y: 5.0 });
        assert!(!input.mouse.down);
    }

    #[test]
    fn test_attach_replaces_previous_listener() {
        let mut input = InputState::new();
        let first = input.attach(SurfaceGeometry::unscaled(10, 10));
        let second = input.attach(SurfaceGeometry::unscaled(10, 10));
        assert_ne!(first, second);
        assert!(input.is_attached());

        assert_eq!(input.detach(), Some(second));
        assert!(!input.is_attached());
    }

    #[test]
    fn test_reset_keeps_listener() {
        let mut input = InputState::new();
        input.attach(SurfaceGeometry::unscaled(10, 10));
        input.keys.press("a");
        input.reset();
        assert!(!input.keys.is_held("a"));
        assert_eq!(input.keys.last_pressed(), "");
        assert!(input.is_attached());
    }
}
