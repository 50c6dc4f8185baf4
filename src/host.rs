//! SDL2 event translation for the window host
//!
//! SDL keycodes are turned into the browser-style key names the input
//! subsystem expects (`"ArrowLeft"`, `" "`, `"a"`, `"A"`). Printable keys take
//! their name from the SDL text event that follows the key press, so shifted
//! characters and other layouts come through as typed (`"?"`, `"!"`). Mouse
//! coordinates arrive already mapped to the canvas' logical size.

use crate::input::InputEvent;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Mod};
use sdl2::mouse::MouseButton;
use sdl2::EventPump;
use std::collections::HashMap;

/// What the window loop should do with one SDL event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    Quit,
    Input(InputEvent),
}

/// Turns SDL events into host actions, remembering the name each held key was
/// pressed under so its release matches.
#[derive(Debug, Default)]
pub struct EventTranslator {
    pressed: HashMap<Keycode, String>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the SDL queue into host actions.
    pub fn poll(&mut self, event_pump: &mut EventPump) -> Vec<HostAction> {
        self.translate_all(event_pump.poll_iter())
    }

    pub fn translate_all(&mut self, events: impl IntoIterator<Item = Event>) -> Vec<HostAction> {
        let mut actions = Vec::new();
        // Printable key press still waiting for its text event
        let mut pending: Option<(usize, Keycode)> = None;

        for event in events {
            match event {
                Event::KeyDown {
                    keycode: Some(key),
                    keymod,
                    repeat,
                    ..
                } => {
                    let name = match self.pressed.get(&key) {
                        Some(name) if repeat => name.clone(),
                        _ => key_name(key, keymod),
                    };
                    pending = (name.chars().count() == 1).then_some((actions.len(), key));
                    self.pressed.insert(key, name.clone());
                    actions.push(HostAction::Input(InputEvent::KeyDown { key: name, repeat }));
                }
                Event::KeyUp {
                    keycode: Some(key),
                    keymod,
                    ..
                } => {
                    pending = None;
                    let name = self
                        .pressed
                        .remove(&key)
                        .unwrap_or_else(|| key_name(key, keymod));
                    actions.push(HostAction::Input(InputEvent::KeyUp { key: name }));
                }
                Event::TextInput { text, .. } => {
                    let mut chars = text.chars();
                    match (pending.take(), chars.next(), chars.next()) {
                        (Some((index, key)), Some(c), None) => {
                            let typed = c.to_string();
                            if let Some(HostAction::Input(InputEvent::KeyDown { key: name, .. })) =
                                actions.get_mut(index)
                            {
                                *name = typed.clone();
                            }
                            self.pressed.insert(key, typed);
                        }
                        // Composed text with no key press of its own
                        _ => {
                            for c in text.chars() {
                                let typed = c.to_string();
                                let down = InputEvent::key_down(typed.clone());
                                actions.push(HostAction::Input(down));
                                actions.push(HostAction::Input(InputEvent::key_up(typed)));
                            }
                        }
                    }
                }
                other => actions.extend(translate(&other)),
            }
        }
        actions
    }
}

pub fn translate(event: &Event) -> Option<HostAction> {
    match *event {
        Event::Quit { .. } => Some(HostAction::Quit),
        Event::KeyDown {
            keycode: Some(key),
            keymod,
            repeat,
            ..
        } => Some(HostAction::Input(InputEvent::KeyDown {
            key: key_name(key, keymod),
            repeat,
        })),
        Event::KeyUp {
            keycode: Some(key),
            keymod,
            ..
        } => Some(HostAction::Input(InputEvent::KeyUp {
            key: key_name(key, keymod),
        })),
        Event::MouseMotion { x, y, .. } => Some(HostAction::Input(InputEvent::MouseMove {
            x: x as f32,
            y: y as f32,
        })),
        Event::MouseButtonDown {
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } => Some(HostAction::Input(InputEvent::MouseDown {
            x: x as f32,
            y: y as f32,
        })),
        Event::MouseButtonUp {
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } => Some(HostAction::Input(InputEvent::MouseUp {
            x: x as f32,
            y: y as f32,
        })),
        _ => None,
    }
}

/// Browser-style name of an SDL key.
pub fn key_name(key: Keycode, keymod: Mod) -> String {
    let named = match key {
        Keycode::Left => Some("ArrowLeft"),
        Keycode::Right => Some("ArrowRight"),
        Keycode::Up => Some("ArrowUp"),
        Keycode::Down => Some("ArrowDown"),
        Keycode::Space => Some(" "),
        Keycode::Return | Keycode::KpEnter => Some("Enter"),
        Keycode::Escape => Some("Escape"),
        Keycode::Backspace => Some("Backspace"),
        Keycode::Tab => Some("Tab"),
        Keycode::LShift | Keycode::RShift => Some("Shift"),
        Keycode::LCtrl | Keycode::RCtrl => Some("Control"),
        Keycode::LAlt | Keycode::RAlt => Some("Alt"),
        _ => None,
    };
    if let Some(name) = named {
        return name.to_string();
    }

    let name = key.name();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            let shift = keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD);
            let caps = keymod.contains(Mod::CAPSMOD);
            if shift != caps {
                c.to_ascii_uppercase().to_string()
            } else {
                c.to_ascii_lowercase().to_string()
            }
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: Keycode, keymod: Mod) -> Event {
        Event::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(key),
            scancode: None,
            keymod,
            repeat: false,
        }
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(key_name(Keycode::Left, Mod::NOMOD), "ArrowLeft");
        assert_eq!(key_name(Keycode::Space, Mod::NOMOD), " ");
        assert_eq!(key_name(Keycode::Return, Mod::NOMOD), "Enter");
        assert_eq!(key_name(Keycode::Backspace, Mod::NOMOD), "Backspace");
    }

    #[test]
    fn test_letters_follow_shift_and_caps() {
        assert_eq!(key_name(Keycode::A, Mod::NOMOD), "a");
        assert_eq!(key_name(Keycode::A, Mod::LSHIFTMOD), "A");
        assert_eq!(key_name(Keycode::A, Mod::CAPSMOD), "A");
        assert_eq!(key_name(Keycode::A, Mod::CAPSMOD | Mod::RSHIFTMOD), "a");
        assert_eq!(key_name(Keycode::Num7, Mod::NOMOD), "7");
    }

    fn key_up(key: Keycode) -> Event {
        Event::KeyUp {
            timestamp: 0,
            window_id: 0,
            keycode: Some(key),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        }
    }

    fn text(text: &str) -> Event {
        Event::TextInput {
            timestamp: 0,
            window_id: 0,
            text: text.to_string(),
        }
    }

    fn keys(actions: &[HostAction]) -> Vec<InputEvent> {
        actions
            .iter()
            .filter_map(|action| match action {
                HostAction::Input(event) => Some(event.clone()),
                HostAction::Quit => None,
            })
            .collect()
    }

    #[test]
    fn test_shifted_characters_come_from_text_events() {
        let mut translator = EventTranslator::new();
        let actions = translator.translate_all([
            key_down(Keycode::Slash, Mod::LSHIFTMOD),
            text("?"),
            key_down(Keycode::Num1, Mod::LSHIFTMOD),
            text("!"),
        ]);
        assert_eq!(
            keys(&actions),
            vec![InputEvent::key_down("?"), InputEvent::key_down("!")]
        );

        // Released under the name it was pressed with
        let actions = translator.translate_all([key_up(Keycode::Num1), key_up(Keycode::Slash)]);
        assert_eq!(keys(&actions), vec![InputEvent::key_up("!"), InputEvent::key_up("?")]);
    }

    #[test]
    fn test_named_keys_ignore_text_events() {
        let mut translator = EventTranslator::new();
        let actions = translator.translate_all([key_down(Keycode::Left, Mod::NOMOD), text("é")]);
        assert_eq!(
            keys(&actions),
            vec![
                InputEvent::key_down("ArrowLeft"),
                InputEvent::key_down("é"),
                InputEvent::key_up("é"),
            ]
        );
    }

    #[test]
    fn test_translate_key_and_quit() {
        assert_eq!(
            translate(&key_down(Keycode::Up, Mod::NOMOD)),
            Some(HostAction::Input(InputEvent::key_down("ArrowUp")))
        );
        assert_eq!(translate(&Event::Quit { timestamp: 0 }), Some(HostAction::Quit));
    }
}
