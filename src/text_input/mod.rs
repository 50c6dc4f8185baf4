//! Modal text input
//!
//! `ask` puts a prompt on screen and hands the script a [`Deferred<String>`]
//! that settles once the player presses Enter. While a prompt is active it
//! owns the keyboard: every keystroke goes to the text buffer and nothing
//! reaches the game.
//!
//! # States
//!
//! - Idle: no prompt on screen; a request activates immediately
//! - Active: one prompt on screen; further requests wait in a FIFO queue
//!
//! Committing with Enter resolves the active request, arms a one-shot guard
//! that swallows a re-delivered Enter in the same frame, and activates the
//! next queued request straight away.

pub mod overlay;

pub use overlay::OverlayStyle;

use crate::deferred::Deferred;
use crate::input::InputOutcome;
use crate::surface::{DrawResult, Surface};
use std::collections::VecDeque;

#[derive(Debug)]
struct Request {
    prompt: String,
    resolver: Deferred<String>,
}

#[derive(Debug)]
pub struct TextInput {
    active: bool,
    buffer: String,
    prompt: String,
    resolver: Option<Deferred<String>>,
    caret_visible: bool,
    caret_timer: u32,
    just_ended: bool,
    queue: VecDeque<Request>,
    default_prompt: String,
}

impl TextInput {
    pub fn new(default_prompt: impl Into<String>) -> Self {
        TextInput {
            active: false,
            buffer: String::new(),
            prompt: String::new(),
            resolver: None,
            caret_visible: true,
            caret_timer: 0,
            just_ended: false,
            queue: VecDeque::new(),
            default_prompt: default_prompt.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    /// True between a commit and the start of the next frame.
    pub fn just_ended(&self) -> bool {
        self.just_ended
    }

    /// Shows `prompt`, or queues it behind the active one. An empty prompt
    /// falls back to the default.
    pub fn request(&mut self, prompt: &str) -> Deferred<String> {
        let prompt = if prompt.is_empty() {
            self.default_prompt.clone()
        } else {
            prompt.to_string()
        };
        let resolver = Deferred::new();

        if self.active {
            log::debug!("queueing prompt {:?}", prompt);
            self.queue.push_back(Request {
                prompt,
                resolver: resolver.clone(),
            });
        } else {
            self.activate(Request {
                prompt,
                resolver: resolver.clone(),
            });
        }
        resolver
    }

    fn activate(&mut self, request: Request) {
        self.active = true;
        self.buffer.clear();
        self.prompt = request.prompt;
        self.resolver = Some(request.resolver);
        self.caret_visible = true;
        self.caret_timer = 0;
    }

    /// Consumes one keystroke (raw host key name) while active.
    pub fn handle_key(&mut self, key: &str) -> InputOutcome {
        if !self.active {
            return InputOutcome::PASS;
        }

        match key {
            "Enter" => return self.commit(),
            "Backspace" => {
                self.buffer.pop();
            }
            _ => {
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if !c.is_control() {
                        self.buffer.push(c);
                    }
                }
            }
        }
        InputOutcome::CONSUMED
    }

    fn commit(&mut self) -> InputOutcome {
        self.active = false;
        self.just_ended = true;
        let text = std::mem::take(&mut self.buffer);
        if let Some(resolver) = self.resolver.take() {
            resolver.resolve(text);
        }

        match self.queue.pop_front() {
            Some(next) => {
                self.activate(next);
                InputOutcome::CONSUMED
            }
            None => InputOutcome {
                suppress_default: true,
                release_focus: true,
            },
        }
    }

    /// Consumes the one-shot guard. Returns whether it was armed.
    pub fn take_guard(&mut self) -> bool {
        std::mem::replace(&mut self.just_ended, false)
    }

    pub fn clear_guard(&mut self) {
        self.just_ended = false;
    }

    /// Advances the caret blink by one frame.
    pub fn tick_caret(&mut self, interval: u32) {
        self.caret_timer += 1;
        if self.caret_timer > interval {
            self.caret_visible = !self.caret_visible;
            self.caret_timer = 0;
        }
    }

    /// Draws the overlay for the active prompt and advances the caret.
    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        style: &OverlayStyle,
        caret_interval: u32,
    ) -> DrawResult {
        if !self.active {
            return Ok(());
        }
        self.tick_caret(caret_interval);
        overlay::draw(surface, style, &self.prompt, &self.buffer, self.caret_visible)
    }

    /// Hides the modal. The pending resolver is left unsettled.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Back to idle with nothing queued. Pending resolvers are dropped unsettled.
    pub fn reset(&mut self) {
        self.active = false;
        self.buffer.clear();
        self.prompt.clear();
        self.resolver = None;
        self.just_ended = false;
        self.queue.clear();
        self.caret_visible = true;
        self.caret_timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input.handle_key(&c.to_string());
        }
    }

    #[test]
    fn test_request_activates_when_idle() {
        let mut input = TextInput::new("Input:");
        let answer = input.request("Name?");
        assert!(input.is_active());
        assert_eq!(input.prompt(), "Name?");
        assert!(answer.is_pending());
    }

    #[test]
    fn test_empty_prompt_uses_default() {
        let mut input = TextInput::new("Input:");
        input.request("");
        assert_eq!(input.prompt(), "Input:");
    }

    #[test]
    fn test_editing_keys() {
        let mut input = TextInput::new("Input:");
        input.request("Name?");
        type_text(&mut input, "Bex");
        input.handle_key("Backspace");
        input.handle_key("n");
        // Named keys other than Enter/Backspace are ignored
        input.handle_key("Shift");
        input.handle_key("ArrowLeft");
        assert_eq!(input.buffer(), "Ben");

        // Backspace on an empty buffer is harmless
        let mut empty = TextInput::new("Input:");
        empty.request("x");
        assert_eq!(empty.handle_key("Backspace"), InputOutcome::CONSUMED);
        assert_eq!(empty.buffer(), "");
    }

    #[test]
    fn test_queue_resolves_in_order() {
        let mut input = TextInput::new("Input:");
        let name = input.request("Name?");
        let age = input.request("Age?");
        assert_eq!(input.queued(), 1);
        assert_eq!(input.prompt(), "Name?");

        type_text(&mut input, "Ben");
        let outcome = input.handle_key("Enter");
        assert!(!outcome.release_focus);
        assert_eq!(name.value(), Some("Ben".to_string()));

        // Next prompt is up immediately with an empty buffer
        assert!(input.is_active());
        assert_eq!(input.prompt(), "Age?");
        assert_eq!(input.buffer(), "");
        assert!(age.is_pending());

        type_text(&mut input, "9");
        let outcome = input.handle_key("Enter");
        assert!(outcome.release_focus);
        assert_eq!(age.value(), Some("9".to_string()));
        assert!(!input.is_active());
    }

    #[test]
    fn test_commit_arms_guard_once() {
        let mut input = TextInput::new("Input:");
        input.request("Name?");
        input.handle_key("Enter");
        assert!(input.just_ended());
        assert!(input.take_guard());
        assert!(!input.take_guard());
    }

    #[test]
    fn test_stop_leaves_resolver_pending() {
        let mut input = TextInput::new("Input:");
        let answer = input.request("Name?");
        input.stop();
        assert!(!input.is_active());
        assert!(answer.is_pending());
        // Keys no longer reach the buffer
        assert_eq!(input.handle_key("a"), InputOutcome::PASS);
    }

    #[test]
    fn test_caret_toggles_after_interval() {
        let mut input = TextInput::new("Input:");
        input.request("Name?");
        for _ in 0..30 {
            input.tick_caret(30);
        }
        assert!(input.caret_visible());
        input.tick_caret(30);
        assert!(!input.caret_visible());
    }
}
