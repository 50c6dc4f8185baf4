//! Prompt overlay renderer
//!
//! Layout: a translucent scrim over the whole surface, a centred bordered box
//! with the prompt, an input field showing the tail of the buffer, a blinking
//! caret and a hint line under the box.

use crate::color::Color;
use crate::surface::{DrawResult, RectF, Surface};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub scrim: Color,
    pub box_fill: Color,
    pub border: Color,
    pub field_fill: Color,
    pub text: Color,
    pub caret: Color,
    pub hint_color: Color,
    pub box_width: f32,
    pub box_height: f32,
    pub prompt_size: f32,
    pub text_size: f32,
    pub hint_size: f32,
    pub hint: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            scrim: Color::rgba(0, 0, 0, 204),
            box_fill: Color::rgb(0x12, 0x17, 0x1f),
            border: Color::rgb(0x00, 0xd4, 0xff),
            field_fill: Color::rgb(0x0d, 0x11, 0x17),
            text: Color::rgb(0xe0, 0xe6, 0xed),
            caret: Color::rgb(0x00, 0xd4, 0xff),
            hint_color: Color::rgb(0x6b, 0x7a, 0x8a),
            box_width: 500.0,
            box_height: 140.0,
            prompt_size: 20.0,
            text_size: 18.0,
            hint_size: 14.0,
            hint: "Press Enter to confirm".to_string(),
        }
    }
}

const FIELD_MARGIN: f32 = 30.0;
const FIELD_TOP: f32 = 55.0;
const FIELD_HEIGHT: f32 = 40.0;
const TEXT_INSET: f32 = 10.0;
const BORDER_WIDTH: f32 = 2.0;

/// Drops characters from the front until `text` fits in `max_width`.
pub fn visible_tail<'a>(
    surface: &dyn Surface,
    text: &'a str,
    size: f32,
    max_width: f32,
) -> &'a str {
    let mut tail = text;
    while !tail.is_empty() && surface.measure_text(tail, size) > max_width {
        let mut chars = tail.chars();
        chars.next();
        tail = chars.as_str();
    }
    tail
}

fn centered_text(
    surface: &mut dyn Surface,
    text: &str,
    center_x: f32,
    y: f32,
    color: Color,
    size: f32,
) -> DrawResult {
    let width = surface.measure_text(text, size);
    surface.fill_text(text, center_x - width / 2.0, y, color, size)
}

pub fn draw(
    surface: &mut dyn Surface,
    style: &OverlayStyle,
    prompt: &str,
    buffer: &str,
    caret_visible: bool,
) -> DrawResult {
    let (width, height) = surface.size();
    let (width, height) = (width as f32, height as f32);

    surface.fill_rect(RectF::new(0.0, 0.0, width, height), style.scrim)?;

    let dialog = RectF::new(
        (width - style.box_width) / 2.0,
        (height - style.box_height) / 2.0,
        style.box_width,
        style.box_height,
    );
    surface.fill_rect(dialog, style.box_fill)?;
    surface.stroke_rect(dialog, style.border, BORDER_WIDTH)?;

    centered_text(surface, prompt, width / 2.0, dialog.y + 35.0, style.text, style.prompt_size)?;

    let field = RectF::new(
        dialog.x + FIELD_MARGIN,
        dialog.y + FIELD_TOP,
        dialog.width - 2.0 * FIELD_MARGIN,
        FIELD_HEIGHT,
    );
    surface.fill_rect(field, style.field_fill)?;
    surface.stroke_rect(field, style.border, BORDER_WIDTH)?;

    let max_text = field.width - 2.0 * TEXT_INSET - TEXT_INSET;
    let shown = visible_tail(surface, buffer, style.text_size, max_text);
    surface.fill_text(shown, field.x + TEXT_INSET, field.y + 27.0, style.text, style.text_size)?;

    if caret_visible {
        let text_width = surface.measure_text(shown, style.text_size);
        surface.fill_rect(
            RectF::new(field.x + TEXT_INSET + text_width + 2.0, field.y + 8.0, 2.0, 24.0),
            style.caret,
        )?;
    }

    centered_text(
        surface,
        &style.hint,
        width / 2.0,
        dialog.y + dialog.height + 25.0,
        style.hint_color,
        style.hint_size,
    )
}
