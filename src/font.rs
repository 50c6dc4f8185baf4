//! 5x7 bitmap font
//!
//! Procedural text rendering using a 5x7 bitmap font. Every lit pixel is drawn
//! as a filled rectangle on a [`Surface`], so any backend that can fill
//! rectangles can also draw text.
//!
//! Text sizes are given in pixels the way scripts think about them ("20px
//! text"); the font picks the nearest whole-number scale of its 7 pixel
//! glyph height.

use crate::color::Color;
use crate::error::RenderError;
use crate::surface::{RectF, Surface};

/// Glyph width in font pixels
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph height in font pixels
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character (glyph plus one pixel spacing)
pub const ADVANCE: u32 = 6;

/// Whole-number font scale used for a requested pixel size.
pub fn scale_for_size(size: f32) -> f32 {
    (size / GLYPH_HEIGHT as f32).round().max(1.0)
}

/// Width in surface pixels of `text` drawn at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    let count = text.chars().count();
    if count == 0 {
        return 0.0;
    }
    let scale = scale_for_size(size);
    // The trailing spacing column after the last glyph is not part of the text
    (count as u32 * ADVANCE - (ADVANCE - GLYPH_WIDTH)) as f32 * scale
}

/// Height in surface pixels of a line drawn at `size`.
pub fn line_height(size: f32) -> f32 {
    GLYPH_HEIGHT as f32 * scale_for_size(size)
}

/// Row patterns for one character (1 = pixel on, 0 = pixel off).
///
/// Lower-case letters share the upper-case glyphs. Unknown characters render
/// as a full block so missing glyphs are visible rather than silently dropped.
pub fn glyph(c: char) -> &'static [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => &[0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => &[0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => &[0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => &[0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => &[0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => &[0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => &[0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => &[0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => &[0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => &[0b10001, 0b11011, 0b10101, 0b10001, 0b10001, 0b10001, 0b10001],
        'N' => &[0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => &[0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        'T' => &[0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10101, 0b11011, 0b10001],
        'X' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => &[0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => &[0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => &[0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => &[0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => &[0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => &[0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => &[0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => &[0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => &[0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => &[0b00000, 0b00000, 0b00100, 0b00000, 0b00100, 0b00000, 0b00000],
        ';' => &[0b00000, 0b00000, 0b00100, 0b00000, 0b00100, 0b00100, 0b01000],
        '/' => &[0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '<' => &[0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
        '>' => &[0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
        '-' => &[0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '+' => &[0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '=' => &[0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '*' => &[0b00000, 0b10101, 0b01110, 0b11111, 0b01110, 0b10101, 0b00000],
        '_' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '.' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '!' => &[0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => &[0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '\'' => &[0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => &[0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '#' => &[0b01010, 0b11111, 0b01010, 0b01010, 0b01010, 0b11111, 0b01010],
        '%' => &[0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '(' => &[0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => &[0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        ' ' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => &[0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111],
    }
}

/// Draws `text` with its top-left corner at (`x`, `top`).
///
/// Each lit font pixel becomes one `fill_rect` call of `scale × scale`
/// surface pixels.
pub fn draw_text<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    x: f32,
    top: f32,
    color: Color,
    size: f32,
) -> Result<(), RenderError> {
    let scale = scale_for_size(size);
    let advance = ADVANCE as f32 * scale;

    for (i, c) in text.chars().enumerate() {
        let char_x = x + i as f32 * advance;

        for (row, &pattern_row) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (pattern_row >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    surface.fill_rect(
                        RectF::new(
                            char_x + col as f32 * scale,
                            top + row as f32 * scale,
                            scale,
                            scale,
                        ),
                        color,
                    )?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_for_size() {
        assert_eq!(scale_for_size(7.0), 1.0);
        assert_eq!(scale_for_size(14.0), 2.0);
        assert_eq!(scale_for_size(20.0), 3.0);
        // Tiny sizes still draw at one pixel per font pixel
        assert_eq!(scale_for_size(2.0), 1.0);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 14.0), 0.0);
        // One glyph: 5 pixels at scale 2
        assert_eq!(text_width("A", 14.0), 10.0);
        // Three glyphs: 3 * 6 - 1 = 17 pixels at scale 1
        assert_eq!(text_width("BEN", 7.0), 17.0);
    }

    #[test]
    fn test_lowercase_shares_uppercase_glyphs() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('z'), glyph('Z'));
    }

    #[test]
    fn test_unknown_character_is_full_block() {
        assert!(glyph('€').iter().all(|&row| row == 0b11111));
    }
}
