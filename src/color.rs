//! Colour values accepted by the drawing primitives
//!
//! Scripts pass colours as strings. The accepted notations are the CSS-like
//! ones kids copy from tutorials:
//!
//! - `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `rgb(r, g, b)` and `rgba(r, g, b, a)` with `a` in `0.0..=1.0`
//! - a handful of colour names (`red`, `white`, ...)

use crate::error::ColorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Parses a colour string, falling back to white when it is empty or
    /// unrecognised. This is what the script-facing drawing calls use.
    pub fn parse_or_white(value: &str) -> Color {
        if value.trim().is_empty() {
            return Color::WHITE;
        }
        value.parse().unwrap_or_else(|err| {
            log::debug!("{}, drawing in white", err);
            Color::WHITE
        })
    }

    fn from_hex(digits: &str) -> Option<Color> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        match digits.len() {
            3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn from_function(value: &str) -> Option<Color> {
        let (name, rest) = value.split_once('(')?;
        let args = rest.strip_suffix(')')?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();

        let channel = |s: &str| {
            let v = s.parse::<f32>().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        };
        let alpha = |s: &str| {
            let v = s.parse::<f32>().ok()?;
            Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
        };

        match (name.trim(), parts.as_slice()) {
            ("rgb", [r, g, b]) => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
            ("rgba", [r, g, b, a]) => {
                Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, alpha(a)?))
            }
            _ => None,
        }
    }

    fn from_name(value: &str) -> Option<Color> {
        let color = match value {
            "white" => Color::WHITE,
            "black" => Color::BLACK,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "lime" => Color::rgb(0, 255, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(128, 0, 128),
            "pink" => Color::rgb(255, 192, 203),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "brown" => Color::rgb(165, 42, 42),
            "cyan" => Color::rgb(0, 255, 255),
            "magenta" => Color::rgb(255, 0, 255),
            "transparent" => Color::rgba(0, 0, 0, 0),
            _ => return None,
        };
        Some(color)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim().to_ascii_lowercase();
        let parsed = match trimmed.strip_prefix('#') {
            Some(digits) => Color::from_hex(digits),
            None if trimmed.contains('(') => Color::from_function(&trimmed),
            None => Color::from_name(&trimmed),
        };
        parsed.ok_or_else(|| ColorError(value.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(feature = "sdl")]
impl From<Color> for sdl2::pixels::Color {
    fn from(color: Color) -> Self {
        sdl2::pixels::Color::RGBA(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_lengths() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#f008".parse::<Color>().unwrap(), Color::rgba(255, 0, 0, 136));
        assert_eq!("#4ecca3".parse::<Color>().unwrap(), Color::rgb(0x4e, 0xcc, 0xa3));
        assert_eq!("#0d111780".parse::<Color>().unwrap(), Color::rgba(0x0d, 0x11, 0x17, 0x80));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("#FF6B6B".parse::<Color>().unwrap(), Color::rgb(255, 107, 107));
        assert_eq!("Red".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!("rgb(1, 2, 3)".parse::<Color>().unwrap(), Color::rgb(1, 2, 3));
        // Scrim colour used by the prompt overlay
        assert_eq!("rgba(0, 0, 0, 0.8)".parse::<Color>().unwrap(), Color::rgba(0, 0, 0, 204));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#ggg".parse::<Color>().is_err());
        assert!("rgb(1, 2)".parse::<Color>().is_err());
        assert!("sparkly".parse::<Color>().is_err());
    }

    #[test]
    fn test_parse_or_white_fallback() {
        assert_eq!(Color::parse_or_white(""), Color::WHITE);
        assert_eq!(Color::parse_or_white("nope"), Color::WHITE);
        assert_eq!(Color::parse_or_white("#000"), Color::BLACK);
    }

    #[test]
    fn test_display_round_trips_through_serde() {
        let color = Color::rgba(18, 23, 31, 200);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#12171fc8\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
    }
}
