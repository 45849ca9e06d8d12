use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA color representation with f32 components in [0.0, 1.0] range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new RGBA color.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 1.0).
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Create a color from a hex string (`#RGB`, `#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ColorError::InvalidHex);
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHex);
        match hex.len() {
            3 => {
                let nibble = |i: usize| byte(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb8(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb8(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => {
                let a = byte(&hex[6..8])?;
                Ok(Self::rgb8(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)
                    .with_alpha(a as f32 / 255.0))
            }
            _ => Err(ColorError::InvalidHex),
        }
    }

    /// Parse the subset of CSS color syntax scene documents use:
    /// hex notation plus a handful of keywords.
    pub fn parse_css(value: &str) -> Result<Self, ColorError> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        match value.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "transparent" => Ok(Color::TRANSPARENT),
            "red" => Ok(Color::rgb(1.0, 0.0, 0.0)),
            "lime" => Ok(Color::rgb(0.0, 1.0, 0.0)),
            "blue" => Ok(Color::rgb(0.0, 0.0, 1.0)),
            _ => Err(ColorError::Unsupported(value.to_string())),
        }
    }

    /// Convert to RGBA u8 tuple.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    // --- Named constants ---

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// Editor accent used for selection outlines and the main-tile glow.
    pub const ACCENT: Color = Color {
        r: 0.0,
        g: 240.0 / 255.0,
        b: 1.0,
        a: 1.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse_css(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color string")]
    InvalidHex,
    #[error("unsupported css color: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex_rgb() {
        let c = Color::from_hex("#FF8800").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 255]);
    }

    #[test]
    fn test_color_from_hex_short() {
        let c = Color::from_hex("#0af").unwrap();
        assert_eq!(c.to_rgba8(), [0, 170, 255, 255]);
    }

    #[test]
    fn test_color_from_hex_rgba() {
        let c = Color::from_hex("#FF880080").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 128]);
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(Color::from_hex("invalid").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_parse_css_keywords() {
        assert_eq!("black".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(" Transparent ".parse::<Color>().unwrap(), Color::TRANSPARENT);
        assert!(Color::parse_css("rgb(1, 2, 3)").is_err());
    }

    #[test]
    fn test_default_background_parses() {
        let c = Color::parse_css("#0a0a0f").unwrap();
        assert_eq!(c.to_rgba8(), [10, 10, 15, 255]);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(format!("{}", Color::WHITE), "#ffffff");
        assert_eq!(format!("{}", Color::rgba(1.0, 0.0, 0.0, 0.5)), "#ff000080");
    }
}
