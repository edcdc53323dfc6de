//! RGB colors.

use std::fmt;
use std::str::FromStr;

use crate::error::PersistError;

/// An opaque RGB color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const LIGHT_GRAY: Color = Color::new(192, 192, 192);
    pub const GRAY: Color = Color::new(128, 128, 128);
    pub const DARK_GRAY: Color = Color::new(64, 64, 64);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const PINK: Color = Color::new(255, 175, 175);
    pub const ORANGE: Color = Color::new(255, 200, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (surrounding whitespace allowed, hex digits in any case).
    pub fn parse(text: &str) -> Result<Self, PersistError> {
        let invalid = || PersistError::InvalidColor(text.to_string());
        let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 {
            return Err(invalid());
        }
        let rgb = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        Ok(Self::new(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        ))
    }

    /// Modulates this color by a light color and an intensity in `[0, 1]`.
    ///
    /// Each channel is `self * light * intensity / 255`, truncated.
    pub fn modulate(&self, light: &Color, intensity: f64) -> Color {
        let channel = |base: u8, light: u8| (base as f64 * light as f64 * intensity / 255.0) as u8;
        Color::new(
            channel(self.r, light.r),
            channel(self.g, light.g),
            channel(self.b, light.b),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}
