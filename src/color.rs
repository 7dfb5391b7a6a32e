//! # Colors
//!
//! Opaque sRGB colors written as `#RRGGBB` in every interchange record, plus
//! the named palettes the random theme and keyword highlights draw from.

use image::Rgba;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` literal.
    pub const fn from_u32(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Fully opaque pixel.
    #[inline]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// Pixel with the given alpha.
    #[inline]
    pub fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Accepts `#RRGGBB`, `RRGGBB` and the short `#RGB` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(format!("'{}' is not in the form #RRGGBB", s)),
        };
        let value = u32::from_str_radix(&expanded, 16)
            .map_err(|_| format!("'{}' is not in the form #RRGGBB", s))?;
        Ok(Rgb::from_u32(value))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct RgbVisitor;

impl Visitor<'_> for RgbVisitor {
    type Value = Rgb;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string in the form #RRGGBB")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse::<Rgb>().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Rgb, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(RgbVisitor)
    }
}

/// Soft pastel tones used for random themes and default backgrounds.
pub const MACARON: [Rgb; 18] = [
    Rgb::from_u32(0xFFB7B2),
    Rgb::from_u32(0xFFDAC1),
    Rgb::from_u32(0xE2F0CB),
    Rgb::from_u32(0xB5EAD7),
    Rgb::from_u32(0xC7CEEA),
    Rgb::from_u32(0xF8BBD0),
    Rgb::from_u32(0xE1BEE7),
    Rgb::from_u32(0xD1C4E9),
    Rgb::from_u32(0xC5CAE9),
    Rgb::from_u32(0xBBDEFB),
    Rgb::from_u32(0xB3E5FC),
    Rgb::from_u32(0xB2EBF2),
    Rgb::from_u32(0xB2DFDB),
    Rgb::from_u32(0xC8E6C9),
    Rgb::from_u32(0xDCEDC8),
    Rgb::from_u32(0xF0F4C3),
    Rgb::from_u32(0xFFF9C4),
    Rgb::from_u32(0xFFECB3),
];

/// Saturated colors for keyword highlights. Dark and cold tones are left out
/// so a highlight never reads as body text.
pub const BRIGHT: [Rgb; 12] = [
    Rgb::from_u32(0xFF2D55),
    Rgb::from_u32(0xFF3B30),
    Rgb::from_u32(0xFF9500),
    Rgb::from_u32(0xFFCC00),
    Rgb::from_u32(0x34C759),
    Rgb::from_u32(0x5AC8FA),
    Rgb::from_u32(0xFF6EC7),
    Rgb::from_u32(0xFFD60A),
    Rgb::from_u32(0x30D158),
    Rgb::from_u32(0x66D4CF),
    Rgb::from_u32(0xFF00FF),
    Rgb::from_u32(0x00FF00),
];

/// Classic frame colors.
pub const BORDER: [(&str, Rgb); 8] = [
    ("white", Rgb::from_u32(0xFFFFFF)),
    ("black", Rgb::from_u32(0x000000)),
    ("gold", Rgb::from_u32(0xFFD700)),
    ("silver", Rgb::from_u32(0xC0C0C0)),
    ("rose_gold", Rgb::from_u32(0xB76E79)),
    ("wood", Rgb::from_u32(0x8B5A2B)),
    ("navy", Rgb::from_u32(0x1E3A5F)),
    ("light_blue", Rgb::from_u32(0xBBDEFB)),
];
