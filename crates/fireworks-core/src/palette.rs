//! Particle colors and the default burst palette

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGB color, serialized as a `#rrggbb` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex form used for CSS `background-color`
    pub fn as_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn as_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

/// Error parsing a `#rrggbb` color
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}': expected #rrggbb")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.as_hex()
    }
}

/// The ten burst colors: red, green, blue, yellow, magenta, cyan, orange,
/// hot pink, white, deep pink
pub const DEFAULT_PALETTE: [Color; 10] = [
    Color::new(0xff, 0x00, 0x00),
    Color::new(0x00, 0xff, 0x00),
    Color::new(0x00, 0x00, 0xff),
    Color::new(0xff, 0xff, 0x00),
    Color::new(0xff, 0x00, 0xff),
    Color::new(0x00, 0xff, 0xff),
    Color::new(0xff, 0xa5, 0x00),
    Color::new(0xff, 0x69, 0xb4),
    Color::new(0xff, 0xff, 0xff),
    Color::new(0xff, 0x14, 0x93),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let orange: Color = "#ffa500".parse().unwrap();
        assert_eq!(orange, Color::new(255, 165, 0));
        assert_eq!(orange.as_hex(), "#ffa500");
        assert_eq!(orange.as_css(), "rgb(255, 165, 0)");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("ffa500".parse::<Color>().is_err());
        assert!("#ffa50".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("#ffé500".parse::<Color>().is_err());
    }

    #[test]
    fn test_palette_is_distinct() {
        for (i, a) in DEFAULT_PALETTE.iter().enumerate() {
            for b in &DEFAULT_PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let json = serde_json::to_string(&DEFAULT_PALETTE[6]).unwrap();
        assert_eq!(json, "\"#ffa500\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DEFAULT_PALETTE[6]);
    }
}
