//! Colour values attached to layers and drawing entities.

use std::fmt;
use std::str::FromStr;

/// RGB colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const RED: Color = Color([255, 0, 0]);
    pub const GREEN: Color = Color([0, 255, 0]);
    pub const CYAN: Color = Color([0, 255, 255]);
    pub const MAGENTA: Color = Color([255, 0, 255]);
    pub const ORANGE: Color = Color([255, 165, 0]);
    /// Colour given to generated offset polylines.
    pub const OFFSET: Color = Color([255, 128, 0]);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid colour '{}'", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("invalid colour '{}': {}", s, e))
        };
        Ok(Color([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formatting() {
        assert_eq!(Color::OFFSET.to_string(), "#ff8000");
        assert_eq!("#00FF00".parse::<Color>().unwrap(), Color::GREEN);
    }

    #[test]
    fn rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn serde_uses_hex_string() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::RED);
    }
}
