use std::fmt;

use serde::{Deserialize, Serialize};

/// sRGB-encoded color with channels in `[0, 1]`.
///
/// Channels are the hex bytes divided by 255 with no transfer function
/// applied; shading math runs directly on the encoded values.
///
/// Serialized as a `#rrggbb` hex string so profiles read like the palette
/// values they describe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid hex color `{0}`, expected #rrggbb")]
pub struct ParseColorError(pub String);

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_rgba8(self, alpha: f32) -> [u8; 4] {
        let [r, g, b] = self.to_rgb8();
        [r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    /// Component-wise product (light tint applied to a surface color)
    pub fn modulate(self, other: Color) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::from_hex)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}
