// Simple color struct, created from an unsigned 32 representing RRGGBBAA
// or from a CSS hex string. Palettes in the config are lists of these.

use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 0xff,
        g: 0xff,
        b: 0xff,
        a: 0xff,
    };

    pub fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    // Accepts "#rrggbb" or "#rrggbbaa", leading '#' optional
    pub fn from_hex(hex: &str) -> Result<Color, String> {
        let digits = hex.trim().trim_start_matches('#');
        let num = u32::from_str_radix(digits, 16)
            .map_err(|_| format!("invalid hex color '{}'", hex))?;
        match digits.len() {
            6 => Ok(Color::from_u32((num << 8) | 0xff)),
            8 => Ok(Color::from_u32(num)),
            _ => Err(format!("invalid hex color '{}'", hex)),
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS `rgba()` string with the color's own alpha scaled by `alpha`.
    pub fn to_css(&self, alpha: f64) -> String {
        let a = (self.a as f64 / 255.0) * alpha.max(0.0).min(1.0);
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, a)
    }

    // Straight-alpha "source-over" of self (at `alpha`) onto dst
    pub fn blend_over(&self, dst: Color, alpha: f64) -> Color {
        let src_a = (self.a as f64 / 255.0) * alpha.max(0.0).min(1.0);
        let dst_a = dst.a as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return Color::from_u32(0);
        }
        let channel = |s: u8, d: u8| -> u8 {
            let c = (s as f64 * src_a + d as f64 * dst_a * (1.0 - src_a)) / out_a;
            c.round().max(0.0).min(255.0) as u8
        };

        Color {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: (out_a * 255.0).round() as u8,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
