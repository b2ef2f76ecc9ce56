//! Color mapping utilities for SVG visualization.

use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() { return None }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Fill for regions without data.
pub(crate) const NO_DATA: Rgb = Rgb::new(204, 204, 204);

/// Fill for regions whose value falls outside the field's band.
pub(crate) const MASKED: Rgb = Rgb::new(115, 115, 115);

/// Two-stop linear color ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorRamp {
    pub low: Rgb,
    pub high: Rgb,
}

impl ColorRamp {
    pub const fn new(low: Rgb, high: Rgb) -> Self { Self { low, high } }

    /// Light (#deebf7) to dark (#08519c) blue.
    pub const fn blues() -> Self { Self::new(Rgb::new(0xde, 0xeb, 0xf7), Rgb::new(0x08, 0x51, 0x9c)) }

    /// Pale yellow (#ffffb2) to red (#bd0026), for temperatures.
    pub const fn heat() -> Self { Self::new(Rgb::new(0xff, 0xff, 0xb2), Rgb::new(0xbd, 0x00, 0x26)) }

    /// Color of `value` within `[min, max]`; values outside are clamped.
    pub fn color(&self, value: f64, min: f64, max: f64) -> Rgb {
        let range = if max > min { max - min } else { 1.0 };
        let t = ((value - min) / range).clamp(0.0, 1.0);

        let lerp = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };

        Rgb::new(lerp(self.low.r, self.high.r), lerp(self.low.g, self.high.g), lerp(self.low.b, self.high.b))
    }
}

impl Default for ColorRamp {
    fn default() -> Self { Self::blues() }
}
