//! Color types and HSL/RGB/hex conversions.

use serde::{Deserialize, Serialize};

use crate::math::{clamp, wrap_hue, Hue};

/// An HSL color: hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl HslColor {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        HslColor { h, s, l }
    }

    pub fn hue(&self) -> Hue {
        Hue::new(self.h)
    }

    pub fn to_rgb(&self) -> Rgb {
        let saturation = clamp(self.s, 0.0, 100.0) / 100.0;
        let lightness = clamp(self.l, 0.0, 100.0) / 100.0;
        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let segment = wrap_hue(self.h) / 60.0;
        let x = chroma * (1.0 - ((segment % 2.0) - 1.0).abs());

        let (r, g, b) = if segment < 1.0 {
            (chroma, x, 0.0)
        } else if segment < 2.0 {
            (x, chroma, 0.0)
        } else if segment < 3.0 {
            (0.0, chroma, x)
        } else if segment < 4.0 {
            (0.0, x, chroma)
        } else if segment < 5.0 {
            (x, 0.0, chroma)
        } else {
            (chroma, 0.0, x)
        };

        let m = lightness - chroma / 2.0;
        let channel = |v: f64| clamp(((v + m) * 255.0).round(), 0.0, 255.0) as u8;
        Rgb(channel(r), channel(g), channel(b))
    }

    pub fn to_hex(&self) -> String {
        self.to_rgb().to_hex()
    }
}

/// An 8-bit sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Parses `#RGB` or `#RRGGBB` (the `#` is optional, case-insensitive, surrounding whitespace
    /// ignored). Returns `None` for anything else.
    pub fn from_hex(input: &str) -> Option<Rgb> {
        let stripped = input.trim().replacen('#', "", 1);
        let expanded: String = if stripped.chars().count() == 3 {
            stripped.chars().flat_map(|c| [c, c]).collect()
        } else {
            stripped
        };
        let mut bytes = [0u8; 3];
        hex::decode_to_slice(expanded.as_bytes(), &mut bytes).ok()?;
        Some(Rgb(bytes[0], bytes[1], bytes[2]))
    }

    /// Like [`Rgb::from_hex`], but malformed input decodes to `fallback`.
    pub fn from_hex_or(input: &str, fallback: Rgb) -> Rgb {
        Rgb::from_hex(input).unwrap_or(fallback)
    }

    /// Canonical uppercase `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode_upper([self.0, self.1, self.2]))
    }

    pub fn to_hsl(self) -> HslColor {
        let red = f64::from(self.0) / 255.0;
        let green = f64::from(self.1) / 255.0;
        let blue = f64::from(self.2) / 255.0;

        let max = red.max(green).max(blue);
        let min = red.min(green).min(blue);
        let delta = max - min;

        let mut hue = 0.0;
        if delta != 0.0 {
            hue = if max == red {
                ((green - blue) / delta) % 6.0
            } else if max == green {
                (blue - red) / delta + 2.0
            } else {
                (red - green) / delta + 4.0
            };
            hue *= 60.0;
        }

        let lightness = (max + min) / 2.0;
        let saturation = if delta == 0.0 {
            0.0
        } else {
            delta / (1.0 - (2.0 * lightness - 1.0).abs())
        };

        HslColor {
            h: wrap_hue(hue),
            s: saturation * 100.0,
            l: lightness * 100.0,
        }
    }

    /// Shifts every channel by `drift`, rounding and clamping to `0..=255`.
    pub fn perturb(self, drift: f64) -> Rgb {
        let shift = |c: u8| clamp((f64::from(c) + drift).round(), 0.0, 255.0) as u8;
        Rgb(shift(self.0), shift(self.1), shift(self.2))
    }
}

/// Parses a hex string into HSL, treating malformed input as black.
pub fn hex_to_hsl(hex: &str) -> HslColor {
    Rgb::from_hex_or(hex, Rgb::BLACK).to_hsl()
}

/// A palette slot: an HSL color plus its cached hex projection.
///
/// Build these through [`PaletteColor::from_hsl`] so that `hex` always matches `hsl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub hsl: HslColor,
    pub hex: String,
}

impl PaletteColor {
    pub fn from_hsl(hsl: HslColor) -> Self {
        PaletteColor {
            hex: hsl.to_hex(),
            hsl,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_from_hex_forms() {
        let [r, g, b] = hex!("E8DCB4");
        assert_eq!(Rgb::from_hex("#E8DCB4"), Some(Rgb(r, g, b)));
        assert_eq!(Rgb::from_hex("  e8dcb4 "), Some(Rgb(r, g, b)));
        assert_eq!(Rgb::from_hex("#fa0"), Some(Rgb(0xff, 0xaa, 0x00)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#GGGGGG"), None);
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(hex_to_hsl("nonsense"), HslColor::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_to_hex_is_canonical_uppercase() {
        assert_eq!(Rgb(0x0a, 0xbc, 0xff).to_hex(), "#0ABCFF");
        assert_eq!(HslColor::new(350.0, 40.0, 50.0).to_hex(), "#B34D5E");
        assert_eq!(HslColor::new(0.0, 0.0, 100.0).to_hex(), "#FFFFFF");
        assert_eq!(HslColor::new(720.0, 100.0, 50.0).to_hex(), "#FF0000");
    }

    #[test]
    fn test_rgb_to_hsl() {
        let hsl = Rgb(0xff, 0x00, 0x00).to_hsl();
        assert_eq!(hsl, HslColor::new(0.0, 100.0, 50.0));
        let hsl = Rgb(0xff, 0x00, 0x80).to_hsl();
        assert!(hsl.h > 329.0 && hsl.h < 331.0);
        assert_eq!(Rgb(0x80, 0x80, 0x80).to_hsl().s, 0.0);
    }

    #[test]
    fn test_out_of_range_hsl_is_clamped_for_display() {
        assert_eq!(HslColor::new(-30.0, 150.0, -20.0).to_hex(), "#000000");
        assert_eq!(HslColor::new(200.0, 50.0, 140.0).to_hex(), "#FFFFFF");
    }

    #[test]
    fn test_perturb_saturates() {
        assert_eq!(Rgb(250, 5, 128).perturb(10.4), Rgb(255, 15, 138));
        assert_eq!(Rgb(250, 5, 128).perturb(-10.6), Rgb(239, 0, 117));
    }
}
