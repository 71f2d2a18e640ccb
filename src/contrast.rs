//! WCAG luminance and contrast, plus hue spread.

use crate::color::Rgb;
use crate::math::wrap_hue;

/// Contrast ratio that text must reach against its background to pass WCAG AA.
pub const AA_TEXT_TARGET: f64 = 4.5;

/// Upper end of the [`contrast_heat`] scale.
pub const MAX_CONTRAST_TARGET: f64 = 7.0;

/// Relative luminance of a hex color; malformed input is treated as black.
pub fn relative_luminance(hex: &str) -> f64 {
    let Rgb(r, g, b) = Rgb::from_hex_or(hex, Rgb::BLACK);
    let linear = |channel: u8| {
        let srgb = f64::from(channel) / 255.0;
        if srgb <= 0.03928 {
            srgb / 12.92
        } else {
            ((srgb + 0.055) / 1.055).powf(2.4)
        }
    };
    linear(r) * 0.2126 + linear(g) * 0.7152 + linear(b) * 0.0722
}

/// `(lighter + 0.05) / (darker + 0.05)`. Symmetric and always at least `1.0`.
pub fn contrast_ratio(hex_a: &str, hex_b: &str) -> f64 {
    let l_a = relative_luminance(hex_a);
    let l_b = relative_luminance(hex_b);
    (l_a.max(l_b) + 0.05) / (l_a.min(l_b) + 0.05)
}

/// Near-black or near-white, whichever reads better on `hex`.
pub fn readable_text_color(hex: &str) -> &'static str {
    if relative_luminance(hex) > 0.44 {
        "#111317"
    } else {
        "#F8FAFC"
    }
}

/// CSS color for a heat-map cell: red for poor contrast through green at [`MAX_CONTRAST_TARGET`].
pub fn contrast_heat(ratio: f64) -> String {
    let clamped = ratio.clamp(1.0, MAX_CONTRAST_TARGET);
    let normalized = (clamped - 1.0) / (MAX_CONTRAST_TARGET - 1.0);
    format!("hsl({} 72% 35%)", 6.0 + normalized * 114.0)
}

/// Arc of the wheel covered by `hues`: `360` minus the largest circular gap between neighbours.
///
/// Hues are wrapped into `[0, 360)` first. Fewer than two hues spread over nothing.
pub fn hue_spread(hues: &[f64]) -> f64 {
    if hues.len() < 2 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = hues.iter().map(|&hue| wrap_hue(hue)).collect();
    sorted.sort_by(f64::total_cmp);
    let largest_gap = sorted
        .iter()
        .zip(sorted.iter().skip(1).chain([sorted[0] + 360.0].iter()))
        .map(|(current, next)| next - current)
        .fold(0.0, f64::max);
    360.0 - largest_gap
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "got {}, want {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_luminance() {
        assert_eq!(relative_luminance("#000000"), 0.0);
        assert_eq!(relative_luminance("#FFFFFF"), 1.0);
        assert_close(relative_luminance("#E8DCB4"), 0.7163749174163431);
        assert_eq!(relative_luminance("zzz"), 0.0);
    }

    #[test]
    fn test_contrast_ratio() {
        assert_eq!(contrast_ratio("#FFF", "#000"), 21.0);
        assert_close(contrast_ratio("#E8DCB4", "#012057"), 11.391511181378581);
        assert_close(contrast_ratio("#C4006B", "#038A86"), 1.4000746324538227);
        assert_eq!(contrast_ratio("#123456", "#123456"), 1.0);
    }

    #[test]
    fn test_readable_text_color() {
        assert_eq!(readable_text_color("#FFFFFF"), "#111317");
        assert_eq!(readable_text_color("#012057"), "#F8FAFC");
    }

    #[test]
    fn test_contrast_heat() {
        assert_eq!(contrast_heat(0.5), "hsl(6 72% 35%)");
        assert_eq!(contrast_heat(21.0), "hsl(120 72% 35%)");
    }

    #[test]
    fn test_hue_spread() {
        assert_eq!(hue_spread(&[]), 0.0);
        assert_eq!(hue_spread(&[42.0]), 0.0);
        assert_eq!(hue_spread(&[10.0, 350.0]), 20.0);
        assert_eq!(hue_spread(&[0.0, 120.0, 240.0]), 240.0);
        assert_eq!(hue_spread(&[90.0, 90.0]), 0.0);
        // Unwrapped hues, as locked slots may carry.
        assert_eq!(hue_spread(&[0.0, 400.0]), 40.0);
        assert_eq!(hue_spread(&[-30.0, 30.0]), 60.0);
        assert_eq!(hue_spread(&[720.0, 0.0]), 0.0);
    }
}
