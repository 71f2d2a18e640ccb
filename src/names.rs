//! Evocative names for palette swatches, e.g. "Deep Cobalt Velour".

use crate::color::HslColor;

pub const TONE_MATERIALS: [&str; 10] = [
    "Lacquer", "Mineral", "Smoke", "Ink", "Pigment", "Velour", "Stone", "Alloy", "Glass", "Dust",
];

pub fn hue_family(hue: f64) -> &'static str {
    match hue {
        h if !(14.0..346.0).contains(&h) => "Crimson",
        h if h < 32.0 => "Amber",
        h if h < 52.0 => "Ochre",
        h if h < 76.0 => "Lime",
        h if h < 154.0 => "Jade",
        h if h < 196.0 => "Aqua",
        h if h < 244.0 => "Cobalt",
        h if h < 286.0 => "Violet",
        h if h < 326.0 => "Magenta",
        _ => "Rose",
    }
}

pub fn value_tone(saturation: f64, lightness: f64) -> &'static str {
    if lightness > 80.0 {
        "Porcelain"
    } else if lightness < 20.0 {
        "Nocturne"
    } else if saturation < 28.0 {
        "Muted"
    } else if saturation > 78.0 {
        "Vivid"
    } else if saturation > 60.0 && lightness > 62.0 {
        "Luminous"
    } else if lightness < 34.0 {
        "Deep"
    } else {
        "Balanced"
    }
}

// Rounds half up, then wraps to 32 bits.
fn tenths(value: f64) -> u32 {
    ((value * 10.0 + 0.5).floor() as i64) as u32
}

fn material_index(color: &HslColor, index: usize, seed: u32) -> usize {
    let mut hash = tenths(color.h)
        .wrapping_add((index as u32).wrapping_mul(193))
        .wrapping_mul(2_654_435_761);
    hash ^= tenths(color.s)
        .wrapping_add(seed)
        .wrapping_mul(2_246_822_519);
    hash ^= tenths(color.l).wrapping_add(17).wrapping_mul(3_266_489_917);
    hash ^= hash >> 16;
    (hash as i32).unsigned_abs() as usize % TONE_MATERIALS.len()
}

/// `"<value tone> <hue family> <material>"` for the swatch at `index` of a palette made from `seed`.
///
/// The material is picked by hashing the color with its slot and seed, so the same color can read
/// differently in another palette.
pub fn tone_name(color: &HslColor, index: usize, seed: u32) -> String {
    format!(
        "{} {} {}",
        value_tone(color.s, color.l),
        hue_family(color.h),
        TONE_MATERIALS[material_index(color, index, seed)]
    )
}
