use serde::Serialize;

use super::{generate_palette, locked_colors, Locks, PaletteSession};
use crate::color::PaletteColor;
use crate::rand::derive_variant_seed;
use crate::themes::{PaletteTheme, SWATCH_COUNT};

pub const VARIANT_COUNT: usize = 12;
pub const VARIANT_BASE_THEME_ID: &str = "__variant-base";

/// The palette that a batch of variants is fanned out from.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSnapshot {
    pub seed: u32,
    pub base_palette: [PaletteColor; SWATCH_COUNT],
    pub locks: Locks,
    pub theme_id: String,
    pub theme_name: String,
}

impl From<&PaletteSession> for VariantSnapshot {
    fn from(session: &PaletteSession) -> Self {
        VariantSnapshot {
            seed: session.seed,
            base_palette: session.palette.clone(),
            locks: session.locks,
            theme_id: session.theme_id.clone(),
            theme_name: session.theme_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub seed: u32,
    pub theme_id: String,
    pub theme_name: String,
    pub colors: [PaletteColor; SWATCH_COUNT],
}

impl VariantSnapshot {
    /// A one-off theme made of the snapshot's own colors.
    pub fn base_theme(&self) -> PaletteTheme {
        PaletteTheme {
            id: VARIANT_BASE_THEME_ID.to_owned(),
            name: "Variant Base".to_owned(),
            colors: self.base_palette.iter().map(|c| c.hex.clone()).collect(),
        }
    }

    /// [`VARIANT_COUNT`] palettes sampled around the snapshot, keeping its locked slots.
    pub fn variants(&self) -> Vec<Variant> {
        let base_theme = self.base_theme();
        let locked = locked_colors(&self.base_palette, &self.locks);
        let pool = std::slice::from_ref(&base_theme);
        (0..VARIANT_COUNT as u32)
            .map(|index| {
                let seed = derive_variant_seed(self.seed, 0, index);
                let generated = generate_palette(seed, &locked, Some(VARIANT_BASE_THEME_ID), pool);
                Variant {
                    seed,
                    theme_id: self.theme_id.clone(),
                    theme_name: self.theme_name.clone(),
                    colors: generated.colors,
                }
            })
            .collect()
    }
}
