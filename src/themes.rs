//! The bundled catalog of curated themes.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

pub mod custom;

const THEMES_JSON: &str = include_str!("themes.json");

/// Number of colors in a palette, and in a normalized custom theme.
pub const SWATCH_COUNT: usize = 5;

/// A named, ordered list of reference colors that palettes are sampled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteTheme {
    pub id: String,
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteTheme {
    /// A theme is usable as a sampling source as long as it has an id; an empty color list is
    /// handled by the generator.
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Id and display name, for theme pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WireThemeCatalog {
    version: u32,
    themes: Vec<PaletteTheme>,
}

#[derive(Debug)]
pub struct ThemeCatalog {
    version: u32,
    themes: Vec<PaletteTheme>,
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeFormatError {
    #[error("theme has an empty id")]
    EmptyId,
    #[error("duplicate theme id {id:?}")]
    DuplicateTheme { id: String },
    #[error("theme {id:?} has {count} colors; curated themes need at least 5")]
    TooFewColors { id: String, count: usize },
    #[error("theme {id:?} has malformed color {color:?}")]
    MalformedColor { id: String, color: String },
}

impl ThemeCatalog {
    /// The curated catalog shipped with the crate, parsed once on first use.
    pub fn curated() -> &'static ThemeCatalog {
        static CURATED: OnceLock<ThemeCatalog> = OnceLock::new();
        CURATED.get_or_init(ThemeCatalog::from_bundle)
    }

    pub fn from_bundle() -> Self {
        let wire: WireThemeCatalog =
            serde_json::from_str(THEMES_JSON).expect("bundled themes are invalid JSON");
        ThemeCatalog::from_wire(wire).expect("bundled themes are not a valid catalog")
    }

    pub fn from_wire(wire: WireThemeCatalog) -> Result<Self, ThemeFormatError> {
        let mut seen = HashSet::with_capacity(wire.themes.len());
        for theme in &wire.themes {
            if theme.id.is_empty() {
                return Err(ThemeFormatError::EmptyId);
            }
            if !seen.insert(theme.id.as_str()) {
                return Err(ThemeFormatError::DuplicateTheme {
                    id: theme.id.clone(),
                });
            }
            if theme.colors.len() < SWATCH_COUNT {
                return Err(ThemeFormatError::TooFewColors {
                    id: theme.id.clone(),
                    count: theme.colors.len(),
                });
            }
            if let Some(bad) = theme.colors.iter().find(|c| Rgb::from_hex(c).is_none()) {
                return Err(ThemeFormatError::MalformedColor {
                    id: theme.id.clone(),
                    color: bad.clone(),
                });
            }
        }
        Ok(ThemeCatalog {
            version: wire.version,
            themes: wire.themes,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn themes(&self) -> &[PaletteTheme] {
        &self.themes
    }

    pub fn get(&self, id: &str) -> Option<&PaletteTheme> {
        self.themes.iter().find(|theme| theme.id == id)
    }

    pub fn options(&self) -> Vec<ThemeOption> {
        self.themes
            .iter()
            .map(|theme| ThemeOption {
                id: theme.id.clone(),
                name: theme.name.clone(),
            })
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|theme| theme.id.as_str())
    }
}

/// Curated themes followed by `pool`, keeping the first theme seen for each id and dropping
/// malformed entries. The result is never empty.
pub fn merge_theme_pool<'a>(pool: &'a [PaletteTheme]) -> Vec<&'a PaletteTheme> {
    let curated: &'a [PaletteTheme] = ThemeCatalog::curated().themes();
    let mut seen = HashSet::with_capacity(curated.len() + pool.len());
    curated
        .iter()
        .chain(pool.iter())
        .filter(|&theme| theme.is_well_formed() && seen.insert(theme.id.as_str()))
        .collect()
}
