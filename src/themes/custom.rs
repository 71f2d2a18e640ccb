//! User-created themes: normalization, id allocation, and the persisted collection.

use std::collections::HashSet;

use serde_json::Value;

use super::{PaletteTheme, ThemeCatalog, SWATCH_COUNT};
use crate::color::Rgb;

pub const CUSTOM_THEME_PREFIX: &str = "custom";
pub const MAX_CUSTOM_THEMES: usize = 24;
pub const MAX_THEME_NAME_CHARS: usize = 40;

const DEFAULT_THEME_NAME: &str = "Custom Palette";

/// Canonical `#RRGGBB` for a 3- or 6-digit hex string, or `None` if it is malformed.
pub fn normalize_hex(value: &str) -> Option<String> {
    Rgb::from_hex(value).map(Rgb::to_hex)
}

/// Lowercase slug of `value` restricted to `[a-z0-9-]`, prefixed with `custom-`.
pub fn sanitize_custom_theme_id(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "palette" } else { slug };
    format!("{CUSTOM_THEME_PREFIX}-{slug}")
}

/// Sanitized id for `name`, suffixed with `-2`, `-3`, ... until it is not in `existing`.
pub fn build_custom_theme_id(name: &str, existing: &HashSet<String>) -> String {
    let base = sanitize_custom_theme_id(name);
    let mut candidate = base.clone();
    let mut suffix = 2;
    while existing.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_THEME_NAME_CHARS).collect()
}

/// Validates one persisted theme record.
///
/// The record must carry string `id` and `name` fields and at least five `colors`; the first five
/// entries that normalize to hex are kept and there must be exactly five of them.
pub fn normalize_custom_theme(value: &Value) -> Option<PaletteTheme> {
    let id = value.get("id")?.as_str()?;
    let name = value.get("name")?.as_str()?;
    let colors = value.get("colors")?.as_array()?;
    if colors.len() < SWATCH_COUNT {
        return None;
    }

    let colors: Vec<String> = colors
        .iter()
        .filter_map(|entry| normalize_hex(entry.as_str()?))
        .take(SWATCH_COUNT)
        .collect();
    if colors.len() != SWATCH_COUNT {
        return None;
    }

    let name = truncate_name(name.trim());
    Some(PaletteTheme {
        id: sanitize_custom_theme_id(id),
        name: if name.is_empty() {
            DEFAULT_THEME_NAME.to_owned()
        } else {
            name
        },
        colors,
    })
}

/// Parses a persisted list of custom themes, skipping malformed records and ids that collide with
/// the curated catalog or an earlier record. Anything but an array parses to an empty list.
pub fn parse_custom_themes(value: &Value) -> Vec<PaletteTheme> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let mut used: HashSet<String> = ThemeCatalog::curated().ids().map(str::to_owned).collect();
    items
        .iter()
        .filter_map(normalize_custom_theme)
        .filter(|theme| used.insert(theme.id.clone()))
        .collect()
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SaveThemeError {
    #[error("name your custom palette first")]
    MissingName,
    #[error("all 5 colors must be valid hex values")]
    InvalidColors,
}

/// The user's custom themes, most recent first, capped at [`MAX_CUSTOM_THEMES`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CustomThemes {
    themes: Vec<PaletteTheme>,
}

impl CustomThemes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the collection from its persisted JSON blob. A blob that is not JSON restores to
    /// an empty collection.
    pub fn from_json(blob: &str) -> Self {
        match serde_json::from_str::<Value>(blob) {
            Ok(value) => CustomThemes {
                themes: parse_custom_themes(&value),
            },
            Err(err) => {
                tracing::warn!(error = %err, "discarding corrupt custom theme blob");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.themes).unwrap_or_else(|_| "[]".to_owned())
    }

    pub fn as_slice(&self) -> &[PaletteTheme] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Saves a new theme named `name` from `colors`, returning it.
    ///
    /// The id is derived from the name and made unique against the curated catalog and the
    /// existing custom themes. The new theme goes to the front; the oldest is dropped past the cap.
    pub fn save<S: AsRef<str>>(
        &mut self,
        name: &str,
        colors: &[S],
    ) -> Result<&PaletteTheme, SaveThemeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SaveThemeError::MissingName);
        }
        let colors: Vec<String> = colors
            .iter()
            .filter_map(|c| normalize_hex(c.as_ref()))
            .take(SWATCH_COUNT)
            .collect();
        if colors.len() != SWATCH_COUNT {
            return Err(SaveThemeError::InvalidColors);
        }

        let used: HashSet<String> = ThemeCatalog::curated()
            .ids()
            .chain(self.themes.iter().map(|t| t.id.as_str()))
            .map(str::to_owned)
            .collect();
        let theme = PaletteTheme {
            id: build_custom_theme_id(name, &used),
            name: truncate_name(name),
            colors,
        };
        self.themes.insert(0, theme);
        self.themes.truncate(MAX_CUSTOM_THEMES);
        Ok(&self.themes[0])
    }

    /// Removes the theme with `id`, returning whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.themes.len();
        self.themes.retain(|theme| theme.id != id);
        self.themes.len() != before
    }
}
