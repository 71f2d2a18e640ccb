use serde_json::Value;

use super::serialize_palette;
use crate::color::PaletteColor;
use crate::themes::SWATCH_COUNT;

pub const MAX_FAVORITES: usize = 10;

pub type SavedPalette = [PaletteColor; SWATCH_COUNT];

fn is_valid_entry(entry: &SavedPalette) -> bool {
    entry.iter().all(|color| color.hex.starts_with('#'))
}

/// Parses a persisted favorites list. If any entry is not a five-color palette the whole list is
/// discarded.
pub fn parse_favorites(value: Value) -> Vec<SavedPalette> {
    let entries: Vec<SavedPalette> = match serde_json::from_value(value) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "discarding malformed favorites");
            return Vec::new();
        }
    };
    if !entries.iter().all(is_valid_entry) {
        tracing::warn!("discarding favorites with a malformed color");
        return Vec::new();
    }
    entries.into_iter().take(MAX_FAVORITES).collect()
}

/// Saved palettes, most recent first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Favorites {
    entries: Vec<SavedPalette>,
}

impl Favorites {
    pub fn from_json(blob: &str) -> Self {
        let entries = serde_json::from_str(blob)
            .map(parse_favorites)
            .unwrap_or_default();
        Favorites { entries }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_owned())
    }

    pub fn as_slice(&self) -> &[SavedPalette] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, palette: &[PaletteColor]) -> bool {
        let key = serialize_palette(palette);
        self.entries.iter().any(|entry| serialize_palette(entry) == key)
    }

    /// Moves `palette` to the front, dropping an identical earlier entry and anything past the cap.
    pub fn save(&mut self, palette: &SavedPalette) {
        let key = serialize_palette(palette);
        self.entries.retain(|entry| serialize_palette(entry) != key);
        self.entries.insert(0, palette.clone());
        self.entries.truncate(MAX_FAVORITES);
    }

    pub fn remove(&mut self, index: usize) -> Option<SavedPalette> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }
}
