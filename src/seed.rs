//! The shareable "master seed": a palette session packed into one string.
//!
//! The format is `PLT1.<body>`, where the body is the JSON payload encoded as base64url without
//! padding. Decoding is strict about structure: any failure yields no payload at all rather than a
//! partially-restored session.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::color::PaletteColor;
use crate::palette::{Locks, PaletteSession};
use crate::themes::{merge_theme_pool, PaletteTheme, SWATCH_COUNT};

pub const MASTER_SEED_PREFIX: &str = "PLT1";
pub const MASTER_SEED_VERSION: u32 = 1;

/// Stored in `selected_theme_id` when no theme was chosen.
pub const AUTO_THEME_ID: &str = "auto";

/// Display name for a restored theme id that no known theme carries.
pub const UNKNOWN_THEME_NAME: &str = "Custom";

// Encodes without padding, but accepts padded bodies too.
const BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterSeedPayload {
    pub v: u32,
    pub seed: u32,
    pub theme_id: String,
    pub selected_theme_id: String,
    pub locks: Locks,
    pub palette: [PaletteColor; SWATCH_COUNT],
}

impl From<&PaletteSession> for MasterSeedPayload {
    fn from(session: &PaletteSession) -> Self {
        MasterSeedPayload {
            v: MASTER_SEED_VERSION,
            seed: session.seed,
            theme_id: session.theme_id.clone(),
            selected_theme_id: session
                .selected_theme_id
                .clone()
                .unwrap_or_else(|| AUTO_THEME_ID.to_owned()),
            locks: session.locks,
            palette: session.palette.clone(),
        }
    }
}

impl MasterSeedPayload {
    /// Restores the session this payload was built from. The palette is taken as stored, not
    /// regenerated.
    ///
    /// Theme ids are resolved against the curated catalog plus `pool`: a selection that is no
    /// longer known falls back to auto, and an unknown theme is named [`UNKNOWN_THEME_NAME`].
    pub fn into_session(self, pool: &[PaletteTheme]) -> PaletteSession {
        let themes = merge_theme_pool(pool);
        let find = |id: &str| themes.iter().copied().find(|theme| theme.id == id);

        let theme_name = find(self.theme_id.as_str())
            .map(|theme| theme.name.clone())
            .unwrap_or_else(|| UNKNOWN_THEME_NAME.to_owned());
        let selected_theme_id = Some(self.selected_theme_id)
            .filter(|id| id != AUTO_THEME_ID && find(id.as_str()).is_some());

        PaletteSession {
            seed: self.seed,
            palette: self.palette,
            locks: self.locks,
            selected_theme_id,
            theme_id: self.theme_id,
            theme_name,
        }
    }

    fn validate(self) -> Result<Self, MasterSeedError> {
        if self.v != MASTER_SEED_VERSION {
            return Err(MasterSeedError::UnsupportedVersion(self.v));
        }
        if self.seed == 0 {
            return Err(MasterSeedError::ZeroSeed);
        }
        if let Some(index) = self.palette.iter().position(|c| !c.hex.starts_with('#')) {
            return Err(MasterSeedError::MalformedColor {
                index,
                hex: self.palette[index].hex.clone(),
            });
        }
        Ok(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MasterSeedError {
    #[error("expected a PLT1.<body> string")]
    BadPrefix,
    #[error("body is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("body is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u32),
    #[error("seed must be positive")]
    ZeroSeed,
    #[error("palette color {index} has malformed hex {hex:?}")]
    MalformedColor { index: usize, hex: String },
}

pub fn build_master_seed(payload: &MasterSeedPayload) -> String {
    let json = serde_json::to_vec(payload).unwrap_or_default();
    format!("{MASTER_SEED_PREFIX}.{}", BODY_ENGINE.encode(json))
}

/// Decodes a master seed, reporting why it was rejected.
pub fn try_parse_master_seed(value: &str) -> Result<MasterSeedPayload, MasterSeedError> {
    let mut parts = value.trim().split('.');
    let (Some(MASTER_SEED_PREFIX), Some(body)) = (parts.next(), parts.next()) else {
        return Err(MasterSeedError::BadPrefix);
    };
    if body.is_empty() {
        return Err(MasterSeedError::BadPrefix);
    }
    let json = String::from_utf8(BODY_ENGINE.decode(body)?)?;
    let payload: MasterSeedPayload = serde_json::from_str(&json)?;
    payload.validate()
}

/// Decodes a master seed; anything malformed is `None`.
pub fn parse_master_seed(value: &str) -> Option<MasterSeedPayload> {
    try_parse_master_seed(value)
        .map_err(|err| tracing::debug!(error = %err, "rejected master seed"))
        .ok()
}
