use crate::render::RenderOptions;

#[derive(Debug, Default, Clone, clap::Args)]
pub struct RenderConfig {
    /// Skip the ink, weave and vignette finish. Useful for thumbnails, where it mostly reads as
    /// noise.
    #[clap(long)]
    pub plain: bool,

    /// Raise the output width to at least this many pixels [default: 280].
    #[clap(long)]
    pub min_width: Option<u32>,

    /// Raise the output height to at least this many pixels [default: 220].
    #[clap(long)]
    pub min_height: Option<u32>,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> RenderOptions {
        RenderOptions {
            min_width: config.min_width,
            min_height: config.min_height,
            plain: config.plain,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::{RenderSize, DEFAULT_MIN_WIDTH};

    #[test]
    fn test_default_config_uses_default_minimums() {
        let options = RenderOptions::from(&RenderConfig::default());
        assert_eq!(options, RenderOptions::default());
        assert_eq!(RenderSize::new(10, 10, &options).safe_width, DEFAULT_MIN_WIDTH);
    }

    #[test]
    fn test_config_carries_overrides() {
        let config = RenderConfig {
            plain: true,
            min_width: Some(0),
            min_height: Some(32),
        };
        let options = RenderOptions::from(&config);
        assert!(options.plain);
        assert_eq!(RenderSize::new(10, 10, &options).safe_height, 32);
    }
}
