//! Composition planning: every numeric choice of a render, made up front from the seed.

use crate::rand::{salted_seed, Rng};

pub const STRUCTURE_SALT: &str = "bam-structure";
pub const BACKGROUND_SALT: &str = "bam-background";
pub const EFFECTS_SALT: &str = "bam-effects";
pub const SWIRL_SALT: &str = "bam-swirl";
pub const NOISE_SALT: &str = "bam-noise";

/// Side length of the canvas that block counts are calibrated against.
const REFERENCE_DIM: f64 = 760.0;
const MIN_BLOCKS: usize = 36;

/// A region copied from a noise-offset location by the block displacement pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplacementBlock {
    pub width: f64,
    pub height: f64,
    /// Position of the block within the free space of the canvas, in `[0, 1)`.
    pub nx: f64,
    pub ny: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SwirlPlan {
    pub pass_count: u32,
    pub strength: f64,
    pub block_size: u32,
    pub tear_chance: f64,
    pub axis_bias: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BackgroundPlan {
    pub flow_passes: u32,
    pub flow_strength: f64,
    pub flow_alpha: f64,
    pub gravity: f64,
    pub edge_resistance: f64,
    pub large_shapes: u32,
    pub medium_shapes: u32,
    pub small_shapes: u32,
    pub tiny_shapes: u32,
    pub checker_enabled: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WeaveMode {
    Plain,
    Threaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub blocks: Vec<DisplacementBlock>,
    pub swirl: SwirlPlan,
    pub background: BackgroundPlan,
    pub cantext_strength: f64,
    pub weave_mode: WeaveMode,
}

impl CompositionPlan {
    /// Plans a `width` x `height` render of `seed`. Draws only from the structure stream.
    pub fn new(seed: u32, width: u32, height: u32) -> CompositionPlan {
        let mut rng = Rng::from_seed(salted_seed(seed, STRUCTURE_SALT));
        let (width, height) = (f64::from(width), f64::from(height));
        let min_dim = width.min(height);
        let area_scale = (width * height) / (REFERENCE_DIM * REFERENCE_DIM);

        let block_count = MIN_BLOCKS
            .max(((60.0 + rng.rnd() * 64.0) * area_scale.sqrt().max(0.7)).floor() as usize);
        let blocks = (0..block_count)
            .map(|_| DisplacementBlock {
                width: min_dim * (0.24 + rng.rnd() * 0.65),
                height: min_dim * (0.21 + rng.rnd() * 0.56),
                nx: rng.rnd(),
                ny: rng.rnd(),
            })
            .collect();

        let swirl = SwirlPlan {
            pass_count: rng.below(1, 2),
            strength: rng.uniform(5.0, 17.0),
            block_size: rng.below(8, 12),
            tear_chance: 0.16 + rng.rnd() * 0.18,
            axis_bias: 0.64 + rng.rnd() * 0.24,
        };

        let background = BackgroundPlan {
            flow_passes: rng.below(110, 110),
            flow_strength: 1.2 + rng.rnd() * 2.6,
            flow_alpha: 0.011 + rng.rnd() * 0.02,
            gravity: 0.5 + rng.rnd() * 0.8,
            edge_resistance: 1.0 + rng.rnd() * 1.3,
            large_shapes: rng.below(2, 3),
            medium_shapes: rng.below(5, 6),
            small_shapes: rng.below(8, 12),
            tiny_shapes: rng.below(14, 18),
            checker_enabled: rng.rnd() > 0.36,
        };

        CompositionPlan {
            blocks,
            swirl,
            background,
            cantext_strength: 10.0 + rng.rnd() * 12.0,
            weave_mode: if rng.rnd() > 0.44 {
                WeaveMode::Threaded
            } else {
                WeaveMode::Plain
            },
        }
    }
}
