//! Render orchestration: sizing, the fixed stage order, and artwork studies.

use raqote::DrawTarget;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::effects;
use crate::noise::NoiseField;
use crate::painter;
use crate::plan::{
    CompositionPlan, WeaveMode, BACKGROUND_SALT, EFFECTS_SALT, NOISE_SALT, SWIRL_SALT,
};
use crate::rand::{derive_variant_seed, salted_seed, Rng};

/// Longest side of the internal canvas. Larger requests are painted at this size and scaled up.
pub const MAX_RENDER_DIM: u32 = 760;
pub const MIN_RENDER_WIDTH: u32 = 220;
pub const MIN_RENDER_HEIGHT: u32 = 180;

pub const DEFAULT_MIN_WIDTH: u32 = 280;
pub const DEFAULT_MIN_HEIGHT: u32 = 220;

/// Painted when the caller passes no colors at all.
pub const FALLBACK_PALETTE: [&str; 5] = ["#2F3542", "#6B7280", "#C9D1D9", "#F4EDE3", "#19232F"];

/// Stand-in for a palette entry that isn't a hex color.
const UNPARSEABLE: Rgb = Rgb(35, 35, 35);

const NOISE_SEED_MODULUS: u32 = 233_280;

pub const STUDY_COUNT: usize = 4;
const STUDY_SEED_STEP: u32 = 104_729;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Floor on the output width; [`DEFAULT_MIN_WIDTH`] when unset.
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    /// Skip the ink, weave and vignette finish.
    pub plain: bool,
}

/// Output and internal dimensions of one render.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderSize {
    pub safe_width: u32,
    pub safe_height: u32,
    pub render_width: u32,
    pub render_height: u32,
}

impl RenderSize {
    pub fn new(width: u32, height: u32, options: &RenderOptions) -> RenderSize {
        let safe_width = width.max(options.min_width.unwrap_or(DEFAULT_MIN_WIDTH));
        let safe_height = height.max(options.min_height.unwrap_or(DEFAULT_MIN_HEIGHT));
        let longest = f64::from(safe_width.max(safe_height));
        let scale = if longest > 0.0 {
            (f64::from(MAX_RENDER_DIM) / longest).min(1.0)
        } else {
            1.0
        };
        RenderSize {
            safe_width,
            safe_height,
            render_width: ((f64::from(safe_width) * scale).floor() as u32).max(MIN_RENDER_WIDTH),
            render_height: ((f64::from(safe_height) * scale).floor() as u32)
                .max(MIN_RENDER_HEIGHT),
        }
    }
}

/// One step of the render pipeline, in the order they run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Paint,
    BlockDisplacement,
    Swirl,
    FineInk,
    ThreadWeave,
    Vignette,
}

pub fn render_stages(plan: &CompositionPlan, plain: bool) -> Vec<Stage> {
    let mut stages = vec![Stage::Paint, Stage::BlockDisplacement, Stage::Swirl];
    if !plain {
        stages.push(Stage::FineInk);
        if plan.weave_mode == WeaveMode::Threaded {
            stages.push(Stage::ThreadWeave);
        }
        stages.push(Stage::Vignette);
    }
    stages
}

/// Decodes the colors to paint with. An empty list paints [`FALLBACK_PALETTE`].
pub fn render_palette<S: AsRef<str>>(palette_hex: &[S]) -> Vec<Rgb> {
    if palette_hex.is_empty() {
        return FALLBACK_PALETTE
            .iter()
            .map(|hex| Rgb::from_hex_or(hex, UNPARSEABLE))
            .collect();
    }
    palette_hex
        .iter()
        .map(|hex| Rgb::from_hex_or(hex.as_ref(), UNPARSEABLE))
        .collect()
}

/// Seed of the noise field for `seed`, in `[0, 1)`.
pub fn noise_seed(seed: u32) -> f64 {
    f64::from(salted_seed(seed, NOISE_SALT) % NOISE_SEED_MODULUS) / f64::from(NOISE_SEED_MODULUS)
}

/// Paints `seed` onto a fresh `width` x `height` canvas, with no final scaling.
pub fn render_canvas(width: u32, height: u32, palette: &[Rgb], seed: u32, plain: bool) -> Canvas {
    let plan = CompositionPlan::new(seed, width, height);
    let noise = NoiseField::new(noise_seed(seed));
    let mut effects_rng = Rng::from_seed(salted_seed(seed, EFFECTS_SALT));
    let mut swirl_rng = Rng::from_seed(salted_seed(seed, SWIRL_SALT));

    let mut canvas = Canvas::new(width, height);
    for stage in render_stages(&plan, plain) {
        trace!(?stage, "render stage");
        match stage {
            Stage::Paint => {
                let rng = Rng::from_seed(salted_seed(seed, BACKGROUND_SALT));
                painter::paint(&mut canvas, &plan.background, palette, rng, &noise);
            }
            Stage::BlockDisplacement => {
                effects::block_displacement(&mut canvas, &plan.blocks, &noise)
            }
            Stage::Swirl => effects::swirl(&mut canvas, &plan.swirl, &mut swirl_rng, &noise),
            Stage::FineInk => effects::fine_ink(&mut canvas, &mut effects_rng, &noise),
            Stage::ThreadWeave => effects::thread_weave(&mut canvas, &mut effects_rng, &noise),
            Stage::Vignette => effects::vignette(&mut canvas),
        }
    }
    canvas
}

/// Renders the artwork for `seed` and `palette_hex` into the top-left `width` x `height` region
/// of `dest`, after raising the size to the minimums in `options`.
///
/// Equal arguments always produce equal pixels.
pub fn render_preview<S: AsRef<str>>(
    dest: &mut DrawTarget,
    width: u32,
    height: u32,
    palette_hex: &[S],
    seed: u32,
    options: &RenderOptions,
) {
    let size = RenderSize::new(width, height, options);
    debug!(
        seed,
        width = size.safe_width,
        height = size.safe_height,
        render_width = size.render_width,
        render_height = size.render_height,
        plain = options.plain,
        "rendering preview"
    );
    let palette = render_palette(palette_hex);
    let canvas = render_canvas(
        size.render_width,
        size.render_height,
        &palette,
        seed,
        options.plain,
    );
    canvas.resample_into(dest, size.safe_width, size.safe_height);
}

/// A rendered image detached from any drawing surface, so it can cross threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Premultiplied ARGB, row-major.
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn to_draw_target(&self) -> DrawTarget {
        let mut dt = DrawTarget::new(self.width as i32, self.height as i32);
        dt.get_data_mut().copy_from_slice(&self.pixels);
        dt
    }
}

impl From<DrawTarget> for Frame {
    fn from(dt: DrawTarget) -> Frame {
        Frame {
            width: dt.width() as u32,
            height: dt.height() as u32,
            pixels: dt.get_data().to_vec(),
        }
    }
}

/// [`render_preview`] onto a surface of exactly the resulting output size.
pub fn render_frame<S: AsRef<str>>(
    width: u32,
    height: u32,
    palette_hex: &[S],
    seed: u32,
    options: &RenderOptions,
) -> Frame {
    let size = RenderSize::new(width, height, options);
    let mut dt = DrawTarget::new(size.safe_width as i32, size.safe_height as i32);
    render_preview(&mut dt, width, height, palette_hex, seed, options);
    Frame::from(dt)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Study {
    pub seed: u32,
    pub palette: Vec<String>,
    pub frame: Frame,
}

pub fn study_seed(seed: u32, iteration: u32, index: u32) -> u32 {
    derive_variant_seed(seed, iteration.wrapping_mul(STUDY_SEED_STEP), index)
}

/// `palette` rotated left by `index`, so each study leads with a different color.
pub fn study_palette<S: AsRef<str>>(palette: &[S], index: usize) -> Vec<String> {
    let mut rotated: Vec<String> = palette.iter().map(|hex| hex.as_ref().to_owned()).collect();
    if !rotated.is_empty() {
        let len = rotated.len();
        rotated.rotate_left(index % len);
    }
    rotated
}

/// Renders the [`STUDY_COUNT`] plain study thumbnails for a palette, in parallel.
///
/// Studies share nothing, so each is painted on its own worker from its own seed.
pub fn render_studies<S: AsRef<str> + Sync>(
    seed: u32,
    iteration: u32,
    palette: &[S],
    width: u32,
    height: u32,
) -> Vec<Study> {
    let options = RenderOptions {
        min_width: Some(0),
        min_height: Some(0),
        plain: true,
    };
    (0..STUDY_COUNT)
        .into_par_iter()
        .map(|index| {
            let seed = study_seed(seed, iteration, index as u32);
            let palette = study_palette(palette, index);
            let frame = render_frame(width, height, palette.as_slice(), seed, &options);
            Study {
                seed,
                palette,
                frame,
            }
        })
        .collect()
}
