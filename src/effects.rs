//! Post-processing passes over a finished painting.
//!
//! The pixel passes only ever touch the color channels; alpha is carried through unchanged.

use raqote::{BlendMode, Color, Gradient, GradientStop, Point, Source, Spread};

use crate::canvas::{pack, to_channel, unpack, Canvas};
use crate::noise::NoiseField;
use crate::plan::{DisplacementBlock, SwirlPlan};
use crate::rand::Rng;

/// How far, in pixels, a displaced block may be sourced from in each direction.
const BLOCK_REACH: f64 = 46.0;

// Half-up rounding, as used for the swirl offsets.
fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

fn clamp_index(v: i64, len: u32) -> usize {
    v.clamp(0, i64::from(len) - 1) as usize
}

fn with_rgb(px: u32, [_, r, g, b]: [u8; 4]) -> u32 {
    let [a, ..] = unpack(px);
    pack([a, r, g, b])
}

/// Copies each block's pixels from a noise-chosen nearby location, working in place so later
/// blocks see the result of earlier ones.
pub fn block_displacement(canvas: &mut Canvas, blocks: &[DisplacementBlock], noise: &NoiseField) {
    let (width, height) = (canvas.width(), canvas.height());
    if width == 0 || height == 0 {
        return;
    }
    let pixels = canvas.pixels_mut();
    let stride = width as usize;

    for block in blocks {
        let block_width = (block.width.floor() as i64).min(i64::from(width)).max(2);
        let block_height = (block.height.floor() as i64).min(i64::from(height)).max(2);
        let x = (block.nx * (i64::from(width) - block_width) as f64).floor() as i64;
        let y = (block.ny * (i64::from(height) - block_height) as f64).floor() as i64;
        let (fx, fy) = (x as f64, y as f64);

        let x_offset = ((noise.get01(fx * 0.013 + fy * 0.017, fy * 0.011) - 0.5) * BLOCK_REACH)
            .floor() as i64;
        let y_offset = ((noise.get01(fy * 0.019 + fx * 0.023, fx * 0.013) - 0.5) * BLOCK_REACH)
            .floor() as i64;

        for iy in 0..block_height {
            for ix in 0..block_width {
                let (dest_x, dest_y) = (x + ix, y + iy);
                // Blocks are at least 2px, which can overhang a 1px canvas on either side.
                if !(0..i64::from(width)).contains(&dest_x) || !(0..i64::from(height)).contains(&dest_y)
                {
                    continue;
                }
                let source_x = clamp_index(dest_x + x_offset, width);
                let source_y = clamp_index(dest_y + y_offset, height);
                let dest = dest_y as usize * stride + dest_x as usize;
                pixels[dest] = with_rgb(pixels[dest], unpack(pixels[source_y * stride + source_x]));
            }
        }
    }
}

/// Smears the canvas along noise-chosen axes, one grid cell at a time.
///
/// Every pixel is sourced from a copy of the canvas taken before the first pass, so passes replace
/// rather than compound each other.
pub fn swirl(canvas: &mut Canvas, plan: &SwirlPlan, rng: &mut Rng, noise: &NoiseField) {
    let (width, height) = (canvas.width(), canvas.height());
    let source = canvas.snapshot();
    let source = source.data();
    let pixels = canvas.pixels_mut();
    let block = plan.block_size.max(1);

    for pass in 0..plan.pass_count {
        let scan_offset = rng.jitter(plan.strength * 4.0).floor() as i64;
        for y in 0..height {
            let row_shift = if rng.odds(plan.tear_chance) { scan_offset } else { 0 };
            let grid_y = y / block * block;

            for x in 0..width {
                let grid_x = x / block * block;
                let n = noise.get01(
                    f64::from(grid_x) * 0.02 + f64::from(pass) * 13.0,
                    f64::from(grid_y) * 0.02,
                );
                let shift = round_half_up((n - 0.5) * plan.strength * 2.0);
                let (dx, dy) = if rng.odds(plan.axis_bias) {
                    (shift + row_shift, 0)
                } else {
                    (0, shift)
                };

                let source_x = clamp_index(i64::from(grid_x) + dx, width);
                let source_y = clamp_index(i64::from(grid_y) + dy, height);
                let dest = (y * width + x) as usize;
                let from = source[source_y * width as usize + source_x];
                pixels[dest] = with_rgb(pixels[dest], unpack(from));
            }
        }
    }
}

/// Darkens a frame around the border with noisy ink wear, plus rare dark scuffs anywhere.
pub fn fine_ink(canvas: &mut Canvas, rng: &mut Rng, noise: &NoiseField) {
    const MAX_DARKNESS: f64 = 10.0;
    let (width, height) = (canvas.width(), canvas.height());
    let frame_depth = f64::from(width.min(height)) / 6.0;
    let pixels = canvas.pixels_mut();

    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) as usize;
            let distance = x.min(y).min(width - x - 1).min(height - y - 1);
            let distance = f64::from(distance);
            let edge = if distance < frame_depth {
                1.0 - distance / frame_depth
            } else {
                0.0
            };
            let grain = noise.get01(f64::from(x) * 0.08, f64::from(y) * 0.08) * MAX_DARKNESS;
            let mut wear = grain * edge;
            if rng.odds(0.002) {
                wear += rng.rnd() * 28.0 + 16.0;
            }

            let [a, r, g, b] = unpack(pixels[index]);
            pixels[index] = pack([
                a,
                to_channel(f64::from(r) - wear),
                to_channel(f64::from(g) - wear * 0.82),
                to_channel(f64::from(b) - wear * 0.63),
            ]);
        }
    }
}

/// Darkens the canvas with two overlapping thread grids: a fixed fine one and a coarser one whose
/// cell size wanders with the noise.
pub fn thread_weave(canvas: &mut Canvas, rng: &mut Rng, noise: &NoiseField) {
    const THREAD_SPACING_X: f64 = 22.5;
    const THREAD_SPACING_Y: f64 = 13.5;
    const MAX_DARKNESS: f64 = 25.0;
    const BASE_WEAVE_SIZE: f64 = 38.0;

    let (width, height) = (canvas.width(), canvas.height());
    let (w, h) = (f64::from(width), f64::from(height));
    let pixels = canvas.pixels_mut();

    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) as usize;
            let (fx, fy) = (f64::from(x), f64::from(y));
            let noise_factor = noise.get01((fx + w) * 0.5, (fy + h) * 0.5);
            let weave_x_size = BASE_WEAVE_SIZE + noise_factor * (THREAD_SPACING_X / 2.0);
            let weave_y_size = BASE_WEAVE_SIZE + noise_factor * (THREAD_SPACING_Y / 2.0);
            let grid_x = fx % THREAD_SPACING_X;
            let grid_y = fy % THREAD_SPACING_Y;
            let weave_x = fx % weave_x_size;
            let weave_y = fy % weave_y_size;

            let mut darkness = if (grid_x + grid_y) % 2.0 == 0.0 {
                grid_x / THREAD_SPACING_X * MAX_DARKNESS * 0.5
            } else {
                grid_y / THREAD_SPACING_Y * MAX_DARKNESS * 0.5
            };
            darkness += if (weave_x + weave_y) % 2.0 == 0.0 {
                weave_x / weave_x_size * MAX_DARKNESS * noise_factor * 0.5
            } else {
                weave_y / weave_y_size * MAX_DARKNESS * noise_factor * 0.5
            };
            let darkness = rng.rnd() * darkness * 0.4 + darkness * 0.8;

            let [a, r, g, b] = unpack(pixels[index]);
            pixels[index] = pack([
                a,
                to_channel(f64::from(r) - darkness),
                to_channel(f64::from(g) - darkness),
                to_channel(f64::from(b) - darkness),
            ]);
        }
    }
}

/// Shades the corners with a radial gradient: clear out to 0.28 of the short side, reaching 24%
/// black at 0.8 of the long side.
pub fn vignette(canvas: &mut Canvas) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let inner = w.min(h) * 0.28;
    let outer = w.max(h) * 0.8;
    if outer <= 0.0 {
        return;
    }

    let gradient = Gradient {
        stops: vec![
            GradientStop {
                position: inner / outer,
                color: Color::new(0, 0, 0, 0),
            },
            GradientStop {
                position: 1.0,
                color: Color::new(61, 0, 0, 0),
            },
        ],
    };
    let source = Source::new_radial_gradient(
        gradient,
        Point::new(w * 0.5, h * 0.5),
        outer,
        Spread::Pad,
    );
    canvas.cover(&source, BlendMode::SrcOver);
}
