//! The procedural painter: background, pigment flow, and the layered soft shapes.

use raqote::BlendMode;

use crate::canvas::{pack, to_channel, unpack, Canvas, Snapshot};
use crate::color::Rgb;
use crate::math::{pi, Affine};
use crate::noise::NoiseField;
use crate::plan::BackgroundPlan;
use crate::rand::Rng;

/// Color used if a palette somehow comes up empty.
const NEUTRAL: Rgb = Rgb(160, 160, 160);

/// Luma gradient that counts as a full-strength edge in the resistance map.
const RESISTANCE_SCALE: f64 = 92.0;

/// Maximum distance, in pixels, of an edge stipple dot from its edge.
const STIPPLE_DEPTH: f64 = 88.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StrokeDirection {
    Horizontal,
    Vertical,
    Random,
}

fn luma(px: u32) -> f64 {
    let [_, r, g, b] = unpack(px);
    0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
}

/// Fills `canvas` with a complete background painting.
///
/// All randomness is drawn from `rng`, in a fixed order, so equal inputs paint equal pixels.
pub fn paint(
    canvas: &mut Canvas,
    plan: &BackgroundPlan,
    palette: &[Rgb],
    rng: Rng,
    noise: &NoiseField,
) {
    Painter::new(canvas.width(), canvas.height(), plan, palette, rng, noise).generate(canvas);
}

/// State of one painting. Built for a single canvas and dropped once it is painted.
pub struct Painter<'a> {
    width: u32,
    height: u32,
    plan: BackgroundPlan,
    palette: &'a [Rgb],
    rng: Rng,
    noise: &'a NoiseField,
    weave: Option<Snapshot>,
    resistance: Vec<f32>,
}

impl<'a> Painter<'a> {
    pub fn new(
        width: u32,
        height: u32,
        plan: &BackgroundPlan,
        palette: &'a [Rgb],
        rng: Rng,
        noise: &'a NoiseField,
    ) -> Painter<'a> {
        Painter {
            width,
            height,
            plan: *plan,
            palette,
            rng,
            noise,
            weave: None,
            resistance: vec![0.0; (width * height) as usize],
        }
    }

    fn w(&self) -> f64 {
        f64::from(self.width)
    }

    fn h(&self) -> f64 {
        f64::from(self.height)
    }

    fn min_dim(&self) -> f64 {
        self.w().min(self.h())
    }

    fn random_color(&mut self) -> Rgb {
        let index = (self.rng.rnd() * self.palette.len() as f64) as usize;
        self.palette.get(index).copied().unwrap_or(NEUTRAL)
    }

    /// Gray grain texture, opaque, for overlaying onto the painting.
    pub fn weave_texture(&self) -> Snapshot {
        let mut data = Vec::with_capacity((self.width * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let (fx, fy) = (f64::from(x), f64::from(y));
                let n1 = self.noise.get(fx * 0.05, fy * 0.05) * 0.5;
                let n2 = self.noise.get(fx * 0.19, fy * 0.19) * 0.3;
                let gray = to_channel((128.0 + (n1 + n2) * 20.0).round());
                data.push(pack([255, gray, gray, gray]));
            }
        }
        Snapshot::new(self.width, self.height, data)
    }

    fn apply_weave(&self, canvas: &mut Canvas, opacity: f64) {
        if let Some(weave) = &self.weave {
            canvas.draw_snapshot(weave, opacity, BlendMode::Overlay);
        }
    }

    /// Records, for every interior pixel, how sharply luma changes toward its right and bottom
    /// neighbours, saturating at 1. Border entries keep their previous value.
    fn build_resistance_map(&mut self, canvas: &Canvas) {
        let pixels = canvas.pixels();
        let width = self.width as usize;
        for y in 1..(self.height as usize).saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                let index = y * width + x;
                let here = luma(pixels[index]);
                let gradient = (here - luma(pixels[index + 1])).abs()
                    + (here - luma(pixels[index + width])).abs();
                self.resistance[index] = (gradient / RESISTANCE_SCALE).min(1.0) as f32;
            }
        }
    }

    /// Short translucent brush strokes scattered over a box, in a slightly shifted tone of `color`.
    pub fn directional_strokes(
        &mut self,
        canvas: &mut Canvas,
        (x, y, width, height): (f64, f64, f64, f64),
        color: Rgb,
        direction: StrokeDirection,
    ) {
        let count = ((width * height) / 9000.0).floor().max(8.0) as usize;
        for _ in 0..count {
            let sx = x + self.rng.rnd() * width;
            let sy = y + self.rng.rnd() * height;
            let length = 8.0 + self.rng.rnd() * 38.0;
            let line_width = 0.7 + self.rng.rnd() * 2.7;
            let angle = match direction {
                StrokeDirection::Horizontal => 0.0,
                StrokeDirection::Vertical => pi(0.5),
                StrokeDirection::Random => self.rng.rnd() * pi(2.0),
            };
            let drift = self.rng.jitter(28.0);
            let alpha = 0.04 + self.rng.rnd() * 0.12;

            canvas.stroke_line(
                (sx, sy),
                (sx + angle.cos() * length, sy + angle.sin() * length),
                line_width,
                color.perturb(drift),
                alpha,
            );
        }
    }

    /// Speckles the border of a box with dots that thin out away from the edge.
    pub fn edge_stipple(
        &mut self,
        canvas: &mut Canvas,
        (x, y, width, height): (f64, f64, f64, f64),
        color: Rgb,
        intensity: f64,
    ) {
        let count = ((width + height) * 1.8 * intensity).floor().max(0.0) as usize;
        for _ in 0..count {
            let edge = self.rng.rnd();
            let (px, py) = if edge < 0.25 {
                let px = x + self.rng.rnd() * width;
                (px, y + self.depth())
            } else if edge < 0.5 {
                let px = x + self.rng.rnd() * width;
                (px, y + height - self.depth())
            } else if edge < 0.75 {
                let px = x + self.depth();
                (px, y + self.rng.rnd() * height)
            } else {
                let px = x + width - self.depth();
                (px, y + self.rng.rnd() * height)
            };

            let size = 0.35 + self.rng.rnd() * 1.9;
            let alpha = 0.08 + self.rng.rnd() * 0.16;
            let speck = color.perturb(self.rng.jitter(20.0));
            canvas.fill_circle(px, py, size, speck, alpha);
        }
    }

    // Squared so dots bunch up against the edge.
    fn depth(&mut self) -> f64 {
        self.rng.rnd() * self.rng.rnd() * STIPPLE_DEPTH
    }

    pub fn soft_circle(&mut self, canvas: &mut Canvas, x: f64, y: f64, radius: f64, color: Rgb) {
        const PASSES: u32 = 8;
        for pass in 0..PASSES {
            let t = f64::from(pass) / f64::from(PASSES);
            canvas.fill_circle(x, y, radius * (1.0 - t * 0.05), color, 1.0 - t * 0.3);
        }
        let bounds = (x - radius, y - radius, radius * 2.0, radius * 2.0);
        self.directional_strokes(canvas, bounds, color, StrokeDirection::Random);
        self.edge_stipple(canvas, bounds, color, 0.7);
    }

    /// A rectangle with top-left `(x, y)`, rotated by `rotation` radians about its center.
    pub fn soft_rect(
        &mut self,
        canvas: &mut Canvas,
        (x, y, width, height): (f64, f64, f64, f64),
        rotation: f64,
        color: Rgb,
    ) {
        let local = canvas
            .transform()
            .translate(x + width / 2.0, y + height / 2.0)
            .rotate(rotation);
        canvas.with_transform(local, |canvas| {
            const PASSES: u32 = 6;
            for pass in 0..PASSES {
                let t = f64::from(pass) / f64::from(PASSES);
                let shrink = t * 8.0;
                canvas.fill_rect(
                    -width / 2.0 + shrink,
                    -height / 2.0 + shrink,
                    width - shrink * 2.0,
                    height - shrink * 2.0,
                    color,
                    1.0 - t * 0.24,
                );
            }

            let direction = if width > height {
                StrokeDirection::Horizontal
            } else {
                StrokeDirection::Vertical
            };
            let bounds = (-width / 2.0, -height / 2.0, width, height);
            self.directional_strokes(canvas, bounds, color, direction);
            self.edge_stipple(canvas, bounds, color, 0.6);
        });
    }

    pub fn soft_blob(&mut self, canvas: &mut Canvas, x: f64, y: f64, size: f64, color: Rgb) {
        let points = 10 + (self.rng.rnd() * 10.0) as u32;
        let vertices: Vec<(f64, f64)> = (0..=points)
            .map(|index| {
                let angle = f64::from(index) / f64::from(points) * pi(2.0);
                let radius = size * (0.6 + self.rng.rnd() * 0.4);
                (x + angle.cos() * radius, y + angle.sin() * radius)
            })
            .collect();

        const PASSES: u32 = 5;
        for pass in 0..PASSES {
            let t = f64::from(pass) / f64::from(PASSES);
            canvas.fill_polygon(&vertices, color, 1.0 - t * 0.2);
        }

        let bounds = (x - size, y - size, size * 2.0, size * 2.0);
        self.directional_strokes(canvas, bounds, color, StrokeDirection::Random);
        self.edge_stipple(canvas, bounds, color, 0.95);
    }

    /// A grid of `grid`-sized cells, each filled with its own palette color.
    pub fn checker(
        &mut self,
        canvas: &mut Canvas,
        (x, y, width, height): (f64, f64, f64, f64),
        grid: f64,
    ) {
        let cols = (width / grid).floor().max(1.0) as u32;
        let rows = (height / grid).floor().max(1.0) as u32;
        for row in 0..rows {
            for col in 0..cols {
                let color = self.random_color();
                let cx = x + f64::from(col) * grid;
                let cy = y + f64::from(row) * grid;
                canvas.fill_rect(cx, cy, grid, grid, color, 1.0);
                let cell = (cx, cy, grid, grid);
                self.directional_strokes(canvas, cell, color, StrokeDirection::Horizontal);
            }
        }
    }

    /// Diffuses the painting by repeatedly compositing a drifted copy of it back onto itself.
    ///
    /// Every pass reads from `feedback`, a copy of the canvas as it stood after the previous pass,
    /// and writes only to the canvas.
    pub fn pigment_flow(&mut self, canvas: &mut Canvas) {
        let mut feedback = canvas.snapshot();
        self.build_resistance_map(canvas);

        let (w, h) = (self.w(), self.h());
        let center = (h * 0.5).floor() as usize * self.width as usize + (w * 0.5).floor() as usize;
        let resist = f64::from(self.resistance.get(center).copied().unwrap_or(0.0))
            * self.plan.edge_resistance;
        let base = canvas.transform();

        for pass in 0..self.plan.flow_passes {
            let t = f64::from(pass) * 0.013;
            let nx = self.noise.get(t * 10.0, 2.7) + self.noise.get(1.3, t * 9.0);
            let ny = self.noise.get(4.1, t * 10.0) + self.noise.get(t * 9.0, 6.2);
            let drift_x = nx * self.plan.flow_strength * (1.0 - resist);
            let drift_y = ny * self.plan.flow_strength * (1.0 - resist) + self.plan.gravity;
            let scale = 1.0005 + (t * 1.7).sin() * 0.0006;
            let rotation = (t * 0.9).sin() * 0.0012;

            let drifted = base
                .translate(w * 0.5, h * 0.5)
                .rotate(rotation)
                .scale(scale, scale)
                .translate(-w * 0.5 + drift_x, -h * 0.5 + drift_y);
            canvas.with_transform(drifted, |canvas| {
                canvas.draw_snapshot(&feedback, self.plan.flow_alpha, BlendMode::SrcOver)
            });

            if pass % 24 == 0 {
                canvas.draw_snapshot(&feedback, 0.055, BlendMode::Multiply);
            }

            canvas.snapshot_into(&mut feedback);
        }

        let droplets = 240 + (self.rng.rnd() * 220.0) as u32;
        for _ in 0..droplets {
            let x = self.rng.rnd() * w;
            let y = self.rng.rnd() * h;
            let radius = 0.8 + self.rng.rnd() * 5.8;
            let color = self.random_color();
            let alpha = 0.05 + self.rng.rnd() * 0.12;
            canvas.fill_circle(x, y, radius, color, alpha);
        }
    }

    /// Paints the whole picture, back to front.
    pub fn generate(mut self, canvas: &mut Canvas) {
        let (w, h) = (self.w(), self.h());
        self.weave = Some(self.weave_texture());

        let background = self.random_color();
        canvas.fill_rect(0.0, 0.0, w, h, background, 1.0);
        self.directional_strokes(canvas, (0.0, 0.0, w, h), background, StrokeDirection::Random);
        self.apply_weave(canvas, 0.12);
        self.pigment_flow(canvas);

        for _ in 0..self.plan.large_shapes {
            let width = w * (0.46 + self.rng.rnd() * 0.5);
            let height = h * (0.35 + self.rng.rnd() * 0.56);
            let x = w * self.rng.rnd() * 0.42;
            let y = h * self.rng.rnd() * 0.42;
            let rotation = self.rng.jitter(0.32);
            let color = self.random_color();
            self.soft_rect(canvas, (x, y, width, height), rotation, color);
        }

        if self.plan.checker_enabled {
            let x = w * self.rng.rnd() * 0.55;
            let y = h * self.rng.rnd() * 0.55;
            let width = w * (0.28 + self.rng.rnd() * 0.52);
            let height = h * (0.26 + self.rng.rnd() * 0.46);
            let grid = (self.min_dim() * (0.04 + self.rng.rnd() * 0.08)).floor().max(12.0);
            self.checker(canvas, (x, y, width, height), grid);
        }

        for _ in 0..self.plan.medium_shapes {
            let x = w * self.rng.rnd();
            let y = h * self.rng.rnd();
            let pick = self.rng.rnd();
            if pick < 0.34 {
                let radius = self.min_dim() * (0.12 + self.rng.rnd() * 0.24);
                let color = self.random_color();
                self.soft_circle(canvas, x, y, radius, color);
            } else if pick < 0.68 {
                let size = self.min_dim() * (0.14 + self.rng.rnd() * 0.28);
                let color = self.random_color();
                self.soft_blob(canvas, x, y, size, color);
            } else {
                let width = w * (0.1 + self.rng.rnd() * 0.34);
                let height = h * (0.1 + self.rng.rnd() * 0.3);
                let rotation = self.rng.rnd() * pi(2.0);
                let color = self.random_color();
                self.soft_rect(canvas, (x, y, width, height), rotation, color);
            }
        }

        for _ in 0..self.plan.small_shapes {
            let x = w * self.rng.rnd();
            let y = h * self.rng.rnd();
            if self.rng.rnd() > 0.52 {
                let radius = self.min_dim() * (0.06 + self.rng.rnd() * 0.14);
                let color = self.random_color();
                self.soft_circle(canvas, x, y, radius, color);
            } else {
                let width = w * (0.06 + self.rng.rnd() * 0.2);
                let height = h * (0.06 + self.rng.rnd() * 0.18);
                let rotation = self.rng.rnd() * pi(2.0);
                let color = self.random_color();
                self.soft_rect(canvas, (x, y, width, height), rotation, color);
            }
        }

        for _ in 0..self.plan.tiny_shapes {
            let x = w * self.rng.rnd();
            let y = h * self.rng.rnd();
            let size = self.min_dim() * (0.02 + self.rng.rnd() * 0.06);
            if self.rng.rnd() > 0.5 {
                let color = self.random_color();
                self.soft_circle(canvas, x, y, size, color);
            } else {
                let width = size * (1.1 + self.rng.rnd());
                let height = size * (0.7 + self.rng.rnd());
                let rotation = self.rng.rnd() * pi(1.0);
                let color = self.random_color();
                self.soft_rect(canvas, (x, y, width, height), rotation, color);
            }
        }

        let burn = canvas.snapshot();
        canvas.with_transform(Affine::IDENTITY, |canvas| {
            canvas.draw_snapshot(&burn, 0.08, BlendMode::ColorBurn)
        });

        self.pigment_flow(canvas);
        self.apply_weave(canvas, 0.14);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plan::CompositionPlan;
    use crate::rand::{salted_seed, Rng};

    fn quiet_plan() -> BackgroundPlan {
        BackgroundPlan {
            flow_passes: 3,
            flow_strength: 1.5,
            flow_alpha: 0.02,
            gravity: 0.6,
            edge_resistance: 1.2,
            large_shapes: 1,
            medium_shapes: 2,
            small_shapes: 2,
            tiny_shapes: 3,
            checker_enabled: true,
        }
    }

    #[test]
    fn test_weave_texture_is_gray_and_opaque() {
        let noise = NoiseField::new(0.25);
        let palette = [Rgb(10, 20, 30)];
        let painter = Painter::new(32, 24, &quiet_plan(), &palette, Rng::from_seed(1), &noise);
        let texture = painter.weave_texture();
        assert_eq!(texture.data().len(), 32 * 24);
        for &px in texture.data() {
            let [a, r, g, b] = unpack(px);
            assert_eq!(a, 255);
            assert_eq!((r, r), (g, b));
            // |n1 + n2| stays well under 1, so the grain is at most about +-16.
            assert!((112..=144).contains(&r), "gray {r}");
        }
        // Noise is zero on the lattice, so the origin is mid gray.
        assert_eq!(unpack(texture.data()[0])[1], 128);
    }

    #[test]
    fn test_resistance_map_finds_edges() {
        let noise = NoiseField::new(0.25);
        let palette = [Rgb(0, 0, 0)];
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, Rgb(0, 0, 0), 1.0);
        canvas.fill_rect(5.0, 0.0, 5.0, 10.0, Rgb(255, 255, 255), 1.0);

        let mut painter = Painter::new(10, 10, &quiet_plan(), &palette, Rng::from_seed(1), &noise);
        painter.build_resistance_map(&canvas);
        assert_eq!(painter.resistance[5 * 10 + 4], 1.0);
        assert_eq!(painter.resistance[5 * 10 + 2], 0.0);
        assert_eq!(painter.resistance[5 * 10 + 7], 0.0);
        // Border entries are never written.
        assert_eq!(painter.resistance[4], 0.0);
    }

    #[test]
    fn test_random_color_draws_from_palette() {
        let noise = NoiseField::new(0.25);
        let palette = [Rgb(1, 1, 1), Rgb(2, 2, 2), Rgb(3, 3, 3)];
        let mut painter = Painter::new(4, 4, &quiet_plan(), &palette, Rng::from_seed(5), &noise);
        for _ in 0..100 {
            assert!(palette.contains(&painter.random_color()));
        }

        let mut empty = Painter::new(4, 4, &quiet_plan(), &[], Rng::from_seed(5), &noise);
        assert_eq!(empty.random_color(), NEUTRAL);
    }

    #[test]
    fn test_paint_covers_canvas() {
        let noise = NoiseField::new(0.5);
        let palette = [Rgb(200, 40, 40), Rgb(30, 90, 160), Rgb(240, 230, 200)];
        let mut canvas = Canvas::new(48, 40);
        paint(&mut canvas, &quiet_plan(), &palette, Rng::from_seed(77), &noise);
        assert!(canvas.pixels().iter().all(|&px| unpack(px)[0] >= 254));
        let first = canvas.pixels()[0];
        assert!(canvas.pixels().iter().any(|&px| px != first));
    }

    #[test]
    fn test_paint_is_deterministic() {
        let seed = 421_337_420;
        let plan = CompositionPlan::new(seed, 60, 50).background;
        let plan = BackgroundPlan {
            flow_passes: 4,
            ..plan
        };
        let noise = NoiseField::new(0.1);
        let palette = [Rgb(232, 222, 186), Rgb(246, 166, 106), Rgb(74, 108, 158)];

        let run = || {
            let mut canvas = Canvas::new(60, 50);
            let rng = Rng::from_seed(salted_seed(seed, "bam-background"));
            paint(&mut canvas, &plan, &palette, rng, &noise);
            canvas.pixels().to_vec()
        };
        assert_eq!(run(), run());
    }
}
