//! Seeded 2D gradient noise.

use crate::math::lerp;

const LCG_MODULUS: f64 = 233_280.0;
const FALLBACK_SEED: f64 = 1337.0;

/// A gradient noise field over a shuffled 256-entry permutation table.
///
/// Built once per render from a seed in `[0, 1)` and read-only afterwards, so a shared reference
/// can be handed to every stage that needs it.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("perm", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

impl NoiseField {
    /// Builds the field for `seed`. Only the fractional part of `seed` matters; a seed whose
    /// fractional part rounds down to zero uses a fixed fallback shuffle.
    pub fn new(seed: f64) -> NoiseField {
        let fraction = ((seed % 1.0) + 1.0) % 1.0;
        let mut running = match (fraction * LCG_MODULUS).floor() {
            v if v == 0.0 || v.is_nan() => FALLBACK_SEED,
            v => v,
        };

        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        for i in (1..256).rev() {
            running = (running * 9301.0 + 49297.0) % LCG_MODULUS;
            let next = (running / LCG_MODULUS * (i + 1) as f64).floor() as usize;
            table.swap(i, next);
        }

        NoiseField {
            perm: std::array::from_fn(|i| table[i & 255]),
        }
    }

    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn grad(hash: u8, x: f64, y: f64) -> f64 {
        let h = hash & 15;
        let u = if h < 8 { x } else { y };
        let v = if h < 4 {
            y
        } else if h == 12 || h == 14 {
            x
        } else {
            0.0
        };
        (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
    }

    /// Noise at `(x, y)`, roughly in `[-1, 1]`. Zero at every integer lattice point.
    pub fn get(&self, x: f64, y: f64) -> f64 {
        let (floor_x, floor_y) = (x.floor(), y.floor());
        let xi = (floor_x as i64 & 255) as usize;
        let yi = (floor_y as i64 & 255) as usize;
        let fx = x - floor_x;
        let fy = y - floor_y;
        let u = Self::fade(fx);
        let v = Self::fade(fy);

        let a = self.perm[xi] as usize + yi;
        let b = self.perm[xi + 1] as usize + yi;
        let p = &self.perm;

        lerp(
            v,
            lerp(
                u,
                Self::grad(p[a], fx, fy),
                Self::grad(p[b], fx - 1.0, fy),
            ),
            lerp(
                u,
                Self::grad(p[a + 1], fx, fy - 1.0),
                Self::grad(p[b + 1], fx - 1.0, fy - 1.0),
            ),
        )
    }

    /// [`NoiseField::get`] remapped to roughly `[0, 1]`.
    pub fn get01(&self, x: f64, y: f64) -> f64 {
        (self.get(x, y) + 1.0) * 0.5
    }
}
