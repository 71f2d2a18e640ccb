//! Seeded pseudo-random streams and seed derivation.
//!
//! Every random decision in palette generation and rendering flows from a [`Rng`] built from a
//! 32-bit seed. Unrelated concerns never share a stream: each one gets its own stream, seeded
//! through [`salted_seed`] or [`hash_str`], so that a change in how many values one concern draws
//! cannot shift the values seen by another.

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Largest value returned by [`derive_iteration_seed`] and [`make_random_seed`] (exclusive for the
/// latter).
pub const MAX_SEED: u32 = 2_147_483_647;

/// Substituted by [`derive_iteration_seed`] when the mixed value reduces to zero.
const ITERATION_FALLBACK: u32 = 1_337_421;

/// A `mulberry32` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn from_seed(seed: u32) -> Rng {
        Rng { state: seed }
    }

    /// Picks a random value uniformly distributed between `0.0` (inclusive) and `1.0` (exclusive).
    pub fn rnd(&mut self) -> f64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let t = self.state;
        let mut out = (t ^ (t >> 15)).wrapping_mul(1 | t);
        out ^= out.wrapping_add((out ^ (out >> 7)).wrapping_mul(61 | out));
        f64::from(out ^ (out >> 14)) / 4_294_967_296.0
    }

    /// Picks a random value uniformly distributed between `min` (inclusive) and `max` (exclusive).
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + self.rnd() * (max - min)
    }

    /// Picks a random value in `[-magnitude / 2, magnitude / 2)`, i.e. `(rnd() - 0.5) * magnitude`.
    pub fn jitter(&mut self, magnitude: f64) -> f64 {
        (self.rnd() - 0.5) * magnitude
    }

    /// Picks an index in `0..len` uniformly. Returns `0` when `len` is zero.
    pub fn index(&mut self, len: usize) -> usize {
        ((self.rnd() * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Picks `base + floor(rnd() * span)`.
    pub fn below(&mut self, base: u32, span: u32) -> u32 {
        base + (self.rnd() * f64::from(span)) as u32
    }

    /// Picks `true` with probability `p`, testing `rnd() < p`.
    pub fn odds(&mut self, p: f64) -> bool {
        self.rnd() < p
    }

    /// Chooses an item from `items` at a uniformly random index, or `None` if `items` is empty.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.index(items.len()))
    }
}

/// FNV-1a hash of `input`, taken over its UTF-16 code units.
pub fn hash_str(input: &str) -> u32 {
    fnv1a(FNV_OFFSET_BASIS, input)
}

/// Mixes `salt` into `seed` with the FNV-1a step, producing the seed of an independent stream.
///
/// ```
/// use swatchwork::rand::salted_seed;
/// assert_ne!(salted_seed(7, "bam-swirl"), salted_seed(7, "bam-effects"));
/// ```
pub fn salted_seed(seed: u32, salt: &str) -> u32 {
    fnv1a(seed, salt)
}

fn fnv1a(basis: u32, input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(basis, |h, unit| (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME))
}

/// Derives the seed used by "iterate" from the current one.
///
/// The result is always in `1..=MAX_SEED`, and is bit-exact with every other implementation of the
/// same mix, which is what makes iterated seeds shareable.
pub fn derive_iteration_seed(seed: u32) -> u32 {
    let mixed = (seed ^ 0x9E37_79B9)
        .wrapping_mul(1_664_525)
        .wrapping_add(1_013_904_223);
    match mixed % MAX_SEED {
        0 => ITERATION_FALLBACK,
        bounded => bounded,
    }
}

/// Seed of the `index`-th member of a family of seeds fanned out from `seed`, offset by `salt`.
///
/// Variants and artwork studies both use this with their own `salt`; a zero mix falls back to
/// `seed + index + 1`.
pub fn derive_variant_seed(seed: u32, salt: u32, index: u32) -> u32 {
    let mixed = seed
        .wrapping_add(salt)
        .wrapping_add((index + 1).wrapping_mul(2_654_435_761));
    if mixed == 0 {
        derive_iteration_seed(seed.wrapping_add(index + 1))
    } else {
        derive_iteration_seed(mixed)
    }
}

/// A fresh non-deterministic seed in `0..MAX_SEED`, for callers that want a new palette.
pub fn make_random_seed() -> u32 {
    ::rand::random_range(0..MAX_SEED)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rnd_sequence() {
        let mut rng = Rng::from_seed(1);
        let us: [f64; 4] = std::array::from_fn(|_| rng.rnd());
        assert_eq!(
            us,
            [
                0.6270739405881613,
                0.002735721180215478,
                0.5274470399599522,
                0.9810509674716741
            ]
        );

        let mut rng = Rng::from_seed(0);
        let us: [f64; 3] = std::array::from_fn(|_| rng.rnd());
        assert_eq!(
            us,
            [0.26642920868471265, 0.0003297457005828619, 0.2232720274478197]
        );
    }

    #[test]
    fn test_streams_are_independent_values() {
        let mut a = Rng::from_seed(42);
        let mut b = a.clone();
        a.rnd();
        assert_ne!(a, b);
        b.rnd();
        assert_eq!(a, b);
    }

    #[test]
    fn test_uniform_and_below_ranges() {
        let mut rng = Rng::from_seed(9);
        for _ in 0..1000 {
            let u = rng.uniform(3.0, 5.0);
            assert!((3.0..5.0).contains(&u));
            let b = rng.below(110, 110);
            assert!((110..220).contains(&b));
            let j = rng.jitter(14.0);
            assert!((-7.0..7.0).contains(&j));
        }
    }

    #[test]
    fn test_choice_empty() {
        let mut rng = Rng::from_seed(9);
        assert_eq!(rng.choice::<u8>(&[]), None);
        assert_eq!(rng.choice(&[777]), Some(&777));
    }

    #[test]
    fn test_hash_str() {
        assert_eq!(hash_str(""), 2_166_136_261);
        assert_eq!(hash_str("edo"), 1_635_045_273);
        assert_eq!(hash_str("my-love"), 806_702_370);
    }

    #[test]
    fn test_salted_seed() {
        let seed = 421_337_420;
        assert_eq!(salted_seed(seed, "bam-structure"), 1_361_817_632);
        assert_eq!(salted_seed(seed, "bam-background"), 1_919_773_223);
        assert_eq!(salted_seed(seed, "bam-effects"), 2_194_518_103);
        assert_eq!(salted_seed(seed, "bam-swirl"), 1_176_649_330);
        assert_eq!(salted_seed(seed, "bam-noise"), 1_951_412_215);
    }

    #[test]
    fn test_derive_iteration_seed() {
        assert_eq!(derive_iteration_seed(0), 1_120_982_980);
        assert_eq!(derive_iteration_seed(0x9E37_79B9), 1_013_904_223);
        assert_eq!(derive_iteration_seed(u32::MAX), 905_160_941);
    }

    #[test]
    fn test_make_random_seed_range() {
        for _ in 0..100 {
            assert!(make_random_seed() < MAX_SEED);
        }
    }
}
