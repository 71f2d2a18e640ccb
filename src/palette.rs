//! Seeded five-color palette generation.

use serde::{Deserialize, Serialize};

use crate::color::{hex_to_hsl, HslColor, PaletteColor};
use crate::math::{clamp, Hue};
use crate::rand::{derive_iteration_seed, hash_str, Rng};
use crate::themes::{merge_theme_pool, PaletteTheme, ThemeCatalog, SWATCH_COUNT};

pub mod favorites;
pub mod variants;

/// Per-slot colors that regeneration must reproduce exactly; `None` slots are free.
pub type LockedColors = [Option<HslColor>; SWATCH_COUNT];
pub type Locks = [bool; SWATCH_COUNT];

pub const UNLOCKED: LockedColors = [None; SWATCH_COUNT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPalette {
    pub colors: [PaletteColor; SWATCH_COUNT],
    pub theme_id: String,
    pub theme_name: String,
}

impl GeneratedPalette {
    pub fn hexes(&self) -> [String; SWATCH_COUNT] {
        self.colors.clone().map(|color| color.hex)
    }
}

fn gcd(a: usize, b: usize) -> usize {
    let (mut x, mut y) = (a, b);
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x.max(1)
}

fn pick_theme<'a>(
    rng: &mut Rng,
    pool: &[&'a PaletteTheme],
    preferred_theme_id: Option<&str>,
) -> &'a PaletteTheme {
    if let Some(found) =
        preferred_theme_id.and_then(|id| pool.iter().copied().find(|theme| theme.id == id))
    {
        return found;
    }
    match rng.choice(pool) {
        Some(&theme) => theme,
        // The merged pool always carries the curated catalog, which is never empty.
        None => &ThemeCatalog::curated().themes()[0],
    }
}

/// Reduces (or grows) a theme's colors to exactly five base colors.
fn pick_five(theme: &PaletteTheme, rng: &mut Rng) -> [HslColor; SWATCH_COUNT] {
    let base: Vec<HslColor> = theme.colors.iter().map(|hex| hex_to_hsl(hex)).collect();
    let n = base.len();

    if n == 0 {
        return std::array::from_fn(|index| {
            let h = Hue::new(rng.rnd() * 360.0 + index as f64 * 37.0).degrees();
            let s = 60.0 + rng.rnd() * 18.0;
            let l = 34.0 + rng.rnd() * 28.0;
            HslColor::new(h, s, l)
        });
    }

    if n == SWATCH_COUNT {
        return std::array::from_fn(|i| base[i]);
    }

    if n > SWATCH_COUNT {
        // Walk the list with a stride coprime to its length so that every pick is distinct.
        let start = rng.index(n);
        let span = (n - 1).max(1);
        let mut step = 1 + (rng.rnd() * span as f64) as usize;
        let mut safety = 0;
        while gcd(step, n) != 1 && safety < 16 {
            step = step % span + 1;
            safety += 1;
        }
        return std::array::from_fn(|i| base[(start + i * step) % n]);
    }

    let mut expanded = base.clone();
    while expanded.len() < SWATCH_COUNT {
        let source = base[expanded.len() % n];
        let target = base[rng.index(n)];
        let blend = 0.35 + rng.rnd() * 0.45;
        let hue_delta = source.hue().delta_to(target.hue());

        let h = Hue::new(source.h + hue_delta * (1.0 - blend) + rng.jitter(28.0)).degrees();
        let s = clamp(
            source.s * blend + target.s * (1.0 - blend) + rng.jitter(16.0),
            18.0,
            96.0,
        );
        let l = clamp(
            source.l * blend + target.l * (1.0 - blend) + rng.jitter(18.0),
            10.0,
            90.0,
        );
        expanded.push(HslColor::new(h, s, l));
    }
    std::array::from_fn(|i| expanded[i])
}

fn contrast_boost(contrast_mode: f64, index: usize) -> f64 {
    if contrast_mode > 0.7 {
        if index % 2 == 0 {
            8.0
        } else {
            -7.0
        }
    } else if contrast_mode < 0.24 {
        if index == 2 {
            9.0
        } else {
            -3.0
        }
    } else {
        0.0
    }
}

/// Generates a palette from `seed`.
///
/// The theme is `preferred_theme_id` if the merged pool (curated catalog, then `theme_pool`) has
/// it, else a random one. Locked slots are copied through untouched; the free slots are rotated
/// toward the circular mean of the locked hues so that the set stays harmonious.
pub fn generate_palette(
    seed: u32,
    locked: &LockedColors,
    preferred_theme_id: Option<&str>,
    theme_pool: &[PaletteTheme],
) -> GeneratedPalette {
    let mut rng = Rng::from_seed(seed);
    let pool = merge_theme_pool(theme_pool);
    let selected = pick_theme(&mut rng, &pool, preferred_theme_id);

    let mut rng = Rng::from_seed(seed ^ hash_str(&selected.id));
    let base_colors = pick_five(selected, &mut rng);

    let locked_hues: Vec<Hue> = locked.iter().flatten().map(HslColor::hue).collect();
    let generated_average = Hue::circular_mean(base_colors.iter().map(HslColor::hue));
    let hue_rotation = if locked_hues.is_empty() {
        rng.jitter(14.0)
    } else {
        generated_average.delta_to(Hue::circular_mean(locked_hues))
    };
    let saturation_drift = rng.jitter(10.0);
    let lightness_drift = rng.jitter(10.0);
    let contrast_mode = rng.rnd();

    let mut slot = 0;
    let colors = base_colors.map(|color| {
        let index = slot;
        slot += 1;

        let edge = (index as f64 - 2.0).abs() / 2.0;
        let hue_noise = rng.jitter(7.0 + edge * 6.0);
        let saturation_noise = rng.jitter(8.0 + edge * 4.0);
        let lightness_noise = rng.jitter(10.0 + edge * 4.0);

        let candidate = HslColor::new(
            Hue::new(color.h + hue_rotation + hue_noise).degrees(),
            clamp(color.s + saturation_drift + saturation_noise, 14.0, 97.0),
            clamp(
                color.l
                    + lightness_drift
                    + lightness_noise
                    + contrast_boost(contrast_mode, index),
                8.0,
                92.0,
            ),
        );
        PaletteColor::from_hsl(locked[index].unwrap_or(candidate))
    });

    tracing::trace!(seed, theme = %selected.id, "generated palette");
    GeneratedPalette {
        colors,
        theme_id: selected.id.clone(),
        theme_name: selected.name.clone(),
    }
}

/// The HSL of every locked slot of `palette`.
pub fn locked_colors(palette: &[PaletteColor; SWATCH_COUNT], locks: &Locks) -> LockedColors {
    std::array::from_fn(|i| locks[i].then_some(palette[i].hsl))
}

/// Comma-joined hexes; two palettes with the same key look identical.
pub fn serialize_palette(palette: &[PaletteColor]) -> String {
    palette
        .iter()
        .map(|color| color.hex.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// A `:root` block declaring `--color-1` through `--color-5`.
pub fn css_variables(palette: &[PaletteColor]) -> String {
    let mut css = String::from(":root {\n");
    for (index, color) in palette.iter().enumerate() {
        css.push_str(&format!("  --color-{}: {};\n", index + 1, color.hex));
    }
    css.push_str("}\n");
    css
}

/// The state a user edits: a seed, its palette, which slots are locked, and the theme choice.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteSession {
    pub seed: u32,
    pub palette: [PaletteColor; SWATCH_COUNT],
    pub locks: Locks,
    /// The theme the user asked for; `None` lets each generation pick one.
    pub selected_theme_id: Option<String>,
    pub theme_id: String,
    pub theme_name: String,
}

impl PaletteSession {
    pub fn new(seed: u32, selected_theme_id: Option<String>, pool: &[PaletteTheme]) -> Self {
        let generated = generate_palette(seed, &UNLOCKED, selected_theme_id.as_deref(), pool);
        PaletteSession {
            seed,
            palette: generated.colors,
            locks: [false; SWATCH_COUNT],
            selected_theme_id,
            theme_id: generated.theme_id,
            theme_name: generated.theme_name,
        }
    }

    pub fn locked_colors(&self) -> LockedColors {
        locked_colors(&self.palette, &self.locks)
    }

    /// Regenerates the palette for `seed`, keeping locked slots.
    pub fn regenerate(&mut self, seed: u32, pool: &[PaletteTheme]) {
        let generated = generate_palette(
            seed,
            &self.locked_colors(),
            self.selected_theme_id.as_deref(),
            pool,
        );
        self.seed = seed;
        self.apply(generated);
    }

    /// Moves to the next seed in the iteration chain and regenerates. Returns the new seed.
    pub fn iterate(&mut self, pool: &[PaletteTheme]) -> u32 {
        let next = derive_iteration_seed(self.seed);
        self.regenerate(next, pool);
        next
    }

    /// Switches the preferred theme and regenerates with the current seed.
    pub fn set_theme(&mut self, theme_id: Option<String>, pool: &[PaletteTheme]) {
        self.selected_theme_id = theme_id;
        self.regenerate(self.seed, pool);
    }

    pub fn toggle_lock(&mut self, index: usize) {
        if let Some(lock) = self.locks.get_mut(index) {
            *lock = !*lock;
        }
    }

    /// Swaps slot `index` with its neighbour in `direction` (`-1` or `1`), carrying the lock
    /// along. Returns `false` if either slot is out of range.
    pub fn swap_slots(&mut self, index: usize, direction: isize) -> bool {
        let Some(target) = index.checked_add_signed(direction) else {
            return false;
        };
        if index >= SWATCH_COUNT || target >= SWATCH_COUNT {
            return false;
        }
        self.palette.swap(index, target);
        self.locks.swap(index, target);
        true
    }

    pub fn css(&self) -> String {
        css_variables(&self.palette)
    }

    fn apply(&mut self, generated: GeneratedPalette) {
        self.palette = generated.colors;
        self.theme_id = generated.theme_id;
        self.theme_name = generated.theme_name;
    }
}
