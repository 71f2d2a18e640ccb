use proptest::prelude::*;

use swatchwork::color::{HslColor, Rgb};
use swatchwork::contrast::{contrast_ratio, hue_spread};
use swatchwork::palette::{generate_palette, LockedColors, PaletteSession};
use swatchwork::rand::{derive_iteration_seed, MAX_SEED};
use swatchwork::seed::{build_master_seed, parse_master_seed, MasterSeedPayload};

fn any_seed() -> impl Strategy<Value = u32> {
    1..MAX_SEED
}

fn any_hsl() -> impl Strategy<Value = HslColor> {
    (0.0..360.0f64, 0.0..=100.0f64, 0.0..=100.0f64).prop_map(|(h, s, l)| HslColor::new(h, s, l))
}

fn any_locks() -> impl Strategy<Value = LockedColors> {
    prop::array::uniform5(prop::option::of(any_hsl()))
}

fn any_theme() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec![
        "edo",
        "hypernova",
        "los-angeles",
        "no-such-theme",
    ]))
}

fn any_hex() -> impl Strategy<Value = String> {
    any::<[u8; 3]>().prop_map(|[r, g, b]| Rgb(r, g, b).to_hex())
}

fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

proptest! {
    #[test]
    fn palette_is_a_function_of_its_inputs(
        seed in any_seed(),
        locked in any_locks(),
        theme in any_theme(),
    ) {
        let a = generate_palette(seed, &locked, theme, &[]);
        let b = generate_palette(seed, &locked, theme, &[]);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn locked_slots_pass_through(seed in any_seed(), locked in any_locks(), theme in any_theme()) {
        let palette = generate_palette(seed, &locked, theme, &[]);
        for (color, lock) in palette.colors.iter().zip(locked) {
            if let Some(hsl) = lock {
                prop_assert_eq!(color.hsl, hsl);
                prop_assert_eq!(&color.hex, &hsl.to_hex());
            }
        }
    }

    #[test]
    fn free_slots_stay_in_range(seed in any_seed(), theme in any_theme()) {
        let palette = generate_palette(seed, &[None; 5], theme, &[]);
        for color in &palette.colors {
            let HslColor { h, s, l } = color.hsl;
            prop_assert!((0.0..360.0).contains(&h), "hue {}", h);
            prop_assert!((14.0..=97.0).contains(&s), "saturation {}", s);
            prop_assert!((8.0..=92.0).contains(&l), "lightness {}", l);
            prop_assert_eq!(&color.hex, &color.hsl.to_hex());
        }
        if let Some(theme) = theme.filter(|&id| id != "no-such-theme") {
            prop_assert_eq!(palette.theme_id, theme);
        }
    }

    #[test]
    fn iteration_seed_stays_positive(seed in any::<u32>()) {
        let next = derive_iteration_seed(seed);
        prop_assert!((1..=MAX_SEED).contains(&next));
    }

    #[test]
    fn saturated_colors_survive_hex(h in 0.0..360.0f64, s in 50.0..=100.0f64, l in 30.0..=70.0f64) {
        let back = Rgb::from_hex(&HslColor::new(h, s, l).to_hex())
            .map(Rgb::to_hsl)
            .ok_or_else(|| TestCaseError::fail("unparseable hex"))?;
        prop_assert!(hue_distance(back.h, h) <= 1.0, "hue {} -> {}", h, back.h);
        prop_assert!((back.s - s).abs() <= 1.0, "saturation {} -> {}", s, back.s);
        prop_assert!((back.l - l).abs() <= 1.0, "lightness {} -> {}", l, back.l);
    }

    #[test]
    fn contrast_is_symmetric(a in any_hex(), b in any_hex()) {
        let ab = contrast_ratio(&a, &b);
        prop_assert!(ab >= 1.0);
        prop_assert!(ab <= 21.0 + 1e-9);
        prop_assert!((ab - contrast_ratio(&b, &a)).abs() < 1e-12);
        prop_assert!((contrast_ratio(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hue_spread_is_bounded(hues in prop::collection::vec(-720.0..720.0f64, 0..8)) {
        let spread = hue_spread(&hues);
        prop_assert!((0.0..360.0).contains(&spread), "spread {}", spread);
        if hues.len() < 2 {
            prop_assert_eq!(spread, 0.0);
        }
    }

    #[test]
    fn master_seed_round_trips(seed in any_seed(), locks in any::<[bool; 5]>(), theme in any_theme()) {
        let mut session = PaletteSession::new(seed, theme.map(str::to_owned), &[]);
        for index in (0..locks.len()).filter(|&index| locks[index]) {
            session.toggle_lock(index);
        }
        let payload = MasterSeedPayload::from(&session);
        let encoded = build_master_seed(&payload);
        prop_assert!(encoded.starts_with("PLT1."));

        let decoded = parse_master_seed(&encoded)
            .ok_or_else(|| TestCaseError::fail("master seed rejected"))?;
        prop_assert_eq!(decoded.seed, seed);
        prop_assert_eq!(decoded.locks, locks);
        prop_assert_eq!(&decoded.theme_id, &payload.theme_id);
        prop_assert_eq!(&decoded.selected_theme_id, &payload.selected_theme_id);
        for (back, sent) in decoded.palette.iter().zip(&payload.palette) {
            prop_assert_eq!(&back.hex, &sent.hex);
            prop_assert!((back.hsl.h - sent.hsl.h).abs() < 1e-9);
            prop_assert!((back.hsl.s - sent.hsl.s).abs() < 1e-9);
            prop_assert!((back.hsl.l - sent.hsl.l).abs() < 1e-9);
        }
    }
}
