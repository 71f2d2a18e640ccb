use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use hex_literal::hex;
use image::ImageFormat;
use raqote::DrawTarget;

use swatchwork::color::{HslColor, Rgb};
use swatchwork::palette::{generate_palette, LockedColors, PaletteSession, UNLOCKED};
use swatchwork::rand::derive_iteration_seed;
use swatchwork::render::{render_frame, RenderOptions};
use swatchwork::seed::{build_master_seed, parse_master_seed, MasterSeedPayload};

const SEED: u32 = 421_337_420;

/// A hand-built payload in the web app's master-seed format: the default seed with slot 1 locked
/// to `hsl(350 40% 50%)` and rounded HSL values elsewhere.
const INTEROP_MASTER_SEED: &str = "PLT1.eyJ2IjoxLCJzZWVkIjo0MjEzMzc0MjAsInRoZW1lSWQiOiJsb3MtYW5nZWxlcyIsInNlbGVjdGVkVGhlbWVJZCI6ImF1dG8iLCJsb2NrcyI6W2ZhbHNlLHRydWUsZmFsc2UsZmFsc2UsZmFsc2VdLCJwYWxldHRlIjpbeyJoc2wiOnsiaCI6NDkuNSwicyI6NTIsImwiOjc3LjV9LCJoZXgiOiIjRThERUJBIn0seyJoc2wiOnsiaCI6MzUwLCJzIjo0MCwibCI6NTB9LCJoZXgiOiIjQjM0RDVFIn0seyJoc2wiOnsiaCI6MjA0LCJzIjo0NywibCI6MzB9LCJoZXgiOiIjMjk1NDcyIn0seyJoc2wiOnsiaCI6MTAsInMiOjYwLCJsIjozMH0sImhleCI6IiM3QTJFMUYifSx7ImhzbCI6eyJoIjozNDEsInMiOjM4LCJsIjo1OX0sImhleCI6IiNCRTZFODcifV19";

fn rgb_bytes<'a>(hexes: impl IntoIterator<Item = &'a str>) -> anyhow::Result<Vec<u8>> {
    hexes
        .into_iter()
        .map(|hex| {
            let Rgb(r, g, b) = Rgb::from_hex(hex).with_context(|| format!("bad hex {hex:?}"))?;
            Ok([r, g, b])
        })
        .collect::<anyhow::Result<Vec<[u8; 3]>>>()
        .map(|colors| colors.concat())
}

fn test_golden_palette(
    seed: u32,
    locked: &LockedColors,
    theme: Option<&str>,
    expected_theme: &str,
    expected: [u8; 15],
) -> anyhow::Result<()> {
    let palette = generate_palette(seed, locked, theme, &[]);
    assert_eq!(palette.theme_id, expected_theme);
    let actual = rgb_bytes(palette.colors.iter().map(|c| c.hex.as_str()))?;
    assert_eq!(
        actual,
        expected,
        "seed {seed}: got {:?}",
        palette.hexes()
    );
    Ok(())
}

#[test]
fn golden_default_seed() -> anyhow::Result<()> {
    test_golden_palette(
        SEED,
        &UNLOCKED,
        None,
        "los-angeles",
        hex!("E8DEBA F6A66A 4A6C9E F24F50 C16F87"),
    )
}

/// Edo has exactly five colors, so the theme is taken as-is before jitter.
#[test]
fn golden_edo() -> anyhow::Result<()> {
    test_golden_palette(
        SEED,
        &UNLOCKED,
        Some("edo"),
        "edo",
        hex!("F2EFD5 EEBA32 E45763 562032 5F838C"),
    )
}

/// Hypernova has seven colors and takes the stride walk.
#[test]
fn golden_hypernova() -> anyhow::Result<()> {
    test_golden_palette(
        SEED,
        &UNLOCKED,
        Some("hypernova"),
        "hypernova",
        hex!("08FBBA 24077D FD8F8C F3A504 5F09B7"),
    )
}

#[test]
fn golden_two_locks() -> anyhow::Result<()> {
    let mut locked = UNLOCKED;
    locked[1] = Some(HslColor::new(350.0, 40.0, 50.0));
    locked[3] = Some(HslColor::new(10.0, 60.0, 30.0));
    test_golden_palette(
        SEED,
        &locked,
        None,
        "los-angeles",
        hex!("E4D9A8 B34D5E 295472 7A2E1F BE6E87"),
    )
}

#[test]
fn golden_iteration_chain() {
    let mut chain = vec![SEED];
    for _ in 0..4 {
        chain.push(derive_iteration_seed(*chain.last().unwrap()));
    }
    assert_eq!(
        chain,
        [421_337_420, 1_948_548_560, 560_530_100, 495_411_465, 2_137_412_687]
    );

    let mut session = PaletteSession::new(SEED, None, &[]);
    for &expected in &chain[1..] {
        assert_eq!(session.iterate(&[]), expected);
    }
}

#[test]
fn golden_interop_master_seed() -> anyhow::Result<()> {
    let payload = parse_master_seed(INTEROP_MASTER_SEED).context("master seed rejected")?;
    assert_eq!(payload.seed, SEED);
    assert_eq!(payload.theme_id, "los-angeles");
    assert_eq!(payload.locks, [false, true, false, false, false]);
    assert_eq!(
        rgb_bytes(payload.palette.iter().map(|c| c.hex.as_str()))?,
        hex!("E8DEBA B34D5E 295472 7A2E1F BE6E87")
    );
    assert_eq!(payload.palette[1].hsl, HslColor::new(350.0, 40.0, 50.0));

    let session = payload.clone().into_session(&[]);
    assert_eq!(session.selected_theme_id, None);
    assert_eq!(session.theme_name, "Los Angeles");
    let reencoded = build_master_seed(&MasterSeedPayload::from(&session));
    let again = parse_master_seed(&reencoded).context("re-encoded seed rejected")?;
    assert_eq!(again.seed, payload.seed);
    assert_eq!(again.locks, payload.locks);
    assert_eq!(again.selected_theme_id, "auto");
    Ok(())
}

fn write_golden(dt: &DrawTarget, golden_filepath: &Path) -> anyhow::Result<()> {
    dt.write_png(golden_filepath)
        .context("Failed to write golden PNG")
}

fn check_golden(dt: &DrawTarget, golden_filepath: &Path) -> anyhow::Result<()> {
    let reader = BufReader::new(
        File::open(golden_filepath)
            .with_context(|| format!("Failed to read golden at {}", golden_filepath.display()))?,
    );
    let reader = image::io::Reader::with_format(reader, ImageFormat::Png);
    let golden = reader
        .decode()
        .context("Failed to decode image")?
        .into_rgba8();

    assert_eq!(
        (dt.width() as u32, dt.height() as u32),
        (golden.width(), golden.height())
    );

    let actual_pixels = dt.get_data().iter();
    let golden_pixels = golden.enumerate_pixels();
    for (actual_px, (x, y, golden_px)) in actual_pixels.zip(golden_pixels) {
        let [ab, ag, ar, aa] = actual_px.to_le_bytes();
        let [gr, gg, gb, _ga] = golden_px.0;
        // PNG stores straight color; only opaque pixels compare directly.
        if aa != 255 {
            continue;
        }
        assert_px_close((x, y), (ar, ag, ab), (gr, gg, gb));
    }

    Ok(())
}

fn assert_px_close((x, y): (u32, u32), actual: (u8, u8, u8), golden: (u8, u8, u8)) {
    const THRESHOLD: u32 = 1;
    let dr = channel_delta(actual.0, golden.0);
    let dg = channel_delta(actual.1, golden.1);
    let db = channel_delta(actual.2, golden.2);
    if dr > THRESHOLD || dg > THRESHOLD || db > THRESHOLD {
        panic!(
            "at ({}, {}): expected ~{:?}, got {:?}; max allowed deviation is {}",
            x, y, golden, actual, THRESHOLD
        );
    }
}

fn channel_delta(u: u8, v: u8) -> u32 {
    ((u as i32) - (v as i32)).unsigned_abs()
}

/// A rendered frame survives the trip through PNG with its channel order intact.
#[test]
fn golden_render_png_round_trip() -> anyhow::Result<()> {
    let palette = generate_palette(SEED, &UNLOCKED, None, &[]).hexes();
    let options = RenderOptions {
        min_width: Some(0),
        min_height: Some(0),
        plain: false,
    };
    let frame = render_frame(110, 90, palette.as_slice(), SEED, &options);
    let dt = frame.to_draw_target();

    let filepath: PathBuf =
        std::env::temp_dir().join(format!("swatchwork-golden-{}.png", std::process::id()));
    write_golden(&dt, &filepath)?;
    let checked = check_golden(&dt, &filepath);
    std::fs::remove_file(&filepath).ok();
    checked
}
