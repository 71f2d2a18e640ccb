use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use swatchwork::analytics::{AnalyticsSummary, Narrative};
use swatchwork::config::RenderConfig;
use swatchwork::names::tone_name;
use swatchwork::palette::variants::VariantSnapshot;
use swatchwork::palette::PaletteSession;
use swatchwork::rand::make_random_seed;
use swatchwork::render::{render_frame, render_studies, RenderOptions};
use swatchwork::seed::{build_master_seed, try_parse_master_seed, MasterSeedPayload};
use swatchwork::themes::custom::CustomThemes;
use swatchwork::themes::PaletteTheme;

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a palette and print it as JSON.
    Palette(PaletteArgs),
    /// Print the variant lab for a palette as JSON.
    Variants(PaletteArgs),
    /// Render the artwork for a seed and palette to a PNG.
    Render(RenderArgs),
    /// Render the four artwork studies for a seed and palette.
    Studies(StudiesArgs),
    /// Print the master seed for a palette.
    Encode(PaletteArgs),
    /// Decode a master seed and print its payload as JSON.
    Decode { master_seed: String },
}

#[derive(clap::Args)]
struct PaletteArgs {
    /// Palette seed; random when omitted.
    #[clap(long)]
    seed: Option<u32>,
    /// Preferred theme id; each generation picks one when omitted.
    #[clap(long)]
    theme: Option<String>,
    /// Step this many times along the iteration chain first.
    #[clap(long, default_value = "0")]
    iterate: u32,
    /// Lock these slots (0-based) before iterating.
    #[clap(long)]
    lock: Vec<usize>,
    /// A saved custom-themes JSON blob to add to the theme pool.
    #[clap(long)]
    custom_themes: Option<PathBuf>,
    /// Include contrast analytics in the output.
    #[clap(long)]
    analytics: bool,
    /// Print CSS custom properties instead of JSON.
    #[clap(long)]
    css: bool,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[clap(long)]
    seed: u32,
    /// Comma-separated hex colors; the palette for `--seed` when omitted.
    #[clap(long, value_delimiter = ',')]
    palette: Vec<String>,
    #[clap(short, long, default_value = "760")]
    width: u32,
    #[clap(short = 'H', long, default_value = "760")]
    height: u32,
    /// Output file [default: <seed>.png].
    #[clap(short, long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    config: RenderConfig,
}

#[derive(clap::Args)]
struct StudiesArgs {
    #[clap(long)]
    seed: u32,
    /// How many times the palette has been iterated; shifts every study seed.
    #[clap(long, default_value = "0")]
    iteration: u32,
    #[clap(long, value_delimiter = ',')]
    palette: Vec<String>,
    #[clap(short, long, default_value = "320")]
    width: u32,
    #[clap(short = 'H', long, default_value = "240")]
    height: u32,
    #[clap(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwatchReport<'a> {
    hex: &'a str,
    name: String,
    locked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaletteReport<'a> {
    seed: u32,
    theme_id: &'a str,
    theme_name: &'a str,
    colors: Vec<SwatchReport<'a>>,
    master_seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<AnalyticsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    narrative: Option<Narrative>,
}

fn load_pool(path: Option<&PathBuf>) -> anyhow::Result<Vec<PaletteTheme>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let blob = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read custom themes at {}", path.display()))?;
    Ok(CustomThemes::from_json(&blob).as_slice().to_vec())
}

fn session_from(args: &PaletteArgs, pool: &[PaletteTheme]) -> PaletteSession {
    let seed = args.seed.unwrap_or_else(make_random_seed);
    let mut session = PaletteSession::new(seed, args.theme.clone(), pool);
    for &index in &args.lock {
        session.toggle_lock(index);
    }
    for _ in 0..args.iterate {
        session.iterate(pool);
    }
    session
}

fn palette(args: &PaletteArgs) -> anyhow::Result<()> {
    let pool = load_pool(args.custom_themes.as_ref())?;
    let session = session_from(args, &pool);
    if args.css {
        print!("{}", session.css());
        return Ok(());
    }

    let summary = args
        .analytics
        .then(|| AnalyticsSummary::from_palette(&session.palette));
    let report = PaletteReport {
        seed: session.seed,
        theme_id: &session.theme_id,
        theme_name: &session.theme_name,
        colors: session
            .palette
            .iter()
            .zip(session.locks)
            .enumerate()
            .map(|(index, (color, locked))| SwatchReport {
                hex: &color.hex,
                name: tone_name(&color.hsl, index, session.seed),
                locked,
            })
            .collect(),
        master_seed: build_master_seed(&MasterSeedPayload::from(&session)),
        narrative: summary.as_ref().map(Narrative::from_summary),
        summary,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn variants(args: &PaletteArgs) -> anyhow::Result<()> {
    let pool = load_pool(args.custom_themes.as_ref())?;
    let session = session_from(args, &pool);
    let variants = VariantSnapshot::from(&session).variants();
    println!("{}", serde_json::to_string_pretty(&variants)?);
    Ok(())
}

fn palette_or_generated(palette: &[String], seed: u32) -> Vec<String> {
    if palette.is_empty() {
        PaletteSession::new(seed, None, &[]).palette.map(|c| c.hex).to_vec()
    } else {
        palette.to_vec()
    }
}

fn render(args: &RenderArgs) -> anyhow::Result<()> {
    let palette = palette_or_generated(&args.palette, args.seed);
    let options = RenderOptions::from(&args.config);
    let frame = render_frame(args.width, args.height, palette.as_slice(), args.seed, &options);

    let filename = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", args.seed)));
    frame
        .to_draw_target()
        .write_png(&filename)
        .with_context(|| format!("Failed to write {}", filename.display()))?;
    eprintln!("wrote png: {}", filename.display());
    Ok(())
}

fn studies(args: &StudiesArgs) -> anyhow::Result<()> {
    let palette = palette_or_generated(&args.palette, args.seed);
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let studies = render_studies(
        args.seed,
        args.iteration,
        palette.as_slice(),
        args.width,
        args.height,
    );
    for (index, study) in studies.iter().enumerate() {
        let filename = args
            .out_dir
            .join(format!("study-{}-{}.png", index + 1, study.seed));
        study
            .frame
            .to_draw_target()
            .write_png(&filename)
            .with_context(|| format!("Failed to write {}", filename.display()))?;
        eprintln!("wrote png: {}", filename.display());
    }
    Ok(())
}

fn encode(args: &PaletteArgs) -> anyhow::Result<()> {
    let pool = load_pool(args.custom_themes.as_ref())?;
    let session = session_from(args, &pool);
    println!("{}", build_master_seed(&MasterSeedPayload::from(&session)));
    Ok(())
}

fn decode(master_seed: &str) -> anyhow::Result<()> {
    let payload = try_parse_master_seed(master_seed).context("Invalid master seed")?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Opts::parse().command {
        Command::Palette(args) => palette(&args),
        Command::Variants(args) => variants(&args),
        Command::Render(args) => render(&args),
        Command::Studies(args) => studies(&args),
        Command::Encode(args) => encode(&args),
        Command::Decode { master_seed } => decode(&master_seed),
    }
}
