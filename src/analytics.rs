//! Palette health: pairwise contrast, spread metrics, and their plain-language reading.

use serde::Serialize;

use crate::color::PaletteColor;
use crate::contrast::{contrast_ratio, hue_spread, AA_TEXT_TARGET};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricTone {
    Strong,
    Balanced,
    Weak,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub detail: &'static str,
    pub tone: MetricTone,
}

const fn metric(label: &'static str, detail: &'static str, tone: MetricTone) -> Metric {
    Metric {
        label,
        detail,
        tone,
    }
}

/// Contrast ratio of every ordered pair of palette colors; the diagonal is `1.0`.
pub fn contrast_matrix(palette: &[PaletteColor]) -> Vec<Vec<f64>> {
    palette
        .iter()
        .map(|row| {
            palette
                .iter()
                .map(|column| contrast_ratio(&row.hex, &column.hex))
                .collect()
        })
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ContrastPair {
    pub a: usize,
    pub b: usize,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub hue_spread: f64,
    pub saturation_range: f64,
    pub lightness_range: f64,
    pub average_contrast: f64,
    /// Lowest-contrast pair; the earliest pair wins ties.
    pub weakest: ContrastPair,
    pub strongest: ContrastPair,
    pub aa_passing_pairs: usize,
    pub aa_pass_rate: f64,
    pub total_pairs: usize,
}

fn range(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = values.fold(f64::INFINITY, f64::min);
    if max.is_finite() && min.is_finite() {
        max - min
    } else {
        0.0
    }
}

impl AnalyticsSummary {
    pub fn from_palette(palette: &[PaletteColor]) -> Self {
        let matrix = contrast_matrix(palette);

        let mut weakest = ContrastPair {
            a: 0,
            b: 0,
            ratio: f64::INFINITY,
        };
        let mut strongest = ContrastPair {
            a: 0,
            b: 0,
            ratio: f64::NEG_INFINITY,
        };
        let (mut total, mut count, mut passing) = (0.0, 0, 0);
        for (row, ratios) in matrix.iter().enumerate() {
            for (column, &ratio) in ratios.iter().enumerate().skip(row + 1) {
                total += ratio;
                count += 1;
                if ratio < weakest.ratio {
                    weakest = ContrastPair { a: row, b: column, ratio };
                }
                if ratio > strongest.ratio {
                    strongest = ContrastPair { a: row, b: column, ratio };
                }
                if ratio >= AA_TEXT_TARGET {
                    passing += 1;
                }
            }
        }
        if !weakest.ratio.is_finite() {
            weakest.ratio = 1.0;
        }
        if !strongest.ratio.is_finite() {
            strongest.ratio = 1.0;
        }

        let hues: Vec<f64> = palette.iter().map(|c| c.hsl.h).collect();
        AnalyticsSummary {
            hue_spread: hue_spread(&hues),
            saturation_range: range(palette.iter().map(|c| c.hsl.s)),
            lightness_range: range(palette.iter().map(|c| c.hsl.l)),
            average_contrast: if count > 0 { total / count as f64 } else { 1.0 },
            weakest,
            strongest,
            aa_passing_pairs: passing,
            aa_pass_rate: if count > 0 {
                passing as f64 / count as f64 * 100.0
            } else {
                0.0
            },
            total_pairs: count,
        }
    }
}

pub fn describe_hue_variety(hue_spread: f64) -> Metric {
    if hue_spread < 110.0 {
        metric(
            "Focused",
            "Most colors are from nearby families, so the look stays cohesive.",
            MetricTone::Balanced,
        )
    } else if hue_spread < 210.0 {
        metric(
            "Balanced",
            "Good spread across the wheel without feeling chaotic.",
            MetricTone::Strong,
        )
    } else {
        metric(
            "Wide",
            "Very broad color families, strong visual variety.",
            MetricTone::Balanced,
        )
    }
}

pub fn describe_saturation_energy(saturation_range: f64) -> Metric {
    if saturation_range < 24.0 {
        metric(
            "Soft",
            "Mostly muted colors, calm and minimal mood.",
            MetricTone::Balanced,
        )
    } else if saturation_range < 48.0 {
        metric(
            "Mixed",
            "Balanced mix of muted and vivid tones.",
            MetricTone::Strong,
        )
    } else {
        metric(
            "Punchy",
            "Strong difference between muted and vivid colors.",
            MetricTone::Strong,
        )
    }
}

pub fn describe_lightness_depth(lightness_range: f64) -> Metric {
    if lightness_range < 24.0 {
        metric(
            "Flat",
            "Colors sit in similar brightness, so depth is limited.",
            MetricTone::Weak,
        )
    } else if lightness_range < 42.0 {
        metric(
            "Moderate",
            "Clear light/dark differences with controlled contrast.",
            MetricTone::Balanced,
        )
    } else {
        metric(
            "Deep",
            "Strong light vs dark separation, good for hierarchy.",
            MetricTone::Strong,
        )
    }
}

pub fn describe_readability(average_contrast: f64) -> Metric {
    if average_contrast < 3.0 {
        metric(
            "Challenging",
            "Many pairings are hard to read as text.",
            MetricTone::Weak,
        )
    } else if average_contrast < AA_TEXT_TARGET {
        metric(
            "Mixed",
            "Some combinations read well, some need caution.",
            MetricTone::Balanced,
        )
    } else {
        metric(
            "Strong",
            "Most combinations are solid for text readability.",
            MetricTone::Strong,
        )
    }
}

pub fn describe_accessibility(aa_pass_rate: f64) -> Metric {
    if aa_pass_rate < 35.0 {
        metric(
            "Low Coverage",
            "Only a small set of color pairs are AA-safe for normal text.",
            MetricTone::Weak,
        )
    } else if aa_pass_rate < 70.0 {
        metric(
            "Partial Coverage",
            "AA-safe options exist, but pairing choice matters.",
            MetricTone::Balanced,
        )
    } else {
        metric(
            "High Coverage",
            "Most pairings can support readable text.",
            MetricTone::Strong,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub variety: Metric,
    pub energy: Metric,
    pub depth: Metric,
    pub readability: Metric,
    pub accessibility: Metric,
    pub tip: &'static str,
}

impl Narrative {
    pub fn from_summary(summary: &AnalyticsSummary) -> Self {
        let accessibility = describe_accessibility(summary.aa_pass_rate);
        let tip = match accessibility.tone {
            MetricTone::Strong => {
                "Most pairings are text-safe. You can use this palette flexibly across UI surfaces."
            }
            MetricTone::Balanced => {
                "Use the highest-contrast pair for body text; use close pairs for accents or large titles."
            }
            MetricTone::Weak => {
                "Reserve low-contrast pairs for decoration and use only the strongest pair for small text."
            }
        };
        Narrative {
            variety: describe_hue_variety(summary.hue_spread),
            energy: describe_saturation_energy(summary.saturation_range),
            depth: describe_lightness_depth(summary.lightness_range),
            readability: describe_readability(summary.average_contrast),
            accessibility,
            tip,
        }
    }
}
