//! Color-statistics freshness heuristic.
//!
//! Samples every fourth pixel of the frame in row-major order and scores it
//! from the share of bright, dark, green and brown samples. The coefficients
//! are part of the observable behavior and must not be tuned.

use crate::models::HeuristicScore;
use crate::normalizer::DecodedFrame;
use tracing::debug;

/// Distance between sampled pixels in row-major order.
pub const SAMPLE_STRIDE: usize = 4;

pub const BASE_SCORE: f64 = 0.5;
pub const BRIGHT_WEIGHT: f64 = 0.3;
pub const GREEN_WEIGHT: f64 = 0.4;
pub const DARK_WEIGHT: f64 = 0.4;
pub const BROWN_WEIGHT: f64 = 0.5;
pub const CONFIDENCE_FLOOR: f64 = 0.7;
pub const CONFIDENCE_SLOPE: f64 = 0.6;

const BRIGHT_ABOVE: f64 = 150.0;
const DARK_BELOW: f64 = 50.0;
const GREEN_ABOVE: u8 = 100;
const BROWN_RED_ABOVE: u8 = 100;
const BROWN_GREEN_BLUE_BELOW: u8 = 80;

/// Counts over the sampled pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PixelStats {
    pub sampled: usize,
    pub bright: usize,
    pub dark: usize,
    pub green: usize,
    pub brown: usize,
}

impl PixelStats {
    fn ratio(&self, count: usize) -> f64 {
        if self.sampled == 0 {
            0.0
        } else {
            count as f64 / self.sampled as f64
        }
    }

    pub fn bright_ratio(&self) -> f64 {
        self.ratio(self.bright)
    }

    pub fn dark_ratio(&self) -> f64 {
        self.ratio(self.dark)
    }

    pub fn green_ratio(&self) -> f64 {
        self.ratio(self.green)
    }

    pub fn brown_ratio(&self) -> f64 {
        self.ratio(self.brown)
    }
}

pub fn sample(frame: &DecodedFrame) -> PixelStats {
    let mut stats = PixelStats::default();
    for px in frame.pixels().pixels().step_by(SAMPLE_STRIDE) {
        let [r, g, b] = px.0;
        stats.sampled += 1;

        let brightness = (r as f64 + g as f64 + b as f64) / 3.0;
        if brightness > BRIGHT_ABOVE {
            stats.bright += 1;
        }
        if brightness < DARK_BELOW {
            stats.dark += 1;
        }

        if g > r && g > b && g > GREEN_ABOVE {
            stats.green += 1;
        }
        if r > BROWN_RED_ABOVE && g < BROWN_GREEN_BLUE_BELOW && b < BROWN_GREEN_BLUE_BELOW {
            stats.brown += 1;
        }
    }
    stats
}

/// Confidence grows linearly with the distance from the neutral score.
pub fn confidence_for(score: f64) -> f64 {
    CONFIDENCE_FLOOR + (score - BASE_SCORE).abs() * CONFIDENCE_SLOPE
}

pub fn score_stats(stats: &PixelStats) -> HeuristicScore {
    let mut score = BASE_SCORE;
    score += stats.bright_ratio() * BRIGHT_WEIGHT;
    score += stats.green_ratio() * GREEN_WEIGHT;
    score -= stats.dark_ratio() * DARK_WEIGHT;
    score -= stats.brown_ratio() * BROWN_WEIGHT;
    let score = score.clamp(0.0, 1.0);

    HeuristicScore {
        score,
        confidence: confidence_for(score),
    }
}

/// Scores a frame. Pure: equal frames always produce equal scores.
pub fn analyze(frame: &DecodedFrame) -> HeuristicScore {
    let stats = sample(frame);
    let result = score_stats(&stats);
    debug!(
        sampled = stats.sampled,
        bright = stats.bright,
        dark = stats.dark,
        green = stats.green,
        brown = stats.brown,
        score = result.score,
        "color heuristic"
    );
    result
}
