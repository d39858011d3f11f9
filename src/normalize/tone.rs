//! Tone consistency repair
//!
//! Models routinely emit an emotion list and a sentiment score that
//! disagree: a clearly negative emotion next to a positive-leaning score,
//! or a filler "neutral" entry crowding out the substantive signal. This
//! pass rewrites the weaker-evidenced field to match the dominant signal
//! and drops filler entries when substantive ones remain.
//!
//! The emotion list is treated as the better-evidenced signal: the score is
//! rewritten to the intensity-weighted valence of the substantive emotions.
//! That value is a fixed point of the pass, which keeps it idempotent.

use serde_json::Value;
use tracing::warn;

use draft_lens_core::ToneAnalysis;

/// Labels carrying positive valence.
const POSITIVE_LABELS: &[&str] = &[
    "joy",
    "gratitude",
    "appreciation",
    "excitement",
    "enthusiasm",
    "hope",
    "optimism",
    "relief",
    "affection",
    "warmth",
    "pride",
    "amusement",
    "contentment",
];

/// Labels carrying negative valence.
const NEGATIVE_LABELS: &[&str] = &[
    "anger",
    "frustration",
    "annoyance",
    "irritation",
    "sadness",
    "disappointment",
    "fear",
    "anxiety",
    "worry",
    "resentment",
    "impatience",
    "contempt",
    "hurt",
    "defensiveness",
];

/// Filler labels that add no signal; dropped when anything substantive
/// remains.
const FILLER_LABELS: &[&str] = &["neutral", "calm", "calmness", "indifference", "fine", "okay"];

/// A sentiment score within this distance of zero is not treated as
/// contradicting an opposite-signed emotion aggregate.
const SENTIMENT_DEAD_ZONE: f64 = 0.25;

fn valence(label: &str) -> f64 {
    let folded = label.trim().to_lowercase();
    if POSITIVE_LABELS.contains(&folded.as_str()) {
        1.0
    } else if NEGATIVE_LABELS.contains(&folded.as_str()) {
        -1.0
    } else {
        // Unknown labels carry no weight but are kept.
        0.0
    }
}

fn is_filler(label: &str) -> bool {
    FILLER_LABELS.contains(&label.trim().to_lowercase().as_str())
}

/// Repair a validated tone value in place.
pub(super) fn repair(value: &mut Value) {
    let Ok(mut tone) = serde_json::from_value::<ToneAnalysis>(value.clone()) else {
        // The validator guarantees the shape; nothing to repair if not.
        return;
    };

    let has_substantive = tone.emotions.iter().any(|e| valence(&e.label) != 0.0);

    if has_substantive {
        let before = tone.emotions.len();
        tone.emotions.retain(|e| !is_filler(&e.label));
        let dropped = before - tone.emotions.len();
        if dropped > 0 {
            warn!(
                dropped,
                "normalizer: dropped filler emotions in favor of substantive ones"
            );
        }
    }

    let mut weighted_sum = 0.0;
    let mut total_intensity = 0.0;
    for emotion in &tone.emotions {
        let v = valence(&emotion.label);
        if v != 0.0 {
            let intensity = emotion.intensity.clamp(0.0, 1.0);
            weighted_sum += v * intensity;
            total_intensity += intensity;
        }
    }

    if total_intensity > 0.0 {
        let evidence = weighted_sum / total_intensity;
        let contradicts =
            evidence * tone.overall_sentiment < 0.0 && evidence.abs() > SENTIMENT_DEAD_ZONE;
        if contradicts {
            warn!(
                reported = tone.overall_sentiment,
                rewritten = evidence,
                "normalizer: sentiment contradicted emotion evidence, rewrote score"
            );
            tone.overall_sentiment = evidence;
        }
    }

    if let Ok(repaired) = serde_json::to_value(&tone) {
        *value = repaired;
    }
}
