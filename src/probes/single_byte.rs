use super::EncodingProbe;
use crate::consts::{
    CP1250_BYTE_WEIGHTS, CP1250_DISTRIBUTION, ISO_8859_2_BYTE_WEIGHTS, ISO_8859_2_DISTRIBUTION,
    POLISH_DIACRITICS, SINGLE_BYTE_AMBIGUITY_CAP, SINGLE_BYTE_AMBIGUITY_WINDOW,
    SUSPICIOUS_SYMBOLS,
};
use crate::context;
use crate::entity::Candidate;
use crate::feedback::FeedbackBus;
use crate::freq::{byte_histogram, polish_ngram_score};
use crate::utils::{is_text_printable, round_float, strict_decode};
use encoding_rs::{Encoding, ISO_8859_2_INIT, WINDOWS_1250_INIT};

// Everything needed to score one Central-European code page. Adding a
// profile is data, not code.
struct SingleByteProfile {
    name: &'static str,
    codec: &'static Encoding,
    weights: &'static [(u8, f64)],
    opposing_weights: &'static [(u8, f64)],
    distribution: &'static [(u8, f64, f64)],
}

static PROFILES: [SingleByteProfile; 2] = [
    SingleByteProfile {
        name: "windows-1250",
        codec: &WINDOWS_1250_INIT,
        weights: &CP1250_BYTE_WEIGHTS,
        opposing_weights: &ISO_8859_2_BYTE_WEIGHTS,
        distribution: &CP1250_DISTRIBUTION,
    },
    SingleByteProfile {
        name: "iso-8859-2",
        codec: &ISO_8859_2_INIT,
        weights: &ISO_8859_2_BYTE_WEIGHTS,
        opposing_weights: &CP1250_BYTE_WEIGHTS,
        distribution: &ISO_8859_2_DISTRIBUTION,
    },
];

/// Scores windows-1250 against iso-8859-2 with Polish-language weighting and
/// byte-distribution matching. When the two profiles are indistinguishable
/// the reported confidence is capped, so ambiguous buffers surface as such.
pub struct SingleByteProbe;

// Text-level part of the score: printable density, Polish diacritics and
// n-grams push up; C1 controls and box-drawing-era symbols push down.
fn decoded_text_score(decoded: &str) -> f64 {
    if decoded.is_empty() {
        return 0.0;
    }

    let mut printable: u64 = 0;
    let mut c1_controls: u64 = 0;
    let mut polish_hits: u64 = 0;
    let mut suspicious: u64 = 0;
    let mut length: u64 = 0;
    for character in decoded.chars() {
        length += 1;
        if is_text_printable(character) {
            printable += 1;
        }
        if ('\u{80}'..='\u{9F}').contains(&character) {
            c1_controls += 1;
        }
        if POLISH_DIACRITICS.contains(character) {
            polish_hits += 1;
        }
        if SUSPICIOUS_SYMBOLS.contains(character) {
            suspicious += 1;
        }
    }

    let length = length.max(1) as f64;
    let mut score = printable as f64 / length;
    score += (polish_hits as f64 / length * 4.0).min(0.35);
    score += (polish_ngram_score(decoded) * 2.8).min(0.45);
    score -= c1_controls as f64 / length * 2.5;
    score -= suspicious as f64 / length * 0.8;
    score
}

// Byte-level weighting of the profile's own diacritic layout against the
// opposing profile's layout.
fn polish_weighting(data: &[u8], profile: &SingleByteProfile) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let table = byte_histogram(data);
    let total = data.len() as f64;

    let own: f64 = profile
        .weights
        .iter()
        .map(|&(byte, weight)| table[byte as usize] as f64 / total * weight)
        .sum();
    let opposing: f64 = profile
        .opposing_weights
        .iter()
        .map(|&(byte, weight)| table[byte as usize] as f64 / total * weight)
        .sum();
    own - opposing * 0.75
}

// Weighted L1 distance between the observed histogram and the profile's
// reference template, folded into [0, 1] where 1 is a close match.
fn distribution_match(data: &[u8], profile: &SingleByteProfile) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let table = byte_histogram(data);
    let total = data.len() as f64;

    let mut weighted_distance = 0.0;
    let mut weight_sum = 0.0;
    for &(byte, expected_ratio, weight) in profile.distribution {
        let actual_ratio = table[byte as usize] as f64 / total;
        weighted_distance += (actual_ratio - expected_ratio).abs() * weight;
        weight_sum += weight;
    }
    if weight_sum <= 0.0 {
        return 0.0;
    }
    (1.0 - weighted_distance / weight_sum * 20.0).clamp(0.0, 1.0)
}

impl EncodingProbe for SingleByteProbe {
    fn name(&self) -> &'static str {
        "single-byte"
    }

    fn probe(&self, data: &[u8], feedback: &FeedbackBus) -> Option<Candidate> {
        let mut scored: Vec<(&'static str, f64)> = Vec::with_capacity(PROFILES.len());
        for profile in PROFILES.iter() {
            let decoded = match strict_decode(data, profile.codec) {
                Some(decoded) => decoded,
                None => {
                    feedback.debug(
                        "single-byte:reject",
                        "Single-byte candidate rejected",
                        context! { "encoding" => profile.name },
                    );
                    continue;
                }
            };
            let mut score = decoded_text_score(&decoded);
            score += polish_weighting(data, profile).clamp(-0.9, 0.9);
            score += (distribution_match(data, profile) - 0.5) * 1.1;
            scored.push((profile.name, score));
        }

        if scored.is_empty() {
            feedback.debug(
                "single-byte:none",
                "No valid single-byte candidate",
                context! { "size" => data.len() },
            );
            return None;
        }

        // First profile keeps ties.
        let (encoding, best_score) = scored
            .iter()
            .copied()
            .fold(scored[0], |best, item| if item.1 > best.1 { item } else { best });

        let mut confidence = (0.45 + best_score * 0.32).clamp(0.0, 0.93);
        if scored.len() == 2 && (scored[0].1 - scored[1].1).abs() <= SINGLE_BYTE_AMBIGUITY_WINDOW {
            // Score gap this small means the profiles cannot be told apart.
            confidence = confidence.min(SINGLE_BYTE_AMBIGUITY_CAP);
        }

        feedback.debug(
            "single-byte:select",
            "Single-byte candidate selected",
            context! {
                "encoding" => encoding,
                "confidence" => round_float(confidence, 6),
            },
        );
        Some(Candidate {
            encoding,
            confidence,
        })
    }
}
