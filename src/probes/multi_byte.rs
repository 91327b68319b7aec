use super::EncodingProbe;
use crate::context;
use crate::dfa::laplace_confidence;
use crate::entity::Candidate;
use crate::feedback::FeedbackBus;
use crate::utils::{is_cjk_ideograph, is_kana, is_text_printable, round_float, strict_decode};
use encoding_rs::{Encoding, BIG5_INIT, EUC_JP_INIT, SHIFT_JIS_INIT};

type Validator = fn(&[u8]) -> Option<u64>;

/// Strict CJK validators that also count signal bytes, followed by a scoring
/// pass over the strictly decoded text. The best-scoring validated encoding
/// wins; ties break on signal ratio.
pub struct MultiByteProbe;

static CHECKS: [(&str, &Encoding, Validator); 3] = [
    ("shift_jis", &SHIFT_JIS_INIT, validate_shift_jis),
    ("euc_jp", &EUC_JP_INIT, validate_euc_jp),
    ("big5", &BIG5_INIT, validate_big5),
];

// Returns the signal-byte count, or None when the buffer is not valid
// Shift-JIS. A buffer whose only high bytes are half-width kana is rejected:
// without at least one lead/trail pair the evidence is too weak to claim
// Shift-JIS.
pub(crate) fn validate_shift_jis(data: &[u8]) -> Option<u64> {
    let mut i = 0;
    let mut signal: u64 = 0;
    let mut pair_count: u64 = 0;
    let mut has_high = false;
    let n = data.len();
    while i < n {
        let byte = data[i];
        if byte <= 0x7F {
            i += 1;
            continue;
        }
        has_high = true;
        if (0xA1..=0xDF).contains(&byte) {
            signal += 1;
            i += 1;
            continue;
        }
        if (0x81..=0x9F).contains(&byte) || (0xE0..=0xFC).contains(&byte) {
            if i + 1 >= n {
                return None;
            }
            let trail = data[i + 1];
            if !((0x40..=0x7E).contains(&trail) || (0x80..=0xFC).contains(&trail)) || trail == 0x7F
            {
                return None;
            }
            signal += 2;
            pair_count += 1;
            i += 2;
            continue;
        }
        return None;
    }
    if has_high && pair_count == 0 {
        return None;
    }
    Some(signal)
}

pub(crate) fn validate_euc_jp(data: &[u8]) -> Option<u64> {
    let mut i = 0;
    let mut signal: u64 = 0;
    let n = data.len();
    while i < n {
        let byte = data[i];
        if byte <= 0x7F {
            i += 1;
            continue;
        }
        // 8E: JIS X 0201 kana, 8F: three-byte JIS X 0212, A1-FE: JIS X 0208.
        if byte == 0x8E {
            if i + 1 >= n {
                return None;
            }
            if !(0xA1..=0xDF).contains(&data[i + 1]) {
                return None;
            }
            signal += 2;
            i += 2;
            continue;
        }
        if byte == 0x8F {
            if i + 2 >= n {
                return None;
            }
            let (trail1, trail2) = (data[i + 1], data[i + 2]);
            if !((0xA1..=0xFE).contains(&trail1) && (0xA1..=0xFE).contains(&trail2)) {
                return None;
            }
            signal += 3;
            i += 3;
            continue;
        }
        if (0xA1..=0xFE).contains(&byte) {
            if i + 1 >= n {
                return None;
            }
            if !(0xA1..=0xFE).contains(&data[i + 1]) {
                return None;
            }
            signal += 2;
            i += 2;
            continue;
        }
        return None;
    }
    Some(signal)
}

pub(crate) fn validate_big5(data: &[u8]) -> Option<u64> {
    let mut i = 0;
    let mut signal: u64 = 0;
    let n = data.len();
    while i < n {
        let byte = data[i];
        if byte <= 0x7F {
            i += 1;
            continue;
        }
        if (0x81..=0xFE).contains(&byte) {
            if i + 1 >= n {
                return None;
            }
            let trail = data[i + 1];
            if !((0x40..=0x7E).contains(&trail) || (0xA1..=0xFE).contains(&trail)) {
                return None;
            }
            signal += 2;
            i += 2;
            continue;
        }
        return None;
    }
    Some(signal)
}

// Score decoded text: printable density plus CJK weight, with a kana bonus
// for the Japanese encodings and a kana penalty (plus pure-CJK bonus) for
// Big5.
fn multibyte_text_score(decoded: &str, encoding: &str) -> f64 {
    if decoded.is_empty() {
        return -10.0;
    }

    let mut kana: u64 = 0;
    let mut cjk: u64 = 0;
    let mut printable: u64 = 0;
    let mut length: u64 = 0;
    for character in decoded.chars() {
        length += 1;
        if is_kana(character) {
            kana += 1;
        }
        if is_cjk_ideograph(character) {
            cjk += 1;
        }
        if is_text_printable(character) {
            printable += 1;
        }
    }

    let length = length.max(1) as f64;
    let printable_ratio = printable as f64 / length;
    let kana_ratio = kana as f64 / length;
    let cjk_ratio = cjk as f64 / length;

    let mut score = printable_ratio + cjk_ratio * 0.8;
    match encoding {
        "shift_jis" | "euc_jp" => score += kana_ratio,
        "big5" => {
            if kana_ratio == 0.0 && cjk_ratio >= 0.5 {
                score += 0.25;
            }
            score -= kana_ratio * 1.2;
        }
        _ => {}
    }
    score
}

impl EncodingProbe for MultiByteProbe {
    fn name(&self) -> &'static str {
        "multi-byte"
    }

    #[allow(clippy::float_cmp)]
    fn probe(&self, data: &[u8], feedback: &FeedbackBus) -> Option<Candidate> {
        // (encoding, score, signal ratio, signal)
        let mut best: Option<(&'static str, f64, f64, u64)> = None;

        for &(encoding, codec, validator) in CHECKS.iter() {
            let signal = match validator(data) {
                Some(signal) => signal,
                None => {
                    feedback.debug(
                        "multi-byte:reject",
                        "Multi-byte candidate rejected",
                        context! { "encoding" => encoding },
                    );
                    continue;
                }
            };
            let decoded = match strict_decode(data, codec) {
                Some(decoded) => decoded,
                None => {
                    feedback.debug(
                        "multi-byte:decode-error",
                        "Multi-byte decode failed",
                        context! { "encoding" => encoding },
                    );
                    continue;
                }
            };

            let ratio = signal as f64 / data.len().max(1) as f64;
            let score = multibyte_text_score(&decoded, encoding) + ratio * 0.5;
            let better = match best {
                None => true,
                Some((_, best_score, best_ratio, _)) => {
                    score > best_score || (score == best_score && ratio > best_ratio)
                }
            };
            if better {
                best = Some((encoding, score, ratio, signal));
            }
        }

        let (encoding, _, _, signal) = match best {
            Some(best) => best,
            None => {
                feedback.debug(
                    "multi-byte:none",
                    "No valid multi-byte candidate",
                    context! { "size" => data.len() },
                );
                return None;
            }
        };

        let confidence = laplace_confidence(signal, 0).clamp(0.55, 0.95);
        feedback.debug(
            "multi-byte:select",
            "Multi-byte candidate selected",
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
