use super::EncodingProbe;
use crate::context;
use crate::dfa::laplace_confidence;
use crate::entity::Candidate;
use crate::feedback::FeedbackBus;
use crate::utils::round_float;

const ESC: u8 = 0x1B;

/// Recognises ISO-2022-JP shift sequences. Only meaningful on 7-bit data:
/// any byte at or above 0x80 rejects the probe outright.
pub struct EscapeSequenceProbe;

impl EncodingProbe for EscapeSequenceProbe {
    fn name(&self) -> &'static str {
        "escape-sequence"
    }

    fn probe(&self, data: &[u8], feedback: &FeedbackBus) -> Option<Candidate> {
        if !data.contains(&ESC) {
            return None;
        }
        if data.iter().any(|&byte| byte >= 0x80) {
            feedback.debug(
                "escape:reject",
                "Escape sequence rejected by high-byte content",
                context! {},
            );
            return None;
        }

        let mut i = 0;
        let mut hits: u64 = 0;
        let n = data.len();
        while i < n {
            if data[i] != ESC {
                i += 1;
                continue;
            }
            if i + 2 >= n {
                // Truncated shift sequence at end of buffer.
                return None;
            }
            match (data[i + 1], data[i + 2]) {
                // ESC ( B | ESC ( J | ESC ( I
                (0x28, 0x42 | 0x4A | 0x49) => {
                    hits += 1;
                    i += 3;
                }
                // ESC $ @ | ESC $ B
                (0x24, 0x40 | 0x42) => {
                    hits += 1;
                    i += 3;
                }
                // ESC $ ( D, the only 4-byte form.
                (0x24, 0x28) => {
                    if i + 3 >= n || data[i + 3] != 0x44 {
                        return None;
                    }
                    hits += 1;
                    i += 4;
                }
                // ESC & @. Accepted unconditionally, which is looser than
                // ISO-2022-JP-2004 prescribes, but matches real-world files.
                (0x26, 0x40) => {
                    hits += 1;
                    i += 3;
                }
                _ => return None,
            }
        }

        if hits == 0 {
            return None;
        }
        let confidence = laplace_confidence(hits, 0).clamp(0.80, 0.99);
        feedback.debug(
            "escape:select",
            "Escape-sequence encoding selected",
            context! {
                "encoding" => "iso-2022-jp",
                "confidence" => round_float(confidence, 6),
                "hits" => hits,
            },
        );
        Some(Candidate {
            encoding: "iso-2022-jp",
            confidence,
        })
    }
}
