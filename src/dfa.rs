//
// Transition-counting validators
//

/// Outcome of a byte-level validation pass: overall verdict plus the number
/// of valid and invalid transitions the automaton took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaOutcome {
    pub ok: bool,
    pub valid: u64,
    pub invalid: u64,
}

impl DfaOutcome {
    fn accepted(valid: u64, invalid: u64) -> Self {
        DfaOutcome {
            ok: true,
            valid,
            invalid,
        }
    }
    fn rejected(valid: u64, invalid: u64) -> Self {
        DfaOutcome {
            ok: false,
            valid,
            invalid,
        }
    }
}

// Laplace-smoothed Bernoulli estimate over valid/invalid transitions.
pub fn laplace_confidence(valid: u64, invalid: u64) -> f64 {
    (valid as f64 + 1.0) / (valid as f64 + invalid as f64 + 2.0)
}

// Validate UTF-8 with a per-byte state machine. The first continuation byte
// of a sequence carries a narrowed range so overlongs, surrogates and
// code points above U+10FFFF are rejected at the byte level.
pub fn analyze_utf8(data: &[u8]) -> DfaOutcome {
    let mut remaining: u8 = 0;
    let mut first_continuation = false;
    let mut first_min: u8 = 0x80;
    let mut first_max: u8 = 0xBF;
    let mut valid: u64 = 0;
    let mut invalid: u64 = 0;

    for &byte in data {
        if remaining == 0 {
            if byte <= 0x7F {
                valid += 1;
                continue;
            }
            let lead = match byte {
                0xC2..=0xDF => Some((1, 0x80, 0xBF)),
                0xE0 => Some((2, 0xA0, 0xBF)),
                0xE1..=0xEC | 0xEE..=0xEF => Some((2, 0x80, 0xBF)),
                0xED => Some((2, 0x80, 0x9F)),
                0xF0 => Some((3, 0x90, 0xBF)),
                0xF1..=0xF3 => Some((3, 0x80, 0xBF)),
                0xF4 => Some((3, 0x80, 0x8F)),
                _ => None,
            };
            match lead {
                Some((count, low, high)) => {
                    remaining = count;
                    first_continuation = true;
                    first_min = low;
                    first_max = high;
                    valid += 1;
                }
                None => {
                    invalid += 1;
                    return DfaOutcome::rejected(valid, invalid);
                }
            }
            continue;
        }

        if first_continuation {
            if !(first_min..=first_max).contains(&byte) {
                invalid += 1;
                return DfaOutcome::rejected(valid, invalid);
            }
            first_continuation = false;
            remaining -= 1;
            valid += 1;
            continue;
        }

        if !(0x80..=0xBF).contains(&byte) {
            invalid += 1;
            return DfaOutcome::rejected(valid, invalid);
        }
        remaining -= 1;
        valid += 1;
    }

    if remaining != 0 {
        // Truncated trailer at end of buffer counts as one invalid transition.
        invalid += 1;
        return DfaOutcome::rejected(valid, invalid);
    }
    DfaOutcome::accepted(valid, invalid)
}

// Validate UTF-16 surrogate pairing for either endianness. A high surrogate
// must be followed by a low surrogate; odd-length buffers are invalid.
pub fn analyze_utf16_pairs(data: &[u8], little_endian: bool) -> DfaOutcome {
    if data.len() % 2 != 0 {
        return DfaOutcome::rejected(0, 1);
    }

    let mut expect_low = false;
    let mut valid: u64 = 0;
    let mut invalid: u64 = 0;
    for pair in data.chunks_exact(2) {
        let unit = if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        };

        if (0xD800..=0xDBFF).contains(&unit) {
            if expect_low {
                invalid += 1;
                return DfaOutcome::rejected(valid, invalid);
            }
            expect_low = true;
            valid += 1;
            continue;
        }

        if (0xDC00..=0xDFFF).contains(&unit) {
            if !expect_low {
                invalid += 1;
                return DfaOutcome::rejected(valid, invalid);
            }
            expect_low = false;
            valid += 1;
            continue;
        }

        if expect_low {
            invalid += 1;
            return DfaOutcome::rejected(valid, invalid);
        }
        valid += 1;
    }

    if expect_low {
        invalid += 1;
        return DfaOutcome::rejected(valid, invalid);
    }
    DfaOutcome::accepted(valid, invalid)
}
