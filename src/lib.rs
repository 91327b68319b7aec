//! charset-detector-rs
//! ===================
//!
//! Character encoding detector for unknown text buffers. Given an opaque
//! byte sequence it returns a single best-guess encoding name, a confidence
//! score in `[0.0, 1.0]` and two provenance flags: whether a byte-order mark
//! decided the answer and whether a fallback path was taken. Wrong answers
//! are signalled as low confidence rather than hidden — a result with
//! `used_fallback` set never carries more than `0.49` confidence.
//!
//! The pipeline runs a BOM matcher, an ISO-2022-JP escape-sequence probe, a
//! transition-counting UTF-8 DFA, a UTF-16 surrogate-pair validator, three
//! multi-byte CJK validators (Shift-JIS, EUC-JP, Big5) and two Polish-aware
//! single-byte profiles (windows-1250, iso-8859-2), then arbitrates between
//! close candidates over a fixed fallback ranking. Buffers larger than 4 KiB
//! get a prefix pass first and skip the full scan when the prefix answer is
//! already conclusive.
//!
//! # Library
//!
//! * [`detect`] processes raw bytes with a silent feedback bus
//! * [`from_path`] reads a file and feeds it through [`detect`]
//! * [`Detector`] carries an explicit [`feedback::FeedbackBus`] so callers
//!   can subscribe to the structured event stream
//!
//! ## Examples
//!
//! ```rust
//! use charset_detector_rs::detect;
//!
//! let result = detect("Zażółć gęślą jaźń".as_bytes());
//! assert_eq!(result.encoding, "utf-8");
//! assert!(result.confidence >= 0.70);
//! assert!(!result.used_fallback);
//! ```
//!
//! Observing the detection through the feedback bus:
//!
//! ```rust
//! use charset_detector_rs::feedback::FeedbackBus;
//! use charset_detector_rs::Detector;
//! use std::sync::{Arc, Mutex};
//!
//! let bus = FeedbackBus::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! bus.subscribe(move |event| sink.lock().unwrap().push(event.code.clone()));
//!
//! let detector = Detector::new(bus);
//! let result = detector.detect(b"\xEF\xBB\xBFhello");
//! assert_eq!(result.encoding, "utf-8-sig");
//! assert!(result.detected_by_bom);
//! assert!(seen.lock().unwrap().iter().any(|code| code == "detect:final"));
//! ```
//!
//! # CLI tool
//!
//! A `detector` binary ships behind the `cli` feature:
//!
//! ```shell
//! cargo install charset-detector-rs --features cli
//! detector --minimal suspicious.txt
//! ```
use crate::consts::{BINARY_CONTROL_RATIO, EARLY_EXIT_BYTES, EARLY_EXIT_CONFIDENCE};
use crate::dfa::{analyze_utf16_pairs, analyze_utf8, laplace_confidence};
use crate::probes::{
    resolve_candidates, EncodingProbe, EscapeSequenceProbe, MultiByteProbe, SingleByteProbe,
};
use crate::utils::{control_byte_ratio, has_high_bytes, identify_bom, round_float};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub mod consts;
pub mod dfa;
pub mod entity;
pub mod feedback;
pub mod freq;
pub mod probes;
mod tests;
pub mod utils;

pub use crate::entity::{Candidate, DetectionResult};
pub use crate::feedback::{FeedbackBus, FeedbackEvent};

/// Detector with an explicit feedback bus.
///
/// Detection itself is a pure function over bytes: the only shared state is
/// the bus, so one `Detector` may be used from many threads at once.
pub struct Detector {
    feedback: FeedbackBus,
}

impl Default for Detector {
    fn default() -> Self {
        Detector {
            feedback: FeedbackBus::new(),
        }
    }
}

impl Detector {
    pub fn new(feedback: FeedbackBus) -> Self {
        Detector { feedback }
    }

    pub fn feedback(&self) -> &FeedbackBus {
        &self.feedback
    }

    /// Detect the encoding of `data`.
    ///
    /// Buffers above the early-exit prefix length get a prefix pass first;
    /// a sufficiently confident prefix answer short-circuits the full scan.
    /// Exactly one `detect:final` event is emitted per call, whichever path
    /// produced the answer.
    pub fn detect(&self, data: &[u8]) -> DetectionResult {
        let result = if data.len() > EARLY_EXIT_BYTES {
            self.feedback.debug(
                "detect:early-exit-check",
                "Running early-exit precheck",
                context! { "size" => data.len() },
            );
            let prefix_result = self.detect_core(&data[..EARLY_EXIT_BYTES]);
            if prefix_result.confidence > EARLY_EXIT_CONFIDENCE {
                self.feedback.info(
                    "detect:early-exit-hit",
                    "Early-exit triggered",
                    context! {
                        "encoding" => prefix_result.encoding,
                        "confidence" => round_float(prefix_result.confidence, 6),
                        "threshold" => EARLY_EXIT_CONFIDENCE,
                    },
                );
                prefix_result
            } else {
                self.feedback.debug(
                    "detect:early-exit-miss",
                    "Early-exit threshold not reached; analyzing full payload",
                    context! {
                        "confidence" => round_float(prefix_result.confidence, 6),
                        "threshold" => EARLY_EXIT_CONFIDENCE,
                    },
                );
                self.detect_core(data)
            }
        } else {
            self.detect_core(data)
        };

        debug!(
            "Encoding detection: {} (confidence {:.3}, fallback {}).",
            result.encoding, result.confidence, result.used_fallback
        );
        self.feedback.info(
            "detect:final",
            "Detection finished",
            context! {
                "encoding" => result.encoding,
                "confidence" => round_float(result.confidence, 6),
                "used_fallback" => result.used_fallback,
                "detected_by_bom" => result.detected_by_bom,
            },
        );
        result
    }

    /// Same thing as [`Detector::detect`] with one extra step: opening and
    /// reading the given file path in binary mode.
    pub fn from_path(&self, path: &Path) -> Result<DetectionResult, String> {
        let mut file = File::open(path).map_err(|e| format!("Error opening file: {e}"))?;
        let file_size = file.metadata().map(|m| m.len()).unwrap_or_default();

        let mut buffer = Vec::with_capacity(file_size as usize);
        file.read_to_end(&mut buffer)
            .map_err(|e| format!("Error reading from file: {e}"))?;

        Ok(self.detect(&buffer))
    }

    // Core detection pass, no early-exit wrapper. First decisive signal wins.
    fn detect_core(&self, data: &[u8]) -> DetectionResult {
        let feedback = &self.feedback;
        feedback.debug(
            "core:start",
            "Core detection started",
            context! { "size" => data.len() },
        );

        // BOM before anything else; utf-16 marks additionally validate the
        // remaining payload since a stray FF FE prefix proves little.
        if let Some((bom_encoding, mark)) = identify_bom(data) {
            match bom_encoding {
                "utf-16-le" => {
                    return self.bom_utf16(
                        &data[mark.len()..],
                        "utf-16-le",
                        true,
                        "core:bom:utf16le",
                        "core:bom:utf16le-invalid",
                    );
                }
                "utf-16-be" => {
                    return self.bom_utf16(
                        &data[mark.len()..],
                        "utf-16-be",
                        false,
                        "core:bom:utf16be",
                        "core:bom:utf16be-invalid",
                    );
                }
                _ => {
                    feedback.debug(
                        "core:bom",
                        "BOM detected",
                        context! { "encoding" => bom_encoding },
                    );
                    return DetectionResult::new(bom_encoding, 1.0, false, true);
                }
            }
        }

        if data.is_empty() {
            feedback.debug(
                "core:empty",
                "Empty payload, defaulting to utf-8",
                context! {},
            );
            return DetectionResult::new("utf-8", 1.0, false, false);
        }

        if let Some(guess) = EscapeSequenceProbe.probe(data, feedback) {
            feedback.debug(
                "core:escape",
                "Escape-sequence prober selected encoding",
                context! {
                    "encoding" => guess.encoding,
                    "confidence" => round_float(guess.confidence, 6),
                },
            );
            return DetectionResult::new(guess.encoding, guess.confidence, false, false);
        }

        // Binary guard: NUL-heavy and uniformly random buffers pass the byte
        // validators below (controls are valid UTF-8, iso-8859-2 decodes
        // anything), so they are cut off here on raw control density.
        let control_ratio = control_byte_ratio(data);
        if control_ratio > BINARY_CONTROL_RATIO {
            feedback.warning(
                "core:binary-fallback",
                "Control-byte heavy payload, using utf-8 fallback",
                context! { "control_ratio" => round_float(control_ratio, 6) },
            );
            return DetectionResult::new("utf-8", 0.0, true, false);
        }

        let utf8 = analyze_utf8(data);
        if utf8.ok {
            let confidence = laplace_confidence(utf8.valid, utf8.invalid).clamp(0.70, 0.97);
            feedback.debug(
                "core:utf8",
                "UTF-8 DFA validation passed",
                context! { "confidence" => round_float(confidence, 6) },
            );
            return DetectionResult::new("utf-8", confidence, false, false);
        }
        feedback.debug(
            "core:utf8-invalid",
            "UTF-8 DFA validation failed",
            context! {
                "valid_transitions" => utf8.valid,
                "invalid_transitions" => utf8.invalid,
            },
        );

        if has_high_bytes(data) {
            let candidate_probes: [&dyn EncodingProbe; 2] = [&MultiByteProbe, &SingleByteProbe];
            let candidates: Vec<Candidate> = candidate_probes
                .iter()
                .filter_map(|probe| probe.probe(data, feedback))
                .collect();

            return match resolve_candidates(&candidates, feedback) {
                Some(selected) => {
                    feedback.debug(
                        "core:candidate-selected",
                        "Candidate selected by probers/fallback map",
                        context! {
                            "encoding" => selected.encoding,
                            "confidence" => round_float(selected.confidence, 6),
                            "candidate_count" => candidates.len(),
                        },
                    );
                    DetectionResult::new(selected.encoding, selected.confidence, false, false)
                }
                None => {
                    feedback.warning(
                        "core:fallback-empty",
                        "No encoding candidate available, using fallback",
                        context! {},
                    );
                    DetectionResult::new("utf-8", 0.0, true, false)
                }
            };
        }

        feedback.warning(
            "core:binary-fallback",
            "No high-byte signal, using utf-8 fallback",
            context! {},
        );
        DetectionResult::new("utf-8", 0.0, true, false)
    }

    fn bom_utf16(
        &self,
        payload: &[u8],
        encoding: &'static str,
        little_endian: bool,
        code_valid: &str,
        code_invalid: &str,
    ) -> DetectionResult {
        let outcome = analyze_utf16_pairs(payload, little_endian);
        if outcome.ok {
            let confidence = laplace_confidence(outcome.valid, outcome.invalid).max(0.9);
            self.feedback.debug(
                code_valid,
                "UTF-16 BOM detected and validated",
                context! { "confidence" => round_float(confidence, 6) },
            );
            return DetectionResult::new(encoding, confidence, false, true);
        }
        let confidence = laplace_confidence(outcome.valid, outcome.invalid).min(0.49);
        self.feedback.warning(
            code_invalid,
            "UTF-16 BOM detected but payload invalid",
            context! { "confidence" => round_float(confidence, 6) },
        );
        DetectionResult::new(encoding, confidence, true, true)
    }
}

/// Detect the encoding of a raw byte buffer with a silent feedback bus.
pub fn detect(data: &[u8]) -> DetectionResult {
    Detector::default().detect(data)
}

/// Read a file and detect its encoding. Can return Error.
pub fn from_path(path: &Path) -> Result<DetectionResult, String> {
    Detector::default().from_path(path)
}
