use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/////////////////////////////////////////////////////////////////////////////////////
// DetectionResult
/////////////////////////////////////////////////////////////////////////////////////

/// Final verdict for one byte buffer.
///
/// `encoding` is always drawn from the closed output alphabet (see
/// `consts::FALLBACK_ORDER`); `confidence` is in `[0.0, 1.0]`. When
/// `used_fallback` is set no probe produced positive evidence and the default
/// was chosen — in that case `confidence` is at most `0.49` and callers
/// should treat the answer with suspicion. `detected_by_bom` marks answers
/// derived from a leading byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionResult {
    pub encoding: &'static str,
    pub confidence: f64,
    pub used_fallback: bool,
    pub detected_by_bom: bool,
}

impl DetectionResult {
    pub(crate) fn new(
        encoding: &'static str,
        confidence: f64,
        used_fallback: bool,
        detected_by_bom: bool,
    ) -> Self {
        DetectionResult {
            encoding,
            confidence,
            used_fallback,
            detected_by_bom,
        }
    }
}

impl Display for DetectionResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.encoding, self.confidence)
    }
}

/////////////////////////////////////////////////////////////////////////////////////
// Candidate
/////////////////////////////////////////////////////////////////////////////////////

/// Transient `(encoding, confidence)` pair produced by a probe, consumed by
/// arbitration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub encoding: &'static str,
    pub confidence: f64,
}
