use crate::consts::{AMBIGUITY_DELTA, FALLBACK_RANK};
use crate::context;
use crate::entity::Candidate;
use crate::feedback::FeedbackBus;
use crate::utils::round_float;
use ordered_float::OrderedFloat;

mod escape;
mod multi_byte;
mod single_byte;

pub use escape::EscapeSequenceProbe;
pub use multi_byte::MultiByteProbe;
pub use single_byte::SingleByteProbe;

#[cfg(test)]
pub(crate) use multi_byte::{validate_big5, validate_euc_jp, validate_shift_jis};

//
// Probe family
//

/// A probe inspects raw bytes and may nominate a single encoding candidate.
/// Probes never fail: insufficient evidence is `None`, and every decision is
/// narrated on the feedback bus.
pub trait EncodingProbe {
    fn name(&self) -> &'static str;
    fn probe(&self, data: &[u8], feedback: &FeedbackBus) -> Option<Candidate>;
}

// Tie-break rank for a candidate encoding. Unknown names sort last.
pub fn fallback_rank(encoding: &str) -> usize {
    FALLBACK_RANK
        .get(encoding)
        .copied()
        .unwrap_or(FALLBACK_RANK.len())
}

/// Arbitrate between competing candidates. Everything within
/// [`AMBIGUITY_DELTA`] of the best confidence is considered tied; ties break
/// by fallback rank, then by descending confidence, then by name.
pub fn resolve_candidates(candidates: &[Candidate], feedback: &FeedbackBus) -> Option<Candidate> {
    if candidates.is_empty() {
        return None;
    }

    let best_confidence = candidates
        .iter()
        .map(|candidate| OrderedFloat(candidate.confidence))
        .max()?
        .0;
    let mut near_best: Vec<Candidate> = candidates
        .iter()
        .copied()
        .filter(|candidate| best_confidence - candidate.confidence <= AMBIGUITY_DELTA)
        .collect();

    if near_best.len() == 1 {
        let chosen = near_best[0];
        feedback.debug(
            "fallback-map:single",
            "Fallback map accepted top-confidence candidate",
            context! {
                "encoding" => chosen.encoding,
                "confidence" => round_float(chosen.confidence, 6),
            },
        );
        return Some(chosen);
    }

    near_best.sort_by_key(|candidate| {
        (
            fallback_rank(candidate.encoding),
            OrderedFloat(-candidate.confidence),
            candidate.encoding,
        )
    });
    let chosen = near_best[0];
    feedback.debug(
        "fallback-map:tiebreak",
        "Fallback map resolved ambiguous candidates",
        context! {
            "encoding" => chosen.encoding,
            "confidence" => round_float(chosen.confidence, 6),
            "candidates" => near_best.len(),
        },
    );
    Some(chosen)
}
