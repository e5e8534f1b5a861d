use super::models::RankedCandidate;


/// Splits ranked candidates into those scoring at least `trust_threshold` and
/// the rest, preserving order in both halves.
pub fn partition(
    candidates: Vec<RankedCandidate>,
    trust_threshold: u8,
) -> (Vec<RankedCandidate>, Vec<RankedCandidate>) {
    candidates
        .into_iter()
        .partition(|c| c.score >= trust_threshold)
}
