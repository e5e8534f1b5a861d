use tracing::{debug, warn};

use super::models::RankedCandidate;
use super::vector::cosine_similarity;
use super::MAX_CANDIDATES;
use crate::core::error::Result;
use crate::knowledge::models::KnowledgeEntry;


/// Scores every embedded entry against the message embedding and returns at
/// most [`MAX_CANDIDATES`] distinct candidates, best first.
///
/// Entries without an embedding are skipped; a stored-but-corrupt embedding
/// fails the whole call with `MalformedEmbedding`.
pub fn rate_by_embedding(entries: &[KnowledgeEntry], message_embedding: &[f32]) -> Result<Vec<RankedCandidate>> {
    let mut scored = Vec::with_capacity(entries.len());
    let mut unembedded = 0usize;

    for entry in entries {
        let Some(embedding) = entry.decode_embedding()? else {
            unembedded += 1;
            continue;
        };

        let similarity = cosine_similarity(&embedding, message_embedding)?;
        if similarity.is_nan() {
            warn!(
                "Skipping zero-vector embedding of '{}'",
                crate::preview(&entry.example_question, crate::LOG_PREVIEW_CHARS)
            );
            continue;
        }

        scored.push(RankedCandidate::from_entry(entry, to_score(similarity)));
    }

    // stable: equal scores keep input order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut ranked: Vec<RankedCandidate> = Vec::with_capacity(MAX_CANDIDATES);
    for candidate in scored {
        if ranked.len() == MAX_CANDIDATES {
            break;
        }
        let duplicate = ranked
            .iter()
            .any(|r| r.score == candidate.score && r.answer_text == candidate.answer_text);
        if !duplicate {
            ranked.push(candidate);
        }
    }

    debug!(
        "Ranked {} entries ({} without embedding) -> {} candidates, top score {:?}",
        entries.len(),
        unembedded,
        ranked.len(),
        ranked.first().map(|c| c.score)
    );
    Ok(ranked)
}


fn to_score(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}
