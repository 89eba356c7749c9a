use itertools::Itertools;
use serde::Serialize;

use crate::aligner::alignment::AlignmentBead;
use crate::aligner::cost_models::LengthCostModel;
use crate::aligner::length::LengthAligner;
use crate::errors::StrandError;

/// The text of one bead: consecutive sentences on each side, joined by a space
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SentencePair {
    pub bead: AlignmentBead,
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SentenceAlignment {
    pub score: f64,
    pub pairs: Vec<SentencePair>,
}

/// Sentence lengths in characters
pub fn sentence_lengths<S: AsRef<str>>(sentences: &[S]) -> Vec<usize> {
    sentences.iter()
        .map(|s| s.as_ref().chars().count())
        .collect()
}

pub fn align_sentences<S, C>(
    aligner: &LengthAligner<C>,
    source: &[S],
    target: &[S],
) -> Result<SentenceAlignment, StrandError>
where
    S: AsRef<str>,
    C: LengthCostModel,
{
    let result = aligner.align(&sentence_lengths(source), &sentence_lengths(target))?;

    let pairs = result.beads.into_iter()
        .map(|bead| SentencePair {
            source: source[bead.source.clone()].iter().map(AsRef::as_ref).join(" "),
            target: target[bead.target.clone()].iter().map(AsRef::as_ref).join(" "),
            bead,
        })
        .collect();

    Ok(SentenceAlignment { score: result.score, pairs })
}
