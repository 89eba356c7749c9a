//! Bitext extraction from a pair of linearized documents.
//!
//! The documents are first aligned structurally with the [`StrandAligner`].
//! Every aligned chunk-chunk pair is then split into sentences and sentence
//! aligned with a [`LengthAligner`]. Sentence pairs with identical source and
//! target text are dropped, as they are usually untranslated boilerplate.

use serde::Serialize;
use tracing::{debug, warn};

use crate::aligner::cost_models::{GaussianLengthCost, LengthCostModel};
use crate::aligner::length::LengthAligner;
use crate::errors::StrandError;
use crate::text::markup::{StrandAligner, TagChunk};
use crate::text::sentences::{align_sentences, sentence_lengths};

/// Splits a text chunk into sentences
pub trait SentenceSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Breaks after sentence-final punctuation (`.`, `!`, `?` and their CJK
/// full-width forms) that is followed by whitespace or the end of the text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PunctuationSplitter;

impl SentenceSplitter for PunctuationSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        let mut chars = text.char_indices().peekable();
        while let Some((ix, c)) = chars.next() {
            let full_width = matches!(c, '。' | '！' | '？');
            if !matches!(c, '.' | '!' | '?') && !full_width {
                continue;
            }

            let end = ix + c.len_utf8();
            let at_boundary = match chars.peek() {
                None => true,
                Some((_, next)) => next.is_whitespace() || full_width,
            };

            if at_boundary {
                sentences.push(&text[start..end]);
                start = end;
            }
        }

        sentences.push(&text[start..]);
        sentences.retain(|s| !s.trim().is_empty());

        sentences.into_iter()
            .map(str::trim)
            .collect()
    }
}

/// Treats the whole chunk as a single sentence
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkSplitter;

impl SentenceSplitter for ChunkSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let text = text.trim();
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text]
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BitextPair {
    /// Position of the source chunk in the source stream
    pub source_pos: usize,

    /// Position of the target chunk in the target stream
    pub target_pos: usize,

    pub source: String,
    pub target: String,

    /// Log-probability of the sentence bead, `None` when chunks are paired
    /// without sentence alignment
    pub score: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Bitext {
    /// Structural difference of the two documents, see [`StrandFeatures`](crate::text::markup::StrandFeatures)
    pub difference_percentage: f64,
    pub pairs: Vec<BitextPair>,
}

impl Bitext {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub struct BitextExtractor<S = PunctuationSplitter, C = GaussianLengthCost> {
    strand: StrandAligner,
    sentence_aligner: Option<LengthAligner<C>>,
    splitter: S,
}

impl BitextExtractor<PunctuationSplitter, GaussianLengthCost> {
    /// Default STRAND aligner, Gale & Church sentence alignment and
    /// punctuation based sentence splitting
    pub fn new() -> Self {
        Self::with_aligners(StrandAligner::new(), Some(LengthAligner::gale_church()), PunctuationSplitter)
    }
}

impl Default for BitextExtractor<PunctuationSplitter, GaussianLengthCost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> BitextExtractor<S, C>
where
    S: SentenceSplitter,
    C: LengthCostModel,
{
    /// Without a sentence aligner, aligned chunks are emitted as they are.
    pub fn with_aligners(strand: StrandAligner, sentence_aligner: Option<LengthAligner<C>>, splitter: S) -> Self {
        Self { strand, sentence_aligner, splitter }
    }

    pub fn extract(&self, source: &[TagChunk], target: &[TagChunk]) -> Result<Bitext, StrandError> {
        let aln = match self.strand.align(source, target) {
            Ok(aln) => aln,
            Err(StrandError::MatrixTooLarge { rows, cols }) => {
                warn!("Skipping document pair, structural alignment of {rows} x {cols} items is too large");
                return Ok(Bitext::default());
            },
            Err(e) => return Err(e),
        };

        let mut pairs = Vec::new();
        let (mut source_pos, mut target_pos) = (0, 0);
        for (s, t) in &aln.pairs {
            if let (Some(s_text), Some(t_text)) = (s.and_then(TagChunk::chunk_text), t.and_then(TagChunk::chunk_text)) {
                self.extract_chunk_pair(source_pos, target_pos, s_text, t_text, &mut pairs)?;
            }

            source_pos += usize::from(s.is_some());
            target_pos += usize::from(t.is_some());
        }

        debug!("Extracted {} pairs from {} aligned items", pairs.len(), aln.pairs.len());

        Ok(Bitext {
            difference_percentage: aln.features.difference_percentage,
            pairs,
        })
    }

    fn extract_chunk_pair(
        &self,
        source_pos: usize,
        target_pos: usize,
        source: &str,
        target: &str,
        pairs: &mut Vec<BitextPair>,
    ) -> Result<(), StrandError> {
        let Some(aligner) = &self.sentence_aligner else {
            pairs.push(BitextPair {
                source_pos,
                target_pos,
                source: source.to_string(),
                target: target.to_string(),
                score: None,
            });

            return Ok(());
        };

        let source_sentences = self.splitter.split(source);
        let target_sentences = self.splitter.split(target);

        let aln = match align_sentences(aligner, &source_sentences, &target_sentences) {
            Ok(aln) => aln,
            Err(StrandError::MatrixTooLarge { rows, cols }) => {
                warn!("Skipping chunk pair ({source_pos}, {target_pos}), {rows} x {cols} sentences is too large");
                return Ok(());
            },
            Err(e) => return Err(e),
        };

        let source_lengths = sentence_lengths(&source_sentences);
        let target_lengths = sentence_lengths(&target_sentences);

        for pair in aln.pairs {
            if pair.source == pair.target {
                continue;
            }

            pairs.push(BitextPair {
                source_pos,
                target_pos,
                score: aligner.bead_score(&pair.bead, &source_lengths, &target_lengths),
                source: pair.source,
                target: pair.target,
            });
        }

        Ok(())
    }
}
