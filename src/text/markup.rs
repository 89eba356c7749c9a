//! Structural alignment of linearized markup documents, as in STRAND
//! (Resnik & Smith, 2003).
//!
//! A document is linearized into a stream of start tags, end tags and text
//! chunks, one per line: `[START:p]`, `[END:p]`, or the chunk text itself.
//! Both streams are mapped to integer tokens with a shared tag dictionary and
//! aligned with the [`GridAligner`]. Text chunks all map to the same token, so
//! the alignment is driven by the markup structure.

use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::aligner::grid::GridAligner;
use crate::aligner::utils::print_alignment;
use crate::errors::StrandError;

/// Token for any text chunk
pub const CHUNK_TOKEN: u32 = 1;

/// Start tag with id `k` is encoded as `START_TAG_BASE + k`
pub const START_TAG_BASE: u32 = 2;

/// End tag with id `k` is encoded as `END_TAG_BASE + k`
pub const END_TAG_BASE: u32 = 65536;

/// Start and end tag token ranges may not overlap
pub const MAX_TAGS: usize = (END_TAG_BASE - START_TAG_BASE) as usize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TagChunk {
    Start(String),
    End(String),
    Chunk(String),
}

impl TagChunk {
    /// Parse one line of a linearized document. Returns `None` for blank lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let tag = line.strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .and_then(|v| v.split_once(':'))
            .filter(|(_, name)| !name.is_empty() && !name.contains(']'));

        Some(match tag {
            Some(("START", name)) => Self::Start(name.to_string()),
            Some(("END", name)) => Self::End(name.to_string()),
            _ => Self::Chunk(line.to_string()),
        })
    }

    pub fn is_chunk(&self) -> bool {
        matches!(self, Self::Chunk(_))
    }

    pub fn chunk_text(&self) -> Option<&str> {
        match self {
            Self::Chunk(text) => Some(text),
            _ => None,
        }
    }

    /// Length of the chunk text in characters, `None` for tags
    pub fn chunk_len(&self) -> Option<usize> {
        match self {
            Self::Chunk(text) => Some(text.chars().count()),
            _ => None,
        }
    }
}

impl Display for TagChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start(tag) => write!(f, "[START:{tag}]"),
            Self::End(tag) => write!(f, "[END:{tag}]"),
            Self::Chunk(text) => write!(f, "[CHUNK:{text}]"),
        }
    }
}

pub fn parse_stream<I, S>(lines: I) -> Vec<TagChunk>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter()
        .filter_map(|line| TagChunk::parse_line(line.as_ref()))
        .collect()
}

/// Maps tag/chunk items to tokens, assigning tag ids in order of first appearance
#[derive(Debug, Default)]
pub struct TagEncoder {
    tag_ids: FxHashMap<String, u32>,
}

impl TagEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn tag_id(&mut self, tag: &str) -> Result<u32, StrandError> {
        if let Some(id) = self.tag_ids.get(tag) {
            return Ok(*id);
        }

        if self.tag_ids.len() >= MAX_TAGS {
            return Err(StrandError::TooManyTags(self.tag_ids.len() + 1));
        }

        let id = self.tag_ids.len() as u32;
        self.tag_ids.insert(tag.to_string(), id);

        Ok(id)
    }

    pub fn encode(&mut self, item: &TagChunk) -> Result<u32, StrandError> {
        Ok(match item {
            TagChunk::Start(tag) => START_TAG_BASE + self.tag_id(tag)?,
            TagChunk::End(tag) => END_TAG_BASE + self.tag_id(tag)?,
            TagChunk::Chunk(_) => CHUNK_TOKEN,
        })
    }

    pub fn encode_stream(&mut self, items: &[TagChunk]) -> Result<Vec<u32>, StrandError> {
        items.iter()
            .map(|item| self.encode(item))
            .collect()
    }

    pub fn num_tags(&self) -> usize {
        self.tag_ids.len()
    }
}

/// Features describing how well two documents' structures correspond
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StrandFeatures {
    /// Alignment cost divided by the total number of items in both streams
    pub difference_percentage: f64,

    /// Pearson correlation of the lengths of aligned chunk pairs
    pub chunk_length_correlation: f64,

    /// Number of aligned chunk pairs
    pub aligned_chunks: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StreamAlignment<'a> {
    pub pairs: Vec<(Option<&'a TagChunk>, Option<&'a TagChunk>)>,
    pub features: StrandFeatures,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StrandAligner {
    aligner: GridAligner,
}

impl StrandAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to align streams whose DP grid would exceed `max_cells` cells
    pub fn with_max_cells(max_cells: usize) -> Self {
        Self { aligner: GridAligner::new().with_max_cells(max_cells) }
    }

    pub fn align<'a>(&self, source: &'a [TagChunk], target: &'a [TagChunk]) -> Result<StreamAlignment<'a>, StrandError> {
        if source.is_empty() || target.is_empty() {
            warn!("One or more of the input streams are empty");
            return Ok(StreamAlignment::default());
        }

        let mut encoder = TagEncoder::new();
        let source_tokens = encoder.encode_stream(source)?;
        let target_tokens = encoder.encode_stream(target)?;
        debug!("Encoded streams with {} distinct tags", encoder.num_tags());

        let result = self.aligner.align(&source_tokens, &target_tokens)?;
        trace!("Token alignment:\n{}", print_alignment(&source_tokens, &target_tokens, &result.alignment));

        let pairs: Vec<_> = result.alignment.iter()
            .map(|p| (p.source.map(|s| &source[s]), p.target.map(|t| &target[t])))
            .collect();

        let chunk_lengths: Vec<(f64, f64)> = pairs.iter()
            .filter_map(|(s, t)| {
                let s_len = s.and_then(TagChunk::chunk_len)?;
                let t_len = t.and_then(TagChunk::chunk_len)?;
                Some((s_len as f64, t_len as f64))
            })
            .collect();

        let features = StrandFeatures {
            difference_percentage: -(result.score as f64) / (source.len() + target.len()) as f64,
            chunk_length_correlation: pearson_correlation(&chunk_lengths),
            aligned_chunks: chunk_lengths.len(),
        };

        Ok(StreamAlignment { pairs, features })
    }
}

/// Pearson's r, or 0.0 if it is undefined (fewer than two points, or no
/// variance on either side)
pub fn pearson_correlation(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in points {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    cov / (var_x.sqrt() * var_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(lines: &[&str]) -> Vec<TagChunk> {
        parse_stream(lines)
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(TagChunk::parse_line("[START:p]"), Some(TagChunk::Start("p".to_string())));
        assert_eq!(TagChunk::parse_line("  [END:table]\n"), Some(TagChunk::End("table".to_string())));
        assert_eq!(TagChunk::parse_line("Hello world"), Some(TagChunk::Chunk("Hello world".to_string())));
        assert_eq!(TagChunk::parse_line("   "), None);

        // Not valid tags, kept as text
        assert_eq!(TagChunk::parse_line("[MIDDLE:p]"), Some(TagChunk::Chunk("[MIDDLE:p]".to_string())));
        assert_eq!(TagChunk::parse_line("[START:]"), Some(TagChunk::Chunk("[START:]".to_string())));
        assert_eq!(TagChunk::parse_line("[START:a]b]"), Some(TagChunk::Chunk("[START:a]b]".to_string())));
    }

    #[test]
    fn test_display() {
        assert_eq!(TagChunk::Start("p".to_string()).to_string(), "[START:p]");
        assert_eq!(TagChunk::Chunk("hi".to_string()).to_string(), "[CHUNK:hi]");
    }

    #[test]
    fn test_encoding_shares_dictionary() {
        let source = stream(&["[START:html]", "[START:p]", "text", "[END:p]", "[END:html]"]);
        let target = stream(&["[START:p]", "[START:b]", "texte", "[END:b]", "[END:p]"]);

        let mut encoder = TagEncoder::new();
        let s = encoder.encode_stream(&source).unwrap();
        let t = encoder.encode_stream(&target).unwrap();

        assert_eq!(s, vec![2, 3, 1, 65537, 65536]);
        assert_eq!(t, vec![3, 4, 1, 65538, 65537]);
        assert_eq!(encoder.num_tags(), 3);
    }

    #[test]
    fn test_too_many_tags() {
        let mut encoder = TagEncoder::new();
        for i in 0..MAX_TAGS {
            encoder.encode(&TagChunk::Start(format!("t{i}"))).unwrap();
        }

        assert_eq!(encoder.encode(&TagChunk::End("t0".to_string())).unwrap(), END_TAG_BASE);
        assert!(matches!(encoder.encode(&TagChunk::Start("one_more".to_string())), Err(StrandError::TooManyTags(_))));
    }

    #[test]
    fn test_align_streams() {
        let source = stream(&["[START:p]", "The quick brown fox.", "[END:p]", "[START:p]", "Jumps.", "[END:p]"]);
        let target = stream(&["[START:p]", "Le renard brun rapide.", "[END:p]", "[START:img]", "[START:p]", "Saute.", "[END:p]"]);

        let result = StrandAligner::new().align(&source, &target).unwrap();

        // Only the image tag is unmatched
        assert_eq!(result.pairs.len(), 7);
        assert_eq!(result.pairs.iter().filter(|(s, t)| s.is_none() && t.is_some()).count(), 1);
        assert_eq!(result.pairs[3], (None, Some(&target[3])));
        assert_eq!(result.features.aligned_chunks, 2);
        assert!((result.features.difference_percentage - 1.0 / 13.0).abs() < 1e-12);
        assert!((result.features.chunk_length_correlation - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cell_limit() {
        let source = stream(&["[START:p]", "Hello.", "[END:p]"]);
        let target = stream(&["[START:p]", "Bonjour.", "[END:p]"]);

        assert!(StrandAligner::with_max_cells(16).align(&source, &target).is_ok());

        let result = StrandAligner::with_max_cells(15).align(&source, &target);
        assert!(matches!(result, Err(StrandError::MatrixTooLarge { rows: 3, cols: 3 })));
    }

    #[test]
    fn test_empty_stream() {
        let source = stream(&["[START:p]"]);
        let result = StrandAligner::new().align(&source, &[]).unwrap();
        assert!(result.pairs.is_empty());
        assert_eq!(result.features, StrandFeatures::default());
    }

    #[test]
    fn test_pearson() {
        assert_eq!(pearson_correlation(&[(1.0, 2.0)]), 0.0);
        assert_eq!(pearson_correlation(&[(1.0, 2.0), (1.0, 5.0)]), 0.0);

        let r = pearson_correlation(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.5)]);
        assert!(r > 0.99 && r <= 1.0);

        let r = pearson_correlation(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]);
        assert!((r + 1.0).abs() < 1e-12);
    }
}
