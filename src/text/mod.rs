pub mod markup;
pub mod pipeline;
pub mod sentences;

pub use markup::{parse_stream, StrandAligner, StrandFeatures, StreamAlignment, TagChunk};
pub use pipeline::{Bitext, BitextExtractor, BitextPair, ChunkSplitter, PunctuationSplitter, SentenceSplitter};
pub use sentences::{align_sentences, SentenceAlignment, SentencePair};
