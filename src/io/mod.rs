pub mod lines;
pub mod output;

pub use lines::{load_sentences, open_reader, read_lines};
pub use output::{write_bitext_parallel, write_bitext_tsv, write_json, write_parallel, write_sentences_tsv, write_stream_tsv};
