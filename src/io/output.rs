//! Writers for alignment results

use std::io::Write;

use serde::Serialize;

use crate::errors::StrandError;
use crate::text::markup::StreamAlignment;
use crate::text::pipeline::Bitext;
use crate::text::sentences::SentenceAlignment;

fn tsv_field(text: &str) -> String {
    text.replace(['\t', '\n'], " ")
}

/// One line per bead: source range, target range, source text, target text
pub fn write_sentences_tsv<W: Write>(mut writer: W, aln: &SentenceAlignment) -> Result<(), StrandError> {
    writeln!(writer, "# score\t{}", aln.score)?;

    for pair in &aln.pairs {
        writeln!(
            writer,
            "{}-{}\t{}-{}\t{}\t{}",
            pair.bead.source.start,
            pair.bead.source.end,
            pair.bead.target.start,
            pair.bead.target.end,
            tsv_field(&pair.source),
            tsv_field(&pair.target),
        )?;
    }

    Ok(())
}

/// Two parallel files with one bead per line, the format used to build
/// parallel corpora
pub fn write_parallel<S, T>(mut source_out: S, mut target_out: T, aln: &SentenceAlignment) -> Result<(), StrandError>
where
    S: Write,
    T: Write,
{
    for pair in &aln.pairs {
        writeln!(source_out, "{}", pair.source)?;
        writeln!(target_out, "{}", pair.target)?;
    }

    Ok(())
}

/// One line per aligned item pair, `-` marking a gap, followed by the
/// document features
pub fn write_stream_tsv<W: Write>(mut writer: W, aln: &StreamAlignment) -> Result<(), StrandError> {
    let features = &aln.features;
    writeln!(writer, "# difference_percentage\t{}", features.difference_percentage)?;
    writeln!(writer, "# chunk_length_correlation\t{}", features.chunk_length_correlation)?;
    writeln!(writer, "# aligned_chunks\t{}", features.aligned_chunks)?;

    for (source, target) in &aln.pairs {
        let source = source.map_or("-".to_string(), |v| tsv_field(&v.to_string()));
        let target = target.map_or("-".to_string(), |v| tsv_field(&v.to_string()));
        writeln!(writer, "{source}\t{target}")?;
    }

    Ok(())
}

/// Extracted bitext: the difference percentage, then one line per pair with
/// chunk positions, texts and bead score (`-` when not sentence aligned)
pub fn write_bitext_tsv<W: Write>(mut writer: W, bitext: &Bitext) -> Result<(), StrandError> {
    writeln!(writer, "# difference_percentage\t{}", bitext.difference_percentage)?;

    for pair in &bitext.pairs {
        let score = pair.score.map_or("-".to_string(), |v| v.to_string());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{score}",
            pair.source_pos,
            tsv_field(&pair.source),
            pair.target_pos,
            tsv_field(&pair.target),
        )?;
    }

    Ok(())
}

/// Source and target sides of extracted bitext, one pair per line
pub fn write_bitext_parallel<S, T>(mut source_out: S, mut target_out: T, bitext: &Bitext) -> Result<(), StrandError>
where
    S: Write,
    T: Write,
{
    for pair in &bitext.pairs {
        writeln!(source_out, "{}", tsv_field(&pair.source))?;
        writeln!(target_out, "{}", tsv_field(&pair.target))?;
    }

    Ok(())
}

pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<(), StrandError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;

    Ok(())
}
