use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::errors::StrandError;

pub fn is_gzipped(path: &Path) -> bool {
    path.file_name()
        .map(|v| v.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// Open a text file for reading, decompressing it if the name ends with `.gz`
pub fn open_reader(path: impl AsRef<Path>) -> Result<Box<dyn BufRead + Send>, StrandError> {
    let p = path.as_ref();

    let file = File::open(p)
        .map_err(|e| StrandError::FileReadError { source: e })?;

    let reader: Box<dyn BufRead + Send> = if is_gzipped(p) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

/// Read all lines, without line terminators
pub fn read_lines(reader: impl BufRead) -> Result<Vec<String>, StrandError> {
    let lines = reader.lines()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines)
}

/// Read a line-per-sentence file. Empty lines are kept as zero-length sentences.
pub fn load_sentences(path: impl AsRef<Path>) -> Result<Vec<String>, StrandError> {
    read_lines(open_reader(path)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    #[test]
    fn test_read_lines_strips_terminators() {
        let lines = read_lines("one\r\ntwo\n\nthree".as_bytes()).unwrap();
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[test]
    fn test_gzipped_file() {
        let path = std::env::temp_dir().join(format!("strand_lines_test_{}.txt.gz", std::process::id()));

        {
            let file = File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            writeln!(encoder, "Hello.").unwrap();
            writeln!(encoder, "World.").unwrap();
            encoder.finish().unwrap();
        }

        assert!(is_gzipped(&path));
        let lines = load_sentences(&path).unwrap();
        assert_eq!(lines, vec!["Hello.", "World."]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let result = load_sentences("/nonexistent/strand/input.txt");
        assert!(matches!(result, Err(StrandError::FileReadError { .. })));
    }
}
