use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::AavarError;

/// A FASTA record or one line of a plain sequence list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub data: Vec<u8>,
}

/// Read the reference: the first line is a header, every following line is
/// sequence.
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<SequenceRecord, AavarError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(AavarError::EmptyReference(path.to_path_buf())),
    };
    let id = header.trim().trim_start_matches('>').to_string();

    let mut data = Vec::new();
    for line in lines {
        data.extend(line?.trim().bytes());
    }
    if data.is_empty() {
        return Err(AavarError::EmptyReference(path.to_path_buf()));
    }
    Ok(SequenceRecord { id, data })
}

/// Read a multi-record FASTA file. Sequence lines are trimmed and joined;
/// the final record is kept like any other.
pub fn load_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, AavarError> {
    let reader = BufReader::new(File::open(path)?);
    let mut sequences = Vec::new();
    let mut current: Option<SequenceRecord> = None;

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                sequences.push(record);
            }
            current = Some(SequenceRecord {
                id: header.trim().to_string(),
                data: Vec::new(),
            });
        } else if let Some(record) = current.as_mut() {
            record.data.extend(line.trim().bytes());
        }
    }
    if let Some(record) = current {
        sequences.push(record);
    }
    Ok(sequences)
}

/// Read one sequence per non-empty line. Records are named by line number.
pub fn load_lines<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, AavarError> {
    let reader = BufReader::new(File::open(path)?);
    let mut sequences = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        sequences.push(SequenceRecord {
            id: format!("line_{}", n + 1),
            data: trimmed.as_bytes().to_vec(),
        });
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file.as_file_mut().sync_all().unwrap();
        file
    }

    #[test]
    fn test_reference_concatenates_lines() {
        let file = fixture(">wild type spike\nMFVFL\nVLLPL\r\nVSSQ\n");
        let reference = load_reference(file.path()).unwrap();
        assert_eq!(reference.id, "wild type spike");
        assert_eq!(reference.data, b"MFVFLVLLPLVSSQ".to_vec());
    }

    #[test]
    fn test_reference_without_sequence_fails() {
        let file = fixture(">only a header\n");
        assert!(matches!(
            load_reference(file.path()),
            Err(AavarError::EmptyReference(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_sequences("/nonexistent/aavar/input.fasta"),
            Err(AavarError::Io(_))
        ));
    }

    #[test]
    fn test_sequences_keep_last_record() {
        let file = fixture(">a\nACD\nEF\n>b\nGHI\n>c\nKLM");
        let seqs = load_sequences(file.path()).unwrap();
        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[0].data, b"ACDEF".to_vec());
        assert_eq!(seqs[2].id, "c");
        assert_eq!(seqs[2].data, b"KLM".to_vec());
    }

    #[test]
    fn test_sequences_windows_newlines() {
        let file = fixture(">id\r\nACGT\r\nWY\r\n");
        let seqs = load_sequences(file.path()).unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].data, b"ACGTWY".to_vec());
    }

    #[test]
    fn test_lines_skip_blank() {
        let file = fixture("NLDSK\n\nVGGNY  \n");
        let seqs = load_lines(file.path()).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[1].data, b"VGGNY".to_vec());
        assert_eq!(seqs[1].id, "line_3");
    }
}
