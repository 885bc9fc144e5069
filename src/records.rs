//! Record input for the command-line tool
//!
//! A source holds one JSON document, a JSON array of documents, or JSON lines.
//! Each record is labeled with where it came from so results can point back
//! at it.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::Result;
use crate::validator::{Record, RecordResult};

/// Records read from one source plus the entries that could not be parsed
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<Record>,
    /// Unreadable entries, each with the number of records read before it
    pub errors: Vec<(usize, RecordResult)>,
}

impl ParsedRecords {
    pub fn extend(&mut self, other: ParsedRecords) {
        let offset = self.records.len();
        self.records.extend(other.records);
        self.errors.extend(
            other
                .errors
                .into_iter()
                .map(|(position, error)| (position + offset, error)),
        );
    }
}

/// Read and split the records in `path`
pub fn read_file(path: &Path) -> Result<ParsedRecords> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_records(&path.display().to_string(), &content))
}

/// Read and split the records on standard input
pub fn read_stdin() -> Result<ParsedRecords> {
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(parse_records("<stdin>", &content))
}

/// Split `content` into records labeled after `label`
pub fn parse_records(label: &str, content: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(documents)) => {
            parsed.records = documents
                .into_iter()
                .enumerate()
                .map(|(index, document)| Record::new(format!("{label}[{index}]"), document))
                .collect();
        }
        Ok(document) => parsed.records.push(Record::new(label, document)),
        Err(_) => {
            for (number, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let source = format!("{label}:{}", number + 1);
                match serde_json::from_str(line) {
                    Ok(document) => parsed.records.push(Record::new(source, document)),
                    Err(e) => parsed.errors.push((
                        parsed.records.len(),
                        RecordResult::error(source, e.to_string()),
                    )),
                }
            }
        }
    }

    parsed
}
