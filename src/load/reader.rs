use crate::config::InputConfig;
use crate::error::{EtlError, Result, ValidationError};
use crate::types::RawRecord;
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A row the reader could not turn into a [`RawRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadRow {
    pub row: usize,
    pub error: ValidationError,
}

/// Result of reading one row: a record or a row-level rejection.
pub type RowRead = std::result::Result<RawRecord, BadRow>;

/// Single-pass, lazy iterator over the data rows of one delimited file.
///
/// Rows the CSV reader cannot decode come back as [`BadRow`]; an I/O failure
/// while reading ends the iteration with [`EtlError::FileRead`].
pub struct RowReader {
    path: PathBuf,
    records: StringRecordsIntoIter<File>,
    columns: Vec<String>,
    // Headerless files must match the schema width exactly
    exact_width: bool,
    row: usize,
    failed: bool,
}

impl RowReader {
    /// Open `path`. With `has_headers` the first line names the columns;
    /// otherwise `columns` gives them in positional order.
    pub fn open(path: &Path, input: &InputConfig, columns: &[String]) -> Result<Self> {
        let open_error = |source: io::Error| EtlError::FileOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_error)?;
        // Directories open fine on unix and only fail on the first read
        if !file.metadata().map_err(open_error)?.is_file() {
            return Err(open_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(input.delimiter_byte())
            .quote(input.quote_byte())
            .has_headers(input.has_headers)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let (columns, exact_width) = if input.has_headers {
            let headers = reader.headers().map_err(|e| read_error(path, e))?;
            let columns: Vec<String> = headers.iter().map(str::to_string).collect();
            let mut seen = HashSet::new();
            for column in &columns {
                if !seen.insert(column.as_str()) {
                    warn!(
                        "Duplicate column [{}] in {}; the first occurrence is used",
                        column,
                        path.display()
                    );
                }
            }
            (columns, false)
        } else {
            (columns.to_vec(), true)
        };

        Ok(Self {
            path: path.to_path_buf(),
            records: reader.into_records(),
            columns,
            exact_width,
            row: 0,
            failed: false,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

// I/O failures become FileRead; other CSV errors keep their own variant
fn read_error(path: &Path, e: csv::Error) -> EtlError {
    if !e.is_io_error() {
        return EtlError::Csv(e);
    }
    let source = match e.into_kind() {
        csv::ErrorKind::Io(source) => source,
        other => io::Error::new(io::ErrorKind::Other, format!("{other:?}")),
    };
    EtlError::FileRead {
        path: path.to_path_buf(),
        source,
    }
}

impl Iterator for RowReader {
    type Item = Result<RowRead>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let record = self.records.next()?;
        self.row += 1;
        let row = self.row;

        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                self.failed = true;
                return Some(Err(read_error(&self.path, e)));
            }
            Err(e) => {
                return Some(Ok(Err(BadRow {
                    row,
                    error: ValidationError::Unreadable { reason: e.to_string() },
                })))
            }
        };

        if self.exact_width && record.len() != self.columns.len() {
            return Some(Ok(Err(BadRow {
                row,
                error: ValidationError::FieldCount {
                    expected: self.columns.len(),
                    found: record.len(),
                },
            })));
        }

        // Short rows simply lack the trailing columns; a repeated column keeps its first value
        let mut values = HashMap::with_capacity(self.columns.len());
        for (column, value) in self.columns.iter().zip(record.iter()) {
            values
                .entry(column.clone())
                .or_insert_with(|| value.to_string());
        }
        Some(Ok(Ok(RawRecord::new(row, values))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn columns() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    fn read_all(path: &Path, input: &InputConfig) -> Vec<RowRead> {
        RowReader::open(path, input, &columns())
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn headerless() -> InputConfig {
        InputConfig {
            has_headers: false,
            ..InputConfig::default()
        }
    }

    #[test]
    fn test_reads_header_file() {
        let file = write_file("a|b|extra\n 1 |\"x|y\"|z\n2|3\n");
        let reader = RowReader::open(file.path(), &InputConfig::default(), &columns()).unwrap();
        assert_eq!(reader.columns(), &["a", "b", "extra"]);

        let rows = reader.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.row(), 1);
        assert_eq!(first.get("a"), Some("1"));
        assert_eq!(first.get("b"), Some("x|y"));
        assert_eq!(first.get("extra"), Some("z"));
        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.get("extra"), None);
    }

    #[test]
    fn test_headerless_rejects_wrong_width() {
        let file = write_file("1|2|3\n1|2\n1|2|3|4\n");
        let rows = read_all(file.path(), &headerless());

        assert_eq!(rows[0].as_ref().unwrap().get("c"), Some("3"));
        assert_eq!(
            rows[1],
            Err(BadRow {
                row: 2,
                error: ValidationError::FieldCount { expected: 3, found: 2 }
            })
        );
        assert!(rows[2].is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = RowReader::open(Path::new("/definitely/not/here.psv"), &InputConfig::default(), &columns());
        assert!(matches!(result, Err(EtlError::FileOpen { .. })));
    }

    #[test]
    fn test_invalid_utf8_row_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a|b|c\n1|2|3\n\xff\xfe|2|3\n4|5|6\n").unwrap();
        let rows = read_all(file.path(), &InputConfig::default());

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(matches!(
            rows[1],
            Err(BadRow { row: 2, error: ValidationError::Unreadable { .. } })
        ));
        assert_eq!(rows[2].as_ref().unwrap().get("a"), Some("4"));
    }

    #[test]
    fn test_directory_is_fatal() {
        let dir = tempdir().unwrap();
        for input in [headerless(), InputConfig::default()] {
            let result = RowReader::open(dir.path(), &input, &columns());
            assert!(matches!(result, Err(EtlError::FileOpen { .. })));
        }
    }

    #[test]
    fn test_duplicate_header_keeps_first_value() {
        let file = write_file("a|b|a\n1|2|3\n");
        let rows = read_all(file.path(), &InputConfig::default());
        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.get("a"), Some("1"));
        assert_eq!(first.get("b"), Some("2"));
        assert_eq!(first.len(), 2);
    }
}
