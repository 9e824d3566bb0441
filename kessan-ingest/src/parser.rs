//! Format parser: raw export bytes to a lazy sequence of [`RawRow`]s.
//!
//! Header problems fail the file; anything wrong with a single record is
//! yielded as a [`RowFailure`] and reading continues.

use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};
use kessan_core::{Limits, ParseError, RowError};
use std::collections::BTreeMap;

use crate::encoding::{detect, strip_bom};
use crate::schema::SchemaDescriptor;
use crate::types::{RawRow, SourceFile, TextEncoding};

/// A record that could not become a [`RawRow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub line: u64,
    pub error: RowError,
}

/// Iterator over the data rows of one file.
pub struct RowReader<'a> {
    records: ByteRecordsIntoIter<&'a [u8]>,
    headers: Vec<String>,
    encoding: TextEncoding,
    max_rows: usize,
    rows_read: usize,
    truncated_at: Option<u64>,
}

impl<'a> RowReader<'a> {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Data records consumed so far, rejected ones included.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Set once the row limit stopped reading: the line of the first record
    /// left unread.
    pub fn truncated_at(&self) -> Option<u64> {
        self.truncated_at
    }

    /// The limit notice, if reading stopped early.
    pub fn limit_error(&self) -> Option<ParseError> {
        self.truncated_at.map(|line| ParseError::RowLimitExceeded {
            limit: self.max_rows,
            line,
        })
    }

    fn decode_record(&self, record: &ByteRecord, line: u64) -> Result<RawRow, RowFailure> {
        if record.len() != self.headers.len() {
            return Err(RowFailure {
                line,
                error: RowError::ColumnCount {
                    expected: self.headers.len(),
                    found: record.len(),
                },
            });
        }

        let mut fields = BTreeMap::new();
        for (header, raw) in self.headers.iter().zip(record.iter()) {
            let value = self.encoding.decode(raw).ok_or_else(|| RowFailure {
                line,
                error: RowError::MalformedEncoding {
                    encoding: self.encoding.label().to_string(),
                },
            })?;
            fields.insert(header.clone(), value);
        }
        Ok(RawRow { line, fields })
    }
}

impl Iterator for RowReader<'_> {
    type Item = Result<RawRow, RowFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncated_at.is_some() {
            return None;
        }
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    if self.rows_read >= self.max_rows {
                        self.truncated_at = Some(line);
                        return None;
                    }
                    self.rows_read += 1;
                    return Some(Err(RowFailure {
                        line,
                        error: RowError::Unreadable {
                            message: e.to_string(),
                        },
                    }));
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            // Trailing padding rows like ",,,," are not data.
            if record.iter().all(|f| f.iter().all(u8::is_ascii_whitespace)) {
                continue;
            }
            if self.rows_read >= self.max_rows {
                self.truncated_at = Some(line);
                return None;
            }
            self.rows_read += 1;
            return Some(self.decode_record(&record, line));
        }
    }
}

/// Open a file for reading: size check, encoding detection, header
/// validation.
pub fn read_rows<'a>(file: &'a SourceFile, limits: &Limits) -> Result<RowReader<'a>, ParseError> {
    if file.bytes.len() > limits.max_file_bytes {
        return Err(ParseError::FileTooLarge {
            size: file.bytes.len(),
            limit: limits.max_file_bytes,
        });
    }

    let bytes = strip_bom(&file.bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::EmptyFile);
    }

    let descriptor = SchemaDescriptor::for_schema(file.schema);
    let encoding = detect(bytes, descriptor.encodings)?;

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let header_record = reader
        .byte_headers()
        .map_err(|e| ParseError::UnreadableHeader {
            message: e.to_string(),
        })?
        .clone();

    let headers = header_record
        .iter()
        .map(|raw| encoding.decode(raw).map(|h| clean_header(&h)))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ParseError::MalformedEncoding {
            tried: encoding.label().to_string(),
        })?;
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::EmptyFile);
    }
    descriptor.check_header(&headers)?;

    tracing::debug!(
        file = %file.name,
        schema = %file.schema,
        encoding = encoding.label(),
        columns = headers.len(),
        "header accepted"
    );

    Ok(RowReader {
        records: reader.into_byte_records(),
        headers,
        encoding,
        max_rows: limits.max_rows,
        rows_read: 0,
        truncated_at: None,
    })
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kessan_core::SourceSchema;

    const HANRO_HEADER: &str = "orderId,orderedAt,netPrice,commission\n";

    fn hanro(body: &str) -> SourceFile {
        SourceFile::new(
            "hanro.csv",
            format!("{HANRO_HEADER}{body}"),
            SourceSchema::HanroPlus,
            "a_m",
        )
    }

    #[test]
    fn test_rows_are_keyed_by_header() {
        let file = hanro("H-1,2024-06-01,1000,100\nH-2,2024-06-02,2000,200\n");
        let rows: Vec<_> = read_rows(&file, &Limits::default()).unwrap().collect();
        assert_eq!(rows.len(), 2);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.line, 2);
        assert_eq!(first.get("orderId"), Some("H-1"));
        assert_eq!(first.get("netPrice"), Some("1000"));
        assert_eq!(rows[1].as_ref().unwrap().line, 3);
    }

    #[test]
    fn test_empty_file() {
        let file = SourceFile::new("e.csv", "", SourceSchema::HanroPlus, "a_m");
        assert_eq!(
            read_rows(&file, &Limits::default()).err(),
            Some(ParseError::EmptyFile)
        );

        let file = SourceFile::new("e.csv", "\u{feff}\n  \n", SourceSchema::HanroPlus, "a_m");
        assert_eq!(
            read_rows(&file, &Limits::default()).err(),
            Some(ParseError::EmptyFile)
        );
    }

    #[test]
    fn test_missing_required_column_fails_file() {
        let file = SourceFile::new(
            "h.csv",
            "orderId,netPrice,commission\nH-1,1000,100\n",
            SourceSchema::HanroPlus,
            "a_m",
        );
        assert_eq!(
            read_rows(&file, &Limits::default()).err(),
            Some(ParseError::MissingRequiredColumn {
                column: "orderedAt".to_string()
            })
        );
    }

    #[test]
    fn test_bom_and_padded_headers() {
        let file = SourceFile::new(
            "h.csv",
            "\u{feff} orderId , orderedAt,netPrice,commission\nH-1,2024-06-01,1000,100\n",
            SourceSchema::HanroPlus,
            "a_m",
        );
        let reader = read_rows(&file, &Limits::default()).unwrap();
        assert_eq!(reader.headers()[0], "orderId");
        assert_eq!(reader.headers()[1], "orderedAt");
    }

    #[test]
    fn test_wrong_column_count_is_a_row_failure() {
        let file = hanro("H-1,2024-06-01,1000\nH-2,2024-06-02,2000,200\n");
        let rows: Vec<_> = read_rows(&file, &Limits::default()).unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            Err(RowFailure {
                line: 2,
                error: RowError::ColumnCount {
                    expected: 4,
                    found: 3
                }
            })
        );
        assert!(rows[1].is_ok());
    }

    #[test]
    fn test_malformed_bytes_reject_only_that_row() {
        let mut bytes = HANRO_HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"H-1,2024-06-01,1000,100\n");
        bytes.extend_from_slice(b"H-\xFF,2024-06-02,2000,200\n");
        bytes.extend_from_slice(b"H-3,2024-06-03,3000,300\n");
        let file = SourceFile::new("h.csv", bytes, SourceSchema::HanroPlus, "a_m");

        let reader = read_rows(&file, &Limits::default()).unwrap();
        assert_eq!(reader.encoding(), TextEncoding::Utf8);
        let rows: Vec<_> = reader.collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert_eq!(
            rows[1],
            Err(RowFailure {
                line: 3,
                error: RowError::MalformedEncoding {
                    encoding: "UTF-8".to_string()
                }
            })
        );
        assert!(rows[2].is_ok());
    }

    #[test]
    fn test_blank_padding_rows_skipped() {
        let file = hanro("H-1,2024-06-01,1000,100\n,,,\n , , , \n");
        let rows: Vec<_> = read_rows(&file, &Limits::default()).unwrap().collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_row_limit_stops_reading() {
        let file = hanro("H-1,2024-06-01,1,0\nH-2,2024-06-01,1,0\nH-3,2024-06-01,1,0\n");
        let limits = Limits {
            max_rows: 2,
            ..Limits::default()
        };
        let mut reader = read_rows(&file, &limits).unwrap();
        let rows: Vec<_> = reader.by_ref().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(reader.rows_read(), 2);
        assert_eq!(reader.truncated_at(), Some(4));
        assert_eq!(
            reader.limit_error(),
            Some(ParseError::RowLimitExceeded { limit: 2, line: 4 })
        );
    }

    #[test]
    fn test_file_too_large() {
        let file = hanro("H-1,2024-06-01,1000,100\n");
        let limits = Limits {
            max_file_bytes: 8,
            ..Limits::default()
        };
        assert!(matches!(
            read_rows(&file, &limits).err(),
            Some(ParseError::FileTooLarge { limit: 8, .. })
        ));
    }
}
