//! Record reader for envelope JSON and NDJSON input
//!
//! Each document is decoded from envelope JSON, the optional pointer is
//! applied, and the selected target becomes records: a sequence target
//! (looking through wrappers) yields one record per element, anything else
//! yields itself as a single record.

use crate::pointer::{look_through, navigate, parse_pointer};
use dewrap_format::{decode, DewrapError, Limits, Result, Value};
use serde_json::Value as Json;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use tracing::debug;

/// Where wrapped input comes from
pub enum InputSource {
    /// A single JSON document on disk
    JsonPath(PathBuf),
    /// One JSON document per line on disk
    NdjsonPath(PathBuf),
    /// A single JSON document from a reader
    JsonReader(Box<dyn Read + Send>),
    /// One JSON document per line from a reader
    NdjsonReader(Box<dyn Read + Send>),
}

impl InputSource {
    /// True for line-delimited sources
    pub fn is_ndjson(&self) -> bool {
        matches!(self, InputSource::NdjsonPath(_) | InputSource::NdjsonReader(_))
    }

    fn open(self) -> Result<(Box<dyn Read + Send>, bool)> {
        Ok(match self {
            InputSource::JsonPath(path) => (Box::new(File::open(path)?), false),
            InputSource::NdjsonPath(path) => (Box::new(File::open(path)?), true),
            InputSource::JsonReader(reader) => (reader, false),
            InputSource::NdjsonReader(reader) => (reader, true),
        })
    }
}

/// How the selected input is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// A JSON document whose target is one record
    SingleRecord,
    /// A JSON document whose target is a sequence of records
    RecordSequence,
    /// Line-delimited documents
    Stream,
}

/// Iterator over wrapped records
pub struct RecordReader {
    input: BufReader<Box<dyn Read + Send>>,
    ndjson: bool,
    pointer: String,
    tokens: Vec<String>,
    limits: Limits,
    pending: VecDeque<Value>,
    shape: Option<InputShape>,
    line_number: usize,
    emitted: usize,
    exhausted: bool,
}

impl RecordReader {
    /// Open `source`, selecting records at `pointer`
    pub fn open(source: InputSource, pointer: Option<&str>, limits: &Limits) -> Result<Self> {
        limits.validate()?;
        let pointer = pointer.unwrap_or("").to_string();
        let tokens = parse_pointer(&pointer, limits)?;
        let (input, ndjson) = source.open()?;

        Ok(Self {
            input: BufReader::new(input),
            ndjson,
            pointer,
            tokens,
            limits: limits.clone(),
            pending: VecDeque::new(),
            shape: if ndjson { Some(InputShape::Stream) } else { None },
            line_number: 0,
            emitted: 0,
            exhausted: false,
        })
    }

    /// Load the JSON document so [`RecordReader::shape`] is known
    ///
    /// A no-op for NDJSON input.
    pub fn prime(&mut self) -> Result<()> {
        if !self.ndjson && !self.exhausted {
            self.load_document()?;
        }
        Ok(())
    }

    /// Layout of the input, once known
    pub fn shape(&self) -> Option<InputShape> {
        self.shape
    }

    /// Records emitted so far
    pub fn records_emitted(&self) -> usize {
        self.emitted
    }

    fn load_document(&mut self) -> Result<()> {
        self.exhausted = true;
        let limit = self.limits.max_document_bytes;
        let mut buf = Vec::new();
        (&mut self.input)
            .take(limit as u64 + 1)
            .read_to_end(&mut buf)?;
        if buf.len() > limit {
            return Err(DewrapError::LimitExceeded(format!(
                "document exceeds max_document_bytes ({} bytes)",
                limit
            )));
        }
        let json: Json = serde_json::from_slice(&buf)?;
        debug!(bytes = buf.len(), "loaded JSON document");

        let single = self.enqueue(json)?;
        self.shape = Some(if single {
            InputShape::SingleRecord
        } else {
            InputShape::RecordSequence
        });
        Ok(())
    }

    /// Read lines until a document has been queued or input ends
    fn load_next_line(&mut self) -> Result<()> {
        let limit = self.limits.max_document_bytes;
        let mut line = String::new();

        loop {
            line.clear();
            let read = (&mut self.input)
                .take(limit as u64 + 1)
                .read_line(&mut line)?;
            if read == 0 {
                self.exhausted = true;
                return Ok(());
            }
            self.line_number += 1;

            let content = line.trim_end_matches(['\n', '\r']);
            if content.len() > limit {
                return Err(DewrapError::LimitExceeded(format!(
                    "line {} exceeds max_document_bytes ({} bytes)",
                    self.line_number, limit
                )));
            }
            if content.trim().is_empty() {
                continue;
            }

            let json: Json = serde_json::from_str(content)?;
            self.enqueue(json)?;
            return Ok(());
        }
    }

    /// Decode and select records from one document; true if it was a single record
    fn enqueue(&mut self, json: Json) -> Result<bool> {
        let document = decode(json)?;
        let target = navigate(document, &self.tokens, &self.pointer)?;

        let is_sequence = match &target {
            Value::Sequence(_) => true,
            Value::Wrapped(wrapper) => wrapper.with(|inner| {
                matches!(look_through(inner.clone()), Value::Sequence(_))
            }),
            _ => false,
        };

        if is_sequence {
            if let Value::Sequence(items) = look_through(target) {
                self.pending.extend(items);
            }
            Ok(false)
        } else {
            self.pending.push_back(target);
            Ok(true)
        }
    }
}

impl Iterator for RecordReader {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() && !self.exhausted {
            let loaded = if self.ndjson {
                self.load_next_line()
            } else {
                self.load_document()
            };
            if let Err(err) = loaded {
                self.exhausted = true;
                return Some(Err(err));
            }
        }

        let record = self.pending.pop_front()?;
        if self.emitted >= self.limits.max_records {
            self.exhausted = true;
            self.pending.clear();
            return Some(Err(DewrapError::LimitExceeded(format!(
                "input holds more than max_records ({}) records",
                self.limits.max_records
            ))));
        }
        self.emitted += 1;
        Some(Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewrap_format::WrapperKind;
    use std::io::Cursor;

    fn json_source(text: &str) -> InputSource {
        InputSource::JsonReader(Box::new(Cursor::new(text.as_bytes().to_vec())))
    }

    fn ndjson_source(text: &str) -> InputSource {
        InputSource::NdjsonReader(Box::new(Cursor::new(text.as_bytes().to_vec())))
    }

    fn collect(reader: RecordReader) -> Vec<Value> {
        reader.collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn single_json_document_is_one_record() {
        let mut reader =
            RecordReader::open(json_source(r#"{"a": {"$ref": 1}}"#), None, &Limits::default())
                .unwrap();
        reader.prime().unwrap();
        assert_eq!(reader.shape(), Some(InputShape::SingleRecord));

        let records = collect(reader);
        assert_eq!(records.len(), 1);
        assert!(records[0].as_mapping().is_some());
    }

    #[test]
    fn wrapped_sequence_target_expands_to_records() {
        let text = r#"{"data": {"$reactive": [{"id": 1}, {"$proxy": {"id": 2}}]}}"#;
        let mut reader =
            RecordReader::open(json_source(text), Some("/data"), &Limits::default()).unwrap();
        reader.prime().unwrap();
        assert_eq!(reader.shape(), Some(InputShape::RecordSequence));

        let records = collect(reader);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].as_wrapper().map(|w| w.kind()), Some(WrapperKind::Proxy));
    }

    #[test]
    fn ndjson_skips_blank_lines() {
        let text = "{\"a\": 1}\n\n   \n{\"$reactive\": {\"a\": 2}}\r\n";
        let reader = RecordReader::open(ndjson_source(text), None, &Limits::default()).unwrap();
        assert_eq!(reader.shape(), Some(InputShape::Stream));
        assert_eq!(collect(reader).len(), 2);
    }

    #[test]
    fn ndjson_pointer_applies_per_line() {
        let text = "{\"state\": {\"n\": 1}, \"meta\": 0}\n{\"state\": {\"$ref\": {\"n\": 2}}}\n";
        let reader =
            RecordReader::open(ndjson_source(text), Some("/state"), &Limits::default()).unwrap();
        assert_eq!(collect(reader).len(), 2);
    }

    #[test]
    fn oversized_document_is_rejected() {
        let limits = Limits {
            max_document_bytes: 16,
            ..Limits::default()
        };
        let text = r#"{"payload": "this is far longer than sixteen bytes"}"#;
        let mut reader = RecordReader::open(json_source(text), None, &limits).unwrap();
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, DewrapError::LimitExceeded(_)));
        assert!(reader.next().is_none());
    }

    #[test]
    fn trailing_bytes_past_the_limit_are_rejected() {
        let limits = Limits {
            max_document_bytes: 16,
            ..Limits::default()
        };
        let text = format!("{{\"a\":1}}{}garbage", " ".repeat(9));
        let mut reader = RecordReader::open(json_source(&text), None, &limits).unwrap();
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, DewrapError::LimitExceeded(_)));
    }

    #[test]
    fn document_of_exactly_the_limit_is_read() {
        let text = r#"{"a": {"$ref": 1}}"#;
        let limits = Limits {
            max_document_bytes: text.len(),
            ..Limits::default()
        };
        let reader = RecordReader::open(json_source(text), None, &limits).unwrap();
        assert_eq!(collect(reader).len(), 1);
    }

    #[test]
    fn oversized_ndjson_line_is_rejected() {
        let limits = Limits {
            max_document_bytes: 10,
            ..Limits::default()
        };
        let text = "{\"a\":1}\n{\"payload\": \"much too long\"}\n";
        let mut reader = RecordReader::open(ndjson_source(text), None, &limits).unwrap();
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn record_limit_is_enforced() {
        let limits = Limits {
            max_records: 2,
            ..Limits::default()
        };
        let text = "[{}, {}, {}]";
        let results: Vec<_> = RecordReader::open(json_source(text), None, &limits)
            .unwrap()
            .collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok() && results[1].is_ok());
        assert!(matches!(results[2], Err(DewrapError::LimitExceeded(_))));
    }

    #[test]
    fn malformed_line_reports_json_error() {
        let mut reader =
            RecordReader::open(ndjson_source("{not json}\n"), None, &Limits::default()).unwrap();
        assert!(matches!(reader.next(), Some(Err(DewrapError::Json(_)))));
    }
}
