//! Output writers for unwrapped records

use crate::reader::InputShape;
use dewrap_format::{DewrapError, Result};
use serde_json::Value as Json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Where unwrapped records go
pub enum OutputSink {
    /// Write to a file
    Path(PathBuf),
    /// Write to an arbitrary writer
    Writer(Box<dyn Write + Send>),
}

impl OutputSink {
    fn open(self) -> Result<Box<dyn Write + Send>> {
        Ok(match self {
            OutputSink::Path(path) => Box::new(File::create(path)?),
            OutputSink::Writer(writer) => writer,
        })
    }
}

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// NDJSON for NDJSON input, a document for a single record, an array otherwise
    #[default]
    Auto,
    /// One record per line
    Ndjson,
    /// A JSON array of records
    JsonArray,
    /// Exactly one record as a JSON document
    Document,
}

impl OutputFormat {
    /// Resolve `Auto` against the input layout
    pub fn resolve(self, shape: Option<InputShape>) -> OutputFormat {
        match (self, shape) {
            (OutputFormat::Auto, Some(InputShape::SingleRecord)) => OutputFormat::Document,
            (OutputFormat::Auto, Some(InputShape::RecordSequence)) => OutputFormat::JsonArray,
            (OutputFormat::Auto, _) => OutputFormat::Ndjson,
            (explicit, _) => explicit,
        }
    }
}

/// Streaming writer for unwrapped records
pub struct RecordWriter {
    inner: BufWriter<Box<dyn Write + Send>>,
    format: OutputFormat,
    pretty: bool,
    written: usize,
    allow_empty_document: bool,
}

impl RecordWriter {
    /// Create a writer; `format` must already be resolved
    pub fn new(sink: OutputSink, format: OutputFormat, pretty: bool) -> Result<Self> {
        if format == OutputFormat::Auto {
            return Err(DewrapError::Internal(
                "output format must be resolved before writing".to_string(),
            ));
        }
        Ok(Self {
            inner: BufWriter::new(sink.open()?),
            format,
            pretty,
            written: 0,
            allow_empty_document: false,
        })
    }

    /// Format records are written in
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Let document output finish with no record, leaving the sink empty
    ///
    /// Used when every record was skipped as invalid.
    pub fn allow_empty_document(&mut self) {
        self.allow_empty_document = true;
    }

    /// Write one record
    pub fn write_record(&mut self, record: &Json) -> Result<()> {
        match self.format {
            OutputFormat::Ndjson => {
                serde_json::to_writer(&mut self.inner, record)?;
                self.inner.write_all(b"\n")?;
            }
            OutputFormat::JsonArray => {
                if self.written == 0 {
                    self.inner.write_all(b"[")?;
                } else {
                    self.inner.write_all(b",")?;
                }
                if self.pretty {
                    self.inner.write_all(b"\n")?;
                }
                self.write_json(record)?;
            }
            OutputFormat::Document => {
                if self.written > 0 {
                    return Err(DewrapError::OutputShape(
                        "document output holds exactly one record; use --format json-array or ndjson"
                            .to_string(),
                    ));
                }
                self.write_json(record)?;
                self.inner.write_all(b"\n")?;
            }
            OutputFormat::Auto => {
                return Err(DewrapError::Internal(
                    "output format must be resolved before writing".to_string(),
                ))
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Close the layout and flush; returns the number of records written
    pub fn finish(mut self) -> Result<usize> {
        match self.format {
            OutputFormat::JsonArray => {
                if self.written == 0 {
                    self.inner.write_all(b"[")?;
                } else if self.pretty {
                    self.inner.write_all(b"\n")?;
                }
                self.inner.write_all(b"]\n")?;
            }
            OutputFormat::Document if self.written == 0 && !self.allow_empty_document => {
                return Err(DewrapError::OutputShape(
                    "document output requires one record, none were produced".to_string(),
                ));
            }
            _ => {}
        }
        self.inner.flush()?;
        Ok(self.written)
    }

    fn write_json(&mut self, record: &Json) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.inner, record)?;
        } else {
            serde_json::to_writer(&mut self.inner, record)?;
        }
        Ok(())
    }
}
