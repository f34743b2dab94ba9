//! dewrap I/O - Streaming record input/output and high-level APIs
//!
//! This crate connects the deep unwrap traversal to files and streams:
//!
//! - Envelope JSON and NDJSON record readers with JSON Pointer selection
//! - Plain JSON writers (NDJSON, array, single document)
//! - Batch processing on a rayon pool
//! - High-level `execute_unwrap`, `inspect_input` and `check_input`

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod parallel;
pub mod pointer;
pub mod reader;
pub mod writer;

pub use dewrap_codec::{
    BuiltinStrategy, Census, KindFilter, UnwrapStats, WrapperCounts, WrapperStrategy,
};
pub use dewrap_format::{DewrapError, Limits, Mapping, Result, Value, WrapperKind};
pub use reader::{InputShape, InputSource, RecordReader};
pub use writer::{OutputFormat, OutputSink, RecordWriter};

use dewrap_codec::{census, unwrap_record};
use dewrap_format::{decode, encode, mapping_to_plain_json};
use parallel::{build_pool, unwrap_batch};
use serde_json::Value as Json;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Which wrappers an unwrap run collapses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StrategyChoice {
    /// Every wrapper kind; output is strictly plain JSON
    #[default]
    All,
    /// Only the listed kinds; remaining wrappers are written as envelopes
    Only(KindFilter),
}

impl StrategyChoice {
    /// Encode an unwrapped record for output
    ///
    /// `All` guarantees a plain result, so anything else is a bug and is
    /// reported as [`DewrapError::NotPlain`]. `Only` keeps envelopes so the
    /// output can be decoded again.
    pub fn encode_record(&self, record: &Mapping) -> Result<Json> {
        match self {
            StrategyChoice::All => mapping_to_plain_json(record).map(Json::Object),
            StrategyChoice::Only(_) => Ok(encode(&Value::Mapping(record.clone()))),
        }
    }
}

impl WrapperStrategy for StrategyChoice {
    fn is_wrapped(&self, value: &Value) -> bool {
        match self {
            StrategyChoice::All => BuiltinStrategy.is_wrapped(value),
            StrategyChoice::Only(filter) => filter.is_wrapped(value),
        }
    }

    fn unwrap_once(&self, value: &Value) -> Value {
        BuiltinStrategy.unwrap_once(value)
    }

    fn visit_unwrapped(&self, value: &Value, visit: &mut dyn FnMut(&Value) -> Value) -> Value {
        BuiltinStrategy.visit_unwrapped(value, visit)
    }
}

/// High-level unwrap options
#[derive(Debug, Clone)]
pub struct UnwrapOptions {
    /// JSON Pointer selecting the records inside each document
    pub pointer: Option<String>,
    /// Wrapper kinds to collapse
    pub strategy: StrategyChoice,
    /// Count and skip records that do not unwrap to a mapping
    pub skip_invalid: bool,
    /// Worker threads; 1 processes records on the calling thread
    pub threads: usize,
    /// Records handed to the workers at a time
    pub batch_size: usize,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Output layout
    pub format: OutputFormat,
    /// Security limits
    pub limits: Limits,
}

impl Default for UnwrapOptions {
    fn default() -> Self {
        Self {
            pointer: None,
            strategy: StrategyChoice::All,
            skip_invalid: false,
            threads: 1,
            batch_size: 1024,
            pretty: false,
            format: OutputFormat::Auto,
            limits: Limits::default(),
        }
    }
}

/// Input, output and options for [`execute_unwrap`]
pub struct UnwrapRequest {
    /// Where wrapped records are read from
    pub input: InputSource,
    /// Where plain records are written
    pub output: OutputSink,
    /// How to unwrap
    pub options: UnwrapOptions,
}

/// Outcome of [`execute_unwrap`]
#[derive(Debug, Clone)]
pub struct UnwrapSummary {
    /// Records read from the input
    pub records_read: usize,
    /// Records written to the output
    pub records_written: usize,
    /// Records skipped because they did not unwrap to a mapping
    pub records_rejected: usize,
    /// Traversal statistics merged over all written records
    pub stats: UnwrapStats,
    /// Output layout actually used
    pub format: OutputFormat,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// Unwrap every record of the input into plain JSON
pub fn execute_unwrap(request: UnwrapRequest) -> Result<UnwrapSummary> {
    let started = Instant::now();
    let UnwrapRequest {
        input,
        output,
        options,
    } = request;

    options.limits.validate()?;
    let mut reader = RecordReader::open(input, options.pointer.as_deref(), &options.limits)?;
    reader.prime()?;

    let format = options.format.resolve(reader.shape());
    let mut writer = RecordWriter::new(output, format, options.pretty)?;
    let pool = build_pool(options.threads)?;
    let batch_size = options.batch_size.max(1);

    let mut stats = UnwrapStats::default();
    let mut records_read = 0usize;
    let mut records_rejected = 0usize;
    let mut batch = Vec::with_capacity(batch_size.min(4096));

    loop {
        batch.clear();
        for record in reader.by_ref().take(batch_size) {
            batch.push(record?);
        }
        if batch.is_empty() {
            break;
        }

        let first_index = records_read;
        records_read += batch.len();

        let results = unwrap_batch(&batch, &options.strategy, pool.as_ref());
        for (offset, result) in results.into_iter().enumerate() {
            match result {
                Ok((record, record_stats)) => {
                    stats.merge(&record_stats);
                    writer.write_record(&options.strategy.encode_record(&record)?)?;
                }
                Err(err) if options.skip_invalid && err.is_record_level() => {
                    records_rejected += 1;
                    warn!(record = first_index + offset, error = %err, "skipping record");
                }
                Err(err) => return Err(err),
            }
        }
        debug!(records_read, "processed batch");
    }

    if records_rejected > 0 {
        writer.allow_empty_document();
    }
    let records_written = writer.finish()?;
    let elapsed = started.elapsed();
    info!(
        records_read,
        records_written,
        records_rejected,
        wrappers = stats.wrappers.total(),
        elapsed_ms = elapsed.as_millis() as u64,
        "unwrap complete"
    );

    Ok(UnwrapSummary {
        records_read,
        records_written,
        records_rejected,
        stats,
        format,
        elapsed,
    })
}

/// Census over every record of an input
#[derive(Debug, Clone)]
pub struct InspectReport {
    /// Records examined
    pub records: usize,
    /// Input layout
    pub shape: Option<InputShape>,
    /// Merged census of all records
    pub census: Census,
}

/// Survey the input without unwrapping it
pub fn inspect_input(
    source: InputSource,
    pointer: Option<&str>,
    limits: &Limits,
) -> Result<InspectReport> {
    let mut reader = RecordReader::open(source, pointer, limits)?;
    reader.prime()?;
    let shape = reader.shape();

    let mut merged = Census::default();
    let mut records = 0usize;
    for record in reader {
        merged.merge(&census(&record?));
        records += 1;
    }

    Ok(InspectReport {
        records,
        shape,
        census: merged,
    })
}

/// Whether an input is already plain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Records examined
    pub records: usize,
    /// Records without any wrapper
    pub plain_records: usize,
    /// Record index and JSON Pointer of the first wrapper found
    pub first_wrapper: Option<(usize, String)>,
}

impl CheckReport {
    /// True when no record holds a wrapper
    pub fn is_plain(&self) -> bool {
        self.first_wrapper.is_none()
    }
}

/// Check every record for wrappers
pub fn check_input(
    source: InputSource,
    pointer: Option<&str>,
    limits: &Limits,
) -> Result<CheckReport> {
    let reader = RecordReader::open(source, pointer, limits)?;

    let mut report = CheckReport {
        records: 0,
        plain_records: 0,
        first_wrapper: None,
    };
    for (index, record) in reader.enumerate() {
        let record = record?;
        report.records += 1;
        match record.find_wrapper() {
            None => report.plain_records += 1,
            Some(path) => {
                if report.first_wrapper.is_none() {
                    report.first_wrapper = Some((index, path));
                }
            }
        }
    }
    Ok(report)
}

/// Unwrap one envelope JSON record given as text
///
/// The document must unwrap to a mapping, like any record.
pub fn unwrap_json_str(text: &str) -> Result<Json> {
    let record = decode(serde_json::from_str(text)?)?;
    let plain = unwrap_record(&record, &BuiltinStrategy)?;
    mapping_to_plain_json(&plain).map(Json::Object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwrap_json_str_collapses_envelopes() {
        let text = r#"{"$reactive": {"n": {"$ref": {"$proxy": 1}}, "l": [{"$ref": 2}]}}"#;
        let out = unwrap_json_str(text).unwrap();
        assert_eq!(out, json!({"n": 1, "l": [2]}));
    }

    #[test]
    fn unwrap_json_str_rejects_wrapped_primitive() {
        let err = unwrap_json_str(r#"{"$ref": 5}"#).unwrap_err();
        assert!(matches!(err, DewrapError::ShapeMismatch { .. }));
        assert!(err.to_string().contains("not a plain keyed mapping"));
    }

    #[test]
    fn only_strategy_keeps_remaining_wrappers_as_envelopes() {
        let choice = StrategyChoice::Only(KindFilter::new([WrapperKind::Reactive]));
        let record = decode(json!({"$reactive": {"a": {"$ref": 1}}})).unwrap();
        let map = unwrap_record(&record, &choice).unwrap();
        assert_eq!(choice.encode_record(&map).unwrap(), json!({"a": {"$ref": 1}}));
    }

    #[test]
    fn default_options() {
        let options = UnwrapOptions::default();
        assert_eq!(options.strategy, StrategyChoice::All);
        assert_eq!(options.threads, 1);
        assert_eq!(options.format, OutputFormat::Auto);
        assert!(!options.skip_invalid);
    }
}
