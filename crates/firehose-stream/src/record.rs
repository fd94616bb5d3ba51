//! Per-line JSON record transform
//!
//! Each complete line is one JSON event. The original JSON is augmented
//! with a synthetic `__time` field copied from `created_at` (when present),
//! then re-serialized compactly with a `\r\n` terminator so downstream
//! consumers can parse the timestamp without reparsing dates.

use std::io::Write;

use serde_json::Value;
use tracing::debug;

use crate::framing::{LineFramer, LINE_TERMINATOR};
use crate::reader::ByteSink;

/// Synthetic timestamp field added to each record
pub const TIME_FIELD: &str = "__time";
/// Source field the timestamp is copied from
pub const CREATED_AT_FIELD: &str = "created_at";

/// Copy `created_at` into `__time`, verbatim, if the record has one.
///
/// Field order is preserved and `__time` lands after the original fields.
/// Records without `created_at` (and non-object values) pass through
/// unchanged.
pub fn augment_timestamp(value: &mut Value) {
    if let Value::Object(map) = value {
        if let Some(created_at) = map.get(CREATED_AT_FIELD).cloned() {
            map.insert(TIME_FIELD.to_string(), created_at);
        }
    }
}

/// Parse one line as JSON, augment it, and write it compactly with a
/// `\r\n` terminator.
///
/// Malformed lines are dropped: logged at debug level, never emitted, never
/// fatal. Only sink IO errors surface.
pub fn emit_record(line: &[u8], out: &mut impl Write) -> std::io::Result<()> {
    let mut value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(err) => {
            debug!("Dropping undecodable record: {}", err);
            return Ok(());
        }
    };

    augment_timestamp(&mut value);
    write_record(&value, out)
}

/// Serialize one record compactly, terminated by `\r\n`.
pub fn write_record(value: &Value, out: &mut impl Write) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(LINE_TERMINATOR)?;
    out.flush()
}

/// ByteSink that frames decoded chunks into lines and emits each line as a
/// record on `out`.
///
/// This is the downstream end of the pump loop: raw decoded bytes in, one
/// compact JSON record per line out.
pub struct RecordWriter<W: Write> {
    framer: LineFramer,
    out: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            framer: LineFramer::new(),
            out,
        }
    }

    /// Writer with a framing buffer pre-sized to the feed's chunk size
    pub fn with_capacity(out: W, capacity: usize) -> Self {
        Self {
            framer: LineFramer::with_capacity(capacity),
            out,
        }
    }

    /// Consume the writer, returning the output it wrapped. Any buffered
    /// partial line is discarded.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ByteSink for RecordWriter<W> {
    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        for line in self.framer.feed(chunk) {
            // A dead output (downstream pipe closed) must abort the stream,
            // not leave the engine consuming the feed and dropping records.
            emit_record(&line, &mut self.out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit(line: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        emit_record(line, &mut out).unwrap();
        out
    }

    #[test]
    fn test_time_field_appended_after_original_fields() {
        let out = emit(br#"{"created_at":"X","id":1}"#);
        assert_eq!(out, b"{\"created_at\":\"X\",\"id\":1,\"__time\":\"X\"}\r\n");
    }

    #[test]
    fn test_record_without_created_at_passes_through() {
        let out = emit(br#"{"id":7,"text":"hi"}"#);
        assert_eq!(out, b"{\"id\":7,\"text\":\"hi\"}\r\n");
    }

    #[test]
    fn test_compact_separators() {
        let out = emit(br#"{ "a" : 1 , "b" : [1, 2] }"#);
        assert_eq!(out, b"{\"a\":1,\"b\":[1,2]}\r\n");
    }

    #[test]
    fn test_malformed_line_is_dropped() {
        let out = emit(b"{not json");
        assert!(out.is_empty());
    }

    #[test]
    fn test_record_writer_survives_malformed_middle_line() {
        let mut writer = RecordWriter::new(Vec::new());
        writer
            .write(b"{\"id\":1}\r\nnot json\r\n{\"id\":2}\r\n")
            .unwrap();
        let out = writer.into_inner();
        assert_eq!(out, b"{\"id\":1}\r\n{\"id\":2}\r\n");
    }

    #[test]
    fn test_sink_io_error_surfaces_to_caller() {
        struct BrokenSink;

        impl Write for BrokenSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }
        }

        let mut writer = RecordWriter::new(BrokenSink);
        let err = ByteSink::write(&mut writer, b"{\"id\":1}\r\n").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
