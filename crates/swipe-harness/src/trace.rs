#![forbid(unsafe_code)]

//! JSONL gesture traces.
//!
//! A trace is one JSON object per line. The first record is a
//! `trace_header`; every later record carries a `ts_ms` offset from the
//! start of the session:
//!
//! ```text
//! {"event":"trace_header","schema_version":"swipe-trace-v1","session_name":"demo"}
//! {"event":"start","ts_ms":0,"x":0.0,"y":0.0}
//! {"event":"move","ts_ms":16,"x":95.0,"y":3.0}
//! {"event":"end","ts_ms":32}
//! {"event":"tick","ts_ms":132}
//! ```
//!
//! Blank lines are skipped. Timestamps must not decrease.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use swipe_core::{SwipeConfig, TouchEvent};

use crate::error::{HarnessError, Result};

/// Schema identifier written into and required from every header.
pub const SCHEMA_VERSION: &str = "swipe-trace-v1";

/// One line of a trace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TraceRecord {
    #[serde(rename = "trace_header")]
    Header {
        schema_version: String,
        session_name: String,
        /// Engine config the trace was captured with.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        config: Option<SwipeConfig>,
    },
    #[serde(rename = "start")]
    Start { ts_ms: u64, x: f64, y: f64 },
    #[serde(rename = "move")]
    Move { ts_ms: u64, x: f64, y: f64 },
    #[serde(rename = "end")]
    End { ts_ms: u64 },
    #[serde(rename = "cancel")]
    Cancel { ts_ms: u64 },
    /// Advance the clock with no input.
    #[serde(rename = "tick")]
    Tick { ts_ms: u64 },
    /// Host-initiated `reset()`.
    #[serde(rename = "reset")]
    Reset { ts_ms: u64 },
}

impl TraceRecord {
    #[must_use]
    pub fn header(session_name: impl Into<String>, config: Option<SwipeConfig>) -> Self {
        Self::Header {
            schema_version: SCHEMA_VERSION.to_string(),
            session_name: session_name.into(),
            config,
        }
    }

    /// Wrap a touch event at `ts_ms`.
    #[must_use]
    pub fn from_touch(event: TouchEvent, ts_ms: u64) -> Self {
        match event {
            TouchEvent::Start { x, y } => Self::Start { ts_ms, x, y },
            TouchEvent::Move { x, y } => Self::Move { ts_ms, x, y },
            TouchEvent::End => Self::End { ts_ms },
            TouchEvent::Cancel => Self::Cancel { ts_ms },
        }
    }

    /// `None` for the header.
    #[must_use]
    pub fn ts_ms(&self) -> Option<u64> {
        match self {
            Self::Header { .. } => None,
            Self::Start { ts_ms, .. }
            | Self::Move { ts_ms, .. }
            | Self::End { ts_ms }
            | Self::Cancel { ts_ms }
            | Self::Tick { ts_ms }
            | Self::Reset { ts_ms } => Some(*ts_ms),
        }
    }

    /// The touch event this record replays, if it is one.
    #[must_use]
    pub fn touch_event(&self) -> Option<TouchEvent> {
        match *self {
            Self::Start { x, y, .. } => Some(TouchEvent::Start { x, y }),
            Self::Move { x, y, .. } => Some(TouchEvent::Move { x, y }),
            Self::End { .. } => Some(TouchEvent::End),
            Self::Cancel { .. } => Some(TouchEvent::Cancel),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Header { .. } => "trace_header",
            Self::Start { .. } => "start",
            Self::Move { .. } => "move",
            Self::End { .. } => "end",
            Self::Cancel { .. } => "cancel",
            Self::Tick { .. } => "tick",
            Self::Reset { .. } => "reset",
        }
    }
}

/// A parsed trace: the header plus timed records with their source lines.
#[derive(Debug, Clone)]
pub struct TraceFile {
    session_name: String,
    config: Option<SwipeConfig>,
    steps: Vec<(usize, TraceRecord)>,
}

impl TraceFile {
    /// Read and parse a trace from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse trace text. Line numbers in errors are 1-based.
    pub fn parse(text: &str) -> Result<Self> {
        let mut header: Option<(String, Option<SwipeConfig>)> = None;
        let mut steps = Vec::new();
        let mut last_ts = 0u64;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(trimmed)
                .map_err(|err| HarnessError::trace(line, err.to_string()))?;

            match record {
                TraceRecord::Header {
                    schema_version,
                    session_name,
                    config,
                } => {
                    if header.is_some() {
                        return Err(HarnessError::trace(line, "duplicate trace_header"));
                    }
                    if schema_version != SCHEMA_VERSION {
                        return Err(HarnessError::Schema {
                            found: schema_version,
                            expected: SCHEMA_VERSION,
                        });
                    }
                    header = Some((session_name, config));
                }
                record => {
                    if header.is_none() {
                        return Err(HarnessError::MissingHeader);
                    }
                    let ts = record.ts_ms().unwrap_or(last_ts);
                    if ts < last_ts {
                        return Err(HarnessError::trace(
                            line,
                            format!("timestamp goes backwards ({ts} < {last_ts})"),
                        ));
                    }
                    last_ts = ts;
                    steps.push((line, record));
                }
            }
        }

        let (session_name, config) = header.ok_or(HarnessError::MissingHeader)?;
        Ok(Self {
            session_name,
            config,
            steps,
        })
    }

    #[must_use]
    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Config embedded in the header, if any.
    #[must_use]
    pub fn config(&self) -> Option<&SwipeConfig> {
        self.config.as_ref()
    }

    /// Timed records in file order, paired with their 1-based line numbers.
    #[must_use]
    pub fn steps(&self) -> &[(usize, TraceRecord)] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Streams records as JSONL. The header is written on construction.
pub struct TraceWriter<W: Write> {
    out: W,
    records: usize,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(mut out: W, session_name: &str, config: Option<SwipeConfig>) -> Result<Self> {
        let header = TraceRecord::header(session_name, config);
        writeln!(out, "{}", serde_json::to_string(&header)?)?;
        Ok(Self { out, records: 0 })
    }

    pub fn record(&mut self, record: &TraceRecord) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string(record)?)?;
        self.records += 1;
        Ok(())
    }

    /// Records written after the header.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Straight-line drag from `from` to `to` in `steps` moves, `frame_ms`
/// apart, then release. A trailing tick lands after the snap-back delay so
/// replay shows the surface settle.
#[must_use]
pub fn synth_line(
    from: (f64, f64),
    to: (f64, f64),
    steps: u32,
    frame_ms: u64,
    settle_ms: u64,
) -> Vec<TraceRecord> {
    let steps = steps.max(1);
    let mut records = Vec::with_capacity(steps as usize + 3);
    records.push(TraceRecord::Start {
        ts_ms: 0,
        x: from.0,
        y: from.1,
    });
    for i in 1..=steps {
        let t = f64::from(i) / f64::from(steps);
        records.push(TraceRecord::Move {
            ts_ms: u64::from(i) * frame_ms,
            x: from.0 + (to.0 - from.0) * t,
            y: from.1 + (to.1 - from.1) * t,
        });
    }
    let released = (u64::from(steps) + 1) * frame_ms;
    records.push(TraceRecord::End { ts_ms: released });
    records.push(TraceRecord::Tick {
        ts_ms: released + settle_ms,
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        r#"{"event":"trace_header","schema_version":"swipe-trace-v1","session_name":"t"}"#;

    #[test]
    fn parses_records_and_skips_blank_lines() {
        let text = format!(
            "{HEADER}\n\n{}\n{}\n   \n{}\n",
            r#"{"event":"start","ts_ms":0,"x":1.0,"y":2.0}"#,
            r#"{"event":"move","ts_ms":16,"x":90.0,"y":2.0}"#,
            r#"{"event":"end","ts_ms":32}"#,
        );
        let trace = TraceFile::parse(&text).expect("parse");
        assert_eq!(trace.session_name(), "t");
        assert!(trace.config().is_none());
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.steps()[0].0, 3);
        assert_eq!(trace.steps()[2].0, 6);
        assert_eq!(
            trace.steps()[1].1.touch_event(),
            Some(TouchEvent::Move { x: 90.0, y: 2.0 })
        );
    }

    #[test]
    fn header_may_carry_config() {
        let text = r#"{"event":"trace_header","schema_version":"swipe-trace-v1","session_name":"c","config":{"threshold":40.0}}"#;
        let trace = TraceFile::parse(text).expect("parse");
        let config = trace.config().expect("config");
        assert_eq!(config.threshold, 40.0);
        assert_eq!(config.max_swipe, 150.0);
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = TraceFile::parse(r#"{"event":"end","ts_ms":0}"#).unwrap_err();
        assert!(matches!(err, HarnessError::MissingHeader));
        assert!(matches!(
            TraceFile::parse("").unwrap_err(),
            HarnessError::MissingHeader
        ));
    }

    #[test]
    fn wrong_schema_is_rejected() {
        let text = r#"{"event":"trace_header","schema_version":"swipe-trace-v0","session_name":"x"}"#;
        match TraceFile::parse(text).unwrap_err() {
            HarnessError::Schema { found, expected } => {
                assert_eq!(found, "swipe-trace-v0");
                assert_eq!(expected, SCHEMA_VERSION);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let text = format!("{HEADER}\n{{\"event\":\"move\",\"ts_ms\":1}}\n");
        match TraceFile::parse(&text).unwrap_err() {
            HarnessError::Trace { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decreasing_timestamp_is_rejected() {
        let text = format!(
            "{HEADER}\n{}\n{}\n",
            r#"{"event":"tick","ts_ms":50}"#, r#"{"event":"tick","ts_ms":10}"#,
        );
        match TraceFile::parse(&text).unwrap_err() {
            HarnessError::Trace { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("backwards"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let text = format!("{HEADER}\n{HEADER}\n");
        assert!(matches!(
            TraceFile::parse(&text).unwrap_err(),
            HarnessError::Trace { line: 2, .. }
        ));
    }

    #[test]
    fn writer_output_parses_back() {
        let mut writer = TraceWriter::new(Vec::new(), "w", None).expect("header");
        for record in synth_line((0.0, 0.0), (120.0, 0.0), 4, 16, 150) {
            writer.record(&record).expect("record");
        }
        assert_eq!(writer.records(), 7);
        let bytes = writer.finish().expect("finish");
        let text = String::from_utf8(bytes).expect("utf8");

        let trace = TraceFile::parse(&text).expect("parse");
        assert_eq!(trace.session_name(), "w");
        assert_eq!(trace.len(), 7);
        assert_eq!(trace.steps()[6].1, TraceRecord::Tick { ts_ms: 80 + 150 });
    }

    #[test]
    fn synth_line_interpolates_to_target() {
        let records = synth_line((10.0, 5.0), (-90.0, 5.0), 5, 10, 100);
        assert_eq!(records.first().map(TraceRecord::name), Some("start"));
        assert_eq!(
            records[5],
            TraceRecord::Move {
                ts_ms: 50,
                x: -90.0,
                y: 5.0
            }
        );
        assert_eq!(records[6], TraceRecord::End { ts_ms: 60 });
    }

    #[test]
    fn zero_steps_still_moves_once() {
        let records = synth_line((0.0, 0.0), (100.0, 0.0), 0, 16, 100);
        assert_eq!(records.len(), 4);
    }
}
