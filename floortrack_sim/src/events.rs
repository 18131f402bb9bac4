// floortrack_sim/src/events.rs

//! Event logs: one JSON object per line, in arrival order.
//!
//! ```text
//! {"type":"tap","x":400.0,"y":300.0}
//! {"type":"sensor","sensor":"accelerometer","x":0.1,"y":2.0,"z":9.9,"timestamp":0.02}
//! {"type":"fix","latitude":47.0,"longitude":8.0,"timestamp":1.0}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use floortrack_core::prelude::{GeoFix, SensorEvent};

/// Everything a session can be told, as it appears in a log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// The user placed the anchor.
    Tap {
        x: f32,
        y: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        geo: Option<(f64, f64)>,
    },
    Sensor(SensorEvent),
    Fix(GeoFix),
    /// The quality class changed.
    Tag { code: i32 },
    Pause,
    Resume,
}

pub fn read_event_log(path: &Path) -> Result<Vec<RecordedEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut events = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed event", path.display(), index + 1))?;
        events.push(event);
    }
    debug!(events = events.len(), "event log read from {}", path.display());
    Ok(events)
}

pub fn write_event_log(path: &Path, events: &[RecordedEvent]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use floortrack_core::prelude::Sample3;

    #[test]
    fn parses_hand_written_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.jsonl");
        std::fs::write(
            &path,
            r#"# captured on a handset
{"type":"tap","x":1.0,"y":2.0}

{"type":"sensor","sensor":"magnetometer","x":0.0,"y":22.0,"z":-40.0,"timestamp":0.5}
{"type":"tag","code":3}
{"type":"pause"}
"#,
        )
        .unwrap();

        let events = read_event_log(&path).unwrap();
        assert_eq!(
            events,
            vec![
                RecordedEvent::Tap {
                    x: 1.0,
                    y: 2.0,
                    geo: None
                },
                RecordedEvent::Sensor(SensorEvent::Magnetometer(Sample3::new(
                    0.0, 22.0, -40.0, 0.5
                ))),
                RecordedEvent::Tag { code: 3 },
                RecordedEvent::Pause,
            ]
        );
    }

    #[test]
    fn bad_line_names_its_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"type\":\"pause\"}\n{\"type\":\"jump\"}\n").unwrap();
        let err = read_event_log(&path).unwrap_err();
        assert!(err.to_string().ends_with(":2: malformed event"));
    }

    #[test]
    fn written_log_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let events = vec![
            RecordedEvent::Tap {
                x: 5.0,
                y: 6.0,
                geo: Some((47.5, 8.25)),
            },
            RecordedEvent::Fix(GeoFix::new(47.5, 8.25, 1.0)),
            RecordedEvent::Resume,
        ];
        write_event_log(&path, &events).unwrap();
        assert_eq!(read_event_log(&path).unwrap(), events);
    }
}
