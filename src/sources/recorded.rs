use crate::core::pose::Pose;
use crate::sources::PoseSource;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind};
use std::path::Path;

/// One line of a pose recording: optionally labeled landmark coordinates.
/// An empty `landmarks` array records a frame with no detected hand.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PoseRecord {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub landmarks: Vec<[f64; 3]>,
}

impl PoseRecord {
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Landmark coordinates flattened into one feature vector.
    pub fn features(&self) -> Vec<f64> {
        self.landmarks.iter().flatten().copied().collect()
    }
}

/// Reads a JSON-lines pose recording. Blank lines and `#` comments are
/// skipped; anything else must parse as a [`PoseRecord`].
pub fn load_records(path: &Path) -> Result<Vec<PoseRecord>, Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: PoseRecord = serde_json::from_str(trimmed).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("{}:{}: {}", path.display(), idx + 1, e),
            )
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Replays a pose recording in order, optionally restarting from the top
/// when it runs out.
pub struct RecordedPoseStream {
    records: Vec<PoseRecord>,
    cursor: usize,
    repeat: bool,
}

impl RecordedPoseStream {
    pub fn open(path: &Path, repeat: bool) -> Result<Self, Error> {
        let records = load_records(path)?;
        if records.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{}: recording contains no poses", path.display()),
            ));
        }
        Ok(Self {
            records,
            cursor: 0,
            repeat,
        })
    }
}

impl PoseSource for RecordedPoseStream {
    fn has_more_poses(&self) -> bool {
        self.repeat || self.cursor < self.records.len()
    }

    fn next_pose(&mut self) -> Option<Pose> {
        if self.cursor >= self.records.len() {
            if !self.repeat {
                return None;
            }
            self.cursor = 0;
        }
        let record = &self.records[self.cursor];
        self.cursor += 1;
        Some(Pose::new(record.features()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn recording(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_labeled_and_unlabeled_records() {
        let file = recording(&[
            "# training poses",
            r#"{"label":"Do","landmarks":[[1.0,2.0,3.0],[4.0,5.0,6.0]]}"#,
            "",
            r#"{"landmarks":[[0.5,0.5,0.5]]}"#,
            r#"{"landmarks":[]}"#,
        ]);

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].label.as_deref(), Some("Do"));
        assert_eq!(records[0].features(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(records[1].label, None);
        assert!(records[2].is_empty());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let file = recording(&[
            r#"{"landmarks":[[1.0,2.0,3.0]]}"#,
            "not json at all",
        ]);

        let err = load_records(file.path()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains(":2:"), "msg was: {err}");
    }

    #[test]
    fn stream_replays_in_order_then_ends() {
        let file = recording(&[
            r#"{"landmarks":[[1.0,0.0,0.0]]}"#,
            r#"{"landmarks":[[2.0,0.0,0.0]]}"#,
        ]);

        let mut stream = RecordedPoseStream::open(file.path(), false).unwrap();
        assert!(stream.has_more_poses());
        assert_eq!(stream.next_pose().unwrap().features()[0], 1.0);
        assert_eq!(stream.next_pose().unwrap().features()[0], 2.0);
        assert!(!stream.has_more_poses());
        assert!(stream.next_pose().is_none());
    }

    #[test]
    fn repeat_mode_wraps_around() {
        let file = recording(&[r#"{"landmarks":[[7.0,0.0,0.0]]}"#]);

        let mut stream = RecordedPoseStream::open(file.path(), true).unwrap();
        for _ in 0..5 {
            assert!(stream.has_more_poses());
            assert_eq!(stream.next_pose().unwrap().features()[0], 7.0);
        }
    }

    #[test]
    fn empty_recording_is_rejected() {
        let file = recording(&["# nothing here"]);
        let err = RecordedPoseStream::open(file.path(), false).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn record_serde_round_trip() {
        let r0 = PoseRecord {
            label: Some("Sol".into()),
            landmarks: vec![[0.1, 0.2, 0.3]],
        };
        let json = serde_json::to_string(&r0).unwrap();
        let r1: PoseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r0, r1);
    }
}
