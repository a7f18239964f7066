use crate::trace::Snapshot;
use std::fs::File;
use std::io::{BufWriter, Error, ErrorKind, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceFormat {
    Csv,
    Tsv,
    Json,
}

/// The chronological record of a session's snapshots.
#[derive(Default)]
pub struct PredictionTrace {
    snapshots: Vec<Snapshot>,
}

impl PredictionTrace {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn export(&self, path: &Path, format: TraceFormat) -> Result<(), Error> {
        match format {
            TraceFormat::Csv => self.write_delimited(path, ','),
            TraceFormat::Tsv => self.write_delimited(path, '\t'),
            TraceFormat::Json => {
                let file = File::create(path)?;
                serde_json::to_writer_pretty(BufWriter::new(file), &self.snapshots)
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e))
            }
        }
    }

    fn write_delimited(&self, path: &Path, sep: char) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(
            out,
            "frames{sep}note{sep}confidence{sep}frequency_hz{sep}seconds"
        )?;
        for s in &self.snapshots {
            writeln!(
                out,
                "{}{sep}{}{sep}{}{sep}{}{sep}{:.6}",
                s.frames_seen,
                s.note.as_deref().unwrap_or(""),
                fmtv(s.confidence),
                fmtv(s.frequency_hz),
                s.seconds
            )?;
        }
        out.flush()
    }
}

#[inline]
fn fmtv(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else {
        format!("{:.6}", v)
    }
}
