use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One sampled observation of a running session. `note` is `None` (and the
/// numeric fields NaN) while nothing has been classified yet.
#[derive(Clone, Serialize)]
pub struct Snapshot {
    pub frames_seen: u64,
    pub note: Option<String>,
    pub confidence: f64,
    pub frequency_hz: f64,
    pub seconds: f64,
    pub confidences: BTreeMap<String, f64>,
}

impl Snapshot {
    #[inline]
    fn fmtv(v: f64) -> String {
        if v.is_nan() {
            "NaN".into()
        } else {
            format!("{:.6}", v)
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "frames={}, note={}, conf={}, freq={}, t={:.6}s",
            self.frames_seen,
            self.note.as_deref().unwrap_or("-"),
            Self::fmtv(self.confidence),
            Self::fmtv(self.frequency_hz),
            self.seconds
        )?;

        for (label, v) in self.confidences.iter() {
            write!(f, ", {}={}", label, Self::fmtv(*v))?;
        }

        Ok(())
    }
}
