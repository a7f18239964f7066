use crate::audio::ToneSink;
use crate::classifiers::{ClassifierError, KnnClassifier, Prediction};
use crate::core::note::NoteTable;
use crate::sources::{PoseRecord, PoseSource};
use crate::trace::{PredictionTrace, Snapshot};
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

/// Cloneable off-thread switch that makes a running session wind down at the
/// next frame boundary.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The sampling/prediction loop: polls a pose source at a fixed cadence,
/// classifies each detected pose, and drives the tone sink from the winning
/// note. Owns the classifier outright, so add/predict/clear are naturally
/// mutually exclusive.
pub struct LiveSession {
    classifier: KnnClassifier,
    source: Box<dyn PoseSource>,
    tone: Box<dyn ToneSink>,
    notes: NoteTable,

    trace: PredictionTrace,

    poll_interval: Duration,
    max_frames: Option<u64>,
    max_seconds: Option<u64>,
    sample_frequency: u64,

    processed: u64,
    started: Instant,
    stop: Arc<AtomicBool>,
    tone_playing: bool,

    last_note: Option<String>,
    last_confidence: f64,
    last_frequency: f64,
    last_confidences: BTreeMap<String, f64>,

    progress_tx: Option<Sender<Snapshot>>,
}

impl LiveSession {
    pub fn new(
        classifier: KnnClassifier,
        source: Box<dyn PoseSource>,
        tone: Box<dyn ToneSink>,
        notes: NoteTable,
        poll_interval: Duration,
        max_frames: Option<u64>,
        max_seconds: Option<u64>,
        sample_frequency: u64,
    ) -> Result<Self, Error> {
        if sample_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "sample_frequency must be > 0",
            ));
        }

        Ok(Self {
            classifier,
            source,
            tone,
            notes,
            trace: PredictionTrace::default(),
            poll_interval,
            max_frames,
            max_seconds,
            sample_frequency,
            processed: 0,
            started: Instant::now(),
            stop: Arc::new(AtomicBool::new(false)),
            tone_playing: false,
            last_note: None,
            last_confidence: f64::NAN,
            last_frequency: f64::NAN,
            last_confidences: BTreeMap::new(),
            progress_tx: None,
        })
    }

    pub fn with_progress(mut self, tx: Sender<Snapshot>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }

    pub fn classifier(&self) -> &KnnClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut KnnClassifier {
        &mut self.classifier
    }

    pub fn trace(&self) -> &PredictionTrace {
        &self.trace
    }

    /// Seeds the classifier from labeled records. Unlabeled rows and no-hand
    /// frames are skipped; a dimension mismatch aborts the whole load.
    pub fn train_from_records(&mut self, records: &[PoseRecord]) -> Result<usize, Error> {
        let mut added = 0;
        for record in records {
            let Some(label) = record.label.as_deref() else {
                continue;
            };
            if record.is_empty() {
                continue;
            }
            self.classifier
                .add_example(label, record.features())
                .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
            added += 1;
        }
        Ok(added)
    }

    pub fn run(&mut self) -> Result<(), Error> {
        self.started = Instant::now();

        while self.source.has_more_poses() {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            if let Some(n) = self.max_frames {
                if self.processed >= n {
                    break;
                }
            }
            if let Some(s) = self.max_seconds {
                if self.started.elapsed().as_secs() >= s {
                    break;
                }
            }

            let Some(pose) = self.source.next_pose() else {
                break;
            };
            self.processed += 1;

            // An empty pose is a frame with no hand in view: skip
            // classification, keep the cycle alive.
            if !pose.is_empty() {
                match self.classifier.predict(pose.features()) {
                    Ok(prediction) => self.apply_prediction(prediction),
                    Err(ClassifierError::NoExamples) => self.forget_prediction(),
                    Err(err @ ClassifierError::DimensionMismatch { .. }) => {
                        self.silence();
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            format!("frame {}: {err}", self.processed),
                        ));
                    }
                }
            }

            if self.processed % self.sample_frequency == 0 {
                self.push_snapshot();
            }

            if !self.poll_interval.is_zero() {
                thread::sleep(self.poll_interval);
            }
        }

        self.silence();
        self.push_snapshot();
        Ok(())
    }

    fn apply_prediction(&mut self, prediction: Prediction) {
        let frequency = self.notes.frequency_of(&prediction.label);
        if let Some(hz) = frequency {
            if !self.tone_playing {
                self.tone.start();
                self.tone_playing = true;
            }
            self.tone.set_frequency(hz);
        }

        self.last_frequency = frequency.unwrap_or(f64::NAN);
        self.last_confidence = prediction.confidence();
        self.last_confidences = prediction.confidences;
        self.last_note = Some(prediction.label);
    }

    // Nothing to classify against: go quiet until examples appear.
    fn forget_prediction(&mut self) {
        self.silence();
        self.last_note = None;
        self.last_confidence = f64::NAN;
        self.last_frequency = f64::NAN;
        self.last_confidences.clear();
    }

    fn silence(&mut self) {
        if self.tone_playing {
            self.tone.stop();
            self.tone_playing = false;
        }
    }

    fn push_snapshot(&mut self) {
        let snapshot = Snapshot {
            frames_seen: self.processed,
            note: self.last_note.clone(),
            confidence: self.last_confidence,
            frequency_hz: self.last_frequency,
            seconds: self.started.elapsed().as_secs_f64(),
            confidences: self.last_confidences.clone(),
        };

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(snapshot.clone());
        }

        self.trace.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentTone;
    use crate::testing::{ScriptedPoseSource, ToneEvent, ToneSpy};

    fn trained_classifier() -> KnnClassifier {
        let mut c = KnnClassifier::new(3, None).unwrap();
        c.add_example("Do", vec![0.0, 0.0]).unwrap();
        c.add_example("Do", vec![0.0, 0.2]).unwrap();
        c.add_example("Re", vec![10.0, 10.0]).unwrap();
        c.add_example("Re", vec![10.0, 10.2]).unwrap();
        c
    }

    fn session(
        classifier: KnnClassifier,
        source: ScriptedPoseSource,
        tone: Box<dyn ToneSink>,
        sample_frequency: u64,
    ) -> LiveSession {
        LiveSession::new(
            classifier,
            Box::new(source),
            tone,
            NoteTable::solfege(),
            Duration::ZERO,
            None,
            None,
            sample_frequency,
        )
        .unwrap()
    }

    #[test]
    fn ctor_guards() {
        let err = LiveSession::new(
            KnnClassifier::new(3, None).unwrap(),
            Box::new(ScriptedPoseSource::from_features(vec![])),
            Box::new(SilentTone),
            NoteTable::solfege(),
            Duration::ZERO,
            None,
            None,
            0,
        )
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn train_from_records_skips_unlabeled_and_empty_rows() {
        let records = vec![
            PoseRecord {
                label: Some("Do".into()),
                landmarks: vec![[0.0, 0.0, 0.0]],
            },
            PoseRecord {
                label: None,
                landmarks: vec![[1.0, 1.0, 1.0]],
            },
            PoseRecord {
                label: Some("Re".into()),
                landmarks: vec![],
            },
            PoseRecord {
                label: Some("Re".into()),
                landmarks: vec![[2.0, 2.0, 2.0]],
            },
        ];

        let mut s = session(
            KnnClassifier::new(3, None).unwrap(),
            ScriptedPoseSource::from_features(vec![]),
            Box::new(SilentTone),
            1,
        );
        let added = s.train_from_records(&records).unwrap();
        assert_eq!(added, 2);

        let counts = s.classifier().example_counts();
        assert_eq!(counts.get("Do"), Some(&1));
        assert_eq!(counts.get("Re"), Some(&1));
    }

    #[test]
    fn training_dimension_mismatch_aborts() {
        let records = vec![
            PoseRecord {
                label: Some("Do".into()),
                landmarks: vec![[0.0, 0.0, 0.0]],
            },
            PoseRecord {
                label: Some("Re".into()),
                landmarks: vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            },
        ];

        let mut s = session(
            KnnClassifier::new(3, None).unwrap(),
            ScriptedPoseSource::from_features(vec![]),
            Box::new(SilentTone),
            1,
        );
        let err = s.train_from_records(&records).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn periodic_and_final_snapshots() {
        let source =
            ScriptedPoseSource::from_features(vec![vec![0.0, 0.1]; 4]);
        let mut s = session(trained_classifier(), source, Box::new(SilentTone), 2);
        s.run().unwrap();

        // Snapshots at frames 2 and 4, plus the final one.
        assert_eq!(s.trace().len(), 3);
        let last = s.trace().latest().unwrap();
        assert_eq!(last.frames_seen, 4);
        assert_eq!(last.note.as_deref(), Some("Do"));
        // Two of the three nearest neighbors are "Do" examples.
        assert!((last.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn tone_follows_predicted_note_and_stops_at_end() {
        let (spy, handle) = ToneSpy::new();
        let source = ScriptedPoseSource::from_features(vec![
            vec![0.0, 0.1],
            vec![10.0, 10.1],
        ]);
        let mut s = session(trained_classifier(), source, Box::new(spy), 1);
        s.run().unwrap();

        let events = handle.events();
        assert_eq!(
            events,
            vec![
                ToneEvent::Started,
                ToneEvent::Frequency(262.0),
                ToneEvent::Frequency(294.0),
                ToneEvent::Stopped,
            ]
        );
    }

    #[test]
    fn empty_classifier_keeps_polling_and_stays_silent() {
        let (spy, handle) = ToneSpy::new();
        let source =
            ScriptedPoseSource::from_features(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        let mut s = session(
            KnnClassifier::new(3, None).unwrap(),
            source,
            Box::new(spy),
            1,
        );
        s.run().unwrap();

        assert!(handle.events().is_empty());
        let last = s.trace().latest().unwrap();
        assert_eq!(last.frames_seen, 2);
        assert_eq!(last.note, None);
        assert!(last.confidence.is_nan());
    }

    #[test]
    fn missing_hand_frames_are_skipped_but_counted() {
        let source = ScriptedPoseSource::new(vec![
            crate::core::Pose::empty(),
            crate::core::Pose::new(vec![0.0, 0.1]),
            crate::core::Pose::empty(),
        ]);
        let mut s = session(trained_classifier(), source, Box::new(SilentTone), 1);
        s.run().unwrap();

        let last = s.trace().latest().unwrap();
        assert_eq!(last.frames_seen, 3);
        // The last successful classification sticks across no-hand frames.
        assert_eq!(last.note.as_deref(), Some("Do"));
    }

    #[test]
    fn stops_at_max_frames() {
        let source =
            ScriptedPoseSource::from_features(vec![vec![0.0, 0.1]; 10]);
        let mut s = LiveSession::new(
            trained_classifier(),
            Box::new(source),
            Box::new(SilentTone),
            NoteTable::solfege(),
            Duration::ZERO,
            Some(3),
            None,
            1,
        )
        .unwrap();
        s.run().unwrap();

        assert_eq!(s.trace().latest().unwrap().frames_seen, 3);
    }

    #[test]
    fn stop_handle_halts_before_first_frame() {
        let source =
            ScriptedPoseSource::from_features(vec![vec![0.0, 0.1]; 10]);
        let mut s = session(trained_classifier(), source, Box::new(SilentTone), 1);

        let handle = s.stop_handle();
        handle.stop();
        assert!(handle.is_stopped());

        s.run().unwrap();
        assert_eq!(s.trace().len(), 1);
        assert_eq!(s.trace().latest().unwrap().frames_seen, 0);
    }

    #[test]
    fn corrupt_source_surfaces_dimension_mismatch() {
        let source = ScriptedPoseSource::from_features(vec![vec![0.0, 0.1, 0.2]]);
        let mut s = session(trained_classifier(), source, Box::new(SilentTone), 1);

        let err = s.run().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("frame 1"), "msg was: {err}");
    }

    #[test]
    fn progress_channel_receives_snapshots() {
        let (tx, rx) = std::sync::mpsc::channel();
        let source =
            ScriptedPoseSource::from_features(vec![vec![0.0, 0.1]; 3]);
        let mut s = session(trained_classifier(), source, Box::new(SilentTone), 1)
            .with_progress(tx);
        s.run().unwrap();
        drop(s);

        let received: Vec<Snapshot> = rx.iter().collect();
        assert_eq!(received.len(), 4);
        assert_eq!(received.last().unwrap().frames_seen, 3);
    }
}
