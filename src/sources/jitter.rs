use crate::core::pose::Pose;
use crate::sources::{PoseSource, load_records};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Synthesizes poses by cycling through a set of base poses and adding
/// uniform per-coordinate jitter in `[-amplitude, amplitude]`. Seeded, so a
/// given configuration always produces the same sequence.
pub struct JitterPoseGenerator {
    base: Vec<Vec<f64>>,
    amplitude: f64,
    rng: StdRng,
    cursor: usize,
    remaining: Option<u64>,
}

impl JitterPoseGenerator {
    pub fn new(
        base: Vec<Vec<f64>>,
        amplitude: f64,
        seed: u64,
        max_frames: Option<u64>,
    ) -> Result<Self, Error> {
        if base.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "jitter generator needs at least one base pose",
            ));
        }
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "amplitude must be finite and >= 0",
            ));
        }
        Ok(Self {
            base,
            amplitude,
            rng: StdRng::seed_from_u64(seed),
            cursor: 0,
            remaining: max_frames,
        })
    }

    /// Builds a generator from the non-empty poses of a recording.
    pub fn from_file(
        path: &Path,
        amplitude: f64,
        seed: u64,
        max_frames: Option<u64>,
    ) -> Result<Self, Error> {
        let base: Vec<Vec<f64>> = load_records(path)?
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.features())
            .collect();
        if base.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{}: no usable base poses", path.display()),
            ));
        }
        Self::new(base, amplitude, seed, max_frames)
    }
}

impl PoseSource for JitterPoseGenerator {
    fn has_more_poses(&self) -> bool {
        self.remaining != Some(0)
    }

    fn next_pose(&mut self) -> Option<Pose> {
        if !self.has_more_poses() {
            return None;
        }
        let base = &self.base[self.cursor];
        self.cursor = (self.cursor + 1) % self.base.len();

        let features = if self.amplitude > 0.0 {
            base.iter()
                .map(|v| v + self.rng.random_range(-self.amplitude..=self.amplitude))
                .collect()
        } else {
            base.clone()
        };

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Pose::new(features))
    }
}
