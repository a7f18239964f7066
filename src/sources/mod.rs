mod jitter;
mod recorded;

pub use jitter::JitterPoseGenerator;
pub use recorded::{PoseRecord, RecordedPoseStream, load_records};

use crate::core::pose::Pose;

/// A polled supplier of hand poses — the seam to the external tracker.
///
/// `next_pose` returning `None` means the source is exhausted; an *empty*
/// pose means the tracker saw no hand this frame, and the caller is expected
/// to skip classification and keep polling.
pub trait PoseSource {
    fn has_more_poses(&self) -> bool;
    fn next_pose(&mut self) -> Option<Pose>;
}
