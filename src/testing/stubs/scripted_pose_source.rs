use crate::core::pose::Pose;
use crate::sources::PoseSource;
use std::collections::VecDeque;

/// Yields a predefined pose sequence, then runs dry.
pub struct ScriptedPoseSource {
    poses: VecDeque<Pose>,
}

impl ScriptedPoseSource {
    pub fn new(poses: Vec<Pose>) -> Self {
        Self {
            poses: poses.into(),
        }
    }

    pub fn from_features(rows: Vec<Vec<f64>>) -> Self {
        Self::new(rows.into_iter().map(Pose::new).collect())
    }
}

impl PoseSource for ScriptedPoseSource {
    fn has_more_poses(&self) -> bool {
        !self.poses.is_empty()
    }

    fn next_pose(&mut self) -> Option<Pose> {
        self.poses.pop_front()
    }
}
