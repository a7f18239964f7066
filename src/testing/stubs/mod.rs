mod scripted_pose_source;

pub use scripted_pose_source::ScriptedPoseSource;
