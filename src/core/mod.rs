pub mod example;
pub mod note;
pub mod pose;

pub use example::Example;
pub use note::{Note, NoteTable};
pub use pose::Pose;
