mod spies;
mod stubs;

pub use spies::{ToneEvent, ToneSpy, ToneSpyHandle};
pub use stubs::ScriptedPoseSource;
