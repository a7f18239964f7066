mod live_session;

pub use live_session::{LiveSession, StopHandle};
