mod tone_spy;

pub use tone_spy::{ToneEvent, ToneSpy, ToneSpyHandle};
