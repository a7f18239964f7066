mod tone;

pub use tone::{SilentTone, ToneSink};
