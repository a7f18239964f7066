/// The oscillator seam. Synthesis itself lives outside this crate; the
/// session only starts/stops the tone and retargets its frequency.
pub trait ToneSink {
    fn start(&mut self);
    fn stop(&mut self);
    fn set_frequency(&mut self, hz: f64);
}

/// Default sink that plays nothing. Useful headless and in scripted runs.
#[derive(Default)]
pub struct SilentTone;

impl ToneSink for SilentTone {
    fn start(&mut self) {}
    fn stop(&mut self) {}
    fn set_frequency(&mut self, _hz: f64) {}
}
