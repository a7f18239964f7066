mod prediction_trace;
mod snapshot;

pub use prediction_trace::{PredictionTrace, TraceFormat};
pub use snapshot::Snapshot;
