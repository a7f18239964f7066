use std::fmt;

/// A single observed hand pose: the tracker's landmark coordinates flattened
/// into one feature vector. An empty pose stands for a frame in which no hand
/// was detected.
#[derive(Clone, PartialEq)]
pub struct Pose {
    features: Vec<f64>,
}

impl Pose {
    pub fn new(features: Vec<f64>) -> Pose {
        Pose { features }
    }

    pub fn empty() -> Pose {
        Pose {
            features: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn into_features(self) -> Vec<f64> {
        self.features
    }
}

impl fmt::Debug for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pose")
            .field("dimension", &self.features.len())
            .finish()
    }
}
