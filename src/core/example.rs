/// An immutable labeled training pair. All examples stored by one classifier
/// share the same feature-vector dimensionality.
#[derive(Clone, Debug, PartialEq)]
pub struct Example {
    pub label: String,
    pub features: Vec<f64>,
}

impl Example {
    pub fn new(label: String, features: Vec<f64>) -> Example {
        Example { label, features }
    }

    pub fn dimension(&self) -> usize {
        self.features.len()
    }
}
