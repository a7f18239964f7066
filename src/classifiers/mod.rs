mod error;
pub mod knn;

pub use error::ClassifierError;
pub use knn::{KnnClassifier, Prediction};
