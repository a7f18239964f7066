mod knn_classifier;

pub use knn_classifier::{KnnClassifier, Prediction};
