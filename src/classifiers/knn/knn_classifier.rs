use crate::classifiers::ClassifierError;
use crate::core::example::Example;
use crate::utils::math::euclidean_distance;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};

/// The outcome of one query: the winning label and the per-label share of
/// votes among the k nearest stored examples. Confidences are each in [0, 1]
/// and sum to 1 over the labels present among the neighbors; absent labels
/// are implicitly 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidences: BTreeMap<String, f64>,
}

impl Prediction {
    /// Confidence of the winning label.
    pub fn confidence(&self) -> f64 {
        self.confidence_of(&self.label)
    }

    /// Confidence of an arbitrary label, 0 when it drew no votes.
    pub fn confidence_of(&self, label: &str) -> f64 {
        self.confidences.get(label).copied().unwrap_or(0.0)
    }
}

/// Online k-nearest-neighbor classifier over fixed-length feature vectors.
///
/// Labels are discovered as examples arrive; the dimensionality is either
/// configured up front or pinned by the first example added. Every operation
/// is a bounded linear scan over the stored examples.
pub struct KnnClassifier {
    k: usize,
    dimension: Option<usize>,
    configured_dimension: bool,
    examples: Vec<Example>,
}

impl KnnClassifier {
    pub const DEFAULT_K: usize = 3;

    /// `dimension` of `None` defers to the first example added.
    pub fn new(k: usize, dimension: Option<usize>) -> Result<Self, Error> {
        if k == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "k must be > 0"));
        }
        if dimension == Some(0) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "configured dimension must be > 0",
            ));
        }
        Ok(Self {
            k,
            dimension,
            configured_dimension: dimension.is_some(),
            examples: Vec::new(),
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// The established dimensionality, once configured or inferred.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Stores one labeled example. Fails with `DimensionMismatch` when the
    /// vector length disagrees with the established dimensionality; a failed
    /// add leaves the stored state untouched.
    pub fn add_example(&mut self, label: &str, features: Vec<f64>) -> Result<(), ClassifierError> {
        match self.dimension {
            Some(expected) if features.len() != expected => {
                return Err(ClassifierError::DimensionMismatch {
                    expected,
                    found: features.len(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(features.len()),
        }
        self.examples.push(Example::new(label.to_string(), features));
        Ok(())
    }

    /// Classifies a query vector against the stored examples.
    ///
    /// Votes are tallied among the `min(k, stored)` nearest examples by
    /// Euclidean distance. Vote ties go to the label with the closest
    /// neighbor; a remaining tie falls back to label order.
    pub fn predict(&self, query: &[f64]) -> Result<Prediction, ClassifierError> {
        if self.examples.is_empty() {
            return Err(ClassifierError::NoExamples);
        }
        let expected = self.dimension.unwrap_or(query.len());
        if query.len() != expected {
            return Err(ClassifierError::DimensionMismatch {
                expected,
                found: query.len(),
            });
        }

        let mut neighbors: Vec<(f64, &str)> = self
            .examples
            .iter()
            .map(|e| (euclidean_distance(query, &e.features), e.label.as_str()))
            .collect();
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k_eff = self.k.min(neighbors.len());
        neighbors.truncate(k_eff);

        // Per label: vote count and the distance of its nearest neighbor.
        // Neighbors arrive sorted, so the first occurrence is the nearest.
        let mut tally: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for (dist, label) in neighbors.iter().copied() {
            let entry = tally.entry(label).or_insert((0, dist));
            entry.0 += 1;
        }

        let mut winner: Option<(&str, usize, f64)> = None;
        for (&label, &(votes, nearest)) in &tally {
            let better = match winner {
                None => true,
                Some((_, best_votes, best_nearest)) => {
                    votes > best_votes || (votes == best_votes && nearest < best_nearest)
                }
            };
            if better {
                winner = Some((label, votes, nearest));
            }
        }

        let confidences = tally
            .iter()
            .map(|(&label, &(votes, _))| (label.to_string(), votes as f64 / k_eff as f64))
            .collect();

        let (label, _, _) = winner.ok_or(ClassifierError::NoExamples)?;
        Ok(Prediction {
            label: label.to_string(),
            confidences,
        })
    }

    /// Number of stored examples per label. Labels without examples are
    /// absent from the map.
    pub fn example_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for example in &self.examples {
            *counts.entry(example.label.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Removes every example under `label`. Idempotent; unknown labels are a
    /// no-op, and other labels are untouched.
    pub fn clear_label(&mut self, label: &str) {
        self.examples.retain(|e| e.label != label);
    }

    /// Removes every stored example. An inferred dimensionality resets with
    /// the state; a configured one persists.
    pub fn clear_all(&mut self) {
        self.examples.clear();
        if !self.configured_dimension {
            self.dimension = None;
        }
    }
}
