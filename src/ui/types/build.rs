use crate::classifiers::KnnClassifier;
use crate::sources::{JitterPoseGenerator, PoseSource, RecordedPoseStream};
use crate::ui::types::choices::{LearnerChoice, SourceChoice};
use anyhow::{Context, Result, bail};

pub fn build_classifier(choice: LearnerChoice) -> Result<KnnClassifier> {
    match choice {
        LearnerChoice::Knn(p) => {
            KnnClassifier::new(p.k, p.dimension).context("failed to configure k-NN classifier")
        }
    }
}

pub fn build_source(choice: SourceChoice) -> Result<Box<dyn PoseSource>> {
    match choice {
        SourceChoice::RecordedPoses(p) => {
            if p.path.as_os_str().is_empty() {
                bail!("recorded-poses needs a path (use --source-param path=...)");
            }
            let stream = RecordedPoseStream::open(&p.path, p.repeat)
                .with_context(|| format!("failed to open recording {}", p.path.display()))?;
            Ok(Box::new(stream))
        }
        SourceChoice::JitterGenerator(p) => {
            if p.base_file.as_os_str().is_empty() {
                bail!("jitter-generator needs a base_file (use --source-param base_file=...)");
            }
            let generator =
                JitterPoseGenerator::from_file(&p.base_file, p.amplitude, p.seed, p.max_frames)
                    .with_context(|| {
                        format!("failed to build jitter generator from {}", p.base_file.display())
                    })?;
            Ok(Box::new(generator))
        }
    }
}
