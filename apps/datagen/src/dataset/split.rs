//! Train/val split of the clean images and their labels.
//!
//! ```text
//! <split_dir>/images/train/resume_0001_t03.png   <split_dir>/labels/train/resume_0001_t03.txt
//! <split_dir>/images/val/...                      <split_dir>/labels/val/...
//! ```

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::PipelineError;
use crate::identity::{sibling_path, ArtifactKind};
use crate::pipeline::stages::list_artifacts;

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub total: usize,
    pub train: usize,
    pub val: usize,
}

/// Shuffles clean images with the split seed and copies the first
/// `train_ratio` share (rounded down) with their labels into `train`, the rest
/// into `val`. Every image must have a label; that is checked before anything
/// is copied.
pub fn split_dataset(config: &Config) -> Result<SplitReport, PipelineError> {
    let mut images = list_artifacts(&config.clean_dir(), "png")?;
    if images.is_empty() {
        warn!(dir = %config.clean_dir().display(), "No clean images to split");
    }

    let mut pairs: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(images.len());
    let mut rng = StdRng::seed_from_u64(config.split_seed);
    images.shuffle(&mut rng);
    for image in images {
        let label = sibling_path(&image, &config.labels_dir, ArtifactKind::Label);
        if !label.is_file() {
            return Err(PipelineError::MissingLabel { image });
        }
        pairs.push((image, label));
    }

    let split_at = (config.train_ratio * pairs.len() as f64) as usize;
    let (train, val) = pairs.split_at(split_at);
    copy_pairs(train, &config.split_dir, "train")?;
    copy_pairs(val, &config.split_dir, "val")?;

    let report = SplitReport {
        total: pairs.len(),
        train: train.len(),
        val: val.len(),
    };
    info!(
        total = report.total,
        train = report.train,
        val = report.val,
        dir = %config.split_dir.display(),
        "Dataset split written"
    );
    Ok(report)
}

fn copy_pairs(pairs: &[(PathBuf, PathBuf)], root: &Path, subset: &str) -> Result<(), PipelineError> {
    let image_dir = root.join("images").join(subset);
    let label_dir = root.join("labels").join(subset);
    std::fs::create_dir_all(&image_dir)?;
    std::fs::create_dir_all(&label_dir)?;

    for (image, label) in pairs {
        for (src, dir) in [(image, &image_dir), (label, &label_dir)] {
            if let Some(name) = src.file_name() {
                std::fs::copy(src, dir.join(name))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(root: &Path) -> Config {
        Config {
            images_dir: root.join("images"),
            labels_dir: root.join("labels"),
            split_dir: root.join("split"),
            split_seed: 4,
            ..Config::default()
        }
    }

    fn seed_pairs(config: &Config, count: u32) {
        std::fs::create_dir_all(config.clean_dir()).unwrap();
        std::fs::create_dir_all(&config.labels_dir).unwrap();
        for seq in 1..=count {
            let stem = format!("resume_{seq:04}_t01");
            std::fs::write(config.clean_dir().join(format!("{stem}.png")), b"png").unwrap();
            std::fs::write(config.labels_dir.join(format!("{stem}.txt")), b"0 0.5 0.5 1 1\n")
                .unwrap();
        }
    }

    fn names(dir: &Path, ext: &str) -> Vec<String> {
        list_artifacts(dir, ext)
            .unwrap()
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_split_ratio_and_pairing() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        seed_pairs(&config, 10);

        let report = split_dataset(&config).unwrap();
        assert_eq!((report.total, report.train, report.val), (10, 8, 2));

        let split = &config.split_dir;
        let train_images = names(&split.join("images/train"), "png");
        assert_eq!(train_images, names(&split.join("labels/train"), "txt"));
        assert_eq!(
            names(&split.join("images/val"), "png"),
            names(&split.join("labels/val"), "txt")
        );
        assert_eq!(train_images.len(), 8);
    }

    #[test]
    fn test_split_is_seeded() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let (ca, cb) = (config_in(a.path()), config_in(b.path()));
        seed_pairs(&ca, 9);
        seed_pairs(&cb, 9);
        split_dataset(&ca).unwrap();
        split_dataset(&cb).unwrap();
        assert_eq!(
            names(&ca.split_dir.join("images/val"), "png"),
            names(&cb.split_dir.join("images/val"), "png")
        );
    }

    #[test]
    fn test_missing_label_fails_before_copying() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        seed_pairs(&config, 3);
        std::fs::remove_file(config.labels_dir.join("resume_0002_t01.txt")).unwrap();

        let err = split_dataset(&config).unwrap_err();
        assert!(matches!(err, PipelineError::MissingLabel { .. }));
        assert!(!config.split_dir.exists());
    }
}
