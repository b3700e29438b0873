use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Pipeline configuration loaded from environment variables.
/// Every key has a default, so an empty environment runs the stock layout.
#[derive(Debug, Clone)]
pub struct Config {
    pub records_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub html_dir: PathBuf,
    pub pdf_dir: PathBuf,
    /// Rasterizer drop directory; `clean/` and `noisy/` live beneath it.
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub split_dir: PathBuf,
    pub record_count: u32,
    pub record_seed: u64,
    pub template_seed: u64,
    pub noise_seed: u64,
    pub split_seed: u64,
    pub template_pool: u8,
    pub workers: usize,
    pub wkhtmltopdf_bin: PathBuf,
    pub pdftoppm_bin: PathBuf,
    pub dpi: u32,
    pub train_ratio: f64,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            records_dir: PathBuf::from("data/resumes"),
            templates_dir: PathBuf::from("templates"),
            html_dir: PathBuf::from("output/html"),
            pdf_dir: PathBuf::from("output/pdf"),
            images_dir: PathBuf::from("output/images"),
            labels_dir: PathBuf::from("annotations"),
            split_dir: PathBuf::from("yolo_dataset"),
            record_count: 1000,
            record_seed: 42,
            template_seed: 100,
            noise_seed: 7,
            split_seed: 0,
            template_pool: 10,
            workers: 1,
            wkhtmltopdf_bin: PathBuf::from("wkhtmltopdf"),
            pdftoppm_bin: PathBuf::from("pdftoppm"),
            dpi: 300,
            train_ratio: 0.8,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            records_dir: path_env("DATAGEN_RECORDS_DIR", defaults.records_dir),
            templates_dir: path_env("DATAGEN_TEMPLATES_DIR", defaults.templates_dir),
            html_dir: path_env("DATAGEN_HTML_DIR", defaults.html_dir),
            pdf_dir: path_env("DATAGEN_PDF_DIR", defaults.pdf_dir),
            images_dir: path_env("DATAGEN_IMAGES_DIR", defaults.images_dir),
            labels_dir: path_env("DATAGEN_LABELS_DIR", defaults.labels_dir),
            split_dir: path_env("DATAGEN_SPLIT_DIR", defaults.split_dir),
            record_count: parse_env("DATAGEN_RECORD_COUNT", defaults.record_count)?,
            record_seed: parse_env("DATAGEN_RECORD_SEED", defaults.record_seed)?,
            template_seed: parse_env("DATAGEN_TEMPLATE_SEED", defaults.template_seed)?,
            noise_seed: parse_env("DATAGEN_NOISE_SEED", defaults.noise_seed)?,
            split_seed: parse_env("DATAGEN_SPLIT_SEED", defaults.split_seed)?,
            template_pool: parse_env("DATAGEN_TEMPLATE_POOL", defaults.template_pool)?,
            workers: parse_env("DATAGEN_WORKERS", defaults.workers)?,
            wkhtmltopdf_bin: path_env("WKHTMLTOPDF_BIN", defaults.wkhtmltopdf_bin),
            pdftoppm_bin: path_env("PDFTOPPM_BIN", defaults.pdftoppm_bin),
            dpi: parse_env("DATAGEN_DPI", defaults.dpi)?,
            train_ratio: parse_env("DATAGEN_TRAIN_RATIO", defaults.train_ratio)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (1..=99).contains(&self.template_pool),
            "DATAGEN_TEMPLATE_POOL must be between 1 and 99, got {}",
            self.template_pool
        );
        anyhow::ensure!(self.workers >= 1, "DATAGEN_WORKERS must be at least 1");
        anyhow::ensure!(self.dpi >= 1, "DATAGEN_DPI must be at least 1");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.train_ratio),
            "DATAGEN_TRAIN_RATIO must lie in [0, 1], got {}",
            self.train_ratio
        );
        Ok(())
    }

    pub fn clean_dir(&self) -> PathBuf {
        self.images_dir.join("clean")
    }

    pub fn noisy_dir(&self) -> PathBuf {
        self.images_dir.join("noisy")
    }
}

fn path_env(key: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(key).map(PathBuf::from).unwrap_or(default)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
