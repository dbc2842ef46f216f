use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::assistant::MAX_LATENCY_SCALE;
use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
use crate::versions::DEFAULT_MAX_VERSIONS;

/// Where the persisted blobs live.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// One JSON file per blob under a local directory.
    Fs { data_dir: PathBuf },
    /// One object per blob in an S3-compatible bucket (MinIO locally).
    S3 {
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
        prefix: String,
    },
    /// Nothing survives a restart. Useful for demos.
    Memory,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is malformed or an S3 setting is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub autosave_enabled: bool,
    pub autosave_delay: Duration,
    pub max_versions: usize,
    /// Multiplier on the assistant's artificial latency; 0 disables it.
    pub ai_latency_scale: f64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage = match env_or("STORAGE_BACKEND", "fs").as_str() {
            "fs" => StorageBackend::Fs {
                data_dir: PathBuf::from(env_or("DATA_DIR", "./data")),
            },
            "s3" => StorageBackend::S3 {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
                prefix: env_or("S3_PREFIX", "procv"),
            },
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE_BACKEND must be 'fs', 's3' or 'memory', got '{other}'"),
        };

        let max_versions = match std::env::var("MAX_VERSIONS") {
            Ok(raw) => raw
                .parse::<usize>()
                .context("MAX_VERSIONS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_VERSIONS,
        };
        if max_versions == 0 {
            bail!("MAX_VERSIONS must be at least 1");
        }

        Ok(Config {
            storage,
            autosave_enabled: env_or("AUTOSAVE_ENABLED", "true")
                .parse::<bool>()
                .context("AUTOSAVE_ENABLED must be true or false")?,
            autosave_delay: match std::env::var("AUTOSAVE_DELAY_MS") {
                Ok(raw) => Duration::from_millis(
                    raw.parse::<u64>()
                        .context("AUTOSAVE_DELAY_MS must be a number of milliseconds")?,
                ),
                Err(_) => DEFAULT_AUTOSAVE_DELAY,
            },
            max_versions,
            ai_latency_scale: parse_latency_scale(&env_or("AI_LATENCY_SCALE", "1.0"))?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn parse_latency_scale(raw: &str) -> Result<f64> {
    let scale = raw
        .trim()
        .parse::<f64>()
        .context("AI_LATENCY_SCALE must be a number")?;
    if !scale.is_finite() || !(0.0..=MAX_LATENCY_SCALE).contains(&scale) {
        bail!("AI_LATENCY_SCALE must be between 0 and {MAX_LATENCY_SCALE}, got '{raw}'");
    }
    Ok(scale)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
