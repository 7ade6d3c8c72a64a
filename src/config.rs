// src/config.rs
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fetcher::DEFAULT_MAX_ITERATIONS;
use crate::upstream::DEFAULT_TRENDING_URL;

pub const ENV_CONFIG_PATH: &str = "CASHTAGS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/cashtags.toml";

fn default_upstream_url() -> String {
    DEFAULT_TRENDING_URL.to_string()
}
fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_data_snapshot() -> PathBuf {
    PathBuf::from("test_data.json")
}
fn default_stocktwits_snapshot() -> PathBuf {
    PathBuf::from("new_data.json")
}
fn default_static_data() -> PathBuf {
    PathBuf::from("public/data/static.json")
}
fn default_test_data() -> PathBuf {
    PathBuf::from("public/data/test_data.json")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    /// Older pages requested after the first one.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Written by `GET /data`.
    #[serde(default = "default_data_snapshot")]
    pub data_snapshot: PathBuf,
    /// Written by `GET /stocktwits`.
    #[serde(default = "default_stocktwits_snapshot")]
    pub stocktwits_snapshot: PathBuf,
    /// Served by `GET /dummydata`.
    #[serde(default = "default_static_data")]
    pub static_data: PathBuf,
    /// Served by `GET /testdata` and `GET /stocktwits/testdata`.
    #[serde(default = "default_test_data")]
    pub test_data: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream_url: default_upstream_url(),
            max_iterations: default_max_iterations(),
            timeout_secs: default_timeout_secs(),
            data_snapshot: default_data_snapshot(),
            stocktwits_snapshot: default_stocktwits_snapshot(),
            static_data: default_static_data(),
            test_data: default_test_data(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    /// Config file lookup:
    /// 1) $CASHTAGS_CONFIG_PATH (must exist)
    /// 2) config/cashtags.toml
    /// 3) built-in defaults
    ///
    /// then `CASHTAGS_*` env vars override individual fields.
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            info!("no config file found, using defaults");
            Self::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        override_from_env("CASHTAGS_UPSTREAM_URL", &mut self.upstream_url);
        override_from_env("CASHTAGS_MAX_ITERATIONS", &mut self.max_iterations);
        override_from_env("CASHTAGS_TIMEOUT_SECS", &mut self.timeout_secs);
        override_from_env("CASHTAGS_DATA_SNAPSHOT", &mut self.data_snapshot);
        override_from_env("CASHTAGS_STOCKTWITS_SNAPSHOT", &mut self.stocktwits_snapshot);
        override_from_env("CASHTAGS_STATIC_DATA", &mut self.static_data);
        override_from_env("CASHTAGS_TEST_DATA", &mut self.test_data);
    }
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T)
where
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(v) => *slot = v,
        Err(e) => warn!("Invalid {key} value, keeping previous: {e}"),
    }
}
