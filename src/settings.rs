use std::{collections::HashMap, time::Duration};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://fraud-detection-test-deployment.onrender.com/";
pub const DEFAULT_PORT: u16 = 8501;
/// Free tier hosts need 30-60 seconds to wake up, predictions get the lower bound.
pub const DEFAULT_PREDICT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_INFO_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CATEGORIES_TIMEOUT_SECS: u64 = 3;

const CONFIG_FILE: &str = "fraudcheck";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub port: u16,
    pub predict_timeout_secs: u64,
    pub info_timeout_secs: u64,
    pub categories_timeout_secs: u64,
}

impl Settings {
    /// Defaults, then `fraudcheck.toml` if present, then the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }
    /// Same layering as [`Settings::load`] but with an explicit environment,
    /// `None` meaning the process environment.
    pub fn load_from(env: Option<HashMap<String, String>>) -> Result<Self> {
        let config = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("predict_timeout_secs", DEFAULT_PREDICT_TIMEOUT_SECS as i64)?
            .set_default("info_timeout_secs", DEFAULT_INFO_TIMEOUT_SECS as i64)?
            .set_default("categories_timeout_secs", DEFAULT_CATEGORIES_TIMEOUT_SECS as i64)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::default().try_parsing(true).source(env))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        self
    }
    pub fn predict_timeout(&self) -> Duration {
        Duration::from_secs(self.predict_timeout_secs)
    }
    pub fn info_timeout(&self) -> Duration {
        Duration::from_secs(self.info_timeout_secs)
    }
    pub fn categories_timeout(&self) -> Duration {
        Duration::from_secs(self.categories_timeout_secs)
    }
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            port: DEFAULT_PORT,
            predict_timeout_secs: DEFAULT_PREDICT_TIMEOUT_SECS,
            info_timeout_secs: DEFAULT_INFO_TIMEOUT_SECS,
            categories_timeout_secs: DEFAULT_CATEGORIES_TIMEOUT_SECS,
        }
    }
}
