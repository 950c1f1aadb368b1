use std::path::PathBuf;

use serde::Deserialize;
use tutor_wordbank::WordBankConfig;

/// Deployment environment, read from `APP_ENV`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_xp_per_exercise() -> u32 {
    10
}

const fn default_exercise_idle_minutes() -> u32 {
    30
}

/// One week
const MAX_EXERCISE_IDLE_MINUTES: u32 = 7 * 24 * 60;

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default, rename = "app_env")]
    pub env: Environment,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated list of browser origins allowed by CORS
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// JSON array of vocabulary items loaded at startup
    #[serde(default)]
    pub vocabulary_path: Option<PathBuf>,
    #[serde(default = "default_xp_per_exercise")]
    pub xp_per_exercise: u32,
    /// Exercises untouched for this long are dropped by the sweep job
    #[serde(default = "default_exercise_idle_minutes")]
    pub exercise_idle_minutes: u32,
    #[serde(skip)]
    pub wordbank: WordBankConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config: Self = envy::from_env()?;
        config.wordbank = WordBankConfig::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration from explicit `(name, value)` pairs.
    pub fn from_vars(vars: Vec<(String, String)>) -> anyhow::Result<Self> {
        let mut config: Self = envy::from_iter(vars.clone())?;
        config.wordbank = WordBankConfig::from_vars(vars)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_EXERCISE_IDLE_MINUTES).contains(&self.exercise_idle_minutes) {
            anyhow::bail!(
                "EXERCISE_IDLE_MINUTES must be within 1..={MAX_EXERCISE_IDLE_MINUTES}, got {}",
                self.exercise_idle_minutes
            );
        }
        Ok(())
    }
}
