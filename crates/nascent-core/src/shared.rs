//! Shared types used across all Nascent crates.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storage key of the knowledge snapshot.
pub const KNOWLEDGE_KEY: &str = "ai_birth_knowledge";
/// Storage key of the personality snapshot.
pub const PERSONALITY_KEY: &str = "ai_birth_memory";

/// How often the autonomous scheduler runs a learning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningSpeed {
    /// One cycle every 30 seconds.
    Slow,
    /// One cycle every 15 seconds.
    #[default]
    Normal,
    /// One cycle every 5 seconds.
    Fast,
}

impl LearningSpeed {
    pub fn period(&self) -> Duration {
        match self {
            LearningSpeed::Slow => Duration::from_secs(30),
            LearningSpeed::Normal => Duration::from_secs(15),
            LearningSpeed::Fast => Duration::from_secs(5),
        }
    }

    /// Parses `slow` / `normal` / `fast`; anything else maps to `Normal`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => LearningSpeed::Slow,
            "fast" => LearningSpeed::Fast,
            _ => LearningSpeed::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningSpeed::Slow => "slow",
            LearningSpeed::Normal => "normal",
            LearningSpeed::Fast => "fast",
        }
    }
}

/// Global application configuration (gateway, daemon). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown to the UI and sent to OpenRouter as `X-Title`.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for Sled DBs (snapshot and DNA paths are derived from this).
    pub storage_path: String,
    /// LLM mode ("mock" or "live").
    pub llm_mode: String,
    /// Default autonomous learning speed.
    #[serde(default)]
    pub learning_speed: LearningSpeed,
    /// If true, the gateway starts the autonomous scheduler at boot.
    #[serde(default)]
    pub autostart_learning: bool,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `NASCENT_CONFIG` path > `config/nascent` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("NASCENT_CONFIG").unwrap_or_else(|_| "config/nascent.toml".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "AI Birth Simulation")?
            .set_default("port", 8002_i64)?
            .set_default("storage_path", "./data")?
            .set_default("llm_mode", "mock")?
            .set_default("learning_speed", "normal")?
            .set_default("autostart_learning", false)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("NASCENT").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    /// Sled directory for knowledge and personality snapshots.
    pub fn snapshot_path(&self) -> PathBuf {
        Path::new(&self.storage_path).join("nascent_snapshots")
    }

    /// Sled directory for the DNA record repository.
    pub fn dna_path(&self) -> PathBuf {
        Path::new(&self.storage_path).join("nascent_dna")
    }

    pub fn is_live(&self) -> bool {
        self.llm_mode.eq_ignore_ascii_case("live")
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "AI Birth Simulation".to_string(),
            port: 8002,
            storage_path: "./data".to_string(),
            llm_mode: "mock".to_string(),
            learning_speed: LearningSpeed::Normal,
            autostart_learning: false,
        }
    }
}
