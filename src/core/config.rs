use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the generation backend.
    pub base_url: String,
    /// Timeout for the non-streaming endpoints (history, file listings).
    /// The streaming generation request runs without an overall deadline.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Recursion limit forwarded to the backend's agent graph.
    pub recursion_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            recursion_limit: 100,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(config_dir) = directories::ProjectDirs::from("io", "webforge", "webforge") {
            let config_file = config_dir.config_dir().join("config.toml");
            if config_file.exists() {
                let content = std::fs::read_to_string(&config_file)?;
                match toml::from_str::<Config>(&content) {
                    Ok(config) => return Ok(config),
                    Err(error) => {
                        tracing::warn!(
                            path = %config_file.display(),
                            "ignoring unreadable config: {error}"
                        );
                    }
                }
            }
        }
        Ok(Config::default())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(config_dir) = directories::ProjectDirs::from("io", "webforge", "webforge") {
            std::fs::create_dir_all(config_dir.config_dir())?;
            let config_file = config_dir.config_dir().join("config.toml");
            let content = toml::to_string_pretty(self)?;
            std::fs::write(config_file, content)?;
        }
        Ok(())
    }
}
