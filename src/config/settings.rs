//! Configuration settings for Sporre.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcripts: TranscriptSettings,
    pub library: LibrarySettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub translation: TranslationSettings,
    pub web_search: WebSearchSettings,
    pub retrieval: RetrievalSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.sporre".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Directory containing aligned segment files.
    pub dir: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

/// Video library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory scanned for video files.
    pub videos_dir: String,
    /// File extensions treated as videos.
    pub extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            videos_dir: "videos".to_string(),
            extensions: vec!["mp4".to_string(), "webm".to_string(), "mov".to_string()],
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// LLM model for answer generation.
    pub model: String,
    /// Maximum new tokens per generation call.
    pub max_new_tokens: u32,
    /// Language the generator performs best in; context and question are
    /// bridged into it before generation.
    pub working_language: String,
    /// Character cap applied to transcript context before prompting.
    pub max_context_chars: usize,
    /// Character cap applied to web context before prompting.
    pub max_web_context_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_new_tokens: 150,
            working_language: "en".to_string(),
            max_context_chars: 600,
            max_web_context_chars: 400,
        }
    }
}

/// Translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct TranslationSettings {
    /// Base URL of a LibreTranslate-compatible endpoint. None disables
    /// translation entirely (every call passes text through unchanged).
    pub endpoint: Option<String>,
    /// API key for the translation endpoint, if it requires one.
    pub api_key: Option<String>,
}


/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchSettings {
    /// Enable web-augmented context.
    pub enabled: bool,
    /// Maximum number of search results to include.
    pub max_results: usize,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results: 2,
        }
    }
}

/// Segment retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of segments retrieved per question.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SporreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sporre")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded transcript directory path.
    pub fn transcripts_dir(&self) -> PathBuf {
        Self::expand_path(&self.transcripts.dir)
    }

    /// Get the expanded videos directory path.
    pub fn videos_dir(&self) -> PathBuf {
        Self::expand_path(&self.library.videos_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(settings.generation.max_new_tokens, 150);
        assert_eq!(settings.generation.max_context_chars, 600);
        assert_eq!(settings.generation.max_web_context_chars, 400);
        assert_eq!(settings.generation.working_language, "en");
        assert!(settings.translation.endpoint.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [generation]
            working_language = "de"

            [web_search]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.generation.working_language, "de");
        assert!(!settings.web_search.enabled);
        // Untouched sections keep their defaults.
        assert_eq!(settings.retrieval.top_k, 3);
    }
}
