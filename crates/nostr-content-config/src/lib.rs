use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Kind number of long-form articles (NIP-23).
pub const LONG_FORM_KIND: u16 = 30023;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event kinds whose content is parsed as markdown.
    pub long_form_kinds: Vec<u16>,
    pub matching: MatchingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_form_kinds: vec![LONG_FORM_KIND],
            matching: MatchingConfig::default(),
        }
    }
}

/// Knobs for the link matcher's classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Path suffixes (without the dot) that classify a URL as an image.
    pub image_extensions: Vec<String>,
    /// Path suffixes (without the dot) that classify a URL as a video.
    pub video_extensions: Vec<String>,
    /// Non-http schemes accepted without a host check, e.g. `tel`.
    pub allowed_schemes: Vec<String>,
    /// Whether scheme-less candidates like `example.com/x` are linked.
    pub bare_domains: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            image_extensions: ["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "bmp"]
                .map(String::from)
                .to_vec(),
            video_extensions: ["mp4", "webm", "mov", "ogg", "m4v"]
                .map(String::from)
                .to_vec(),
            allowed_schemes: ["tel", "mailto"].map(String::from).to_vec(),
            bare_domains: true,
        }
    }
}

impl MatchingConfig {
    pub fn is_image_extension(&self, ext: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_video_extension(&self, ext: &str) -> bool {
        self.video_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_allowed_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    /// Loads the user's config file, falling back to defaults when it is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        Ok(Self::load_from_path(&config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/nostr-content");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn is_long_form(&self, kind: u16) -> bool {
        self.long_form_kinds.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/nostr-content/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config::default();

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[matching]
allowed_schemes = ["tel"]
"#,
        )
        .unwrap();

        assert_eq!(config.long_form_kinds, vec![LONG_FORM_KIND]);
        assert_eq!(config.matching.allowed_schemes, vec!["tel".to_string()]);
        assert!(config.matching.is_image_extension("PNG"));
        assert!(config.matching.bare_domains);
    }

    #[test]
    fn test_scheme_and_extension_lookups_ignore_case() {
        let matching = MatchingConfig::default();

        assert!(matching.is_allowed_scheme("TEL"));
        assert!(!matching.is_allowed_scheme("ftp"));
        assert!(matching.is_video_extension("Mp4"));
        assert!(!matching.is_video_extension("png"));
    }

    #[test]
    fn test_long_form_kinds() {
        let config = Config::default();

        assert!(config.is_long_form(30023));
        assert!(!config.is_long_form(1));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "long_form_kinds = \"nope\"").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config::default();
        test_config.long_form_kinds.push(30024);
        test_config.matching.bare_domains = false;

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
