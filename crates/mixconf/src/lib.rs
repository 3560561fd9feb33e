//! Configuration loading for mixfinder.
//!
//! Settings are split into the mixing policy (`[mix]`), the component
//! weights used by the compatibility scorer (`[weights]`), and a log level
//! the host application hands to its tracing subscriber.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/mixfinder/config.toml` (system)
//! 2. `~/.config/mixfinder/config.toml` (user)
//! 3. `./mixfinder.toml` (local override), or an explicit path
//! 4. Environment variables (`MIXFINDER_*`)
//!
//! A file only overrides the keys it names.
//!
//! # Example Config
//!
//! ```toml
//! log_level = "debug"
//!
//! [mix]
//! bpm_tolerance = 6.0
//! harmonic_matching = true
//! same_genre = false
//! genre_scoring = "family_distance"
//!
//! [weights]
//! tempo = 0.4
//! key = 0.3
//! energy = 0.1
//! danceability = 0.1
//! genre = 0.1
//! ```

pub mod loader;
pub mod mix;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use mix::{GenreScoring, MixConfig, ScoringWeights};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Complete mixfinder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixSettings {
    #[serde(default)]
    pub mix: MixConfig,

    #[serde(default)]
    pub weights: ScoringWeights,

    /// Filter directive for the host's tracing subscriber.
    /// Default: "info"
    #[serde(default = "MixSettings::default_log_level")]
    pub log_level: String,
}

impl MixSettings {
    fn default_log_level() -> String {
        "info".to_string()
    }

    /// Load settings from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (settings, _sources) = Self::load_with_sources_from(None)?;
        Ok(settings)
    }

    /// Load settings, letting `config_path` replace the local `./mixfinder.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (settings, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(settings)
    }

    /// Load settings and report where values came from.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut settings = MixSettings::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut settings, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut settings, &mut sources);

        settings.validate()?;
        Ok((settings, sources))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mix.validate()?;
        self.weights.validate()
    }

    /// Serialize settings to a TOML document.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# mixfinder configuration\n\n");
        output.push_str(&format!(
            "log_level = {}\n",
            toml::Value::String(self.log_level.clone())
        ));

        output.push_str("\n[mix]\n");
        output.push_str(&format!("bpm_tolerance = {:?}\n", self.mix.bpm_tolerance));
        output.push_str(&format!("harmonic_matching = {}\n", self.mix.harmonic_matching));
        output.push_str(&format!("same_genre = {}\n", self.mix.same_genre));
        output.push_str(&format!("maintain_energy = {}\n", self.mix.maintain_energy));
        output.push_str(&format!(
            "allow_half_double_time = {}\n",
            self.mix.allow_half_double_time
        ));
        output.push_str(&format!(
            "genre_scoring = \"{}\"\n",
            self.mix.genre_scoring.as_str()
        ));

        output.push_str("\n[weights]\n");
        output.push_str(&format!("tempo = {:?}\n", self.weights.tempo));
        output.push_str(&format!("key = {:?}\n", self.weights.key));
        output.push_str(&format!("energy = {:?}\n", self.weights.energy));
        output.push_str(&format!("danceability = {:?}\n", self.weights.danceability));
        output.push_str(&format!("genre = {:?}\n", self.weights.genre));

        output
    }
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            mix: MixConfig::default(),
            weights: ScoringWeights::default(),
            log_level: Self::default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = MixSettings::default();
        assert_eq!(settings.mix.bpm_tolerance, 4.0);
        assert!(settings.mix.harmonic_matching);
        assert!(settings.mix.allow_half_double_time);
        assert_eq!(settings.weights.tempo, 0.3);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_to_toml_round_trips_through_serde() {
        let mut settings = MixSettings::default();
        settings.mix.bpm_tolerance = 6.5;
        settings.mix.genre_scoring = GenreScoring::FamilyDistance;

        let rendered = settings.to_toml();
        assert!(rendered.contains("[mix]"));
        assert!(rendered.contains("[weights]"));
        assert!(rendered.contains("genre_scoring = \"family_distance\""));

        let parsed: MixSettings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_to_toml_escapes_log_level() {
        let settings = MixSettings {
            log_level: r#"mixfinder="debug",C:\logs"#.to_string(),
            ..Default::default()
        };

        let parsed: MixSettings = toml::from_str(&settings.to_toml()).unwrap();
        assert_eq!(parsed.log_level, settings.log_level);
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[mix]\nsame_genre = false\n").unwrap();

        let (settings, sources) = MixSettings::load_with_sources_from(Some(&path)).unwrap();
        assert!(!settings.mix.same_genre);
        assert!(sources.files.contains(&path));
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[weights]\ntempo = -1.0\n").unwrap();

        let err = MixSettings::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }
}
