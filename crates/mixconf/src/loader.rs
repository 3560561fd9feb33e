//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, GenreScoring, MixSettings};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with an explicit override path.
///
/// If `override_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(override_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/mixfinder/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("mixfinder/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = override_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("mixfinder.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Overlay the keys present in a TOML file onto `settings`.
pub fn apply_file(settings: &mut MixSettings, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(settings, &contents, path)
}

/// Overlay the keys present in a TOML document onto `settings`.
pub fn apply_toml(settings: &mut MixSettings, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    if let Some(v) = table.get("log_level") {
        settings.log_level = v
            .as_str()
            .ok_or_else(|| parse_err("log_level must be a string".to_string()))?
            .to_string();
    }

    if let Some(mix) = table.get("mix").and_then(|v| v.as_table()) {
        if let Some(v) = number(mix, "bpm_tolerance").map_err(|m| parse_err(format!("mix.{m}")))? {
            settings.mix.bpm_tolerance = v;
        }
        if let Some(v) = boolean(mix, "harmonic_matching").map_err(|m| parse_err(format!("mix.{m}")))? {
            settings.mix.harmonic_matching = v;
        }
        if let Some(v) = boolean(mix, "same_genre").map_err(|m| parse_err(format!("mix.{m}")))? {
            settings.mix.same_genre = v;
        }
        if let Some(v) = boolean(mix, "maintain_energy").map_err(|m| parse_err(format!("mix.{m}")))? {
            settings.mix.maintain_energy = v;
        }
        if let Some(v) =
            boolean(mix, "allow_half_double_time").map_err(|m| parse_err(format!("mix.{m}")))?
        {
            settings.mix.allow_half_double_time = v;
        }
        if let Some(v) = mix.get("genre_scoring") {
            let raw = v
                .as_str()
                .ok_or_else(|| parse_err("mix.genre_scoring must be a string".to_string()))?;
            settings.mix.genre_scoring = raw
                .parse::<GenreScoring>()
                .map_err(|m| parse_err(format!("mix.genre_scoring: {m}")))?;
        }
    }

    if let Some(weights) = table.get("weights").and_then(|v| v.as_table()) {
        let w = &mut settings.weights;
        for (key, slot) in [
            ("tempo", &mut w.tempo),
            ("key", &mut w.key),
            ("energy", &mut w.energy),
            ("danceability", &mut w.danceability),
            ("genre", &mut w.genre),
        ] {
            if let Some(v) = number(weights, key).map_err(|m| parse_err(format!("weights.{m}")))? {
                *slot = v;
            }
        }
    }

    Ok(())
}

/// Integers are accepted where floats are expected.
fn number(table: &toml::Table, key: &str) -> Result<Option<f64>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::Float(f)) => Ok(Some(*f)),
        Some(toml::Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(_) => Err(format!("{key} must be a number")),
    }
}

fn boolean(table: &toml::Table, key: &str) -> Result<Option<bool>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::Boolean(b)) => Ok(Some(*b)),
        Some(_) => Err(format!("{key} must be a boolean")),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to settings.
pub fn apply_env_overrides(settings: &mut MixSettings, sources: &mut ConfigSources) {
    apply_overrides_from(settings, sources, |name| env::var(name).ok());
}

fn apply_overrides_from(
    settings: &mut MixSettings,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("MIXFINDER_BPM_TOLERANCE") {
        match v.trim().parse::<f64>() {
            Ok(tolerance) => {
                settings.mix.bpm_tolerance = tolerance;
                sources.env_overrides.push("MIXFINDER_BPM_TOLERANCE".to_string());
            }
            Err(_) => warn!(value = %v, "ignoring unparseable MIXFINDER_BPM_TOLERANCE"),
        }
    }

    let flags: [(&str, &mut bool); 4] = [
        ("MIXFINDER_HARMONIC_MATCHING", &mut settings.mix.harmonic_matching),
        ("MIXFINDER_SAME_GENRE", &mut settings.mix.same_genre),
        ("MIXFINDER_MAINTAIN_ENERGY", &mut settings.mix.maintain_energy),
        ("MIXFINDER_ALLOW_HALF_DOUBLE_TIME", &mut settings.mix.allow_half_double_time),
    ];
    for (name, slot) in flags {
        let Some(v) = lookup(name) else { continue };
        match parse_flag(&v) {
            Some(flag) => {
                *slot = flag;
                sources.env_overrides.push(name.to_string());
            }
            None => warn!(variable = name, value = %v, "ignoring unparseable boolean override"),
        }
    }

    if let Some(v) = lookup("MIXFINDER_GENRE_SCORING") {
        match v.parse::<GenreScoring>() {
            Ok(scoring) => {
                settings.mix.genre_scoring = scoring;
                sources.env_overrides.push("MIXFINDER_GENRE_SCORING".to_string());
            }
            Err(e) => warn!(error = %e, "ignoring MIXFINDER_GENRE_SCORING"),
        }
    }

    if let Some(v) = lookup("MIXFINDER_LOG_LEVEL") {
        settings.log_level = v;
        sources.env_overrides.push("MIXFINDER_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        settings.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}
