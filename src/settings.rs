// ── Persisted settings ────────────────────────────────────────────────────────
//
// Reads and writes `settings.json` in the application folder.
// No `unsafe`: pure safe Rust + serde_json.
//
// Every field carries a serde default, so a partial file merges over the
// defaults and unknown keys are ignored.

use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{QuillError, Result};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Font family entry that defers to `full_font_family`.
pub(crate) const MORE_FONTS: &str = "More Fonts...";

// ── On-disk type ──────────────────────────────────────────────────────────────

/// Flat key-value configuration, one field per setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) font_family: String,
    /// Only consulted when `font_family` is [`MORE_FONTS`].
    pub(crate) full_font_family: String,
    pub(crate) font_size: u32,
    pub(crate) theme: String,
    /// Seconds between autosave ticks.
    #[serde(deserialize_with = "whole_seconds")]
    pub(crate) autosave_interval: u64,
    pub(crate) max_char_width: u32,
    /// Caret line as a fraction of the viewport height.
    pub(crate) typewriter_position: f64,
    pub(crate) custom_bg: String,
    pub(crate) custom_fg: String,
    pub(crate) show_word_count: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: "Consolas".to_owned(),
            full_font_family: String::new(),
            font_size: 16,
            theme: "nord".to_owned(),
            autosave_interval: 10,
            max_char_width: 50,
            typewriter_position: 0.55,
            custom_bg: "#222222".to_owned(),
            custom_fg: "#eaeaea".to_owned(),
            show_word_count: false,
        }
    }
}

impl Settings {
    /// Reject values an "apply settings" action must not accept.
    ///
    /// The message names the first offending key.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.font_size == 0 {
            return Err(invalid("font_size must be at least 1"));
        }
        if self.autosave_interval == 0 {
            return Err(invalid("autosave_interval must be at least 1 second"));
        }
        if self.max_char_width == 0 {
            return Err(invalid("max_char_width must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.typewriter_position) {
            return Err(invalid("typewriter_position must be between 0 and 1"));
        }
        if self.theme == "custom" {
            for (key, value) in [("custom_bg", &self.custom_bg), ("custom_fg", &self.custom_fg)] {
                if !is_hex_colour(value) {
                    return Err(invalid(&format!("{key} must look like #rrggbb, got {value:?}")));
                }
            }
        }
        Ok(())
    }
}

/// Copy of `base` with one key replaced.
///
/// `raw` is read as JSON when it parses (`16`, `true`, `0.6`) and as a
/// plain string otherwise, so `theme sepia` works without quotes.  The
/// result is not validated.
pub(crate) fn with_override(base: &Settings, key: &str, raw: &str) -> Result<Settings> {
    let Value::Object(mut map) = serde_json::to_value(base)? else {
        return Err(invalid("settings are not a key-value map"));
    };
    if !map.contains_key(key) {
        return Err(invalid(&format!("unknown setting {key:?}")));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    map.insert(key.to_owned(), value);
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// Seconds as a whole number.  A fractional value such as `2.5` is rounded
/// up, and never below one second.
fn whole_seconds<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(u64),
        Fraction(f64),
    }

    match Seconds::deserialize(de)? {
        Seconds::Whole(n) => Ok(n),
        Seconds::Fraction(f) if f.is_finite() && f >= 0.0 => Ok((f.ceil() as u64).max(1)),
        Seconds::Fraction(f) => Err(serde::de::Error::custom(format!("invalid interval {f}"))),
    }
}

/// Lay the keys of `file` over the defaults one at a time.
///
/// Unknown keys are ignored.  A key whose value does not fit its field keeps
/// the default and the remaining keys still apply.
fn merge_over_defaults(file: Map<String, Value>) -> Settings {
    let defaults = Settings::default();
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
        return defaults;
    };
    for (key, value) in file {
        let Some(previous) = merged.get(&key).cloned() else {
            continue;
        };
        merged.insert(key.clone(), value);
        if let Err(e) = serde_json::from_value::<Settings>(Value::Object(merged.clone())) {
            tracing::warn!(%key, error = %e, "ignoring setting");
            merged.insert(key, previous);
        }
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
}

fn invalid(message: &str) -> QuillError {
    QuillError::InvalidSettings(message.to_owned())
}

/// `#rrggbb`, case-insensitive.
pub(crate) fn is_hex_colour(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Owns the location of the settings file.
pub(crate) struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read and merge the settings file over the defaults.
    ///
    /// Never fails: a missing file or malformed JSON yields the defaults, and
    /// a single ill-typed key falls back on its own.
    pub(crate) fn load(&self) -> Settings {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                return Settings::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings unreadable, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_slice::<Map<String, Value>>(&data) {
            Ok(file) => merge_over_defaults(file),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings malformed, using defaults");
                Settings::default()
            }
        }
    }

    /// Persist `settings` as pretty JSON.
    ///
    /// Failures are logged and swallowed; editing must never be blocked by a
    /// settings write.
    pub(crate) fn save(&self, settings: &Settings) {
        if let Err(e) = self.try_save(settings) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not save settings");
        }
    }

    fn try_save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
