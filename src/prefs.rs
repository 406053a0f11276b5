// Theme and UI mode preferences

use clap::ValueEnum;
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::storage::{MODE_KEY, Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(eyre!("Unknown theme: {}", other)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cosmetic skin applied on top of the theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Normal,
    Retro,
    Futuristic,
    Neon,
}

impl UiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            UiMode::Normal => "normal",
            UiMode::Retro => "retro",
            UiMode::Futuristic => "futuristic",
            UiMode::Neon => "neon",
        }
    }
}

impl FromStr for UiMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(UiMode::Normal),
            "retro" => Ok(UiMode::Retro),
            "futuristic" => Ok(UiMode::Futuristic),
            "neon" => Ok(UiMode::Neon),
            other => Err(eyre!("Unknown UI mode: {}", other)),
        }
    }
}

impl std::fmt::Display for UiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Theme implied by the terminal's `COLORFGBG` variable, light when unknown
pub fn detect_system_theme() -> Theme {
    let value = std::env::var("COLORFGBG").ok();
    theme_from_colorfgbg(value.as_deref()).unwrap_or_default()
}

/// Parse `COLORFGBG` ("fg;bg" or "fg;default;bg")
///
/// Background indexes 0-6 and 8 are the dark half of the 16-color palette.
pub fn theme_from_colorfgbg(value: Option<&str>) -> Option<Theme> {
    let bg: u8 = value?.rsplit(';').next()?.trim().parse().ok()?;
    Some(if matches!(bg, 0..=6 | 8) { Theme::Dark } else { Theme::Light })
}

/// Independently persisted theme and UI mode
#[derive(Debug)]
pub struct Preferences<S: Storage> {
    storage: S,
    theme: Theme,
    mode: UiMode,
}

impl<S: Storage> Preferences<S> {
    /// Read both settings once; anything missing or invalid falls back to
    /// `system_theme` and [`UiMode::Normal`]
    pub fn load(storage: S, system_theme: Theme) -> Self {
        let theme = read_setting(&storage, THEME_KEY).unwrap_or(system_theme);
        let mode = read_setting(&storage, MODE_KEY).unwrap_or_default();
        debug!(%theme, %mode, "Loaded preferences");

        Self { storage, theme, mode }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        self.storage.set(THEME_KEY, theme.as_str())
    }

    /// Flip light/dark and persist; returns the new theme
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn set_mode(&mut self, mode: UiMode) -> Result<()> {
        self.mode = mode;
        self.storage.set(MODE_KEY, mode.as_str())
    }
}

fn read_setting<S, T>(storage: &S, key: &str) -> Option<T>
where
    S: Storage,
    T: FromStr<Err = eyre::Report>,
{
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = ?e, "Failed to read preference, using default");
            return None;
        }
    };

    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Invalid stored preference, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults_when_absent() {
        let prefs = Preferences::load(MemoryStorage::new(), Theme::Dark);
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.mode(), UiMode::Normal);
    }

    #[test]
    fn test_stored_values_win_over_system_theme() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "light").unwrap();
        storage.set(MODE_KEY, "neon").unwrap();

        let prefs = Preferences::load(&storage, Theme::Dark);
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.mode(), UiMode::Neon);
    }

    #[test]
    fn test_invalid_values_fall_back_independently() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "purple").unwrap();
        storage.set(MODE_KEY, "retro").unwrap();

        let prefs = Preferences::load(&storage, Theme::Dark);
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.mode(), UiMode::Retro);

        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "dark").unwrap();
        storage.set(MODE_KEY, "vaporwave").unwrap();

        let prefs = Preferences::load(&storage, Theme::Light);
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.mode(), UiMode::Normal);
    }

    #[test]
    fn test_setters_persist_immediately() {
        let storage = MemoryStorage::new();
        let mut prefs = Preferences::load(&storage, Theme::Light);

        prefs.set_mode(UiMode::Futuristic).unwrap();
        assert_eq!(storage.get(MODE_KEY).unwrap().as_deref(), Some("futuristic"));
        assert_eq!(storage.get(THEME_KEY).unwrap(), None);

        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        let reloaded = Preferences::load(&storage, Theme::Light);
        assert_eq!(reloaded.theme(), Theme::Dark);
        assert_eq!(reloaded.mode(), UiMode::Futuristic);
    }

    #[test]
    fn test_colorfgbg_parsing() {
        assert_eq!(theme_from_colorfgbg(Some("15;0")), Some(Theme::Dark));
        assert_eq!(theme_from_colorfgbg(Some("0;15")), Some(Theme::Light));
        assert_eq!(theme_from_colorfgbg(Some("12;default;8")), Some(Theme::Dark));
        assert_eq!(theme_from_colorfgbg(Some("0;7")), Some(Theme::Light));
        assert_eq!(theme_from_colorfgbg(Some("garbage")), None);
        assert_eq!(theme_from_colorfgbg(None), None);
    }

    #[test]
    fn test_round_trip_names() {
        for mode in [UiMode::Normal, UiMode::Retro, UiMode::Futuristic, UiMode::Neon] {
            assert_eq!(mode.to_string().parse::<UiMode>().unwrap(), mode);
        }
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("Dark".parse::<Theme>().is_err());
    }
}
