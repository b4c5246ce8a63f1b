//! User settings

use serde::{Deserialize, Serialize};

use crate::mode::DisplayMode;

/// Persisted settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: DisplayMode,
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Hide,
            enabled: true,
        }
    }
}

/// Partial update merged into the stored settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    pub mode: Option<DisplayMode>,
    pub enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn mode(mode: DisplayMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }
}

impl Settings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tolerates_legacy_values() {
        let settings: Settings = serde_json::from_str(r#"{"mode":"invisible"}"#).unwrap();
        assert_eq!(settings, Settings { mode: DisplayMode::Hide, enabled: true });

        let settings: Settings = serde_json::from_str(r#"{"mode":"blur","enabled":false}"#).unwrap();
        assert_eq!(settings.mode, DisplayMode::Blur);
        assert!(!settings.enabled);
    }

    #[test]
    fn test_merge_only_touches_given_fields() {
        let mut settings = Settings::default();
        settings.merge(SettingsPatch::mode(DisplayMode::Dim));
        assert_eq!(settings, Settings { mode: DisplayMode::Dim, enabled: true });
        settings.merge(SettingsPatch::enabled(false));
        assert_eq!(settings, Settings { mode: DisplayMode::Dim, enabled: false });
    }
}
