//! Display modes and their marker styles

use quell_dom::ElementData;
use serde::{Deserialize, Serialize};

/// Attribute carrying the mode on every marker element
pub const MODE_ATTR: &str = "data-mode";

/// Style properties owned by the modes; cleared before each restyle
const MODE_PROPERTIES: [&str; 3] = ["display", "filter", "opacity"];

/// How blocked emoji are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DisplayMode {
    #[default]
    Hide,
    Desaturate,
    Dim,
    Blur,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [Self::Hide, Self::Desaturate, Self::Dim, Self::Blur];

    /// Decode a mode name; anything unrecognised is `Hide`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "desaturate" => Self::Desaturate,
            "dim" => Self::Dim,
            "blur" => Self::Blur,
            _ => Self::Hide,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Desaturate => "desaturate",
            Self::Dim => "dim",
            Self::Blur => "blur",
        }
    }

    /// Fixed style record for this mode
    pub fn style(self) -> MarkerStyle {
        match self {
            Self::Hide => MarkerStyle {
                display: Some("none"),
                filter: None,
                opacity: None,
            },
            Self::Desaturate => MarkerStyle {
                display: None,
                filter: Some("grayscale(100%) contrast(0.8) brightness(1.1)"),
                opacity: Some(0.5),
            },
            Self::Dim => MarkerStyle {
                display: None,
                filter: Some("grayscale(60%) brightness(1.1)"),
                opacity: Some(0.35),
            },
            Self::Blur => MarkerStyle {
                display: None,
                filter: Some("blur(3px) grayscale(50%)"),
                opacity: Some(0.7),
            },
        }
    }
}

impl From<String> for DisplayMode {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual properties applied to a marker element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub display: Option<&'static str>,
    pub filter: Option<&'static str>,
    pub opacity: Option<f32>,
}

/// Stamp `mode` onto a marker: mode attribute plus a fresh style
pub fn apply_mode(elem: &mut ElementData, mode: DisplayMode) {
    elem.set_attr(MODE_ATTR, mode.as_str());

    for property in MODE_PROPERTIES {
        elem.style.remove(property);
    }
    let style = mode.style();
    if let Some(display) = style.display {
        elem.style.set("display", display);
    }
    if let Some(filter) = style.filter {
        elem.style.set("filter", filter);
    }
    if let Some(opacity) = style.opacity {
        elem.style.set("opacity", opacity.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_names_fall_back_to_hide() {
        assert_eq!(DisplayMode::from_name("blur"), DisplayMode::Blur);
        assert_eq!(DisplayMode::from_name(" DIM "), DisplayMode::Dim);
        assert_eq!(DisplayMode::from_name("sparkle"), DisplayMode::Hide);
        assert_eq!(DisplayMode::from_name(""), DisplayMode::Hide);
    }

    #[test]
    fn test_serde_lenient_decode() {
        let mode: DisplayMode = serde_json::from_str("\"desaturate\"").unwrap();
        assert_eq!(mode, DisplayMode::Desaturate);
        let legacy: DisplayMode = serde_json::from_str("\"invisible\"").unwrap();
        assert_eq!(legacy, DisplayMode::Hide);
        assert_eq!(serde_json::to_string(&DisplayMode::Dim).unwrap(), "\"dim\"");
    }

    #[test]
    fn test_name_round_trip() {
        for mode in DisplayMode::ALL {
            assert_eq!(DisplayMode::from_name(mode.as_str()), mode);
        }
    }

    #[test]
    fn test_apply_mode_clears_previous_properties() {
        let mut elem = ElementData::new("span");
        apply_mode(&mut elem, DisplayMode::Hide);
        assert_eq!(elem.style.get("display"), Some("none"));
        assert_eq!(elem.attr(MODE_ATTR), Some("hide"));

        apply_mode(&mut elem, DisplayMode::Desaturate);
        assert_eq!(elem.style.get("display"), None);
        assert_eq!(
            elem.style.get("filter"),
            Some("grayscale(100%) contrast(0.8) brightness(1.1)")
        );
        assert_eq!(elem.style.get("opacity"), Some("0.5"));
        assert_eq!(elem.attr(MODE_ATTR), Some("desaturate"));

        apply_mode(&mut elem, DisplayMode::Hide);
        assert_eq!(elem.style.get("filter"), None);
        assert_eq!(elem.style.get("opacity"), None);
        assert_eq!(elem.style.len(), 1);
    }

    #[test]
    fn test_apply_mode_keeps_unrelated_style() {
        let mut elem = ElementData::new("span");
        elem.style.set("color", "red");
        apply_mode(&mut elem, DisplayMode::Blur);
        assert_eq!(elem.style.get("color"), Some("red"));
        assert_eq!(elem.style.get("opacity"), Some("0.7"));
    }
}
