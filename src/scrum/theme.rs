//! Display theme attached to a scrum.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Bubblegum,
    Buttercup,
    Indigo,
    Lavender,
    Magenta,
    Navy,
    Orange,
    Oxblood,
    Periwinkle,
    Poppy,
    Purple,
    #[default]
    Seafoam,
    Sky,
    Tan,
    Teal,
    Yellow,
}

impl Theme {
    pub const ALL: [Theme; 16] = [
        Self::Bubblegum,
        Self::Buttercup,
        Self::Indigo,
        Self::Lavender,
        Self::Magenta,
        Self::Navy,
        Self::Orange,
        Self::Oxblood,
        Self::Periwinkle,
        Self::Poppy,
        Self::Purple,
        Self::Seafoam,
        Self::Sky,
        Self::Tan,
        Self::Teal,
        Self::Yellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bubblegum => "bubblegum",
            Self::Buttercup => "buttercup",
            Self::Indigo => "indigo",
            Self::Lavender => "lavender",
            Self::Magenta => "magenta",
            Self::Navy => "navy",
            Self::Orange => "orange",
            Self::Oxblood => "oxblood",
            Self::Periwinkle => "periwinkle",
            Self::Poppy => "poppy",
            Self::Purple => "purple",
            Self::Seafoam => "seafoam",
            Self::Sky => "sky",
            Self::Tan => "tan",
            Self::Teal => "teal",
            Self::Yellow => "yellow",
        }
    }

    /// Capitalized name for display, e.g. "Seafoam".
    pub fn name(&self) -> String {
        let raw = self.as_str();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Text colour that stays readable on top of the theme colour.
    pub fn accent_color(&self) -> &'static str {
        match self {
            Self::Indigo | Self::Magenta | Self::Navy | Self::Oxblood | Self::Purple => "white",
            _ => "black",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        match Self::ALL.iter().find(|theme| theme.as_str() == wanted) {
            Some(theme) => Ok(*theme),
            None => bail!("Unknown theme: {}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_name_is_capitalized() {
        assert_eq!(Theme::Seafoam.name(), "Seafoam");
        assert_eq!(Theme::Oxblood.name(), "Oxblood");
    }

    #[test]
    fn test_theme_accent_color() {
        assert_eq!(Theme::Navy.accent_color(), "white");
        assert_eq!(Theme::Purple.accent_color(), "white");
        assert_eq!(Theme::Yellow.accent_color(), "black");
        assert_eq!(Theme::Sky.accent_color(), "black");
    }

    #[test]
    fn test_theme_parse_case_insensitive() {
        assert_eq!("Poppy".parse::<Theme>().unwrap(), Theme::Poppy);
        assert_eq!(" teal ".parse::<Theme>().unwrap(), Theme::Teal);
        assert!("mauve".parse::<Theme>().is_err());
    }

    #[test]
    fn test_theme_serialization() {
        let json = serde_json::to_string(&Theme::Periwinkle).unwrap();
        assert_eq!(json, "\"periwinkle\"");

        let parsed: Theme = serde_json::from_str("\"tan\"").unwrap();
        assert_eq!(parsed, Theme::Tan);
    }

    #[test]
    fn test_all_themes_round_trip_through_str() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>().unwrap(), theme);
        }
    }
}
