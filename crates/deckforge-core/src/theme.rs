use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Color;

/// Built-in consulting-style palettes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Mckinsey,
    Bcg,
    Bain,
    Deloitte,
}

impl FromStr for ThemeName {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mckinsey" => Ok(Self::Mckinsey),
            "bcg" => Ok(Self::Bcg),
            "bain" => Ok(Self::Bain),
            "deloitte" => Ok(Self::Deloitte),
            _ => Err(()),
        }
    }
}

impl ThemeName {
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Mckinsey,
        ThemeName::Bcg,
        ThemeName::Bain,
        ThemeName::Deloitte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Mckinsey => "mckinsey",
            ThemeName::Bcg => "bcg",
            ThemeName::Bain => "bain",
            ThemeName::Deloitte => "deloitte",
        }
    }
}

/// Colour roles shared by every slide template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub text: Color,
    pub subtext: Color,
    pub background: Color,
    pub white: Color,
}

impl Palette {
    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Mckinsey => Palette {
                primary: Color::rgb(0, 32, 96),
                secondary: Color::rgb(0, 102, 204),
                accent: Color::rgb(0, 145, 220),
                success: Color::rgb(0, 164, 153),
                warning: Color::rgb(255, 186, 8),
                danger: Color::rgb(211, 47, 47),
                text: Color::rgb(51, 51, 51),
                subtext: Color::rgb(117, 117, 117),
                background: Color::rgb(248, 248, 248),
                white: Color::WHITE,
            },
            ThemeName::Bcg => Palette {
                primary: Color::rgb(0, 128, 0),
                secondary: Color::rgb(0, 155, 119),
                accent: Color::rgb(0, 176, 80),
                success: Color::rgb(76, 175, 80),
                warning: Color::rgb(255, 152, 0),
                danger: Color::rgb(244, 67, 54),
                text: Color::rgb(33, 33, 33),
                subtext: Color::rgb(97, 97, 97),
                background: Color::rgb(250, 250, 250),
                white: Color::WHITE,
            },
            ThemeName::Bain => Palette {
                primary: Color::rgb(237, 28, 36),
                secondary: Color::rgb(255, 102, 102),
                accent: Color::rgb(255, 138, 128),
                success: Color::rgb(102, 187, 106),
                warning: Color::rgb(255, 167, 38),
                danger: Color::rgb(229, 57, 53),
                text: Color::rgb(66, 66, 66),
                subtext: Color::rgb(117, 117, 117),
                background: Color::rgb(253, 253, 253),
                white: Color::WHITE,
            },
            ThemeName::Deloitte => Palette {
                primary: Color::rgb(0, 118, 168),
                secondary: Color::rgb(98, 181, 229),
                accent: Color::rgb(0, 167, 103),
                success: Color::rgb(127, 186, 0),
                warning: Color::rgb(255, 205, 0),
                danger: Color::rgb(218, 41, 28),
                text: Color::rgb(38, 38, 38),
                subtext: Color::rgb(117, 117, 117),
                background: Color::rgb(247, 247, 247),
                white: Color::WHITE,
            },
        }
    }

    /// Cycles primary, secondary, accent, success, warning.
    pub fn series_color(&self, i: usize) -> Color {
        let cycle = [
            self.primary,
            self.secondary,
            self.accent,
            self.success,
            self.warning,
        ];
        cycle[i % cycle.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::named(ThemeName::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        for name in ThemeName::ALL {
            assert_eq!(name.as_str().to_uppercase().parse::<ThemeName>(), Ok(name));
        }
        assert!("accenture".parse::<ThemeName>().is_err());
    }

    #[test]
    fn series_colors_cycle() {
        let p = Palette::named(ThemeName::Bcg);
        assert_eq!(p.series_color(0), p.primary);
        assert_eq!(p.series_color(5), p.primary);
        assert_eq!(p.series_color(7), p.accent);
    }
}
