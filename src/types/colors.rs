use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe color enum instead of strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    LightGray,
    LightBrown,
    LightRed,
    LightOrange,
    LightYellow,
    LightGreen,
    LightBlue,
    LightPurple,
    LightPink,
}

impl std::str::FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Color::Default),
            "gray" | "grey" => Ok(Color::Gray),
            "brown" => Ok(Color::Brown),
            "red" => Ok(Color::Red),
            "orange" => Ok(Color::Orange),
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "purple" => Ok(Color::Purple),
            "pink" => Ok(Color::Pink),
            "gray_background" | "light_gray" => Ok(Color::LightGray),
            "brown_background" | "light_brown" => Ok(Color::LightBrown),
            "red_background" | "light_red" => Ok(Color::LightRed),
            "orange_background" | "light_orange" => Ok(Color::LightOrange),
            "yellow_background" | "light_yellow" => Ok(Color::LightYellow),
            "green_background" | "light_green" => Ok(Color::LightGreen),
            "blue_background" | "light_blue" => Ok(Color::LightBlue),
            "purple_background" | "light_purple" => Ok(Color::LightPurple),
            "pink_background" | "light_pink" => Ok(Color::LightPink),
            _ => Err(ValidationError::InvalidColor(s.to_string())),
        }
    }
}

impl Color {
    /// Convert to the Notion API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::Gray => "gray",
            Color::Brown => "brown",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Pink => "pink",
            Color::LightGray => "gray_background",
            Color::LightBrown => "brown_background",
            Color::LightRed => "red_background",
            Color::LightOrange => "orange_background",
            Color::LightYellow => "yellow_background",
            Color::LightGreen => "green_background",
            Color::LightBlue => "blue_background",
            Color::LightPurple => "purple_background",
            Color::LightPink => "pink_background",
        }
    }

    /// Check if this is a background color
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Color::LightGray
                | Color::LightBrown
                | Color::LightRed
                | Color::LightOrange
                | Color::LightYellow
                | Color::LightGreen
                | Color::LightBlue
                | Color::LightPurple
                | Color::LightPink
        )
    }

    /// The CSS color keyword shared by a foreground color and its background twin.
    ///
    /// Every Notion color name is also a CSS named color, which is what lets
    /// the inline `style` attribute round-trip.
    pub fn css_name(&self) -> &'static str {
        match self {
            Color::Default => "inherit",
            Color::Gray | Color::LightGray => "gray",
            Color::Brown | Color::LightBrown => "brown",
            Color::Red | Color::LightRed => "red",
            Color::Orange | Color::LightOrange => "orange",
            Color::Yellow | Color::LightYellow => "yellow",
            Color::Green | Color::LightGreen => "green",
            Color::Blue | Color::LightBlue => "blue",
            Color::Purple | Color::LightPurple => "purple",
            Color::Pink | Color::LightPink => "pink",
        }
    }

    /// The background twin of a foreground color.
    pub fn to_background(self) -> Self {
        match self {
            Color::Gray => Color::LightGray,
            Color::Brown => Color::LightBrown,
            Color::Red => Color::LightRed,
            Color::Orange => Color::LightOrange,
            Color::Yellow => Color::LightYellow,
            Color::Green => Color::LightGreen,
            Color::Blue => Color::LightBlue,
            Color::Purple => Color::LightPurple,
            Color::Pink => Color::LightPink,
            other => other,
        }
    }

    /// Resolves a CSS color value as written by the editor.
    ///
    /// Accepts `hsl(...)` (mapped by hue), Notion color names and the CSS
    /// keywords they share. Anything else is `Color::Default`.
    pub fn from_css(value: &str) -> Self {
        let value = value.trim().trim_end_matches(';').trim().to_ascii_lowercase();
        if value.starts_with("hsl") {
            return hsl_to_notion_color(&value);
        }
        value.parse().unwrap_or(Color::Default)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps an editor `hsl(h, s%, l%)` color onto the closest Notion palette entry.
///
/// Low saturation reads as gray and dark low-hue tones as brown; everything
/// else is bucketed by hue. Unparseable input yields `Color::Default`.
pub fn hsl_to_notion_color(css: &str) -> Color {
    lazy_static::lazy_static! {
        static ref HSL_REGEX: Regex = Regex::new(
            r"(?i)^\s*hsl\(\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)%\s*,\s*(\d+(?:\.\d+)?)%\s*\)\s*;?\s*$"
        ).expect("Failed to compile HSL regex - this is a bug in the code");
    }

    let Some(captures) = HSL_REGEX.captures(css) else {
        log::debug!("Unrecognized HSL color: {}", css);
        return Color::Default;
    };

    let component = |index: usize| -> Option<f64> { captures.get(index)?.as_str().parse().ok() };
    let (Some(hue), Some(saturation), Some(lightness)) = (component(1), component(2), component(3))
    else {
        return Color::Default;
    };
    let hue = hue % 360.0;

    if saturation < 10.0 {
        return Color::Gray;
    }
    if (20.0..=40.0).contains(&hue) && saturation >= 30.0 && lightness <= 50.0 {
        return Color::Brown;
    }

    match hue {
        h if h <= 15.0 || h >= 345.0 => Color::Red,
        h if (16.0..=45.0).contains(&h) => Color::Orange,
        h if (46.0..=65.0).contains(&h) => Color::Yellow,
        h if (66.0..=165.0).contains(&h) => Color::Green,
        h if (166.0..=255.0).contains(&h) => Color::Blue,
        h if (256.0..=290.0).contains(&h) => Color::Purple,
        h if (291.0..=344.0).contains(&h) => Color::Pink,
        _ => Color::Default,
    }
}
