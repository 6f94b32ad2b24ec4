use super::Color;
use serde::{Deserialize, Serialize};

/// A span of text carrying one uniform set of inline annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    pub content: String,
    pub annotations: Annotations,
    pub link: Option<Link>,
}

impl RichTextItem {
    /// Create a plain text item, the most common rich text variant.
    ///
    /// ```ignore
    /// RichTextItem::plain_text("hello")
    /// ```
    pub fn plain_text(text: &str) -> Self {
        Self {
            content: text.to_string(),
            annotations: Annotations::default(),
            link: None,
        }
    }

    /// Create a text item with the given annotations.
    pub fn styled(text: &str, annotations: Annotations) -> Self {
        Self {
            content: text.to_string(),
            annotations,
            link: None,
        }
    }

    /// Create a hyperlink item.
    pub fn linked(text: &str, url: &str) -> Self {
        Self {
            content: text.to_string(),
            annotations: Annotations::default(),
            link: Some(Link {
                url: url.to_string(),
            }),
        }
    }

    /// Whether two items can be merged into one run without losing formatting.
    pub fn same_style(&self, other: &RichTextItem) -> bool {
        self.annotations == other.annotations && self.link == other.link
    }
}

/// Concatenates the text of a run sequence, ignoring formatting.
pub fn plain_text_of(runs: &[RichTextItem]) -> String {
    runs.iter().map(|run| run.content.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

impl Annotations {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn underline() -> Self {
        Self {
            underline: true,
            ..Self::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: true,
            ..Self::default()
        }
    }

    pub fn code() -> Self {
        Self {
            code: true,
            ..Self::default()
        }
    }

    /// Union of two flag sets; the other side's color wins when set.
    pub fn merge(self, other: Annotations) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            strikethrough: self.strikethrough || other.strikethrough,
            underline: self.underline || other.underline,
            code: self.code || other.code,
            color: if other.color == Color::Default {
                self.color
            } else {
                other.color
            },
        }
    }

    /// Same flags, different color.
    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Whether no flag is set and the color is the default one.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}
