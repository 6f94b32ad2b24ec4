mod block;
pub mod blocks;
pub mod common;

pub use block::{Block, BlockKind};
pub use blocks::*;
pub use common::*;

use crate::constants::UNTITLED_PAGE;
use crate::types::{BlockId, DatabaseId, PageId};
use serde::{Deserialize, Serialize};

/// A Notion page, as far as navigation needs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: PageTitle,
    pub url: String,
    pub parent: Option<Parent>,
    pub archived: bool,
}

impl Page {
    /// Get the page title
    pub fn title(&self) -> &PageTitle {
        &self.title
    }

    /// The parent page, when this page sits directly under another page.
    ///
    /// Pages under a database, a block or the workspace root have none.
    pub fn parent_page(&self) -> Option<&PageId> {
        match &self.parent {
            Some(Parent::Page { page_id }) => Some(page_id),
            _ => None,
        }
    }
}

/// Parent reference with typed IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
    #[serde(rename = "block_id")]
    Block { block_id: BlockId },
    #[serde(rename = "workspace")]
    Workspace,
}

/// Page title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTitle(String);

impl PageTitle {
    /// Creates a title; blank titles read as "Untitled".
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        if title.trim().is_empty() {
            Self::untitled()
        } else {
            Self(title)
        }
    }

    pub fn untitled() -> Self {
        Self(UNTITLED_PAGE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PageTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_reads_untitled() {
        assert_eq!(PageTitle::new("  ").as_str(), "Untitled");
        assert_eq!(PageTitle::new("Roadmap").as_str(), "Roadmap");
    }

    #[test]
    fn test_parent_page_only_for_page_parents() {
        let parent_id = PageId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let mut page = Page {
            id: PageId::new_v4(),
            title: PageTitle::new("Child"),
            url: String::new(),
            parent: Some(Parent::Page {
                page_id: parent_id.clone(),
            }),
            archived: false,
        };
        assert_eq!(page.parent_page(), Some(&parent_id));

        page.parent = Some(Parent::Workspace);
        assert_eq!(page.parent_page(), None);
    }
}
