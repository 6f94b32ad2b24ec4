// src/api/mod.rs
//! Notion API interaction: reading and writing pages and blocks.
//!
//! Business logic depends on the `NotionRepository` trait, never on HTTP
//! details, so tests can substitute an in-memory workspace.

pub mod client;
pub mod notion_client_adapter;
pub mod parser;
pub mod payload;
mod responses;
mod simple_pagination;
mod types;

use crate::error::AppError;
use crate::model::{Block, Page, PageTitle};
use crate::types::{BlockId, NotionId, PageId};

/// The remote document store.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Page metadata: title, parent, archive state.
    async fn retrieve_page(&self, id: &PageId) -> Result<Page, AppError>;

    /// Direct children of a page or block, across all result pages.
    /// Grandchildren are not fetched; their parents report `has_children`.
    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError>;

    /// Creates a page under `parent` with the given content.
    async fn create_page(
        &self,
        parent: &PageId,
        title: &str,
        children: &[Block],
    ) -> Result<PageId, AppError>;

    async fn update_page_title(&self, id: &PageId, title: &str) -> Result<(), AppError>;

    async fn archive_page(&self, id: &PageId) -> Result<(), AppError>;

    /// Appends blocks (and their nested children) after the parent's
    /// existing children.
    async fn append_children(&self, parent: &NotionId, children: &[Block]) -> Result<(), AppError>;

    async fn archive_block(&self, id: &BlockId) -> Result<(), AppError>;

    /// A page's title, or "Untitled" when it cannot be fetched.
    async fn page_title(&self, id: &PageId) -> PageTitle {
        match self.retrieve_page(id).await {
            Ok(page) => page.title,
            Err(e) => {
                log::warn!("Could not fetch title of page {}: {}", id, e);
                PageTitle::untitled()
            }
        }
    }
}

pub use client::NotionHttpClient;
pub use types::{PaginatedResponse, PaginationResult};
