// src/workspace.rs
//! Page operations behind the editor: viewing, saving and restructuring
//! pages while keeping the page tree in step.
//!
//! Writes go to the remote store first. The tree cache is only touched once
//! a write has succeeded, and a failed write leaves it unchanged.

use crate::api::{payload, NotionRepository};
use crate::constants::DUPLICATE_TITLE_SUFFIX;
use crate::error::AppError;
use crate::html::{self, ConversionOptions};
use crate::model::Block;
use crate::tree::{PageNode, PageTreeCache};
use crate::types::{NotionId, PageId};
use std::sync::Arc;

pub struct Workspace {
    repo: Arc<dyn NotionRepository>,
    cache: Arc<PageTreeCache>,
    options: ConversionOptions,
}

impl Workspace {
    pub fn new(
        repo: Arc<dyn NotionRepository>,
        cache: Arc<PageTreeCache>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            repo,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &PageTreeCache {
        &self.cache
    }

    /// Editor markup for a page's content.
    pub async fn page_html(&self, id: &PageId) -> Result<String, AppError> {
        html::page_document(self.repo.as_ref(), id).await
    }

    /// Replaces a page's content with the blocks parsed from `html`.
    ///
    /// Existing blocks are archived first, except child pages, which stay
    /// attached to the page. Returns the number of top-level blocks written.
    pub async fn save_page_html(&self, id: &PageId, html: &str) -> Result<usize, AppError> {
        let blocks = html::blocks_from_document(html, &self.options);
        let page = NotionId::from(id);

        let existing = self
            .repo
            .retrieve_children(&page)
            .await
            .inspect_err(|e| log::error!("Failed to list content of page {}: {}", id, e))?;

        let mut archived = 0;
        for block in &existing {
            if matches!(block, Block::ChildPage(_)) {
                continue;
            }
            if let Some(block_id) = block.id() {
                self.repo
                    .archive_block(block_id)
                    .await
                    .inspect_err(|e| log::error!("Failed to archive block {}: {}", block_id, e))?;
                archived += 1;
            }
        }

        self.repo
            .append_children(&page, &blocks)
            .await
            .inspect_err(|e| log::error!("Failed to write content of page {}: {}", id, e))?;

        let written = payload::blocks_payload(&blocks).len();
        log::info!(
            "Saved page {}: archived {} blocks, wrote {}",
            id,
            archived,
            written
        );
        Ok(written)
    }

    /// Creates an empty page under `parent` and refreshes the parent's
    /// listing in the tree.
    pub async fn create_sub_page(&self, parent: &PageId, title: &str) -> Result<PageId, AppError> {
        let id = self
            .repo
            .create_page(parent, title, &[])
            .await
            .inspect_err(|e| log::error!("Failed to create page under {}: {}", parent, e))?;
        self.cache.refresh_children(parent).await;
        Ok(id)
    }

    pub async fn rename_page(&self, id: &PageId, title: &str) -> Result<(), AppError> {
        self.repo
            .update_page_title(id, title)
            .await
            .inspect_err(|e| log::error!("Failed to rename page {}: {}", id, e))?;
        self.cache.backfill_ancestors(id).await;
        self.cache.rename(id, title);
        Ok(())
    }

    /// Archives a page and drops it from its parent's listing.
    pub async fn delete_page(&self, id: &PageId) -> Result<(), AppError> {
        // resolved up front: an archived page may no longer be retrievable
        let parent = self.cache.find_parent(id).await;

        self.repo
            .archive_page(id)
            .await
            .inspect_err(|e| log::error!("Failed to archive page {}: {}", id, e))?;

        if let Some(parent) = parent {
            self.cache.refresh_children(&parent.id).await;
        }
        Ok(())
    }

    /// Copies a page next to itself: same parent, title suffixed with
    /// " (copy)", full block tree. Child pages are not copied.
    pub async fn duplicate_page(&self, id: &PageId) -> Result<PageId, AppError> {
        let page = self.repo.retrieve_page(id).await?;
        let parent = page.parent_page().cloned().ok_or_else(|| {
            AppError::Validation(format!(
                "Page {} has no parent page to place a copy under",
                id
            ))
        })?;

        let mut blocks = self.repo.retrieve_children(&NotionId::from(id)).await?;
        html::hydrate_children(self.repo.as_ref(), &mut blocks).await;

        let title = format!("{}{}", page.title, DUPLICATE_TITLE_SUFFIX);
        let copy = self
            .repo
            .create_page(&parent, &title, &blocks)
            .await
            .inspect_err(|e| log::error!("Failed to duplicate page {}: {}", id, e))?;

        self.cache.refresh_children(&parent).await;
        Ok(copy)
    }

    /// Sub-pages of a page, from the tree cache.
    pub async fn sub_pages(&self, id: &PageId) -> Vec<PageNode> {
        self.cache.get_children(id).await
    }
}
