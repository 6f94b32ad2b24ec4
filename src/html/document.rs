// src/html/document.rs
//! Whole-document conversion in both directions.

use super::dom::child_elements;
use super::parse::block_from_element;
use super::render::render_blocks;
use super::ConversionOptions;
use crate::api::NotionRepository;
use crate::constants::NOTION_MAX_FETCH_DEPTH;
use crate::error::AppError;
use crate::model::Block;
use crate::types::{NotionId, PageId};
use futures::future::{join_all, BoxFuture, FutureExt};
use scraper::Html;
use std::collections::HashMap;

/// Converts an editor document into blocks.
///
/// Only top-level elements are considered; loose top-level text is dropped.
pub fn blocks_from_document(html: &str, options: &ConversionOptions) -> Vec<Block> {
    let fragment = Html::parse_fragment(html);
    let blocks: Vec<Block> = child_elements(&fragment.root_element())
        .flat_map(|element| block_from_element(element, options))
        .collect();

    log::debug!(
        "Converted document ({} bytes) into {} top-level blocks",
        html.len(),
        blocks.len()
    );
    blocks
}

/// Renders blocks into an editor document, first fetching every subtree the
/// repository still holds and resolving page-link titles.
pub async fn document_from_blocks(
    repo: &dyn NotionRepository,
    mut blocks: Vec<Block>,
) -> Result<String, AppError> {
    hydrate_children(repo, &mut blocks).await;
    resolve_link_titles(repo, &mut blocks).await;
    render_blocks(&blocks)
}

/// The editor document for a page's content.
///
/// A failure to list the page's blocks renders as an inline error message
/// instead of failing the whole view.
pub async fn page_document(repo: &dyn NotionRepository, page_id: &PageId) -> Result<String, AppError> {
    match repo.retrieve_children(&NotionId::from(page_id)).await {
        Ok(blocks) => document_from_blocks(repo, blocks).await,
        Err(e) => {
            log::error!("Failed to fetch content of page {}: {}", page_id, e);
            Ok(format!(
                "<p>[Error fetching block content: {}]</p>",
                html_escape::encode_text(&e.to_string())
            ))
        }
    }
}

/// Fetches children for every block that has them remotely but not locally.
///
/// Child pages are links, not content, and are never expanded. A failed
/// fetch leaves that block childless and is logged.
pub async fn hydrate_children(repo: &dyn NotionRepository, blocks: &mut [Block]) {
    join_all(
        blocks
            .iter_mut()
            .map(|block| hydrate_block(repo, block, 0)),
    )
    .await;
}

fn hydrate_block<'a>(
    repo: &'a dyn NotionRepository,
    block: &'a mut Block,
    depth: u8,
) -> BoxFuture<'a, ()> {
    async move {
        if block.common().has_unfetched_children() && !matches!(block, Block::ChildPage(_)) {
            if depth >= NOTION_MAX_FETCH_DEPTH {
                log::warn!(
                    "Maximum fetch depth {} reached; children of {} block left unfetched",
                    NOTION_MAX_FETCH_DEPTH,
                    block.block_type()
                );
                return;
            }

            let children = match block.id() {
                Some(id) => match repo.retrieve_children(&NotionId::from(id)).await {
                    Ok(children) => children,
                    Err(e) => {
                        log::warn!("Failed to fetch children of block {}: {}", id, e);
                        Vec::new()
                    }
                },
                None => Vec::new(),
            };
            block.set_children(children);
        }

        join_all(
            block
                .children_mut()
                .iter_mut()
                .map(|child| hydrate_block(repo, child, depth + 1)),
        )
        .await;
    }
    .boxed()
}

/// Fills in titles of `link_to_page` blocks that have none.
async fn resolve_link_titles(repo: &dyn NotionRepository, blocks: &mut [Block]) {
    let mut targets = Vec::new();
    collect_untitled_links(blocks, &mut targets);
    if targets.is_empty() {
        return;
    }
    targets.sort();
    targets.dedup();

    let titles: HashMap<PageId, String> = join_all(targets.into_iter().map(|id| async move {
        let title = repo.page_title(&id).await;
        (id, title.into_string())
    }))
    .await
    .into_iter()
    .collect();

    apply_link_titles(blocks, &titles);
}

fn collect_untitled_links(blocks: &[Block], targets: &mut Vec<PageId>) {
    for block in blocks {
        if let Block::LinkToPage(link) = block {
            if link.title.is_none() {
                targets.push(link.page_id.clone());
            }
        }
        collect_untitled_links(block.children(), targets);
    }
}

fn apply_link_titles(blocks: &mut [Block], titles: &HashMap<PageId, String>) {
    for block in blocks.iter_mut() {
        if let Block::LinkToPage(link) = block {
            if link.title.is_none() {
                link.title = titles.get(&link.page_id).cloned();
            }
        }
        apply_link_titles(block.children_mut(), titles);
    }
}
