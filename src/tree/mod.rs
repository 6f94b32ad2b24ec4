// src/tree/mod.rs
//! In-process mirror of the remote page hierarchy.
//!
//! The forest starts with the configured root pages and grows lazily: a
//! page's children are listed on first request, and pages reached from
//! elsewhere are attached by walking up their parent pointers. The whole
//! forest is rebuilt from the roots once its ttl has passed.
//!
//! Reads never fail. A remote error is logged and the operation falls back
//! to what the cache already knows. Remote calls are made without holding
//! the lock; their results are merged in short write sections that look the
//! target node up again.

mod clock;
mod forest;

pub use clock::{Clock, ManualClock, SystemClock};
pub use forest::{Breadcrumb, PageNode};

use crate::api::NotionRepository;
use crate::error::AppError;
use crate::model::{Block, PageTitle};
use crate::types::{NotionId, PageId};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct CacheState {
    forest: Vec<PageNode>,
    last_built: Option<DateTime<Utc>>,
}

/// Lazily populated page tree with ttl-based rebuilds.
pub struct PageTreeCache {
    repo: Arc<dyn NotionRepository>,
    clock: Arc<dyn Clock>,
    roots: Vec<PageId>,
    ttl: chrono::Duration,
    state: RwLock<CacheState>,
}

impl PageTreeCache {
    pub fn new(
        repo: Arc<dyn NotionRepository>,
        clock: Arc<dyn Clock>,
        roots: Vec<PageId>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            repo,
            clock,
            roots,
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// The current forest, rebuilt first when it has expired.
    pub async fn get_tree(&self) -> Vec<PageNode> {
        self.ensure_fresh().await;
        self.state.read().forest.clone()
    }

    /// The cached node for a page, if the cache knows it.
    pub async fn find(&self, id: &PageId) -> Option<PageNode> {
        self.ensure_fresh().await;
        forest::find(&self.state.read().forest, id).cloned()
    }

    /// The parent of a page, attaching the page's ancestors first when the
    /// page is not cached yet. Root pages have no parent.
    pub async fn find_parent(&self, id: &PageId) -> Option<PageNode> {
        self.ensure_loaded(id).await;
        forest::find_parent(&self.state.read().forest, id).cloned()
    }

    /// Sub-pages of a page. Served from the cache once listed; otherwise
    /// listed remotely and attached (one level, grandchildren unresolved).
    pub async fn get_children(&self, id: &PageId) -> Vec<PageNode> {
        self.ensure_fresh().await;
        let cached = {
            let state = self.state.read();
            forest::find(&state.forest, id).map(|node| (node.children_loaded, node.children.clone()))
        };

        match cached {
            Some((true, children)) if !children.is_empty() => {
                log::debug!("Page tree cache hit for children of {}", id);
                children
            }
            cached => {
                log::debug!("Page tree cache miss for children of {}", id);
                match self.list_sub_pages(id).await {
                    Ok(listing) => self.attach_listing(id, listing),
                    Err(e) => {
                        log::warn!("Failed to list sub-pages of {}: {}", id, e);
                        cached.map(|(_, children)| children).unwrap_or_default()
                    }
                }
            }
        }
    }

    /// Walks up from `id` through parent pages until reaching a cached page
    /// or a page without a page parent, and attaches the missing chain.
    ///
    /// Calling it again for the same page changes nothing.
    pub async fn backfill_ancestors(&self, id: &PageId) {
        self.ensure_fresh().await;

        let mut chain = Vec::new();
        let mut visited = im::HashSet::new();
        let mut current = id.clone();
        let anchor = loop {
            if self.contains(&current) {
                break Some(current);
            }
            if visited.insert(current.clone()).is_some() {
                log::warn!(
                    "Parent cycle at page {} while backfilling {}; nothing attached",
                    current,
                    id
                );
                return;
            }

            let page = match self.repo.retrieve_page(&current).await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Failed to backfill ancestors of {} at {}: {}", id, current, e);
                    return;
                }
            };
            let parent = page.parent_page().cloned();
            chain.push(PageNode::unresolved(current, page.title.into_string()));

            match parent {
                Some(parent) => current = parent,
                None => break None,
            }
        };

        if chain.is_empty() {
            return;
        }
        chain.reverse();
        let depth = chain.len();

        let mut state = self.state.write();
        if forest::graft(&mut state.forest, anchor.as_ref(), chain) {
            log::debug!("Backfilled {} pages above and including {}", depth, id);
        } else {
            log::debug!("Backfill anchor for {} left the cache; nothing attached", id);
        }
    }

    /// Renames a cached page. Returns false when the page is not cached.
    pub fn rename(&self, id: &PageId, name: &str) -> bool {
        let mut state = self.state.write();
        match forest::find_mut(&mut state.forest, id) {
            Some(node) => {
                node.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Re-lists a page's sub-pages and replaces its children with them.
    /// A failed listing leaves the cache as it was.
    pub async fn refresh_children(&self, id: &PageId) {
        match self.list_sub_pages(id).await {
            Ok(listing) => {
                self.attach_listing(id, listing);
            }
            Err(e) => log::warn!("Failed to refresh sub-pages of {}: {}", id, e),
        }
    }

    /// `{id, name}` pairs from the root down to the page, or nothing when
    /// the page cannot be placed in the tree.
    pub async fn breadcrumbs(&self, id: &PageId) -> Vec<Breadcrumb> {
        self.ensure_loaded(id).await;
        let state = self.state.read();
        forest::path_to(&state.forest, id)
            .map(|path| path.into_iter().map(Breadcrumb::from).collect())
            .unwrap_or_default()
    }

    /// Forces a rebuild on the next access.
    pub fn invalidate(&self) {
        self.state.write().last_built = None;
    }

    fn contains(&self, id: &PageId) -> bool {
        forest::find(&self.state.read().forest, id).is_some()
    }

    async fn ensure_loaded(&self, id: &PageId) {
        self.ensure_fresh().await;
        if !self.contains(id) {
            self.backfill_ancestors(id).await;
        }
    }

    fn is_expired(&self, state: &CacheState) -> bool {
        match state.last_built {
            Some(built) => self.clock.now() - built > self.ttl,
            None => true,
        }
    }

    async fn ensure_fresh(&self) {
        if !self.is_expired(&self.state.read()) {
            return;
        }

        let known: Vec<Option<String>> = {
            let state = self.state.read();
            self.roots
                .iter()
                .map(|root| forest::find(&state.forest, root).map(|node| node.name.clone()))
                .collect()
        };

        let titles = join_all(self.roots.iter().map(|root| self.repo.retrieve_page(root))).await;
        let forest: Vec<PageNode> = self
            .roots
            .iter()
            .zip(titles)
            .zip(known)
            .map(|((root, title), known)| {
                let name = match title {
                    Ok(page) => page.title.into_string(),
                    Err(e) => {
                        log::warn!("Failed to fetch title of root page {}: {}", root, e);
                        known.unwrap_or_else(|| PageTitle::untitled().into_string())
                    }
                };
                PageNode::unresolved(root.clone(), name)
            })
            .collect();

        let mut state = self.state.write();
        if self.is_expired(&state) {
            log::debug!("Rebuilt page tree with {} roots", forest.len());
            state.forest = forest;
            state.last_built = Some(self.clock.now());
        }
    }

    async fn list_sub_pages(&self, id: &PageId) -> Result<Vec<PageNode>, AppError> {
        let blocks = self.repo.retrieve_children(&NotionId::from(id)).await?;
        Ok(blocks
            .into_iter()
            .filter_map(|block| match block {
                Block::ChildPage(page) => Some(PageNode::listed(
                    page.page_id,
                    page.title,
                    page.common.has_children,
                )),
                _ => None,
            })
            .collect())
    }

    /// Merges a listing into the cached node, or hands it back unattached
    /// when the page is not cached.
    fn attach_listing(&self, id: &PageId, listing: Vec<PageNode>) -> Vec<PageNode> {
        let mut state = self.state.write();
        match forest::find_mut(&mut state.forest, id) {
            Some(node) => {
                node.adopt_listing(listing);
                node.children.clone()
            }
            None => listing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, Parent};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    /// Pages by id with their parent; children listings derived from parents.
    struct Pages(HashMap<PageId, (String, Option<PageId>)>);

    #[async_trait]
    impl NotionRepository for Pages {
        async fn retrieve_page(&self, id: &PageId) -> Result<Page, AppError> {
            let (title, parent) = self
                .0
                .get(id)
                .ok_or_else(|| AppError::MalformedResponse(format!("no page {}", id)))?;
            Ok(Page {
                id: id.clone(),
                title: PageTitle::new(title.clone()),
                url: String::new(),
                parent: parent.clone().map(|page_id| Parent::Page { page_id }),
                archived: false,
            })
        }

        async fn retrieve_children(&self, _: &NotionId) -> Result<Vec<Block>, AppError> {
            Ok(Vec::new())
        }

        async fn create_page(&self, _: &PageId, _: &str, _: &[Block]) -> Result<PageId, AppError> {
            Ok(PageId::new_v4())
        }

        async fn update_page_title(&self, _: &PageId, _: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn archive_page(&self, _: &PageId) -> Result<(), AppError> {
            Ok(())
        }

        async fn append_children(&self, _: &NotionId, _: &[Block]) -> Result<(), AppError> {
            Ok(())
        }

        async fn archive_block(&self, _: &crate::types::BlockId) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn id(n: u8) -> PageId {
        PageId::parse(&format!("{:032x}", n)).unwrap()
    }

    fn cache_over(pages: &[(u8, &str, Option<u8>)], roots: &[u8]) -> PageTreeCache {
        let pages = pages
            .iter()
            .map(|(n, title, parent)| (id(*n), (title.to_string(), parent.map(id))))
            .collect();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PageTreeCache::new(
            Arc::new(Pages(pages)),
            Arc::new(ManualClock::new(start)),
            roots.iter().copied().map(id).collect(),
            chrono::Duration::seconds(60),
        )
    }

    #[tokio::test]
    async fn test_parent_cycle_attaches_nothing() {
        let cache = cache_over(&[(1, "Root", None), (2, "A", Some(3)), (3, "B", Some(2))], &[1]);
        cache.backfill_ancestors(&id(2)).await;
        assert!(cache.find(&id(2)).await.is_none());
        assert_eq!(cache.get_tree().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rename_requires_cached_page() {
        let cache = cache_over(&[(1, "Root", None), (2, "Child", Some(1))], &[1]);
        cache.get_tree().await;
        assert!(!cache.rename(&id(2), "Renamed"));
        cache.backfill_ancestors(&id(2)).await;
        assert!(cache.rename(&id(2), "Renamed"));
        assert_eq!(cache.find(&id(2)).await.map(|n| n.name), Some("Renamed".to_string()));
    }
}
