// tests/common/mod.rs
//! In-memory stand-in for the Notion API shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use notion_cms::api::payload;
use notion_cms::model::{ChildPageBlock, Page, PageTitle, Parent};
use notion_cms::types::BlockMarker;
use notion_cms::{AppError, Block, BlockCommon, BlockId, NotionClientError, NotionId, NotionRepository, PageId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

pub fn page_id(n: u32) -> PageId {
    PageId::parse(&format!("{:032x}", n)).unwrap()
}

#[derive(Debug, Clone)]
struct StoredPage {
    title: String,
    parent: Option<PageId>,
    archived: bool,
}

#[derive(Default)]
struct State {
    pages: HashMap<PageId, StoredPage>,
    children: HashMap<NotionId, Vec<Block>>,
    failing: HashSet<NotionId>,
    calls: HashMap<&'static str, usize>,
}

/// Pages and blocks kept in maps; listings return one level, like the API.
#[derive(Default)]
pub struct FakeNotion {
    state: Mutex<State>,
}

fn not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotionClient(NotionClientError::NotionApi {
        status: 404,
        code: "object_not_found".to_string(),
        message: format!("Could not find {}", id),
        request_id: None,
    })
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page, listed as a child page of its parent.
    pub fn add_page(&self, id: &PageId, title: &str, parent: Option<&PageId>) {
        let mut state = self.state.lock();
        state.pages.insert(
            id.clone(),
            StoredPage {
                title: title.to_string(),
                parent: parent.cloned(),
                archived: false,
            },
        );
        if let Some(parent) = parent {
            state
                .children
                .entry(NotionId::from(parent))
                .or_default()
                .push(Block::ChildPage(ChildPageBlock {
                    common: BlockCommon::new(Some(id.cast::<BlockMarker>())),
                    page_id: id.clone(),
                    title: title.to_string(),
                }));
        }
    }

    /// Stores content under a page or block, assigning ids to every level.
    pub fn add_blocks(&self, parent: &NotionId, blocks: &[Block]) {
        let mut state = self.state.lock();
        for block in blocks {
            store(&mut state, parent, block.clone());
        }
    }

    /// Every read of this page or block fails from now on.
    pub fn fail_reads_of(&self, id: impl Into<NotionId>) {
        self.state.lock().failing.insert(id.into());
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn title_of(&self, id: &PageId) -> Option<String> {
        self.state.lock().pages.get(id).map(|page| page.title.clone())
    }

    pub fn is_archived(&self, id: &PageId) -> bool {
        self.state.lock().pages.get(id).map(|page| page.archived).unwrap_or(false)
    }

    /// The full stored block tree under a page or block.
    pub fn tree_of(&self, parent: &NotionId) -> Vec<Block> {
        let state = self.state.lock();
        assemble(&state, parent)
    }

    /// Pages created under `parent`, newest last.
    pub fn child_pages_of(&self, parent: &PageId) -> Vec<(PageId, String)> {
        let state = self.state.lock();
        state
            .pages
            .iter()
            .filter(|(_, page)| page.parent.as_ref() == Some(parent) && !page.archived)
            .map(|(id, page)| (id.clone(), page.title.clone()))
            .collect()
    }

    fn record(&self, operation: &'static str) {
        *self.state.lock().calls.entry(operation).or_default() += 1;
    }

    fn check_readable(&self, id: &NotionId) -> Result<(), AppError> {
        if self.state.lock().failing.contains(id) {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn store(state: &mut State, parent: &NotionId, mut block: Block) {
    let id = BlockId::new_v4();
    let children = std::mem::take(block.children_mut());
    block.common_mut().id = Some(id.clone());
    block.common_mut().has_children = !children.is_empty();
    state.children.entry(parent.clone()).or_default().push(block);
    for child in children {
        store(state, &NotionId::from(&id), child);
    }
}

fn assemble(state: &State, parent: &NotionId) -> Vec<Block> {
    state
        .children
        .get(parent)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| !is_archived_page(state, block))
                .map(|block| {
                    let mut block = block.clone();
                    if let Some(id) = block.id().cloned() {
                        let children = assemble(state, &NotionId::from(&id));
                        if !children.is_empty() {
                            block.set_children(children);
                        }
                    }
                    block
                })
                .collect()
        })
        .unwrap_or_default()
}

fn is_archived_page(state: &State, block: &Block) -> bool {
    match block {
        Block::ChildPage(page) => state
            .pages
            .get(&page.page_id)
            .map(|stored| stored.archived)
            .unwrap_or(false),
        _ => false,
    }
}

#[async_trait]
impl NotionRepository for FakeNotion {
    async fn retrieve_page(&self, id: &PageId) -> Result<Page, AppError> {
        self.record("retrieve_page");
        self.check_readable(&NotionId::from(id))?;
        let state = self.state.lock();
        let stored = state.pages.get(id).ok_or_else(|| not_found(id))?;
        Ok(Page {
            id: id.clone(),
            title: PageTitle::new(stored.title.clone()),
            url: format!("https://www.notion.so/{}", id.as_str()),
            parent: Some(match &stored.parent {
                Some(page_id) => Parent::Page {
                    page_id: page_id.clone(),
                },
                None => Parent::Workspace,
            }),
            archived: stored.archived,
        })
    }

    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        self.record("retrieve_children");
        self.check_readable(parent)?;
        let state = self.state.lock();
        Ok(state
            .children
            .get(parent)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|block| !is_archived_page(&state, block))
                    .cloned()
                    .map(|mut block| {
                        if let Block::ChildPage(page) = &mut block {
                            page.common.has_children = state
                                .children
                                .get(&NotionId::from(&page.page_id))
                                .is_some_and(|content| !content.is_empty());
                        }
                        block
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_page(
        &self,
        parent: &PageId,
        title: &str,
        children: &[Block],
    ) -> Result<PageId, AppError> {
        self.record("create_page");
        if !self.state.lock().pages.contains_key(parent) {
            return Err(not_found(parent));
        }
        let id = PageId::new_v4();
        self.add_page(&id, title, Some(parent));
        self.append_children(&NotionId::from(&id), children).await?;
        Ok(id)
    }

    async fn update_page_title(&self, id: &PageId, title: &str) -> Result<(), AppError> {
        self.record("update_page_title");
        let mut state = self.state.lock();
        let stored = state.pages.get_mut(id).ok_or_else(|| not_found(id))?;
        stored.title = title.to_string();
        for blocks in state.children.values_mut() {
            for block in blocks.iter_mut() {
                if let Block::ChildPage(page) = block {
                    if &page.page_id == id {
                        page.title = title.to_string();
                    }
                }
            }
        }
        Ok(())
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), AppError> {
        self.record("archive_page");
        let mut state = self.state.lock();
        let stored = state.pages.get_mut(id).ok_or_else(|| not_found(id))?;
        stored.archived = true;
        Ok(())
    }

    async fn append_children(&self, parent: &NotionId, children: &[Block]) -> Result<(), AppError> {
        self.record("append_children");
        let mut state = self.state.lock();
        for block in children {
            if payload::block_payload(block).is_some() {
                store(&mut state, parent, block.clone());
            }
        }
        Ok(())
    }

    async fn archive_block(&self, id: &BlockId) -> Result<(), AppError> {
        self.record("archive_block");
        let mut state = self.state.lock();
        let mut found = false;
        for blocks in state.children.values_mut() {
            let before = blocks.len();
            blocks.retain(|block| block.id() != Some(id));
            found |= blocks.len() != before;
        }
        if found {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}
