// tests/workspace.rs
//! Page operations: remote writes first, tree cache updated afterwards.

mod common;

use chrono::{TimeZone, Utc};
use common::{page_id, FakeNotion};
use notion_cms::model::*;
use notion_cms::{ConversionOptions, ManualClock, NotionId, PageTreeCache, Workspace};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn setup() -> (Arc<FakeNotion>, Workspace) {
    let repo = Arc::new(FakeNotion::new());
    repo.add_page(&page_id(1), "Home", None);
    repo.add_page(&page_id(2), "Notes", Some(&page_id(1)));

    let cache = Arc::new(PageTreeCache::new(
        repo.clone(),
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        )),
        vec![page_id(1)],
        chrono::Duration::seconds(300),
    ));
    let workspace = Workspace::new(repo.clone(), cache, ConversionOptions::default());
    (repo, workspace)
}

#[tokio::test]
async fn save_replaces_content_but_keeps_child_pages() {
    let (repo, workspace) = setup();
    let home = NotionId::from(&page_id(1));
    repo.add_blocks(
        &home,
        &blocks_from("<p>old intro</p><ul><li>old item</li></ul>"),
    );

    let written = workspace
        .save_page_html(&page_id(1), "<h1>Welcome</h1><p>New intro</p>")
        .await
        .unwrap();
    assert_eq!(written, 2);

    let kinds: Vec<String> = repo
        .tree_of(&home)
        .iter()
        .map(|block| block.block_type().to_string())
        .collect();
    assert_eq!(kinds, vec!["child_page", "heading_1", "paragraph"]);
    assert_eq!(repo.calls("archive_block"), 2);
}

#[tokio::test]
async fn page_html_renders_saved_content() {
    let (_repo, workspace) = setup();
    workspace
        .save_page_html(&page_id(2), "<p>Remember <strong>milk</strong></p>")
        .await
        .unwrap();

    let html = workspace.page_html(&page_id(2)).await.unwrap();
    assert!(html.contains("Remember <strong>milk</strong>"), "{}", html);
}

#[tokio::test]
async fn create_sub_page_shows_up_in_the_tree() {
    let (repo, workspace) = setup();
    assert_eq!(workspace.sub_pages(&page_id(1)).await.len(), 1);

    let created = workspace.create_sub_page(&page_id(1), "Ideas").await.unwrap();
    let names: Vec<String> = workspace
        .sub_pages(&page_id(1))
        .await
        .into_iter()
        .map(|node| node.name)
        .collect();
    assert_eq!(names, vec!["Notes", "Ideas"]);
    assert_eq!(repo.title_of(&created).as_deref(), Some("Ideas"));
}

#[tokio::test]
async fn failed_create_leaves_cache_untouched() {
    let (repo, workspace) = setup();
    workspace.sub_pages(&page_id(1)).await;

    let missing = page_id(77);
    assert!(workspace.create_sub_page(&missing, "Orphan").await.is_err());
    assert_eq!(repo.calls("create_page"), 1);
    assert_eq!(workspace.sub_pages(&page_id(1)).await.len(), 1);
}

#[tokio::test]
async fn rename_updates_remote_and_cache() {
    let (repo, workspace) = setup();

    workspace.rename_page(&page_id(2), "Journal").await.unwrap();
    assert_eq!(repo.title_of(&page_id(2)).as_deref(), Some("Journal"));
    let node = workspace.cache().find(&page_id(2)).await.unwrap();
    assert_eq!(node.name, "Journal");
}

#[tokio::test]
async fn delete_archives_and_refreshes_parent() {
    let (repo, workspace) = setup();
    assert_eq!(workspace.sub_pages(&page_id(1)).await.len(), 1);

    workspace.delete_page(&page_id(2)).await.unwrap();
    assert!(repo.is_archived(&page_id(2)));

    let home = workspace.cache().find(&page_id(1)).await.unwrap();
    assert!(home.children.is_empty());
    assert!(!home.has_children);
}

#[tokio::test]
async fn duplicate_copies_title_and_nested_content() {
    let (repo, workspace) = setup();
    workspace
        .save_page_html(
            &page_id(2),
            "<ul><li>groceries<ul><li>milk</li><li>eggs</li></ul></li></ul>",
        )
        .await
        .unwrap();

    let copy = workspace.duplicate_page(&page_id(2)).await.unwrap();
    assert_eq!(repo.title_of(&copy).as_deref(), Some("Notes (copy)"));

    let original = repo.tree_of(&NotionId::from(&page_id(2)));
    let copied = repo.tree_of(&NotionId::from(&copy));
    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0].children().len(), 2);
    assert_eq!(
        copied[0].rich_text().map(notion_cms::types::plain_text_of),
        original[0].rich_text().map(notion_cms::types::plain_text_of)
    );

    let siblings = workspace.sub_pages(&page_id(1)).await;
    assert!(siblings.iter().any(|node| node.id == copy));
}

#[tokio::test]
async fn duplicating_a_root_page_is_rejected() {
    let (repo, workspace) = setup();
    assert!(workspace.duplicate_page(&page_id(1)).await.is_err());
    assert_eq!(repo.calls("create_page"), 0);
}

fn blocks_from(html: &str) -> Vec<Block> {
    notion_cms::blocks_from_document(html, &ConversionOptions::default())
}
