// tests/html_conversion.rs
//! Editor markup ⇄ blocks, exercised through the public conversion API.

mod common;

use common::{page_id, FakeNotion};
use notion_cms::model::*;
use notion_cms::{
    blocks_from_document, document_from_blocks, page_document, AnnotationMode, Annotations,
    ConversionOptions, NotionId, NotionRepository, RichTextItem,
};
use pretty_assertions::assert_eq;

fn parse(html: &str) -> Vec<Block> {
    blocks_from_document(html, &ConversionOptions::default())
}

fn assert_containers_consistent(blocks: &[Block]) {
    for block in blocks {
        assert_eq!(
            block.common().has_children,
            !block.children().is_empty(),
            "has_children out of step on {} block",
            block.block_type()
        );
        assert_containers_consistent(block.children());
    }
}

#[test]
fn heading_and_nested_list_scenario() {
    let blocks = parse(
        r#"<h1 data-notion-block-type="heading_1">Title</h1><ul data-notion-block-type="bulleted_list"><li>A<ul><li>B</li></ul></li></ul>"#,
    );

    assert_eq!(blocks.len(), 2);
    match &blocks[0] {
        Block::Heading1(heading) => {
            assert_eq!(heading.content.rich_text, vec![RichTextItem::plain_text("Title")])
        }
        other => panic!("expected heading_1, got {:?}", other),
    }
    match &blocks[1] {
        Block::BulletedListItem(item) => {
            assert_eq!(item.content.rich_text, vec![RichTextItem::plain_text("A")]);
            assert!(item.common.has_children);
            assert_eq!(item.common.children.len(), 1);
            match &item.common.children[0] {
                Block::BulletedListItem(child) => {
                    assert_eq!(child.content.rich_text, vec![RichTextItem::plain_text("B")]);
                    assert!(!child.common.has_children);
                }
                other => panic!("expected nested bulleted item, got {:?}", other),
            }
        }
        other => panic!("expected bulleted_list_item, got {:?}", other),
    }
}

#[test]
fn checklist_scenario() {
    let blocks = parse(
        r#"<ul class="todo-list"><li><label class="todo-list__label"><input type="checkbox" checked><span class="todo-list__label__description">Done</span></label></li></ul>"#,
    );

    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        Block::ToDo(todo) => {
            assert!(todo.checked);
            assert_eq!(todo.content.rich_text, vec![RichTextItem::plain_text("Done")]);
        }
        other => panic!("expected to_do, got {:?}", other),
    }
}

#[test]
fn table_width_matches_every_row() {
    let blocks = parse(
        "<figure class=\"table\"><table>\
         <tr><td>a</td><td>b</td><td>c</td></tr>\
         <tr><td>d</td></tr>\
         <tr><td>e</td><td>f</td><td>g</td><td>h</td></tr>\
         </table></figure>",
    );

    match &blocks[0] {
        Block::Table(table) => {
            assert_eq!(table.table_width, 3);
            assert!(!table.has_column_header);
            for row in &table.common.children {
                match row {
                    Block::TableRow(row) => assert_eq!(row.cells.len(), 3),
                    other => panic!("expected table_row, got {:?}", other),
                }
            }
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn header_cell_anywhere_sets_column_header() {
    let blocks = parse("<table><tr><td>a</td></tr><tr><th>b</th></tr></table>");
    match &blocks[0] {
        Block::Table(table) => assert!(table.has_column_header),
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn unknown_markup_is_dropped_and_containers_stay_consistent() {
    let blocks = parse(
        "<p>keep</p><span>loose</span><nav>menu</nav>\
         <blockquote><p>Quoted</p><ul><li>x</li></ul></blockquote>\
         <details><summary>More</summary><p>hidden</p></details>\
         <div class=\"callout\"><span class=\"callout-icon\">💡</span>Tip</div>",
    );

    let kinds: Vec<&str> = blocks.iter().map(Block::block_type).collect();
    assert_eq!(kinds, vec!["paragraph", "quote", "toggle", "callout"]);
    assert_containers_consistent(&blocks);
}

#[test]
fn accumulate_mode_keeps_outer_emphasis() {
    let html = "<p><strong><em>both</em></strong></p>";

    let innermost = parse(html);
    let accumulated = blocks_from_document(
        html,
        &ConversionOptions::default().with_annotation_mode(AnnotationMode::Accumulate),
    );

    assert_eq!(
        innermost[0].rich_text().unwrap(),
        &[RichTextItem::styled("both", Annotations::italic())][..]
    );
    assert_eq!(
        accumulated[0].rich_text().unwrap(),
        &[RichTextItem::styled("both", Annotations::bold().merge(Annotations::italic()))][..]
    );
}

#[tokio::test]
async fn rendering_fetches_missing_subtrees() {
    let repo = FakeNotion::new();
    let page = page_id(1);
    repo.add_page(&page, "Home", None);
    repo.add_blocks(
        &NotionId::from(&page),
        &parse("<ul><li>outer<ul><li>inner<ul><li>deepest</li></ul></li></ul></li></ul>"),
    );

    let top_level = repo.retrieve_children(&NotionId::from(&page)).await.unwrap();
    assert!(top_level[0].common().has_unfetched_children());

    let html = document_from_blocks(&repo, top_level).await.unwrap();
    assert!(html.contains("deepest"), "{}", html);
    assert_eq!(repo.calls("retrieve_children"), 3);
}

#[tokio::test]
async fn page_fetch_failure_renders_inline_error() {
    let repo = FakeNotion::new();
    let page = page_id(2);
    repo.add_page(&page, "Broken", None);
    repo.fail_reads_of(&page);

    let html = page_document(&repo, &page).await.unwrap();
    assert!(html.starts_with("<p>[Error fetching block content: "), "{}", html);
}

#[tokio::test]
async fn link_to_page_titles_are_resolved() {
    let repo = FakeNotion::new();
    let target = page_id(3);
    repo.add_page(&target, "Roadmap", None);
    let missing = page_id(4);

    let blocks = vec![
        Block::LinkToPage(LinkToPageBlock {
            common: BlockCommon::default(),
            page_id: target.clone(),
            title: None,
        }),
        Block::LinkToPage(LinkToPageBlock {
            common: BlockCommon::default(),
            page_id: missing.clone(),
            title: None,
        }),
    ];

    let html = document_from_blocks(&repo, blocks).await.unwrap();
    assert!(html.contains(">Roadmap</a>"), "{}", html);
    assert!(html.contains(">Untitled</a>"), "{}", html);
}
