// src/api/payload.rs
//! Blocks → Notion request bodies.
//!
//! Payloads never carry nested children except table rows, which Notion
//! requires at creation time. Deeper levels are appended separately once
//! their parent has an id.

use crate::constants::{
    DEFAULT_CALLOUT_ICON, DEFAULT_CODE_LANGUAGE, NOTION_RICH_TEXT_MAX_CHARS, PAGE_LINK_PREFIX,
};
use crate::model::*;
use crate::types::{Annotations, Link, PageId, RichTextItem};
use serde_json::{json, Value};

/// Base URL used when an in-app page link has to become a real URL.
const NOTION_PAGE_URL_BASE: &str = "https://www.notion.so/";

/// The request body for one block, or `None` for kinds that cannot be written.
pub fn block_payload(block: &Block) -> Option<Value> {
    let kind = block.kind();
    let body = match block {
        Block::Paragraph(b) => text_body(&b.content),
        Block::Heading1(b) | Block::Heading2(b) | Block::Heading3(b) => {
            let mut body = text_body(&b.content);
            body["is_toggleable"] = json!(b.is_toggleable);
            body
        }
        Block::BulletedListItem(b) => text_body(&b.content),
        Block::NumberedListItem(b) => text_body(&b.content),
        Block::Toggle(b) => text_body(&b.content),
        Block::Quote(b) => text_body(&b.content),
        Block::ToDo(b) => {
            let mut body = text_body(&b.content);
            body["checked"] = json!(b.checked);
            body
        }
        Block::Callout(b) => {
            let mut body = text_body(&b.content);
            body["icon"] = icon_payload(b.icon.as_ref());
            body
        }
        Block::Code(b) => json!({
            "rich_text": rich_text_payload(&b.content.rich_text),
            "language": if b.language.is_empty() { DEFAULT_CODE_LANGUAGE } else { b.language.as_str() },
            "caption": rich_text_payload(&b.caption),
        }),
        Block::Divider(_) => json!({}),
        Block::Image(b) => file_body(&b.image, &b.caption),
        Block::Audio(b) => file_body(&b.audio, &b.caption),
        Block::File(b) => {
            let caption = match (&b.name, b.caption.is_empty()) {
                (Some(name), true) => vec![RichTextItem::plain_text(name)],
                _ => b.caption.clone(),
            };
            file_body(&b.file, &caption)
        }
        Block::Bookmark(b) => json!({
            "url": b.url,
            "caption": rich_text_payload(&b.caption),
        }),
        // Notion cannot create link previews; a bookmark is the closest match
        Block::LinkPreview(b) => {
            return Some(json!({
                "object": "block",
                "type": "bookmark",
                "bookmark": { "url": b.url, "caption": [] },
            }))
        }
        Block::LinkToPage(b) => json!({
            "type": "page_id",
            "page_id": b.page_id.to_dashed(),
        }),
        Block::Table(b) => table_body(b),
        Block::ChildPage(_) | Block::TableRow(_) | Block::Unsupported(_) => {
            log::debug!("Not writing {} block", block.block_type());
            return None;
        }
    };

    Some(json!({
        "object": "block",
        "type": kind.as_str(),
        kind.as_str(): body,
    }))
}

/// Request bodies for every writable block, in order.
pub fn blocks_payload(blocks: &[Block]) -> Vec<Value> {
    blocks.iter().filter_map(block_payload).collect()
}

/// Whether a written block's children must be appended in a second request.
pub fn children_written_separately(block: &Block) -> bool {
    !matches!(block, Block::Table(_)) && !block.children().is_empty()
}

/// The `properties` body that sets a page title.
pub fn title_properties(title: &str) -> Value {
    json!({
        "title": {
            "title": rich_text_payload(&[RichTextItem::plain_text(title)]),
        }
    })
}

fn text_body(content: &TextBlockContent) -> Value {
    json!({
        "rich_text": rich_text_payload(&content.rich_text),
        "color": content.color.as_str(),
    })
}

fn file_body(file: &FileObject, caption: &[RichTextItem]) -> Value {
    // Notion-hosted files are re-linked by URL; they cannot be re-uploaded here
    json!({
        "type": "external",
        "external": { "url": file.url() },
        "caption": rich_text_payload(caption),
    })
}

fn icon_payload(icon: Option<&Icon>) -> Value {
    match icon {
        Some(Icon::Emoji { emoji }) => json!({ "type": "emoji", "emoji": emoji }),
        Some(Icon::External { external }) => {
            json!({ "type": "external", "external": { "url": external.url } })
        }
        Some(Icon::File { .. }) | None => json!({ "type": "emoji", "emoji": DEFAULT_CALLOUT_ICON }),
    }
}

fn table_body(table: &TableBlock) -> Value {
    let rows: Vec<Value> = table
        .common
        .children
        .iter()
        .filter_map(|row| match row {
            Block::TableRow(row) => {
                let mut cells: Vec<Value> = row
                    .cells
                    .iter()
                    .take(table.table_width)
                    .map(|cell| Value::Array(rich_text_payload(cell)))
                    .collect();
                cells.resize(table.table_width, Value::Array(Vec::new()));
                Some(json!({
                    "object": "block",
                    "type": "table_row",
                    "table_row": { "cells": cells },
                }))
            }
            _ => None,
        })
        .collect();

    json!({
        "table_width": table.table_width,
        "has_column_header": table.has_column_header,
        "has_row_header": table.has_row_header,
        "children": rows,
    })
}

/// Rich text objects for a run sequence; runs longer than Notion's limit
/// are split into consecutive objects with the same formatting.
pub fn rich_text_payload(runs: &[RichTextItem]) -> Vec<Value> {
    let mut objects = Vec::with_capacity(runs.len());
    for run in runs {
        let link = run.link.as_ref().and_then(writable_link);
        let chars: Vec<char> = run.content.chars().collect();
        for chunk in chars.chunks(NOTION_RICH_TEXT_MAX_CHARS) {
            let content: String = chunk.iter().collect();
            objects.push(json!({
                "type": "text",
                "text": {
                    "content": content,
                    "link": link.as_ref().map(|url| json!({ "url": url })),
                },
                "annotations": annotations_payload(&run.annotations),
            }));
        }
    }
    objects
}

fn annotations_payload(annotations: &Annotations) -> Value {
    json!({
        "bold": annotations.bold,
        "italic": annotations.italic,
        "strikethrough": annotations.strikethrough,
        "underline": annotations.underline,
        "code": annotations.code,
        "color": annotations.color.as_str(),
    })
}

/// An absolute URL Notion accepts for a link. In-app page links are
/// rewritten to the page's Notion URL; other relative links are dropped.
fn writable_link(link: &Link) -> Option<String> {
    if url::Url::parse(&link.url).is_ok() {
        return Some(link.url.clone());
    }
    if let Some(id) = link
        .url
        .strip_prefix(PAGE_LINK_PREFIX)
        .and_then(|rest| PageId::parse(rest).ok())
    {
        return Some(format!("{}{}", NOTION_PAGE_URL_BASE, id.as_str()));
    }
    log::debug!("Dropping relative link '{}' from rich text", link.url);
    None
}
