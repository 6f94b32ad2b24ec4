// src/html/render.rs
//! Blocks → editor markup.
//!
//! Every element carries `data-notion-block-type` (and the block id when
//! known) so the markup converts back to the same blocks. Consecutive list
//! items of one kind share a single list element.

use super::dom::page_href;
use super::rich_text::markup_from_runs;
use crate::constants::{
    BLOCK_ID_ATTR, BLOCK_MAX_RENDER_DEPTH, BLOCK_TYPE_ATTR, CHARS_PER_BLOCK_ESTIMATE,
    DEFAULT_CODE_LANGUAGE, UNTITLED_PAGE,
};
use crate::error::AppError;
use crate::model::*;
use crate::types::{plain_text_of, BlockId};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

// --- Public API ---

/// Renders a block sequence into markup.
pub fn render_blocks(blocks: &[Block]) -> Result<String, AppError> {
    let mut output = String::with_capacity(blocks.len() * CHARS_PER_BLOCK_ESTIMATE);
    log::debug!("Rendering {} blocks to markup", blocks.len());
    write_blocks(&mut output, blocks, 0)?;
    Ok(output)
}

/// Renders one block, including its materialized children.
pub fn markup_from_block(block: &Block) -> Result<String, AppError> {
    render_blocks(std::slice::from_ref(block))
}

/// The `language-*` class suffix for a Notion language name.
pub(crate) fn code_language_class(language: &str) -> String {
    if language == DEFAULT_CODE_LANGUAGE {
        "plaintext".to_string()
    } else {
        language.to_ascii_lowercase().replace(' ', "-")
    }
}

// --- Sequences ---

fn write_blocks(out: &mut String, blocks: &[Block], depth: usize) -> Result<(), AppError> {
    if depth > BLOCK_MAX_RENDER_DEPTH {
        log::warn!(
            "Maximum render depth {} exceeded; {} blocks not rendered",
            BLOCK_MAX_RENDER_DEPTH,
            blocks.len()
        );
        return Ok(());
    }

    let mut index = 0;
    while index < blocks.len() {
        let kind = blocks[index].kind();
        if is_list_kind(kind) {
            let run = blocks[index..]
                .iter()
                .take_while(|block| block.kind() == kind)
                .count();
            write_list(out, &blocks[index..index + run], kind, depth)?;
            index += run;
        } else {
            write_block(out, &blocks[index], depth)?;
            index += 1;
        }
    }
    Ok(())
}

fn is_list_kind(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::BulletedListItem | BlockKind::NumberedListItem | BlockKind::ToDo
    )
}

fn type_attr(tag: &str) -> String {
    format!(" {}=\"{}\"", BLOCK_TYPE_ATTR, tag)
}

fn id_attr(id: Option<&BlockId>) -> String {
    id.map(|id| format!(" {}=\"{}\"", BLOCK_ID_ATTR, id.as_str()))
        .unwrap_or_default()
}

fn block_attrs(block: &Block) -> String {
    format!("{}{}", type_attr(block.kind().as_str()), id_attr(block.id()))
}

// --- Lists ---

/// Writes a run of same-kind list items inside one list element.
fn write_list(
    out: &mut String,
    items: &[Block],
    kind: BlockKind,
    depth: usize,
) -> Result<(), AppError> {
    let (open, close) = match kind {
        BlockKind::NumberedListItem => ("<ol", "</ol>"),
        BlockKind::ToDo => ("<ul class=\"todo-list\"", "</ul>"),
        _ => ("<ul", "</ul>"),
    };
    write!(out, "{}{}>", open, type_attr(kind.list_tag()))?;

    for item in items {
        write!(out, "<li{}>", id_attr(item.id()))?;
        match item {
            Block::ToDo(todo) => {
                let checked = if todo.checked {
                    " checked=\"checked\""
                } else {
                    ""
                };
                write!(
                    out,
                    "<label class=\"todo-list__label\"><input type=\"checkbox\" disabled=\"disabled\"{}>\
                     <span class=\"todo-list__label__description\">{}</span></label>",
                    checked,
                    markup_from_runs(&todo.content.rich_text)
                )?;
            }
            other => {
                if let Some(runs) = other.rich_text() {
                    out.push_str(&markup_from_runs(runs));
                }
            }
        }
        write_blocks(out, item.children(), depth + 1)?;
        out.push_str("</li>");
    }

    out.push_str(close);
    Ok(())
}

// --- Single blocks ---

fn write_block(out: &mut String, block: &Block, depth: usize) -> Result<(), AppError> {
    let attrs = block_attrs(block);

    match block {
        Block::Paragraph(b) => {
            write!(out, "<p{}>{}</p>", attrs, markup_from_runs(&b.content.rich_text))?;
            write_blocks(out, &b.common.children, depth + 1)?;
        }
        Block::Heading1(b) | Block::Heading2(b) | Block::Heading3(b) => {
            let level = match block.kind() {
                BlockKind::Heading1 => 1,
                BlockKind::Heading2 => 2,
                _ => 3,
            };
            let title = markup_from_runs(&b.content.rich_text);
            if b.is_toggleable {
                write!(out, "<details{attrs}><summary><h{level}>{title}</h{level}></summary>")?;
                write_blocks(out, &b.common.children, depth + 1)?;
                out.push_str("</details>");
            } else {
                write!(out, "<h{level}{attrs}>{title}</h{level}>")?;
                write_blocks(out, &b.common.children, depth + 1)?;
            }
        }
        Block::BulletedListItem(_) | Block::NumberedListItem(_) | Block::ToDo(_) => {
            write_list(out, std::slice::from_ref(block), block.kind(), depth)?;
        }
        Block::Toggle(b) => {
            write!(
                out,
                "<details{}><summary>{}</summary>",
                attrs,
                markup_from_runs(&b.content.rich_text)
            )?;
            write_blocks(out, &b.common.children, depth + 1)?;
            out.push_str("</details>");
        }
        Block::Quote(b) => {
            write!(out, "<blockquote{}>{}", attrs, markup_from_runs(&b.content.rich_text))?;
            write_blocks(out, &b.common.children, depth + 1)?;
            out.push_str("</blockquote>");
        }
        Block::Callout(b) => {
            write!(out, "<div class=\"callout\"{}>", attrs)?;
            if let Some(emoji) = b.icon.as_ref().and_then(Icon::as_emoji) {
                write!(out, "<span class=\"callout-icon\">{}</span>", text(emoji))?;
            }
            out.push_str(&markup_from_runs(&b.content.rich_text));
            write_blocks(out, &b.common.children, depth + 1)?;
            out.push_str("</div>");
        }
        Block::Code(b) => {
            write!(
                out,
                "<pre{}><code class=\"language-{}\">{}</code></pre>",
                attrs,
                attr(&code_language_class(&b.language)),
                text(&plain_text_of(&b.content.rich_text))
            )?;
        }
        Block::Divider(_) => write!(out, "<hr{}>", attrs)?,
        Block::Image(b) => {
            write!(
                out,
                "<figure class=\"image\"{}><img src=\"{}\" alt=\"{}\">",
                attrs,
                attr(b.image.url()),
                attr(&plain_text_of(&b.caption))
            )?;
            if !b.caption.is_empty() {
                write!(out, "<figcaption>{}</figcaption>", markup_from_runs(&b.caption))?;
            }
            out.push_str("</figure>");
        }
        Block::File(b) => {
            let url = b.file.url();
            let caption = plain_text_of(&b.caption);
            let label = match (&b.name, caption.is_empty()) {
                (Some(name), _) => name.clone(),
                (None, false) => caption,
                (None, true) => url.to_string(),
            };
            write!(
                out,
                "<p{}><a href=\"{}\" download=\"{}\">{}</a></p>",
                attrs,
                attr(url),
                attr(b.name.as_deref().unwrap_or_default()),
                text(&label)
            )?;
        }
        Block::Audio(b) => {
            write!(
                out,
                "<audio controls=\"controls\"{}><source src=\"{}\"></audio>",
                attrs,
                attr(b.audio.url())
            )?;
        }
        Block::Bookmark(b) => {
            let label = if b.caption.is_empty() {
                text(&b.url).into_owned()
            } else {
                markup_from_runs(&b.caption)
            };
            write!(out, "<p{}><a href=\"{}\">{}</a></p>", attrs, attr(&b.url), label)?;
        }
        Block::LinkPreview(b) => {
            write!(
                out,
                "<p{}><a href=\"{}\">{}</a></p>",
                attrs,
                attr(&b.url),
                text(&b.url)
            )?;
        }
        Block::LinkToPage(b) => {
            write!(
                out,
                "<p{}><a href=\"{}\">{}</a></p>",
                attrs,
                page_href(&b.page_id),
                text(b.title.as_deref().unwrap_or(UNTITLED_PAGE))
            )?;
        }
        Block::ChildPage(b) => {
            write!(
                out,
                "<p{}><a href=\"{}\">{}</a></p>",
                attrs,
                page_href(&b.page_id),
                text(&b.title)
            )?;
        }
        Block::Table(b) => write_table(out, b, &attrs)?,
        Block::TableRow(_) => log::debug!("Skipping table row outside of a table"),
        Block::Unsupported(b) => {
            write!(
                out,
                "<p{}>[Unsupported block type: {}]</p>",
                attrs,
                text(&b.block_type)
            )?;
        }
    }
    Ok(())
}

fn write_table(out: &mut String, table: &TableBlock, attrs: &str) -> Result<(), AppError> {
    write!(out, "<table{}>", attrs)?;
    for (index, row) in table.common.children.iter().enumerate() {
        let Block::TableRow(row) = row else {
            log::debug!("Skipping non-row child of table: {}", row.block_type());
            continue;
        };
        let cell = if table.has_column_header && index == 0 {
            "th"
        } else {
            "td"
        };
        write!(out, "<tr{}>", id_attr(row.common.id.as_ref()))?;
        for runs in &row.cells {
            write!(out, "<{cell}>{}</{cell}>", markup_from_runs(runs))?;
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    Ok(())
}
