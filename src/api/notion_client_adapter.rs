// src/api/notion_client_adapter.rs
//! Adapter layer for converting notion-client types to our domain model.
//!
//! Blocks arrive as raw JSON so that fields notion-client does not model
//! (audio blocks, file names, image captions, toggleable headings) can still
//! be read. Block kinds outside the editor's vocabulary become
//! `Block::Unsupported` carrying the remote type name.

use crate::constants::DEFAULT_CODE_LANGUAGE;
use crate::error::{AppError, NotionClientError};
use crate::model::blocks::*;
use crate::model::common::BlockCommon;
use crate::model::{Block, Page, PageTitle, Parent};
use crate::types::{BlockId, Color, DatabaseId, Link, PageId, PageMarker, RichTextItem};
use notion_client::objects::block::{Block as NcBlock, BlockType};
use notion_client::objects::rich_text::RichText as NcRichText;
use serde_json::Value;
use std::collections::HashMap;

/// Convert notion-client Page to our domain Page
pub fn convert_page(notion_page: notion_client::objects::page::Page) -> Result<Page, AppError> {
    let id = PageId::parse(&notion_page.id)?;
    let title = extract_page_title(notion_page.properties);
    let parent = convert_parent(notion_page.parent)?;

    Ok(Page {
        id,
        title,
        url: notion_page.url,
        parent,
        archived: notion_page.archived,
    })
}

/// Convert one raw block object from a children listing.
pub fn convert_block_value(value: Value) -> Result<Block, AppError> {
    let block_type = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    if block_type == "audio" {
        return convert_audio(&value);
    }

    let mut block = match serde_json::from_value::<NcBlock>(value.clone()) {
        Ok(notion_block) => convert_block(notion_block)?,
        Err(e) => {
            log::debug!("notion-client cannot read '{}' block: {}", block_type, e);
            return Ok(Block::Unsupported(UnsupportedBlock {
                common: raw_common(&value)?,
                block_type,
            }));
        }
    };

    let payload = &value[block_type.as_str()];
    match &mut block {
        Block::Unsupported(unsupported) => unsupported.block_type = block_type,
        Block::Heading1(heading) | Block::Heading2(heading) | Block::Heading3(heading) => {
            heading.is_toggleable = payload["is_toggleable"].as_bool().unwrap_or(false);
        }
        Block::Image(image) => image.caption = raw_caption(payload),
        Block::File(file) => file.name = payload["name"].as_str().map(str::to_string),
        _ => {}
    }
    Ok(block)
}

/// Convert notion-client Block to our domain Block
pub fn convert_block(notion_block: NcBlock) -> Result<Block, AppError> {
    let common = convert_block_common(&notion_block)?;

    match notion_block.block_type {
        BlockType::Paragraph { paragraph } => Ok(Block::Paragraph(ParagraphBlock {
            common,
            content: convert_text_block_content(paragraph.rich_text, paragraph.color),
        })),

        BlockType::Heading1 { heading_1 } => Ok(Block::Heading1(HeadingBlock {
            common,
            content: convert_text_block_content(heading_1.rich_text, heading_1.color),
            is_toggleable: false,
        })),

        BlockType::Heading2 { heading_2 } => Ok(Block::Heading2(HeadingBlock {
            common,
            content: convert_text_block_content(heading_2.rich_text, heading_2.color),
            is_toggleable: false,
        })),

        BlockType::Heading3 { heading_3 } => Ok(Block::Heading3(HeadingBlock {
            common,
            content: convert_text_block_content(heading_3.rich_text, heading_3.color),
            is_toggleable: false,
        })),

        BlockType::BulletedListItem { bulleted_list_item } => {
            Ok(Block::BulletedListItem(BulletedListItemBlock {
                common,
                content: convert_text_block_content(
                    bulleted_list_item.rich_text,
                    Some(bulleted_list_item.color),
                ),
            }))
        }

        BlockType::NumberedListItem { numbered_list_item } => {
            Ok(Block::NumberedListItem(NumberedListItemBlock {
                common,
                content: convert_text_block_content(
                    numbered_list_item.rich_text,
                    Some(numbered_list_item.color),
                ),
            }))
        }

        BlockType::ToDo { to_do } => Ok(Block::ToDo(ToDoBlock {
            common,
            content: convert_text_block_content(to_do.rich_text, to_do.color),
            checked: to_do.checked.unwrap_or(false),
        })),

        BlockType::Toggle { toggle } => Ok(Block::Toggle(ToggleBlock {
            common,
            content: convert_text_block_content(toggle.rich_text, Some(toggle.color)),
        })),

        BlockType::Quote { quote } => Ok(Block::Quote(QuoteBlock {
            common,
            content: convert_text_block_content(quote.rich_text, Some(quote.color)),
        })),

        BlockType::Callout { callout } => Ok(Block::Callout(CalloutBlock {
            common,
            icon: callout.icon.map(convert_icon),
            content: convert_text_block_content(callout.rich_text, Some(callout.color)),
        })),

        BlockType::Code { code } => Ok(Block::Code(CodeBlock {
            common,
            // The language enum serializes to the API's own name
            language: serde_json::to_value(&code.language)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string()),
            caption: convert_rich_text_array(code.caption),
            content: convert_text_block_content(code.rich_text, None),
        })),

        BlockType::Divider { .. } => Ok(Block::Divider(DividerBlock { common })),

        BlockType::Bookmark { bookmark } => Ok(Block::Bookmark(BookmarkBlock {
            common,
            url: bookmark.url,
            caption: convert_rich_text_array(bookmark.caption),
        })),

        BlockType::ChildPage { child_page } => {
            let page_id = common
                .id
                .as_ref()
                .map(|id| id.cast::<PageMarker>())
                .ok_or_else(|| NotionClientError::ConversionError {
                    message: "child_page block without an id".to_string(),
                })?;
            Ok(Block::ChildPage(ChildPageBlock {
                common,
                page_id,
                title: child_page.title,
            }))
        }

        BlockType::Image { image } => Ok(Block::Image(ImageBlock {
            common,
            image: convert_file_object(image.file_type),
            caption: Vec::new(),
        })),

        BlockType::File { file } => Ok(Block::File(FileBlock {
            common,
            file: convert_file_object(file.file_type),
            name: None,
            caption: convert_rich_text_array(file.caption),
        })),

        BlockType::Table { table } => Ok(Block::Table(TableBlock {
            common,
            table_width: table.table_width as usize,
            has_column_header: table.has_column_header,
            has_row_header: table.has_row_header,
        })),

        BlockType::TableRow { table_row } => Ok(Block::TableRow(TableRowBlock {
            common,
            cells: table_row
                .cells
                .into_iter()
                .map(convert_rich_text_array)
                .collect(),
        })),

        BlockType::LinkToPage { link_to_page } => match link_to_page {
            notion_client::objects::parent::Parent::PageId { page_id } => {
                Ok(Block::LinkToPage(LinkToPageBlock {
                    common,
                    page_id: PageId::parse(&page_id)?,
                    title: None,
                }))
            }
            // Links to databases have no page to open
            _ => Ok(Block::Unsupported(UnsupportedBlock {
                common,
                block_type: "link_to_page".to_string(),
            })),
        },

        BlockType::LinkPreview { link_preview } => Ok(Block::LinkPreview(LinkPreviewBlock {
            common,
            url: link_preview.url,
        })),

        // The remote type name is filled in by `convert_block_value`
        _ => Ok(Block::Unsupported(UnsupportedBlock {
            common,
            block_type: "unsupported".to_string(),
        })),
    }
}

/// Audio blocks are read straight from JSON.
fn convert_audio(value: &Value) -> Result<Block, AppError> {
    let common = raw_common(value)?;
    let payload = &value["audio"];

    match serde_json::from_value::<notion_client::objects::file::File>(payload.clone()) {
        Ok(file) => Ok(Block::Audio(AudioBlock {
            common,
            audio: convert_file_object(file),
            caption: raw_caption(payload),
        })),
        Err(e) => {
            log::debug!("Unreadable audio block: {}", e);
            Ok(Block::Unsupported(UnsupportedBlock {
                common,
                block_type: "audio".to_string(),
            }))
        }
    }
}

fn raw_common(value: &Value) -> Result<BlockCommon, AppError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .map(BlockId::parse)
        .transpose()?;
    Ok(BlockCommon {
        id,
        children: Vec::new(),
        has_children: value["has_children"].as_bool().unwrap_or(false),
    })
}

fn raw_caption(payload: &Value) -> Vec<RichTextItem> {
    match payload.get("caption") {
        Some(caption) => serde_json::from_value::<Vec<NcRichText>>(caption.clone())
            .map(convert_rich_text_array)
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Convert notion-client Parent to our domain Parent
fn convert_parent(
    notion_parent: notion_client::objects::parent::Parent,
) -> Result<Option<Parent>, AppError> {
    use notion_client::objects::parent::Parent as NcParent;

    let parent = match notion_parent {
        NcParent::PageId { page_id } => Parent::Page {
            page_id: PageId::parse(&page_id)?,
        },
        NcParent::DatabaseId { database_id } => Parent::Database {
            database_id: DatabaseId::parse(&database_id)?,
        },
        NcParent::BlockId { block_id } => Parent::Block {
            block_id: BlockId::parse(&block_id)?,
        },
        NcParent::Workspace { .. } => Parent::Workspace,
        #[allow(unreachable_patterns)]
        _ => return Ok(None),
    };
    Ok(Some(parent))
}

/// Convert block common fields
fn convert_block_common(notion_block: &NcBlock) -> Result<BlockCommon, AppError> {
    let id = notion_block
        .id
        .as_deref()
        .map(BlockId::parse)
        .transpose()?;

    Ok(BlockCommon {
        id,
        children: Vec::new(), // Populated on demand by the document renderer
        has_children: notion_block.has_children.unwrap_or(false),
    })
}

/// Convert text block content (rich text + color)
fn convert_text_block_content(
    rich_text: Vec<NcRichText>,
    color: Option<notion_client::objects::block::TextColor>,
) -> TextBlockContent {
    TextBlockContent {
        rich_text: convert_rich_text_array(rich_text),
        color: convert_block_color(
            color.unwrap_or(notion_client::objects::block::TextColor::Default),
        ),
    }
}

/// Convert array of rich text items, dropping kinds that carry no text
pub(crate) fn convert_rich_text_array(rich_texts: Vec<NcRichText>) -> Vec<RichTextItem> {
    rich_texts
        .into_iter()
        .filter_map(convert_rich_text)
        .collect()
}

/// Convert single rich text item
///
/// Mentions and equations keep their rendered text; the link falls back to
/// the item's `href`.
fn convert_rich_text(rich_text: NcRichText) -> Option<RichTextItem> {
    match rich_text {
        NcRichText::Text {
            text,
            annotations,
            href,
            ..
        } => Some(RichTextItem {
            content: text.content,
            annotations: convert_annotations(annotations.unwrap_or_default()),
            link: text.link.map(|link| link.url).or(href).map(|url| Link { url }),
        }),

        NcRichText::Mention {
            annotations,
            plain_text,
            href,
            ..
        } => Some(RichTextItem {
            content: plain_text,
            annotations: convert_annotations(annotations),
            link: href.map(|url| Link { url }),
        }),

        NcRichText::Equation {
            annotations,
            plain_text,
            ..
        } => Some(RichTextItem {
            content: plain_text,
            annotations: convert_annotations(annotations),
            link: None,
        }),

        #[allow(unreachable_patterns)]
        _ => {
            log::debug!("Skipping unsupported rich text item");
            None
        }
    }
}

/// Convert annotations
fn convert_annotations(
    annotations: notion_client::objects::rich_text::Annotations,
) -> crate::types::Annotations {
    crate::types::Annotations {
        bold: annotations.bold,
        italic: annotations.italic,
        strikethrough: annotations.strikethrough,
        underline: annotations.underline,
        code: annotations.code,
        color: convert_rich_text_color(annotations.color),
    }
}

/// Convert file object from notion-client to our domain type
fn convert_file_object(file: notion_client::objects::file::File) -> FileObject {
    use notion_client::objects::file::File as NcFile;

    match file {
        NcFile::External { external } => FileObject::External {
            external: ExternalFile { url: external.url },
        },
        NcFile::File { file } => FileObject::File {
            file: NotionFile {
                url: file.url,
                expiry_time: Some(file.expiry_time),
            },
        },
    }
}

/// Convert icon from notion-client to our domain type
fn convert_icon(icon: notion_client::objects::block::Icon) -> Icon {
    use notion_client::objects::block::Icon as NcIcon;

    match icon {
        NcIcon::Emoji(notion_client::objects::emoji::Emoji::Emoji { emoji }) => Icon::Emoji { emoji },
        NcIcon::File(file) => match convert_file_object(file) {
            FileObject::File { file } => Icon::File { file },
            FileObject::External { external } => Icon::External { external },
        },
    }
}

/// Generates a color conversion function from a Notion color enum to our Color type.
/// Background variants map onto the `Light*` palette.
macro_rules! impl_color_conversion {
    ($fn_name:ident, $source:ty) => {
        fn $fn_name(color: $source) -> Color {
            match color {
                <$source>::Default => Color::Default,
                <$source>::Gray => Color::Gray,
                <$source>::Brown => Color::Brown,
                <$source>::Orange => Color::Orange,
                <$source>::Yellow => Color::Yellow,
                <$source>::Green => Color::Green,
                <$source>::Blue => Color::Blue,
                <$source>::Purple => Color::Purple,
                <$source>::Pink => Color::Pink,
                <$source>::Red => Color::Red,
                <$source>::GrayBackground => Color::LightGray,
                <$source>::BrownBackground => Color::LightBrown,
                <$source>::OrangeBackground => Color::LightOrange,
                <$source>::YellowBackground => Color::LightYellow,
                <$source>::GreenBackground => Color::LightGreen,
                <$source>::BlueBackground => Color::LightBlue,
                <$source>::PurpleBackground => Color::LightPurple,
                <$source>::PinkBackground => Color::LightPink,
                <$source>::RedBackground => Color::LightRed,
            }
        }
    };
}

impl_color_conversion!(convert_block_color, notion_client::objects::block::TextColor);
impl_color_conversion!(
    convert_rich_text_color,
    notion_client::objects::rich_text::TextColor
);

/// Extract page title from properties
fn extract_page_title(
    properties: HashMap<String, notion_client::objects::page::PageProperty>,
) -> PageTitle {
    for (_, property) in properties {
        if let notion_client::objects::page::PageProperty::Title { title, .. } = property {
            let plain_text: String = convert_rich_text_array(title)
                .into_iter()
                .map(|rt| rt.content)
                .collect();
            return PageTitle::new(plain_text);
        }
    }

    PageTitle::untitled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const BLOCK_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn raw(block_type: &str, payload: Value, has_children: bool) -> Value {
        json!({
            "object": "block",
            "id": BLOCK_ID,
            "type": block_type,
            "created_time": "2024-01-01T00:00:00.000Z",
            "last_edited_time": "2024-01-01T00:00:00.000Z",
            "has_children": has_children,
            "archived": false,
            block_type: payload,
        })
    }

    fn text(content: &str) -> Value {
        json!({
            "type": "text",
            "text": { "content": content, "link": null },
            "annotations": {
                "bold": true, "italic": false, "strikethrough": false,
                "underline": false, "code": false, "color": "red_background"
            },
            "plain_text": content,
            "href": null
        })
    }

    #[test]
    fn test_paragraph_with_annotations() {
        let block = convert_block_value(raw(
            "paragraph",
            json!({ "rich_text": [text("Hello")], "color": "default" }),
            true,
        ))
        .unwrap();

        let Block::Paragraph(paragraph) = &block else {
            panic!("expected paragraph, got {:?}", block);
        };
        assert!(paragraph.common.has_unfetched_children());
        assert_eq!(
            paragraph.content.rich_text,
            vec![RichTextItem::styled(
                "Hello",
                crate::types::Annotations::bold().with_color(Color::LightRed)
            )]
        );
    }

    #[test]
    fn test_audio_is_read_from_json() {
        let block = convert_block_value(raw(
            "audio",
            json!({ "type": "external", "external": { "url": "https://cdn.example/a.mp3" }, "caption": [] }),
            false,
        ))
        .unwrap();
        let Block::Audio(audio) = &block else {
            panic!("expected audio, got {:?}", block);
        };
        assert_eq!(audio.audio.url(), "https://cdn.example/a.mp3");
    }

    #[test]
    fn test_unknown_type_keeps_its_name() {
        let block = convert_block_value(raw("mystery_widget", json!({}), false)).unwrap();
        assert_eq!(block.block_type(), "mystery_widget");
        assert_eq!(
            block.id().map(|id| id.as_str()),
            Some("550e8400e29b41d4a716446655440000")
        );
    }
}
