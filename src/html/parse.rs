// src/html/parse.rs
//! Editor markup → blocks.
//!
//! An element's block kind comes from its `data-notion-block-type`
//! attribute when present, otherwise from its tag and classes. Conversion
//! never fails: markup that cannot become a block yields nothing.

use super::dom::{
    self, child_elements, declared_id, declared_kind, find_descendant, find_tag, has_class, raw_text,
    tag,
};
use super::rich_text::{runs_excluding, runs_from_element};
use super::{AnnotationMode, ConversionOptions};
use crate::constants::{DEFAULT_CODE_LANGUAGE, UNTITLED_PAGE};
use crate::model::*;
use crate::types::{plain_text_of, RichTextItem};
use scraper::ElementRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
}

/// What an element stands for, once dispatch or inference has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Paragraph,
    Heading(u8),
    List(ListKind),
    TodoList,
    TodoItem,
    Code,
    Divider,
    Image,
    Callout,
    File,
    Bookmark,
    LinkPreview,
    LinkToPage,
    ChildPage,
    Table,
    Toggle,
    Audio,
    Quote,
    /// A `div` grouping block-level elements; its children convert in place.
    Wrapper,
}

/// Converts one element into blocks.
///
/// Lists yield one block per item; every other kind yields at most one.
/// An empty result means the element has no block counterpart.
pub fn block_from_element(element: ElementRef<'_>, options: &ConversionOptions) -> Vec<Block> {
    let Some(kind) = classify(&element) else {
        log::debug!("No block counterpart for <{}>", tag(&element));
        return Vec::new();
    };

    let common = BlockCommon::new(declared_id(&element));
    let mode = options.annotation_mode;

    let block = match kind {
        ElementKind::List(list) => return list_items(element, list, options),
        ElementKind::TodoList => return todo_items(element, options),
        ElementKind::Wrapper => {
            return child_elements(&element)
                .flat_map(|child| block_from_element(child, options))
                .collect()
        }
        ElementKind::TodoItem => Some(todo(element, common, options)),
        ElementKind::Paragraph => Some(Block::Paragraph(ParagraphBlock {
            common,
            content: TextBlockContent::new(runs_from_element(element, mode)),
        })),
        ElementKind::Heading(level) => Some(heading(element, common, level, options)),
        ElementKind::Code => Some(code(element, common, options)),
        ElementKind::Divider => Some(Block::Divider(DividerBlock { common })),
        ElementKind::Image => image(element, common, mode),
        ElementKind::Callout => Some(callout(element, common, options)),
        ElementKind::File => file(element, common),
        ElementKind::Bookmark => bookmark(element, common, mode),
        ElementKind::LinkPreview => anchor_href(&element).map(|url| {
            Block::LinkPreview(LinkPreviewBlock { common, url })
        }),
        ElementKind::LinkToPage => page_link(&element).map(|(page_id, title)| {
            Block::LinkToPage(LinkToPageBlock {
                common,
                page_id,
                title,
            })
        }),
        ElementKind::ChildPage => page_link(&element).map(|(page_id, title)| {
            Block::ChildPage(ChildPageBlock {
                common,
                page_id,
                title: title.unwrap_or_else(|| UNTITLED_PAGE.to_string()),
            })
        }),
        ElementKind::Table => table(element, common, mode),
        ElementKind::Toggle => Some(toggle(element, common, options)),
        ElementKind::Audio => audio(&element, common),
        ElementKind::Quote => {
            let (rich_text, children) = primary_and_children(element, options, &|_| false);
            Some(Block::Quote(QuoteBlock {
                common: common.with_children(children),
                content: TextBlockContent::new(rich_text),
            }))
        }
    };

    block.into_iter().collect()
}

fn classify(element: &ElementRef<'_>) -> Option<ElementKind> {
    match declared_kind(element) {
        Some(Ok(kind)) => from_declared(kind, element),
        Some(Err(unknown)) => {
            log::debug!("Ignoring element with unknown block type '{}'", unknown);
            None
        }
        None => infer(element),
    }
}

fn from_declared(kind: BlockKind, element: &ElementRef<'_>) -> Option<ElementKind> {
    let name = tag(element);
    let list_markup = dom::is_list(name) || name == "li";
    let kind = match kind {
        BlockKind::Paragraph => ElementKind::Paragraph,
        BlockKind::Heading1 => ElementKind::Heading(1),
        BlockKind::Heading2 => ElementKind::Heading(2),
        BlockKind::Heading3 => ElementKind::Heading(3),
        BlockKind::BulletedListItem => ElementKind::List(ListKind::Bulleted),
        BlockKind::NumberedListItem => ElementKind::List(ListKind::Numbered),
        BlockKind::ToDo if list_markup => ElementKind::TodoList,
        BlockKind::ToDo => ElementKind::TodoItem,
        BlockKind::Toggle => ElementKind::Toggle,
        BlockKind::Quote => ElementKind::Quote,
        BlockKind::Callout => ElementKind::Callout,
        BlockKind::Code => ElementKind::Code,
        BlockKind::Divider => ElementKind::Divider,
        BlockKind::Image => ElementKind::Image,
        BlockKind::File => ElementKind::File,
        BlockKind::Audio => ElementKind::Audio,
        BlockKind::Bookmark => ElementKind::Bookmark,
        BlockKind::LinkPreview => ElementKind::LinkPreview,
        BlockKind::LinkToPage => ElementKind::LinkToPage,
        BlockKind::ChildPage => ElementKind::ChildPage,
        BlockKind::Table => ElementKind::Table,
        // Rows only exist inside a table; placeholders are never written back.
        BlockKind::TableRow | BlockKind::Unsupported => return None,
    };
    Some(kind)
}

fn infer(element: &ElementRef<'_>) -> Option<ElementKind> {
    let kind = match tag(element) {
        "p" => ElementKind::Paragraph,
        "h1" => ElementKind::Heading(1),
        "h2" => ElementKind::Heading(2),
        "h3" | "h4" | "h5" | "h6" => ElementKind::Heading(3),
        "ul" if has_class(element, "todo-list") => ElementKind::TodoList,
        "ul" => ElementKind::List(ListKind::Bulleted),
        "ol" => ElementKind::List(ListKind::Numbered),
        "pre" => ElementKind::Code,
        "table" => ElementKind::Table,
        "figure" if find_tag(element, "table").is_some() => ElementKind::Table,
        "figure" | "img" => ElementKind::Image,
        "blockquote" => ElementKind::Quote,
        "hr" => ElementKind::Divider,
        "details" => match toggle_heading_level(element) {
            Some(level) => ElementKind::Heading(level),
            None => ElementKind::Toggle,
        },
        "audio" => ElementKind::Audio,
        "div" if has_class(element, "callout") => ElementKind::Callout,
        "div" if child_elements(element).any(|c| dom::is_block_level(tag(&c))) => {
            ElementKind::Wrapper
        }
        "div" => ElementKind::Paragraph,
        _ => return None,
    };
    Some(kind)
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" | "h4" | "h5" | "h6" => Some(3),
        _ => None,
    }
}

fn summary_of<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    child_elements(element).find(|c| tag(c) == "summary")
}

/// Level of a `<details>` whose summary is a heading.
fn toggle_heading_level(element: &ElementRef<'_>) -> Option<u8> {
    let summary = summary_of(element)?;
    child_elements(&summary).find_map(|c| heading_level(tag(&c)))
}

/// A heading, or a toggleable heading when it comes as `<details>`: the
/// summary holds the heading text and the rest of the body its children.
fn heading(
    element: ElementRef<'_>,
    common: BlockCommon,
    level: u8,
    options: &ConversionOptions,
) -> Block {
    let mode = options.annotation_mode;
    let heading = match (tag(&element), summary_of(&element)) {
        ("details", Some(summary)) => {
            let title = child_elements(&summary)
                .find(|c| heading_level(tag(c)).is_some())
                .unwrap_or(summary);
            let children = child_elements(&element)
                .filter(|c| tag(c) != "summary")
                .flat_map(|child| block_from_element(child, options))
                .collect();
            HeadingBlock {
                common: common.with_children(children),
                content: TextBlockContent::new(runs_from_element(title, mode)),
                is_toggleable: true,
            }
        }
        _ => HeadingBlock {
            common,
            content: TextBlockContent::new(runs_from_element(element, mode)),
            is_toggleable: false,
        },
    };
    match level {
        1 => Block::Heading1(heading),
        2 => Block::Heading2(heading),
        _ => Block::Heading3(heading),
    }
}

/// The `li` elements a list element stands for. A bare `li` stands for itself.
fn list_elements<'a>(element: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    if tag(element) == "li" {
        vec![*element]
    } else {
        child_elements(element).filter(|c| tag(c) == "li").collect()
    }
}

/// Item id: the `li`'s own, or the list's when the list holds a single item.
fn item_id(list: &ElementRef<'_>, item: &ElementRef<'_>, single: bool) -> BlockCommon {
    let id = declared_id(item).or_else(|| if single { declared_id(list) } else { None });
    BlockCommon::new(id)
}

fn is_block_element(element: &ElementRef<'_>) -> bool {
    dom::is_block_level(tag(element))
}

fn list_items(element: ElementRef<'_>, kind: ListKind, options: &ConversionOptions) -> Vec<Block> {
    let items = list_elements(&element);
    let single = items.len() == 1;

    items
        .into_iter()
        .map(|item| {
            let (rich_text, children) = primary_and_children(item, options, &|_| false);
            let common = item_id(&element, &item, single).with_children(children);
            let content = TextBlockContent::new(rich_text);
            match kind {
                ListKind::Bulleted => Block::BulletedListItem(BulletedListItemBlock { common, content }),
                ListKind::Numbered => Block::NumberedListItem(NumberedListItemBlock { common, content }),
            }
        })
        .collect()
}

fn todo_items(element: ElementRef<'_>, options: &ConversionOptions) -> Vec<Block> {
    let items = list_elements(&element);
    let single = items.len() == 1;

    items
        .into_iter()
        .map(|item| {
            let common = item_id(&element, &item, single);
            todo(item, common, options)
        })
        .collect()
}

/// A checklist entry: checkbox state, label text and nested blocks.
fn todo(item: ElementRef<'_>, common: BlockCommon, options: &ConversionOptions) -> Block {
    let mode = options.annotation_mode;
    let checked = find_descendant(&item, &|c| tag(c) == "input", &is_block_element)
        .is_some_and(|input| input.value().attr("checked").is_some());

    let label = find_descendant(
        &item,
        &|c| has_class(c, "todo-list__label__description"),
        &is_block_element,
    );
    let (rich_text, children) = match label {
        Some(label) => {
            let children = child_elements(&item)
                .filter(is_block_element)
                .flat_map(|child| block_from_element(child, options))
                .collect();
            (runs_from_element(label, mode), children)
        }
        None => primary_and_children(item, options, &|_| false),
    };

    Block::ToDo(ToDoBlock {
        common: common.with_children(children),
        content: TextBlockContent::new(rich_text),
        checked,
    })
}

/// Maps a `language-*` class suffix onto a Notion language name.
pub(crate) fn language_from_class(suffix: &str) -> String {
    match suffix.to_ascii_lowercase().as_str() {
        "" | "plaintext" | "plain" | "text" | "plain-text" | "none" => {
            DEFAULT_CODE_LANGUAGE.to_string()
        }
        "visual-basic" => "visual basic".to_string(),
        "notion-formula" => "notion formula".to_string(),
        other => other.to_string(),
    }
}

fn language_of(element: &ElementRef<'_>) -> Option<String> {
    element
        .value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .map(language_from_class)
}

fn code(element: ElementRef<'_>, common: BlockCommon, options: &ConversionOptions) -> Block {
    let code_element = if tag(&element) == "code" {
        Some(element)
    } else {
        find_tag(&element, "code")
    };

    let language = code_element
        .as_ref()
        .and_then(language_of)
        .or_else(|| language_of(&element))
        .unwrap_or_else(|| options.default_code_language.clone());

    // Code keeps its whitespace verbatim.
    let text = raw_text(&code_element.unwrap_or(element));
    let rich_text = if text.is_empty() {
        Vec::new()
    } else {
        vec![RichTextItem::plain_text(&text)]
    };

    Block::Code(CodeBlock {
        common,
        language,
        caption: Vec::new(),
        content: TextBlockContent::new(rich_text),
    })
}

fn image(element: ElementRef<'_>, common: BlockCommon, mode: AnnotationMode) -> Option<Block> {
    let img = if tag(&element) == "img" {
        element
    } else {
        find_tag(&element, "img")?
    };
    let src = non_empty_attr(&img, "src")?;

    let caption = match find_tag(&element, "figcaption") {
        Some(figcaption) => runs_from_element(figcaption, mode),
        None => non_empty_attr(&img, "alt")
            .map(|alt| vec![RichTextItem::plain_text(&alt)])
            .unwrap_or_default(),
    };

    Some(Block::Image(ImageBlock {
        common,
        image: FileObject::external(src),
        caption,
    }))
}

/// Splits a container into its primary text and converted block children.
///
/// Inline content forms the primary text. When there is none and the first
/// block-level child is a bare paragraph, that paragraph's text is promoted.
/// A paragraph carrying a block type is a real child and stays one.
fn primary_and_children(
    element: ElementRef<'_>,
    options: &ConversionOptions,
    exclude: &dyn Fn(&ElementRef<'_>) -> bool,
) -> (Vec<RichTextItem>, Vec<Block>) {
    let mode = options.annotation_mode;
    let inline_only = |c: &ElementRef<'_>| dom::is_block_level(tag(c)) || exclude(c);
    let mut rich_text = runs_excluding(element, mode, &inline_only);

    let mut block_elements: Vec<ElementRef<'_>> = child_elements(&element)
        .filter(|c| dom::is_block_level(tag(c)) && !exclude(c))
        .collect();

    if rich_text.is_empty() {
        let promotable = |f: &ElementRef<'_>| tag(f) == "p" && declared_kind(f).is_none();
        if let Some(first) = block_elements.first().copied().filter(promotable) {
            rich_text = runs_from_element(first, mode);
            block_elements.remove(0);
        }
    }

    let children = block_elements
        .into_iter()
        .flat_map(|child| block_from_element(child, options))
        .collect();
    (rich_text, children)
}

fn callout(element: ElementRef<'_>, common: BlockCommon, options: &ConversionOptions) -> Block {
    let is_icon = |c: &ElementRef<'_>| has_class(c, "callout-icon");
    let icon = find_descendant(&element, &is_icon, &|c| dom::is_block_level(tag(c)))
        .map(|span| raw_text(&span).trim().to_string())
        .filter(|emoji| !emoji.is_empty())
        .map(Icon::emoji);

    let (rich_text, children) = primary_and_children(element, options, &is_icon);
    Block::Callout(CalloutBlock {
        common: common.with_children(children),
        icon,
        content: TextBlockContent::new(rich_text),
    })
}

fn toggle(element: ElementRef<'_>, common: BlockCommon, options: &ConversionOptions) -> Block {
    let summary = summary_of(&element);

    let (rich_text, children) = match summary {
        Some(summary) => {
            let children = child_elements(&element)
                .filter(|c| tag(c) != "summary")
                .flat_map(|child| block_from_element(child, options))
                .collect();
            (runs_from_element(summary, options.annotation_mode), children)
        }
        None => primary_and_children(element, options, &|_| false),
    };

    Block::Toggle(ToggleBlock {
        common: common.with_children(children),
        content: TextBlockContent::new(rich_text),
    })
}

fn non_empty_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn anchor_of<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if tag(element) == "a" {
        Some(*element)
    } else {
        find_tag(element, "a")
    }
}

fn anchor_href(element: &ElementRef<'_>) -> Option<String> {
    non_empty_attr(&anchor_of(element)?, "href")
}

fn file(element: ElementRef<'_>, common: BlockCommon) -> Option<Block> {
    let anchor = anchor_of(&element)?;
    let url = non_empty_attr(&anchor, "href")?;
    let name = non_empty_attr(&anchor, "download").or_else(|| {
        let text = raw_text(&anchor).trim().to_string();
        (!text.is_empty()).then_some(text)
    });

    Some(Block::File(FileBlock {
        common,
        file: FileObject::external(url),
        name,
        caption: Vec::new(),
    }))
}

fn bookmark(element: ElementRef<'_>, common: BlockCommon, mode: AnnotationMode) -> Option<Block> {
    let anchor = anchor_of(&element)?;
    let url = non_empty_attr(&anchor, "href")?;

    let mut caption = runs_from_element(anchor, mode);
    if plain_text_of(&caption).trim() == url {
        caption.clear();
    }

    Some(Block::Bookmark(BookmarkBlock {
        common,
        url,
        caption,
    }))
}

/// Target page and link text of an in-app page link.
fn page_link(element: &ElementRef<'_>) -> Option<(crate::types::PageId, Option<String>)> {
    let anchor = anchor_of(element)?;
    let page_id = dom::page_id_from_href(anchor.value().attr("href")?)?;
    let title = raw_text(&anchor).trim().to_string();
    Some((page_id, (!title.is_empty()).then_some(title)))
}

fn audio(element: &ElementRef<'_>, common: BlockCommon) -> Option<Block> {
    let src = non_empty_attr(element, "src")
        .or_else(|| find_tag(element, "source").and_then(|source| non_empty_attr(&source, "src")))?;

    Some(Block::Audio(AudioBlock {
        common,
        audio: FileObject::external(src),
        caption: Vec::new(),
    }))
}

fn table_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match tag(&child) {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child_elements(&child).filter(|row| tag(row) == "tr"))
            }
            _ => {}
        }
    }
    rows
}

fn row_cells<'a>(row: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(row).filter(|cell| matches!(tag(cell), "td" | "th"))
}

/// A table whose rows are the `tr` elements of this table (not of nested
/// tables). Width is taken from the first row; other rows are padded with
/// empty cells or truncated to match.
fn table(element: ElementRef<'_>, common: BlockCommon, mode: AnnotationMode) -> Option<Block> {
    let table = if tag(&element) == "table" {
        element
    } else {
        find_tag(&element, "table")?
    };

    let rows = table_rows(&table);
    let table_width = row_cells(rows.first()?).count();
    if table_width == 0 {
        log::debug!("Skipping table whose first row has no cells");
        return None;
    }

    let has_column_header = rows
        .iter()
        .any(|row| row_cells(row).any(|cell| tag(&cell) == "th"));

    let children = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<Vec<RichTextItem>> = row_cells(row)
                .take(table_width)
                .map(|cell| runs_from_element(cell, mode))
                .collect();
            cells.resize(table_width, Vec::new());
            Block::TableRow(TableRowBlock {
                common: BlockCommon::new(declared_id(row)),
                cells,
            })
        })
        .collect();

    Some(Block::Table(TableBlock {
        common: common.with_children(children),
        table_width,
        has_column_header,
        has_row_header: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Annotations;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn convert(markup: &str) -> Vec<Block> {
        let fragment = Html::parse_fragment(markup);
        child_elements(&fragment.root_element())
            .flat_map(|el| block_from_element(el, &ConversionOptions::default()))
            .collect()
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .map(|b| plain_text_of(b.rich_text().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_attribute_overrides_tag() {
        let blocks = convert(r#"<div data-notion-block-type="quote">Said</div>"#);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind(), BlockKind::Quote);
    }

    #[test]
    fn test_unknown_and_placeholder_types_are_dropped() {
        assert!(convert(r#"<p data-notion-block-type="synced_block">x</p>"#).is_empty());
        assert!(convert(r#"<p data-notion-block-type="unsupported">x</p>"#).is_empty());
        assert!(convert("<span>loose</span>").is_empty());
    }

    #[test]
    fn test_block_id_is_carried() {
        let blocks = convert(
            r#"<p data-notion-block-type="paragraph" data-notion-block-id="550e8400-e29b-41d4-a716-446655440000">Hi</p>"#,
        );
        assert_eq!(
            blocks[0].id().map(|id| id.as_str()),
            Some("550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_deep_headings_clamp_to_level_three() {
        let blocks = convert("<h5>Deep</h5>");
        assert_eq!(blocks[0].kind(), BlockKind::Heading3);
    }

    #[test]
    fn test_nested_list_becomes_children() {
        let blocks = convert("<ol><li>One<ul><li>Inner</li></ul></li><li>Two</li></ol>");
        assert_eq!(texts(&blocks), vec!["One", "Two"]);
        assert_eq!(blocks[0].kind(), BlockKind::NumberedListItem);
        assert!(blocks[0].has_children());
        assert_eq!(blocks[0].children()[0].kind(), BlockKind::BulletedListItem);
        assert!(!blocks[1].has_children());
    }

    #[test]
    fn test_todo_reads_checkbox_and_label() {
        let blocks = convert(
            r#"<ul class="todo-list"><li><label class="todo-list__label"><input type="checkbox" checked="checked"><span class="todo-list__label__description">Ship it</span></label></li></ul>"#,
        );
        let Block::ToDo(todo) = &blocks[0] else {
            panic!("expected a to-do, got {:?}", blocks[0]);
        };
        assert!(todo.checked);
        assert_eq!(plain_text_of(&todo.content.rich_text), "Ship it");
    }

    #[test]
    fn test_code_keeps_whitespace_and_language() {
        let blocks = convert("<pre><code class=\"language-rust\">fn main() {\n    run();\n}</code></pre>");
        let Block::Code(code) = &blocks[0] else {
            panic!("expected code");
        };
        assert_eq!(code.language, "rust");
        assert_eq!(
            plain_text_of(&code.content.rich_text),
            "fn main() {\n    run();\n}"
        );

        let blocks = convert("<pre>x</pre>");
        let Block::Code(code) = &blocks[0] else {
            panic!("expected code");
        };
        assert_eq!(code.language, DEFAULT_CODE_LANGUAGE);
    }

    #[test]
    fn test_table_rows_are_padded_and_truncated() {
        let blocks = convert(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr><tr><td>x</td><td>y</td><td>z</td></tr></table>",
        );
        let Block::Table(table) = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.table_width, 2);
        assert!(table.has_column_header);
        for row in &table.common.children {
            let Block::TableRow(row) = row else {
                panic!("expected row");
            };
            assert_eq!(row.cells.len(), 2);
        }
        assert!(convert("<table></table>").is_empty());
    }

    #[test]
    fn test_nested_table_rows_stay_inside() {
        let blocks = convert(
            "<table><tr><td>outer<table><tr><td>inner</td></tr></table></td></tr></table>",
        );
        let Block::Table(table) = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.common.children.len(), 1);
        assert!(!table.has_column_header);
    }

    #[test]
    fn test_callout_splits_icon_text_and_children() {
        let blocks = convert(
            r#"<div class="callout"><span class="callout-icon">💡</span>Tip <strong>here</strong><ul><li>detail</li></ul></div>"#,
        );
        let Block::Callout(callout) = &blocks[0] else {
            panic!("expected callout");
        };
        assert_eq!(callout.icon.as_ref().and_then(Icon::as_emoji), Some("💡"));
        assert_eq!(
            callout.content.rich_text,
            vec![
                RichTextItem::plain_text("Tip "),
                RichTextItem::styled("here", Annotations::bold()),
            ]
        );
        assert_eq!(callout.common.children.len(), 1);
    }

    #[test]
    fn test_quote_promotes_leading_paragraph() {
        let blocks = convert("<blockquote><p>First</p><p>Second</p></blockquote>");
        assert_eq!(texts(&blocks), vec!["First"]);
        assert_eq!(texts(blocks[0].children()), vec!["Second"]);
    }

    #[test]
    fn test_typed_paragraph_is_never_promoted() {
        let blocks = convert(
            r#"<blockquote><p data-notion-block-type="paragraph">Child</p></blockquote>"#,
        );
        assert_eq!(texts(&blocks), vec![""]);
        assert_eq!(texts(blocks[0].children()), vec!["Child"]);
    }

    #[test]
    fn test_list_item_block_content_becomes_children() {
        let blocks = convert("<ul><li><p>Lead</p></li><li>Item<p>detail</p><hr></li></ul>");
        assert_eq!(texts(&blocks), vec!["Lead", "Item"]);
        assert!(!blocks[0].has_children());
        assert_eq!(
            blocks[1].children().iter().map(Block::kind).collect::<Vec<_>>(),
            vec![BlockKind::Paragraph, BlockKind::Divider]
        );
    }

    #[test]
    fn test_details_with_heading_summary_is_a_toggleable_heading() {
        let blocks = convert("<details><summary><h3>Notes</h3></summary><p>Body</p></details>");
        let Block::Heading3(heading) = &blocks[0] else {
            panic!("expected heading_3, got {:?}", blocks[0]);
        };
        assert!(heading.is_toggleable);
        assert_eq!(plain_text_of(&heading.content.rich_text), "Notes");
        assert_eq!(texts(&heading.common.children), vec!["Body"]);
    }

    #[test]
    fn test_toggle_summary_and_body() {
        let blocks = convert("<details><summary>More</summary><p>Hidden</p></details>");
        assert_eq!(texts(&blocks), vec!["More"]);
        assert_eq!(texts(blocks[0].children()), vec!["Hidden"]);
    }

    #[test]
    fn test_page_links_require_an_id() {
        let blocks = convert(
            r#"<p data-notion-block-type="link_to_page"><a href="/page/550e8400e29b41d4a716446655440000">Docs</a></p>"#,
        );
        let Block::LinkToPage(link) = &blocks[0] else {
            panic!("expected link_to_page");
        };
        assert_eq!(link.title.as_deref(), Some("Docs"));

        assert!(convert(r#"<p data-notion-block-type="link_to_page"><a href="/page/nope">x</a></p>"#)
            .is_empty());
    }

    #[test]
    fn test_bookmark_caption_dropped_when_it_is_the_url() {
        let blocks = convert(
            r#"<p data-notion-block-type="bookmark"><a href="https://rust-lang.org">https://rust-lang.org</a></p>"#,
        );
        let Block::Bookmark(bookmark) = &blocks[0] else {
            panic!("expected bookmark");
        };
        assert!(bookmark.caption.is_empty());
    }

    #[test]
    fn test_media_elements() {
        let blocks = convert(
            r#"<figure class="image"><img src="https://cdn.example/cat.png" alt="cat"></figure><audio controls><source src="https://cdn.example/a.mp3"></audio><img alt="no source">"#,
        );
        assert_eq!(blocks.len(), 2);
        let Block::Image(image) = &blocks[0] else {
            panic!("expected image");
        };
        assert_eq!(image.image.url(), "https://cdn.example/cat.png");
        assert_eq!(plain_text_of(&image.caption), "cat");
        assert_eq!(blocks[1].kind(), BlockKind::Audio);
    }

    #[test]
    fn test_wrapper_div_flattens() {
        let blocks = convert("<div><p>a</p><hr><p>b</p></div>");
        assert_eq!(
            blocks.iter().map(Block::kind).collect::<Vec<_>>(),
            vec![BlockKind::Paragraph, BlockKind::Divider, BlockKind::Paragraph]
        );
    }
}
