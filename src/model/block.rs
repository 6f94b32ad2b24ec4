use super::blocks::*;
use super::common::BlockCommon;
use crate::types::{BlockId, RichTextItem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to reduce boilerplate in Block enum methods
macro_rules! match_all_blocks {
    ($self:expr, $pattern:pat => $result:expr) => {
        match $self {
            Block::Paragraph($pattern) => $result,
            Block::Heading1($pattern) => $result,
            Block::Heading2($pattern) => $result,
            Block::Heading3($pattern) => $result,
            Block::BulletedListItem($pattern) => $result,
            Block::NumberedListItem($pattern) => $result,
            Block::ToDo($pattern) => $result,
            Block::Toggle($pattern) => $result,
            Block::Quote($pattern) => $result,
            Block::Callout($pattern) => $result,
            Block::Code($pattern) => $result,
            Block::Divider($pattern) => $result,
            Block::Image($pattern) => $result,
            Block::File($pattern) => $result,
            Block::Audio($pattern) => $result,
            Block::Bookmark($pattern) => $result,
            Block::LinkPreview($pattern) => $result,
            Block::LinkToPage($pattern) => $result,
            Block::ChildPage($pattern) => $result,
            Block::Table($pattern) => $result,
            Block::TableRow($pattern) => $result,
            Block::Unsupported($pattern) => $result,
        }
    };
}

/// Block represents every structural content unit the editor understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(ParagraphBlock),
    Heading1(HeadingBlock),
    Heading2(HeadingBlock),
    Heading3(HeadingBlock),
    BulletedListItem(BulletedListItemBlock),
    NumberedListItem(NumberedListItemBlock),
    ToDo(ToDoBlock),
    Toggle(ToggleBlock),
    Quote(QuoteBlock),
    Callout(CalloutBlock),
    Code(CodeBlock),
    Divider(DividerBlock),
    Image(ImageBlock),
    File(FileBlock),
    Audio(AudioBlock),
    Bookmark(BookmarkBlock),
    LinkPreview(LinkPreviewBlock),
    LinkToPage(LinkToPageBlock),
    ChildPage(ChildPageBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    Unsupported(UnsupportedBlock),
}

impl Block {
    /// Get the block's ID, if the remote store has assigned one
    pub fn id(&self) -> Option<&BlockId> {
        match_all_blocks!(self, b => b.common.id.as_ref())
    }

    /// Get the block's children
    pub fn children(&self) -> &Vec<Block> {
        match_all_blocks!(self, b => &b.common.children)
    }

    /// Get mutable reference to children
    pub fn children_mut(&mut self) -> &mut Vec<Block> {
        match_all_blocks!(self, b => &mut b.common.children)
    }

    /// Check if block has children
    pub fn has_children(&self) -> bool {
        self.common().has_children
    }

    /// Get common block data
    pub fn common(&self) -> &BlockCommon {
        match_all_blocks!(self, b => &b.common)
    }

    /// Get mutable common block data
    pub fn common_mut(&mut self) -> &mut BlockCommon {
        match_all_blocks!(self, b => &mut b.common)
    }

    /// Replace children, keeping `has_children` consistent with the new list
    pub fn set_children(&mut self, children: Vec<Block>) {
        let common = self.common_mut();
        common.has_children = !children.is_empty();
        common.children = children;
    }

    /// The block's kind tag
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::Heading1(_) => BlockKind::Heading1,
            Block::Heading2(_) => BlockKind::Heading2,
            Block::Heading3(_) => BlockKind::Heading3,
            Block::BulletedListItem(_) => BlockKind::BulletedListItem,
            Block::NumberedListItem(_) => BlockKind::NumberedListItem,
            Block::ToDo(_) => BlockKind::ToDo,
            Block::Toggle(_) => BlockKind::Toggle,
            Block::Quote(_) => BlockKind::Quote,
            Block::Callout(_) => BlockKind::Callout,
            Block::Code(_) => BlockKind::Code,
            Block::Divider(_) => BlockKind::Divider,
            Block::Image(_) => BlockKind::Image,
            Block::File(_) => BlockKind::File,
            Block::Audio(_) => BlockKind::Audio,
            Block::Bookmark(_) => BlockKind::Bookmark,
            Block::LinkPreview(_) => BlockKind::LinkPreview,
            Block::LinkToPage(_) => BlockKind::LinkToPage,
            Block::ChildPage(_) => BlockKind::ChildPage,
            Block::Table(_) => BlockKind::Table,
            Block::TableRow(_) => BlockKind::TableRow,
            Block::Unsupported(_) => BlockKind::Unsupported,
        }
    }

    /// Get block type name
    pub fn block_type(&self) -> &str {
        match self {
            Block::Unsupported(b) => &b.block_type,
            other => other.kind().as_str(),
        }
    }

    /// The block's primary rich text, for kinds that carry one
    pub fn rich_text(&self) -> Option<&[RichTextItem]> {
        match self {
            Block::Paragraph(b) => Some(&b.content.rich_text),
            Block::Heading1(b) | Block::Heading2(b) | Block::Heading3(b) => {
                Some(&b.content.rich_text)
            }
            Block::BulletedListItem(b) => Some(&b.content.rich_text),
            Block::NumberedListItem(b) => Some(&b.content.rich_text),
            Block::ToDo(b) => Some(&b.content.rich_text),
            Block::Toggle(b) => Some(&b.content.rich_text),
            Block::Quote(b) => Some(&b.content.rich_text),
            Block::Callout(b) => Some(&b.content.rich_text),
            Block::Code(b) => Some(&b.content.rich_text),
            _ => None,
        }
    }

    /// Whether this kind may hold nested child blocks
    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Counts this block and all of its materialized descendants
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Block::subtree_len).sum::<usize>()
    }
}

/// The closed set of block kinds, named as the markup and the API spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Toggle,
    Quote,
    Callout,
    Code,
    Divider,
    Image,
    File,
    Audio,
    Bookmark,
    LinkPreview,
    LinkToPage,
    ChildPage,
    Table,
    TableRow,
    Unsupported,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "heading_1",
            BlockKind::Heading2 => "heading_2",
            BlockKind::Heading3 => "heading_3",
            BlockKind::BulletedListItem => "bulleted_list_item",
            BlockKind::NumberedListItem => "numbered_list_item",
            BlockKind::ToDo => "to_do",
            BlockKind::Toggle => "toggle",
            BlockKind::Quote => "quote",
            BlockKind::Callout => "callout",
            BlockKind::Code => "code",
            BlockKind::Divider => "divider",
            BlockKind::Image => "image",
            BlockKind::File => "file",
            BlockKind::Audio => "audio",
            BlockKind::Bookmark => "bookmark",
            BlockKind::LinkPreview => "link_preview",
            BlockKind::LinkToPage => "link_to_page",
            BlockKind::ChildPage => "child_page",
            BlockKind::Table => "table",
            BlockKind::TableRow => "table_row",
            BlockKind::Unsupported => "unsupported",
        }
    }

    /// Parses a kind tag. List wrappers (`bulleted_list`, `numbered_list`)
    /// name the kind of the items they hold.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.trim() {
            "paragraph" => BlockKind::Paragraph,
            "heading_1" => BlockKind::Heading1,
            "heading_2" => BlockKind::Heading2,
            "heading_3" => BlockKind::Heading3,
            "bulleted_list" | "bulleted_list_item" => BlockKind::BulletedListItem,
            "numbered_list" | "numbered_list_item" => BlockKind::NumberedListItem,
            "to_do" | "todo" => BlockKind::ToDo,
            "toggle" => BlockKind::Toggle,
            "quote" => BlockKind::Quote,
            "callout" => BlockKind::Callout,
            "code" => BlockKind::Code,
            "divider" => BlockKind::Divider,
            "image" => BlockKind::Image,
            "file" => BlockKind::File,
            "audio" => BlockKind::Audio,
            "bookmark" => BlockKind::Bookmark,
            "link_preview" | "link" => BlockKind::LinkPreview,
            "link_to_page" => BlockKind::LinkToPage,
            "child_page" => BlockKind::ChildPage,
            "table" => BlockKind::Table,
            "table_row" => BlockKind::TableRow,
            _ => return None,
        };
        Some(kind)
    }

    /// The tag written on list wrapper elements for list item kinds.
    pub fn list_tag(&self) -> &'static str {
        match self {
            BlockKind::BulletedListItem => "bulleted_list",
            BlockKind::NumberedListItem => "numbered_list",
            other => other.as_str(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockKind::BulletedListItem
                | BlockKind::NumberedListItem
                | BlockKind::ToDo
                | BlockKind::Toggle
                | BlockKind::Quote
                | BlockKind::Callout
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
