// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips while listing children.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// How many blocks a single "append children" request may carry.
pub const NOTION_APPEND_BATCH_SIZE: usize = 100;

/// Longest `text.content` the Notion API accepts in one rich text object.
pub const NOTION_RICH_TEXT_MAX_CHARS: usize = 2000;

/// Maximum nesting depth when recursively fetching block children.
///
/// Notion content can nest arbitrarily deep. This limit prevents
/// runaway fetches; 50 levels is far deeper than any real document.
pub const NOTION_MAX_FETCH_DEPTH: u8 = 50;

/// Title substituted when a page has none or its title cannot be fetched.
pub const UNTITLED_PAGE: &str = "Untitled";

/// Suffix appended to the title of a duplicated page.
pub const DUPLICATE_TITLE_SUFFIX: &str = " (copy)";

// ---------------------------------------------------------------------------
// Editor markup vocabulary
// ---------------------------------------------------------------------------

/// Attribute carrying the block kind on editor markup.
pub const BLOCK_TYPE_ATTR: &str = "data-notion-block-type";

/// Attribute carrying the remote block id on editor markup.
pub const BLOCK_ID_ATTR: &str = "data-notion-block-id";

/// Path prefix of in-app page links (`/page/{id}`).
pub const PAGE_LINK_PREFIX: &str = "/page/";

/// Icon written for callouts that have none.
pub const DEFAULT_CALLOUT_ICON: &str = "ℹ️";

/// Language written for code blocks whose markup names none.
pub const DEFAULT_CODE_LANGUAGE: &str = "plain text";

/// Maximum nesting depth when rendering blocks to markup.
pub const BLOCK_MAX_RENDER_DEPTH: usize = 100;

/// Estimated characters per block, used to pre-allocate output strings.
///
/// This is a performance hint, not a constraint.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

// ---------------------------------------------------------------------------
// Page-tree cache
// ---------------------------------------------------------------------------

/// Default lifetime of the page-tree cache before a full rebuild, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
