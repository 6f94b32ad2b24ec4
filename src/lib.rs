// src/lib.rs
//! notion-cms library: edit Notion pages as HTML.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `SiteConfig`, `ResolvedConfig`, `CommandLineInput`
//! - **Domain model**: `Block`, `Page`, `PageTitle`, block payload structs
//! - **Domain types**: `NotionId`, `PageId`, `BlockId`, `RichTextItem`, etc.
//! - **API client**: `NotionRepository`, `NotionHttpClient`
//! - **Conversion**: `blocks_from_document`, `document_from_blocks`, ...
//! - **Page tree**: `PageTreeCache`, `PageNode`, `Clock`
//! - **Storage**: `ObjectStore`, `LocalObjectStore`, `upload_media`
//! - **Workspace**: `Workspace`, the page operations behind the editor

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod html;
pub mod model;
pub mod storage;
pub mod tree;
pub mod types;
pub mod workspace;

// --- Error Handling ---
pub use crate::error::{AppError, NotionClientError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, ResolvedConfig, SiteConfig};

// --- Domain Model ---
pub use crate::model::{Block, BlockCommon, BlockKind, Page, PageTitle, Parent};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, Color, Link, NotionId, ObjectKey, PageId, RichTextItem,
};

// --- API Client ---
pub use crate::api::{NotionHttpClient, NotionRepository};

// --- Conversion ---
pub use crate::html::{
    block_from_element, blocks_from_document, document_from_blocks, markup_from_block,
    markup_from_runs, page_document, render_blocks, runs_from_markup, AnnotationMode,
    ConversionOptions,
};

// --- Page Tree ---
pub use crate::tree::{Breadcrumb, Clock, ManualClock, PageNode, PageTreeCache, SystemClock};

// --- Storage ---
pub use crate::storage::{upload_media, LocalObjectStore, ObjectStore};

// --- Workspace ---
pub use crate::workspace::Workspace;
