// src/html/mod.rs
//! Conversion between editor markup and Notion blocks.
//!
//! Parsing goes markup → blocks (`parse`, `rich_text`), rendering goes
//! blocks → markup (`render`), and `document` drives both over whole pages,
//! fetching whatever children the repository still holds.

mod document;
mod dom;
mod parse;
mod render;
mod rich_text;

pub use document::{blocks_from_document, document_from_blocks, hydrate_children, page_document};
pub use parse::block_from_element;
pub use render::{markup_from_block, render_blocks};
pub use rich_text::{markup_from_runs, runs_from_element, runs_from_markup};

use crate::constants::DEFAULT_CODE_LANGUAGE;
use serde::{Deserialize, Serialize};

/// How nested emphasis tags combine into one run's annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationMode {
    /// Only the nearest enclosing emphasis tag counts; a link survives only
    /// when that tag is the anchor itself.
    #[default]
    Innermost,
    /// Every enclosing emphasis tag contributes, and the nearest anchor
    /// supplies the link.
    Accumulate,
}

/// Knobs for markup → block conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub annotation_mode: AnnotationMode,
    pub default_code_language: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            annotation_mode: AnnotationMode::default(),
            default_code_language: DEFAULT_CODE_LANGUAGE.to_string(),
        }
    }
}

impl ConversionOptions {
    pub fn with_annotation_mode(mut self, mode: AnnotationMode) -> Self {
        self.annotation_mode = mode;
        self
    }
}
