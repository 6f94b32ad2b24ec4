// src/api/responses.rs
//! API response types, parsed with notion-client's serde implementations.

use super::types::PaginatedResponse;
use serde_json::Value;

pub use notion_client::objects::{error::Error as NotionError, page::Page as NotionPage};

/// Block children listing. Blocks stay raw JSON until converted so that
/// fields notion-client does not model survive.
pub type RetrieveBlockChildrenResponse = PaginatedResponse<Value>;

/// Trait for converting notion-client types to domain types
pub trait ToDomain<T> {
    fn to_domain(self) -> Result<T, crate::error::AppError>;
}

impl ToDomain<crate::model::Page> for NotionPage {
    fn to_domain(self) -> Result<crate::model::Page, crate::error::AppError> {
        crate::api::notion_client_adapter::convert_page(self)
    }
}

impl ToDomain<crate::model::Block> for Value {
    fn to_domain(self) -> Result<crate::model::Block, crate::error::AppError> {
        crate::api::notion_client_adapter::convert_block_value(self)
    }
}

impl RetrieveBlockChildrenResponse {
    /// Convert all blocks to domain model
    pub fn into_domain_blocks(self) -> Result<Vec<crate::model::Block>, crate::error::AppError> {
        self.results.into_iter().map(ToDomain::to_domain).collect()
    }
}
