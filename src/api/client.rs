// src/api/client.rs
//! Pure HTTP client wrapper for Notion API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the Notion API. It handles authentication and
//! basic request/response operations; parsing lives in `parser`.

use super::{parser, payload, simple_pagination, NotionRepository};
use crate::constants::NOTION_APPEND_BATCH_SIZE;
use crate::error::AppError;
use crate::model::{Block, Page};
use crate::types::{ApiKey, BlockId, NotionId, PageId};
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::{json, Value};

const NOTION_VERSION: &str = "2022-06-28";
const API_BASE_URL: &str = "https://api.notion.com/v1";

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self { client })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to the specified endpoint (path plus query).
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Makes a PATCH request with JSON body to the specified endpoint.
    pub async fn patch<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("PATCH {}", url);
        Ok(self.client.patch(url).json(body).send().await?)
    }

    /// Appends one batch of writable blocks, returning the created ids in order.
    async fn append_batch(&self, parent: &NotionId, bodies: Vec<Value>) -> Result<Vec<String>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_hyphenated());
        let response = self.patch(&endpoint, &json!({ "children": bodies })).await?;
        let result = extract_response_text(response).await?;
        let created: Value = parser::parse_api_response(result)?;

        Ok(created["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|block| block["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Endpoint for one page of a block's children.
fn children_endpoint(parent: &NotionId, page_size: u32, cursor: Option<&str>) -> String {
    let mut endpoint = format!(
        "blocks/{}/children?page_size={}",
        parent.to_hyphenated(),
        page_size
    );
    if let Some(cursor) = cursor {
        endpoint.push_str("&start_cursor=");
        endpoint.push_str(cursor);
    }
    endpoint
}

#[async_trait::async_trait]
impl NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &PageId) -> Result<Page, AppError> {
        let endpoint = format!("pages/{}", id.to_dashed());
        let response = self.get(&endpoint).await?;
        let result = extract_response_text(response).await?;
        parser::parse_page_response(result)
    }

    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        let client = self.clone();
        let pagination_result = simple_pagination::fetch_all_pages_simple(
            |page_size, cursor| {
                let client = client.clone();
                let endpoint = children_endpoint(parent, page_size, cursor.as_deref());
                async move {
                    let response = client.get(&endpoint).await?;
                    let result = extract_response_text(response).await?;
                    parser::parse_blocks_pagination(result)
                }
            },
            None,
        )
        .await?;

        log::debug!(
            "Fetched {} children of {} in {} requests",
            pagination_result.total_fetched,
            parent,
            pagination_result.pages_fetched
        );
        Ok(pagination_result.items)
    }

    async fn create_page(
        &self,
        parent: &PageId,
        title: &str,
        children: &[Block],
    ) -> Result<PageId, AppError> {
        let body = json!({
            "parent": { "page_id": parent.to_dashed() },
            "properties": payload::title_properties(title),
        });
        let response = self.post("pages", &body).await?;
        let result = extract_response_text(response).await?;
        let page_id = PageId::parse(&parser::parse_created_id(result)?)?;
        log::debug!("Created page {} under {}", page_id, parent);

        if !children.is_empty() {
            self.append_children(&NotionId::from(&page_id), children).await?;
        }
        Ok(page_id)
    }

    async fn update_page_title(&self, id: &PageId, title: &str) -> Result<(), AppError> {
        let body = json!({ "properties": payload::title_properties(title) });
        let response = self.patch(&format!("pages/{}", id.to_dashed()), &body).await?;
        parser::ensure_success(extract_response_text(response).await?)
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), AppError> {
        let body = json!({ "archived": true });
        let response = self.patch(&format!("pages/{}", id.to_dashed()), &body).await?;
        parser::ensure_success(extract_response_text(response).await?)
    }

    /// Appends blocks in batches, then appends each written block's own
    /// children under the id the API assigned to it.
    async fn append_children(&self, parent: &NotionId, children: &[Block]) -> Result<(), AppError> {
        let mut pending: Vec<(NotionId, &[Block])> = vec![(parent.clone(), children)];

        while let Some((parent, blocks)) = pending.pop() {
            let writable: Vec<(&Block, Value)> = blocks
                .iter()
                .filter_map(|block| payload::block_payload(block).map(|body| (block, body)))
                .collect();

            for batch in writable.chunks(NOTION_APPEND_BATCH_SIZE) {
                let bodies = batch.iter().map(|(_, body)| body.clone()).collect();
                let created = self.append_batch(&parent, bodies).await?;
                log::debug!("Appended {} blocks to {}", created.len(), parent);

                for ((block, _), id) in batch.iter().zip(created) {
                    if payload::children_written_separately(block) {
                        pending.push((NotionId::parse(&id)?, block.children().as_slice()));
                    }
                }
            }
        }
        Ok(())
    }

    async fn archive_block(&self, id: &BlockId) -> Result<(), AppError> {
        let body = json!({ "archived": true });
        let response = self.patch(&format!("blocks/{}", id.to_dashed()), &body).await?;
        parser::ensure_success(extract_response_text(response).await?)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
