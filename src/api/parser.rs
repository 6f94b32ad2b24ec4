// src/api/parser.rs
//! Response parsing using the notion-client library's types.

use super::client::ApiResponse;
use super::responses::{NotionError, NotionPage, RetrieveBlockChildrenResponse, ToDomain};
use super::types::PaginatedResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use crate::model::{Block, Page};
use reqwest::StatusCode;
use serde_json::Value;

/// Parse any Notion API response using notion-client types
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_with_notion_client(&result.data, &result.url)
    } else {
        parse_error_with_notion_client(&result.data, result.status, &result.url)
    }
}

/// Checks a write response for errors, ignoring its body on success.
pub fn ensure_success(result: ApiResponse<String>) -> Result<(), AppError> {
    if result.status.is_success() {
        Ok(())
    } else {
        parse_error_with_notion_client(&result.data, result.status, &result.url)
    }
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_LENGTH) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Parse successful response using notion-client's robust parsing
fn parse_with_notion_client<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: preview(body),
        }
        .into()
    })
}

/// Parse error response using notion-client error types
fn parse_error_with_notion_client<T>(
    body: &str,
    status: StatusCode,
    url: &str,
) -> Result<T, AppError> {
    if let Ok(notion_error) = serde_json::from_str::<NotionError>(body) {
        return Err(NotionClientError::NotionApi {
            status: notion_error.status,
            code: notion_error.code,
            message: notion_error.message,
            request_id: notion_error.request_id,
        }
        .into());
    }

    // Fallback to generic error with HTTP status code
    Err(AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}: {}", status, url, preview(body)),
        status,
    })
}

/// Parse page response using notion-client
pub fn parse_page_response(result: ApiResponse<String>) -> Result<Page, AppError> {
    let notion_page: NotionPage = parse_api_response(result)?;
    ToDomain::to_domain(notion_page)
}

/// Parse the id out of a created object
pub fn parse_created_id(result: ApiResponse<String>) -> Result<String, AppError> {
    let created: Value = parse_api_response(result)?;
    created
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::MalformedResponse("Created object has no 'id'".to_string()))
}

/// Pagination function for blocks - returns PaginatedResponse
pub fn parse_blocks_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let response: RetrieveBlockChildrenResponse = parse_api_response(result)?;
    let object = response.object.clone();
    let next_cursor = response.next_cursor.clone();
    let has_more = response.has_more;

    Ok(PaginatedResponse {
        object,
        results: response.into_domain_blocks()?,
        next_cursor,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status,
            url: "https://api.notion.com/v1/pages/abc".to_string(),
        }
    }

    #[test]
    fn test_error_parsing_with_notion_client() {
        let error_json = r#"{
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page with ID: abc123",
            "request_id": "req_123"
        }"#;

        let result = parse_page_response(response(StatusCode::NOT_FOUND, error_json));
        match result {
            Err(AppError::NotionClient(NotionClientError::NotionApi { code, .. })) => {
                assert_eq!(code, "object_not_found");
            }
            other => panic!("Expected NotionClientError::NotionApi, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_falls_back_to_status() {
        let err = ensure_success(response(StatusCode::TOO_MANY_REQUESTS, "<html>busy</html>"))
            .unwrap_err();
        match err {
            AppError::NotionService { code, .. } => assert_eq!(code, NotionErrorCode::RateLimited),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blocks_listing_keeps_cursor() {
        let body = r#"{
            "object": "list",
            "results": [{
                "object": "block",
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "type": "divider",
                "has_children": false,
                "archived": false,
                "divider": {}
            }],
            "next_cursor": "abc",
            "has_more": true
        }"#;
        let page = parse_blocks_pagination(response(StatusCode::OK, body)).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
        assert!(page.has_more);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let body = "é".repeat(ERROR_BODY_PREVIEW_LENGTH + 10);
        assert!(preview(&body).ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
