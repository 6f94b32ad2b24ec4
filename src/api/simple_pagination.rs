// src/api/simple_pagination.rs
//! Cursor pagination over list endpoints.

use super::types::{PaginatedResponse, PaginationResult};
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;

/// Fetches every page of a cursor-paginated listing.
///
/// `fetch_fn` receives the page size and the cursor returned by the
/// previous page (`None` for the first request).
pub async fn fetch_all_pages_simple<T, F, Fut>(
    mut fetch_fn: F,
    max_pages: Option<u32>,
) -> Result<PaginationResult<T>, AppError>
where
    T: Send + 'static,
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        let response = fetch_fn(NOTION_API_PAGE_SIZE as u32, cursor).await?;

        let has_more = response.has_more;
        cursor = response.next_cursor;
        all_items.extend(response.results);
        pages_fetched += 1;

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationResult {
        total_fetched: all_items.len(),
        items: all_items,
        pages_fetched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn page(items: Vec<u32>, next: Option<&str>) -> PaginatedResponse<u32> {
        PaginatedResponse {
            object: "list".to_string(),
            results: items,
            next_cursor: next.map(str::to_string),
            has_more: next.is_some(),
        }
    }

    #[tokio::test]
    async fn test_follows_cursors_until_exhausted() {
        let seen = Mutex::new(Vec::new());
        let result = fetch_all_pages_simple(
            |page_size, cursor| {
                seen.lock().push(cursor.clone());
                async move {
                    assert_eq!(page_size, 100);
                    Ok(match cursor.as_deref() {
                        None => page(vec![1, 2], Some("c1")),
                        Some("c1") => page(vec![3], Some("c2")),
                        _ => page(vec![4], None),
                    })
                }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3, 4]);
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(
            *seen.lock(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_respects_page_limit() {
        let result = fetch_all_pages_simple(
            |_, _| async { Ok(page(vec![7], Some("again"))) },
            Some(2),
        )
        .await
        .unwrap();
        assert_eq!(result.total_fetched, 2);
    }
}
