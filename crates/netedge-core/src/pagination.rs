//! Retrieval of complete collections from paginated endpoints.
//!
//! Collection endpoints return bounded pages together with a total count.
//! [`collect_pages`] keeps requesting pages from a [`PageSource`] until the
//! total is reached or the server hands back an empty page.
//!
//! Two paging styles are supported, selected through [`PagingConfig`]:
//!
//! - record offset (`offset`/`limit`), answered with [`OffsetPage`]
//! - page number (`page`/`size`, 1-based), answered with [`NumberedPage`]

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// How the position of the next page is expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingStyle {
    /// Page number parameter, counted from `first_page`
    PageNumber {
        /// Name of the page number parameter
        page_param: String,
        /// Number of the first page
        first_page: usize,
    },
    /// Record offset parameter
    Offset {
        /// Name of the offset parameter
        offset_param: String,
    },
}

/// Paging parameters of one collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingConfig {
    /// Paging style
    pub style: PagingStyle,
    /// Name of the page size parameter
    pub size_param: String,
    /// Items requested per page
    pub page_size: usize,
    /// Fixed query parameters sent with every page request
    pub params: Vec<(String, String)>,
}

impl PagingConfig {
    /// Offset paging with `offset`/`limit` parameters.
    #[must_use]
    pub fn offset() -> Self {
        Self {
            style: PagingStyle::Offset {
                offset_param: "offset".to_string(),
            },
            size_param: "limit".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            params: Vec::new(),
        }
    }

    /// Page number paging with `page`/`size` parameters starting at page 1.
    #[must_use]
    pub fn page_number() -> Self {
        Self {
            style: PagingStyle::PageNumber {
                page_param: "page".to_string(),
                first_page: 1,
            },
            size_param: "size".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            params: Vec::new(),
        }
    }

    /// Rename the page number or offset parameter.
    #[must_use]
    pub fn with_page_param(mut self, name: impl Into<String>) -> Self {
        match &mut self.style {
            PagingStyle::PageNumber { page_param, .. } => *page_param = name.into(),
            PagingStyle::Offset { offset_param } => *offset_param = name.into(),
        }
        self
    }

    /// Rename the page size parameter.
    #[must_use]
    pub fn with_size_param(mut self, name: impl Into<String>) -> Self {
        self.size_param = name.into();
        self
    }

    /// Set the number of the first page. Ignored for offset paging.
    #[must_use]
    pub fn with_first_page(mut self, first: usize) -> Self {
        if let PagingStyle::PageNumber { first_page, .. } = &mut self.style {
            *first_page = first;
        }
        self
    }

    /// Set the number of items requested per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Add a fixed query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add several fixed query parameters.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    fn request_params(&self, page_index: usize, fetched: usize) -> Vec<(String, String)> {
        let mut params = vec![(self.size_param.clone(), self.page_size.to_string())];
        if page_index > 0 {
            match &self.style {
                PagingStyle::PageNumber {
                    page_param,
                    first_page,
                } => params.push((page_param.clone(), (first_page + page_index).to_string())),
                PagingStyle::Offset { offset_param } => {
                    params.push((offset_param.clone(), fetched.to_string()));
                }
            }
        }
        params.extend(self.params.iter().cloned());
        params
    }
}

/// Decoded page of a collection.
pub trait PageEnvelope: DeserializeOwned {
    /// Collection item type
    type Item;

    /// Total number of items in the collection.
    fn total_count(&self) -> usize;

    /// Items carried by this page, in server order.
    fn into_items(self) -> Vec<Self::Item>;
}

/// Position block of an offset page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OffsetPagination {
    /// Offset of the first item on this page
    #[serde(default)]
    pub offset: usize,
    /// Requested page size
    #[serde(default)]
    pub limit: usize,
    /// Total number of items
    #[serde(default)]
    pub total: usize,
}

/// Page of the form `{"pagination": {...}, "data": [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OffsetPage<T> {
    /// Position information
    #[serde(default)]
    pub pagination: OffsetPagination,
    /// Items of this page
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> PageEnvelope for OffsetPage<T>
where
    T: DeserializeOwned,
{
    type Item = T;

    fn total_count(&self) -> usize {
        self.pagination.total
    }

    fn into_items(self) -> Vec<T> {
        self.data
    }
}

/// Page of the form `{"totalCount": n, "pageNumber": p, "pageSize": s, "content": [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedPage<T> {
    /// Total number of items
    #[serde(default)]
    pub total_count: usize,
    /// Number of this page
    #[serde(default)]
    pub page_number: usize,
    /// Requested page size
    #[serde(default)]
    pub page_size: usize,
    /// Items of this page
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

impl<T> PageEnvelope for NumberedPage<T>
where
    T: DeserializeOwned,
{
    type Item = T;

    fn total_count(&self) -> usize {
        self.total_count
    }

    fn into_items(self) -> Vec<T> {
        self.content
    }
}

/// Anything able to fetch one page of a collection as raw JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    /// GET `path` with the given query parameters.
    async fn fetch_page(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<serde_json::Value>;
}

/// Fetch every item of a paginated collection.
///
/// Pages are requested one after another until the accumulated item count
/// reaches the reported total or an empty page comes back. Items keep server
/// order.
///
/// # Errors
///
/// Returns the first page request failure, or [`Error::DecodeError`] if a page
/// does not match the envelope `E`. Items fetched so far are discarded.
pub async fn collect_pages<E, S>(
    source: &S,
    path: &str,
    config: &PagingConfig,
) -> Result<Vec<E::Item>>
where
    E: PageEnvelope,
    S: PageSource + ?Sized,
{
    let mut items = Vec::new();
    let mut page_index = 0;

    loop {
        let params = config.request_params(page_index, items.len());
        let raw = source.fetch_page(path, params).await?;
        let page: E = serde_json::from_value(raw).map_err(|e| {
            Error::DecodeError(format!("invalid page {page_index} of {path}: {e}"))
        })?;

        let total = page.total_count();
        let batch = page.into_items();
        debug!(path, page = page_index, items = batch.len(), total, "Fetched page");

        if batch.is_empty() {
            break;
        }
        items.extend(batch);
        if items.len() >= total {
            break;
        }
        page_index += 1;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn offset_page(items: &[u32], offset: usize, total: usize) -> serde_json::Value {
        json!({
            "pagination": {"offset": offset, "limit": items.len(), "total": total},
            "data": items
        })
    }

    #[test]
    fn test_default_configs() {
        let offset = PagingConfig::offset();
        assert_eq!(offset.size_param, "limit");
        assert_eq!(offset.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(
            offset.style,
            PagingStyle::Offset {
                offset_param: "offset".to_string()
            }
        );

        let numbered = PagingConfig::page_number().with_first_page(0).with_page_param("pageNumber");
        assert_eq!(numbered.size_param, "size");
        assert_eq!(
            numbered.style,
            PagingStyle::PageNumber {
                page_param: "pageNumber".to_string(),
                first_page: 0
            }
        );
    }

    #[test]
    fn test_first_request_sends_size_only() {
        let config = PagingConfig::offset().with_page_size(10).with_param("verbose", "true");
        assert_eq!(
            config.request_params(0, 0),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("verbose".to_string(), "true".to_string()),
            ]
        );
        assert_eq!(param(&config.request_params(2, 20), "offset"), Some("20"));

        let config = PagingConfig::page_number().with_page_size(10);
        assert_eq!(param(&config.request_params(1, 10), "page"), Some("2"));
    }

    #[tokio::test]
    async fn test_offset_traversal_issues_ceil_requests() {
        let all: Vec<u32> = (0..25).collect();
        let mut source = MockPageSource::new();
        source
            .expect_fetch_page()
            .withf(|path, params| {
                path.ends_with("/devices") && param(params, "limit") == Some("10")
            })
            .times(3)
            .returning(move |_, params| {
                let offset: usize = param(&params, "offset").map_or(0, |v| v.parse().unwrap());
                let end = (offset + 10).min(all.len());
                Ok(offset_page(&all[offset..end], offset, all.len()))
            });

        let config = PagingConfig::offset().with_page_size(10);
        let items = collect_pages::<OffsetPage<u32>, _>(&source, "/ne/v1/devices", &config)
            .await
            .unwrap();

        assert_eq!(items, (0..25).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_page_number_traversal() {
        let mut source = MockPageSource::new();
        source
            .expect_fetch_page()
            .times(2)
            .returning(|_, params| {
                let page = param(&params, "page").unwrap_or("1");
                let content = if page == "1" { vec!["a", "b"] } else { vec!["c"] };
                Ok(json!({
                    "totalCount": 3,
                    "pageNumber": page.parse::<usize>().unwrap(),
                    "pageSize": 2,
                    "content": content
                }))
            });

        let config = PagingConfig::page_number().with_page_size(2);
        let items = collect_pages::<NumberedPage<String>, _>(&source, "/things", &config)
            .await
            .unwrap();

        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_single_page() {
        let mut source = MockPageSource::new();
        source
            .expect_fetch_page()
            .times(1)
            .returning(|_, _| Ok(offset_page(&[1, 2], 0, 2)));

        let items = collect_pages::<OffsetPage<u32>, _>(&source, "/x", &PagingConfig::offset())
            .await
            .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_page_stops_overcounted_traversal() {
        let mut source = MockPageSource::new();
        source
            .expect_fetch_page()
            .times(2)
            .returning(|_, params| {
                if param(&params, "offset").is_none() {
                    Ok(offset_page(&[1, 2], 0, 10))
                } else {
                    Ok(offset_page(&[], 2, 10))
                }
            });

        let config = PagingConfig::offset().with_page_size(2);
        let items = collect_pages::<OffsetPage<u32>, _>(&source, "/x", &config)
            .await
            .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_traversal() {
        let mut source = MockPageSource::new();
        let mut calls = 0;
        source.expect_fetch_page().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(offset_page(&[1], 0, 3))
            } else {
                Err(Error::Timeout("page 2".to_string()))
            }
        });

        let config = PagingConfig::offset().with_page_size(1);
        let result = collect_pages::<OffsetPage<u32>, _>(&source, "/x", &config).await;
        assert_eq!(result, Err(Error::Timeout("page 2".to_string())));
    }

    #[tokio::test]
    async fn test_undecodable_page() {
        let mut source = MockPageSource::new();
        source
            .expect_fetch_page()
            .times(1)
            .returning(|_, _| Ok(json!({"data": "not a list"})));

        let result =
            collect_pages::<OffsetPage<u32>, _>(&source, "/x", &PagingConfig::offset()).await;
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }
}
