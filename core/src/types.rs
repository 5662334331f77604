//! Shared DTOs used by every list operation.
//!
//! # Design
//! Wire types ("entities") keep the remote snake_case names and only derive
//! `Deserialize`. Domain types derive `Serialize` with camelCase names so a
//! value handed to a JS front end or logged as JSON reads the same way the
//! rest of the domain does.

use serde::{Deserialize, Serialize};

/// Cursor information returned alongside every collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub count: u32,
    pub next_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_token: Option<String>,
}

/// One page of a list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub collection: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Token to pass as `page_token` to fetch the next page, if any.
    pub fn next_page_token(&self) -> Option<&str> {
        self.pagination.next_page_token.as_deref()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaginationEntity {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub previous_page: Option<String>,
    #[serde(default)]
    pub previous_page_token: Option<String>,
}

impl From<PaginationEntity> for Pagination {
    fn from(entity: PaginationEntity) -> Self {
        Pagination {
            count: entity.count,
            next_page: entity.next_page,
            next_page_token: entity.next_page_token,
            previous_page: entity.previous_page,
            previous_page_token: entity.previous_page_token,
        }
    }
}

/// Sort order for collections ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatedAtSort {
    #[serde(rename = "created_at:asc")]
    Ascending,
    #[serde(rename = "created_at:desc")]
    Descending,
}

impl CreatedAtSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreatedAtSort::Ascending => "created_at:asc",
            CreatedAtSort::Descending => "created_at:desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_renames_next_page() {
        let entity: PaginationEntity = serde_json::from_str(
            r#"{"count":20,"next_page":"https://api.calendly.com/users?page_token=abc","next_page_token":"abc"}"#,
        )
        .unwrap();
        let pagination = Pagination::from(entity);
        let value = serde_json::to_value(&pagination).unwrap();
        assert_eq!(value["count"], 20);
        assert_eq!(value["nextPage"], "https://api.calendly.com/users?page_token=abc");
        assert_eq!(value["nextPageToken"], "abc");
        assert!(value.get("next_page").is_none());
        assert!(value.get("previousPage").is_none());
    }

    #[test]
    fn pagination_tolerates_null_next_page() {
        let entity: PaginationEntity =
            serde_json::from_str(r#"{"count":0,"next_page":null}"#).unwrap();
        let page = Page::<()> {
            collection: Vec::new(),
            pagination: entity.into(),
        };
        assert!(page.pagination.next_page.is_none());
        assert!(page.next_page_token().is_none());
    }
}
