//! Query parameter types for the device list endpoints.

use medinv_core::view::{clamp_page_size, ListParams, SortField, SortOrder};
use serde::Deserialize;

/// `?q=&department=&sort=&order=&page=&page_size=&grouped=`
///
/// Unknown `sort`/`order` values fall back to `deviceName`/`asc`. A missing
/// `page_size` uses the server default; any value is clamped to the
/// accepted range.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub department: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub grouped: Option<bool>,
}

impl ListQuery {
    pub fn into_params(self, default_page_size: usize) -> ListParams {
        ListParams {
            query: self.q,
            department: self.department,
            sort: SortField::from_param(self.sort.as_deref()),
            order: SortOrder::from_param(self.order.as_deref()),
            page: self.page.unwrap_or(1),
            page_size: clamp_page_size(Some(self.page_size.unwrap_or(default_page_size))),
            grouped: self.grouped.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_grouped_first_page() {
        let params = ListQuery::default().into_params(9);
        assert!(params.grouped);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 9);
        assert_eq!(params.sort, SortField::DeviceName);
        assert_eq!(params.order, SortOrder::Asc);
    }

    #[test]
    fn explicit_values_are_used() {
        let query = ListQuery {
            q: Some("pump".into()),
            sort: Some("dateReceived".into()),
            order: Some("desc".into()),
            page: Some(3),
            page_size: Some(20),
            grouped: Some(false),
            ..ListQuery::default()
        };
        let params = query.into_params(9);
        assert_eq!(params.query.as_deref(), Some("pump"));
        assert_eq!(params.sort, SortField::DateReceived);
        assert_eq!(params.order, SortOrder::Desc);
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 20);
        assert!(!params.grouped);
    }

    #[test]
    fn oversized_page_size_is_clamped() {
        let query = ListQuery {
            page_size: Some(10_000),
            ..ListQuery::default()
        };
        assert_eq!(
            query.into_params(9).page_size,
            medinv_core::view::MAX_PAGE_SIZE
        );
    }
}
