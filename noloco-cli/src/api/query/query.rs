//! Query parameters of the record list endpoint

use super::filters::FilterExpression;
use super::orderby::{SortDirection, SortField};
use crate::api::constants::{DEFAULT_PAGE_SIZE, GRAPHQL_FORMAT};

/// Include every relationship of the returned records
pub const INCLUDE_ALL: &str = "*";

/// Parameters for one request against `/v1/data/{app}/{table}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub sort_by: Option<SortField>,
    pub order_by: Option<SortDirection>,
    pub first: Option<usize>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub filter: Option<FilterExpression>,
    pub include: Vec<String>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort_by = Some(field);
        self
    }

    pub fn order_by(mut self, direction: SortDirection) -> Self {
        self.order_by = Some(direction);
        self
    }

    pub fn first(mut self, count: usize) -> Self {
        self.first = Some(count);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn filter(mut self, filter: Option<FilterExpression>) -> Self {
        self.filter = filter;
        self
    }

    pub fn include(mut self, relationships: Vec<String>) -> Self {
        self.include = relationships;
        self
    }

    pub fn include_all(self) -> Self {
        self.include(vec![INCLUDE_ALL.to_string()])
    }

    /// Query string pairs in the order the endpoint documents them
    ///
    /// Sort and page size fall back to `createdAt DESC` and 10 records.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("response_format".to_string(), GRAPHQL_FORMAT.to_string()),
            (
                "sortBy".to_string(),
                self.sort_by.unwrap_or_default().as_str().to_string(),
            ),
            (
                "orderBy".to_string(),
                self.order_by.unwrap_or_default().as_str().to_string(),
            ),
            (
                "first".to_string(),
                self.first.unwrap_or(DEFAULT_PAGE_SIZE).to_string(),
            ),
        ];

        if let Some(after) = self.after.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("after".to_string(), after.to_string()));
        }
        if let Some(before) = self.before.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("before".to_string(), before.to_string()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter".to_string(), filter.to_json().to_string()));
        }
        if !self.include.is_empty() {
            pairs.push(("include".to_string(), self.include.join(",")));
        }

        pairs
    }
}

/// Split a comma-separated include option into relationship names
pub fn parse_include(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
