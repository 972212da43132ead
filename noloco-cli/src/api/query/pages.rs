//! Cursor-driven record fetching
//!
//! Walks the data endpoint page by page until the caller's limit is met or the
//! server runs out of pages. Nothing is cached or deduplicated: rows inserted or
//! removed while the scan runs may show up twice or not at all.

use std::collections::HashSet;

use super::filters::FilterExpression;
use super::orderby::{SortDirection, SortField};
use super::query::RecordQuery;
use super::result::Record;
use crate::api::client::NolocoClient;
use crate::api::constants::MAX_PAGE_SIZE;
use crate::api::error::ApiError;

/// How many records to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Records to return when `return_all` is off
    pub limit: usize,
    pub return_all: bool,
    /// Largest page the server accepts
    pub page_cap: usize,
}

impl PageLimits {
    pub fn limited(limit: usize) -> Self {
        Self {
            limit,
            return_all: false,
            page_cap: MAX_PAGE_SIZE,
        }
    }

    pub fn all() -> Self {
        Self {
            limit: 0,
            return_all: true,
            page_cap: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_cap(mut self, page_cap: usize) -> Self {
        self.page_cap = page_cap;
        self
    }

    /// Page size for the next request given what was already collected
    fn next_page_size(&self, collected: usize) -> usize {
        let cap = self.page_cap.max(1);
        if self.return_all {
            cap
        } else {
            self.limit.saturating_sub(collected).min(cap)
        }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::limited(50)
    }
}

/// Records collected by a [`RecordPager`] run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedRecords {
    pub records: Vec<Record>,
    pub pages_fetched: usize,
    /// `totalCount` reported by the last page
    pub total_count: u64,
}

/// Paginated query over one table
#[derive(Debug, Clone)]
pub struct RecordPager {
    pub app: String,
    pub table: String,
    pub filter: Option<FilterExpression>,
    pub sort_by: Option<SortField>,
    pub order_by: SortDirection,
    pub include: Vec<String>,
    pub limits: PageLimits,
}

impl RecordPager {
    pub fn new(app: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            table: table.into(),
            filter: None,
            sort_by: None,
            order_by: SortDirection::Desc,
            include: Vec::new(),
            limits: PageLimits::default(),
        }
    }

    pub fn filter(mut self, filter: Option<FilterExpression>) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort_by: Option<SortField>, order_by: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.order_by = order_by;
        self
    }

    pub fn include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    fn page_query(&self, first: usize, cursor: Option<&str>) -> RecordQuery {
        let mut query = RecordQuery::new()
            .order_by(self.order_by)
            .first(first)
            .filter(self.filter.clone())
            .include(self.include.clone());
        query.sort_by = self.sort_by;
        query.after = cursor.map(String::from);
        query
    }

    /// Run the fetch loop
    ///
    /// With a limit, stops as soon as `limit` records are collected even if the
    /// server has more. A page flagged as having a successor but carrying no
    /// cursor ends the scan, as does a cursor that was already followed.
    pub async fn collect(&self, client: &NolocoClient) -> Result<CollectedRecords, ApiError> {
        let mut collected = CollectedRecords::default();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let first = self.limits.next_page_size(collected.records.len());
            if first == 0 {
                break;
            }

            let page = client
                .fetch_records(&self.app, &self.table, &self.page_query(first, cursor.as_deref()))
                .await?;
            collected.pages_fetched += 1;
            collected.total_count = page.total_count;

            let next_cursor = page.next_cursor().map(String::from);
            if page.page_info.has_next_page && next_cursor.is_none() {
                log::warn!(
                    "{}/{}: server reported another page without a cursor, stopping",
                    self.app,
                    self.table
                );
            }

            for record in page.records {
                collected.records.push(record);
                if !self.limits.return_all && collected.records.len() >= self.limits.limit {
                    log::debug!(
                        "{}/{}: limit of {} reached after {} page(s)",
                        self.app,
                        self.table,
                        self.limits.limit,
                        collected.pages_fetched
                    );
                    return Ok(collected);
                }
            }

            match next_cursor {
                Some(next) if seen_cursors.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    log::warn!(
                        "{}/{}: cursor '{}' repeated, stopping",
                        self.app,
                        self.table,
                        next
                    );
                    break;
                }
                None => break,
            }
        }

        log::debug!(
            "{}/{}: collected {} record(s) in {} page(s)",
            self.app,
            self.table,
            collected.records.len(),
            collected.pages_fetched
        );
        Ok(collected)
    }
}
