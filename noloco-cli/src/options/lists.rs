//! Searchable lists: apps, tables and records

use super::{
    ListSearchResult, OPTIONS_PAGE_SIZE, OptionLoader, PropertyOption, degrade, record_option,
};
use crate::actions::ActionError;
use crate::actions::params::APP;
use crate::api::query::{RecordQuery, SortDirection, SortField};

fn matches_filter(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
}

impl OptionLoader {
    /// Apps the account can access
    pub async fn apps(&self) -> ListSearchResult {
        degrade("app", self.try_apps().await)
    }

    async fn try_apps(&self) -> Result<ListSearchResult, ActionError> {
        let apps = self.client.fetch_apps().await?;
        Ok(ListSearchResult {
            results: apps
                .into_iter()
                .map(|app| PropertyOption::new(app.name.clone(), app.name))
                .collect(),
            pagination_token: None,
        })
    }

    /// Enabled tables of the selected app, matched on label or api name
    pub async fn tables(&self, filter: Option<&str>) -> ListSearchResult {
        degrade("table", self.try_tables(filter).await)
    }

    async fn try_tables(&self, filter: Option<&str>) -> Result<ListSearchResult, ActionError> {
        let app = self.params().required_string(APP).await?;
        let filter = normalized_filter(filter);

        let results = self
            .client
            .fetch_tables(&app)
            .await?
            .into_iter()
            .filter(|table| table.enabled)
            .filter(|table| match &filter {
                Some(needle) => {
                    matches_filter(&table.display, needle)
                        || matches_filter(&table.api_name, needle)
                }
                None => true,
            })
            .map(|table| PropertyOption::new(table.display, table.api_name))
            .collect();

        Ok(ListSearchResult {
            results,
            pagination_token: None,
        })
    }

    /// One page of records of the selected table, newest first
    ///
    /// The text filter only applies to the fetched page. The returned token is
    /// the cursor of the next page, passed back verbatim.
    pub async fn records(
        &self,
        filter: Option<&str>,
        pagination_token: Option<&str>,
    ) -> ListSearchResult {
        degrade("record", self.try_records(filter, pagination_token).await)
    }

    async fn try_records(
        &self,
        filter: Option<&str>,
        pagination_token: Option<&str>,
    ) -> Result<ListSearchResult, ActionError> {
        let (app, table) = self.selected_table().await?;
        let filter = normalized_filter(filter);

        let mut query = RecordQuery::new()
            .first(OPTIONS_PAGE_SIZE)
            .sort_by(SortField::CreatedAt)
            .order_by(SortDirection::Desc);
        if let Some(token) = pagination_token.filter(|t| !t.is_empty()) {
            query = query.after(token);
        }

        let page = self.client.fetch_records(&app, &table, &query).await?;
        let pagination_token = page.next_cursor().map(String::from);
        let results = page
            .records
            .iter()
            .map(record_option)
            .filter(|option| match &filter {
                Some(needle) => matches_filter(&option.name, needle),
                None => true,
            })
            .collect();

        Ok(ListSearchResult {
            results,
            pagination_token,
        })
    }
}
