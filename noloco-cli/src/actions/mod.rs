//! Record actions
//!
//! Per-item execution of the record operations a workflow can run. Items are
//! processed one after another; each resolves its own parameters, so one batch
//! can touch several tables or records.

pub mod create;
pub mod delete;
pub mod error;
pub mod fields;
pub mod get;
pub mod get_many;
pub mod item;
pub mod params;
pub mod search;
pub mod update;

use std::sync::Arc;

pub use error::{ActionError, ItemError};
pub use fields::MappingMode;
pub use item::{InputItem, OutputItem};
pub use params::{ItemParameters, ParameterSource, StaticParameters};

use crate::api::NolocoClient;
use crate::api::constants::MAX_PAGE_SIZE;
use crate::api::query::{PageLimits, Record};

/// Default `limit` for list operations
pub const DEFAULT_LIMIT: usize = 50;

/// Everything an action needs besides its input items
#[derive(Clone)]
pub struct ExecutionContext {
    pub client: NolocoClient,
    pub parameters: Arc<dyn ParameterSource>,
    /// Report failures as error items instead of aborting the batch
    pub continue_on_fail: bool,
    /// Largest page the server accepts
    pub page_cap: usize,
}

impl ExecutionContext {
    pub fn new(client: NolocoClient, parameters: Arc<dyn ParameterSource>) -> Self {
        Self {
            client,
            parameters,
            continue_on_fail: false,
            page_cap: MAX_PAGE_SIZE,
        }
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn page_cap(mut self, page_cap: usize) -> Self {
        self.page_cap = page_cap;
        self
    }

    pub fn params(&self, index: usize) -> ItemParameters<'_> {
        ItemParameters::new(self.parameters.as_ref(), index)
    }

    /// Collection limits from `returnAll` / `limit`
    async fn page_limits(&self, params: &ItemParameters<'_>) -> Result<PageLimits, ActionError> {
        let limits = if params.bool_or(params::RETURN_ALL, false).await? {
            PageLimits::all()
        } else {
            let limit = params.count_or(params::LIMIT, DEFAULT_LIMIT).await?;
            if limit == 0 {
                return Err(ActionError::invalid(params::LIMIT, "must be at least 1"));
            }
            PageLimits::limited(limit)
        };
        Ok(limits.with_page_cap(self.page_cap))
    }
}

/// Output items for a list of records, all paired with one input
fn record_items(records: Vec<Record>, index: usize) -> Vec<OutputItem> {
    records
        .into_iter()
        .map(|record| OutputItem::new(record, index))
        .collect()
}

/// Operations available on records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordOperation {
    Create,
    Update,
    Delete,
    Get,
    GetMany,
    Search,
}

impl RecordOperation {
    pub const ALL: [RecordOperation; 6] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Get,
        Self::GetMany,
        Self::Search,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Get => "get",
            Self::GetMany => "getMany",
            Self::Search => "search",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    async fn execute_item(
        &self,
        ctx: &ExecutionContext,
        index: usize,
        item: &InputItem,
    ) -> Result<Vec<OutputItem>, ActionError> {
        match self {
            Self::Create => create::execute(ctx, index, item).await,
            Self::Update => update::execute(ctx, index, item).await,
            Self::Delete => delete::execute(ctx, index).await,
            Self::Get => get::execute(ctx, index).await,
            Self::GetMany => get_many::execute(ctx, index).await,
            Self::Search => search::execute(ctx, index).await,
        }
    }

    /// Run the operation over every item in order
    ///
    /// The first failure aborts the batch unless the context continues on
    /// failure, in which case the failure becomes an `{error}` item paired
    /// with the offending input.
    pub async fn execute(
        &self,
        ctx: &ExecutionContext,
        items: &[InputItem],
    ) -> Result<Vec<OutputItem>, ItemError> {
        let mut output = Vec::new();

        for (index, item) in items.iter().enumerate() {
            match self.execute_item(ctx, index, item).await {
                Ok(produced) => {
                    log::debug!(
                        "{} item {}: {} output item(s)",
                        self.as_str(),
                        index,
                        produced.len()
                    );
                    output.extend(produced);
                }
                Err(err) if ctx.continue_on_fail => {
                    log::warn!("{} item {} failed: {}", self.as_str(), index, err);
                    output.push(OutputItem::error(index, err.to_string()));
                }
                Err(err) => {
                    log::error!("{} item {} failed: {}", self.as_str(), index, err);
                    return Err(ItemError { index, source: err });
                }
            }
        }

        Ok(output)
    }
}

impl std::fmt::Display for RecordOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use serde_json::{Value, json};

    fn context(transport: Arc<MockTransport>, params: StaticParameters) -> ExecutionContext {
        ExecutionContext::new(NolocoClient::from_arc(transport), Arc::new(params))
    }

    #[test]
    fn test_operation_names() {
        for op in RecordOperation::ALL {
            assert_eq!(RecordOperation::parse(op.as_str()), Some(op));
        }
        assert_eq!(RecordOperation::parse("upsert"), None);
    }

    #[tokio::test]
    async fn test_first_failure_aborts_batch() {
        let transport = MockTransport::failing(404);
        let params = StaticParameters::new()
            .with(params::APP, "crm")
            .with(params::TABLE, "contact")
            .with(params::RECORD_ID, "1");
        let ctx = context(transport.clone(), params);

        let err = RecordOperation::Delete
            .execute(&ctx, &[InputItem::default(), InputItem::default()])
            .await
            .unwrap_err();

        assert_eq!(err.index, 0);
        assert!(err.source.is_remote());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_continue_on_fail_reports_each_item() {
        let transport = MockTransport::new(|request| {
            if request.endpoint.ends_with("/2") {
                Err(crate::api::ApiError::Status {
                    status: 404,
                    body: "not found".to_string(),
                })
            } else {
                Ok(Value::Null)
            }
        });
        let params = StaticParameters::new()
            .with(params::APP, "crm")
            .with(params::TABLE, "contact")
            .with_item(0, params::RECORD_ID, "1")
            .with_item(1, params::RECORD_ID, "2")
            .with_item(2, params::RECORD_ID, "3");
        let ctx = context(transport.clone(), params).continue_on_fail(true);

        let items = vec![InputItem::default(); 3];
        let output = RecordOperation::Delete.execute(&ctx, &items).await.unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(Value::Object(output[0].json.clone()), json!({"success": true, "id": "1"}));
        assert_eq!(output[1].paired_item.item, 1);
        assert_eq!(
            output[1].json["error"],
            json!("API error (404): not found")
        );
        assert_eq!(output[2].paired_item.item, 2);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected() {
        let transport = MockTransport::new(|_| Ok(json!({"records": []})));
        let params = StaticParameters::new()
            .with(params::APP, "crm")
            .with(params::TABLE, "contact")
            .with(params::LIMIT, 0);
        let ctx = context(transport.clone(), params);

        let err = RecordOperation::GetMany
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap_err();
        assert!(matches!(err.source, ActionError::InvalidParameter { .. }));
        assert_eq!(transport.request_count(), 0);
    }
}
