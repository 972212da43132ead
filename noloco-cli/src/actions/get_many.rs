//! List records with an optional raw JSON filter

use serde::Deserialize;

use super::params::{ADDITIONAL_OPTIONS, APP, TABLE};
use super::{ActionError, ExecutionContext, OutputItem, record_items};
use crate::api::query::{FilterInput, INCLUDE_ALL, RecordPager, SortDirection, SortField};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdditionalOptions {
    #[serde(default)]
    sort_by: Option<String>,
    #[serde(default)]
    order_by: Option<String>,
    #[serde(default)]
    filter: Option<String>,
}

pub(super) async fn execute(
    ctx: &ExecutionContext,
    index: usize,
) -> Result<Vec<OutputItem>, ActionError> {
    let params = ctx.params(index);
    let app = params.required_string(APP).await?;
    let table = params.required_string(TABLE).await?;
    let limits = ctx.page_limits(&params).await?;
    let options: AdditionalOptions = params.decode_or_default(ADDITIONAL_OPTIONS).await?;

    let sort_by = match options.sort_by.as_deref() {
        None => SortField::default(),
        Some(raw) => SortField::parse(raw).ok_or_else(|| {
            ActionError::invalid(ADDITIONAL_OPTIONS, format!("unsupported sortBy '{}'", raw))
        })?,
    };
    let order_by = match options.order_by.as_deref() {
        None => SortDirection::default(),
        Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
            ActionError::invalid(ADDITIONAL_OPTIONS, format!("unsupported orderBy '{}'", raw))
        })?,
    };
    let filter = FilterInput::Raw(options.filter.unwrap_or_default()).build()?;

    let collected = RecordPager::new(&app, &table)
        .filter(filter)
        .sort(Some(sort_by), order_by)
        .include(vec![INCLUDE_ALL.to_string()])
        .limits(limits)
        .collect(&ctx.client)
        .await?;
    log::info!(
        "Fetched {} record(s) from {}/{}",
        collected.records.len(),
        app,
        table
    );

    Ok(record_items(collected.records, index))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::params::{LIMIT, RETURN_ALL, StaticParameters};
    use crate::actions::{InputItem, RecordOperation};
    use crate::api::NolocoClient;
    use crate::api::testing::{MockTransport, paged_table};
    use serde_json::json;

    fn base() -> StaticParameters {
        StaticParameters::new().with(APP, "crm").with(TABLE, "deal")
    }

    #[tokio::test]
    async fn test_defaults_to_fifty_newest() {
        let transport = MockTransport::new(paged_table(500));
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(base()),
        );

        let output = RecordOperation::GetMany
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap();

        assert_eq!(output.len(), 50);
        assert!(output.iter().all(|item| item.paired_item.item == 0));
        let request = &transport.requests()[0];
        assert_eq!(request.param("first"), Some("50"));
        assert_eq!(request.param("sortBy"), Some("createdAt"));
        assert_eq!(request.param("orderBy"), Some("DESC"));
        assert_eq!(request.param("include"), Some("*"));
        assert_eq!(request.param("filter"), None);
    }

    #[tokio::test]
    async fn test_return_all_with_options() {
        let transport = MockTransport::new(paged_table(230));
        let params = base().with(RETURN_ALL, true).with(
            ADDITIONAL_OPTIONS,
            json!({
                "sortBy": "updatedAt",
                "orderBy": "ASC",
                "filter": "{\"stage\": {\"in\": [\"won\"]}}"
            }),
        );
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params),
        );

        let output = RecordOperation::GetMany
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap();

        assert_eq!(output.len(), 230);
        assert_eq!(transport.request_count(), 3);
        let request = &transport.requests()[2];
        assert_eq!(request.param("sortBy"), Some("updatedAt"));
        assert_eq!(request.param("orderBy"), Some("ASC"));
        assert_eq!(request.param("after"), Some("200"));
        assert_eq!(request.param("filter"), Some(r#"{"stage":{"in":["won"]}}"#));
    }

    #[tokio::test]
    async fn test_malformed_filter_is_item_error() {
        let transport = MockTransport::new(paged_table(10));
        let params = base()
            .with(LIMIT, 5)
            .with(ADDITIONAL_OPTIONS, json!({"filter": "{\"stage\": "}));
        let ctx = ExecutionContext::new(NolocoClient::from_arc(transport.clone()), Arc::new(params))
            .continue_on_fail(true);

        let output = RecordOperation::GetMany
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap();

        assert_eq!(output.len(), 1);
        let message = output[0].json["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid filter JSON format"));
        assert_eq!(transport.request_count(), 0);
    }
}
