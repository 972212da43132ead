//! Delete a record

use super::params::{APP, RECORD_ID, TABLE};
use super::{ActionError, ExecutionContext, OutputItem};

pub(super) async fn execute(
    ctx: &ExecutionContext,
    index: usize,
) -> Result<Vec<OutputItem>, ActionError> {
    let params = ctx.params(index);
    let app = params.required_string(APP).await?;
    let table = params.required_string(TABLE).await?;
    let record_id = params.required_string(RECORD_ID).await?;

    let deleted = ctx
        .client
        .delete_record(&app, &table, &record_id, &[])
        .await?;
    log::info!("Deleted record {} from {}/{}", record_id, app, table);

    Ok(vec![match deleted {
        Some(record) => OutputItem::new(record, index),
        None => OutputItem::success(index, Some(&record_id)),
    }])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::params::StaticParameters;
    use crate::actions::{InputItem, RecordOperation};
    use crate::api::testing::MockTransport;
    use crate::api::{HttpMethod, NolocoClient};
    use serde_json::json;

    #[tokio::test]
    async fn test_delete_returns_server_record() {
        let transport = MockTransport::new(|_| Ok(json!({"id": 4, "uuid": "u-4"})));
        let params = StaticParameters::new()
            .with(APP, "crm")
            .with(TABLE, "contact")
            .with(RECORD_ID, 4);
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params),
        );

        let output = RecordOperation::Delete
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].method, HttpMethod::Delete);
        assert_eq!(transport.requests()[0].endpoint, "/v1/data/crm/contact/4");
        assert_eq!(output[0].json["uuid"], json!("u-4"));
    }

    #[tokio::test]
    async fn test_missing_record_id_fails() {
        let transport = MockTransport::new(|_| Ok(json!(null)));
        let params = StaticParameters::new().with(APP, "crm").with(TABLE, "contact");
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params),
        );

        let err = RecordOperation::Delete
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap_err();
        assert!(matches!(err.source, ActionError::MissingParameter(ref name) if name == RECORD_ID));
        assert_eq!(transport.request_count(), 0);
    }
}
