//! Update a record

use super::fields::resolve_payload;
use super::params::{APP, RECORD_ID, TABLE};
use super::{ActionError, ExecutionContext, InputItem, OutputItem};

pub(super) async fn execute(
    ctx: &ExecutionContext,
    index: usize,
    item: &InputItem,
) -> Result<Vec<OutputItem>, ActionError> {
    let params = ctx.params(index);
    let app = params.required_string(APP).await?;
    let table = params.required_string(TABLE).await?;
    let record_id = params.required_string(RECORD_ID).await?;

    let payload = resolve_payload(&params, item).await?;
    if payload.is_empty() {
        return Err(ActionError::EmptyUpdate);
    }

    let updated = ctx
        .client
        .update_record(&app, &table, &record_id, &payload)
        .await?;
    log::info!("Updated record {} in {}/{}", record_id, app, table);

    Ok(vec![match updated {
        Some(record) => OutputItem::new(record, index),
        None => OutputItem::success(index, Some(&record_id)),
    }])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::params::{FIELDS, StaticParameters};
    use crate::actions::RecordOperation;
    use crate::api::testing::MockTransport;
    use crate::api::{HttpMethod, NolocoClient};
    use serde_json::{Value, json};

    fn params(fields: Value) -> StaticParameters {
        StaticParameters::new()
            .with(APP, "crm")
            .with(TABLE, "contact")
            .with(RECORD_ID, json!({"mode": "id", "value": "9"}))
            .with(FIELDS, fields)
    }

    #[tokio::test]
    async fn test_empty_update_fails_before_any_request() {
        let transport = MockTransport::new(|_| Ok(Value::Null));
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params(json!({"mappingMode": "defineBelow", "value": {"name": null}}))),
        );

        let err = RecordOperation::Update
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap_err();

        assert!(matches!(err.source, ActionError::EmptyUpdate));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_puts_payload_and_reports_id() {
        let transport = MockTransport::new(|_| Ok(Value::Null));
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params(json!({"mappingMode": "defineBelow", "value": {"status": "Closed"}}))),
        );

        let output = RecordOperation::Update
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.endpoint, "/v1/data/crm/contact/9");
        assert_eq!(request.body, Some(json!({"status": "Closed"})));
        assert_eq!(
            Value::Object(output[0].json.clone()),
            json!({"success": true, "id": "9"})
        );
    }

    #[tokio::test]
    async fn test_empty_update_is_reported_under_continue_on_fail() {
        let transport = MockTransport::new(|_| Ok(Value::Null));
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params(json!({"mappingMode": "autoMapInputData"}))),
        )
        .continue_on_fail(true);

        let items = InputItem::from_value(json!([{}, {"name": "Bob"}]));
        let output = RecordOperation::Update.execute(&ctx, &items).await.unwrap();

        assert_eq!(
            output[0].json["error"],
            json!("At least one field must be provided for update")
        );
        assert_eq!(output[1].json["success"], json!(true));
        assert_eq!(transport.request_count(), 1);
    }
}
