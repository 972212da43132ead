//! Create a record

use super::fields::resolve_payload;
use super::params::{APP, TABLE};
use super::{ActionError, ExecutionContext, InputItem, OutputItem};

pub(super) async fn execute(
    ctx: &ExecutionContext,
    index: usize,
    item: &InputItem,
) -> Result<Vec<OutputItem>, ActionError> {
    let params = ctx.params(index);
    let app = params.required_string(APP).await?;
    let table = params.required_string(TABLE).await?;
    let payload = resolve_payload(&params, item).await?;

    let created = ctx.client.create_record(&app, &table, &payload, &[]).await?;
    log::info!("Created record in {}/{}", app, table);

    Ok(vec![match created {
        Some(record) => OutputItem::new(record, index),
        None => OutputItem::success(index, None),
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

    #[tokio::test]
    async fn test_create_sends_nested_payload() {
        let transport = MockTransport::new(|request| {
            let mut record = request.body.clone().unwrap_or(Value::Null);
            record["id"] = json!(12);
            Ok(record)
        });
        let params = StaticParameters::new()
            .with(APP, "crm")
            .with(TABLE, "company")
            .with(
                FIELDS,
                json!({
                    "mappingMode": "defineBelow",
                    "value": {"name": "Acme", "address__city": "Ghent"}
                }),
            );
        let ctx = ExecutionContext::new(
            NolocoClient::from_arc(transport.clone()),
            Arc::new(params),
        );

        let output = RecordOperation::Create
            .execute(&ctx, &[InputItem::default()])
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.endpoint, "/v1/data/crm/company");
        assert_eq!(
            request.body,
            Some(json!({"name": "Acme", "address": {"city": "Ghent"}}))
        );
        assert_eq!(output[0].json["id"], json!(12));
    }

    #[tokio::test]
    async fn test_null_response_reports_success() {
        let transport = MockTransport::new(|_| Ok(Value::Null));
        let params = StaticParameters::new()
            .with(APP, "crm")
            .with(TABLE, "company")
            .with(FIELDS, json!({"mappingMode": "autoMapInputData"}));
        let ctx = ExecutionContext::new(NolocoClient::from_arc(transport), Arc::new(params));

        let items = InputItem::from_value(json!([{"name": "A"}, {"name": "B"}]));
        let output = RecordOperation::Create.execute(&ctx, &items).await.unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(Value::Object(output[1].json.clone()), json!({"success": true}));
        assert_eq!(output[1].paired_item.item, 1);
    }
}
