//! Noloco API client
//!
//! Thin typed wrappers around the schema and data endpoints. Each method issues
//! exactly one request through the configured [`ApiTransport`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::constants::{GRAPHQL_FORMAT, INPUT_SCHEMA_FORMAT, endpoints};
use super::error::ApiError;
use super::metadata::{AccountInfo, App, AppsResponse, Table, TableSchema, TablesResponse};
use super::query::{FilterExpression, Record, RecordPage, RecordQuery};
use super::transport::{ApiRequest, ApiTransport, HttpMethod};

#[derive(Clone)]
pub struct NolocoClient {
    transport: Arc<dyn ApiTransport>,
}

impl std::fmt::Debug for NolocoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NolocoClient").finish_non_exhaustive()
    }
}

impl NolocoClient {
    pub fn new(transport: impl ApiTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_arc(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.transport.send(request).await
    }

    async fn send_typed<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        context: &str,
    ) -> Result<T, ApiError> {
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::decode(context, e))
    }

    /// Send a mutation; a null body means the server had nothing to return
    async fn send_optional_record(
        &self,
        request: ApiRequest,
        context: &str,
    ) -> Result<Option<Record>, ApiError> {
        match self.send(request).await? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ApiError::decode(context, e)),
        }
    }

    fn data_request(method: HttpMethod, endpoint: String, include: &[String]) -> ApiRequest {
        let request =
            ApiRequest::new(method, endpoint).with_param("response_format", GRAPHQL_FORMAT);
        if include.is_empty() {
            request
        } else {
            request.with_param("include", include.join(","))
        }
    }

    /// Current account; also serves as a credential check
    pub async fn fetch_me(&self) -> Result<AccountInfo, ApiError> {
        self.send_typed(ApiRequest::get(endpoints::ME), "account info")
            .await
    }

    pub async fn fetch_apps(&self) -> Result<Vec<App>, ApiError> {
        let response: AppsResponse = self
            .send_typed(ApiRequest::get(endpoints::APPS), "app list")
            .await?;
        Ok(response.apps)
    }

    pub async fn fetch_tables(&self, app: &str) -> Result<Vec<Table>, ApiError> {
        let response: TablesResponse = self
            .send_typed(ApiRequest::get(endpoints::schema(app)), "table list")
            .await?;
        Ok(response.tables)
    }

    /// Field definitions of a table, including composite sub-field layouts
    pub async fn fetch_table_fields(
        &self,
        app: &str,
        table: &str,
    ) -> Result<TableSchema, ApiError> {
        let request = ApiRequest::get(endpoints::table_schema(app, table))
            .with_param("include", "")
            .with_param("format", INPUT_SCHEMA_FORMAT);
        self.send_typed(request, "table schema").await
    }

    /// Fetch a single page of records
    pub async fn fetch_records(
        &self,
        app: &str,
        table: &str,
        query: &RecordQuery,
    ) -> Result<RecordPage, ApiError> {
        let request =
            ApiRequest::get(endpoints::records(app, table)).with_query(query.to_query_pairs());
        self.send_typed(request, "record page").await
    }

    pub async fn fetch_record(
        &self,
        app: &str,
        table: &str,
        id: &str,
        include: &[String],
    ) -> Result<Record, ApiError> {
        let request =
            Self::data_request(HttpMethod::Get, endpoints::record(app, table, id), include);
        self.send_typed(request, "record").await
    }

    pub async fn create_record(
        &self,
        app: &str,
        table: &str,
        payload: &Record,
        include: &[String],
    ) -> Result<Option<Record>, ApiError> {
        let request = Self::data_request(HttpMethod::Post, endpoints::records(app, table), include)
            .with_body(Value::Object(payload.clone()));
        self.send_optional_record(request, "created record").await
    }

    pub async fn update_record(
        &self,
        app: &str,
        table: &str,
        id: &str,
        payload: &Record,
    ) -> Result<Option<Record>, ApiError> {
        let request = Self::data_request(HttpMethod::Put, endpoints::record(app, table, id), &[])
            .with_body(Value::Object(payload.clone()));
        self.send_optional_record(request, "updated record").await
    }

    pub async fn delete_record(
        &self,
        app: &str,
        table: &str,
        id: &str,
        include: &[String],
    ) -> Result<Option<Record>, ApiError> {
        let request =
            Self::data_request(HttpMethod::Delete, endpoints::record(app, table, id), include);
        self.send_optional_record(request, "deleted record").await
    }

    /// Single-page search with a filter
    pub async fn search_records(
        &self,
        app: &str,
        table: &str,
        filter: FilterExpression,
        limit: usize,
    ) -> Result<RecordPage, ApiError> {
        let query = RecordQuery::new().first(limit).filter(Some(filter));
        self.fetch_records(app, table, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_table_fields_requests_input_format() {
        let transport = MockTransport::new(|_| {
            Ok(json!({
                "apiName": "user",
                "display": "User",
                "fields": [{"apiName": "email", "display": "Email", "type": "TEXT"}]
            }))
        });
        let client = NolocoClient::from_arc(transport.clone());

        let schema = client.fetch_table_fields("my-app", "user").await.unwrap();
        assert_eq!(schema.fields.len(), 1);

        let requests = transport.requests();
        assert_eq!(requests[0].endpoint, "/v1/schema/my-app/user");
        assert_eq!(requests[0].param("format"), Some("input"));
        assert_eq!(requests[0].param("include"), Some(""));
    }

    #[tokio::test]
    async fn test_mutations_treat_null_as_empty() {
        let transport = MockTransport::new(|_| Ok(Value::Null));
        let client = NolocoClient::from_arc(transport.clone());

        let mut payload = Record::new();
        payload.insert("name".to_string(), json!("Bob"));

        assert!(client.create_record("app", "user", &payload, &[]).await.unwrap().is_none());
        assert!(client.update_record("app", "user", "7", &payload).await.unwrap().is_none());
        assert!(client.delete_record("app", "user", "7", &[]).await.unwrap().is_none());

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].body, Some(json!({"name": "Bob"})));
        assert_eq!(requests[1].method, HttpMethod::Put);
        assert_eq!(requests[1].endpoint, "/v1/data/app/user/7");
        assert_eq!(requests[2].method, HttpMethod::Delete);
        assert!(requests.iter().all(|r| r.param("response_format") == Some("graphql")));
    }

    #[tokio::test]
    async fn test_decode_error_on_unexpected_shape() {
        let transport = MockTransport::new(|_| Ok(json!({"apps": "nope"})));
        let client = NolocoClient::from_arc(transport);
        let err = client.fetch_apps().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_search_records_sends_filter_and_limit() {
        let transport = MockTransport::new(|_| Ok(json!({"records": [], "pageInfo": {}})));
        let client = NolocoClient::from_arc(transport.clone());
        let filter = FilterExpression::parse(r#"{"email": {"equals": "a@b.c"}}"#).unwrap();

        client.search_records("app", "user", filter, 1).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].param("first"), Some("1"));
        assert_eq!(requests[0].param("filter"), Some(r#"{"email":{"equals":"a@b.c"}}"#));
    }
}
