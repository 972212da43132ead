//! HTTP transport and client against a local mock server

use noloco_cli::api::query::RecordQuery;
use noloco_cli::api::{
    ApiError, ApiRequest, ApiTransport, Credentials, HttpMethod, HttpTransport, NolocoClient,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        account_key: "acc-key".to_string(),
        app_key: "app-key".to_string(),
    }
}

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(format!("{}/", server.uri()), &credentials()).unwrap()
}

#[tokio::test]
async fn test_sends_both_bearer_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/meta/me"))
        .and(header("authorization", "Bearer acc-key"))
        .and(header("x-noloco-app-token", "Bearer app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": 7,
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NolocoClient::new(transport(&server));
    let me = client.fetch_me().await.unwrap();
    assert_eq!(me.user_id, 7);
    assert_eq!(me.email, "ada@example.com");
}

#[tokio::test]
async fn test_record_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/data/crm/contact"))
        .and(query_param("first", "2"))
        .and(query_param("after", "c1"))
        .and(query_param("sortBy", "createdAt"))
        .and(query_param("orderBy", "DESC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": 3}, {"id": 2}],
            "pageInfo": {"hasNextPage": true, "endCursor": "c3"},
            "totalCount": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NolocoClient::new(transport(&server));
    let page = client
        .fetch_records("crm", "contact", &RecordQuery::new().first(2).after("c1"))
        .await
        .unwrap();
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.next_cursor(), Some("c3"));
}

#[tokio::test]
async fn test_json_body_on_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/data/crm/contact"))
        .and(body_json(json!({"name": "Ada", "address": {"city": "NYC"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 11, "name": "Ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = NolocoClient::new(transport(&server));
    let payload = json!({"name": "Ada", "address": {"city": "NYC"}});
    let created = client
        .create_record("crm", "contact", payload.as_object().unwrap(), &[])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created["id"], json!(11));
}

#[tokio::test]
async fn test_error_status_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/crm/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("table not found"))
        .mount(&server)
        .await;

    let client = NolocoClient::new(transport(&server));
    let err = client.fetch_table_fields("crm", "missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API error (404): table not found");
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/data/crm/contact/5"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let transport = transport(&server);
    let value = transport
        .send(ApiRequest::new(HttpMethod::Delete, "/v1/data/crm/contact/5"))
        .await
        .unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/meta/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = NolocoClient::new(transport(&server));
    let err = client.fetch_apps().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}
