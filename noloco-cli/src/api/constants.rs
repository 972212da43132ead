//! Noloco API constants

/// Base URL of the public Noloco API
pub const BASE_API_URL: &str = "https://api.portals.noloco.io";

/// Response format requested on every data endpoint
pub const GRAPHQL_FORMAT: &str = "graphql";

/// Schema format that includes sub-field declarations for composite fields
pub const INPUT_SCHEMA_FORMAT: &str = "input";

/// Largest page the data endpoint will return in a single request
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fields present on every record that are managed by Noloco itself
pub const SYSTEM_FIELDS: [&str; 4] = ["id", "uuid", "createdAt", "updatedAt"];

/// Header carrying the app-level token next to the account bearer token
/// (lowercase so it can be used with `HeaderName::from_static`)
pub const APP_TOKEN_HEADER: &str = "x-noloco-app-token";

/// Check whether a field api name is one of the managed system fields
pub fn is_system_field(api_name: &str) -> bool {
    SYSTEM_FIELDS.contains(&api_name)
}

pub mod endpoints {
    pub const ME: &str = "/v1/meta/me";
    pub const APPS: &str = "/v1/meta/apps";

    pub fn schema(app: &str) -> String {
        format!("/v1/schema/{}", urlencoding::encode(app))
    }

    pub fn table_schema(app: &str, table: &str) -> String {
        format!(
            "/v1/schema/{}/{}",
            urlencoding::encode(app),
            urlencoding::encode(table)
        )
    }

    pub fn records(app: &str, table: &str) -> String {
        format!(
            "/v1/data/{}/{}",
            urlencoding::encode(app),
            urlencoding::encode(table)
        )
    }

    pub fn record(app: &str, table: &str, id: &str) -> String {
        format!("{}/{}", records(app, table), urlencoding::encode(id))
    }
}
