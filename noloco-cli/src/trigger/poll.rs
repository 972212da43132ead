//! Polling for new or updated records
//!
//! Each poll fetches the newest records of a table and returns those past the
//! caller's checkpoint. The checkpoint is handed in and handed back; storing it
//! between polls is up to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::params::{APP, TABLE};
use crate::actions::{ActionError, ItemParameters, ParameterSource};
use crate::api::constants::MAX_PAGE_SIZE;
use crate::api::query::{
    Record, RecordQuery, SortDirection, SortField, parse_include, record_timestamp,
};
use crate::api::{ApiError, NolocoClient};

pub const EVENT: &str = "event";
pub const OPTIONS: &str = "options";

/// Records returned by a manual poll without a checkpoint
pub const SAMPLE_SIZE: usize = 5;

/// What counts as a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerEvent {
    #[default]
    RecordCreated,
    RecordUpdated,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecordCreated => "recordCreated",
            Self::RecordUpdated => "recordUpdated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "recordCreated" => Some(Self::RecordCreated),
            "recordUpdated" => Some(Self::RecordUpdated),
            _ => None,
        }
    }

    pub fn sort_field(&self) -> SortField {
        match self {
            Self::RecordCreated => SortField::CreatedAt,
            Self::RecordUpdated => SortField::UpdatedAt,
        }
    }

    /// Timestamp of the change this event tracks
    ///
    /// Records that were never updated fall back to their creation time.
    pub fn timestamp(&self, record: &Record) -> Option<DateTime<Utc>> {
        match self {
            Self::RecordCreated => record_timestamp(record, "createdAt"),
            Self::RecordUpdated => record_timestamp(record, "updatedAt")
                .or_else(|| record_timestamp(record, "createdAt")),
        }
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who started the poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollMode {
    /// A user testing the trigger; wants to see sample data
    Manual,
    #[default]
    Scheduled,
}

/// Last change already reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCheckpoint {
    #[serde(default)]
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl PollCheckpoint {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            last_timestamp: Some(timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    pub app: String,
    pub table: String,
    pub event: TriggerEvent,
    /// Relationships to expand in the returned records
    pub include: Vec<String>,
    pub mode: PollMode,
}

#[derive(Debug, Default, Deserialize)]
struct PollOptions {
    #[serde(default)]
    include: Option<String>,
}

impl PollRequest {
    pub fn new(app: impl Into<String>, table: impl Into<String>, event: TriggerEvent) -> Self {
        Self {
            app: app.into(),
            table: table.into(),
            event,
            include: Vec::new(),
            mode: PollMode::default(),
        }
    }

    pub fn include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn mode(mut self, mode: PollMode) -> Self {
        self.mode = mode;
        self
    }

    /// Read `app`, `dataType`, `event` and `options.include` from the host
    pub async fn from_parameters(
        source: &dyn ParameterSource,
        mode: PollMode,
    ) -> Result<Self, ActionError> {
        let params = ItemParameters::new(source, 0);
        let app = params.required_string(APP).await?;
        let table = params.required_string(TABLE).await?;
        let event = match params.optional_string(EVENT).await? {
            None => TriggerEvent::default(),
            Some(raw) => TriggerEvent::parse(&raw)
                .ok_or_else(|| ActionError::invalid(EVENT, format!("unknown event '{}'", raw)))?,
        };
        let options: PollOptions = params.decode_or_default(OPTIONS).await?;
        let include = options.include.as_deref().map(parse_include).unwrap_or_default();

        Ok(Self::new(app, table, event).include(include).mode(mode))
    }
}

/// Result of one poll
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Records to emit, newest first; empty means nothing to report
    pub records: Vec<Record>,
    /// Checkpoint to store for the next poll
    pub checkpoint: PollCheckpoint,
}

/// Poll a table once
///
/// Only the newest page is inspected, so more than a page of changes between
/// two polls are not all reported.
pub async fn poll(
    client: &NolocoClient,
    request: &PollRequest,
    checkpoint: PollCheckpoint,
) -> Result<PollOutcome, ApiError> {
    let query = RecordQuery::new()
        .first(MAX_PAGE_SIZE)
        .sort_by(request.event.sort_field())
        .order_by(SortDirection::Desc)
        .include(request.include.clone());
    let page = client
        .fetch_records(&request.app, &request.table, &query)
        .await?;

    if page.records.is_empty() {
        log::debug!("{}/{}: no records", request.app, request.table);
        return Ok(PollOutcome {
            records: Vec::new(),
            checkpoint,
        });
    }

    let newest = page
        .records
        .iter()
        .filter_map(|record| request.event.timestamp(record))
        .max();

    let records: Vec<Record> = match checkpoint.last_timestamp {
        Some(last) => page
            .records
            .into_iter()
            .filter(|record| request.event.timestamp(record).is_some_and(|ts| ts > last))
            .collect(),
        None => match request.mode {
            PollMode::Manual => page.records.into_iter().take(SAMPLE_SIZE).collect(),
            PollMode::Scheduled => {
                log::info!(
                    "{}/{}: first poll, recording baseline",
                    request.app,
                    request.table
                );
                Vec::new()
            }
        },
    };

    let last_timestamp = match (checkpoint.last_timestamp, newest) {
        (Some(last), Some(newest)) => Some(last.max(newest)),
        (last, newest) => newest.or(last),
    };
    if newest.is_none() {
        log::warn!(
            "{}/{}: no parseable {} timestamps, checkpoint unchanged",
            request.app,
            request.table,
            request.event.sort_field().as_str()
        );
    }

    log::debug!(
        "{}/{}: {} {} record(s)",
        request.app,
        request.table,
        records.len(),
        request.event
    );
    Ok(PollOutcome {
        records,
        checkpoint: PollCheckpoint { last_timestamp },
    })
}
