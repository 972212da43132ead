//! Fetch one record by id

use super::params::{APP, RECORD_ID, TABLE};
use super::{ActionError, ExecutionContext, OutputItem};
use crate::api::query::INCLUDE_ALL;

pub(super) async fn execute(
    ctx: &ExecutionContext,
    index: usize,
) -> Result<Vec<OutputItem>, ActionError> {
    let params = ctx.params(index);
    let app = params.required_string(APP).await?;
    let table = params.required_string(TABLE).await?;
    let record_id = params.required_string(RECORD_ID).await?;

    let record = ctx
        .client
        .fetch_record(&app, &table, &record_id, &[INCLUDE_ALL.to_string()])
        .await?;

    Ok(vec![OutputItem::new(record, index)])
}
