//! Record query building and execution
//!
//! Filters, sort options and query parameters for the data endpoint, plus the
//! cursor loop that collects records across pages.

pub mod filters;
pub mod orderby;
pub mod pages;
pub mod query;
pub mod result;

pub use filters::{
    ConditionOperator, FieldFilter, FilterCondition, FilterError, FilterExpression, FilterInput,
    FilterOperator, FilterWrapper, ValueFilter,
};
pub use orderby::{SortDirection, SortField};
pub use pages::{CollectedRecords, PageLimits, RecordPager};
pub use query::{INCLUDE_ALL, RecordQuery, parse_include};
pub use result::{PageInfo, Record, RecordPage, record_id, record_timestamp};
