//! Calendar date lookups for contextual phrasing.
//!
//! Stateless and independent of the device session: the agent uses this
//! to turn "tomorrow" into a concrete date before talking about it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde_json::Value;

use super::error::AgentError;
use super::registry::{parse_args, schema_value, AgentTool};
use super::types::{DaySelector, GetDateArgs};

/// JST is UTC+9 year-round; Japan observes no daylight saving time.
const TOKYO_OFFSET_SECS: i32 = 9 * 3600;

fn tokyo_offset() -> FixedOffset {
    FixedOffset::east_opt(TOKYO_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Resolve an enumerated day offset to a calendar date in Japan.
pub fn resolve_date(now: DateTime<Utc>, day: DaySelector) -> NaiveDate {
    (now.with_timezone(&tokyo_offset()) + Duration::days(day.offset_days())).date_naive()
}

/// Date lookup tool. No session dependency.
pub struct GetDate;

#[async_trait]
impl AgentTool for GetDate {
    fn name(&self) -> &'static str {
        "GetDate"
    }

    fn description(&self) -> &'static str {
        "Resolve 'today', 'tomorrow' or 'day_after_tomorrow' to a calendar date \
         (YYYY-MM-DD) in the Asia/Tokyo time zone."
    }

    fn schema(&self) -> Value {
        schema_value::<GetDateArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<String, AgentError> {
        let args: GetDateArgs = parse_args(args)?;
        Ok(resolve_date(Utc::now(), args.day).to_string())
    }
}
