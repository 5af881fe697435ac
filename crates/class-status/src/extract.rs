//! Turning image-extraction output into schedule blocks.
//!
//! The extraction service itself is opaque: it takes image bytes and returns
//! text that should be a JSON array of rows shaped like
//!
//! ```json
//! [{"day": 0, "start_time": "08:30", "end_time": "09:20", "course_name": "CS 101"}]
//! ```
//!
//! possibly wrapped in a Markdown code fence. [`parse_rows`] validates that text
//! into [`NewBlock`]s; one bad row rejects the whole batch.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StatusError};
use crate::memory::MemoryStore;
use crate::schedule::{DayOfWeek, NewBlock, ScheduleBlock, TimeOfDay, UserId};

/// External image-to-schedule service.
pub trait ScheduleExtractor: Send + Sync {
    /// Raw text produced for one schedule image.
    fn extract(&self, image: &[u8]) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct Row {
    day: Value,
    start_time: Value,
    end_time: Value,
    #[serde(default)]
    course_name: Option<String>,
}

/// Strip an optional ```` ```json ```` / ```` ``` ```` fence around the payload.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse extraction output into validated blocks.
///
/// # Errors
/// Returns [`StatusError::Extraction`] when the text is not a JSON array, and
/// [`StatusError::InvalidRow`] naming the first row with a bad shape, day or time.
pub fn parse_rows(text: &str) -> Result<Vec<NewBlock>> {
    let rows: Vec<Value> = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| StatusError::Extraction(format!("expected a JSON array of rows: {e}")))?;

    rows.into_iter()
        .enumerate()
        .map(|(index, value)| {
            row_to_block(value).map_err(|message| StatusError::InvalidRow { index, message })
        })
        .collect()
}

/// Run an image through `extractor` and add the resulting blocks to `user_id`'s
/// schedule. Nothing is stored unless every row is valid.
pub fn import_image(
    extractor: &dyn ScheduleExtractor,
    store: &MemoryStore,
    user_id: UserId,
    image: &[u8],
) -> Result<Vec<ScheduleBlock>> {
    let text = extractor.extract(image)?;
    store.add_blocks(user_id, parse_rows(&text)?)
}

fn row_to_block(value: Value) -> std::result::Result<NewBlock, String> {
    let row: Row = serde_json::from_value(value).map_err(|e| e.to_string())?;

    let day = row
        .day
        .as_i64()
        .ok_or_else(|| format!("day must be an integer, got {}", row.day))?;
    let day_of_week = DayOfWeek::new(day).map_err(|e| e.to_string())?;

    let time = |field: &str, v: &Value| -> std::result::Result<TimeOfDay, String> {
        v.as_str()
            .ok_or_else(|| format!("{field} must be a string, got {v}"))?
            .parse::<TimeOfDay>()
            .map_err(|e| e.to_string())
    };

    Ok(NewBlock {
        day_of_week,
        start_time: time("start_time", &row.start_time)?,
        end_time: time("end_time", &row.end_time)?,
        course_name: row.course_name,
    })
}
