//! WASM bindings for recurrence-engine.
//!
//! Exposes series expansion, recurrence summaries and wire-format
//! normalization to JavaScript via `wasm-bindgen`. All complex types are passed
//! as JSON strings: master events and occurrences use the engine's camelCase
//! serde layout, recurrences use the calendar API wire schema.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p recurrence-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/recurrence-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/recurrence_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use recurrence_engine::model::{parse_date, MasterEvent};
use recurrence_engine::{wire, CountAnchor, ExpandOptions, MonthDayOverflow, RecurrenceError};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Expansion options passed from JavaScript. Omitted fields use the defaults.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct OptionsInput {
    month_day_overflow: Option<String>,
    count_anchor: Option<String>,
}

impl OptionsInput {
    fn into_options(self) -> Result<ExpandOptions, JsValue> {
        let overflow = match self.month_day_overflow.as_deref() {
            None | Some("skip") => MonthDayOverflow::Skip,
            Some("clampToMonthEnd") => MonthDayOverflow::ClampToMonthEnd,
            Some(other) => return Err(js_error("Unknown monthDayOverflow", other)),
        };
        let count_anchor = match self.count_anchor.as_deref() {
            None | Some("seriesStart") => CountAnchor::SeriesStart,
            Some("queryStart") => CountAnchor::QueryStart,
            Some(other) => return Err(js_error("Unknown countAnchor", other)),
        };
        Ok(ExpandOptions {
            overflow,
            count_anchor,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_error(context: &str, detail: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, detail))
}

fn engine_error(e: RecurrenceError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_day(s: &str) -> Result<NaiveDate, JsValue> {
    parse_date(s).map_err(engine_error)
}

fn parse_master(json: &str) -> Result<MasterEvent, JsValue> {
    serde_json::from_str(json).map_err(|e| js_error("Invalid master event JSON", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization error", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand a master event into occurrences between two `YYYY-MM-DD` dates
/// (both inclusive).
///
/// Returns a JSON array of occurrence objects (`eventId`, `seriesMasterId`,
/// `originalDate`, `start`, `end`, `subject`, `location`, `isRecurring`,
/// `isException`).
///
/// # Arguments
/// - `master_json` -- master event JSON, with the recurrence in wire form
/// - `query_start` / `query_end` -- window bounds as `YYYY-MM-DD`
/// - `options_json` -- optional `{monthDayOverflow, countAnchor}` object
#[wasm_bindgen(js_name = "expandSeries")]
pub fn expand_series(
    master_json: &str,
    query_start: &str,
    query_end: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let master = parse_master(master_json)?;
    let options = match options_json {
        Some(json) => serde_json::from_str::<OptionsInput>(&json)
            .map_err(|e| js_error("Invalid options JSON", e))?
            .into_options()?,
        None => ExpandOptions::default(),
    };

    let occurrences = recurrence_engine::expand_with(
        &master,
        parse_day(query_start)?,
        parse_day(query_end)?,
        options,
    );
    to_json(&occurrences)
}

/// Check whether a wire recurrence occurs on a `YYYY-MM-DD` date, ignoring
/// exceptions and range end.
#[wasm_bindgen(js_name = "occursOn")]
pub fn occurs_on(recurrence_json: &str, date: &str) -> Result<bool, JsValue> {
    let recurrence = wire::from_json(recurrence_json).map_err(engine_error)?;
    Ok(recurrence_engine::matches(
        parse_day(date)?,
        &recurrence.pattern,
        recurrence.range.start_date,
    ))
}

/// Human-readable summary of a wire recurrence, e.g.
/// `"Occurs every 2 weeks on M, W, F. Until Mar 31, 2024"`.
///
/// Malformed recurrences summarize to an empty string.
#[wasm_bindgen(js_name = "summarizeRecurrence")]
pub fn summarize_recurrence(recurrence_json: &str) -> String {
    wire::from_json(recurrence_json)
        .map(|r| recurrence_engine::summary::format(&r.pattern, &r.range))
        .unwrap_or_default()
}

/// Summary of a master event including its ad-hoc additions and exclusions.
///
/// Returns a JSON object `{base, adjustments: [{date, dateText, tag}]}`.
#[wasm_bindgen(js_name = "summarizeEvent")]
pub fn summarize_event(master_json: &str) -> Result<String, JsValue> {
    let master = parse_master(master_json)?;
    to_json(&recurrence_engine::summary::format_event(&master))
}

/// Parse a wire recurrence and write it back in canonical form, tagged with
/// `time_zone`.
#[wasm_bindgen(js_name = "normalizeRecurrence")]
pub fn normalize_recurrence(recurrence_json: &str, time_zone: &str) -> Result<String, JsValue> {
    let recurrence = wire::from_json(recurrence_json).map_err(engine_error)?;
    wire::to_json(&recurrence, time_zone).map_err(engine_error)
}
